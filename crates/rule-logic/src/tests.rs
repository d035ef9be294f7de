// crates/rule-logic/src/tests.rs
// ============================================================================
// Module: Rule Logic Unit Tests
// Description: Unit tests for gap renumbering internals and id sequencing.
// Purpose: Pin the exact merge tie-break and counter behavior.
// Dependencies: rule-logic
// ============================================================================

//! ## Overview
//! Unit tests for crate-internal behavior not covered by integration tests.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]


use crate::Combinator;
use crate::GapOperators;
use crate::IdSource;
use crate::SequenceIds;

// ============================================================================
// SECTION: Gap Renumbering
// ============================================================================

/// Builds a dense operator map from positional combinators.
fn ops(values: &[Combinator]) -> GapOperators {
    values.iter().copied().enumerate().collect()
}

#[test]
fn removal_in_middle_keeps_left_operator() {
    use Combinator::And;
    use Combinator::Or;
    // c0 OR c1 AND c2 AND c3, remove c1 -> c0 OR c2 AND c3
    let before = ops(&[Or, And, And]);
    let after = before.after_removal(1, 4);
    assert_eq!(after, ops(&[Or, And]));
}

#[test]
fn removal_of_first_drops_gap_zero() {
    use Combinator::And;
    use Combinator::Or;
    let before = ops(&[Or, And, Or]);
    let after = before.after_removal(0, 4);
    assert_eq!(after, ops(&[And, Or]));
}

#[test]
fn removal_of_last_drops_trailing_gap() {
    use Combinator::And;
    use Combinator::Or;
    let before = ops(&[And, Or, Or]);
    let after = before.after_removal(3, 4);
    assert_eq!(after, ops(&[And, Or]));
}

#[test]
fn removal_materializes_defaults_and_drops_stray_gaps() {
    let mut before = GapOperators::new();
    before.set(2, Combinator::Or);
    before.set(9, Combinator::Or);
    let after = before.after_removal(0, 4);
    assert_eq!(after, ops(&[Combinator::And, Combinator::Or]));
}

#[test]
fn removal_from_single_condition_yields_empty_map() {
    let after = GapOperators::new().after_removal(0, 1);
    assert!(after.is_empty());
}

// ============================================================================
// SECTION: Sequence Ids
// ============================================================================

#[test]
fn sequence_ids_are_monotonic_from_one() {
    let mut ids = SequenceIds::new();
    assert_eq!(ids.next_id().get(), 1);
    assert_eq!(ids.next_id().get(), 2);
    assert_eq!(ids.next_id().get(), 3);
}

