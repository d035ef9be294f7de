// crates/rule-logic/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and fixtures for rule-logic integration tests.
// ============================================================================
//! ## Overview
//! Shared test helpers for consistent Result-based assertions.

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
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::error::Error;
use std::fmt;

use rule_logic::Combinator;
use rule_logic::ConditionField;
use rule_logic::ConditionId;
use rule_logic::ConditionSet;
use rule_logic::SequenceIds;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across rule-logic integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl TestError {
    /// Creates a new test error with the provided message.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(Box::new(TestError::new(message))) }
}

// ========================================================================
// Fixtures
// ========================================================================

/// Builds a set of `count` empty conditions and returns it with their ids.
pub fn set_with(count: usize) -> (ConditionSet, Vec<ConditionId>, SequenceIds) {
    let mut ids = SequenceIds::new();
    let mut set = ConditionSet::new();
    let created = (0 .. count).map(|_| set.add(&mut ids)).collect();
    (set, created, ids)
}

/// Fills a condition with field, operator and value.
pub fn complete(set: &mut ConditionSet, id: ConditionId, field: &str) {
    set.update(id, ConditionField::Field, field);
    set.update(id, ConditionField::Operator, "is");
    set.update(id, ConditionField::Value, "yes");
}

/// Reads the gap map as a dense vector, failing on holes.
pub fn dense_operators(set: &ConditionSet) -> Option<Vec<Combinator>> {
    let mut dense = Vec::new();
    for (expected, (gap, combinator)) in set.operators().iter().enumerate() {
        if gap != expected {
            return None;
        }
        dense.push(combinator);
    }
    Some(dense)
}
