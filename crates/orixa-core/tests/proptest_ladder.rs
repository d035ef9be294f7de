// crates/orixa-core/tests/proptest_ladder.rs
// ============================================================================
// Module: Ladder Property-Based Tests
// Description: Property tests for stage ordering and trigger id allocation.
// Purpose: Check structural invariants across arbitrary edit sequences.
// ============================================================================

//! Property-based tests for ladder and trigger sequence invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;

use orixa_core::AdoptionLadder;
use orixa_core::TriggerSequence;
use orixa_core::runtime::ladder::MIN_STAGES;
use proptest::prelude::*;

/// One structural ladder edit.
#[derive(Debug, Clone)]
enum LadderEdit {
    /// Append a stage.
    Add,
    /// Remove the stage at a sorted position.
    Remove(prop::sample::Index),
    /// Move a stage between sorted positions.
    Move(prop::sample::Index, prop::sample::Index),
}

/// Strategy for a ladder edit.
fn ladder_edit() -> impl Strategy<Value = LadderEdit> {
    prop_oneof![
        Just(LadderEdit::Add),
        any::<prop::sample::Index>().prop_map(LadderEdit::Remove),
        (any::<prop::sample::Index>(), any::<prop::sample::Index>())
            .prop_map(|(from, to)| LadderEdit::Move(from, to)),
    ]
}

/// One trigger sequence edit.
#[derive(Debug, Clone)]
enum TriggerEdit {
    /// Append a trigger.
    Add,
    /// Remove the trigger at a position.
    Remove(prop::sample::Index),
}

/// Strategy for a trigger edit.
fn trigger_edit() -> impl Strategy<Value = TriggerEdit> {
    prop_oneof![Just(TriggerEdit::Add), any::<prop::sample::Index>().prop_map(TriggerEdit::Remove)]
}

proptest! {
    #[test]
    fn stage_orders_stay_dense_and_floor_holds(edits in prop::collection::vec(ladder_edit(), 0 .. 40)) {
        let mut ladder = AdoptionLadder::default();
        for edit in edits {
            let count = ladder.state().stages.len();
            match edit {
                LadderEdit::Add => {
                    ladder.add_stage(None);
                }
                LadderEdit::Remove(pick) => {
                    let id = ladder.sorted_stages()[pick.index(count)].id.clone();
                    let removed = ladder.remove_stage(&id);
                    prop_assert_eq!(removed, count > MIN_STAGES);
                }
                LadderEdit::Move(from, to) => {
                    prop_assert!(ladder.move_stage(from.index(count), to.index(count)));
                }
            }
            let state = ladder.state();
            prop_assert!(state.stages.len() >= MIN_STAGES);
            for (position, stage) in state.stages.iter().enumerate() {
                prop_assert_eq!(stage.order, position);
            }
            let ids: BTreeSet<_> = state.stages.iter().map(|stage| stage.id.clone()).collect();
            prop_assert_eq!(ids.len(), state.stages.len());
            let defined: BTreeSet<_> = state.stage_definitions.keys().cloned().collect();
            prop_assert_eq!(ids, defined);
        }
    }

    #[test]
    fn trigger_ids_are_never_reissued(edits in prop::collection::vec(trigger_edit(), 0 .. 40)) {
        let mut draft = TriggerSequence::new("Lead (All)");
        let mut issued = BTreeSet::new();
        for edit in edits {
            match edit {
                TriggerEdit::Add => {
                    let id = draft.add_trigger();
                    prop_assert!(issued.insert(id.get()));
                }
                TriggerEdit::Remove(pick) => {
                    if !draft.triggers().is_empty() {
                        let id = draft.triggers()[pick.index(draft.triggers().len())].id;
                        prop_assert!(draft.remove_trigger(id));
                    }
                }
            }
        }
        let mut resumed = TriggerSequence::from_rule(&draft.to_rule_data());
        let next = resumed.add_trigger().get();
        prop_assert!(draft.triggers().iter().all(|trigger| trigger.id.get() < next));
    }
}
