// crates/rule-logic/src/lib.rs
// ============================================================================
// Module: Rule Logic Root
// Description: Public API surface for the rule configuration engine.
// Purpose: Wire together condition sets, source bindings, and status derivation.
// Dependencies: crate::{binding, condition, identifiers, status, summary}
// ============================================================================

//! ## Overview
//! `rule-logic` is the source-agnostic rule configuration engine shared by every
//! configurator in the platform. A rule is built from a [`SourceBinding`], an
//! ordered [`ConditionSet`] and the AND/OR [`Combinator`] stored at each gap
//! between consecutive conditions. Status derivations are pure functions of the
//! rule data and never cached.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod binding;
pub mod condition;
pub mod identifiers;
pub mod status;
pub mod summary;

#[cfg(test)]
mod tests;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use binding::SourceBinding;
pub use binding::SourceCatalog;
pub use binding::SourceFields;
pub use condition::Combinator;
pub use condition::Condition;
pub use condition::ConditionField;
pub use condition::ConditionSet;
pub use condition::GapOperators;
pub use identifiers::ConditionId;
pub use identifiers::IdSource;
pub use identifiers::SequenceIds;
pub use status::ConfigurationStatus;
pub use status::LadderStageSignals;
pub use status::concept_status;
pub use status::ladder_status;
pub use status::stage_status;
pub use summary::NO_RULES_SUMMARY;
pub use summary::rule_summary;
