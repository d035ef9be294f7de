// crates/rule-logic/src/status.rs
// ============================================================================
// Module: Status Classification
// Description: Tri-state completeness status for concepts, stages, and ladders.
// Purpose: Derive status as a pure function of current rule data.
// Dependencies: crate::condition, serde
// ============================================================================

//! ## Overview
//! Three derivations share the [`ConfigurationStatus`] value but use different
//! predicates:
//! - [`concept_status`]: definition, source and one complete condition.
//! - [`stage_status`]: definition plus entry conditions, with the first stage
//!   exempt from entry conditions.
//! - [`ladder_status`]: every stage needs a definition, entry conditions
//!   (unless first) and an exit rule (unless last).
//!
//! The per-stage predicate inside [`ladder_status`] is stricter than
//! [`stage_status`]; the two are kept separate on purpose.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::condition::ConditionSet;

// ============================================================================
// SECTION: Status Value
// ============================================================================

/// Completeness status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigurationStatus {
    /// Fully configured.
    Defined,
    /// Partially configured.
    NeedsAttention,
    /// Nothing configured yet.
    #[default]
    NotConfigured,
}

impl ConfigurationStatus {
    /// Stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Defined => "defined",
            Self::NeedsAttention => "needs_attention",
            Self::NotConfigured => "not_configured",
        }
    }

    /// Human-readable badge text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Defined => "Defined",
            Self::NeedsAttention => "Needs attention",
            Self::NotConfigured => "Not configured",
        }
    }
}

impl fmt::Display for ConfigurationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when `text` has non-whitespace content.
fn has_text(text: &str) -> bool {
    !text.trim().is_empty()
}

// ============================================================================
// SECTION: Concept Status
// ============================================================================

/// Derives a concept's status.
///
/// `defined` needs definition, source and a complete condition. Any one of
/// those, or non-blank constraints, yields `needs_attention`.
#[must_use]
pub fn concept_status(
    definition: &str,
    source: &str,
    conditions: &ConditionSet,
    constraints: &str,
) -> ConfigurationStatus {
    let has_definition = has_text(definition);
    let has_source = has_text(source);
    let has_conditions = conditions.has_complete_condition();

    if has_definition && has_source && has_conditions {
        return ConfigurationStatus::Defined;
    }
    if has_definition || has_source || has_conditions || has_text(constraints) {
        return ConfigurationStatus::NeedsAttention;
    }
    ConfigurationStatus::NotConfigured
}

// ============================================================================
// SECTION: Stage Status
// ============================================================================

/// Derives the standalone status of one stage card.
///
/// The first stage has no predecessor and needs no entry conditions.
#[must_use]
pub fn stage_status(definition: &str, entry: &ConditionSet, is_first: bool) -> ConfigurationStatus {
    let has_definition = has_text(definition);
    let has_entry = entry.has_complete_condition();

    if has_definition && (has_entry || is_first) {
        return ConfigurationStatus::Defined;
    }
    if has_definition || has_entry {
        return ConfigurationStatus::NeedsAttention;
    }
    ConfigurationStatus::NotConfigured
}

// ============================================================================
// SECTION: Ladder Status
// ============================================================================

/// Per-stage inputs for [`ladder_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderStageSignals {
    /// Definition text is non-blank.
    pub has_definition: bool,
    /// At least one complete entry condition.
    pub has_entry: bool,
    /// Number of exit rules on the stage.
    pub exit_rule_count: usize,
    /// Stage sits at order 0.
    pub is_first: bool,
    /// Stage sits at the last order.
    pub is_last: bool,
}

impl LadderStageSignals {
    /// Builds signals from stage definition parts.
    #[must_use]
    pub fn from_parts(
        definition: &str,
        entry: &ConditionSet,
        exit_rule_count: usize,
        is_first: bool,
        is_last: bool,
    ) -> Self {
        Self {
            has_definition: has_text(definition),
            has_entry: entry.has_complete_condition(),
            exit_rule_count,
            is_first,
            is_last,
        }
    }

    /// Applies the ladder-wide per-stage predicate.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        let has_exit = self.is_last || self.exit_rule_count > 0;
        self.has_definition && (self.has_entry || self.is_first) && has_exit
    }
}

/// Derives the whole ladder's status.
///
/// Each slot is one stage; `None` marks a stage without a definition record.
/// Fewer than two stages is always `not_configured`.
#[must_use]
pub fn ladder_status(stages: &[Option<LadderStageSignals>]) -> ConfigurationStatus {
    if stages.len() < 2 {
        return ConfigurationStatus::NotConfigured;
    }

    let mut any_defined = false;
    let mut all_defined = true;
    for signals in stages {
        match signals {
            Some(signals) if signals.is_defined() => any_defined = true,
            _ => all_defined = false,
        }
    }

    if all_defined {
        ConfigurationStatus::Defined
    } else if any_defined {
        ConfigurationStatus::NeedsAttention
    } else {
        ConfigurationStatus::NotConfigured
    }
}
