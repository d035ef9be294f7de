// crates/orixa-core/src/runtime/opportunity.rs
// ============================================================================
// Module: Opportunity Rule
// Description: Typed triggers that convert a funnel stage into an opportunity.
// Purpose: Edit a trigger sequence draft and persist the single saved rule.
// Dependencies: crate::{core, interfaces}, rule-logic, serde
// ============================================================================

//! ## Overview
//! A [`TriggerSequence`] is the editable draft: ordered triggers joined by
//! AND/OR gap operators, plus the from-stage. [`OpportunityStore`] holds at
//! most one saved [`OpportunityRule`]; saving replaces it wholesale and
//! deleting clears it.
//!
//! Trigger ids come from a counter stored with the draft. The counter starts
//! above the highest id present, so ids are never reused after a removal.
//! Removing a trigger leaves gap operators untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroU64;

use rule_logic::Combinator;
use rule_logic::GapOperators;
use serde::Deserialize;
use serde::Serialize;

use crate::core::catalog::TriggerCatalog;
use crate::core::catalog::TriggerKind;
use crate::core::identifiers::TriggerId;
use crate::core::time::Timestamp;
use crate::interfaces::EngineHooks;
use crate::interfaces::EngineKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Stage every opportunity rule converts into.
pub const OPPORTUNITY_STAGE: &str = "Opportunity";

/// Preview text when no trigger has a kind.
pub const NO_TRIGGERS_PREVIEW: &str = "No triggers defined yet";

// ============================================================================
// SECTION: Trigger
// ============================================================================

/// One typed trigger.
///
/// # Invariants
/// - Changing `kind` clears `condition`, `number`, `source`, and `target`.
/// - Changing `source` clears `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    /// Trigger identifier.
    pub id: TriggerId,
    /// Trigger kind, unset on creation.
    #[serde(rename = "type", default, with = "crate::core::blank")]
    pub kind: Option<TriggerKind>,
    /// Condition phrase for the kind.
    #[serde(default)]
    pub condition: String,
    /// Free-form count or duration.
    #[serde(default)]
    pub number: String,
    /// Source for the kind.
    #[serde(default)]
    pub source: String,
    /// Target within the source.
    #[serde(default)]
    pub target: String,
}

impl Trigger {
    /// Creates an empty trigger.
    #[must_use]
    pub const fn empty(id: TriggerId) -> Self {
        Self {
            id,
            kind: None,
            condition: String::new(),
            number: String::new(),
            source: String::new(),
            target: String::new(),
        }
    }

    /// Preview fragment; `None` when the kind is unset.
    #[must_use]
    pub fn preview(&self) -> Option<String> {
        let kind = self.kind?;
        let mut text = kind.label().to_string();
        if !self.condition.is_empty() {
            text.push_str(" - ");
            text.push_str(&self.condition);
        }
        if !self.number.is_empty() {
            text.push(' ');
            text.push_str(&self.number);
        }
        if !self.target.is_empty() {
            text.push_str(" from ");
            text.push_str(&self.target);
        }
        Some(text)
    }
}

/// One trigger attribute update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum TriggerField {
    /// Sets the kind; clears every dependent attribute.
    #[serde(rename = "type")]
    Kind(Option<TriggerKind>),
    /// Sets the condition phrase.
    Condition(String),
    /// Sets the number.
    Number(String),
    /// Sets the source; clears the target.
    Source(String),
    /// Sets the target.
    Target(String),
}

// ============================================================================
// SECTION: Rule Data
// ============================================================================

/// Trigger rule content as saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityRuleData {
    /// Triggers in display order.
    pub triggers: Vec<Trigger>,
    /// Gap operators between triggers.
    #[serde(default)]
    pub operators: GapOperators,
    /// Funnel stage the rule starts from.
    pub from_stage: String,
    /// Target stage, always [`OPPORTUNITY_STAGE`].
    pub to_stage: String,
}

/// Saved opportunity rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityRule {
    /// Rule content.
    pub rule: OpportunityRuleData,
    /// Save time, persisted as RFC 3339.
    #[serde(with = "crate::core::time::rfc3339")]
    pub saved_at: Timestamp,
}

// ============================================================================
// SECTION: Trigger Sequence
// ============================================================================

/// Editable trigger rule draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSequence {
    /// Triggers in display order.
    triggers: Vec<Trigger>,
    /// Gap operators between triggers.
    operators: GapOperators,
    /// Funnel stage the rule starts from.
    from_stage: String,
    /// Next trigger id.
    next_id: NonZeroU64,
}

impl TriggerSequence {
    /// Creates an empty draft starting from `from_stage`.
    #[must_use]
    pub fn new(from_stage: impl Into<String>) -> Self {
        Self {
            triggers: Vec::new(),
            operators: GapOperators::new(),
            from_stage: from_stage.into(),
            next_id: NonZeroU64::MIN,
        }
    }

    /// Creates an empty draft using the catalog's default from-stage.
    #[must_use]
    pub fn from_catalog(catalog: &TriggerCatalog) -> Self {
        Self::new(catalog.default_from_stage().unwrap_or_default())
    }

    /// Resumes editing a saved rule.
    #[must_use]
    pub fn from_rule(rule: &OpportunityRuleData) -> Self {
        let highest = rule.triggers.iter().map(|trigger| trigger.id.get()).max().unwrap_or(0);
        let next_id = NonZeroU64::new(highest.saturating_add(1)).unwrap_or(NonZeroU64::MAX);
        Self {
            triggers: rule.triggers.clone(),
            operators: rule.operators.clone(),
            from_stage: rule.from_stage.clone(),
            next_id,
        }
    }

    /// Triggers in display order.
    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Looks up a trigger.
    #[must_use]
    pub fn trigger(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.iter().find(|trigger| trigger.id == id)
    }

    /// Gap operators.
    #[must_use]
    pub const fn operators(&self) -> &GapOperators {
        &self.operators
    }

    /// Combinator at `gap`, defaulting to AND.
    #[must_use]
    pub fn operator(&self, gap: usize) -> Combinator {
        self.operators.get(gap)
    }

    /// Funnel stage the rule starts from.
    #[must_use]
    pub fn from_stage(&self) -> &str {
        &self.from_stage
    }

    /// Sets the from-stage.
    pub fn set_from_stage(&mut self, stage: impl Into<String>) {
        self.from_stage = stage.into();
    }

    /// Appends an empty trigger and returns its id.
    pub fn add_trigger(&mut self) -> TriggerId {
        let id = TriggerId::new(self.next_id);
        self.next_id = self.next_id.checked_add(1).unwrap_or(NonZeroU64::MAX);
        self.triggers.push(Trigger::empty(id));
        id
    }

    /// Applies one attribute update with its cascade.
    pub fn update_trigger(&mut self, id: TriggerId, update: TriggerField) -> bool {
        let Some(trigger) = self.triggers.iter_mut().find(|trigger| trigger.id == id) else {
            return false;
        };
        match update {
            TriggerField::Kind(kind) => {
                trigger.kind = kind;
                trigger.condition.clear();
                trigger.number.clear();
                trigger.source.clear();
                trigger.target.clear();
            }
            TriggerField::Condition(value) => trigger.condition = value,
            TriggerField::Number(value) => trigger.number = value,
            TriggerField::Source(value) => {
                trigger.source = value;
                trigger.target.clear();
            }
            TriggerField::Target(value) => trigger.target = value,
        }
        true
    }

    /// Removes a trigger. Gap operators are not renumbered.
    pub fn remove_trigger(&mut self, id: TriggerId) -> bool {
        let before = self.triggers.len();
        self.triggers.retain(|trigger| trigger.id != id);
        self.triggers.len() != before
    }

    /// Sets the combinator at `gap` without range validation.
    pub fn set_operator(&mut self, gap: usize, combinator: Combinator) {
        self.operators.set(gap, combinator);
    }

    /// Human-readable rule preview.
    ///
    /// Only triggers with a kind appear; the operator before each non-first
    /// part is read at its position in that filtered list.
    #[must_use]
    pub fn preview(&self) -> String {
        let parts: Vec<String> = self
            .triggers
            .iter()
            .filter_map(Trigger::preview)
            .enumerate()
            .map(|(index, text)| {
                if index == 0 { text } else { format!("{} {text}", self.operator(index - 1)) }
            })
            .collect();
        if parts.is_empty() { NO_TRIGGERS_PREVIEW.to_string() } else { parts.join(" ") }
    }

    /// Condition phrases offered for a trigger's kind.
    #[must_use]
    pub fn condition_options<'a>(&self, catalog: &'a TriggerCatalog, id: TriggerId) -> &'a [String] {
        self.trigger(id).and_then(|trigger| trigger.kind).map_or(&[][..], |kind| catalog.conditions_for(kind))
    }

    /// Sources offered for a trigger's kind.
    #[must_use]
    pub fn source_options<'a>(&self, catalog: &'a TriggerCatalog, id: TriggerId) -> Vec<&'a str> {
        self.trigger(id)
            .and_then(|trigger| trigger.kind)
            .map(|kind| catalog.sources_for(kind).collect())
            .unwrap_or_default()
    }

    /// Targets offered for a trigger's kind and source.
    #[must_use]
    pub fn target_options<'a>(&self, catalog: &'a TriggerCatalog, id: TriggerId) -> &'a [String] {
        match self.trigger(id) {
            Some(Trigger {
                kind: Some(kind),
                source,
                ..
            }) => catalog.targets_for(*kind, source),
            _ => &[],
        }
    }

    /// Rule content ready to save.
    #[must_use]
    pub fn to_rule_data(&self) -> OpportunityRuleData {
        OpportunityRuleData {
            triggers: self.triggers.clone(),
            operators: self.operators.clone(),
            from_stage: self.from_stage.clone(),
            to_stage: OPPORTUNITY_STAGE.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Holder of the single saved opportunity rule.
#[derive(Debug, Default)]
pub struct OpportunityStore {
    /// Saved rule, if any.
    saved: Option<OpportunityRule>,
    /// Clock and audit hooks.
    hooks: EngineHooks,
}

impl OpportunityStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new(hooks: EngineHooks) -> Self {
        Self {
            saved: None,
            hooks,
        }
    }

    /// Saved rule, if any.
    #[must_use]
    pub const fn get(&self) -> Option<&OpportunityRule> {
        self.saved.as_ref()
    }

    /// Replaces the saved rule and stamps the save time.
    pub fn save(&mut self, rule: OpportunityRuleData) -> &OpportunityRule {
        let saved_at = self.hooks.now();
        self.hooks.record(EngineKind::Opportunity, "save", &rule.from_stage, true, None);
        self.saved.insert(OpportunityRule {
            rule,
            saved_at,
        })
    }

    /// Clears the saved rule. Returns false when nothing was saved.
    pub fn delete(&mut self) -> bool {
        let removed = self.saved.take().is_some();
        self.hooks.record(EngineKind::Opportunity, "delete", "", removed, None)
    }
}
