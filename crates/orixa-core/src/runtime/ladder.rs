// crates/orixa-core/src/runtime/ladder.rs
// ============================================================================
// Module: Adoption Ladder
// Description: Ordered adoption stages with entry criteria and exit rules.
// Purpose: Maintain stage structure, per-stage rules, and ladder completeness.
// Dependencies: crate::{core, interfaces}, rule-logic, serde
// ============================================================================

//! ## Overview
//! The ladder is an aggregate root over an ordered stage list and one
//! [`StageDefinition`] per stage.
//!
//! Invariants:
//! - At least [`MIN_STAGES`] stages; removals below the floor are refused.
//! - Stage `order` values are dense (`0..N`) and match list position.
//! - Exit rule targets are weak references: removing a stage clears every
//!   `moves_to` that pointed at it.
//! - `configuration_status` is recomputed after every applied mutation.
//!
//! `allow_backward` only filters [`AdoptionLadder::move_to_options`]; stored
//! targets are never invalidated when the setting changes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use rule_logic::Combinator;
use rule_logic::ConditionField;
use rule_logic::ConditionId;
use rule_logic::ConditionSet;
use rule_logic::ConfigurationStatus;
use rule_logic::IdSource;
use rule_logic::LadderStageSignals;
use rule_logic::SequenceIds;
use rule_logic::SourceBinding;
use rule_logic::ladder_status;
use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ExitRuleId;
use crate::core::identifiers::StageId;
use crate::interfaces::EngineHooks;
use crate::interfaces::EngineKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum number of stages a ladder keeps.
pub const MIN_STAGES: usize = 2;

/// Stage names of a freshly created ladder.
pub const DEFAULT_STAGE_NAMES: [&str; 6] =
    ["Unaware", "Aware", "Interested", "Trialist", "Adopter", "Advocate"];

// ============================================================================
// SECTION: Stage Data
// ============================================================================

/// One adoption stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage identifier.
    pub id: StageId,
    /// Display name.
    pub name: String,
    /// Dense sort key.
    pub order: usize,
}

/// How a stage is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    /// Assessed by field reps.
    #[default]
    RepAssessed,
    /// Derived from data.
    DataDriven,
    /// Both.
    Hybrid,
}

/// Entry conditions of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryCriteria {
    /// Source and field the conditions read from.
    #[serde(flatten)]
    pub binding: SourceBinding,
    /// Entry conditions.
    pub rule: ConditionSet,
}

/// Transition out of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRule {
    /// Exit rule identifier.
    pub id: ExitRuleId,
    /// Source and field the conditions read from.
    #[serde(flatten)]
    pub binding: SourceBinding,
    /// Exit conditions.
    pub rule: ConditionSet,
    /// Target stage, cleared when that stage is removed; `""` when unset.
    #[serde(default, with = "crate::core::blank")]
    pub moves_to: Option<StageId>,
}

impl ExitRule {
    /// Creates an empty exit rule.
    #[must_use]
    pub const fn empty(id: ExitRuleId) -> Self {
        Self {
            id,
            binding: SourceBinding::new(),
            rule: ConditionSet::new(),
            moves_to: None,
        }
    }
}

/// Operational guidance attached to a stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperationalContext {
    /// Expected time spent in the stage.
    pub expected_duration: String,
    /// Duration after which an entity is flagged as stuck.
    pub flag_stuck_after: String,
    /// Known barriers.
    pub key_barriers: String,
    /// Recommended actions.
    pub recommended_actions: String,
}

/// Attribute of [`OperationalContext`] targeted by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalField {
    /// Expected duration.
    ExpectedDuration,
    /// Flag stuck after.
    FlagStuckAfter,
    /// Key barriers.
    KeyBarriers,
    /// Recommended actions.
    RecommendedActions,
}

/// Attribute of a [`SourceBinding`] targeted by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingField {
    /// Source name. Clears the field.
    Source,
    /// Field within the source.
    SourceField,
}

impl BindingField {
    /// Applies `value` to `binding`.
    fn apply(self, binding: &mut SourceBinding, value: String) {
        match self {
            Self::Source => binding.set_source(value),
            Self::SourceField => binding.set_field(value),
        }
    }
}

/// Rule configuration of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Definition text.
    pub definition: String,
    /// Detection method.
    pub detection_method: DetectionMethod,
    /// Entry criteria.
    pub entry_criteria: EntryCriteria,
    /// Exit rules in display order.
    pub exit_rules: Vec<ExitRule>,
    /// Operational context.
    pub operational_context: OperationalContext,
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Ladder-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderSettings {
    /// Configure one ladder per product.
    pub per_product: bool,
    /// Product selected when `per_product` is on.
    pub selected_product: Option<String>,
    /// Offer earlier stages as exit targets.
    pub allow_backward: bool,
}

impl Default for LadderSettings {
    fn default() -> Self {
        Self {
            per_product: false,
            selected_product: None,
            allow_backward: true,
        }
    }
}

/// One settings update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "setting", content = "value", rename_all = "snake_case")]
pub enum LadderSetting {
    /// Sets `per_product`.
    PerProduct(bool),
    /// Sets `selected_product`.
    SelectedProduct(Option<String>),
    /// Sets `allow_backward`.
    AllowBackward(bool),
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Serializable ladder snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderState {
    /// Stages sorted by `order`.
    pub stages: Vec<Stage>,
    /// Ladder settings.
    pub settings: LadderSettings,
    /// Stage definitions keyed by stage id.
    pub stage_definitions: BTreeMap<StageId, StageDefinition>,
    /// Derived ladder-wide status.
    pub configuration_status: ConfigurationStatus,
}

/// Derives the ladder-wide status of `state`.
#[must_use]
pub fn compute_ladder_status(state: &LadderState) -> ConfigurationStatus {
    let last = state.stages.len().saturating_sub(1);
    let signals: Vec<Option<LadderStageSignals>> = state
        .stages
        .iter()
        .map(|stage| {
            state.stage_definitions.get(&stage.id).map(|definition| {
                LadderStageSignals::from_parts(
                    &definition.definition,
                    &definition.entry_criteria.rule,
                    definition.exit_rules.len(),
                    stage.order == 0,
                    stage.order == last,
                )
            })
        })
        .collect();
    ladder_status(&signals)
}

// ============================================================================
// SECTION: Adoption Ladder
// ============================================================================

/// Adoption ladder engine.
pub struct AdoptionLadder {
    /// Current state.
    state: LadderState,
    /// Next `stage-{n}` sequence number.
    next_stage: u64,
    /// Condition and exit rule id source.
    ids: Box<dyn IdSource + Send>,
    /// Clock and audit hooks.
    hooks: EngineHooks,
}

impl AdoptionLadder {
    /// Creates the default six-stage ladder.
    #[must_use]
    pub fn new(ids: Box<dyn IdSource + Send>, hooks: EngineHooks) -> Self {
        let stages = DEFAULT_STAGE_NAMES.iter().enumerate().map(|(order, name)| (order, *name));
        Self::build(stages, ids, hooks)
    }

    /// Creates a ladder from stage names; `None` when fewer than
    /// [`MIN_STAGES`] names are given.
    #[must_use]
    pub fn from_stage_names<S: AsRef<str>>(
        names: &[S],
        ids: Box<dyn IdSource + Send>,
        hooks: EngineHooks,
    ) -> Option<Self> {
        if names.len() < MIN_STAGES {
            return None;
        }
        let stages = names.iter().enumerate().map(|(order, name)| (order, name.as_ref()));
        Some(Self::build(stages, ids, hooks))
    }

    /// Builds stages `stage-1..` from `(order, name)` pairs.
    fn build<'a>(
        stages: impl Iterator<Item = (usize, &'a str)>,
        ids: Box<dyn IdSource + Send>,
        hooks: EngineHooks,
    ) -> Self {
        let mut state = LadderState {
            stages: Vec::new(),
            settings: LadderSettings::default(),
            stage_definitions: BTreeMap::new(),
            configuration_status: ConfigurationStatus::NotConfigured,
        };
        let mut next_stage = 1;
        for (order, name) in stages {
            let id = StageId::numbered(next_stage);
            next_stage += 1;
            state.stage_definitions.insert(id.clone(), StageDefinition::default());
            state.stages.push(Stage {
                id,
                name: name.to_string(),
                order,
            });
        }
        state.configuration_status = compute_ladder_status(&state);
        Self {
            state,
            next_stage,
            ids,
            hooks,
        }
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Current state snapshot.
    #[must_use]
    pub const fn state(&self) -> &LadderState {
        &self.state
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &LadderSettings {
        &self.state.settings
    }

    /// Ladder-wide status.
    #[must_use]
    pub const fn configuration_status(&self) -> ConfigurationStatus {
        self.state.configuration_status
    }

    /// Stages sorted by `order`.
    #[must_use]
    pub fn sorted_stages(&self) -> Vec<&Stage> {
        let mut stages: Vec<&Stage> = self.state.stages.iter().collect();
        stages.sort_by_key(|stage| stage.order);
        stages
    }

    /// Looks up a stage by id.
    #[must_use]
    pub fn stage(&self, id: &StageId) -> Option<&Stage> {
        self.state.stages.iter().find(|stage| &stage.id == id)
    }

    /// Looks up the first stage with `name`.
    #[must_use]
    pub fn stage_by_name(&self, name: &str) -> Option<&Stage> {
        self.state.stages.iter().find(|stage| stage.name == name)
    }

    /// Looks up a stage definition.
    #[must_use]
    pub fn definition(&self, id: &StageId) -> Option<&StageDefinition> {
        self.state.stage_definitions.get(id)
    }

    /// Standalone status of one stage card.
    #[must_use]
    pub fn stage_status(&self, id: &StageId) -> Option<ConfigurationStatus> {
        let stage = self.stage(id)?;
        let status = self.definition(id).map_or(ConfigurationStatus::NotConfigured, |definition| {
            rule_logic::stage_status(
                &definition.definition,
                &definition.entry_criteria.rule,
                stage.order == 0,
            )
        });
        Some(status)
    }

    /// Stages offered as exit targets for `id`, sorted by `order`.
    ///
    /// Excludes the stage itself; without `allow_backward` only later stages
    /// are offered.
    #[must_use]
    pub fn move_to_options(&self, id: &StageId) -> Vec<&Stage> {
        let Some(current) = self.stage(id) else {
            return Vec::new();
        };
        let allow_backward = self.state.settings.allow_backward;
        self.sorted_stages()
            .into_iter()
            .filter(|stage| stage.id != current.id)
            .filter(|stage| allow_backward || stage.order > current.order)
            .collect()
    }

    // ------------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------------

    /// Appends a stage; blank or missing names become `Stage {n}`.
    pub fn add_stage(&mut self, name: Option<&str>) -> StageId {
        let order = self.state.stages.len();
        let name = name
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("Stage {}", order + 1), str::to_string);
        let id = StageId::numbered(self.next_stage);
        self.next_stage = self.next_stage.saturating_add(1);
        self.state.stage_definitions.insert(id.clone(), StageDefinition::default());
        self.state.stages.push(Stage {
            id: id.clone(),
            name,
            order,
        });
        self.finish("add_stage", id.as_str(), true);
        id
    }

    /// Removes a stage, re-densifies orders, and clears exit targets that
    /// pointed at it. Refused at the [`MIN_STAGES`] floor.
    pub fn remove_stage(&mut self, id: &StageId) -> bool {
        let known = self.stage(id).is_some();
        if !known || self.state.stages.len() <= MIN_STAGES {
            return self.finish("remove_stage", id.as_str(), false);
        }
        self.state.stages.retain(|stage| &stage.id != id);
        self.redensify();
        self.state.stage_definitions.remove(id);
        for definition in self.state.stage_definitions.values_mut() {
            for rule in &mut definition.exit_rules {
                if rule.moves_to.as_ref() == Some(id) {
                    rule.moves_to = None;
                }
            }
        }
        self.finish("remove_stage", id.as_str(), true)
    }

    /// Renames a stage.
    pub fn rename_stage(&mut self, id: &StageId, name: impl Into<String>) -> bool {
        let applied = match self.state.stages.iter_mut().find(|stage| &stage.id == id) {
            Some(stage) => {
                stage.name = name.into();
                true
            }
            None => false,
        };
        self.finish("rename_stage", id.as_str(), applied)
    }

    /// Reorders stages to match `ordered`, which must list every stage id
    /// exactly once.
    pub fn reorder(&mut self, ordered: &[StageId]) -> bool {
        let Some(stages) = self.permuted(ordered) else {
            return self.finish("reorder", "", false);
        };
        self.state.stages = stages;
        for (order, stage) in self.state.stages.iter_mut().enumerate() {
            stage.order = order;
        }
        self.finish("reorder", "", true)
    }

    /// Moves the stage at sorted position `from` to position `to`.
    pub fn move_stage(&mut self, from: usize, to: usize) -> bool {
        let mut ordered: Vec<StageId> =
            self.sorted_stages().into_iter().map(|stage| stage.id.clone()).collect();
        if from >= ordered.len() || to >= ordered.len() {
            return self.finish("move_stage", "", false);
        }
        let moved = ordered.remove(from);
        ordered.insert(to, moved);
        self.reorder(&ordered)
    }

    /// Applies one settings update.
    pub fn update_setting(&mut self, setting: LadderSetting) -> bool {
        let settings = &mut self.state.settings;
        match setting {
            LadderSetting::PerProduct(value) => settings.per_product = value,
            LadderSetting::SelectedProduct(value) => settings.selected_product = value,
            LadderSetting::AllowBackward(value) => settings.allow_backward = value,
        }
        self.finish("update_setting", "", true)
    }

    // ------------------------------------------------------------------------
    // Stage Definition
    // ------------------------------------------------------------------------

    /// Sets a stage's definition text.
    pub fn set_stage_definition(&mut self, id: &StageId, text: impl Into<String>) -> bool {
        let text = text.into();
        self.edit_definition("set_stage_definition", id, |definition, _| {
            definition.definition = text;
            Some(())
        })
        .is_some()
    }

    /// Sets a stage's detection method.
    pub fn set_detection_method(&mut self, id: &StageId, method: DetectionMethod) -> bool {
        self.edit_definition("set_detection_method", id, |definition, _| {
            definition.detection_method = method;
            Some(())
        })
        .is_some()
    }

    /// Sets one operational context field.
    pub fn update_operational_context(
        &mut self,
        id: &StageId,
        field: OperationalField,
        value: impl Into<String>,
    ) -> bool {
        let value = value.into();
        self.edit_definition("update_operational_context", id, |definition, _| {
            let context = &mut definition.operational_context;
            match field {
                OperationalField::ExpectedDuration => context.expected_duration = value,
                OperationalField::FlagStuckAfter => context.flag_stuck_after = value,
                OperationalField::KeyBarriers => context.key_barriers = value,
                OperationalField::RecommendedActions => context.recommended_actions = value,
            }
            Some(())
        })
        .is_some()
    }

    // ------------------------------------------------------------------------
    // Entry Criteria
    // ------------------------------------------------------------------------

    /// Sets the entry criteria source or field.
    pub fn update_entry_binding(
        &mut self,
        id: &StageId,
        field: BindingField,
        value: impl Into<String>,
    ) -> bool {
        let value = value.into();
        self.edit_definition("update_entry_binding", id, |definition, _| {
            field.apply(&mut definition.entry_criteria.binding, value);
            Some(())
        })
        .is_some()
    }

    /// Appends an empty entry condition.
    pub fn add_entry_condition(&mut self, id: &StageId) -> Option<ConditionId> {
        self.edit_definition("add_entry_condition", id, |definition, ids| {
            Some(definition.entry_criteria.rule.add(ids))
        })
    }

    /// Removes an entry condition.
    pub fn remove_entry_condition(&mut self, id: &StageId, condition: ConditionId) -> bool {
        self.edit_definition("remove_entry_condition", id, |definition, _| {
            definition.entry_criteria.rule.remove(condition).then_some(())
        })
        .is_some()
    }

    /// Updates one attribute of an entry condition.
    pub fn update_entry_condition(
        &mut self,
        id: &StageId,
        condition: ConditionId,
        field: ConditionField,
        value: impl Into<String>,
    ) -> bool {
        let value = value.into();
        self.edit_definition("update_entry_condition", id, |definition, _| {
            definition.entry_criteria.rule.update(condition, field, value).then_some(())
        })
        .is_some()
    }

    /// Sets an entry criteria gap operator.
    pub fn set_entry_operator(&mut self, id: &StageId, gap: usize, combinator: Combinator) -> bool {
        self.edit_definition("set_entry_operator", id, |definition, _| {
            definition.entry_criteria.rule.set_operator(gap, combinator);
            Some(())
        })
        .is_some()
    }

    // ------------------------------------------------------------------------
    // Exit Rules
    // ------------------------------------------------------------------------

    /// Appends an empty exit rule.
    pub fn add_exit_rule(&mut self, id: &StageId) -> Option<ExitRuleId> {
        self.edit_definition("add_exit_rule", id, |definition, ids| {
            let rule_id = ExitRuleId::new(ids.next_id());
            definition.exit_rules.push(ExitRule::empty(rule_id));
            Some(rule_id)
        })
    }

    /// Removes an exit rule.
    pub fn remove_exit_rule(&mut self, id: &StageId, rule: ExitRuleId) -> bool {
        self.edit_definition("remove_exit_rule", id, |definition, _| {
            let before = definition.exit_rules.len();
            definition.exit_rules.retain(|existing| existing.id != rule);
            (definition.exit_rules.len() != before).then_some(())
        })
        .is_some()
    }

    /// Sets or clears an exit rule's target stage.
    ///
    /// Targets must be another existing stage; the `allow_backward` setting
    /// is not enforced here.
    pub fn set_exit_target(&mut self, id: &StageId, rule: ExitRuleId, target: Option<StageId>) -> bool {
        let valid = target.as_ref().is_none_or(|target| target != id && self.stage(target).is_some());
        if !valid {
            return self.finish("set_exit_target", id.as_str(), false);
        }
        self.edit_exit_rule("set_exit_target", id, rule, |exit_rule, _| {
            exit_rule.moves_to = target;
            Some(())
        })
        .is_some()
    }

    /// Sets an exit rule's source or field.
    pub fn update_exit_binding(
        &mut self,
        id: &StageId,
        rule: ExitRuleId,
        field: BindingField,
        value: impl Into<String>,
    ) -> bool {
        let value = value.into();
        self.edit_exit_rule("update_exit_binding", id, rule, |exit_rule, _| {
            field.apply(&mut exit_rule.binding, value);
            Some(())
        })
        .is_some()
    }

    /// Appends an empty condition to an exit rule.
    pub fn add_exit_condition(&mut self, id: &StageId, rule: ExitRuleId) -> Option<ConditionId> {
        self.edit_exit_rule("add_exit_condition", id, rule, |exit_rule, ids| Some(exit_rule.rule.add(ids)))
    }

    /// Removes a condition from an exit rule.
    pub fn remove_exit_condition(&mut self, id: &StageId, rule: ExitRuleId, condition: ConditionId) -> bool {
        self.edit_exit_rule("remove_exit_condition", id, rule, |exit_rule, _| {
            exit_rule.rule.remove(condition).then_some(())
        })
        .is_some()
    }

    /// Updates one attribute of an exit rule condition.
    pub fn update_exit_condition(
        &mut self,
        id: &StageId,
        rule: ExitRuleId,
        condition: ConditionId,
        field: ConditionField,
        value: impl Into<String>,
    ) -> bool {
        let value = value.into();
        self.edit_exit_rule("update_exit_condition", id, rule, |exit_rule, _| {
            exit_rule.rule.update(condition, field, value).then_some(())
        })
        .is_some()
    }

    /// Sets an exit rule gap operator.
    pub fn set_exit_operator(
        &mut self,
        id: &StageId,
        rule: ExitRuleId,
        gap: usize,
        combinator: Combinator,
    ) -> bool {
        self.edit_exit_rule("set_exit_operator", id, rule, |exit_rule, _| {
            exit_rule.rule.set_operator(gap, combinator);
            Some(())
        })
        .is_some()
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Builds the stage list in `ordered` sequence when it is a permutation
    /// of the current stage ids.
    fn permuted(&self, ordered: &[StageId]) -> Option<Vec<Stage>> {
        if ordered.len() != self.state.stages.len() {
            return None;
        }
        let mut stages = Vec::with_capacity(ordered.len());
        for (position, id) in ordered.iter().enumerate() {
            if ordered[.. position].contains(id) {
                return None;
            }
            stages.push(self.stage(id)?.clone());
        }
        Some(stages)
    }

    /// Sorts stages by current order and rewrites orders to `0..N`.
    fn redensify(&mut self) {
        self.state.stages.sort_by_key(|stage| stage.order);
        for (order, stage) in self.state.stages.iter_mut().enumerate() {
            stage.order = order;
        }
    }

    /// Runs `edit` against one stage definition.
    fn edit_definition<R>(
        &mut self,
        operation: &str,
        id: &StageId,
        edit: impl FnOnce(&mut StageDefinition, &mut dyn IdSource) -> Option<R>,
    ) -> Option<R> {
        let ids: &mut dyn IdSource = &mut *self.ids;
        let result = self.state.stage_definitions.get_mut(id).and_then(|definition| edit(definition, ids));
        self.finish(operation, id.as_str(), result.is_some());
        result
    }

    /// Runs `edit` against one exit rule of a stage.
    fn edit_exit_rule<R>(
        &mut self,
        operation: &str,
        id: &StageId,
        rule: ExitRuleId,
        edit: impl FnOnce(&mut ExitRule, &mut dyn IdSource) -> Option<R>,
    ) -> Option<R> {
        self.edit_definition(operation, id, |definition, ids| {
            definition
                .exit_rules
                .iter_mut()
                .find(|exit_rule| exit_rule.id == rule)
                .and_then(|exit_rule| edit(exit_rule, ids))
        })
    }

    /// Recomputes status when applied and records the audit event.
    fn finish(&mut self, operation: &str, target: &str, applied: bool) -> bool {
        if applied {
            self.state.configuration_status = compute_ladder_status(&self.state);
        }
        self.hooks.record(
            EngineKind::Ladder,
            operation,
            target,
            applied,
            Some(self.state.configuration_status),
        )
    }
}

impl Default for AdoptionLadder {
    fn default() -> Self {
        Self::new(Box::new(SequenceIds::new()), EngineHooks::default())
    }
}

impl fmt::Debug for AdoptionLadder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdoptionLadder")
            .field("state", &self.state)
            .field("next_stage", &self.next_stage)
            .finish_non_exhaustive()
    }
}
