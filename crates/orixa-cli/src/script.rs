// crates/orixa-cli/src/script.rs
// ============================================================================
// Module: Replay Scripts
// Description: JSON command scripts applied to a fresh engine workspace.
// Purpose: Drive every engine operation from the command line.
// Dependencies: orixa-core, orixa-config, rule-logic, serde, thiserror
// ============================================================================

//! ## Overview
//! A replay script is a JSON document `{ "steps": [...] }` where each step is
//! one engine operation tagged by `op`. [`Workspace`] owns one instance of
//! every engine plus the per-domain mapping drafts and applies steps in
//! order. Engine operations are total, so an unknown id yields a step with
//! `applied = false` rather than an error. Only an upload the mapping flow
//! rejects stops the replay.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use orixa_config::ConfigError;
use orixa_config::LadderConfig;
use orixa_config::OrixaConfig;
use orixa_core::AdoptionLadder;
use orixa_core::BindingField;
use orixa_core::Catalogs;
use orixa_core::ColumnMapping;
use orixa_core::Concept;
use orixa_core::ConceptField;
use orixa_core::ConceptId;
use orixa_core::ConceptRegistry;
use orixa_core::DetectionMethod;
use orixa_core::EngineHooks;
use orixa_core::ExitRuleId;
use orixa_core::FieldMatcher;
use orixa_core::LadderSetting;
use orixa_core::LadderSettings;
use orixa_core::LadderState;
use orixa_core::MappingDomain;
use orixa_core::MappingStore;
use orixa_core::OperationalField;
use orixa_core::OpportunityRule;
use orixa_core::OpportunityRuleData;
use orixa_core::OpportunityStore;
use orixa_core::SavedMapping;
use orixa_core::SheetData;
use orixa_core::StageId;
use orixa_core::TriggerField;
use orixa_core::TriggerId;
use orixa_core::TriggerSequence;
use orixa_core::UploadError;
use orixa_core::runtime::mapping::profile_columns;
use orixa_core::runtime::mapping::validate_upload;
use rule_logic::Combinator;
use rule_logic::ConditionField;
use rule_logic::ConditionId;
use rule_logic::SequenceIds;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building a workspace or replaying a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Script JSON did not decode.
    #[error("script parse error: {0}")]
    Parse(String),
    /// Configuration or catalogs failed to load.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Configured ladder stages could not seed a ladder.
    #[error("ladder needs at least {min} stages, got {actual}")]
    LadderTooShort {
        /// Minimum stage count.
        min: usize,
        /// Configured stage count.
        actual: usize,
    },
    /// The mapping flow rejected an upload.
    #[error("step {step}: {source}")]
    Upload {
        /// Zero-based step index.
        step: usize,
        /// Rejection reason.
        source: UploadError,
    },
}

// ============================================================================
// SECTION: Script Model
// ============================================================================

/// Parsed replay script.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Steps in application order.
    pub steps: Vec<ScriptCommand>,
}

impl Script {
    /// Decodes a script from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Parse`] when the bytes are not a valid script.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ScriptError> {
        serde_json::from_slice(bytes).map_err(|err| ScriptError::Parse(err.to_string()))
    }
}

/// One engine operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptCommand {
    // Concepts
    /// Sets a concept text attribute.
    UpdateConcept {
        /// Target concept.
        concept: ConceptId,
        /// Attribute to set.
        field: ConceptField,
        /// New value.
        value: String,
    },
    /// Appends an empty condition to a concept rule.
    AddConceptCondition {
        /// Target concept.
        concept: ConceptId,
    },
    /// Removes a concept condition.
    RemoveConceptCondition {
        /// Target concept.
        concept: ConceptId,
        /// Condition to remove.
        condition: ConditionId,
    },
    /// Sets one attribute of a concept condition.
    UpdateConceptCondition {
        /// Target concept.
        concept: ConceptId,
        /// Condition to edit.
        condition: ConditionId,
        /// Attribute to set.
        field: ConditionField,
        /// New value.
        value: String,
    },
    /// Sets a concept gap operator.
    SetConceptOperator {
        /// Target concept.
        concept: ConceptId,
        /// Gap index.
        gap: usize,
        /// Combinator to store.
        combinator: Combinator,
    },
    /// Replaces a concept definition with `text`.
    ResetDefinition {
        /// Target concept.
        concept: ConceptId,
        /// Replacement definition.
        text: String,
    },
    /// Records a custom default definition.
    SetCustomDefault {
        /// Target concept.
        concept: ConceptId,
        /// Custom default text.
        text: String,
    },
    /// Drops a custom default definition.
    ClearCustomDefault {
        /// Target concept.
        concept: ConceptId,
    },

    // Adoption ladder
    /// Appends a stage.
    AddStage {
        /// Stage name; a numbered default when absent.
        #[serde(default)]
        name: Option<String>,
    },
    /// Removes a stage.
    RemoveStage {
        /// Stage to remove.
        stage: StageId,
    },
    /// Renames a stage.
    RenameStage {
        /// Stage to rename.
        stage: StageId,
        /// New name.
        name: String,
    },
    /// Moves the stage at position `from` to position `to`.
    MoveStage {
        /// Source position.
        from: usize,
        /// Destination position.
        to: usize,
    },
    /// Reorders stages to the given permutation.
    ReorderStages {
        /// Every stage id in the new order.
        stages: Vec<StageId>,
    },
    /// Applies one ladder settings update.
    UpdateLadderSetting {
        /// Settings update.
        change: LadderSetting,
    },
    /// Sets a stage definition text.
    SetStageDefinition {
        /// Target stage.
        stage: StageId,
        /// Definition text.
        text: String,
    },
    /// Sets a stage detection method.
    SetDetectionMethod {
        /// Target stage.
        stage: StageId,
        /// Detection method.
        method: DetectionMethod,
    },
    /// Sets one operational context field.
    UpdateOperationalContext {
        /// Target stage.
        stage: StageId,
        /// Field to set.
        field: OperationalField,
        /// New value.
        value: String,
    },
    /// Sets the entry criteria source or field.
    UpdateEntryBinding {
        /// Target stage.
        stage: StageId,
        /// Binding attribute.
        field: BindingField,
        /// New value.
        value: String,
    },
    /// Appends an entry condition.
    AddEntryCondition {
        /// Target stage.
        stage: StageId,
    },
    /// Removes an entry condition.
    RemoveEntryCondition {
        /// Target stage.
        stage: StageId,
        /// Condition to remove.
        condition: ConditionId,
    },
    /// Sets one attribute of an entry condition.
    UpdateEntryCondition {
        /// Target stage.
        stage: StageId,
        /// Condition to edit.
        condition: ConditionId,
        /// Attribute to set.
        field: ConditionField,
        /// New value.
        value: String,
    },
    /// Sets an entry gap operator.
    SetEntryOperator {
        /// Target stage.
        stage: StageId,
        /// Gap index.
        gap: usize,
        /// Combinator to store.
        combinator: Combinator,
    },
    /// Appends an exit rule.
    AddExitRule {
        /// Target stage.
        stage: StageId,
    },
    /// Removes an exit rule.
    RemoveExitRule {
        /// Target stage.
        stage: StageId,
        /// Exit rule to remove.
        rule: ExitRuleId,
    },
    /// Sets or clears an exit rule target.
    SetExitTarget {
        /// Owning stage.
        stage: StageId,
        /// Exit rule to edit.
        rule: ExitRuleId,
        /// Destination stage.
        #[serde(default)]
        target: Option<StageId>,
    },
    /// Sets an exit rule source or field.
    UpdateExitBinding {
        /// Owning stage.
        stage: StageId,
        /// Exit rule to edit.
        rule: ExitRuleId,
        /// Binding attribute.
        field: BindingField,
        /// New value.
        value: String,
    },
    /// Appends an exit condition.
    AddExitCondition {
        /// Owning stage.
        stage: StageId,
        /// Exit rule to edit.
        rule: ExitRuleId,
    },
    /// Removes an exit condition.
    RemoveExitCondition {
        /// Owning stage.
        stage: StageId,
        /// Exit rule to edit.
        rule: ExitRuleId,
        /// Condition to remove.
        condition: ConditionId,
    },
    /// Sets one attribute of an exit condition.
    UpdateExitCondition {
        /// Owning stage.
        stage: StageId,
        /// Exit rule to edit.
        rule: ExitRuleId,
        /// Condition to edit.
        condition: ConditionId,
        /// Attribute to set.
        field: ConditionField,
        /// New value.
        value: String,
    },
    /// Sets an exit gap operator.
    SetExitOperator {
        /// Owning stage.
        stage: StageId,
        /// Exit rule to edit.
        rule: ExitRuleId,
        /// Gap index.
        gap: usize,
        /// Combinator to store.
        combinator: Combinator,
    },

    // Opportunity
    /// Sets the draft's from-stage.
    SetFromStage {
        /// Funnel stage label.
        stage: String,
    },
    /// Appends an empty trigger to the draft.
    AddTrigger,
    /// Removes a draft trigger.
    RemoveTrigger {
        /// Trigger to remove.
        trigger: TriggerId,
    },
    /// Sets one attribute of a draft trigger.
    UpdateTrigger {
        /// Trigger to edit.
        trigger: TriggerId,
        /// Attribute update.
        change: TriggerField,
    },
    /// Sets a draft gap operator.
    SetTriggerOperator {
        /// Gap index.
        gap: usize,
        /// Combinator to store.
        combinator: Combinator,
    },
    /// Saves the draft as the opportunity rule.
    SaveOpportunity,
    /// Deletes the saved opportunity rule.
    DeleteOpportunity,
    /// Loads the saved rule back into the draft.
    EditSavedOpportunity,

    // Column mapping
    /// Validates and profiles an upload, then auto-maps its columns.
    UploadSheet {
        /// Upload domain.
        domain: MappingDomain,
        /// Uploaded file name.
        file_name: String,
        /// Declared MIME type.
        #[serde(default)]
        mime: Option<String>,
        /// File size in bytes.
        size_bytes: u64,
        /// Parsed first sheet.
        sheet: SheetData,
    },
    /// Assigns a system field to a draft mapping row.
    AssignColumn {
        /// Upload domain.
        domain: MappingDomain,
        /// Row index within the mapping.
        row: usize,
        /// System field; `None` leaves the column unmapped.
        #[serde(default)]
        field: Option<String>,
    },
    /// Saves the draft mapping for a domain.
    SaveMapping {
        /// Upload domain.
        domain: MappingDomain,
    },
    /// Deletes the saved mapping for a domain.
    DeleteMapping {
        /// Upload domain.
        domain: MappingDomain,
    },
}

impl ScriptCommand {
    /// Stable operation label, matching the JSON `op` tag.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::UpdateConcept {
                ..
            } => "update_concept",
            Self::AddConceptCondition {
                ..
            } => "add_concept_condition",
            Self::RemoveConceptCondition {
                ..
            } => "remove_concept_condition",
            Self::UpdateConceptCondition {
                ..
            } => "update_concept_condition",
            Self::SetConceptOperator {
                ..
            } => "set_concept_operator",
            Self::ResetDefinition {
                ..
            } => "reset_definition",
            Self::SetCustomDefault {
                ..
            } => "set_custom_default",
            Self::ClearCustomDefault {
                ..
            } => "clear_custom_default",
            Self::AddStage {
                ..
            } => "add_stage",
            Self::RemoveStage {
                ..
            } => "remove_stage",
            Self::RenameStage {
                ..
            } => "rename_stage",
            Self::MoveStage {
                ..
            } => "move_stage",
            Self::ReorderStages {
                ..
            } => "reorder_stages",
            Self::UpdateLadderSetting {
                ..
            } => "update_ladder_setting",
            Self::SetStageDefinition {
                ..
            } => "set_stage_definition",
            Self::SetDetectionMethod {
                ..
            } => "set_detection_method",
            Self::UpdateOperationalContext {
                ..
            } => "update_operational_context",
            Self::UpdateEntryBinding {
                ..
            } => "update_entry_binding",
            Self::AddEntryCondition {
                ..
            } => "add_entry_condition",
            Self::RemoveEntryCondition {
                ..
            } => "remove_entry_condition",
            Self::UpdateEntryCondition {
                ..
            } => "update_entry_condition",
            Self::SetEntryOperator {
                ..
            } => "set_entry_operator",
            Self::AddExitRule {
                ..
            } => "add_exit_rule",
            Self::RemoveExitRule {
                ..
            } => "remove_exit_rule",
            Self::SetExitTarget {
                ..
            } => "set_exit_target",
            Self::UpdateExitBinding {
                ..
            } => "update_exit_binding",
            Self::AddExitCondition {
                ..
            } => "add_exit_condition",
            Self::RemoveExitCondition {
                ..
            } => "remove_exit_condition",
            Self::UpdateExitCondition {
                ..
            } => "update_exit_condition",
            Self::SetExitOperator {
                ..
            } => "set_exit_operator",
            Self::SetFromStage {
                ..
            } => "set_from_stage",
            Self::AddTrigger => "add_trigger",
            Self::RemoveTrigger {
                ..
            } => "remove_trigger",
            Self::UpdateTrigger {
                ..
            } => "update_trigger",
            Self::SetTriggerOperator {
                ..
            } => "set_trigger_operator",
            Self::SaveOpportunity => "save_opportunity",
            Self::DeleteOpportunity => "delete_opportunity",
            Self::EditSavedOpportunity => "edit_saved_opportunity",
            Self::UploadSheet {
                ..
            } => "upload_sheet",
            Self::AssignColumn {
                ..
            } => "assign_column",
            Self::SaveMapping {
                ..
            } => "save_mapping",
            Self::DeleteMapping {
                ..
            } => "delete_mapping",
        }
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of one applied step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Zero-based step index.
    pub step: usize,
    /// Operation label.
    pub op: &'static str,
    /// Whether the step changed state.
    pub applied: bool,
    /// Identifier created by the step, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl StepOutcome {
    /// Outcome carrying only an applied flag.
    const fn flag(step: usize, op: &'static str, applied: bool) -> Self {
        Self {
            step,
            op,
            applied,
            created: None,
        }
    }

    /// Outcome for a step that may have created `id`.
    fn created(step: usize, op: &'static str, id: Option<impl ToString>) -> Self {
        Self {
            step,
            op,
            applied: id.is_some(),
            created: id.map(|id| id.to_string()),
        }
    }
}

/// Serializable view of every engine after a replay.
#[derive(Debug, Serialize)]
pub struct WorkspaceSnapshot<'a> {
    /// Concepts in catalog order.
    pub concepts: &'a [Concept],
    /// Custom default definitions keyed by concept.
    pub custom_defaults: &'a BTreeMap<ConceptId, String>,
    /// Rule summary per concept.
    pub summaries: BTreeMap<&'a ConceptId, String>,
    /// Adoption ladder state.
    pub ladder: &'a LadderState,
    /// Opportunity draft content.
    pub opportunity_draft: OpportunityRuleData,
    /// Opportunity draft preview text.
    pub opportunity_preview: String,
    /// Saved opportunity rule.
    pub opportunity: Option<&'a OpportunityRule>,
    /// Unsaved mappings keyed by domain.
    pub mapping_drafts: &'a BTreeMap<MappingDomain, ColumnMapping>,
    /// Saved mappings keyed by domain.
    pub mappings: BTreeMap<&'a MappingDomain, &'a SavedMapping>,
}

/// Report written by `orixa replay`.
#[derive(Debug, Serialize)]
pub struct ReplayReport<'a> {
    /// Per-step outcomes.
    pub steps: Vec<StepOutcome>,
    /// Final engine state.
    pub state: WorkspaceSnapshot<'a>,
}

// ============================================================================
// SECTION: Workspace
// ============================================================================

/// One instance of every engine sharing the same hooks.
pub struct Workspace {
    /// Static option tables.
    catalogs: Catalogs,
    /// Concept registry.
    concepts: ConceptRegistry,
    /// Adoption ladder.
    ladder: AdoptionLadder,
    /// Opportunity rule draft.
    draft: TriggerSequence,
    /// Saved opportunity rule.
    opportunity: OpportunityStore,
    /// Unsaved column mappings by domain.
    drafts: BTreeMap<MappingDomain, ColumnMapping>,
    /// Saved column mappings.
    mappings: MappingStore,
}

impl Workspace {
    /// Builds a workspace from catalogs, ladder configuration, and hooks.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::LadderTooShort`] when the configured stage list
    /// cannot seed a ladder.
    pub fn new(catalogs: Catalogs, ladder: &LadderConfig, hooks: EngineHooks) -> Result<Self, ScriptError> {
        let concepts =
            ConceptRegistry::new(catalogs.concepts.clone(), Box::new(SequenceIds::new()), hooks.clone());
        let mut adoption =
            AdoptionLadder::from_stage_names(&ladder.stages, Box::new(SequenceIds::new()), hooks.clone())
                .ok_or(ScriptError::LadderTooShort {
                    min: orixa_core::runtime::ladder::MIN_STAGES,
                    actual: ladder.stages.len(),
                })?;
        apply_settings(&mut adoption, &ladder.settings());
        let draft = TriggerSequence::from_catalog(&catalogs.triggers);
        Ok(Self {
            catalogs,
            concepts,
            ladder: adoption,
            draft,
            opportunity: OpportunityStore::new(hooks.clone()),
            drafts: BTreeMap::new(),
            mappings: MappingStore::new(hooks),
        })
    }

    /// Builds a workspace from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Config`] when catalogs or the audit sink fail to
    /// load.
    pub fn from_config(config: &OrixaConfig) -> Result<Self, ScriptError> {
        let catalogs = config.catalogs()?;
        let hooks = config.hooks()?;
        Self::new(catalogs, &config.ladder, hooks)
    }

    /// Concept registry.
    #[must_use]
    pub const fn concepts(&self) -> &ConceptRegistry {
        &self.concepts
    }

    /// Adoption ladder.
    #[must_use]
    pub const fn ladder(&self) -> &AdoptionLadder {
        &self.ladder
    }

    /// Opportunity rule draft.
    #[must_use]
    pub const fn draft(&self) -> &TriggerSequence {
        &self.draft
    }

    /// Saved opportunity rule holder.
    #[must_use]
    pub const fn opportunity(&self) -> &OpportunityStore {
        &self.opportunity
    }

    /// Unsaved mapping for `domain`.
    #[must_use]
    pub fn mapping_draft(&self, domain: &MappingDomain) -> Option<&ColumnMapping> {
        self.drafts.get(domain)
    }

    /// Saved mappings.
    #[must_use]
    pub const fn mappings(&self) -> &MappingStore {
        &self.mappings
    }

    /// Applies every step of `script` in order.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Upload`] for the first rejected upload; earlier
    /// steps stay applied.
    pub fn replay(&mut self, script: Script) -> Result<Vec<StepOutcome>, ScriptError> {
        script.steps.into_iter().enumerate().map(|(step, command)| self.apply(step, command)).collect()
    }

    /// Applies one step.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Upload`] when an `upload_sheet` step is
    /// rejected.
    pub fn apply(&mut self, step: usize, command: ScriptCommand) -> Result<StepOutcome, ScriptError> {
        let op = command.op();
        let outcome = match command {
            ScriptCommand::UpdateConcept {
                concept,
                field,
                value,
            } => StepOutcome::flag(step, op, self.concepts.update(&concept, field, value)),
            ScriptCommand::AddConceptCondition {
                concept,
            } => StepOutcome::created(step, op, self.concepts.add_condition(&concept)),
            ScriptCommand::RemoveConceptCondition {
                concept,
                condition,
            } => StepOutcome::flag(step, op, self.concepts.remove_condition(&concept, condition)),
            ScriptCommand::UpdateConceptCondition {
                concept,
                condition,
                field,
                value,
            } => StepOutcome::flag(step, op, self.concepts.update_condition(&concept, condition, field, value)),
            ScriptCommand::SetConceptOperator {
                concept,
                gap,
                combinator,
            } => StepOutcome::flag(step, op, self.concepts.set_operator(&concept, gap, combinator)),
            ScriptCommand::ResetDefinition {
                concept,
                text,
            } => StepOutcome::flag(step, op, self.concepts.reset_definition(&concept, text)),
            ScriptCommand::SetCustomDefault {
                concept,
                text,
            } => StepOutcome::flag(step, op, self.concepts.set_custom_default(&concept, text)),
            ScriptCommand::ClearCustomDefault {
                concept,
            } => StepOutcome::flag(step, op, self.concepts.clear_custom_default(&concept)),
            ScriptCommand::AddStage {
                name,
            } => StepOutcome::created(step, op, Some(self.ladder.add_stage(name.as_deref()))),
            ScriptCommand::RemoveStage {
                stage,
            } => StepOutcome::flag(step, op, self.ladder.remove_stage(&stage)),
            ScriptCommand::RenameStage {
                stage,
                name,
            } => StepOutcome::flag(step, op, self.ladder.rename_stage(&stage, name)),
            ScriptCommand::MoveStage {
                from,
                to,
            } => StepOutcome::flag(step, op, self.ladder.move_stage(from, to)),
            ScriptCommand::ReorderStages {
                stages,
            } => StepOutcome::flag(step, op, self.ladder.reorder(&stages)),
            ScriptCommand::UpdateLadderSetting {
                change,
            } => StepOutcome::flag(step, op, self.ladder.update_setting(change)),
            ScriptCommand::SetStageDefinition {
                stage,
                text,
            } => StepOutcome::flag(step, op, self.ladder.set_stage_definition(&stage, text)),
            ScriptCommand::SetDetectionMethod {
                stage,
                method,
            } => StepOutcome::flag(step, op, self.ladder.set_detection_method(&stage, method)),
            ScriptCommand::UpdateOperationalContext {
                stage,
                field,
                value,
            } => StepOutcome::flag(step, op, self.ladder.update_operational_context(&stage, field, value)),
            ScriptCommand::UpdateEntryBinding {
                stage,
                field,
                value,
            } => StepOutcome::flag(step, op, self.ladder.update_entry_binding(&stage, field, value)),
            ScriptCommand::AddEntryCondition {
                stage,
            } => StepOutcome::created(step, op, self.ladder.add_entry_condition(&stage)),
            ScriptCommand::RemoveEntryCondition {
                stage,
                condition,
            } => StepOutcome::flag(step, op, self.ladder.remove_entry_condition(&stage, condition)),
            ScriptCommand::UpdateEntryCondition {
                stage,
                condition,
                field,
                value,
            } => StepOutcome::flag(step, op, self.ladder.update_entry_condition(&stage, condition, field, value)),
            ScriptCommand::SetEntryOperator {
                stage,
                gap,
                combinator,
            } => StepOutcome::flag(step, op, self.ladder.set_entry_operator(&stage, gap, combinator)),
            ScriptCommand::AddExitRule {
                stage,
            } => StepOutcome::created(step, op, self.ladder.add_exit_rule(&stage)),
            ScriptCommand::RemoveExitRule {
                stage,
                rule,
            } => StepOutcome::flag(step, op, self.ladder.remove_exit_rule(&stage, rule)),
            ScriptCommand::SetExitTarget {
                stage,
                rule,
                target,
            } => StepOutcome::flag(step, op, self.ladder.set_exit_target(&stage, rule, target)),
            ScriptCommand::UpdateExitBinding {
                stage,
                rule,
                field,
                value,
            } => StepOutcome::flag(step, op, self.ladder.update_exit_binding(&stage, rule, field, value)),
            ScriptCommand::AddExitCondition {
                stage,
                rule,
            } => StepOutcome::created(step, op, self.ladder.add_exit_condition(&stage, rule)),
            ScriptCommand::RemoveExitCondition {
                stage,
                rule,
                condition,
            } => StepOutcome::flag(step, op, self.ladder.remove_exit_condition(&stage, rule, condition)),
            ScriptCommand::UpdateExitCondition {
                stage,
                rule,
                condition,
                field,
                value,
            } => StepOutcome::flag(
                step,
                op,
                self.ladder.update_exit_condition(&stage, rule, condition, field, value),
            ),
            ScriptCommand::SetExitOperator {
                stage,
                rule,
                gap,
                combinator,
            } => StepOutcome::flag(step, op, self.ladder.set_exit_operator(&stage, rule, gap, combinator)),
            ScriptCommand::SetFromStage {
                stage,
            } => {
                self.draft.set_from_stage(stage);
                StepOutcome::flag(step, op, true)
            }
            ScriptCommand::AddTrigger => StepOutcome::created(step, op, Some(self.draft.add_trigger())),
            ScriptCommand::RemoveTrigger {
                trigger,
            } => StepOutcome::flag(step, op, self.draft.remove_trigger(trigger)),
            ScriptCommand::UpdateTrigger {
                trigger,
                change,
            } => StepOutcome::flag(step, op, self.draft.update_trigger(trigger, change)),
            ScriptCommand::SetTriggerOperator {
                gap,
                combinator,
            } => {
                self.draft.set_operator(gap, combinator);
                StepOutcome::flag(step, op, true)
            }
            ScriptCommand::SaveOpportunity => {
                self.opportunity.save(self.draft.to_rule_data());
                StepOutcome::flag(step, op, true)
            }
            ScriptCommand::DeleteOpportunity => StepOutcome::flag(step, op, self.opportunity.delete()),
            ScriptCommand::EditSavedOpportunity => {
                let loaded = self.opportunity.get().map(|saved| TriggerSequence::from_rule(&saved.rule));
                let applied = loaded.is_some();
                if let Some(draft) = loaded {
                    self.draft = draft;
                }
                StepOutcome::flag(step, op, applied)
            }
            ScriptCommand::UploadSheet {
                domain,
                file_name,
                mime,
                size_bytes,
                sheet,
            } => {
                let mapping = self.auto_map(&file_name, mime.as_deref(), size_bytes, &sheet).map_err(|source| {
                    ScriptError::Upload {
                        step,
                        source,
                    }
                })?;
                let created = format!("{}/{}", mapping.mapped_count(), mapping.rows().len());
                self.drafts.insert(domain, mapping);
                StepOutcome::created(step, op, Some(created))
            }
            ScriptCommand::AssignColumn {
                domain,
                row,
                field,
            } => {
                let applied =
                    self.drafts.get_mut(&domain).is_some_and(|mapping| mapping.assign(row, field));
                StepOutcome::flag(step, op, applied)
            }
            ScriptCommand::SaveMapping {
                domain,
            } => {
                let applied = match self.drafts.remove(&domain) {
                    Some(mapping) => {
                        self.mappings.save(domain, mapping);
                        true
                    }
                    None => false,
                };
                StepOutcome::flag(step, op, applied)
            }
            ScriptCommand::DeleteMapping {
                domain,
            } => StepOutcome::flag(step, op, self.mappings.delete(&domain)),
        };
        Ok(outcome)
    }

    /// Captures the current state of every engine.
    #[must_use]
    pub fn snapshot(&self) -> WorkspaceSnapshot<'_> {
        let summaries = self
            .concepts
            .get_all()
            .iter()
            .filter_map(|concept| self.concepts.rule_summary(&concept.id).map(|summary| (&concept.id, summary)))
            .collect();
        WorkspaceSnapshot {
            concepts: self.concepts.get_all(),
            custom_defaults: self.concepts.custom_defaults(),
            summaries,
            ladder: self.ladder.state(),
            opportunity_draft: self.draft.to_rule_data(),
            opportunity_preview: self.draft.preview(),
            opportunity: self.opportunity.get(),
            mapping_drafts: &self.drafts,
            mappings: self.mappings.saved().collect(),
        }
    }

    /// Validates an upload and maps its columns against the catalog.
    fn auto_map(
        &self,
        file_name: &str,
        mime: Option<&str>,
        size_bytes: u64,
        sheet: &SheetData,
    ) -> Result<ColumnMapping, UploadError> {
        validate_upload(file_name, mime, size_bytes)?;
        let profile = profile_columns(sheet)?;
        Ok(ColumnMapping::auto_map(&profile, &FieldMatcher::new(&self.catalogs.mapping)))
    }
}

/// Applies configured settings that differ from the ladder defaults.
fn apply_settings(ladder: &mut AdoptionLadder, settings: &LadderSettings) {
    let current = ladder.settings().clone();
    if current.per_product != settings.per_product {
        ladder.update_setting(LadderSetting::PerProduct(settings.per_product));
    }
    if current.allow_backward != settings.allow_backward {
        ladder.update_setting(LadderSetting::AllowBackward(settings.allow_backward));
    }
}
