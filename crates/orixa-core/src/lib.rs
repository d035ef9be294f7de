// crates/orixa-core/src/lib.rs
// ============================================================================
// Module: Orixa Core Root
// Description: Aggregate roots for concept, ladder, opportunity, and mapping rules.
// Purpose: Expose the engine API consumed by hosting surfaces.
// Dependencies: crate::{audit, core, interfaces, runtime}, rule-logic
// ============================================================================

//! ## Overview
//! `orixa-core` hosts the three rule configurators of the platform and the
//! column-mapping flow:
//! - [`ConceptRegistry`]: domain concepts grouped by category.
//! - [`AdoptionLadder`]: ordered adoption stages with entry and exit rules.
//! - [`OpportunityStore`] and [`TriggerSequence`]: the lead to opportunity
//!   trigger rule.
//! - [`ColumnMapping`] and [`MappingStore`]: upload column to system field
//!   mapping.
//!
//! Every engine mutation is total: unknown ids are no-ops reported through a
//! `false` return value and an `ignored` audit event. Status values are
//! recomputed from current data after each mutation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::StderrAuditSink;
pub use core::catalog::Catalogs;
pub use core::catalog::ColumnAlias;
pub use core::catalog::ColumnType;
pub use core::catalog::ConceptCatalog;
pub use core::catalog::ConceptCategory;
pub use core::catalog::ConceptSpec;
pub use core::catalog::LadderCatalog;
pub use core::catalog::MappingCatalog;
pub use core::catalog::SystemField;
pub use core::catalog::TriggerCatalog;
pub use core::catalog::TriggerKind;
pub use core::catalog::TriggerKindOptions;
pub use core::catalog::TriggerSourceTargets;
pub use core::identifiers::CategoryKey;
pub use core::identifiers::ConceptId;
pub use core::identifiers::ExitRuleId;
pub use core::identifiers::MappingDomain;
pub use core::identifiers::StageId;
pub use core::identifiers::TriggerId;
pub use core::time::Timestamp;
pub use interfaces::AuditOutcome;
pub use interfaces::AuditSink;
pub use interfaces::Clock;
pub use interfaces::EngineAuditEvent;
pub use interfaces::EngineHooks;
pub use interfaces::EngineKind;
pub use interfaces::FixedClock;
pub use interfaces::NoopAuditSink;
pub use interfaces::SystemClock;
pub use runtime::concepts::Concept;
pub use runtime::concepts::ConceptField;
pub use runtime::concepts::ConceptRegistry;
pub use runtime::concepts::TabStats;
pub use runtime::ladder::AdoptionLadder;
pub use runtime::ladder::BindingField;
pub use runtime::ladder::DetectionMethod;
pub use runtime::ladder::EntryCriteria;
pub use runtime::ladder::ExitRule;
pub use runtime::ladder::LadderSetting;
pub use runtime::ladder::LadderSettings;
pub use runtime::ladder::LadderState;
pub use runtime::ladder::OperationalContext;
pub use runtime::ladder::OperationalField;
pub use runtime::ladder::Stage;
pub use runtime::ladder::StageDefinition;
pub use runtime::mapping::ColumnMapping;
pub use runtime::mapping::ColumnProfile;
pub use runtime::mapping::FieldMatcher;
pub use runtime::mapping::MappingPage;
pub use runtime::mapping::MappingRow;
pub use runtime::mapping::MappingStatus;
pub use runtime::mapping::MappingStore;
pub use runtime::mapping::SavedMapping;
pub use runtime::mapping::SheetData;
pub use runtime::mapping::SheetProfile;
pub use runtime::mapping::UploadError;
pub use runtime::opportunity::OpportunityRule;
pub use runtime::opportunity::OpportunityRuleData;
pub use runtime::opportunity::OpportunityStore;
pub use runtime::opportunity::Trigger;
pub use runtime::opportunity::TriggerField;
pub use runtime::opportunity::TriggerSequence;
