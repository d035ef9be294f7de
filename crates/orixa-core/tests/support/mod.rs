// crates/orixa-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers, recording sinks, and catalog fixtures.
// ============================================================================
//! ## Overview
//! Shared helpers for orixa-core integration tests.

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
use std::sync::Arc;
use std::sync::Mutex;

use orixa_core::AuditSink;
use orixa_core::CategoryKey;
use orixa_core::ColumnAlias;
use orixa_core::ColumnType;
use orixa_core::ConceptCatalog;
use orixa_core::ConceptCategory;
use orixa_core::ConceptId;
use orixa_core::ConceptSpec;
use orixa_core::EngineAuditEvent;
use orixa_core::EngineHooks;
use orixa_core::FixedClock;
use orixa_core::MappingCatalog;
use orixa_core::SystemField;
use orixa_core::Timestamp;
use orixa_core::TriggerCatalog;
use orixa_core::TriggerKind;
use orixa_core::TriggerKindOptions;
use orixa_core::TriggerSourceTargets;
use rule_logic::SourceCatalog;
use rule_logic::SourceFields;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across orixa-core integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
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
    if condition {
        Ok(())
    } else {
        Err(Box::new(TestError {
            message: message.into(),
        }))
    }
}

// ========================================================================
// Hooks
// ========================================================================

/// Fixed instant used by test clocks.
pub const TEST_NOW: Timestamp = Timestamp::from_unix_millis(1_767_225_600_000);

/// Audit sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    /// Recorded events.
    events: Mutex<Vec<EngineAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns a copy of every recorded event.
    pub fn events(&self) -> Vec<EngineAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &EngineAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Builds hooks with a fixed clock and a recording sink.
pub fn recording_hooks() -> (EngineHooks, Arc<RecordingAuditSink>) {
    let sink = Arc::new(RecordingAuditSink::default());
    let hooks = EngineHooks::new(sink.clone(), Arc::new(FixedClock(TEST_NOW)));
    (hooks, sink)
}

// ========================================================================
// Catalog Fixtures
// ========================================================================

/// Builds a source catalog from `(source, fields)` pairs.
pub fn sources(entries: &[(&str, &[&str])]) -> SourceCatalog {
    SourceCatalog::new(
        entries
            .iter()
            .map(|(source, fields)| SourceFields {
                source: (*source).to_string(),
                fields: fields.iter().map(|field| (*field).to_string()).collect(),
            })
            .collect(),
    )
}

/// Builds a concept spec.
fn concept(id: &str, name: &str, definition: &str) -> ConceptSpec {
    ConceptSpec {
        id: ConceptId::new(id),
        default_name: name.to_string(),
        default_definition: definition.to_string(),
        sources: sources(&[
            ("Veeva CRM", &["Contact.Role", "Contact.Specialty__c"]),
            ("Salesforce", &["Contact.RecordType", "Contact.HCP_Role__c"]),
        ]),
    }
}

/// Small concept catalog with one visible and one hidden category.
pub fn concept_catalog() -> ConceptCatalog {
    ConceptCatalog {
        operators: vec!["is".to_string(), "is not".to_string(), "contains".to_string()],
        categories: vec![
            ConceptCategory {
                key: CategoryKey::new("people-organizations"),
                label: "People & Organizations".to_string(),
                hidden: false,
                concepts: vec![
                    concept("hcp", "HCP", "An individual healthcare professional with prescribing authority."),
                    concept("hcp-tier", "HCP Tier", "Priority segmentation of HCPs by potential."),
                    concept("kol", "KOL", "Key opinion leader with outsized influence."),
                ],
            },
            ConceptCategory {
                key: CategoryKey::new("metrics-kpis"),
                label: "Metrics & KPIs".to_string(),
                hidden: true,
                concepts: vec![concept("sales-metric", "Sales Metric", "The measure used to report sales.")],
            },
        ],
    }
}

/// Trigger catalog with two kinds.
pub fn trigger_catalog() -> TriggerCatalog {
    let strings = |values: &[&str]| values.iter().map(|value| (*value).to_string()).collect::<Vec<_>>();
    TriggerCatalog {
        from_stages: strings(&["Lead (All)", "Suspect", "Prospect"]),
        kinds: vec![
            TriggerKindOptions {
                kind: TriggerKind::AttendedMedicalCongress,
                conditions: strings(&["at least", "exactly", "at most"]),
                sources: vec![
                    TriggerSourceTargets {
                        source: "Veeva CRM".to_string(),
                        targets: strings(&["ASCO_2024", "ESC_2024"]),
                    },
                    TriggerSourceTargets {
                        source: "Event platform".to_string(),
                        targets: strings(&["AHA_2024"]),
                    },
                ],
            },
            TriggerKindOptions {
                kind: TriggerKind::EmailEngagement,
                conditions: strings(&["opened", "clicked"]),
                sources: vec![TriggerSourceTargets {
                    source: "HubSpot".to_string(),
                    targets: strings(&["Newsletter_monthly"]),
                }],
            },
        ],
    }
}

/// Mapping catalog with a handful of fields and aliases.
pub fn mapping_catalog() -> MappingCatalog {
    let field = |name: &str, field_type: ColumnType| SystemField {
        name: name.to_string(),
        field_type,
        description: String::new(),
    };
    let alias = |column: &str, target: Option<&str>| ColumnAlias {
        column: column.to_string(),
        field: target.map(str::to_string),
    };
    MappingCatalog {
        fields: vec![
            field("Email", ColumnType::String),
            field("Name", ColumnType::String),
            field("Surname", ColumnType::String),
            field("Specialty", ColumnType::String),
            field("NPI Number", ColumnType::Number),
            field("Congress Date", ColumnType::Date),
        ],
        aliases: vec![
            alias("e-mail", Some("Email")),
            alias("first name", Some("Name")),
            alias("last name", Some("Surname")),
            alias("npi", Some("NPI Number")),
            alias("comments", None),
        ],
    }
}
