// crates/orixa-core/src/interfaces/mod.rs
// ============================================================================
// Module: Orixa Interfaces
// Description: Injected clock and audit contracts used by every engine.
// Purpose: Keep engines deterministic and free of global side effects.
// Dependencies: crate::core, rule-logic, serde, time
// ============================================================================

//! ## Overview
//! Engines receive an [`EngineHooks`] bundle at construction. The hooks carry
//! a [`Clock`] for save timestamps and an [`AuditSink`] that receives one
//! [`EngineAuditEvent`] per mutating call. Sinks must never fail the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use rule_logic::ConfigurationStatus;
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock source.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        Timestamp::from_unix_millis(i64::try_from(millis).unwrap_or(i64::MAX))
    }
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

// ============================================================================
// SECTION: Audit Events
// ============================================================================

/// Engine that emitted an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Domain concept registry.
    Concepts,
    /// Adoption ladder.
    Ladder,
    /// Opportunity rule store.
    Opportunity,
    /// Column mapping store.
    Mapping,
}

/// Whether a mutation changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// State changed.
    Applied,
    /// Unknown id or refused operation; state unchanged.
    Ignored,
}

impl AuditOutcome {
    /// Maps an applied flag to an outcome.
    #[must_use]
    pub const fn from_applied(applied: bool) -> Self {
        if applied { Self::Applied } else { Self::Ignored }
    }
}

/// Audit record for one engine mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineAuditEvent {
    /// Event name.
    pub event: String,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: i64,
    /// Emitting engine.
    pub engine: EngineKind,
    /// Operation name (for example `remove_stage`).
    pub operation: String,
    /// Primary target identifier, empty when the operation has none.
    pub target: String,
    /// Applied or ignored.
    pub outcome: AuditOutcome,
    /// Post-mutation status where the engine derives one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConfigurationStatus>,
}

impl EngineAuditEvent {
    /// Event name used for engine mutations.
    pub const MUTATION: &'static str = "engine_mutation";
}

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Audit sink for engine mutations.
pub trait AuditSink: Send + Sync {
    /// Records an audit event. Failures are swallowed by the sink.
    fn record(&self, event: &EngineAuditEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &EngineAuditEvent) {}
}

// ============================================================================
// SECTION: Engine Hooks
// ============================================================================

/// Clock and audit sink shared by an engine.
#[derive(Clone)]
pub struct EngineHooks {
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
    /// Clock.
    clock: Arc<dyn Clock>,
}

impl EngineHooks {
    /// Creates hooks from an audit sink and clock.
    #[must_use]
    pub fn new(audit: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            audit,
            clock,
        }
    }

    /// Returns the current time from the injected clock.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Records one mutation and passes `applied` through.
    pub(crate) fn record(
        &self,
        engine: EngineKind,
        operation: &str,
        target: &str,
        applied: bool,
        status: Option<ConfigurationStatus>,
    ) -> bool {
        let event = EngineAuditEvent {
            event: EngineAuditEvent::MUTATION.to_string(),
            timestamp_ms: self.now().unix_millis(),
            engine,
            operation: operation.to_string(),
            target: target.to_string(),
            outcome: AuditOutcome::from_applied(applied),
            status,
        };
        self.audit.record(&event);
        applied
    }
}

impl Default for EngineHooks {
    fn default() -> Self {
        Self::new(Arc::new(NoopAuditSink), Arc::new(SystemClock))
    }
}

impl fmt::Debug for EngineHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHooks").finish_non_exhaustive()
    }
}
