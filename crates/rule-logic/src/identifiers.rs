// crates/rule-logic/src/identifiers.rs
// ============================================================================
// Module: Rule Identifiers
// Description: Opaque condition identifiers and injectable id sources.
// Purpose: Keep condition identity stable across edits without random suffixes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Condition identifiers are assigned once at creation and never change. Ids
//! are drawn from an [`IdSource`] injected by the host so that tests and
//! replays are deterministic. [`SequenceIds`] is the default monotonic
//! counter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Condition Id
// ============================================================================

/// Identifier of a single condition inside a condition set.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
/// - Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionId(NonZeroU64);

impl ConditionId {
    /// Creates a condition identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Creates a condition identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

// ============================================================================
// SECTION: Id Sources
// ============================================================================

/// Source of fresh, never-repeating numeric identifiers.
pub trait IdSource {
    /// Returns the next identifier. Implementations must not repeat values.
    fn next_id(&mut self) -> NonZeroU64;
}

/// Monotonic counter id source.
///
/// # Invariants
/// - Each call to [`IdSource::next_id`] returns a value strictly greater than
///   the previous one until `u64::MAX` is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceIds {
    /// Next value to hand out.
    next: NonZeroU64,
}

impl SequenceIds {
    /// Creates a counter starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: NonZeroU64::MIN,
        }
    }

}

impl Default for SequenceIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequenceIds {
    fn next_id(&mut self) -> NonZeroU64 {
        let current = self.next;
        self.next = current.checked_add(1).unwrap_or(NonZeroU64::MAX);
        current
    }
}
