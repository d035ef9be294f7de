// crates/rule-logic/src/binding.rs
// ============================================================================
// Module: Source Bindings
// Description: Data-source selection and field lookup tables.
// Purpose: Keep a source's field selection consistent with the chosen source.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`SourceBinding`] pairs an external source name with a field inside it.
//! Changing the source always clears the field. Field options come from a
//! static [`SourceCatalog`] injected per call site; unknown sources have no
//! fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Source Binding
// ============================================================================

/// Selected source and field.
///
/// # Invariants
/// - After [`SourceBinding::set_source`], `source_field` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceBinding {
    /// Selected source name (empty when none).
    #[serde(default)]
    source: String,
    /// Selected field within the source (empty when none).
    #[serde(default)]
    source_field: String,
}

impl SourceBinding {
    /// Creates an empty binding.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            source: String::new(),
            source_field: String::new(),
        }
    }

    /// Selected source name.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Selected source field.
    #[must_use]
    pub fn source_field(&self) -> &str {
        &self.source_field
    }

    /// Sets the source and clears the field.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.source_field.clear();
    }

    /// Sets the field only.
    pub fn set_field(&mut self, field: impl Into<String>) {
        self.source_field = field.into();
    }
}

// ============================================================================
// SECTION: Source Catalog
// ============================================================================

/// Fields offered by one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFields {
    /// Source name.
    pub source: String,
    /// Field names in display order.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Static source to field-list lookup table.
///
/// # Invariants
/// - Sources keep their declared order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceCatalog(Vec<SourceFields>);

impl SourceCatalog {
    /// Creates a catalog from source entries.
    #[must_use]
    pub const fn new(sources: Vec<SourceFields>) -> Self {
        Self(sources)
    }

    /// Source names in declared order.
    pub fn source_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|entry| entry.source.as_str())
    }

    /// Field options for `source`; empty when the source is unknown.
    #[must_use]
    pub fn fields_for(&self, source: &str) -> &[String] {
        self.0
            .iter()
            .find(|entry| entry.source == source)
            .map_or(&[][..], |entry| entry.fields.as_slice())
    }

    /// Returns true when `source` is listed.
    #[must_use]
    pub fn contains_source(&self, source: &str) -> bool {
        self.0.iter().any(|entry| entry.source == source)
    }

    /// Raw source entries.
    #[must_use]
    pub fn entries(&self) -> &[SourceFields] {
        &self.0
    }

    /// Number of sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no source is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
