// crates/orixa-config/src/catalog.rs
// ============================================================================
// Module: Catalog Loading
// Description: Built-in catalogs and validation of catalog TOML.
// Purpose: Give engines a consistent, fail-closed set of option tables.
// Dependencies: orixa-core, rule-logic, toml
// ============================================================================

//! ## Overview
//! The built-in catalog is embedded at compile time from
//! `catalog/default.toml`. A replacement file uses the same layout. Both are
//! validated before use; duplicate keys or dangling alias targets are
//! rejected rather than silently shadowed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use orixa_core::Catalogs;
use rule_logic::SourceFields;

use crate::config::ConfigError;
use crate::config::validate_path;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Embedded default catalog.
const BUILTIN_CATALOG: &str = include_str!("../catalog/default.toml");

/// Maximum catalog file size in bytes.
pub(crate) const MAX_CATALOG_FILE_SIZE: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Parses and validates the embedded default catalog.
///
/// # Errors
///
/// Returns [`ConfigError`] when the embedded catalog is malformed.
pub fn builtin_catalogs() -> Result<Catalogs, ConfigError> {
    parse_catalogs(BUILTIN_CATALOG)
}

/// Reads, parses, and validates a catalog file.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read, exceeds the size
/// limit, is not UTF-8, or fails validation.
pub fn load_catalogs(path: &Path) -> Result<Catalogs, ConfigError> {
    validate_path(path)?;
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(format!("catalog.path: {err}")))?;
    if bytes.len() > MAX_CATALOG_FILE_SIZE {
        return Err(ConfigError::Invalid("catalog file exceeds size limit".to_string()));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("catalog file must be utf-8".to_string()))?;
    parse_catalogs(content)
}

/// Parses and validates catalog TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
pub fn parse_catalogs(content: &str) -> Result<Catalogs, ConfigError> {
    let catalogs: Catalogs = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
    validate_catalogs(&catalogs)?;
    Ok(catalogs)
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates catalog consistency.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] naming the first violation found.
pub fn validate_catalogs(catalogs: &Catalogs) -> Result<(), ConfigError> {
    validate_concepts(catalogs)?;
    validate_sources("ladder.sources", catalogs.ladder.sources.entries())?;
    validate_triggers(catalogs)?;
    validate_mapping(catalogs)?;
    Ok(())
}

/// Checks categories and concepts.
fn validate_concepts(catalogs: &Catalogs) -> Result<(), ConfigError> {
    let concepts = &catalogs.concepts;
    if concepts.categories.is_empty() {
        return Err(invalid("concepts.categories must not be empty"));
    }
    let mut keys = BTreeSet::new();
    let mut ids = BTreeSet::new();
    for category in &concepts.categories {
        let key = category.key.as_str();
        if key.trim().is_empty() || category.label.trim().is_empty() {
            return Err(invalid("concept categories need a key and a label"));
        }
        if !keys.insert(key) {
            return Err(invalid(format!("duplicate concept category: {key}")));
        }
        for concept in &category.concepts {
            let id = concept.id.as_str();
            if id.trim().is_empty() || concept.default_name.trim().is_empty() {
                return Err(invalid(format!("concept in {key} needs an id and a default name")));
            }
            if !ids.insert(id) {
                return Err(invalid(format!("duplicate concept id: {id}")));
            }
            validate_sources(&format!("concept {id} sources"), concept.sources.entries())?;
        }
    }
    Ok(())
}

/// Checks that every source is named once and non-empty.
fn validate_sources(context: &str, sources: &[SourceFields]) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for entry in sources {
        let source = entry.source.as_str();
        if source.trim().is_empty() {
            return Err(invalid(format!("{context}: source names must be non-empty")));
        }
        if !seen.insert(source) {
            return Err(invalid(format!("{context}: duplicate source {source}")));
        }
    }
    Ok(())
}

/// Checks trigger kinds and their sources.
fn validate_triggers(catalogs: &Catalogs) -> Result<(), ConfigError> {
    let mut kinds = BTreeSet::new();
    for options in &catalogs.triggers.kinds {
        if !kinds.insert(options.kind) {
            return Err(invalid(format!("duplicate trigger kind: {}", options.kind)));
        }
        let mut sources = BTreeSet::new();
        for entry in &options.sources {
            if entry.source.trim().is_empty() {
                return Err(invalid(format!("trigger kind {}: source names must be non-empty", options.kind)));
            }
            if !sources.insert(entry.source.as_str()) {
                return Err(invalid(format!("trigger kind {}: duplicate source {}", options.kind, entry.source)));
            }
        }
    }
    Ok(())
}

/// Checks system fields and aliases.
fn validate_mapping(catalogs: &Catalogs) -> Result<(), ConfigError> {
    let mapping = &catalogs.mapping;
    let mut names = BTreeSet::new();
    for field in &mapping.fields {
        if field.name.trim().is_empty() {
            return Err(invalid("mapping field names must be non-empty"));
        }
        if !names.insert(field.name.as_str()) {
            return Err(invalid(format!("duplicate mapping field: {}", field.name)));
        }
    }
    let mut columns = BTreeSet::new();
    for alias in &mapping.aliases {
        let column = alias.column.as_str();
        if column.is_empty() || column != column.trim() || column != column.to_lowercase() {
            return Err(invalid(format!("mapping alias must be trimmed lowercase: \"{column}\"")));
        }
        if !columns.insert(column) {
            return Err(invalid(format!("duplicate mapping alias: {column}")));
        }
        if let Some(field) = &alias.field
            && mapping.field(field).is_none()
        {
            return Err(invalid(format!("mapping alias {column} targets unknown field {field}")));
        }
    }
    Ok(())
}

/// Builds an invalid-catalog error.
fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(format!("catalog: {}", message.into()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
