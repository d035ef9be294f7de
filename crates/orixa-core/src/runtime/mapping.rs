// crates/orixa-core/src/runtime/mapping.rs
// ============================================================================
// Module: Column Mapping
// Description: Upload validation, column profiling, and system-field mapping.
// Purpose: Turn parsed sheet data into a reviewable column mapping.
// Dependencies: crate::{core, interfaces}, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! File parsing is external: the parser hands over a header row and cell
//! values as JSON. This module profiles those columns, proposes a system
//! field for each one, and keeps the reviewed mapping per upload domain.
//!
//! Confidence scores are deterministic: 100 for an exact name match, 95 when
//! one name contains the other, 80 otherwise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::catalog::ColumnType;
use crate::core::catalog::MappingCatalog;
use crate::core::identifiers::MappingDomain;
use crate::core::time::Timestamp;
use crate::interfaces::EngineHooks;
use crate::interfaces::EngineKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted upload size in bytes.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Accepted file extensions (lowercase, with dot).
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".xlsx", ".xls", ".csv"];

/// Accepted MIME types.
pub const ALLOWED_MIME_TYPES: [&str; 3] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/csv",
];

/// Rows shown per mapping review page.
pub const PAGE_SIZE: usize = 10;

/// Confidence for an exact name match.
const EXACT_CONFIDENCE: u8 = 100;
/// Confidence when one name contains the other.
const CONTAINS_CONFIDENCE: u8 = 95;
/// Confidence for any other pairing.
const FALLBACK_CONFIDENCE: u8 = 80;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Upload failures; messages are shown to users as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Extension and MIME type are both unsupported.
    #[error("Invalid file format. Please upload .xlsx or .csv files only.")]
    UnsupportedFormat,
    /// File exceeds [`MAX_UPLOAD_BYTES`].
    #[error("File exceeds 100MB limit. Please upload a smaller file.")]
    TooLarge,
    /// The first sheet has no data rows.
    #[error("The file is empty or has no data rows.")]
    EmptySheet,
    /// The file could not be read or decoded.
    #[error("Failed to read the file.")]
    Unreadable,
}

// ============================================================================
// SECTION: Upload Validation
// ============================================================================

/// Checks an upload's name, optional MIME type, and size.
///
/// The format is accepted when either the extension or the MIME type is
/// allowed.
///
/// # Errors
///
/// Returns [`UploadError::UnsupportedFormat`] or [`UploadError::TooLarge`].
pub fn validate_upload(file_name: &str, mime: Option<&str>, size_bytes: u64) -> Result<(), UploadError> {
    let extension = file_name.rfind('.').map(|dot| file_name[dot ..].to_lowercase()).unwrap_or_default();
    let extension_ok = ALLOWED_EXTENSIONS.contains(&extension.as_str());
    let mime_ok = mime.is_some_and(|mime| ALLOWED_MIME_TYPES.contains(&mime));
    if !extension_ok && !mime_ok {
        return Err(UploadError::UnsupportedFormat);
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }
    Ok(())
}

// ============================================================================
// SECTION: Column Profiling
// ============================================================================

/// Parsed first sheet of an upload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SheetData {
    /// Column names.
    pub header: Vec<String>,
    /// Data rows; short rows are padded with empty cells.
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl SheetData {
    /// Decodes parser output from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Unreadable`] when the bytes are not valid sheet
    /// JSON.
    pub fn from_json(bytes: &[u8]) -> Result<Self, UploadError> {
        serde_json::from_slice(bytes).map_err(|_| UploadError::Unreadable)
    }
}

/// Profile of one uploaded column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name as it appears in the file.
    pub file_column: String,
    /// Inferred value type.
    pub column_type: ColumnType,
    /// First non-empty value, stringified.
    pub preview: String,
}

/// Profile of an uploaded sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetProfile {
    /// Column profiles in header order.
    pub columns: Vec<ColumnProfile>,
    /// Number of data rows.
    pub total_rows: usize,
}

/// Returns true for null, empty, and whitespace-only cells.
fn is_empty_cell(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Renders a cell for preview.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Prefixes of non-decimal integer literals and their radix.
const RADIX_PREFIXES: [(&str, u32); 6] = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];

/// Returns true when `text` reads as a number literal.
///
/// Accepts signed decimals with optional fraction and exponent, signed
/// `Infinity`, and unsigned `0x`/`0o`/`0b` integers. Other spellings of
/// infinity or NaN are text.
fn is_numeric_text(text: &str) -> bool {
    let text = text.trim();
    let radix_digits =
        RADIX_PREFIXES.iter().find_map(|(prefix, radix)| text.strip_prefix(*prefix).map(|digits| (digits, *radix)));
    if let Some((digits, radix)) = radix_digits {
        return !digits.is_empty() && digits.chars().all(|digit| digit.is_digit(radix));
    }
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return true;
    }
    unsigned.bytes().all(|byte| byte.is_ascii_digit() || matches!(byte, b'.' | b'e' | b'E' | b'+' | b'-'))
        && text.parse::<f64>().is_ok()
}

/// Infers a column type from its values; the first non-empty value decides.
#[must_use]
pub fn detect_column_type(values: &[Value]) -> ColumnType {
    let Some(first) = values.iter().find(|value| !is_empty_cell(value)) else {
        return ColumnType::String;
    };
    match first {
        Value::Number(_) => ColumnType::Number,
        Value::String(text) if is_numeric_text(text) => ColumnType::Number,
        Value::Bool(_) => ColumnType::Boolean,
        _ => ColumnType::String,
    }
}

/// Profiles every header column of `sheet`.
///
/// # Errors
///
/// Returns [`UploadError::EmptySheet`] when the sheet has no data rows.
pub fn profile_columns(sheet: &SheetData) -> Result<SheetProfile, UploadError> {
    if sheet.rows.is_empty() {
        return Err(UploadError::EmptySheet);
    }
    let columns = sheet
        .header
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let values: Vec<Value> =
                sheet.rows.iter().map(|row| row.get(index).cloned().unwrap_or(Value::Null)).collect();
            let preview = values.iter().find(|value| !is_empty_cell(value)).map(cell_text).unwrap_or_default();
            ColumnProfile {
                file_column: name.clone(),
                column_type: detect_column_type(&values),
                preview,
            }
        })
        .collect();
    Ok(SheetProfile {
        columns,
        total_rows: sheet.rows.len(),
    })
}

// ============================================================================
// SECTION: Field Matching
// ============================================================================

/// Scores how well `column` matches `field`.
#[must_use]
pub fn match_confidence(column: &str, field: &str) -> u8 {
    let column = column.trim().to_lowercase();
    let field = field.to_lowercase();
    if column == field {
        EXACT_CONFIDENCE
    } else if column.contains(&field) || field.contains(&column) {
        CONTAINS_CONFIDENCE
    } else {
        FALLBACK_CONFIDENCE
    }
}

/// Proposes system fields for file columns.
#[derive(Debug, Clone, Copy)]
pub struct FieldMatcher<'a> {
    /// System fields and aliases.
    catalog: &'a MappingCatalog,
}

impl<'a> FieldMatcher<'a> {
    /// Creates a matcher over `catalog`.
    #[must_use]
    pub const fn new(catalog: &'a MappingCatalog) -> Self {
        Self {
            catalog,
        }
    }

    /// Proposes a field for `column`.
    ///
    /// Exact aliases win, including aliases that map to no field. Otherwise
    /// the first system field whose lowercase name contains, or is contained
    /// in, the column name is chosen. Blank columns never match.
    #[must_use]
    pub fn match_column(&self, column: &str) -> Option<&'a str> {
        let column = column.trim().to_lowercase();
        if column.is_empty() {
            return None;
        }
        if let Some(alias) = self.catalog.aliases.iter().find(|alias| alias.column == column) {
            return alias.field.as_deref();
        }
        self.catalog
            .fields
            .iter()
            .map(|field| field.name.as_str())
            .find(|name| {
                let name = name.to_lowercase();
                column.contains(&name) || name.contains(&column)
            })
    }
}

// ============================================================================
// SECTION: Column Mapping
// ============================================================================

/// Review status of a mapping row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingStatus {
    /// A system field is assigned.
    Mapped,
    /// No system field is assigned.
    Unmapped,
}

/// One file column and its assigned system field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRow {
    /// Column name as it appears in the file.
    pub file_column: String,
    /// Inferred value type.
    pub column_type: ColumnType,
    /// First non-empty value.
    pub preview: String,
    /// Assigned system field.
    pub field: Option<String>,
    /// Match confidence for the assigned field.
    pub confidence: Option<u8>,
    /// Review status.
    pub status: MappingStatus,
}

impl MappingRow {
    /// Builds a row for `profile` with an optional field.
    fn new(profile: &ColumnProfile, field: Option<String>) -> Self {
        let mut row = Self {
            file_column: profile.file_column.clone(),
            column_type: profile.column_type,
            preview: profile.preview.clone(),
            field: None,
            confidence: None,
            status: MappingStatus::Unmapped,
        };
        row.assign(field);
        row
    }

    /// Sets the field and derives confidence and status.
    fn assign(&mut self, field: Option<String>) {
        self.confidence = field.as_deref().map(|field| match_confidence(&self.file_column, field));
        self.status = if field.is_some() { MappingStatus::Mapped } else { MappingStatus::Unmapped };
        self.field = field;
    }
}

/// One page of mapping rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingPage<'a> {
    /// `(row index, row)` pairs; the index addresses [`ColumnMapping::assign`].
    pub rows: Vec<(usize, &'a MappingRow)>,
    /// Zero-based page index.
    pub page: usize,
    /// Page count, at least 1.
    pub total_pages: usize,
}

/// Reviewable mapping of every uploaded column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Rows in header order.
    rows: Vec<MappingRow>,
    /// Number of data rows in the upload.
    total_rows: usize,
}

impl ColumnMapping {
    /// Builds a mapping with a proposed field for every column.
    #[must_use]
    pub fn auto_map(profile: &SheetProfile, matcher: &FieldMatcher<'_>) -> Self {
        let rows = profile
            .columns
            .iter()
            .map(|column| {
                let field = matcher.match_column(&column.file_column).map(str::to_string);
                MappingRow::new(column, field)
            })
            .collect();
        Self {
            rows,
            total_rows: profile.total_rows,
        }
    }

    /// Rows in header order.
    #[must_use]
    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    /// Number of data rows in the upload.
    #[must_use]
    pub const fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Assigns or clears the field of the row at `index`.
    pub fn assign(&mut self, index: usize, field: Option<String>) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        row.assign(field);
        true
    }

    /// Number of mapped rows.
    #[must_use]
    pub fn mapped_count(&self) -> usize {
        self.rows.iter().filter(|row| row.status == MappingStatus::Mapped).count()
    }

    /// Rows without a field.
    pub fn unmapped_rows(&self) -> impl Iterator<Item = &MappingRow> + '_ {
        self.rows.iter().filter(|row| row.status == MappingStatus::Unmapped)
    }

    /// Returns page `page` of [`PAGE_SIZE`] rows, optionally unmapped only.
    #[must_use]
    pub fn page(&self, page: usize, unmapped_only: bool) -> MappingPage<'_> {
        let filtered: Vec<(usize, &MappingRow)> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| !unmapped_only || row.status == MappingStatus::Unmapped)
            .collect();
        let total_pages = filtered.len().div_ceil(PAGE_SIZE).max(1);
        let rows = filtered.into_iter().skip(page.saturating_mul(PAGE_SIZE)).take(PAGE_SIZE).collect();
        MappingPage {
            rows,
            page,
            total_pages,
        }
    }
}

// ============================================================================
// SECTION: Mapping Store
// ============================================================================

/// Saved mapping for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedMapping {
    /// Reviewed mapping.
    pub mapping: ColumnMapping,
    /// Save time, persisted as RFC 3339.
    #[serde(with = "crate::core::time::rfc3339")]
    pub saved_at: Timestamp,
}

/// Saved mappings keyed by upload domain.
#[derive(Debug, Default)]
pub struct MappingStore {
    /// Saved mappings.
    saved: BTreeMap<MappingDomain, SavedMapping>,
    /// Clock and audit hooks.
    hooks: EngineHooks,
}

impl MappingStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new(hooks: EngineHooks) -> Self {
        Self {
            saved: BTreeMap::new(),
            hooks,
        }
    }

    /// Saved mapping for `domain`.
    #[must_use]
    pub fn get(&self, domain: &MappingDomain) -> Option<&SavedMapping> {
        self.saved.get(domain)
    }

    /// Saved mappings in domain order.
    pub fn saved(&self) -> impl Iterator<Item = (&MappingDomain, &SavedMapping)> + '_ {
        self.saved.iter()
    }

    /// Replaces the mapping for `domain` and stamps the save time.
    pub fn save(&mut self, domain: MappingDomain, mapping: ColumnMapping) -> &SavedMapping {
        let saved_at = self.hooks.now();
        self.hooks.record(EngineKind::Mapping, "save", domain.as_str(), true, None);
        let saved = SavedMapping {
            mapping,
            saved_at,
        };
        match self.saved.entry(domain) {
            Entry::Occupied(mut entry) => {
                entry.insert(saved);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(saved),
        }
    }

    /// Removes the mapping for `domain`.
    pub fn delete(&mut self, domain: &MappingDomain) -> bool {
        let removed = self.saved.remove(domain).is_some();
        self.hooks.record(EngineKind::Mapping, "delete", domain.as_str(), removed, None)
    }
}
