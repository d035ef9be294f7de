// crates/orixa-core/tests/mapping.rs
// ============================================================================
// Module: Column Mapping Tests
// Description: Upload checks, column profiling, auto-mapping, and paging.
// ============================================================================
//! ## Overview
//! Integration tests for the column mapping flow.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use orixa_core::ColumnMapping;
use orixa_core::ColumnType;
use orixa_core::FieldMatcher;
use orixa_core::MappingDomain;
use orixa_core::MappingStatus;
use orixa_core::MappingStore;
use orixa_core::SheetData;
use orixa_core::UploadError;
use orixa_core::runtime::mapping::detect_column_type;
use orixa_core::runtime::mapping::match_confidence;
use orixa_core::runtime::mapping::profile_columns;
use orixa_core::runtime::mapping::validate_upload;
use serde_json::Value;
use serde_json::json;
use support::TEST_NOW;
use support::TestResult;
use support::ensure;
use support::mapping_catalog;
use support::recording_hooks;

/// Builds sheet data from a header and JSON rows.
fn sheet(header: &[&str], rows: Vec<Vec<Value>>) -> SheetData {
    SheetData {
        header: header.iter().map(|name| (*name).to_string()).collect(),
        rows,
    }
}

// ============================================================================
// SECTION: Upload Validation
// ============================================================================

#[test]
fn upload_validation_checks_format_then_size() -> TestResult {
    ensure(validate_upload("congress.XLSX", None, 10).is_ok(), "extension is case-insensitive")?;
    ensure(validate_upload("export", Some("text/csv"), 10).is_ok(), "mime alone is enough")?;
    ensure(
        validate_upload("notes.pdf", Some("application/pdf"), 10) == Err(UploadError::UnsupportedFormat),
        "pdf rejected",
    )?;
    ensure(
        validate_upload("big.csv", None, 100 * 1024 * 1024 + 1) == Err(UploadError::TooLarge),
        "size cap",
    )?;
    ensure(validate_upload("edge.xls", None, 100 * 1024 * 1024).is_ok(), "exactly at the cap")?;
    ensure(
        UploadError::TooLarge.to_string() == "File exceeds 100MB limit. Please upload a smaller file.",
        "user-facing message",
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Profiling
// ============================================================================

#[test]
fn column_type_uses_first_non_empty_value() -> TestResult {
    ensure(detect_column_type(&[json!(""), json!("  "), json!("42")]) == ColumnType::Number, "numeric string")?;
    ensure(detect_column_type(&[Value::Null, json!(3.5)]) == ColumnType::Number, "number")?;
    ensure(detect_column_type(&[json!(true), json!("x")]) == ColumnType::Boolean, "boolean")?;
    ensure(detect_column_type(&[json!("NaN")]) == ColumnType::String, "NaN is text")?;
    ensure(detect_column_type(&[json!("Dr. Smith"), json!(1)]) == ColumnType::String, "text first")?;
    ensure(detect_column_type(&[]) == ColumnType::String, "empty defaults to string")?;
    Ok(())
}

#[test]
fn numeric_text_follows_number_literal_rules() -> TestResult {
    for text in ["Infinity", "-Infinity", " +Infinity ", "0x10", "0XfF", "0o17", "0b101", "1e3", "-2.5E-2", ".5", "7."] {
        ensure(detect_column_type(&[json!(text)]) == ColumnType::Number, format!("{text} is a number"))?;
    }
    for text in ["inf", "infinity", "-inf", "INFINITY", "NaN", "nan", "-0x10", "0x", "0b102", "1_000", "1e", "12px"] {
        ensure(detect_column_type(&[json!(text)]) == ColumnType::String, format!("{text} is text"))?;
    }
    Ok(())
}

#[test]
fn profile_reports_preview_and_row_count() -> TestResult {
    let data = sheet(
        &["Email", "NPI", "Notes"],
        vec![vec![json!("a@example.com"), json!(""), json!("")], vec![json!("b@example.com"), json!(1234)]],
    );
    let profile = profile_columns(&data)?;
    ensure(profile.total_rows == 2, "row count")?;
    ensure(profile.columns[1].preview == "1234", "preview skips empty cells")?;
    ensure(profile.columns[1].column_type == ColumnType::Number, "npi is numeric")?;
    ensure(profile.columns[2].preview.is_empty(), "short rows pad with empty cells")?;
    ensure(profile_columns(&sheet(&["Email"], Vec::new())) == Err(UploadError::EmptySheet), "empty sheet")?;
    ensure(SheetData::from_json(b"not json") == Err(UploadError::Unreadable), "unreadable bytes")?;
    Ok(())
}

// ============================================================================
// SECTION: Matching
// ============================================================================

#[test]
fn matcher_prefers_aliases_then_substrings() -> TestResult {
    let catalog = mapping_catalog();
    let matcher = FieldMatcher::new(&catalog);
    ensure(matcher.match_column(" E-Mail ") == Some("Email"), "alias after trim and lowercase")?;
    ensure(matcher.match_column("Comments").is_none(), "alias to no field")?;
    ensure(matcher.match_column("Primary Specialty") == Some("Specialty"), "column contains field")?;
    ensure(matcher.match_column("npi") == Some("NPI Number"), "alias")?;
    ensure(matcher.match_column("Congress") == Some("Congress Date"), "field contains column")?;
    ensure(matcher.match_column("Booth").is_none(), "no match")?;
    ensure(matcher.match_column("   ").is_none(), "blank column")?;
    Ok(())
}

#[test]
fn confidence_is_deterministic() -> TestResult {
    ensure(match_confidence("Email", "Email") == 100, "exact")?;
    ensure(match_confidence("Primary Specialty", "Specialty") == 95, "containment")?;
    ensure(match_confidence("e-mail", "Email") == 80, "fallback")?;
    Ok(())
}

// ============================================================================
// SECTION: Review
// ============================================================================

/// Auto-maps twelve columns, four of which stay unmapped.
fn twelve_columns() -> TestResult<ColumnMapping> {
    let catalog = mapping_catalog();
    let header = [
        "Email", "First Name", "Last Name", "Specialty", "NPI", "Congress Date", "Comments", "Booth", "Badge",
        "Email Address", "Name", "Region X",
    ];
    let row = header.iter().map(|_| json!("value")).collect();
    let profile = profile_columns(&sheet(&header, vec![row]))?;
    Ok(ColumnMapping::auto_map(&profile, &FieldMatcher::new(&catalog)))
}

#[test]
fn assign_updates_status_and_confidence() -> TestResult {
    let mut mapping = twelve_columns()?;
    ensure(mapping.mapped_count() == 8, "eight auto-mapped columns")?;
    let booth = mapping.rows().iter().position(|row| row.file_column == "Booth").ok_or("no booth")?;
    ensure(mapping.assign(booth, Some("Name".to_string())), "assign applied")?;
    let row = &mapping.rows()[booth];
    ensure(row.status == MappingStatus::Mapped && row.confidence == Some(80), "manual pick scored")?;
    ensure(mapping.assign(booth, None), "clear applied")?;
    let row = &mapping.rows()[booth];
    ensure(row.status == MappingStatus::Unmapped && row.confidence.is_none(), "cleared")?;
    ensure(!mapping.assign(99, None), "out of range ignored")?;
    Ok(())
}

#[test]
fn pages_hold_ten_rows_with_global_indices() -> TestResult {
    let mapping = twelve_columns()?;
    let first = mapping.page(0, false);
    ensure(first.total_pages == 2 && first.rows.len() == 10, "ten rows on page one")?;
    let second = mapping.page(1, false);
    ensure(second.rows.len() == 2 && second.rows[0].0 == 10, "global index kept")?;
    let unmapped = mapping.page(0, true);
    ensure(unmapped.total_pages == 1 && unmapped.rows.len() == 4, "unmapped filter")?;
    ensure(unmapped.rows.len() == mapping.unmapped_rows().count(), "filter matches iterator")?;
    ensure(mapping.page(5, false).rows.is_empty(), "past the end is empty")?;
    Ok(())
}

#[test]
fn store_saves_per_domain() -> TestResult {
    let (hooks, sink) = recording_hooks();
    let mut store = MappingStore::new(hooks);
    let congress = MappingDomain::new("congress");
    let mapping = twelve_columns()?;
    let saved = store.save(congress.clone(), mapping.clone());
    ensure(saved.saved_at == TEST_NOW && saved.mapping == mapping, "saved with timestamp")?;
    let json = serde_json::to_value(saved)?;
    ensure(json["saved_at"] == "2026-01-01T00:00:00Z", "save time written as RFC 3339")?;
    ensure(store.get(&MappingDomain::new("crm")).is_none(), "other domain empty")?;
    ensure(store.delete(&congress), "deleted")?;
    ensure(store.get(&congress).is_none(), "gone")?;
    ensure(sink.events().len() == 2, "save and delete audited")?;
    Ok(())
}
