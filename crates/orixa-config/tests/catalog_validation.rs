//! Catalog loading and validation tests for orixa-config.
// crates/orixa-config/tests/catalog_validation.rs
// =============================================================================
// Module: Catalog Validation Tests
// Description: Validate built-in and replacement catalogs.
// Purpose: Ensure duplicate keys and dangling references are rejected.
// =============================================================================

use orixa_config::OrixaConfig;
use orixa_config::builtin_catalogs;
use orixa_config::parse_catalogs;
use orixa_core::ConceptId;
use orixa_core::TriggerKind;

mod common;

use common::MINIMAL_CATALOG;
use common::TestResult;
use common::assert_invalid;
use common::write_temp;

#[test]
fn builtin_catalog_covers_every_trigger_kind() -> TestResult {
    let catalogs = builtin_catalogs().map_err(|err| err.to_string())?;
    for kind in TriggerKind::ALL {
        let options = catalogs.triggers.options(kind).ok_or_else(|| format!("missing options for {kind}"))?;
        if options.conditions.is_empty() || options.sources.is_empty() {
            return Err(format!("{kind} should have conditions and sources"));
        }
    }
    if catalogs.triggers.targets_for(TriggerKind::AttendedMedicalCongress, "Veeva CRM")
        != ["ASCO_2024", "ESC_2024", "AHA_2024"]
    {
        return Err("congress targets mismatch".to_string());
    }
    Ok(())
}

#[test]
fn builtin_concepts_carry_per_concept_sources() -> TestResult {
    let catalogs = builtin_catalogs().map_err(|err| err.to_string())?;
    let (category, kol) =
        catalogs.concepts.concept(&ConceptId::new("kol")).ok_or_else(|| "kol missing".to_string())?;
    if category.key.as_str() != "people-organizations" {
        return Err("kol should be a people concept".to_string());
    }
    if !kol.sources.contains_source("Third-party") || kol.sources.fields_for("Third-party").len() != 3 {
        return Err("kol sources mismatch".to_string());
    }
    Ok(())
}

#[test]
fn builtin_mapping_aliases_target_known_fields() -> TestResult {
    let catalogs = builtin_catalogs().map_err(|err| err.to_string())?;
    for alias in &catalogs.mapping.aliases {
        if let Some(field) = &alias.field
            && catalogs.mapping.field(field).is_none()
        {
            return Err(format!("alias {} targets unknown field {field}", alias.column));
        }
    }
    Ok(())
}

#[test]
fn minimal_catalog_is_valid() -> TestResult {
    let catalogs = parse_catalogs(MINIMAL_CATALOG).map_err(|err| err.to_string())?;
    if catalogs.concepts.concepts().count() != 1 || !catalogs.triggers.kinds.is_empty() {
        return Err("minimal catalog shape mismatch".to_string());
    }
    Ok(())
}

#[test]
fn empty_catalog_is_rejected() -> TestResult {
    assert_invalid(parse_catalogs(""), "categories must not be empty")
}

#[test]
fn duplicate_concept_ids_are_rejected() -> TestResult {
    let catalog = format!(
        "{MINIMAL_CATALOG}\n[[concepts.categories]]\nkey = \"more\"\nlabel = \"More\"\n\n\
         [[concepts.categories.concepts]]\nid = \"hcp\"\ndefault_name = \"Again\"\ndefault_definition = \"\"\n"
    );
    assert_invalid(parse_catalogs(&catalog), "duplicate concept id: hcp")
}

#[test]
fn duplicate_trigger_kinds_are_rejected() -> TestResult {
    let catalog = format!(
        "{MINIMAL_CATALOG}\n[[triggers.kinds]]\nkind = \"Web Visit\"\n\n[[triggers.kinds]]\nkind = \"Web Visit\"\n"
    );
    assert_invalid(parse_catalogs(&catalog), "duplicate trigger kind: Web Visit")
}

#[test]
fn duplicate_trigger_sources_are_rejected() -> TestResult {
    let catalog = format!(
        "{MINIMAL_CATALOG}\n[[triggers.kinds]]\nkind = \"Web Visit\"\n\n\
         [[triggers.kinds.sources]]\nsource = \"Mixpanel\"\n\n[[triggers.kinds.sources]]\nsource = \"Mixpanel\"\n"
    );
    assert_invalid(parse_catalogs(&catalog), "duplicate source Mixpanel")
}

#[test]
fn dangling_alias_is_rejected() -> TestResult {
    let catalog = format!(
        "{MINIMAL_CATALOG}\n[[mapping.fields]]\nname = \"Email\"\ntype = \"string\"\n\n\
         [[mapping.aliases]]\ncolumn = \"mail\"\nfield = \"E-mail\"\n"
    );
    assert_invalid(parse_catalogs(&catalog), "unknown field E-mail")
}

#[test]
fn uppercase_alias_is_rejected() -> TestResult {
    let catalog = format!("{MINIMAL_CATALOG}\n[[mapping.aliases]]\ncolumn = \"Comments\"\n");
    assert_invalid(parse_catalogs(&catalog), "trimmed lowercase")
}

#[test]
fn config_catalog_path_replaces_builtin() -> TestResult {
    let (_dir, path) = write_temp("catalog.toml", MINIMAL_CATALOG.as_bytes())?;
    let toml = format!("[catalog]\npath = \"{}\"\n", path.display());
    let config = OrixaConfig::from_toml(&toml).map_err(|err| err.to_string())?;
    let catalogs = config.catalogs().map_err(|err| err.to_string())?;
    if catalogs.concepts.categories.len() != 1 {
        return Err("configured catalog should replace the built-in one".to_string());
    }
    Ok(())
}
