// crates/orixa-core/src/core/catalog.rs
// ============================================================================
// Module: Static Catalogs
// Description: Lookup tables for concepts, ladder sources, triggers, and mapping.
// Purpose: Keep option data swappable without touching engine logic.
// Dependencies: crate::core::identifiers, rule-logic, serde
// ============================================================================

//! ## Overview
//! Catalogs are read-only configuration data injected into engines. They are
//! deserialized from TOML by `orixa-config` and never mutated at runtime.
//! Lookups against unknown keys return empty slices rather than errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rule_logic::SourceCatalog;
use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CategoryKey;
use crate::core::identifiers::ConceptId;

// ============================================================================
// SECTION: Concept Catalog
// ============================================================================

/// Built-in description of one concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptSpec {
    /// Concept identifier.
    pub id: ConceptId,
    /// Name shown until the user renames the concept.
    pub default_name: String,
    /// System default definition text.
    pub default_definition: String,
    /// Sources and their fields offered for this concept.
    #[serde(default)]
    pub sources: SourceCatalog,
}

/// Group of concepts shown together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptCategory {
    /// Category key.
    pub key: CategoryKey,
    /// Display label.
    pub label: String,
    /// Hidden categories keep their concepts but are not listed to users.
    #[serde(default)]
    pub hidden: bool,
    /// Concepts in display order.
    #[serde(default)]
    pub concepts: Vec<ConceptSpec>,
}

/// Concept categories plus the operator list shared by concept conditions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConceptCatalog {
    /// Operators offered for concept conditions.
    #[serde(default)]
    pub operators: Vec<String>,
    /// Categories in display order.
    #[serde(default)]
    pub categories: Vec<ConceptCategory>,
}

impl ConceptCatalog {
    /// Looks up a category by key.
    #[must_use]
    pub fn category(&self, key: &CategoryKey) -> Option<&ConceptCategory> {
        self.categories.iter().find(|category| &category.key == key)
    }

    /// Looks up a concept and its owning category.
    #[must_use]
    pub fn concept(&self, id: &ConceptId) -> Option<(&ConceptCategory, &ConceptSpec)> {
        self.categories.iter().find_map(|category| {
            category.concepts.iter().find(|spec| &spec.id == id).map(|spec| (category, spec))
        })
    }

    /// Iterates every concept across categories in display order.
    pub fn concepts(&self) -> impl Iterator<Item = &ConceptSpec> + '_ {
        self.categories.iter().flat_map(|category| category.concepts.iter())
    }
}

// ============================================================================
// SECTION: Ladder Catalog
// ============================================================================

/// Option tables used by the adoption ladder configurator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LadderCatalog {
    /// Sources and fields for entry criteria and exit rules.
    #[serde(default)]
    pub sources: SourceCatalog,
    /// Operators offered for ladder conditions.
    #[serde(default)]
    pub operators: Vec<String>,
    /// Expected duration and stuck-after options.
    #[serde(default)]
    pub durations: Vec<String>,
}

// ============================================================================
// SECTION: Trigger Catalog
// ============================================================================

/// Kind of opportunity trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Medical congress attendance.
    #[serde(rename = "Attended Medical Congress")]
    AttendedMedicalCongress,
    /// Email campaign engagement.
    #[serde(rename = "Email Engagement")]
    EmailEngagement,
    /// Website visit.
    #[serde(rename = "Web Visit")]
    WebVisit,
    /// Content download.
    #[serde(rename = "Content Download")]
    ContentDownload,
    /// Sales meeting.
    #[serde(rename = "Sales Meeting")]
    SalesMeeting,
    /// Product demo request.
    #[serde(rename = "Product Demo Request")]
    ProductDemoRequest,
}

impl TriggerKind {
    /// All kinds in display order.
    pub const ALL: [Self; 6] = [
        Self::AttendedMedicalCongress,
        Self::EmailEngagement,
        Self::WebVisit,
        Self::ContentDownload,
        Self::SalesMeeting,
        Self::ProductDemoRequest,
    ];

    /// Display label, also used as the wire form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AttendedMedicalCongress => "Attended Medical Congress",
            Self::EmailEngagement => "Email Engagement",
            Self::WebVisit => "Web Visit",
            Self::ContentDownload => "Content Download",
            Self::SalesMeeting => "Sales Meeting",
            Self::ProductDemoRequest => "Product Demo Request",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Targets a source exposes for one trigger kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSourceTargets {
    /// Source name.
    pub source: String,
    /// Targets found in that source.
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Options that depend on the chosen trigger kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerKindOptions {
    /// Trigger kind.
    pub kind: TriggerKind,
    /// Condition phrases (for example `at least`).
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Sources and their targets.
    #[serde(default)]
    pub sources: Vec<TriggerSourceTargets>,
}

/// Option tables used by the opportunity trigger configurator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TriggerCatalog {
    /// Funnel stages a rule may start from; the first is the default.
    #[serde(default)]
    pub from_stages: Vec<String>,
    /// Per-kind options.
    #[serde(default)]
    pub kinds: Vec<TriggerKindOptions>,
}

impl TriggerCatalog {
    /// Returns the options registered for `kind`.
    #[must_use]
    pub fn options(&self, kind: TriggerKind) -> Option<&TriggerKindOptions> {
        self.kinds.iter().find(|options| options.kind == kind)
    }

    /// Returns the default from-stage, if any stage is listed.
    #[must_use]
    pub fn default_from_stage(&self) -> Option<&str> {
        self.from_stages.first().map(String::as_str)
    }

    /// Condition phrases for `kind`; empty when the kind has no options.
    #[must_use]
    pub fn conditions_for(&self, kind: TriggerKind) -> &[String] {
        self.options(kind).map_or(&[][..], |options| options.conditions.as_slice())
    }

    /// Source names for `kind` in declared order.
    pub fn sources_for(&self, kind: TriggerKind) -> impl Iterator<Item = &str> + '_ {
        self.options(kind)
            .into_iter()
            .flat_map(|options| options.sources.iter().map(|entry| entry.source.as_str()))
    }

    /// Targets for `source` under `kind`; empty when either is unknown.
    #[must_use]
    pub fn targets_for(&self, kind: TriggerKind, source: &str) -> &[String] {
        self.options(kind)
            .and_then(|options| options.sources.iter().find(|entry| entry.source == source))
            .map_or(&[][..], |entry| entry.targets.as_slice())
    }
}

// ============================================================================
// SECTION: Mapping Catalog
// ============================================================================

/// Inferred or declared column value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Text values.
    #[default]
    String,
    /// Numeric values.
    Number,
    /// `true` / `false` values.
    Boolean,
    /// Calendar dates.
    Date,
}

impl ColumnType {
    /// Stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform field an upload column can map onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemField {
    /// Field name.
    pub name: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub field_type: ColumnType,
    /// Short description.
    #[serde(default)]
    pub description: String,
}

/// Exact-match alias for a lowercase file column name.
///
/// An alias without a field marks columns that must stay unmapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAlias {
    /// Lowercase, trimmed column name.
    pub column: String,
    /// Target system field, or none.
    #[serde(default)]
    pub field: Option<String>,
}

/// System fields and aliases used by column auto-mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MappingCatalog {
    /// System fields in display order; also the substring match order.
    #[serde(default)]
    pub fields: Vec<SystemField>,
    /// Exact aliases checked before substring matching.
    #[serde(default)]
    pub aliases: Vec<ColumnAlias>,
}

impl MappingCatalog {
    /// Looks up a system field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SystemField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

// ============================================================================
// SECTION: Catalog Bundle
// ============================================================================

/// Every static catalog consumed by the engines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalogs {
    /// Domain concepts.
    #[serde(default)]
    pub concepts: ConceptCatalog,
    /// Adoption ladder options.
    #[serde(default)]
    pub ladder: LadderCatalog,
    /// Opportunity trigger options.
    #[serde(default)]
    pub triggers: TriggerCatalog,
    /// Column mapping fields and aliases.
    #[serde(default)]
    pub mapping: MappingCatalog,
}
