// crates/orixa-core/src/runtime/concepts.rs
// ============================================================================
// Module: Concept Registry
// Description: Domain concepts with definitions, source bindings, and rules.
// Purpose: Configure every catalog concept independently and track completion.
// Dependencies: crate::{core, interfaces}, rule-logic, serde
// ============================================================================

//! ## Overview
//! Every concept in the catalog is created eagerly with empty configuration
//! and is never destroyed. Each mutation recomputes the concept's status with
//! [`rule_logic::concept_status`] and emits one audit event.
//!
//! Custom defaults are an override layer over the catalog's default
//! definition. Presence is tracked by key: clearing removes the key, which is
//! distinct from storing an empty override.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use rule_logic::Combinator;
use rule_logic::ConditionField;
use rule_logic::ConditionId;
use rule_logic::ConditionSet;
use rule_logic::ConfigurationStatus;
use rule_logic::IdSource;
use rule_logic::SequenceIds;
use rule_logic::SourceBinding;
use rule_logic::concept_status;
use rule_logic::rule_summary;
use serde::Deserialize;
use serde::Serialize;

use crate::core::catalog::ConceptCatalog;
use crate::core::catalog::ConceptCategory;
use crate::core::catalog::ConceptSpec;
use crate::core::identifiers::CategoryKey;
use crate::core::identifiers::ConceptId;
use crate::interfaces::EngineHooks;
use crate::interfaces::EngineKind;

// ============================================================================
// SECTION: Concept
// ============================================================================

/// Configured state of one concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// Concept identifier.
    pub id: ConceptId,
    /// Current display name.
    pub name: String,
    /// Definition text.
    pub definition: String,
    /// Source and field the classification reads from.
    #[serde(flatten)]
    pub binding: SourceBinding,
    /// Classification conditions.
    pub rule: ConditionSet,
    /// Free-text constraints.
    pub constraints: String,
    /// Derived status; refreshed after every mutation.
    pub status: ConfigurationStatus,
}

impl Concept {
    /// Creates an unconfigured concept from its catalog entry.
    #[must_use]
    pub fn from_spec(spec: &ConceptSpec) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.default_name.clone(),
            definition: String::new(),
            binding: SourceBinding::new(),
            rule: ConditionSet::new(),
            constraints: String::new(),
            status: ConfigurationStatus::NotConfigured,
        }
    }

    /// Derives status from the current fields.
    #[must_use]
    pub fn derive_status(&self) -> ConfigurationStatus {
        concept_status(&self.definition, self.binding.source(), &self.rule, &self.constraints)
    }

    /// Stores the derived status.
    fn refresh_status(&mut self) {
        self.status = self.derive_status();
    }
}

/// Text attribute of a [`Concept`] targeted by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptField {
    /// Display name.
    Name,
    /// Definition text.
    Definition,
    /// Source name. Clears the source field.
    Source,
    /// Field within the source.
    SourceField,
    /// Constraints text.
    Constraints,
}

impl ConceptField {
    /// Stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Definition => "definition",
            Self::Source => "source",
            Self::SourceField => "source_field",
            Self::Constraints => "constraints",
        }
    }
}

/// Completion counts for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TabStats {
    /// Concepts whose status is `defined`.
    pub configured: usize,
    /// Concepts in the category.
    pub total: usize,
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry of every catalog concept.
pub struct ConceptRegistry {
    /// Static catalog.
    catalog: ConceptCatalog,
    /// Concept state in catalog order.
    concepts: Vec<Concept>,
    /// Custom default definitions by concept.
    custom_defaults: BTreeMap<ConceptId, String>,
    /// Condition id source.
    ids: Box<dyn IdSource + Send>,
    /// Clock and audit hooks.
    hooks: EngineHooks,
}

impl ConceptRegistry {
    /// Creates a registry for `catalog` with injected ids and hooks.
    #[must_use]
    pub fn new(catalog: ConceptCatalog, ids: Box<dyn IdSource + Send>, hooks: EngineHooks) -> Self {
        let concepts = catalog.concepts().map(Concept::from_spec).collect();
        Self {
            catalog,
            concepts,
            custom_defaults: BTreeMap::new(),
            ids,
            hooks,
        }
    }

    /// Creates a registry with sequential ids and default hooks.
    #[must_use]
    pub fn with_catalog(catalog: ConceptCatalog) -> Self {
        Self::new(catalog, Box::new(SequenceIds::new()), EngineHooks::default())
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// All concepts in catalog order.
    #[must_use]
    pub fn get_all(&self) -> &[Concept] {
        &self.concepts
    }

    /// Looks up one concept.
    #[must_use]
    pub fn get(&self, id: &ConceptId) -> Option<&Concept> {
        self.concepts.iter().find(|concept| &concept.id == id)
    }

    /// The static catalog backing this registry.
    #[must_use]
    pub const fn catalog(&self) -> &ConceptCatalog {
        &self.catalog
    }

    /// All categories, hidden ones included.
    #[must_use]
    pub fn categories(&self) -> &[ConceptCategory] {
        &self.catalog.categories
    }

    /// Categories that are not hidden.
    pub fn visible_categories(&self) -> impl Iterator<Item = &ConceptCategory> + '_ {
        self.catalog.categories.iter().filter(|category| !category.hidden)
    }

    /// Stored custom defaults.
    #[must_use]
    pub const fn custom_defaults(&self) -> &BTreeMap<ConceptId, String> {
        &self.custom_defaults
    }

    /// Custom default for `id`, if one is stored.
    #[must_use]
    pub fn custom_default(&self, id: &ConceptId) -> Option<&str> {
        self.custom_defaults.get(id).map(String::as_str)
    }

    /// Default definition offered for reset: a non-empty custom default,
    /// otherwise the catalog default.
    #[must_use]
    pub fn active_default(&self, id: &ConceptId) -> Option<&str> {
        let (_, spec) = self.catalog.concept(id)?;
        match self.custom_default(id) {
            Some(custom) if !custom.is_empty() => Some(custom),
            _ => Some(spec.default_definition.as_str()),
        }
    }

    /// Returns true when the concept's name differs from its catalog name.
    #[must_use]
    pub fn is_renamed(&self, id: &ConceptId) -> bool {
        match (self.get(id), self.catalog.concept(id)) {
            (Some(concept), Some((_, spec))) => concept.name != spec.default_name,
            _ => false,
        }
    }

    /// Sources offered for the concept.
    #[must_use]
    pub fn source_options(&self, id: &ConceptId) -> Vec<&str> {
        self.catalog
            .concept(id)
            .map(|(_, spec)| spec.sources.source_names().collect())
            .unwrap_or_default()
    }

    /// Fields offered for the concept's currently selected source.
    #[must_use]
    pub fn field_options(&self, id: &ConceptId) -> &[String] {
        match (self.get(id), self.catalog.concept(id)) {
            (Some(concept), Some((_, spec))) => spec.sources.fields_for(concept.binding.source()),
            _ => &[],
        }
    }

    /// One-line preview of the concept's classification rule.
    #[must_use]
    pub fn rule_summary(&self, id: &ConceptId) -> Option<String> {
        self.get(id).map(|concept| rule_summary(&concept.rule, &concept.name))
    }

    /// Completion counts for a category; zero for unknown keys.
    #[must_use]
    pub fn tab_stats(&self, key: &CategoryKey) -> TabStats {
        let Some(category) = self.catalog.category(key) else {
            return TabStats::default();
        };
        let configured = category
            .concepts
            .iter()
            .filter_map(|spec| self.get(&spec.id))
            .filter(|concept| concept.status == ConfigurationStatus::Defined)
            .count();
        TabStats {
            configured,
            total: category.concepts.len(),
        }
    }

    /// Concepts in a category whose name or default definition contains
    /// `query`, ignoring case. A blank query matches every concept.
    #[must_use]
    pub fn search(&self, key: &CategoryKey, query: &str) -> Vec<&Concept> {
        let Some(category) = self.catalog.category(key) else {
            return Vec::new();
        };
        let needle = query.trim().to_lowercase();
        category
            .concepts
            .iter()
            .filter_map(|spec| self.get(&spec.id).map(|concept| (spec, concept)))
            .filter(|(spec, concept)| {
                needle.is_empty()
                    || concept.name.to_lowercase().contains(&needle)
                    || spec.default_definition.to_lowercase().contains(&needle)
            })
            .map(|(_, concept)| concept)
            .collect()
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Sets one text attribute. Setting the source clears the source field.
    pub fn update(&mut self, id: &ConceptId, field: ConceptField, value: impl Into<String>) -> bool {
        let value = value.into();
        self.apply("update", id, |concept, _| {
            match field {
                ConceptField::Name => concept.name = value,
                ConceptField::Definition => concept.definition = value,
                ConceptField::Source => concept.binding.set_source(value),
                ConceptField::SourceField => concept.binding.set_field(value),
                ConceptField::Constraints => concept.constraints = value,
            }
            Some(())
        })
        .is_some()
    }

    /// Appends an empty condition and returns its id.
    pub fn add_condition(&mut self, id: &ConceptId) -> Option<ConditionId> {
        self.apply("add_condition", id, |concept, ids| Some(concept.rule.add(ids)))
    }

    /// Removes a condition and renumbers the gap operators.
    pub fn remove_condition(&mut self, id: &ConceptId, condition: ConditionId) -> bool {
        self.apply("remove_condition", id, |concept, _| concept.rule.remove(condition).then_some(()))
            .is_some()
    }

    /// Updates one attribute of a condition.
    pub fn update_condition(
        &mut self,
        id: &ConceptId,
        condition: ConditionId,
        field: ConditionField,
        value: impl Into<String>,
    ) -> bool {
        let value = value.into();
        self.apply("update_condition", id, |concept, _| {
            concept.rule.update(condition, field, value).then_some(())
        })
        .is_some()
    }

    /// Sets the combinator at a gap without range validation.
    pub fn set_operator(&mut self, id: &ConceptId, gap: usize, combinator: Combinator) -> bool {
        self.apply("set_operator", id, |concept, _| {
            concept.rule.set_operator(gap, combinator);
            Some(())
        })
        .is_some()
    }

    /// Overwrites the definition, typically with [`Self::active_default`].
    pub fn reset_definition(&mut self, id: &ConceptId, text: impl Into<String>) -> bool {
        let text = text.into();
        self.apply("reset_definition", id, |concept, _| {
            concept.definition = text;
            Some(())
        })
        .is_some()
    }

    /// Stores a custom default for a catalog concept.
    pub fn set_custom_default(&mut self, id: &ConceptId, text: impl Into<String>) -> bool {
        let known = self.get(id).is_some();
        if known {
            self.custom_defaults.insert(id.clone(), text.into());
        }
        self.hooks.record(EngineKind::Concepts, "set_custom_default", id.as_str(), known, None)
    }

    /// Removes the custom default key. Returns false when none was stored.
    pub fn clear_custom_default(&mut self, id: &ConceptId) -> bool {
        let removed = self.custom_defaults.remove(id).is_some();
        self.hooks.record(EngineKind::Concepts, "clear_custom_default", id.as_str(), removed, None)
    }

    /// Runs `edit` against one concept, refreshes its status, and audits.
    ///
    /// `edit` returns `None` to report a no-op.
    fn apply<R>(
        &mut self,
        operation: &str,
        id: &ConceptId,
        edit: impl FnOnce(&mut Concept, &mut dyn IdSource) -> Option<R>,
    ) -> Option<R> {
        let ids: &mut dyn IdSource = &mut *self.ids;
        let outcome = self.concepts.iter_mut().find(|concept| &concept.id == id).and_then(|concept| {
            let result = edit(concept, ids)?;
            concept.refresh_status();
            Some((result, concept.status))
        });
        let status = outcome.as_ref().map(|(_, status)| *status);
        self.hooks.record(EngineKind::Concepts, operation, id.as_str(), outcome.is_some(), status);
        outcome.map(|(result, _)| result)
    }
}

impl fmt::Debug for ConceptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConceptRegistry")
            .field("concepts", &self.concepts)
            .field("custom_defaults", &self.custom_defaults)
            .finish_non_exhaustive()
    }
}
