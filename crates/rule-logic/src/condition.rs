// crates/rule-logic/src/condition.rs
// ============================================================================
// Module: Condition Sets
// Description: Ordered (field, operator, value) conditions joined by AND/OR gaps.
// Purpose: Provide the add/remove/update contract shared by every configurator.
// Dependencies: crate::identifiers, serde
// ============================================================================

//! ## Overview
//! A [`ConditionSet`] is an ordered list of [`Condition`]s plus a sparse map of
//! [`Combinator`]s keyed by *gap index*. Gap `i` sits between the conditions at
//! positions `i` and `i + 1`; a missing key reads as [`Combinator::And`].
//!
//! Removing a condition renumbers the gaps contiguously from zero. When a
//! removal joins two neighbours, the operator on the left of the removed
//! condition survives and the one on its right is discarded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::ConditionId;
use crate::identifiers::IdSource;

// ============================================================================
// SECTION: Combinator
// ============================================================================

/// Boolean combinator stored at a gap between two conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Combinator {
    /// Both neighbours must hold.
    #[default]
    #[serde(rename = "AND")]
    And,
    /// Either neighbour may hold.
    #[serde(rename = "OR")]
    Or,
}

impl Combinator {
    /// Returns the wire label (`AND` / `OR`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Gap Operators
// ============================================================================

/// Sparse gap-index to combinator map.
///
/// # Invariants
/// - Reading an absent gap yields [`Combinator::And`].
/// - [`GapOperators::set`] performs no range check; out-of-range entries are
///   inert until the next renumbering drops them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GapOperators(BTreeMap<usize, Combinator>);

impl GapOperators {
    /// Creates an empty operator map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the combinator at `gap`, defaulting to AND.
    #[must_use]
    pub fn get(&self, gap: usize) -> Combinator {
        self.0.get(&gap).copied().unwrap_or_default()
    }

    /// Returns the explicitly stored combinator at `gap`, if any.
    #[must_use]
    pub fn explicit(&self, gap: usize) -> Option<Combinator> {
        self.0.get(&gap).copied()
    }

    /// Overwrites the combinator at `gap`.
    pub fn set(&mut self, gap: usize, combinator: Combinator) {
        self.0.insert(gap, combinator);
    }

    /// Number of explicitly stored gaps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no gap is explicitly stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates stored `(gap, combinator)` pairs in gap order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Combinator)> + '_ {
        self.0.iter().map(|(gap, combinator)| (*gap, *combinator))
    }

    /// Builds the operator map for a list of `len_before` conditions after the
    /// condition at `removed` is taken out.
    ///
    /// Every surviving gap is materialized (defaults become explicit AND) and
    /// keys are contiguous from zero. When `removed` has neighbours on both
    /// sides, gap `removed - 1` is carried onto the merged gap and gap
    /// `removed` is dropped.
    #[must_use]
    pub fn after_removal(&self, removed: usize, len_before: usize) -> Self {
        let mut next = BTreeMap::new();
        let mut gap = 0;
        for index in 0 .. len_before.saturating_sub(1) {
            if index == removed || index + 1 == removed {
                let merges = index + 1 == removed && removed + 1 < len_before;
                if merges {
                    next.insert(gap, self.get(index));
                    gap += 1;
                }
                continue;
            }
            next.insert(gap, self.get(index));
            gap += 1;
        }
        Self(next)
    }
}

impl FromIterator<(usize, Combinator)> for GapOperators {
    fn from_iter<I: IntoIterator<Item = (usize, Combinator)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// SECTION: Condition
// ============================================================================

/// Atomic `(field, operator, value)` condition.
///
/// # Invariants
/// - `id` never changes after creation.
/// - Empty strings mean "not chosen yet".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Stable identifier.
    pub id: ConditionId,
    /// Matched column or attribute.
    pub field: String,
    /// Comparison operator label.
    pub operator: String,
    /// Comparison value.
    pub value: String,
}

impl Condition {
    /// Creates an empty condition with the given id.
    #[must_use]
    pub const fn empty(id: ConditionId) -> Self {
        Self {
            id,
            field: String::new(),
            operator: String::new(),
            value: String::new(),
        }
    }

    /// Returns true when field, operator and value are all chosen.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.field.is_empty() && !self.operator.is_empty() && !self.value.is_empty()
    }
}

/// Attribute of a [`Condition`] targeted by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionField {
    /// The matched field. Changing it clears operator and value.
    Field,
    /// The comparison operator.
    Operator,
    /// The comparison value.
    Value,
}

// ============================================================================
// SECTION: Condition Set
// ============================================================================

/// Ordered condition list with AND/OR operators at each gap.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionSet {
    /// Conditions in display order.
    #[serde(default)]
    conditions: Vec<Condition>,
    /// Gap operators between consecutive conditions.
    #[serde(default)]
    condition_operators: GapOperators,
}

impl ConditionSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            conditions: Vec::new(),
            condition_operators: GapOperators::new(),
        }
    }

    /// Conditions in display order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Gap operators.
    #[must_use]
    pub const fn operators(&self) -> &GapOperators {
        &self.condition_operators
    }

    /// Number of conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns true when the set has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Looks up a condition by id.
    #[must_use]
    pub fn get(&self, id: ConditionId) -> Option<&Condition> {
        self.conditions.iter().find(|condition| condition.id == id)
    }

    /// Returns true when at least one condition is complete.
    #[must_use]
    pub fn has_complete_condition(&self) -> bool {
        self.conditions.iter().any(Condition::is_complete)
    }

    /// Appends an empty condition with a fresh id. Existing gaps are untouched.
    pub fn add(&mut self, ids: &mut dyn IdSource) -> ConditionId {
        let id = ConditionId::new(ids.next_id());
        self.conditions.push(Condition::empty(id));
        id
    }

    /// Removes the condition with `id` and renumbers the gaps.
    ///
    /// Returns false (and leaves the set untouched) when `id` is unknown.
    pub fn remove(&mut self, id: ConditionId) -> bool {
        let Some(removed) = self.conditions.iter().position(|condition| condition.id == id) else {
            return false;
        };
        let len_before = self.conditions.len();
        self.condition_operators = self.condition_operators.after_removal(removed, len_before);
        self.conditions.remove(removed);
        true
    }

    /// Updates one attribute of the condition with `id`.
    ///
    /// Setting [`ConditionField::Field`] also clears operator and value.
    /// Returns false when `id` is unknown.
    pub fn update(&mut self, id: ConditionId, field: ConditionField, value: impl Into<String>) -> bool {
        let Some(condition) = self.conditions.iter_mut().find(|condition| condition.id == id)
        else {
            return false;
        };
        let value = value.into();
        match field {
            ConditionField::Field => {
                condition.field = value;
                condition.operator.clear();
                condition.value.clear();
            }
            ConditionField::Operator => condition.operator = value,
            ConditionField::Value => condition.value = value,
        }
        true
    }

    /// Overwrites the combinator at `gap` without range validation.
    pub fn set_operator(&mut self, gap: usize, combinator: Combinator) {
        self.condition_operators.set(gap, combinator);
    }
}
