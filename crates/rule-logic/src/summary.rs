// crates/rule-logic/src/summary.rs
// ============================================================================
// Module: Rule Summaries
// Description: Human-readable rendering of a condition set.
// Purpose: Produce the one-line "Where ... → classify as ..." rule preview.
// Dependencies: crate::condition
// ============================================================================

//! ## Overview
//! Only conditions with a chosen field take part in the summary. Gap operators
//! are read by position in the filtered list, so a condition without a field
//! does not shift the operators of the ones after it.

use crate::condition::ConditionSet;

/// Summary text used when no condition has a field.
pub const NO_RULES_SUMMARY: &str = "No rules defined yet";

/// Renders a classification rule preview for `name`.
#[must_use]
pub fn rule_summary(set: &ConditionSet, name: &str) -> String {
    let parts: Vec<String> = set
        .conditions()
        .iter()
        .filter(|condition| !condition.field.is_empty())
        .enumerate()
        .map(|(index, condition)| {
            let mut text = condition.field.clone();
            if !condition.operator.is_empty() {
                text.push(' ');
                text.push_str(&condition.operator);
            }
            if !condition.value.is_empty() {
                text.push_str(" \"");
                text.push_str(&condition.value);
                text.push('"');
            }
            if index > 0 {
                text = format!("{} {text}", set.operators().get(index - 1));
            }
            text
        })
        .collect();

    if parts.is_empty() {
        return NO_RULES_SUMMARY.to_string();
    }
    format!("Where {} \u{2192} classify as {name}", parts.join(" "))
}
