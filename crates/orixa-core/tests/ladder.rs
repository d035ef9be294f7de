// crates/orixa-core/tests/ladder.rs
// ============================================================================
// Module: Adoption Ladder Tests
// Description: Stage structure, exit targets, status, and move-to options.
// ============================================================================
//! ## Overview
//! Integration tests for [`orixa_core::AdoptionLadder`].

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

use orixa_core::AdoptionLadder;
use orixa_core::AuditOutcome;
use orixa_core::BindingField;
use orixa_core::DetectionMethod;
use orixa_core::ExitRule;
use orixa_core::LadderSetting;
use orixa_core::OperationalField;
use orixa_core::StageId;
use rule_logic::Combinator;
use rule_logic::ConditionField;
use rule_logic::ConfigurationStatus;
use rule_logic::SequenceIds;
use support::TestResult;
use support::ensure;
use support::recording_hooks;

/// Stage id shorthand.
fn stage(n: u64) -> StageId {
    StageId::numbered(n)
}

/// Orders sorted by `order`.
fn orders(ladder: &AdoptionLadder) -> Vec<usize> {
    ladder.sorted_stages().iter().map(|stage| stage.order).collect()
}

/// Names sorted by `order`.
fn names(ladder: &AdoptionLadder) -> Vec<String> {
    ladder.sorted_stages().iter().map(|stage| stage.name.clone()).collect()
}

/// Gives `id` a definition, one complete entry condition, and an exit rule.
fn complete_stage(ladder: &mut AdoptionLadder, id: &StageId) -> TestResult {
    ladder.set_stage_definition(id, "Defined stage");
    let condition = ladder.add_entry_condition(id).ok_or("entry condition")?;
    ladder.update_entry_condition(id, condition, ConditionField::Field, "NRx.Count");
    ladder.update_entry_condition(id, condition, ConditionField::Operator, ">=");
    ladder.update_entry_condition(id, condition, ConditionField::Value, "1");
    ladder.add_exit_rule(id).ok_or("exit rule")?;
    Ok(())
}

// ============================================================================
// SECTION: Structure
// ============================================================================

#[test]
fn default_ladder_has_six_named_stages() -> TestResult {
    let ladder = AdoptionLadder::default();
    ensure(
        names(&ladder) == ["Unaware", "Aware", "Interested", "Trialist", "Adopter", "Advocate"],
        "default names",
    )?;
    ensure(orders(&ladder) == vec![0, 1, 2, 3, 4, 5], "dense orders")?;
    ensure(ladder.configuration_status() == ConfigurationStatus::NotConfigured, "not configured")?;
    let definition = ladder.definition(&stage(1)).ok_or("missing definition")?;
    ensure(definition.detection_method == DetectionMethod::RepAssessed, "rep-assessed default")?;
    ensure(ladder.settings().allow_backward, "backward allowed by default")?;
    Ok(())
}

#[test]
fn removing_first_stage_redensifies_and_clears_targets() -> TestResult {
    let mut ladder = AdoptionLadder::default();
    let to_first = ladder.add_exit_rule(&stage(3)).ok_or("exit rule")?;
    let to_fifth = ladder.add_exit_rule(&stage(3)).ok_or("exit rule")?;
    ensure(ladder.set_exit_target(&stage(3), to_first, Some(stage(1))), "target stage-1")?;
    ensure(ladder.set_exit_target(&stage(3), to_fifth, Some(stage(5))), "target stage-5")?;

    ensure(ladder.remove_stage(&stage(1)), "removal applied")?;
    ensure(ladder.state().stages.len() == 5, "five stages remain")?;
    ensure(orders(&ladder) == vec![0, 1, 2, 3, 4], "orders re-densified")?;
    ensure(ladder.definition(&stage(1)).is_none(), "definition removed")?;

    let rules = &ladder.definition(&stage(3)).ok_or("missing stage-3")?.exit_rules;
    ensure(rules[0].moves_to.is_none(), "dangling target cleared")?;
    ensure(rules[1].moves_to == Some(stage(5)), "other target untouched")?;
    Ok(())
}

#[test]
fn removal_is_refused_at_two_stages() -> TestResult {
    let (hooks, sink) = recording_hooks();
    let mut ladder =
        AdoptionLadder::from_stage_names(&["Start", "End"], Box::new(SequenceIds::new()), hooks).ok_or("ladder")?;
    ensure(!ladder.remove_stage(&stage(1)), "floor refuses removal")?;
    ensure(ladder.state().stages.len() == 2, "still two stages")?;
    let last = sink.events().pop().ok_or("no event")?;
    ensure(last.outcome == AuditOutcome::Ignored && last.operation == "remove_stage", "ignored event")?;
    ensure(
        AdoptionLadder::from_stage_names(&["Only"], Box::new(SequenceIds::new()), recording_hooks().0).is_none(),
        "single-stage ladder rejected",
    )?;
    Ok(())
}

#[test]
fn added_stages_get_fresh_ids_and_default_names() -> TestResult {
    let mut ladder = AdoptionLadder::default();
    ladder.remove_stage(&stage(6));
    let added = ladder.add_stage(None);
    ensure(added == stage(7), "ids are never reused")?;
    let named = ladder.add_stage(Some("Loyalist"));
    ensure(names(&ladder).last().map(String::as_str) == Some("Loyalist"), "explicit name")?;
    let added_stage = ladder.stage(&added).ok_or("missing added stage")?;
    ensure(added_stage.name == "Stage 6" && added_stage.order == 5, "default name uses order")?;
    ensure(ladder.definition(&named).is_some(), "definition allocated")?;
    ensure(ladder.stage_by_name("Loyalist").is_some_and(|found| found.id == named), "lookup by name")?;
    Ok(())
}

#[test]
fn reorder_requires_a_permutation() -> TestResult {
    let mut ladder =
        AdoptionLadder::from_stage_names(&["A", "B", "C"], Box::new(SequenceIds::new()), recording_hooks().0)
            .ok_or("ladder")?;
    ensure(ladder.reorder(&[stage(3), stage(1), stage(2)]), "permutation applied")?;
    ensure(names(&ladder) == ["C", "A", "B"], "new order")?;
    ensure(orders(&ladder) == vec![0, 1, 2], "dense orders")?;
    ensure(!ladder.reorder(&[stage(1), stage(1), stage(2)]), "duplicate refused")?;
    ensure(!ladder.reorder(&[stage(1), stage(2)]), "missing id refused")?;
    ensure(!ladder.reorder(&[stage(1), stage(2), stage(9)]), "unknown id refused")?;
    ensure(names(&ladder) == ["C", "A", "B"], "refusals leave order alone")?;
    Ok(())
}

#[test]
fn move_stage_shifts_by_position() -> TestResult {
    let mut ladder = AdoptionLadder::default();
    ensure(ladder.move_stage(0, 2), "move applied")?;
    ensure(names(&ladder)[.. 3] == ["Aware", "Interested", "Unaware"], "first stage moved to third")?;
    ensure(!ladder.move_stage(0, 6), "out of range refused")?;
    ensure(ladder.rename_stage(&stage(2), "Informed"), "rename applied")?;
    ensure(names(&ladder)[0] == "Informed", "renamed in place")?;
    Ok(())
}

// ============================================================================
// SECTION: Exit Targets
// ============================================================================

#[test]
fn move_to_options_respect_allow_backward() -> TestResult {
    let mut ladder = AdoptionLadder::default();
    let with_backward: Vec<StageId> =
        ladder.move_to_options(&stage(3)).iter().map(|stage| stage.id.clone()).collect();
    ensure(with_backward.len() == 5 && !with_backward.contains(&stage(3)), "all but self")?;

    ladder.update_setting(LadderSetting::AllowBackward(false));
    let forward: Vec<usize> = ladder.move_to_options(&stage(3)).iter().map(|stage| stage.order).collect();
    ensure(forward == vec![3, 4, 5], "only later stages")?;
    ensure(ladder.move_to_options(&StageId::new("nope")).is_empty(), "unknown stage has no options")?;
    Ok(())
}

#[test]
fn backward_targets_survive_setting_change() -> TestResult {
    let mut ladder = AdoptionLadder::default();
    let rule = ladder.add_exit_rule(&stage(4)).ok_or("exit rule")?;
    ladder.set_exit_target(&stage(4), rule, Some(stage(2)));
    ladder.update_setting(LadderSetting::AllowBackward(false));
    let rules = &ladder.definition(&stage(4)).ok_or("missing stage-4")?.exit_rules;
    ensure(rules[0].moves_to == Some(stage(2)), "stored target untouched")?;
    Ok(())
}

#[test]
fn invalid_exit_targets_are_refused() -> TestResult {
    let mut ladder = AdoptionLadder::default();
    let rule = ladder.add_exit_rule(&stage(2)).ok_or("exit rule")?;
    ensure(!ladder.set_exit_target(&stage(2), rule, Some(stage(2))), "self target refused")?;
    ensure(!ladder.set_exit_target(&stage(2), rule, Some(stage(42))), "unknown target refused")?;
    ensure(ladder.set_exit_target(&stage(2), rule, Some(stage(3))), "valid target")?;
    ensure(ladder.set_exit_target(&stage(2), rule, None), "clearing target")?;
    Ok(())
}

#[test]
fn exit_rule_binding_and_conditions() -> TestResult {
    let mut ladder = AdoptionLadder::default();
    let id = stage(2);
    let rule = ladder.add_exit_rule(&id).ok_or("exit rule")?;
    ladder.update_exit_binding(&id, rule, BindingField::Source, "IQVIA");
    ladder.update_exit_binding(&id, rule, BindingField::SourceField, "TRx.Count");
    ladder.update_exit_binding(&id, rule, BindingField::Source, "Salesforce");
    let first = ladder.add_exit_condition(&id, rule).ok_or("condition")?;
    let second = ladder.add_exit_condition(&id, rule).ok_or("condition")?;
    let third = ladder.add_exit_condition(&id, rule).ok_or("condition")?;
    ladder.set_exit_operator(&id, rule, 0, Combinator::Or);
    ensure(ladder.remove_exit_condition(&id, rule, second), "removal applied")?;
    ensure(ladder.update_exit_condition(&id, rule, third, ConditionField::Value, "5"), "update applied")?;

    let exit = &ladder.definition(&id).ok_or("missing stage")?.exit_rules[0];
    ensure(exit.binding.source() == "Salesforce" && exit.binding.source_field().is_empty(), "cascade")?;
    ensure(exit.rule.len() == 2 && exit.rule.get(first).is_some(), "two conditions left")?;
    ensure(exit.rule.operators().get(0) == Combinator::Or, "left operator kept")?;

    ensure(ladder.remove_exit_rule(&id, rule), "rule removed")?;
    ensure(!ladder.remove_exit_rule(&id, rule), "second removal ignored")?;
    Ok(())
}

// ============================================================================
// SECTION: Status
// ============================================================================

#[test]
fn ladder_status_tracks_every_stage() -> TestResult {
    let mut ladder =
        AdoptionLadder::from_stage_names(&["Start", "End"], Box::new(SequenceIds::new()), recording_hooks().0)
            .ok_or("ladder")?;
    ladder.set_stage_definition(&stage(1), "Entry point");
    ensure(ladder.configuration_status() == ConfigurationStatus::NotConfigured, "first lacks exit")?;
    ensure(ladder.stage_status(&stage(1)) == Some(ConfigurationStatus::Defined), "card ignores exits")?;

    ladder.add_exit_rule(&stage(1)).ok_or("exit rule")?;
    ensure(ladder.configuration_status() == ConfigurationStatus::NeedsAttention, "one stage defined")?;

    complete_stage(&mut ladder, &stage(2))?;
    ensure(ladder.configuration_status() == ConfigurationStatus::Defined, "all stages defined")?;
    ensure(ladder.stage_status(&StageId::new("nope")).is_none(), "unknown stage has no status")?;
    Ok(())
}

#[test]
fn entry_binding_detection_and_context_updates() -> TestResult {
    let mut ladder = AdoptionLadder::default();
    let id = stage(3);
    ladder.update_entry_binding(&id, BindingField::Source, "Veeva CRM");
    ladder.update_entry_binding(&id, BindingField::SourceField, "Contact.Adoption_Stage__c");
    ladder.set_detection_method(&id, DetectionMethod::Hybrid);
    ladder.update_operational_context(&id, OperationalField::ExpectedDuration, "1-3 months");
    ladder.update_operational_context(&id, OperationalField::KeyBarriers, "Formulary access");
    let condition = ladder.add_entry_condition(&id).ok_or("condition")?;
    ladder.add_entry_condition(&id).ok_or("condition")?;
    ladder.set_entry_operator(&id, 0, Combinator::Or);
    ensure(ladder.remove_entry_condition(&id, condition), "removed")?;

    let definition = ladder.definition(&id).ok_or("missing stage")?;
    ensure(definition.entry_criteria.binding.source_field() == "Contact.Adoption_Stage__c", "field kept")?;
    ensure(definition.detection_method == DetectionMethod::Hybrid, "method updated")?;
    ensure(definition.operational_context.expected_duration == "1-3 months", "duration updated")?;
    ensure(definition.operational_context.key_barriers == "Formulary access", "barriers updated")?;
    ensure(definition.entry_criteria.rule.operators().is_empty(), "gap dropped with first condition")?;
    ensure(!ladder.set_stage_definition(&StageId::new("nope"), "x"), "unknown stage ignored")?;
    Ok(())
}

#[test]
fn state_serializes_with_kebab_case_detection() -> TestResult {
    let mut ladder = AdoptionLadder::default();
    ladder.set_detection_method(&stage(1), DetectionMethod::DataDriven);
    let json = serde_json::to_value(ladder.state())?;
    ensure(
        json["stage_definitions"]["stage-1"]["detection_method"] == "data-driven",
        "kebab-case detection method",
    )?;
    ensure(json["configuration_status"] == "not_configured", "status serialized")?;
    Ok(())
}

#[test]
fn unset_exit_target_is_written_and_read_as_blank() -> TestResult {
    let mut ladder = AdoptionLadder::default();
    let open = ladder.add_exit_rule(&stage(2)).ok_or("exit rule")?;
    let aimed = ladder.add_exit_rule(&stage(2)).ok_or("exit rule")?;
    ensure(ladder.set_exit_target(&stage(2), aimed, Some(stage(3))), "target set")?;
    let json = serde_json::to_value(ladder.state())?;
    let rules = &json["stage_definitions"]["stage-2"]["exit_rules"];
    ensure(rules[0]["id"] == open.get() && rules[0]["moves_to"] == "", "unset target written as blank")?;
    ensure(rules[1]["moves_to"] == "stage-3", "target written as stage id")?;

    let mut blank = rules[0].clone();
    let parsed: ExitRule = serde_json::from_value(blank.clone())?;
    ensure(parsed.moves_to.is_none(), "blank target reads as none")?;
    blank["moves_to"] = serde_json::Value::Null;
    let parsed: ExitRule = serde_json::from_value(blank.clone())?;
    ensure(parsed.moves_to.is_none(), "null target reads as none")?;
    if let Some(fields) = blank.as_object_mut() {
        fields.remove("moves_to");
    }
    let parsed: ExitRule = serde_json::from_value(blank)?;
    ensure(parsed.moves_to.is_none(), "missing target reads as none")?;
    let parsed: ExitRule = serde_json::from_value(rules[1].clone())?;
    ensure(parsed.moves_to == Some(stage(3)), "stage id reads back")?;
    Ok(())
}
