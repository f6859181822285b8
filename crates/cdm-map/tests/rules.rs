//! Tests for rule compilation and mapping plan execution.

use std::collections::BTreeMap;

use cdm_map::{
    CascadeMapper, ConstantMapper, FilterFirstMapper, KeyTranslator, MapError, RuleSpec,
    TranslateMapper, compile_rules,
};
use cdm_model::record_from_pairs;

#[test]
fn identity_rule_round_trips() {
    let plan = compile_rules(vec![RuleSpec::identity("s_person_id")]).unwrap();
    let record = record_from_pairs([("s_person_id", "42"), ("s_other", "x")]);
    let out = plan.apply(&record).unwrap();
    assert_eq!(out, record_from_pairs([("s_person_id", "42")]));
}

#[test]
fn rename_rule_retargets_field() {
    let plan = compile_rules(vec![RuleSpec::rename("s_person_id", "person_source_value")])
        .unwrap();
    let record = record_from_pairs([("s_person_id", "42")]);
    let out = plan.apply(&record).unwrap();
    assert_eq!(out, record_from_pairs([("person_source_value", "42")]));
}

#[test]
fn mapped_rule_uses_mapper_keys_verbatim() {
    let plan = compile_rules(vec![RuleSpec::mapped(
        "s_gender",
        TranslateMapper::new([("M", "MALE")]),
    )])
    .unwrap();
    let out = plan.apply(&record_from_pairs([("s_gender", "M")])).unwrap();
    assert_eq!(out, record_from_pairs([("s_gender", "MALE")]));
}

#[test]
fn dictionary_rule_with_rename_target() {
    // gender_code -> sex through a static dictionary.
    let plan = compile_rules(vec![RuleSpec::single(
        "gender_code",
        TranslateMapper::new([("M", "Male"), ("F", "Female")]),
        "sex",
    )])
    .unwrap();
    let out = plan
        .apply(&record_from_pairs([("id", "1"), ("gender_code", "M")]))
        .unwrap();
    assert_eq!(out, record_from_pairs([("sex", "Male")]));
}

#[test]
fn map_target_spreads_multiple_keys() {
    let mut target = BTreeMap::new();
    target.insert("concept_id".to_string(), "gender_concept_id".to_string());
    target.insert("source_value".to_string(), "gender_source_value".to_string());
    let plan = compile_rules(vec![RuleSpec::full(
        ["s_gender"],
        ConstantMapper::new(record_from_pairs([
            ("concept_id", "8507"),
            ("source_value", "M"),
        ])),
        target,
    )])
    .unwrap();
    let out = plan.apply(&record_from_pairs([("s_gender", "M")])).unwrap();
    assert_eq!(
        out,
        record_from_pairs([
            ("gender_concept_id", "8507"),
            ("gender_source_value", "M"),
        ])
    );
}

#[test]
fn translator_target_is_accepted() {
    let plan = compile_rules(vec![RuleSpec::full(
        ["s_value"],
        ConstantMapper::single("v", "12"),
        KeyTranslator::new([("v", "value_as_number")]),
    )])
    .unwrap();
    let out = plan.apply(&record_from_pairs([("s_value", "12")])).unwrap();
    assert_eq!(out, record_from_pairs([("value_as_number", "12")]));
}

#[test]
fn later_rules_overwrite_earlier_on_collision() {
    let plan = compile_rules(vec![
        RuleSpec::full(["a"], ConstantMapper::single("out", "first"), "out"),
        RuleSpec::full(["a"], ConstantMapper::single("out", "second"), "out"),
    ])
    .unwrap();
    let out = plan.apply(&record_from_pairs([("a", "x")])).unwrap();
    assert_eq!(out, record_from_pairs([("out", "second")]));
}

#[test]
fn missing_declared_field_is_a_hard_error() {
    let plan = compile_rules(vec![RuleSpec::identity("s_absent")]).unwrap();
    let err = plan.apply(&record_from_pairs([("other", "1")])).unwrap_err();
    match err {
        MapError::MissingField { field } => assert_eq!(field, "s_absent"),
        other => panic!("expected MissingField, got {other}"),
    }
}

#[test]
fn filter_rules_tolerate_absent_fields() {
    let plan = compile_rules(vec![RuleSpec::mapped(
        "s_optional",
        FilterFirstMapper::new(["s_optional"]),
    )])
    .unwrap();
    // Field absent entirely: filter sees an empty backfill and matches
    // nothing, no error.
    let out = plan.apply(&record_from_pairs([("other", "1")])).unwrap();
    assert!(out.is_empty());
}

#[test]
fn cascade_of_filters_tolerates_absence() {
    let plan = compile_rules(vec![RuleSpec::full(
        ["code", "name"],
        CascadeMapper::new(vec![
            Box::new(FilterFirstMapper::new(["code"])),
            Box::new(FilterFirstMapper::new(["name"])),
        ]),
        KeyTranslator::identity(),
    )])
    .unwrap();
    let out = plan.apply(&record_from_pairs([("name", "Heart Rate")])).unwrap();
    assert_eq!(out, record_from_pairs([("name", "Heart Rate")]));
}

#[test]
fn degenerate_specs_fail_fast() {
    assert!(matches!(
        compile_rules(vec![RuleSpec::identity("")]),
        Err(MapError::MalformedRule(_))
    ));
    assert!(matches!(
        compile_rules(vec![RuleSpec::rename("a", "  ")]),
        Err(MapError::MalformedRule(_))
    ));
    assert!(matches!(
        compile_rules(vec![RuleSpec::full(
            Vec::<String>::new(),
            ConstantMapper::single("k", "v"),
            "out",
        )]),
        Err(MapError::MalformedRule(_))
    ));
    assert!(matches!(
        compile_rules(vec![RuleSpec::full(
            ["a"],
            ConstantMapper::single("k", "v"),
            BTreeMap::new(),
        )]),
        Err(MapError::MalformedRule(_))
    ));
}

#[test]
fn compilation_is_deterministic() {
    let build = || {
        compile_rules(vec![
            RuleSpec::identity("a"),
            RuleSpec::rename("b", "c"),
            RuleSpec::single("d", TranslateMapper::new([("1", "one")]), "e"),
        ])
        .unwrap()
    };
    let record = record_from_pairs([("a", "x"), ("b", "y"), ("d", "1")]);
    assert_eq!(build().apply(&record).unwrap(), build().apply(&record).unwrap());
    assert_eq!(build().len(), 3);
}
