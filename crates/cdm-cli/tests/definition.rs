//! Tests for mapping definition parsing and compilation.

use std::io::Write;
use std::path::Path;

use cdm_cli::definition::MappingDefinition;
use cdm_core::{RouteDecision, Router};
use cdm_model::record_from_pairs;

fn parse(json: &str) -> MappingDefinition {
    serde_json::from_str(json).expect("parse definition")
}

const PERSON_DEFINITION: &str = r#"{
    "outputs": [
        {"tag": "person", "fields": ["person_id", "sex", "year_of_birth"]}
    ],
    "rules": {
        "person": [
            {"kind": "rename", "field": "id", "target": "person_id"},
            {"kind": "translate", "field": "gender_code",
             "table": {"M": "Male", "F": "Female"}, "target": "sex"},
            {"kind": "float", "field": "birth_year", "target": "year_of_birth"}
        ]
    }
}"#;

#[test]
fn single_output_definition_compiles_and_maps() {
    let definition = parse(PERSON_DEFINITION);
    let plans = definition.build_plans(Path::new(".")).unwrap();
    assert_eq!(plans.len(), 1);
    let (tag, plan) = &plans[0];
    assert_eq!(tag.as_str(), "person");

    let record = record_from_pairs([
        ("id", "7"),
        ("gender_code", "F"),
        ("birth_year", "1985.0"),
    ]);
    let out = plan.apply(&record).unwrap();
    assert_eq!(
        out,
        record_from_pairs([
            ("person_id", "7"),
            ("sex", "Female"),
            ("year_of_birth", "1985"),
        ])
    );
}

#[test]
fn sole_output_routes_everything_there() {
    let definition = parse(PERSON_DEFINITION);
    let router = definition.build_router().unwrap();
    let decision = router.route(&record_from_pairs([("id", "1")]));
    match decision {
        RouteDecision::To(tag) => assert_eq!(tag.as_str(), "person"),
        other => panic!("expected To(person), got {other:?}"),
    }
}

#[test]
fn route_table_dispatches_by_field_value() {
    let definition = parse(
        r#"{
            "outputs": [
                {"tag": "condition", "fields": ["code"]},
                {"tag": "measurement", "fields": ["code"]}
            ],
            "rules": {
                "condition": [{"kind": "rename", "field": "s_code", "target": "code"}],
                "measurement": [{"kind": "rename", "field": "s_code", "target": "code"}]
            },
            "route": {
                "field": "s_type",
                "table": {"DX": "condition", "LAB": "measurement"}
            }
        }"#,
    );
    let router = definition.build_router().unwrap();
    match router.route(&record_from_pairs([("s_type", "DX")])) {
        RouteDecision::To(tag) => assert_eq!(tag.as_str(), "condition"),
        other => panic!("unexpected {other:?}"),
    }
    match router.route(&record_from_pairs([("s_type", "LAB")])) {
        RouteDecision::To(tag) => assert_eq!(tag.as_str(), "measurement"),
        other => panic!("unexpected {other:?}"),
    }
    // No table entry, no default: deliberate exclusion.
    assert_eq!(
        router.route(&record_from_pairs([("s_type", "RX")])),
        RouteDecision::NoOutput
    );
}

#[test]
fn multiple_outputs_without_route_is_rejected() {
    let raw = r#"{
        "outputs": [
            {"tag": "a", "fields": ["x"]},
            {"tag": "b", "fields": ["x"]}
        ],
        "rules": {
            "a": [{"kind": "identity", "field": "x"}],
            "b": [{"kind": "identity", "field": "x"}]
        }
    }"#;
    let definition: MappingDefinition = serde_json::from_str(raw).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("definition.json");
    std::fs::write(&path, raw).unwrap();
    assert!(MappingDefinition::from_path(&path).is_err());
    // The in-memory copy still compiles plans; only validation rejects it.
    assert!(definition.build_plans(dir.path()).is_ok());
}

#[test]
fn lookup_rules_resolve_relative_to_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut lookup = std::fs::File::create(dir.path().join("gender.json")).unwrap();
    write!(
        lookup,
        r#"{{"M": {{"gender_concept_id": "8507"}}, "F": {{"gender_concept_id": "8532"}}}}"#
    )
    .unwrap();
    drop(lookup);

    let definition = parse(
        r#"{
            "outputs": [{"tag": "person", "fields": ["gender_concept_id"]}],
            "rules": {
                "person": [{"kind": "lookup", "field": "gender_code", "file": "gender.json"}]
            }
        }"#,
    );
    let plans = definition.build_plans(dir.path()).unwrap();
    let out = plans[0]
        .1
        .apply(&record_from_pairs([("gender_code", "M")]))
        .unwrap();
    assert_eq!(
        out.get("gender_concept_id").map(String::as_str),
        Some("8507")
    );
}
