//! Tests for the mapper primitives.

use std::collections::BTreeMap;
use std::io::Write;

use cdm_map::{
    CascadeMapper, CaseMapper, ChainMapper, ConcatMapper, ConstantMapper, FieldMapper,
    FilterFirstMapper, FloatMapper, FunctionMapper, IdentityMapper, LookupMapper, MapError,
    PassThroughFunctionMapper, ReplacementMapper, TranslateMapper, TruncateMapper,
};
use cdm_model::{Record, record_from_pairs};

#[test]
fn identity_returns_input_unchanged() {
    let record = record_from_pairs([("a", "1"), ("b", "")]);
    assert_eq!(IdentityMapper.map(&record).unwrap(), record);
}

#[test]
fn translate_hits_and_misses() {
    let mapper = TranslateMapper::new([("M", "MALE"), ("F", "FEMALE")]);
    let hit = mapper.map(&record_from_pairs([("s_gender", "M")])).unwrap();
    assert_eq!(hit, record_from_pairs([("s_gender", "MALE")]));

    // Unmatched value yields an empty result, not an error.
    let miss = mapper.map(&record_from_pairs([("s_gender", "U")])).unwrap();
    assert!(miss.is_empty());
}

#[test]
fn lookup_returns_whole_record() {
    let mut table = BTreeMap::new();
    table.insert(
        "8867-4".to_string(),
        record_from_pairs([("concept_id", "3027018"), ("concept_name", "Heart rate")]),
    );
    let mapper = LookupMapper::new(table);
    let out = mapper.map(&record_from_pairs([("s_code", "8867-4")])).unwrap();
    assert_eq!(out.get("concept_id").map(String::as_str), Some("3027018"));

    let miss = mapper.map(&record_from_pairs([("s_code", "0000-0")])).unwrap();
    assert!(miss.is_empty());
}

#[test]
fn lookup_from_json_file_takes_first_of_list() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    write!(
        file,
        r#"{{
            "E11": [
                {{"concept_id": "201826", "vocabulary": "SNOMED"}},
                {{"concept_id": "999999", "vocabulary": "ICD10"}}
            ],
            "I10": {{"concept_id": "320128", "vocabulary": "SNOMED"}}
        }}"#
    )
    .unwrap();
    file.flush().unwrap();

    let mapper = LookupMapper::from_json_file(file.path()).unwrap();
    let dup = mapper.map(&record_from_pairs([("s_code", "E11")])).unwrap();
    assert_eq!(dup.get("concept_id").map(String::as_str), Some("201826"));
    let single = mapper.map(&record_from_pairs([("s_code", "I10")])).unwrap();
    assert_eq!(single.get("concept_id").map(String::as_str), Some("320128"));
}

#[test]
fn lookup_rejects_malformed_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    write!(file, "[1, 2, 3]").unwrap();
    file.flush().unwrap();
    assert!(matches!(
        LookupMapper::from_json_file(file.path()),
        Err(MapError::LookupFormat { .. })
    ));
}

#[test]
fn lookup_with_key_field_selects_among_many() {
    let mut table = BTreeMap::new();
    table.insert("A".to_string(), record_from_pairs([("kind", "alpha")]));
    let mapper = LookupMapper::new(table).with_key_field("s_type");
    let out = mapper
        .map(&record_from_pairs([("s_type", "A"), ("s_other", "x")]))
        .unwrap();
    assert_eq!(out.get("kind").map(String::as_str), Some("alpha"));
}

#[test]
fn chain_feeds_output_forward() {
    let first = TranslateMapper::new([("M", "8507")]);
    let second = ReplacementMapper::new([("8507", "MALE_CONCEPT")]);
    let chain = ChainMapper::new(vec![Box::new(first), Box::new(second)]);
    let out = chain.map(&record_from_pairs([("s_gender", "M")])).unwrap();
    assert_eq!(out, record_from_pairs([("s_gender", "MALE_CONCEPT")]));
}

#[test]
fn chain_starves_when_upstream_produces_nothing() {
    let first = TranslateMapper::new([("M", "8507")]);
    let second = ReplacementMapper::new([("8507", "MALE_CONCEPT")]);
    let chain = ChainMapper::new(vec![Box::new(first), Box::new(second)]);
    let out = chain.map(&record_from_pairs([("s_gender", "?")])).unwrap();
    assert!(out.is_empty());
}

#[test]
fn cascade_falls_through_to_first_non_empty() {
    // Scenario: code is empty, so the name filter wins.
    let cascade = CascadeMapper::new(vec![
        Box::new(FilterFirstMapper::new(["code"])),
        Box::new(FilterFirstMapper::new(["name"])),
    ]);
    let record = record_from_pairs([("code", ""), ("name", "Heart Rate")]);
    let out = cascade.map(&record).unwrap();
    assert_eq!(out, record_from_pairs([("name", "Heart Rate")]));
}

#[test]
fn cascade_exhausted_is_empty() {
    let cascade = CascadeMapper::new(vec![
        Box::new(FilterFirstMapper::new(["code"])),
        Box::new(FilterFirstMapper::new(["name"])),
    ]);
    let record = record_from_pairs([("code", ""), ("name", "")]);
    assert!(cascade.map(&record).unwrap().is_empty());
}

#[test]
fn filter_first_returns_first_non_empty_pair() {
    let mapper = FilterFirstMapper::new(["loinc", "snomed", "raw"]);
    let record = record_from_pairs([("loinc", ""), ("snomed", "364075005"), ("raw", "HR")]);
    let out = mapper.map(&record).unwrap();
    assert_eq!(out, record_from_pairs([("snomed", "364075005")]));
}

#[test]
fn filter_first_tolerates_absent_keys() {
    let mapper = FilterFirstMapper::new(["loinc", "snomed"]);
    assert!(mapper.tolerates_missing());
    let record = record_from_pairs([("snomed", "X")]);
    assert_eq!(mapper.map(&record).unwrap(), record_from_pairs([("snomed", "X")]));
}

#[test]
fn constant_ignores_input() {
    let mapper = ConstantMapper::single("condition_type_concept_id", "32020");
    let out = mapper.map(&record_from_pairs([("whatever", "1")])).unwrap();
    assert_eq!(
        out,
        record_from_pairs([("condition_type_concept_id", "32020")])
    );
}

#[test]
fn function_mapper_produces_one_named_key() {
    let mapper = FunctionMapper::new("i_exclude", |record: &Record| {
        if record.get("s_status").map(String::as_str) == Some("VOID") {
            "1".to_string()
        } else {
            String::new()
        }
    });
    let out = mapper.map(&record_from_pairs([("s_status", "VOID")])).unwrap();
    assert_eq!(out, record_from_pairs([("i_exclude", "1")]));
}

#[test]
fn pass_through_function_mapper_builds_whole_record() {
    let mapper = PassThroughFunctionMapper::new(|record: &Record| {
        let mut out = record.clone();
        out.insert("seen".to_string(), "1".to_string());
        out
    });
    let out = mapper.map(&record_from_pairs([("a", "b")])).unwrap();
    assert_eq!(out, record_from_pairs([("a", "b"), ("seen", "1")]));
}

#[test]
fn case_mapper_dispatches_on_discriminator() {
    let mapper = CaseMapper::new(
        |record: &Record| {
            match record.get("s_code_type").map(String::as_str) {
                Some("ICD9") => 0,
                _ => 1,
            }
        },
        vec![
            Box::new(ConstantMapper::single("system", "icd9")),
            Box::new(ConstantMapper::single("system", "icd10")),
        ],
    );
    let icd9 = mapper
        .map(&record_from_pairs([("s_code_type", "ICD9")]))
        .unwrap();
    assert_eq!(icd9, record_from_pairs([("system", "icd9")]));
    let other = mapper
        .map(&record_from_pairs([("s_code_type", "CPT")]))
        .unwrap();
    assert_eq!(other, record_from_pairs([("system", "icd10")]));
}

#[test]
fn case_mapper_rejects_out_of_range_arm() {
    let mapper = CaseMapper::new(
        |_: &Record| 5,
        vec![Box::new(IdentityMapper)],
    );
    let err = mapper.map(&record_from_pairs([("x", "1")])).unwrap_err();
    assert!(matches!(
        err,
        MapError::CaseArmOutOfRange { index: 5, arms: 1 }
    ));
}

#[test]
fn float_mapper_coercion() {
    let ok = FloatMapper.map(&record_from_pairs([("v", "12.5")])).unwrap();
    assert_eq!(ok, record_from_pairs([("v", "12.5")]));

    let trailing = FloatMapper
        .map(&record_from_pairs([("v", "10.50")]))
        .unwrap();
    assert_eq!(trailing, record_from_pairs([("v", "10.5")]));

    let null = FloatMapper.map(&record_from_pairs([("v", "NULL")])).unwrap();
    assert_eq!(null, record_from_pairs([("v", "")]));
    let none = FloatMapper.map(&record_from_pairs([("v", "None")])).unwrap();
    assert_eq!(none, record_from_pairs([("v", "")]));

    // Unparseable values drop the key rather than erroring.
    let bad = FloatMapper.map(&record_from_pairs([("v", "abc")])).unwrap();
    assert!(bad.is_empty());
}

#[test]
fn concat_joins_in_declared_order() {
    let mapper = ConcatMapper::new(["s_first", "s_last"], " ", "full_name");
    let record = record_from_pairs([("s_last", "Doe"), ("s_first", "Jane")]);
    let out = mapper.map(&record).unwrap();
    assert_eq!(out, record_from_pairs([("full_name", "Jane Doe")]));
}

#[test]
fn truncate_clips_every_value() {
    let mapper = TruncateMapper::new(4);
    let record = record_from_pairs([("a", "abcdef"), ("b", "xy")]);
    let out = mapper.map(&record).unwrap();
    assert_eq!(out, record_from_pairs([("a", "abcd"), ("b", "xy")]));
}

mod laws {
    use super::*;
    use proptest::prelude::*;

    fn record_strategy() -> impl Strategy<Value = Record> {
        proptest::collection::btree_map("[a-z]{1,6}", "[a-zA-Z0-9 ]{0,8}", 0..6)
    }

    proptest! {
        #[test]
        fn identity_law(record in record_strategy()) {
            prop_assert_eq!(IdentityMapper.map(&record).unwrap(), record);
        }

        #[test]
        fn replacement_is_total(record in record_strategy()) {
            let mapper = ReplacementMapper::new([("yes", "Y"), ("no", "N")]);
            let out = mapper.map(&record).unwrap();
            let in_keys: Vec<&String> = record.keys().collect();
            let out_keys: Vec<&String> = out.keys().collect();
            prop_assert_eq!(in_keys, out_keys);
            for (key, value) in &record {
                let expected = match value.as_str() {
                    "yes" => "Y",
                    "no" => "N",
                    other => other,
                };
                prop_assert_eq!(out.get(key).unwrap(), expected);
            }
        }

        #[test]
        fn cascade_short_circuits(record in record_strategy()) {
            let first = FilterFirstMapper::new(["a", "b"]);
            let second = ConstantMapper::single("fallback", "1");
            let cascade = CascadeMapper::new(vec![
                Box::new(FilterFirstMapper::new(["a", "b"])),
                Box::new(ConstantMapper::single("fallback", "1")),
            ]);
            let first_result = first.map(&record).unwrap();
            let expected = if first_result.is_empty() {
                second.map(&record).unwrap()
            } else {
                first_result
            };
            prop_assert_eq!(cascade.map(&record).unwrap(), expected);
        }

        #[test]
        fn chain_composes_effects(record in record_strategy()) {
            let a = ReplacementMapper::new([("yes", "Y")]);
            let b = ReplacementMapper::new([("Y", "1")]);
            let chain = ChainMapper::new(vec![
                Box::new(ReplacementMapper::new([("yes", "Y")])),
                Box::new(ReplacementMapper::new([("Y", "1")])),
            ]);
            let expected = b.map(&a.map(&record).unwrap()).unwrap();
            prop_assert_eq!(chain.map(&record).unwrap(), expected);
        }
    }
}
