//! Record type and value conventions.
//!
//! A record is an order-irrelevant mapping from field name to string value.
//! The empty string is the canonical "no value" sentinel and is distinct
//! from the field being absent altogether.

use std::collections::BTreeMap;

/// A single data record flowing through the engine.
pub type Record = BTreeMap<String, String>;

/// Builds a record from `(field, value)` pairs.
///
/// Convenience for rule construction and tests.
pub fn record_from_pairs<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Returns true if the record holds a non-empty value for `field`.
pub fn has_value(record: &Record, field: &str) -> bool {
    record.get(field).is_some_and(|v| !v.is_empty())
}

/// Interprets a flag value the way exclusion markers are written by
/// source preparation scripts: any non-empty value other than an explicit
/// "0"/"false" counts as set.
pub fn is_flag_set(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    !trimmed.eq_ignore_ascii_case("0") && !trimmed.eq_ignore_ascii_case("false")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_no_value() {
        let record = record_from_pairs([("code", ""), ("name", "Heart Rate")]);
        assert!(!has_value(&record, "code"));
        assert!(has_value(&record, "name"));
        assert!(!has_value(&record, "absent"));
    }

    #[test]
    fn flag_values() {
        assert!(is_flag_set("1"));
        assert!(is_flag_set("true"));
        assert!(is_flag_set("y"));
        assert!(!is_flag_set(""));
        assert!(!is_flag_set("  "));
        assert!(!is_flag_set("0"));
        assert!(!is_flag_set("False"));
    }
}
