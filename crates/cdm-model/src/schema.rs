//! Input and output schema definitions.

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Synthetic field injected by every record source: a 1-based sequential
/// row counter.
pub const ROW_ID_FIELD: &str = ":row_id";

/// Conventional flag field signalling "drop this record from output"
/// without raising an error.
pub const EXCLUDE_FIELD: &str = "i_exclude";

/// A named set of recognized field names.
///
/// Parent fields are appended after the declared fields and are shared by
/// a family of schemas (the `i_exclude` flag is the typical example).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    fields: Vec<String>,
    #[serde(default)]
    parent_fields: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            parent_fields: Vec::new(),
        }
    }

    /// Appends parent fields shared across a schema family.
    #[must_use]
    pub fn with_parent_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parent_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn parent_fields(&self) -> &[String] {
        &self.parent_fields
    }

    /// Declared fields followed by parent fields, in declaration order.
    pub fn all_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .chain(self.parent_fields.iter())
            .map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
            || self.parent_fields.iter().any(|f| f == field)
    }

    /// Inserts an empty string for every declared-but-absent field so that
    /// downstream rules can rely on declared fields being present.
    pub fn backfill(&self, record: &mut Record) {
        for field in self.all_fields() {
            if !record.contains_key(field) {
                record.insert(field.to_string(), String::new());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backfill_inserts_missing_declared_fields() {
        let schema = Schema::new("prepared_person", ["s_person_id", "s_gender"])
            .with_parent_fields([EXCLUDE_FIELD]);
        let mut record = Record::new();
        record.insert("s_person_id".to_string(), "17".to_string());
        schema.backfill(&mut record);
        assert_eq!(record.get("s_gender").map(String::as_str), Some(""));
        assert_eq!(record.get(EXCLUDE_FIELD).map(String::as_str), Some(""));
        assert_eq!(record.get("s_person_id").map(String::as_str), Some("17"));
    }

    #[test]
    fn all_fields_preserves_order() {
        let schema = Schema::new("x", ["a", "b"]).with_parent_fields(["c"]);
        let fields: Vec<&str> = schema.all_fields().collect();
        assert_eq!(fields, vec!["a", "b", "c"]);
        assert!(schema.contains("c"));
        assert!(!schema.contains("d"));
    }
}
