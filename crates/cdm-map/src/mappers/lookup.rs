//! Dictionary-backed mappers: value translation, multi-field lookup, and
//! total replacement.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use cdm_model::Record;
use tracing::warn;

use crate::error::{MapError, Result};
use crate::mapper::FieldMapper;

/// Exact-match value translation through a static dictionary.
///
/// Each input key whose value is found in the table is emitted under the
/// same key with the translated value. An unmatched value yields an empty
/// result, never an error.
#[derive(Debug, Clone)]
pub struct TranslateMapper {
    table: BTreeMap<String, String>,
}

impl TranslateMapper {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            table: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl FieldMapper for TranslateMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        let mut out = Record::new();
        for (key, value) in fields {
            if let Some(translated) = self.table.get(value) {
                out.insert(key.clone(), translated.clone());
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "translate"
    }
}

/// Exact-match lookup producing a whole sub-record per key.
///
/// The table maps one field's value to a record of output fields. Built
/// either in memory or from a JSON file whose top-level keys are lookup
/// values and whose values are objects (or arrays of objects when several
/// source rows collapsed onto the same key).
#[derive(Debug, Clone)]
pub struct LookupMapper {
    table: BTreeMap<String, Record>,
    key_field: Option<String>,
}

impl LookupMapper {
    pub fn new(table: BTreeMap<String, Record>) -> Self {
        Self {
            table,
            key_field: None,
        }
    }

    /// Looks up the value of a specific field instead of the sole
    /// projected field.
    #[must_use]
    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = Some(field.into());
        self
    }

    /// Loads a lookup table from a JSON file.
    ///
    /// A key whose value is an array takes the first element; that is a
    /// data quality situation in the source extract, not a bug, so it is
    /// logged and tolerated.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| MapError::LookupIo {
            path: path.to_path_buf(),
            source,
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|err| MapError::LookupFormat {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        let serde_json::Value::Object(entries) = value else {
            return Err(MapError::LookupFormat {
                path: path.to_path_buf(),
                message: "top level must be an object".to_string(),
            });
        };
        let mut table = BTreeMap::new();
        for (key, entry) in entries {
            let object = match entry {
                serde_json::Value::Object(object) => object,
                serde_json::Value::Array(items) => {
                    warn!(
                        lookup = %path.display(),
                        key = %key,
                        candidates = items.len(),
                        "multiple rows mapped to the same lookup key; taking the first"
                    );
                    match items.into_iter().next() {
                        Some(serde_json::Value::Object(object)) => object,
                        _ => {
                            return Err(MapError::LookupFormat {
                                path: path.to_path_buf(),
                                message: format!("key {key:?}: array entries must be objects"),
                            });
                        }
                    }
                }
                other => {
                    return Err(MapError::LookupFormat {
                        path: path.to_path_buf(),
                        message: format!(
                            "key {key:?}: expected object or array, found {other}"
                        ),
                    });
                }
            };
            let mut record = Record::new();
            for (field, field_value) in object {
                record.insert(field, json_scalar_to_string(&field_value));
            }
            table.insert(key, record);
        }
        Ok(Self {
            table,
            key_field: None,
        })
    }

    fn lookup_value<'a>(&self, fields: &'a Record) -> Option<&'a str> {
        match &self.key_field {
            Some(field) => fields.get(field).map(String::as_str),
            // Without an explicit key field the mapper expects to see the
            // rule's single declared source field.
            None if fields.len() == 1 => fields.values().next().map(String::as_str),
            None => None,
        }
    }
}

impl FieldMapper for LookupMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        let Some(value) = self.lookup_value(fields) else {
            return Ok(Record::new());
        };
        Ok(self.table.get(value).cloned().unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "lookup"
    }
}

fn json_scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Exact string substitution that never drops a key.
///
/// Every input key is returned; values present in the table are replaced,
/// everything else passes through unchanged.
#[derive(Debug, Clone)]
pub struct ReplacementMapper {
    table: BTreeMap<String, String>,
}

impl ReplacementMapper {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            table: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl FieldMapper for ReplacementMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        let mut out = Record::new();
        for (key, value) in fields {
            let replaced = self.table.get(value).cloned().unwrap_or_else(|| value.clone());
            out.insert(key.clone(), replaced);
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "replacement"
    }
}
