//! Value-shaping mappers: numeric coercion, concatenation, truncation.

use cdm_model::Record;

use crate::error::Result;
use crate::mapper::FieldMapper;

/// Normalizes numeric strings.
///
/// Values parse as f64 and are re-rendered without trailing zeros. The
/// literal strings `NULL`, `None`, and `null` are "no value" and become
/// empty strings. Anything else non-numeric drops the key rather than
/// erroring; bad numbers in clinical extracts are routine.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatMapper;

const NULL_LITERALS: [&str; 3] = ["NULL", "None", "null"];

impl FieldMapper for FloatMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        let mut out = Record::new();
        for (key, value) in fields {
            let trimmed = value.trim();
            if trimmed.is_empty() || NULL_LITERALS.contains(&trimmed) {
                out.insert(key.clone(), String::new());
                continue;
            }
            if let Ok(parsed) = trimmed.parse::<f64>() {
                out.insert(key.clone(), format_numeric(parsed));
            }
            // Unparseable: key omitted.
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "float"
    }
}

/// Formats a floating-point number without trailing zeros ("10.50" and
/// "10.0" both come back as canonical forms "10.5" and "10").
pub(crate) fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Joins the values of several fields, in declared order, into one output
/// key.
#[derive(Debug, Clone)]
pub struct ConcatMapper {
    keys: Vec<String>,
    delimiter: String,
    output_key: String,
}

impl ConcatMapper {
    pub fn new<I, S>(keys: I, delimiter: impl Into<String>, output_key: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            delimiter: delimiter.into(),
            output_key: output_key.into(),
        }
    }
}

impl FieldMapper for ConcatMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        let parts: Vec<&str> = self
            .keys
            .iter()
            .map(|key| fields.get(key).map(String::as_str).unwrap_or(""))
            .collect();
        let mut out = Record::new();
        out.insert(self.output_key.clone(), parts.join(&self.delimiter));
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "concat"
    }
}

/// Enforces a maximum string length by keeping the leftmost characters.
///
/// CDM text columns carry hard length limits; over-long source values are
/// clipped, not rejected.
#[derive(Debug, Clone, Copy)]
pub struct TruncateMapper {
    max_len: usize,
}

impl TruncateMapper {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }
}

impl FieldMapper for TruncateMapper {
    fn map(&self, fields: &Record) -> Result<Record> {
        let mut out = Record::new();
        for (key, value) in fields {
            let clipped: String = value.chars().take(self.max_len).collect();
            out.insert(key.clone(), clipped);
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "truncate"
    }
}
