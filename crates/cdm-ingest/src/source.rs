//! Record sources: the input side of a mapping run.

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use tracing::debug;

use cdm_model::{ROW_ID_FIELD, Record, Schema};

/// A read-once forward iterator over records.
///
/// Sources inject the synthetic `:row_id` field (1-based) and backfill
/// every declared-but-absent schema field with an empty string before
/// yielding, so downstream rules can rely on declared fields being
/// present.
pub trait RecordSource {
    fn schema(&self) -> &Schema;

    /// Yields the next record, or `None` when the source is exhausted.
    fn next_record(&mut self) -> Result<Option<Record>>;
}

/// In-memory source for tests and library callers.
pub struct VecSource {
    schema: Schema,
    records: std::vec::IntoIter<Record>,
    row_id: u64,
}

impl VecSource {
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self {
            schema,
            records: records.into_iter(),
            row_id: 0,
        }
    }
}

impl RecordSource for VecSource {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        let Some(mut record) = self.records.next() else {
            return Ok(None);
        };
        self.row_id += 1;
        record.insert(ROW_ID_FIELD.to_string(), self.row_id.to_string());
        self.schema.backfill(&mut record);
        Ok(Some(record))
    }
}

/// CSV-backed record source. The header row supplies the field names.
pub struct CsvSource {
    schema: Schema,
    reader: csv::Reader<std::fs::File>,
    headers: Vec<String>,
    row_id: u64,
}

impl CsvSource {
    /// Opens a CSV file, reading the header row immediately.
    ///
    /// The schema is derived from the header; callers that want declared
    /// fields beyond the header (parent fields such as `i_exclude`)
    /// should use [`CsvSource::open_with_schema`].
    pub fn open(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        Self::open_named(path, name, None)
    }

    /// Opens a CSV file with an explicit schema; header fields missing
    /// from the schema are still carried through, schema fields missing
    /// from the header are backfilled per record.
    pub fn open_with_schema(path: &Path, schema: Schema) -> Result<Self> {
        let name = schema.name().to_string();
        Self::open_named(path, name, Some(schema))
    }

    fn open_named(path: &Path, name: String, schema: Option<Schema>) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("read csv: {}", path.display()))?;
        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("read header: {}", path.display()))?
            .iter()
            .map(normalize_cell)
            .collect();
        let schema = schema.unwrap_or_else(|| Schema::new(name, headers.clone()));
        debug!(
            source = %path.display(),
            schema = schema.name(),
            columns = headers.len(),
            "opened csv source"
        );
        Ok(Self {
            schema,
            reader,
            headers,
            row_id: 0,
        })
    }
}

impl RecordSource for CsvSource {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        let mut raw = csv::StringRecord::new();
        let more = self
            .reader
            .read_record(&mut raw)
            .with_context(|| format!("read record {}", self.row_id + 1))?;
        if !more {
            return Ok(None);
        }
        self.row_id += 1;
        let mut record = Record::new();
        for (idx, header) in self.headers.iter().enumerate() {
            let value = raw.get(idx).unwrap_or("");
            record.insert(header.clone(), normalize_cell(value));
        }
        record.insert(ROW_ID_FIELD.to_string(), self.row_id.to_string());
        self.schema.backfill(&mut record);
        Ok(Some(record))
    }
}

/// Trims whitespace and strips a UTF-8 BOM left by spreadsheet exports.
fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}
