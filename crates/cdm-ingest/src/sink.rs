//! Record sinks: the output side of a mapping run.

use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use tracing::debug;

use cdm_model::{Record, Schema};

/// Accepts one record at a time and releases its resources exactly once.
///
/// Sinks write only the fields their schema declares; extra fields are
/// silently dropped on write and absent fields default to empty string.
pub trait RecordSink {
    fn schema(&self) -> &Schema;

    fn write(&mut self, record: &Record) -> Result<()>;

    /// Flushes and releases held resources. Safe to call more than once;
    /// only the first call does work.
    fn close(&mut self) -> Result<()>;
}

/// When a CSV sink writes its header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Header goes out with the first record; a never-written sink leaves
    /// no file content.
    #[default]
    OnFirstWrite,
    /// Header is written at construction, so a never-written sink still
    /// produces a header-only file. Some mapping scripts want the empty
    /// output registered downstream.
    Eager,
}

/// CSV-backed sink writing one row per record.
pub struct CsvSink {
    schema: Schema,
    writer: Option<csv::Writer<File>>,
    header_written: bool,
}

impl CsvSink {
    pub fn create(path: &Path, schema: Schema) -> Result<Self> {
        Self::create_with_policy(path, schema, HeaderPolicy::default())
    }

    pub fn create_with_policy(
        path: &Path,
        schema: Schema,
        policy: HeaderPolicy,
    ) -> Result<Self> {
        let writer = WriterBuilder::new()
            .from_path(path)
            .with_context(|| format!("create csv: {}", path.display()))?;
        let mut sink = Self {
            schema,
            writer: Some(writer),
            header_written: false,
        };
        if policy == HeaderPolicy::Eager {
            sink.write_header()?;
        }
        Ok(sink)
    }

    fn write_header(&mut self) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        if let Some(writer) = self.writer.as_mut() {
            let fields: Vec<&str> = self.schema.all_fields().collect();
            writer
                .write_record(&fields)
                .with_context(|| format!("write header for {}", self.schema.name()))?;
            self.header_written = true;
        }
        Ok(())
    }
}

impl RecordSink for CsvSink {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn write(&mut self, record: &Record) -> Result<()> {
        self.write_header()?;
        let Some(writer) = self.writer.as_mut() else {
            anyhow::bail!("write to closed sink {}", self.schema.name());
        };
        let row: Vec<&str> = self
            .schema
            .all_fields()
            .map(|field| record.get(field).map(String::as_str).unwrap_or(""))
            .collect();
        writer
            .write_record(&row)
            .with_context(|| format!("write record for {}", self.schema.name()))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .with_context(|| format!("flush sink {}", self.schema.name()))?;
            debug!(sink = self.schema.name(), "closed csv sink");
        }
        Ok(())
    }
}

/// In-memory sink for tests and library callers.
///
/// The written records stay reachable through a shared handle after the
/// runner has consumed the boxed sink.
pub struct VecSink {
    schema: Schema,
    records: Arc<Mutex<Vec<Record>>>,
    closed: bool,
}

impl VecSink {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Arc::new(Mutex::new(Vec::new())),
            closed: false,
        }
    }

    /// Handle to the written records for later inspection.
    pub fn records(&self) -> Arc<Mutex<Vec<Record>>> {
        Arc::clone(&self.records)
    }
}

impl RecordSink for VecSink {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn write(&mut self, record: &Record) -> Result<()> {
        if self.closed {
            anyhow::bail!("write to closed sink {}", self.schema.name());
        }
        let mut projected = Record::new();
        for field in self.schema.all_fields() {
            projected.insert(
                field.to_string(),
                record.get(field).cloned().unwrap_or_default(),
            );
        }
        self.records
            .lock()
            .map_err(|_| anyhow::anyhow!("sink buffer lock poisoned"))?
            .push(projected);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
