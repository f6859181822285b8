//! Interactive progress reporting for mapping runs.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use cdm_ingest::RecordSource;
use cdm_model::{Record, Schema};

/// Wraps a record source with an `indicatif` spinner that ticks per
/// record. The record count is unknown up front, so this is a spinner
/// rather than a bar.
pub struct ProgressSource<S> {
    inner: S,
    bar: ProgressBar,
}

impl<S: RecordSource> ProgressSource<S> {
    pub fn new(inner: S) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {pos} records read ({per_sec})")
                .expect("valid progress template"),
        );
        Self { inner, bar }
    }
}

impl<S: RecordSource> RecordSource for ProgressSource<S> {
    fn schema(&self) -> &Schema {
        self.inner.schema()
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        let record = self.inner.next_record()?;
        match &record {
            Some(_) => self.bar.inc(1),
            None => self.bar.finish_and_clear(),
        }
        Ok(record)
    }
}
