//! The streaming mapping runner.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use cdm_ingest::RecordSource;
use cdm_model::{OutputTag, Record};

use crate::directory::{MappingDirectory, OutputDirectory};
use crate::error::{Result, RunError};
use crate::router::{RouteDecision, Router};

/// Default number of records between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 10_000;

/// Knobs for a mapping run.
#[derive(Clone, Default)]
pub struct RunOptions {
    /// Records between progress log lines; `None` uses the default.
    pub progress_interval: Option<u64>,
    /// Cooperative cancellation flag, checked between records. The
    /// per-record boundary is the only safe suspension point.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Final accounting for a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub input_schema: String,
    pub records_read: u64,
    /// Per-tag routing counts, created lazily per tag.
    pub counts: BTreeMap<OutputTag, u64>,
    /// Records deliberately excluded from output.
    pub no_output: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn total_routed(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// One-shot orchestrator: drives the input stream through routing,
/// plan execution, and sink writes.
///
/// `run` consumes the runner, so a run cannot be restarted or resumed;
/// the state machine is Ready (constructed) -> Running (inside `run`) ->
/// Finished (report returned).
///
/// An error while mapping a specific record aborts the entire run with
/// the offending raw record in the error. Partial, silently-corrupted
/// clinical mappings are worse than a hard stop.
pub struct MappingRunner<S, R> {
    source: S,
    router: R,
    plans: MappingDirectory,
    outputs: OutputDirectory,
    options: RunOptions,
}

impl<S: RecordSource, R: Router> MappingRunner<S, R> {
    pub fn new(source: S, router: R, plans: MappingDirectory, outputs: OutputDirectory) -> Self {
        Self {
            source,
            router,
            plans,
            outputs,
            options: RunOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs to input exhaustion (or cancellation), closes every
    /// registered sink, and reports per-tag counts.
    pub fn run(mut self) -> Result<RunReport> {
        let started = Instant::now();
        let input_schema = self.source.schema().name().to_string();
        let interval = self
            .options
            .progress_interval
            .unwrap_or(DEFAULT_PROGRESS_INTERVAL)
            .max(1);

        let mut records_read: u64 = 0;
        let mut records_written: u64 = 0;
        let mut no_output: u64 = 0;
        let mut counts: BTreeMap<OutputTag, u64> = BTreeMap::new();
        let mut cancelled = false;

        info!(input = %input_schema, "mapping run started");
        loop {
            if let Some(cancel) = &self.options.cancel
                && cancel.load(Ordering::Relaxed)
            {
                cancelled = true;
                info!(records_read, "mapping run cancelled");
                break;
            }
            let record = self
                .source
                .next_record()
                .map_err(|source| RunError::Source {
                    row: records_read + 1,
                    source,
                })?;
            let Some(record) = record else {
                break;
            };
            records_read += 1;

            let record = self.router.pre_map(record);
            let tags = match self.router.route(&record) {
                RouteDecision::To(tag) => vec![tag],
                RouteDecision::Fanout(tags) => tags,
                RouteDecision::NoOutput => Vec::new(),
            };
            if tags.is_empty() {
                no_output += 1;
                trace!(row = records_read, "record excluded from output");
            }
            for tag in tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
                trace!(row = records_read, tag = %tag, "record routed");
                let plan = self.plans.get(&input_schema, &tag).ok_or_else(|| {
                    RunError::NoPlanRegistered {
                        input: input_schema.clone(),
                        tag: tag.clone(),
                    }
                })?;
                let mapped = plan.apply(&record).map_err(|source| RunError::Map {
                    record: format_record(&record),
                    source,
                })?;
                let mapped = self.router.post_map(mapped);
                let sink = self
                    .outputs
                    .get_mut(&tag)
                    .ok_or_else(|| RunError::NoSinkRegistered { tag: tag.clone() })?;
                sink.write(&mapped).map_err(|source| RunError::Sink {
                    tag: tag.clone(),
                    source,
                })?;
                records_written += 1;
            }

            if records_read % interval == 0 {
                info!(
                    records_read,
                    records_written,
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "mapping progress"
                );
            }
        }

        if let Some((tag, source)) = self.outputs.close_all() {
            return Err(RunError::Sink { tag, source });
        }

        let report = RunReport {
            input_schema,
            records_read,
            counts,
            no_output,
            cancelled,
            elapsed: started.elapsed(),
        };
        info!(
            records_read = report.records_read,
            routed = report.total_routed(),
            no_output = report.no_output,
            elapsed_secs = report.elapsed.as_secs_f64(),
            "mapping run finished"
        );
        for (tag, count) in &report.counts {
            debug!(tag = %tag, count, "output count");
        }
        Ok(report)
    }
}

/// Renders a record for error messages, keeping field order stable.
fn format_record(record: &Record) -> String {
    let mut out = String::from("{");
    for (idx, (key, value)) in record.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{key}: {value:?}");
    }
    out.push('}');
    out
}
