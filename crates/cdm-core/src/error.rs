//! Error types for mapping runs.

use cdm_map::MapError;
use cdm_model::OutputTag;
use thiserror::Error;

/// Fatal run errors. Anything here aborts the run; per-value data quality
/// conditions never reach this level.
#[derive(Debug, Error)]
pub enum RunError {
    /// The router produced a tag with no registered mapping plan. A
    /// programming error in rule registration, never silently skipped.
    #[error("no mapping plan registered for input {input:?} -> output {tag:?}")]
    NoPlanRegistered { input: String, tag: OutputTag },

    /// The router produced a tag with no registered sink.
    #[error("no sink registered for output {tag:?}")]
    NoSinkRegistered { tag: OutputTag },

    /// A mapping plan failed on a specific record. The raw record is part
    /// of the message: these runs are unattended and the offending row
    /// must be printable from the error alone.
    #[error("mapping failed on record {record}: {source}")]
    Map {
        record: String,
        #[source]
        source: MapError,
    },

    /// The input source failed while reading.
    #[error("input source failed at record {row}: {source}")]
    Source {
        row: u64,
        #[source]
        source: anyhow::Error,
    },

    /// A sink rejected a write or failed to close.
    #[error("sink {tag:?} failed: {source}")]
    Sink {
        tag: OutputTag,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, RunError>;
