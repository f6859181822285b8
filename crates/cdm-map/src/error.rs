//! Error types for mapper construction and plan execution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from building or executing mapping rules.
///
/// Per-value misses (lookup miss, unparseable number, empty filter match)
/// are not errors: mappers resolve those locally by returning an empty
/// result. Everything here is either a construction-time configuration
/// problem or a run-fatal bug surfaced while applying a plan.
#[derive(Debug, Error)]
pub enum MapError {
    /// A declared source field is absent from the current record. This is
    /// a schema/rule mismatch, not a data quality issue, and aborts the
    /// run.
    #[error("cannot find key {field:?} in input record")]
    MissingField { field: String },

    /// A case mapper's discriminator selected an arm that was never
    /// registered.
    #[error("case mapper selected arm {index} but only {arms} arms are registered")]
    CaseArmOutOfRange { index: usize, arms: usize },

    /// A rule spec that cannot be compiled (empty field name, empty field
    /// list, empty target).
    #[error("malformed rule: {0}")]
    MalformedRule(String),

    /// Lookup table file could not be read.
    #[error("lookup table {path}: {source}")]
    LookupIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Lookup table file is not valid JSON or has an unsupported shape.
    #[error("lookup table {path}: {message}")]
    LookupFormat { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, MapError>;
