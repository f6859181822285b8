//! Orchestration for mapping runs: routing, dispatch directories, and
//! the streaming runner.
//!
//! A run wires together one [`cdm_ingest::RecordSource`], a [`Router`],
//! a [`MappingDirectory`] of compiled plans keyed by
//! `(input schema, output tag)`, and an [`OutputDirectory`] of sinks.
//! The [`MappingRunner`] reads one record at a time, routes it, executes
//! the matching plan, and writes the result; routing statistics accumulate
//! into the final [`RunReport`].

pub mod directory;
pub mod error;
pub mod router;
pub mod runner;

pub use directory::{MappingDirectory, OutputDirectory};
pub use error::{Result, RunError};
pub use router::{ExcludeRouter, FnRouter, RouteDecision, Router};
pub use runner::{DEFAULT_PROGRESS_INTERVAL, MappingRunner, RunOptions, RunReport};
