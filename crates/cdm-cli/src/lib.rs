//! Command-line front end for the source-to-CDM mapping engine.

pub mod cli;
pub mod commands;
pub mod definition;
pub mod logging;
pub mod progress;
pub mod summary;
