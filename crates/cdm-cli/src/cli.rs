//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cdm-etl",
    version,
    about = "Map prepared clinical source extracts into a common data model",
    long_about = "Apply a declarative mapping definition to a prepared source CSV,\n\
                  routing each record to its CDM output table and writing one CSV\n\
                  per registered output."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a mapping definition over an input CSV.
    Run(RunArgs),

    /// List the built-in mapper primitives.
    Mappers,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Prepared source CSV (header row supplies the field names).
    #[arg(value_name = "INPUT_CSV")]
    pub input: PathBuf,

    /// Mapping definition file (JSON).
    #[arg(long = "definition", short = 'd', value_name = "PATH")]
    pub definition: PathBuf,

    /// Directory for output CSVs, one per output tag
    /// (default: alongside the input).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Records between progress log lines.
    #[arg(long = "progress-interval", value_name = "N")]
    pub progress_interval: Option<u64>,

    /// Write header rows even for outputs that receive no records.
    #[arg(long = "eager-headers")]
    pub eager_headers: bool,

    /// Hide the interactive progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
