//! Command implementations.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use cdm_core::{
    ExcludeRouter, MappingDirectory, MappingRunner, OutputDirectory, RunOptions, RunReport,
};
use cdm_ingest::{CsvSink, CsvSource, HeaderPolicy, RecordSource};

use crate::cli::RunArgs;
use crate::definition::MappingDefinition;
use crate::progress::ProgressSource;

/// Outcome of a `run` invocation, for the summary printer.
pub struct RunOutcome {
    pub report: RunReport,
    pub outputs: Vec<(String, PathBuf)>,
}

pub fn run_mapping(args: &RunArgs) -> Result<RunOutcome> {
    let definition = MappingDefinition::from_path(&args.definition)?;
    let base_dir = args
        .definition
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let source = match definition.input_schema() {
        Some(schema) => CsvSource::open_with_schema(&args.input, schema)?,
        None => CsvSource::open(&args.input)?,
    };
    let input_schema = source.schema().name().to_string();

    let mut plans = MappingDirectory::new();
    for (tag, plan) in definition.build_plans(&base_dir)? {
        plans.register(input_schema.clone(), tag, plan);
    }

    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("create output dir: {}", output_dir.display()))?;

    let policy = if args.eager_headers {
        HeaderPolicy::Eager
    } else {
        HeaderPolicy::OnFirstWrite
    };
    let mut outputs = OutputDirectory::new();
    let mut output_paths = Vec::new();
    for (tag, schema) in definition.output_schemas()? {
        let path = output_dir.join(format!("{tag}.csv"));
        let sink = CsvSink::create_with_policy(&path, schema, policy)?;
        output_paths.push((tag.to_string(), path));
        outputs.register(tag, Box::new(sink));
    }

    let router = ExcludeRouter::new(definition.build_router()?);
    let mut options = RunOptions::new();
    if let Some(interval) = args.progress_interval {
        options = options.with_progress_interval(interval);
    }

    info!(input = %args.input.display(), definition = %args.definition.display(), "starting run");
    let report = if args.no_progress {
        MappingRunner::new(source, router, plans, outputs)
            .with_options(options)
            .run()?
    } else {
        MappingRunner::new(ProgressSource::new(source), router, plans, outputs)
            .with_options(options)
            .run()?
    };

    Ok(RunOutcome {
        report,
        outputs: output_paths,
    })
}

/// One-line descriptions of the built-in mapper primitives.
pub const MAPPER_DESCRIPTIONS: [(&str, &str); 13] = [
    ("identity", "return the input unchanged"),
    ("translate", "dictionary translation of a field's value; miss yields nothing"),
    ("lookup", "JSON-backed lookup producing a whole sub-record"),
    ("replacement", "total value substitution; unmatched values pass through"),
    ("chain", "sequential composition, each output feeding the next"),
    ("cascade", "first non-empty result wins"),
    ("filter_first", "first non-empty key from an ordered list"),
    ("case", "discriminator-selected dispatch between child mappers"),
    ("constant", "always emit a fixed record"),
    ("function", "closure computing one named output key"),
    ("pass_through_function", "closure producing the full output record"),
    ("float", "numeric normalization; NULL literals become empty"),
    ("concat / truncate", "join fields with a delimiter; clip to a maximum length"),
];

pub fn run_mappers() {
    for (name, description) in MAPPER_DESCRIPTIONS {
        println!("{name:<24} {description}");
    }
}
