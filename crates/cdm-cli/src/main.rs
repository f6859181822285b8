//! CDM mapping CLI.

use clap::Parser;
use tracing::level_filters::LevelFilter;

use cdm_cli::cli::{Cli, Command, LogFormatArg};
use cdm_cli::commands::{run_mappers, run_mapping};
use cdm_cli::logging::{LogConfig, LogFormat, init_logging};
use cdm_cli::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Run(args) => match run_mapping(&args) {
            Ok(outcome) => {
                print_summary(&outcome);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Mappers => {
            run_mappers();
            0
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: verbosity_filter(cli),
        ..LogConfig::default()
    };
    config.use_env_filter = !cli.verbosity.is_present();
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    if config.log_file.is_some() {
        config.with_ansi = false;
    }
    config
}

fn verbosity_filter(cli: &Cli) -> LevelFilter {
    cli.verbosity.tracing_level_filter()
}
