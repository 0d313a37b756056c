use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;

use symgen_core::config::GenerationFlags;
use symgen_core::{Configuration, Generator, Severity};
use symgen_utils::{init_logging, init_logging_with_level, LogFormat, LogLevel};

mod provider;

use provider::JsonSymbolProvider;

/// Generate strongly-typed wrapper source from native debug symbols
#[derive(Parser)]
#[command(name = "symgen")]
#[command(version)]
#[command(about = "Generate strongly-typed wrapper source from native debug symbols", long_about = None)]
struct Cli
{
    /// Path to the JSON configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the configured output directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Concatenate all generated types into a single file
    #[arg(long)]
    single_file: bool,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode
{
    let cli = Cli::parse();

    // Initialize logging before anything can fail, so failures are visible.
    let logging = match &cli.log_level {
        Some(level) => match LogLevel::from_str(level) {
            Ok(level) => init_logging_with_level(level, LogFormat::Pretty),
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => init_logging(),
    };
    if let Err(err) = logging {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let text = match fs::read_to_string(&cli.config) {
        Ok(text) => text,
        Err(err) => {
            tracing::error!("cannot read {}: {err}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };
    let mut configuration = match Configuration::from_json(&text) {
        Ok(configuration) => configuration,
        Err(err) => {
            tracing::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(output_dir) = cli.output_dir {
        configuration.output_directory = output_dir;
    }
    if cli.single_file {
        configuration.generation_flags = configuration.generation_flags.with(GenerationFlags::SINGLE_FILE_EXPORT);
    }

    let generator = Generator::new(configuration, Arc::new(JsonSymbolProvider::new()));
    match generator.generate() {
        Ok(outcome) => {
            tracing::info!(
                files = outcome.emitted_files.len(),
                types = outcome.user_type_count,
                "generation finished"
            );
            let errors = outcome
                .diagnostics
                .iter()
                .filter(|diagnostic| diagnostic.severity == Severity::Error)
                .count();
            if errors > 0 {
                tracing::error!(errors, "generation reported errors");
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
