use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use kosloader::config::{prepare_output_path, Config, LogLevel};
use kosloader::{logging, pipeline};

/// Downloads courses and parallels of the current and the next semester from KOS.
///
/// Credentials are read from `KOS_USERNAME` and `KOS_PASSWORD`, verbosity from `LOGLEVEL`.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path of the JSON file to write
    output: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging must be up before the rest of the config is validated
    let level = LogLevel::from_lookup(|name| std::env::var(name).ok()).unwrap_or_else(|e| {
        eprintln!("{e}, falling back to info");
        LogLevel::Info
    });
    logging::init(level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env(cli.output).context("Invalid configuration")?;
    prepare_output_path(&config.output_path).context("Invalid output file path")?;

    let summary = pipeline::run(&config).await.context("Loading KOS data failed")?;
    info!(
        current = %summary.current_semester,
        next = %summary.next_semester,
        current_courses = summary.current_courses,
        next_courses = summary.next_courses,
        "Finished"
    );
    Ok(())
}
