mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::commands::{completions, export};
use crate::error::{exit_code_for, report_error};
use dialdex_config as config;

#[derive(Debug, Parser)]
#[command(name = "dialdex", version, about = "ERP contact phone directory extractor")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch active contacts and print the phone directory as JSON
    Export,
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        verbose,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        Command::Export => {
            if verbose {
                match config::resolve_config_path(config_path.clone()) {
                    Ok(path) => debug!(path = %path.display(), "config resolved"),
                    Err(err) => debug!(error = %err, "config unavailable"),
                }
            }
            let app_config = config::load(config_path).with_context(|| "load config")?;
            export::run(&app_config)
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout carries the exported directory; diagnostics go to stderr.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
