//! # symbolicator - Main Entry Point
//!
//! Reads one report, resolves it against the given dSYM bundles on the
//! background worker, and prints where the symbolicated copy was written
//! (as JSON with `--json`).

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::Path;

use symbolicator::cli::Args;
use symbolicator::config::{Backend, SymbolicatorConfig};
use symbolicator::domain::{ConfigError, ReportOutput, SymbolicationError};
use symbolicator::pipeline::{JobRequest, Symbolicator, Worker};
use symbolicator::symbolization::{CommandLineTools, NativeTools, SymbolTools};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_IOERR: i32 = 74;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return EXIT_USAGE;
    }
    match err.downcast_ref::<SymbolicationError>() {
        Some(
            SymbolicationError::PersistFailure { .. } | SymbolicationError::ReportUnreadable { .. },
        ) => EXIT_IOERR,
        _ => EXIT_ERROR,
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    let config = SymbolicatorConfig::from_args(&args)?;

    if !args.quiet && !args.json {
        println!("symbolicator v{}", env!("CARGO_PKG_VERSION"));
        println!("report: {}", config.report.display());
        println!("output: {}", config.output_dir.display());
    }

    let request = JobRequest {
        report: config.report.clone(),
        bundles: config.bundles.clone(),
        dialect: config.dialect,
    };

    let output = match config.backend {
        Backend::Tools => {
            run_job(CommandLineTools::new(&config.tools), &config, request).await?
        }
        Backend::Native => {
            run_job(NativeTools::new(config.tools.arch.clone()), &config, request).await?
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !args.quiet {
        println!("images: {}", output.images.join(", "));
        println!("saved: {}", output.output_path().display());
    }

    if args.open {
        open_in_viewer(output.output_path());
    }

    Ok(())
}

async fn run_job<T: SymbolTools + 'static>(
    tools: T,
    config: &SymbolicatorConfig,
    request: JobRequest,
) -> Result<ReportOutput, SymbolicationError> {
    let worker = Worker::spawn(Symbolicator::new(tools, config.output_dir.clone()));
    let result = worker.run(request).await;
    worker.shutdown().await;
    result
}

fn open_in_viewer(path: &Path) {
    let opener = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };
    info!("Opening {} with {opener}", path.display());
    if let Err(e) = std::process::Command::new(opener)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to run {opener}"))
    {
        warn!("{e:#}");
    }
}
