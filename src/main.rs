//! unitpool - parallel test unit runner
//!
//! Runs the units described by suite files on a bounded worker pool and
//! prints a unittest-style summary.
//!
//! ## Usage
//!
//! ```bash
//! # Run every suite under the current directory
//! unitpool
//!
//! # One line per unit, 8 at a time
//! unitpool tests/ -v -j 8
//!
//! # Hunt for flaky units: every unit 10 times, shuffled
//! unitpool tests/ --stress-test --randomize
//!
//! # Machine-readable report
//! unitpool tests/ --format json --output report.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error};

mod cli;

use cli::Args;
use unitpool::catalog::{Catalog, SuiteCatalog};
use unitpool::config::{print_env_help, ConfigFile, EnvConfig, RunConfig};
use unitpool::error::RunError;
use unitpool::utils::init_logger;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logger(args.log_level());

    if args.env_help {
        print_env_help();
        return Ok(ExitCode::SUCCESS);
    }

    let env = EnvConfig::load();
    if env.has_any() {
        debug!("environment overrides: {:?}", env);
    }
    let mut config = RunConfig::layered(args.config.as_deref(), &env)?;
    args.apply_to(&mut config)?;
    config.validate().context("Invalid run configuration")?;
    debug!("effective configuration: {:?}", config);

    if let Some(path) = &args.init_config {
        return init_config(path, config);
    }

    if args.list {
        return list_units(&args.target);
    }

    match unitpool::run(SuiteCatalog::new(), &args.target, &config, std::io::stdout()).await {
        Ok(result) if result.was_successful() => Ok(ExitCode::SUCCESS),
        Ok(_) => Ok(ExitCode::FAILURE),
        Err(RunError::Discovery(e)) => {
            error!("discovery failed: {}", e);
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn init_config(path: &Path, run: RunConfig) -> Result<ExitCode> {
    if path.exists() {
        anyhow::bail!("Configuration file already exists: {}", path.display());
    }

    ConfigFile {
        run,
        ..ConfigFile::default()
    }
    .save(path)?;
    println!("Configuration file created: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn list_units(target: &str) -> Result<ExitCode> {
    let mut catalog = SuiteCatalog::new();
    let units = catalog
        .discover(target)
        .with_context(|| format!("Failed to discover units in {target:?}"))?;

    for id in &units {
        println!("{id}");
    }
    println!("\n{} units", units.len());
    Ok(ExitCode::SUCCESS)
}
