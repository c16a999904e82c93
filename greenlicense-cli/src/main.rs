//! GreenLicense manager
//!
//! Creates signing key pairs, registers software against them, and issues
//! and verifies offline license keys. State lives in a SQLite store.
//!
//! Usage:
//!   greenlicense key generate --name release
//!   greenlicense software create --key <KEY_ID> --license 2 --name "Acme Tool" --version 1.0
//!   greenlicense license issue --software <SOFTWARE_ID> --customer cust-42 --expires 2027-12-31
//!   greenlicense license verify --software <SOFTWARE_ID> --key GL2-...

mod commands;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use greenlicense_license::LicenseManager;
use greenlicense_store::SqliteStore;
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::commands::Command;
use crate::config::Config;
use crate::output::Output;

#[derive(Parser, Debug)]
#[command(name = "greenlicense")]
#[command(about = "Manage key pairs, software and offline license keys")]
#[command(version)]
struct Cli {
    /// Produce JSON output
    #[arg(short, long, global = true)]
    json: bool,

    /// Path to the SQLite store (overrides the config file)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = run(&cli).unwrap_or_else(|e| Output::failed(format!("{e:#}")));
    println!("{}", output.render(cli.json));

    if output.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_logging(verbose: bool) {
    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();
    if verbose {
        builder.with_max_level(Level::DEBUG).init();
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        builder.with_env_filter(filter).init();
    }
}

fn run(cli: &Cli) -> Result<Output> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path());
    if let Some(parent) = store_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create store directory {}", parent.display()))?;
    }
    let store = SqliteStore::open(&store_path)
        .with_context(|| format!("failed to open store at {}", store_path.display()))?;
    debug!(path = %store_path.display(), "Using store");

    let manager = LicenseManager::new(store);
    Ok(commands::dispatch(&cli.command, &manager, &config))
}
