mod annual;
mod cache;
mod cli;
mod config;
mod download;
mod duplicates;
mod error;
mod grid;
mod listing;
mod netcdf;
mod parquet;
mod window;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{command, Cli, Commands};
use tracing_subscriber::EnvFilter;

use crate::{
    annual::Product,
    cli::command::{resolve_month, RunSummary},
    config::Config,
    grid::codec::Codecs,
    window::YearMonth,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(summary) => {
            if cli.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("Error: {}", e),
                }
            } else {
                println!("{}", summary.message());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<RunSummary> {
    let config = Config::resolve(
        cli.workspace,
        cli.cache_root.clone(),
        &cli.archive_url,
        cli.verbose,
    )?;
    let codecs = Codecs::new(cli.format);

    match &cli.command {
        Commands::Update { year, month, jobs } => {
            let this_month = resolve_month(*year, *month)?;
            command::update(&config.with_jobs(*jobs), &codecs, this_month).await
        }
        Commands::Cache { year, month, jobs } => {
            let period = YearMonth::new(*year, *month)?;
            command::cache(&config.with_jobs(*jobs), period).await
        }
        Commands::Rebuild { year, through } => {
            let through = YearMonth::new(*year, *through)?;
            command::rebuild(&config, &codecs, through).await
        }
        Commands::Stamp { year, anomaly } => {
            let product = if *anomaly {
                Product::Anomaly
            } else {
                Product::Observation
            };
            command::restamp(&config, codecs.store.as_ref(), *year, product)
        }
    }
}

/// `warn` by default, `info` with `--verbose`; `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("warn,oisst={}", level)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
