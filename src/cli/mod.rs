//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{command, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::{Workspace, DEFAULT_ARCHIVE_URL},
    grid::codec::GridFormat,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Which fixed data root to use
    #[arg(long, value_enum, default_value_t = Workspace::Local, global = true)]
    pub workspace: Workspace,

    /// Use this cache root instead of the workspace's
    #[arg(long, global = true)]
    pub cache_root: Option<PathBuf>,

    /// Base URL of the daily archive
    #[arg(long, default_value = DEFAULT_ARCHIVE_URL, global = true)]
    pub archive_url: String,

    /// Format of the annual files
    #[arg(long, value_enum, default_value_t = GridFormat::Netcdf, global = true)]
    pub format: GridFormat,

    /// Report each download and eviction
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print a JSON run summary instead of the closing message
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh the previous and current month and splice them into the annual file
    Update {
        /// Year of the current month [default: this year]
        #[arg(long)]
        year: Option<i32>,
        /// Current month, 1-12 [default: this month]
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Files to download at once
        #[arg(long, default_value_t = 1)]
        jobs: usize,
    },
    /// Mirror and reconcile one month cache
    Cache {
        #[arg(long)]
        year: i32,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
        /// Files to download at once
        #[arg(long, default_value_t = 1)]
        jobs: usize,
    },
    /// Rebuild a year's annual file from the month caches, January through `through`
    Rebuild {
        #[arg(long)]
        year: i32,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        through: u32,
    },
    /// Rewrite the attribute table of an existing annual file
    Stamp {
        #[arg(long)]
        year: i32,
        /// Use the anomaly product's attribute table
        #[arg(long)]
        anomaly: bool,
    },
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("progress template is valid")
            .progress_chars("##-"),
    )
}

// -- Tests -------------------------------------------------------------------
