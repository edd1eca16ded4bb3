pub mod cache;
pub mod rebuild;
pub mod restamp;
pub mod update;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use serde::Serialize;

pub use cache::cache;
pub use rebuild::rebuild;
pub use restamp::restamp;
pub use update::update;

use crate::{
    annual::{export, stamp, Product},
    cache::{reconcile::reconcile, MonthCache},
    config::Config,
    grid::{GridCodec, LazySeries},
    window::YearMonth,
};

use super::create_spinner;

#[derive(Debug, Clone, Serialize)]
/// What one run did, printed as JSON with `--json`.
pub struct RunSummary {
    pub command: &'static str,
    pub months: Vec<String>,
    pub listed: usize,
    pub downloaded: usize,
    pub evicted: usize,
    pub unrecognized: usize,
    pub listing_failures: usize,
    pub stores: Vec<StoreSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub year: i32,
    pub path: PathBuf,
    pub days: usize,
    pub first_day: Option<String>,
    pub last_day: Option<String>,
    /// Year whose store supplied the structure when this year had none.
    pub shell_from: Option<i32>,
}

impl RunSummary {
    pub fn new(command: &'static str) -> Self {
        RunSummary {
            command,
            months: Vec::new(),
            listed: 0,
            downloaded: 0,
            evicted: 0,
            unrecognized: 0,
            listing_failures: 0,
            stores: Vec::new(),
        }
    }

    /// Records a reconciled month cache and the files evicted from it.
    fn record_month(&mut self, cache: &MonthCache, evicted: usize) {
        self.months.push(cache.period.to_string());
        self.evicted += evicted;
        self.unrecognized += cache.unrecognized.len();
    }

    /// The closing lines printed without `--json`.
    pub fn message(&self) -> String {
        if self.stores.is_empty() {
            return format!(
                "Month caches {} reconciled: {} downloaded, {} evicted",
                self.months.join(", "),
                self.downloaded,
                self.evicted
            );
        }

        self.stores
            .iter()
            .map(|s| match &s.last_day {
                Some(last) => format!(
                    "Annual file for {} updated through {} saved to `{}`",
                    s.year,
                    last,
                    s.path.display()
                ),
                None => format!(
                    "Annual file for {} (no days yet) saved to `{}`",
                    s.year,
                    s.path.display()
                ),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The month to update: today's unless given.
pub fn resolve_month(year: Option<i32>, month: Option<u32>) -> Result<YearMonth> {
    let today = Local::now().date_naive();
    YearMonth::new(
        year.unwrap_or(today.year()),
        month.unwrap_or(today.month()),
    )
}

/// Scans and reconciles the month cache for `period` without touching the
/// network.
pub fn reconcile_month(
    config: &Config,
    period: YearMonth,
    summary: &mut RunSummary,
) -> Result<MonthCache> {
    let dir = config.month_cache_dir(period.month());
    let cache = MonthCache::scan(&dir, period)
        .with_context(|| format!("Could not scan month cache {}", dir.display()))?;
    let (cache, evicted) = reconcile(&cache)
        .with_context(|| format!("Could not reconcile month cache {}", dir.display()))?;

    summary.record_month(&cache, evicted.len());

    Ok(cache)
}

/// Materialises `series`, stamps it and writes it over the year's store.
pub fn write_annual(
    codec: &dyn GridCodec,
    annual_dir: &Path,
    series: LazySeries,
    year: i32,
    product: Product,
    shell_from: Option<i32>,
) -> Result<StoreSummary> {
    let annual = stamp(series.materialize(codec, year)?, product);

    let bar = create_spinner(format!("Writing annual file for {}...", year));
    let path = export(codec, annual_dir, &annual)
        .with_context(|| format!("Could not write the annual file for {}", year))?;
    bar.finish_with_message(format!("Annual file for {} written", year));

    let times = annual.times();
    Ok(StoreSummary {
        year,
        path,
        days: times.len(),
        first_day: times.first().map(|d| d.to_string()),
        last_day: times.last().map(|d| d.to_string()),
        shell_from,
    })
}

// -- Tests -------------------------------------------------------------------
