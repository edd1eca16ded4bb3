use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;

use crate::{
    annual::{assemble, Product},
    config::Config,
    grid::codec::Codecs,
    window::{months_through, YearMonth},
};

use super::{reconcile_month, write_annual, RunSummary};

/// Writes the annual file for `through`'s year from the month caches
/// January through `through` alone. No download happens and any existing
/// store is overwritten without being read.
pub async fn rebuild(
    config: &Config,
    codecs: &Codecs,
    through: YearMonth,
) -> Result<RunSummary> {
    let mut summary = RunSummary::new("rebuild");
    let year = through.year();

    let mut caches = Vec::new();
    for period in months_through(through) {
        caches.push(reconcile_month(config, period, &mut summary)?);
    }

    let series = assemble(Arc::clone(&codecs.archive), &caches).await?.in_year(year);
    if series.is_empty() {
        return Err(anyhow!(
            "No cached days for {} through {}",
            year,
            through.mm()
        ));
    }
    info!("Rebuilding {} from {} cached days", year, series.len());

    summary.stores.push(write_annual(
        codecs.store.as_ref(),
        &config.annual_dir(),
        series,
        year,
        Product::Observation,
        None,
    )?);

    Ok(summary)
}

// -- Tests -------------------------------------------------------------------
