use std::sync::Arc;

use anyhow::Result;
use reqwest::Client;
use tracing::{info, warn};

use crate::{
    annual::{assemble, load_store, splice, Product},
    config::Config,
    grid::codec::Codecs,
    window::{UpdateWindow, YearMonth},
};

use super::{cache::refresh_month, reconcile_month, write_annual, RunSummary};

/// Refreshes the month before `this_month` and `this_month` itself, then
/// replaces that window in every annual file it touches.
pub async fn update(
    config: &Config,
    codecs: &Codecs,
    this_month: YearMonth,
) -> Result<RunSummary> {
    let window = UpdateWindow::ending(this_month);
    let client = Client::new();
    let mut summary = RunSummary::new("update");

    let last = refresh_month(&client, config, window.last_month, &mut summary).await?;
    let this = refresh_month(&client, config, window.this_month, &mut summary).await?;

    let mut caches = Vec::new();
    for period in window.assembly_months() {
        if period == last.period {
            caches.push(last.clone());
        } else if period == this.period {
            caches.push(this.clone());
        } else {
            caches.push(reconcile_month(config, period, &mut summary)?);
        }
    }

    let assembled = assemble(Arc::clone(&codecs.archive), &caches).await?;
    match assembled.date_range() {
        Some((first, last)) => info!("Assembled {} days, {} to {}", assembled.len(), first, last),
        None => warn!(
            "No cached days between {} and {}",
            window.start(),
            window.end()
        ),
    }

    let annual_dir = config.annual_dir();
    for year in window.years() {
        let store = load_store(codecs.store.as_ref(), &annual_dir, year)?;
        let spliced = splice(store.series, assembled.clone(), &window, year)?;
        summary.stores.push(write_annual(
            codecs.store.as_ref(),
            &annual_dir,
            spliced,
            year,
            Product::Observation,
            store.origin.shell_year(),
        )?);
    }

    Ok(summary)
}

// -- Tests -------------------------------------------------------------------
