//! Mirrors one month of the remote archive into its local month cache.

use std::{fs, path::PathBuf};

use futures::{stream, StreamExt, TryStreamExt};
use indicatif::ProgressBar;
use reqwest::{Client, Url};
use tracing::{info, warn};

use crate::{
    cli::create_progress_bar,
    config::Config,
    download::{download_file, fetch_listing},
    error::SyncError,
    listing::{parse_listing, RemoteFileDescriptor},
    window::YearMonth,
};

use super::MonthCache;

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub listed: usize,
    pub downloaded: Vec<PathBuf>,
    pub listing_failed: bool,
}

/// Remote files dated in the cache's month with no same-named file in the
/// cache yet.
pub fn plan_downloads(
    listing: &[RemoteFileDescriptor],
    cache: &MonthCache,
) -> Vec<RemoteFileDescriptor> {
    listing
        .iter()
        .filter(|d| cache.period.contains(d.date))
        .filter(|d| !cache.contains_file(d.file_name()))
        .cloned()
        .collect()
}

/// Ensures the month cache holds a copy of every grid file the archive lists
/// for `period`.
///
/// A failed listing is logged and treated as an empty one. A failed file
/// download aborts the pass; files already saved stay, so a rerun resumes.
pub async fn synchronize(
    client: &Client,
    config: &Config,
    period: YearMonth,
) -> Result<SyncReport, SyncError> {
    let dir = config.month_cache_dir(period.month());
    fs::create_dir_all(&dir).map_err(|source| SyncError::Io {
        path: dir.clone(),
        source,
    })?;

    let mut report = SyncReport::default();
    let listing = match list_remote(client, config, period).await {
        Ok(listing) => listing,
        Err(e) => {
            warn!("{}; continuing with an empty listing", e);
            report.listing_failed = true;
            Vec::new()
        }
    };
    report.listed = listing.len();

    let cache = MonthCache::scan(&dir, period).map_err(|source| SyncError::Io {
        path: dir.clone(),
        source,
    })?;
    let missing = plan_downloads(&listing, &cache);
    if missing.is_empty() {
        info!("Month cache {} is up to date", period);
        return Ok(report);
    }

    // per-file log lines replace the bar when verbose
    let pb = if config.verbose {
        ProgressBar::hidden()
    } else {
        create_progress_bar(missing.len() as u64, format!("Downloading {}", period))
    };
    let dir_ref = &dir;
    let pb_ref = &pb;

    report.downloaded = stream::iter(missing)
        .map(|descriptor| async move {
            let saved =
                download_file(client, &descriptor.url, dir_ref, descriptor.file_name()).await?;
            info!(revision = ?descriptor.revision, "Downloaded {}", descriptor.file_name());
            pb_ref.inc(1);
            Ok::<PathBuf, SyncError>(saved)
        })
        .buffer_unordered(config.jobs)
        .try_collect()
        .await?;

    pb.finish_with_message(format!("{} files downloaded for {}", report.downloaded.len(), period));
    report.downloaded.sort();

    Ok(report)
}

async fn list_remote(
    client: &Client,
    config: &Config,
    period: YearMonth,
) -> Result<Vec<RemoteFileDescriptor>, SyncError> {
    let raw = config.listing_url(period);
    let url = Url::parse(&raw).map_err(|_| SyncError::InvalidUrl(raw.clone()))?;
    let html = fetch_listing(client, &url).await?;

    Ok(parse_listing(&html, &url))
}

// -- Tests -------------------------------------------------------------------
