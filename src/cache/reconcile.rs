//! Evicts preliminary files that have been superseded by a final revision.

use std::{collections::HashSet, fs, io, path::PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::duplicates::duplicates;

use super::{CacheEntry, MonthCache, Revision};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionPlan {
    pub evict: Vec<CacheEntry>,
}

impl EvictionPlan {
    pub fn is_empty(&self) -> bool {
        self.evict.is_empty()
    }
}

/// Picks every preliminary entry whose date also appears under another name.
///
/// A date with only a preliminary file, or only a final one, is left alone.
pub fn plan_evictions(cache: &MonthCache) -> EvictionPlan {
    let repeated: HashSet<NaiveDate> = duplicates(cache.entries.iter().map(|e| e.date))
        .into_iter()
        .collect();

    let evict = cache
        .entries
        .iter()
        .filter(|e| e.revision == Revision::Preliminary && repeated.contains(&e.date))
        .cloned()
        .collect();

    EvictionPlan { evict }
}

/// Deletes the planned files and returns the paths actually removed.
/// A file that is already gone counts as evicted.
pub fn apply_evictions(plan: &EvictionPlan) -> io::Result<Vec<PathBuf>> {
    let mut removed = Vec::with_capacity(plan.evict.len());

    for entry in &plan.evict {
        match fs::remove_file(&entry.local_path) {
            Ok(()) => {
                info!("Removed superseded preliminary file {}", entry.file_name());
                removed.push(entry.local_path.clone());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(file = %entry.local_path.display(), "already evicted");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(removed)
}

/// Plans and applies eviction for one month cache, then rescans it.
pub fn reconcile(cache: &MonthCache) -> io::Result<(MonthCache, Vec<PathBuf>)> {
    let plan = plan_evictions(cache);
    if plan.is_empty() {
        debug!(month = %cache.period, "nothing to evict");
    }
    let removed = apply_evictions(&plan)?;
    let cache = MonthCache::scan(&cache.dir, cache.period)?;
    if !cache.is_reconciled() {
        warn!(month = %cache.period, "month cache still holds several files for one date");
    }

    Ok((cache, removed))
}

// -- Tests -------------------------------------------------------------------
