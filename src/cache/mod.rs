//! The local month caches: one directory per calendar month holding the
//! daily files mirrored from the archive.

pub mod file_name;
pub mod reconcile;
pub mod sync;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::window::YearMonth;

pub use file_name::{FileName, Revision};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One downloaded daily file.
pub struct CacheEntry {
    pub date: NaiveDate,
    pub revision: Revision,
    pub local_path: PathBuf,
}

impl CacheEntry {
    pub fn file_name(&self) -> String {
        self.local_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
/// Snapshot of a month cache directory.
pub struct MonthCache {
    pub period: YearMonth,
    pub dir: PathBuf,
    /// Sorted by date, preliminary before final.
    pub entries: Vec<CacheEntry>,
    /// Grid files that do not parse or belong to another calendar month.
    pub unrecognized: Vec<PathBuf>,
    /// Files for this calendar month of an earlier or later year, left over
    /// from when the directory last served that month.
    pub stale: Vec<PathBuf>,
}

impl MonthCache {
    /// Reads the directory. A directory that does not exist yet is an empty cache.
    pub fn scan(dir: &Path, period: YearMonth) -> io::Result<Self> {
        let mut entries = Vec::new();
        let mut unrecognized = Vec::new();
        let mut stale = Vec::new();

        let listing = match fs::read_dir(dir) {
            Ok(listing) => Some(listing),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };

        for entry in listing.into_iter().flatten() {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let name = match path.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            if !file_name::is_grid_file(&name) {
                debug!(file = %name, "skipping non-grid file in cache");
                continue;
            }

            match FileName::parse(&name) {
                Some(parsed) if period.contains(parsed.date) => entries.push(CacheEntry {
                    date: parsed.date,
                    revision: parsed.revision,
                    local_path: path,
                }),
                Some(parsed) if parsed.date.month() == period.month() => {
                    debug!(file = %path.display(), month = %period, "stale cache entry from another year");
                    stale.push(path);
                }
                _ => {
                    warn!(file = %path.display(), month = %period, "unrecognized cache entry");
                    unrecognized.push(path);
                }
            }
        }

        entries.sort_by(|a, b| (a.date, a.revision).cmp(&(b.date, b.revision)));
        unrecognized.sort();
        stale.sort();

        Ok(MonthCache {
            period,
            dir: dir.to_path_buf(),
            entries,
            unrecognized,
            stale,
        })
    }

    pub fn contains_file(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.file_name() == name)
            || self
                .unrecognized
                .iter()
                .any(|p| p.file_name().is_some_and(|n| n.to_string_lossy() == name))
    }

    /// Distinct observation dates held by the cache.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.entries.iter().map(|e| e.date).collect();
        dates.dedup();
        dates
    }

    /// True once every date holds a single entry.
    pub fn is_reconciled(&self) -> bool {
        self.dates().len() == self.entries.len()
    }
}

// -- Tests -------------------------------------------------------------------
