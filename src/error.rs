//! Error taxonomy for the cache and annual-store pipeline.
//!
//! Command functions convert these into `anyhow::Error`; the enums exist so
//! the core can tell recoverable conditions (a missing annual store) apart
//! from fatal ones.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while mirroring a month from the remote archive.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("listing `{url}` returned {status}")]
    Listing {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to download `{url}`: {status}")]
    Fetch {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("request to `{url}` failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid archive URL `{0}`")]
    InvalidUrl(String),

    #[error("cache write failed for `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures reading or writing grid files.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("no grid file at `{0}`")]
    NotFound(PathBuf),

    #[error("grid in `{path}` is {found:?} but the series is {expected:?}")]
    ShapeMismatch {
        path: PathBuf,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("malformed grid file `{path}`: {reason}")]
    Format { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Netcdf(#[from] netcdf::Error),
}

/// Failures loading the persisted annual store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no annual store for {year} and no {fallback_year} store to start from")]
    Missing { year: i32, fallback_year: i32 },

    #[error(transparent)]
    Grid(#[from] GridError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_describe_missing_store() {
        let e = StoreError::Missing {
            year: 2024,
            fallback_year: 2023,
        };

        assert_eq!(
            e.to_string(),
            "no annual store for 2024 and no 2023 store to start from"
        );
    }

    #[test]
    fn should_describe_shape_mismatch() {
        let e = GridError::ShapeMismatch {
            path: PathBuf::from("a.nc"),
            expected: (720, 1440),
            found: (2, 2),
        };

        assert!(e.to_string().contains("(2, 2)"));
    }
}
