//! Replaces the update window inside a persisted annual store.

use std::path::Path;

use tracing::info;

use crate::{
    config::annual_store_path,
    error::{GridError, StoreError},
    grid::{GridCodec, LazySeries},
    window::UpdateWindow,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOrigin {
    /// The year's own store.
    Existing,
    /// The structure of an earlier year's store, with no grids.
    Shell { from_year: i32 },
}

impl StoreOrigin {
    pub fn shell_year(&self) -> Option<i32> {
        match self {
            StoreOrigin::Existing => None,
            StoreOrigin::Shell { from_year } => Some(*from_year),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    pub origin: StoreOrigin,
    pub series: LazySeries,
}

/// Opens the store for `year`.
///
/// If there is none yet, as in the first run of a new year, the previous
/// year's store is opened and stripped to its shape. Anything else that goes
/// wrong is an error.
pub fn load_store(
    codec: &dyn GridCodec,
    annual_dir: &Path,
    year: i32,
) -> Result<Store, StoreError> {
    let path = annual_store_path(annual_dir, year, codec.extension());

    match codec.open(&path) {
        Ok(file) => Ok(Store {
            origin: StoreOrigin::Existing,
            series: LazySeries::from_file(file),
        }),
        Err(GridError::NotFound(_)) => {
            let fallback_year = year - 1;
            let fallback = annual_store_path(annual_dir, fallback_year, codec.extension());

            match codec.open(&fallback) {
                Ok(file) => {
                    info!(
                        "No store for {} yet, starting from the {} store's structure",
                        year, fallback_year
                    );
                    Ok(Store {
                        origin: StoreOrigin::Shell {
                            from_year: fallback_year,
                        },
                        series: LazySeries {
                            shape: file.shape,
                            grids: Vec::new(),
                        },
                    })
                }
                Err(GridError::NotFound(_)) => Err(StoreError::Missing {
                    year,
                    fallback_year,
                }),
                Err(e) => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// The part of the stored series that the update must not touch: everything
/// before the window's first day and after its last day.
///
/// A store with nothing before the window is kept whole; the dedup that
/// follows the combine lets the update replace any overlap.
pub fn subset_outside(store: LazySeries, window: &UpdateWindow) -> LazySeries {
    let (start, end) = (window.start(), window.end());

    let before = store.clone().filter(|t| t < start);
    if before.is_empty() {
        return store;
    }

    let after = store.filter(|t| t > end);
    LazySeries {
        shape: before.shape,
        grids: before.grids.into_iter().chain(after.grids).collect(),
    }
}

/// Splices the assembled `update` into `store` for `year`.
///
/// The update is clipped to `year`. In an early-year window the update is the
/// whole year so far and only the store's shape is kept.
pub fn splice(
    store: LazySeries,
    update: LazySeries,
    window: &UpdateWindow,
    year: i32,
) -> Result<LazySeries, GridError> {
    let update = update.in_year(year);

    let kept = if window.is_early_year() {
        LazySeries {
            shape: store.shape,
            grids: Vec::new(),
        }
    } else {
        subset_outside(store, window)
    };

    Ok(kept.concat(update)?.dedup())
}

// -- Tests -------------------------------------------------------------------
