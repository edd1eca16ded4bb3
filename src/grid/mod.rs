//! Daily grids and the series built from them.
//!
//! Grids are first handled as [`LazyGrid`] references (a timestamp plus the
//! file and row holding the values) and only read into memory by
//! [`LazySeries::materialize`].

pub mod codec;

use std::{collections::BTreeMap, path::PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{cli::create_progress_bar, error::GridError};

pub use codec::GridCodec;

pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Latitude and longitude coordinates shared by every grid in a series.
pub struct GridShape {
    pub lat: Vec<f32>,
    pub lon: Vec<f32>,
}

impl GridShape {
    pub fn dims(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    pub fn cells(&self) -> usize {
        self.lat.len() * self.lon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_empty() && self.lon.is_empty()
    }

    /// Combines two shapes, where an empty shape defers to the other.
    pub fn merge(self, other: GridShape, path: PathBuf) -> Result<GridShape, GridError> {
        if other.is_empty() || self == other {
            Ok(self)
        } else if self.is_empty() {
            Ok(other)
        } else {
            Err(GridError::ShapeMismatch {
                path,
                expected: self.dims(),
                found: other.dims(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Row `index` of the grid file at `path`.
pub struct GridRef {
    pub path: PathBuf,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LazyGrid {
    pub time: NaiveDate,
    pub source: GridRef,
}

#[derive(Debug, Clone, PartialEq)]
/// One day of values, row-major over (lat, lon), NaN where there is no data.
pub struct DailyGrid {
    pub time: NaiveDate,
    pub values: Vec<f32>,
}

/// Header and time axis of a grid file.
#[derive(Debug, Clone, Default)]
pub struct GridFile {
    pub shape: GridShape,
    pub attributes: Attributes,
    pub time_units: String,
    pub grids: Vec<LazyGrid>,
}

/// Keeps one item per date and sorts ascending.
///
/// When a date repeats, the item that comes later in `items` wins. Callers
/// rely on this: final revisions load after preliminary ones, and a fresh
/// update is appended after the stored series it replaces.
pub fn dedup_by_time<T>(items: Vec<T>, time: impl Fn(&T) -> NaiveDate) -> Vec<T> {
    let mut by_time = BTreeMap::new();
    for item in items {
        by_time.insert(time(&item), item);
    }
    by_time.into_values().collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LazySeries {
    pub shape: GridShape,
    pub grids: Vec<LazyGrid>,
}

impl LazySeries {
    pub fn from_file(file: GridFile) -> Self {
        LazySeries {
            shape: file.shape,
            grids: file.grids,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// Appends `other` after `self`; its grids win any later dedup.
    pub fn concat(self, other: LazySeries) -> Result<LazySeries, GridError> {
        let path = other
            .grids
            .first()
            .map(|g| g.source.path.clone())
            .unwrap_or_default();
        let shape = self.shape.merge(other.shape, path)?;
        let mut grids = self.grids;
        grids.extend(other.grids);

        Ok(LazySeries { shape, grids })
    }

    pub fn dedup(self) -> LazySeries {
        LazySeries {
            shape: self.shape,
            grids: dedup_by_time(self.grids, |g| g.time),
        }
    }

    pub fn filter(self, keep: impl Fn(NaiveDate) -> bool) -> LazySeries {
        LazySeries {
            shape: self.shape,
            grids: self.grids.into_iter().filter(|g| keep(g.time)).collect(),
        }
    }

    pub fn in_year(self, year: i32) -> LazySeries {
        self.filter(|t| t.year() == year)
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.grids.iter().map(|g| g.time).min()?;
        let last = self.grids.iter().map(|g| g.time).max()?;
        Some((first, last))
    }

    #[cfg(test)]
    pub fn has_unique_times(&self) -> bool {
        let mut times: Vec<NaiveDate> = self.grids.iter().map(|g| g.time).collect();
        let n = times.len();
        times.sort();
        times.dedup();
        times.len() == n
    }

    /// Reads every referenced grid into memory as an unattributed annual series.
    pub fn materialize(
        self,
        codec: &dyn GridCodec,
        year: i32,
    ) -> Result<AnnualSeries, GridError> {
        let pb = create_progress_bar(self.grids.len() as u64, format!("Loading {} grids", year));
        let cells = self.shape.cells();
        let mut grids = Vec::with_capacity(self.grids.len());

        for grid in self.grids {
            let values = codec.read(&grid.source)?;
            if values.len() != cells {
                return Err(GridError::Format {
                    path: grid.source.path,
                    reason: format!("expected {} cells, read {}", cells, values.len()),
                });
            }
            grids.push(DailyGrid {
                time: grid.time,
                values,
            });
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(AnnualSeries {
            year,
            shape: self.shape,
            grids,
            attributes: Attributes::new(),
            time_units: String::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One calendar year of daily grids, unique and ascending by date.
pub struct AnnualSeries {
    pub year: i32,
    pub shape: GridShape,
    pub grids: Vec<DailyGrid>,
    pub attributes: Attributes,
    pub time_units: String,
}

impl AnnualSeries {
    pub fn times(&self) -> Vec<NaiveDate> {
        self.grids.iter().map(|g| g.time).collect()
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn day(year: i32, month: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, d).unwrap()
    }

    pub fn lazy(time: NaiveDate, path: &str, index: usize) -> LazyGrid {
        LazyGrid {
            time,
            source: GridRef {
                path: PathBuf::from(path),
                index,
            },
        }
    }

    pub fn shape() -> GridShape {
        GridShape {
            lat: vec![-0.125, 0.125],
            lon: vec![0.125, 0.375, 0.625],
        }
    }

    #[test]
    fn should_keep_later_item_on_repeated_date() {
        let items = vec![
            (day(2023, 6, 2), "old"),
            (day(2023, 6, 1), "only"),
            (day(2023, 6, 2), "new"),
        ];

        let kept = dedup_by_time(items, |i| i.0);

        assert_eq!(kept, vec![(day(2023, 6, 1), "only"), (day(2023, 6, 2), "new")]);
    }

    #[test]
    fn should_concat_then_dedup_with_update_winning() {
        let store = LazySeries {
            shape: shape(),
            grids: vec![lazy(day(2023, 5, 1), "store", 0), lazy(day(2023, 5, 2), "store", 1)],
        };
        let update = LazySeries {
            shape: shape(),
            grids: vec![lazy(day(2023, 5, 2), "cache", 0)],
        };

        let merged = store.concat(update).unwrap().dedup();

        assert_eq!(merged.len(), 2);
        assert!(merged.has_unique_times());
        assert_eq!(merged.grids[1].source.path, PathBuf::from("cache"));
        assert_eq!(merged.date_range(), Some((day(2023, 5, 1), day(2023, 5, 2))));
    }

    #[test]
    fn should_refuse_mismatched_shapes() {
        let a = LazySeries {
            shape: shape(),
            grids: vec![],
        };
        let b = LazySeries {
            shape: GridShape {
                lat: vec![0.0],
                lon: vec![0.0],
            },
            grids: vec![lazy(day(2023, 5, 1), "b", 0)],
        };

        assert!(matches!(
            a.concat(b),
            Err(GridError::ShapeMismatch { found: (1, 1), .. })
        ));
    }

    #[test]
    fn should_adopt_shape_of_non_empty_side() {
        let empty = LazySeries::default();
        let full = LazySeries {
            shape: shape(),
            grids: vec![],
        };

        assert_eq!(empty.concat(full).unwrap().shape, shape());
    }

    #[test]
    fn should_keep_only_requested_year() {
        let s = LazySeries {
            shape: shape(),
            grids: vec![lazy(day(2022, 12, 31), "a", 0), lazy(day(2023, 1, 1), "b", 0)],
        };

        let kept = s.in_year(2023);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept.grids[0].time, day(2023, 1, 1));
    }
}
