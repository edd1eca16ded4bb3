//! Writes a finished annual series to its canonical path.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::info;

use crate::{
    config::annual_store_path,
    error::GridError,
    grid::{AnnualSeries, GridCodec},
};

/// Writes `series` to `<annual_dir>/sst.day.mean.<year>.v2.<ext>`, replacing
/// any existing file only once the new one is complete.
pub fn export(
    codec: &dyn GridCodec,
    annual_dir: &Path,
    series: &AnnualSeries,
) -> Result<PathBuf, GridError> {
    let path = annual_store_path(annual_dir, series.year, codec.extension());
    if series.grids.windows(2).any(|w| w[0].time >= w[1].time) {
        return Err(GridError::Format {
            path,
            reason: "days are not unique and ascending".to_string(),
        });
    }
    fs::create_dir_all(annual_dir)?;

    let staged = NamedTempFile::new_in(annual_dir)?;
    codec.write(staged.path(), series)?;
    staged.persist(&path).map_err(|e| GridError::Io(e.error))?;

    info!("Saved {} days to {}", series.grids.len(), path.display());
    Ok(path)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        annual::stamp::{stamp, Product},
        grid::{tests::day, LazySeries},
        parquet::{grid::tests::series_fixture, ParquetCodec},
    };

    #[test]
    fn should_round_trip_stamped_series() {
        let tmp = TempDir::new().unwrap();
        let series = stamp(
            series_fixture(2023, &[day(2023, 5, 1), day(2023, 5, 2), day(2023, 6, 30)], 0.5),
            Product::Observation,
        );

        let path = export(&ParquetCodec, tmp.path(), &series).unwrap();
        let reloaded = LazySeries::from_file(ParquetCodec.open(&path).unwrap())
            .materialize(&ParquetCodec, 2023)
            .unwrap();

        assert_eq!(
            path,
            tmp.path().join("sst.day.mean.2023.v2.parquet")
        );
        assert_eq!(reloaded.times(), series.times());
        for (a, b) in reloaded.grids.iter().zip(&series.grids) {
            let a: Vec<u32> = a.values.iter().map(|v| v.to_bits()).collect();
            let b: Vec<u32> = b.values.iter().map(|v| v.to_bits()).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn should_refuse_unordered_days() {
        let tmp = TempDir::new().unwrap();
        let series = series_fixture(2023, &[day(2023, 1, 2), day(2023, 1, 1)], 0.0);

        let result = export(&ParquetCodec, tmp.path(), &series);

        assert!(matches!(result, Err(GridError::Format { .. })));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn should_overwrite_previous_file() {
        let tmp = TempDir::new().unwrap();
        let first = series_fixture(2023, &[day(2023, 1, 1)], 0.0);
        let second = series_fixture(2023, &[day(2023, 1, 1), day(2023, 1, 2)], 0.0);

        export(&ParquetCodec, tmp.path(), &first).unwrap();
        let path = export(&ParquetCodec, tmp.path(), &second).unwrap();

        assert_eq!(ParquetCodec.open(&path).unwrap().grids.len(), 2);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
