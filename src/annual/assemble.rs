//! Builds one deduplicated series from the files in a set of month caches.

use std::{io, path::PathBuf, sync::Arc};

use futures::future::join_all;
use tokio::task;

use crate::{
    cache::MonthCache,
    cli::create_progress_bar,
    error::GridError,
    grid::{GridCodec, LazySeries},
};

/// Every recognised cache file, month by month, preliminary before final
/// within a date.
pub fn candidate_files(caches: &[MonthCache]) -> Vec<PathBuf> {
    caches
        .iter()
        .flat_map(|c| c.entries.iter().map(|e| e.local_path.clone()))
        .collect()
}

/// Scans the candidates and merges their time axes into a single series.
///
/// Files are opened in parallel but merged in candidate order, so when a
/// date appears twice the later file wins. Source attributes are dropped.
pub async fn assemble(
    codec: Arc<dyn GridCodec>,
    caches: &[MonthCache],
) -> Result<LazySeries, GridError> {
    let files = candidate_files(caches);
    let pb = create_progress_bar(files.len() as u64, "Scanning cache files".to_string());

    let tasks: Vec<_> = files
        .into_iter()
        .map(|path| {
            let codec = Arc::clone(&codec);
            let pb = pb.clone();
            task::spawn_blocking(move || {
                let file = codec.open(&path);
                pb.inc(1);
                file
            })
        })
        .collect();

    let mut series = LazySeries::default();
    for result in join_all(tasks).await {
        let file = result.map_err(|e| GridError::Io(io::Error::other(e)))??;
        series = series.concat(LazySeries::from_file(file))?;
    }
    pb.finish_with_message("Cache files scanned");

    Ok(series.dedup())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{Datelike, NaiveDate};
    use tempfile::TempDir;

    use super::*;
    use crate::{
        grid::{tests::day, GridShape},
        parquet::{grid::tests::series_fixture, ParquetCodec},
        window::YearMonth,
    };

    fn write_daily(dir: &std::path::Path, name: &str, date: NaiveDate, offset: f32) {
        let series = series_fixture(date.year(), &[date], offset);
        ParquetCodec.write(&dir.join(name), &series).unwrap();
    }

    #[tokio::test]
    async fn should_prefer_final_over_preliminary() {
        let tmp = TempDir::new().unwrap();
        let june = YearMonth::new(2023, 6).unwrap();
        write_daily(tmp.path(), "oisst-avhrr-v02r01.20230615_preliminary.nc", day(2023, 6, 15), 100.0);
        write_daily(tmp.path(), "oisst-avhrr-v02r01.20230615.nc", day(2023, 6, 15), 0.0);
        write_daily(tmp.path(), "oisst-avhrr-v02r01.20230614.nc", day(2023, 6, 14), 0.0);

        let cache = MonthCache::scan(tmp.path(), june).unwrap();
        let codec: Arc<dyn GridCodec> = Arc::new(ParquetCodec);
        let series = assemble(codec, &[cache]).await.unwrap();

        assert_eq!(series.len(), 2);
        assert!(series.has_unique_times());
        assert_eq!(
            series.grids[1].source.path,
            tmp.path().join("oisst-avhrr-v02r01.20230615.nc")
        );
        assert_eq!(series.date_range(), Some((day(2023, 6, 14), day(2023, 6, 15))));
    }

    #[tokio::test]
    async fn should_span_several_months() {
        let tmp = TempDir::new().unwrap();
        let may_dir = tmp.path().join("05");
        let june_dir = tmp.path().join("06");
        fs::create_dir_all(&may_dir).unwrap();
        fs::create_dir_all(&june_dir).unwrap();
        write_daily(&may_dir, "oisst-avhrr-v02r01.20230531.nc", day(2023, 5, 31), 0.0);
        write_daily(&june_dir, "oisst-avhrr-v02r01.20230601_preliminary.nc", day(2023, 6, 1), 0.0);

        let caches = vec![
            MonthCache::scan(&may_dir, YearMonth::new(2023, 5).unwrap()).unwrap(),
            MonthCache::scan(&june_dir, YearMonth::new(2023, 6).unwrap()).unwrap(),
        ];
        let series = assemble(Arc::new(ParquetCodec), &caches).await.unwrap();

        assert_eq!(
            series.grids.iter().map(|g| g.time).collect::<Vec<_>>(),
            vec![day(2023, 5, 31), day(2023, 6, 1)]
        );
        assert_ne!(series.shape, GridShape::default());
    }

    #[tokio::test]
    async fn should_assemble_nothing_from_empty_caches() {
        let tmp = TempDir::new().unwrap();
        let cache = MonthCache::scan(tmp.path(), YearMonth::new(2023, 6).unwrap()).unwrap();

        let series = assemble(Arc::new(ParquetCodec), &[cache]).await.unwrap();

        assert!(series.is_empty());
        assert!(series.date_range().is_none());
    }
}
