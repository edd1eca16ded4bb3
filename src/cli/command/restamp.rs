use anyhow::{Context, Result};

use crate::{
    annual::Product,
    config::Config,
    grid::{GridCodec, LazySeries},
};

use super::{write_annual, RunSummary};

/// Rewrites the attribute table of the existing annual file for `year`,
/// leaving its grids untouched.
pub fn restamp(
    config: &Config,
    codec: &dyn GridCodec,
    year: i32,
    product: Product,
) -> Result<RunSummary> {
    let mut summary = RunSummary::new("stamp");
    let path = config.annual_store_path(year, codec.extension());

    let file = codec
        .open(&path)
        .with_context(|| format!("Could not open the annual file for {}", year))?;

    summary.stores.push(write_annual(
        codec,
        &config.annual_dir(),
        LazySeries::from_file(file),
        year,
        product,
        None,
    )?);

    Ok(summary)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::{
        cli::command::tests::config,
        grid::tests::day,
        parquet::{grid::tests::series_fixture, ParquetCodec},
    };

    #[test]
    fn should_swap_attribute_table() {
        let tmp = TempDir::new().unwrap();
        let config = config(tmp.path());
        let path = config.annual_store_path(2023, "parquet");
        fs::create_dir_all(config.annual_dir()).unwrap();
        ParquetCodec
            .write(&path, &series_fixture(2023, &[day(2023, 3, 1), day(2023, 3, 2)], 0.0))
            .unwrap();

        restamp(&config, &ParquetCodec, 2023, Product::Anomaly).unwrap();

        let header = ParquetCodec.open(&path).unwrap();
        assert_eq!(header.attributes["institution"], "Gulf of Maine Research Institute");
        assert_eq!(header.grids.len(), 2);
    }

    #[test]
    fn should_report_missing_file() {
        let tmp = TempDir::new().unwrap();

        let err = restamp(&config(tmp.path()), &ParquetCodec, 2023, Product::Observation)
            .unwrap_err();

        assert_eq!(err.to_string(), "Could not open the annual file for 2023");
    }
}
