//! Canonical attribute tables for the published annual files.

use crate::grid::{AnnualSeries, Attributes};

pub const TIME_UNITS: &str = "days since 1800-01-01 00:00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    /// Daily mean sea surface temperature.
    Observation,
    /// Daily departures from the 1982-2011 climatology.
    Anomaly,
}

const OBSERVATION_ATTRIBUTES: &[(&str, &str)] = &[
    ("Conventions", "CF-1.5"),
    (
        "title",
        "NOAA/NCEI 1/4 Degree Daily Optimum Interpolation Sea Surface Temperature (OISST) Analysis, Version 2.1",
    ),
    ("institution", "NOAA/National Centers for Environmental Information"),
    (
        "source",
        "NOAA/NCEI https://www.ncei.noaa.gov/data/sea-surface-temperature-optimum-interpolation/v2.1/access/avhrr/",
    ),
    (
        "References",
        "https://www.psl.noaa.gov/data/gridded/data.noaa.oisst.v2.highres.html",
    ),
    (
        "dataset_title",
        "NOAA Daily Optimum Interpolation Sea Surface Temperature",
    ),
    ("version", "Version 2.1"),
    (
        "comment",
        "Reynolds, et al.(2007) Daily High-Resolution-Blended Analyses for Sea Surface Temperature (available at https://doi.org/10.1175/2007JCLI1824.1). Banzon, et al.(2016) A long-term record of blended satellite and in situ sea-surface temperature for climate monitoring, modeling and environmental studies (available at https://doi.org/10.5194/essd-8-165-2016). Huang et al. (2020) Improvements of the Daily Optimum Interpolation Sea Surface Temperature (DOISST) Version v02r01, submitted.Climatology is based on 1971-2000 OI.v2 SST. Satellite data: Pathfinder AVHRR SST, Navy AVHRR SST, and NOAA ACSPO SST. Ice data: NCEP Ice and GSFC Ice.",
    ),
];

const ANOMALY_ATTRIBUTES: &[(&str, &str)] = &[
    (
        "title",
        "Daily Sea Surface Temperature Anomalies from the 1982-2011 OISSTv2 Climatology",
    ),
    ("institution", "Gulf of Maine Research Institute"),
    (
        "source",
        "NOAA/NCEI https://www.ncei.noaa.gov/data/sea-surface-temperature-optimum-interpolation/v2.1/access/avhrr/",
    ),
    (
        "references",
        "https://www.esrl.noaa.gov/psd/data/gridded/data.noaa.oisst.v2.highres.html",
    ),
    ("dataset_title", "GMRI Daily SST Anomalies - OISSTv2"),
    ("climatology_period", "1982-2011"),
];

pub fn attribute_table(product: Product) -> Attributes {
    let table = match product {
        Product::Observation => OBSERVATION_ATTRIBUTES,
        Product::Anomaly => ANOMALY_ATTRIBUTES,
    };

    table
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Replaces the series' attributes with the product's table and fixes the
/// time encoding.
pub fn stamp(mut series: AnnualSeries, product: Product) -> AnnualSeries {
    series.attributes = attribute_table(product);
    series.time_units = TIME_UNITS.to_string();
    series
}

// -- Tests -------------------------------------------------------------------
