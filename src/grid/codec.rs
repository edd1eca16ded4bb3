//! The seam between the pipeline and the on-disk grid format.

use std::{path::Path, sync::Arc};

use clap::ValueEnum;

use crate::{error::GridError, netcdf::NetcdfCodec, parquet::ParquetCodec};

use super::{AnnualSeries, GridFile, GridRef};

pub trait GridCodec: Send + Sync {
    /// Extension of annual store files written by this codec.
    fn extension(&self) -> &'static str;

    /// Reads the header and time axis only. A missing file is
    /// [`GridError::NotFound`].
    fn open(&self, path: &Path) -> Result<GridFile, GridError>;

    /// Reads the values of one grid, dropping any length-one depth axis.
    fn read(&self, grid: &GridRef) -> Result<Vec<f32>, GridError>;

    fn write(&self, path: &Path, series: &AnnualSeries) -> Result<(), GridError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
/// Format of the annual store.
pub enum GridFormat {
    /// `sst.day.mean.<year>.v2.nc`, as published by PSL.
    #[default]
    Netcdf,
    /// `sst.day.mean.<year>.v2.parquet`.
    Parquet,
}

impl GridFormat {
    pub fn codec(&self) -> Arc<dyn GridCodec> {
        match self {
            GridFormat::Netcdf => Arc::new(NetcdfCodec::default()),
            GridFormat::Parquet => Arc::new(ParquetCodec),
        }
    }
}

#[derive(Clone)]
/// The codecs one run works with.
pub struct Codecs {
    /// Reads the daily files in the month caches.
    pub archive: Arc<dyn GridCodec>,
    /// Reads and writes the annual stores.
    pub store: Arc<dyn GridCodec>,
}

impl Codecs {
    /// Archive files are always netCDF; the store follows `format`.
    pub fn new(format: GridFormat) -> Self {
        Codecs {
            archive: Arc::new(NetcdfCodec::default()),
            store: format.codec(),
        }
    }
}

pub(crate) fn not_found(path: &Path, e: std::io::Error) -> GridError {
    if e.kind() == std::io::ErrorKind::NotFound {
        GridError::NotFound(path.to_path_buf())
    } else {
        GridError::Io(e)
    }
}

// -- Tests -------------------------------------------------------------------
