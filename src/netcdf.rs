//! netCDF grids, as published by the archive and as stored by PSL.
//!
//! Daily archive files hold `sst(time, zlev, lat, lon)` packed as `short`
//! with `scale_factor`, `add_offset` and `_FillValue`; annual files hold
//! `sst(time, lat, lon)` as `float`.

use std::{io, path::Path};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use netcdf::{AttributeValue, Variable};

use crate::{
    annual::stamp::TIME_UNITS,
    error::GridError,
    grid::{AnnualSeries, Attributes, GridCodec, GridFile, GridRef, GridShape, LazyGrid},
};

#[derive(Debug, Clone)]
pub struct NetcdfCodec {
    pub variable: String,
}

impl Default for NetcdfCodec {
    fn default() -> Self {
        NetcdfCodec {
            variable: "sst".to_string(),
        }
    }
}

impl GridCodec for NetcdfCodec {
    fn extension(&self) -> &'static str {
        "nc"
    }

    fn open(&self, path: &Path) -> Result<GridFile, GridError> {
        let file = open_file(path)?;

        let coordinate = |name: &str| -> Result<Vec<f32>, GridError> {
            let var = file
                .variable(name)
                .ok_or_else(|| malformed(path, &format!("no `{}` variable", name)))?;
            Ok(var.get_values::<f32, _>(..)?)
        };
        let shape = GridShape {
            lat: coordinate("lat")?,
            lon: coordinate("lon")?,
        };

        let time = file
            .variable("time")
            .ok_or_else(|| malformed(path, "no `time` variable"))?;
        let time_units = attr_string(&time, "units").unwrap_or_else(|| TIME_UNITS.to_string());
        let epoch = parse_time_units(&time_units)
            .ok_or_else(|| malformed(path, &format!("unsupported time units `{}`", time_units)))?;

        let grids = time
            .get_values::<f64, _>(..)?
            .into_iter()
            .enumerate()
            .map(|(index, offset)| LazyGrid {
                time: decode_time(epoch, offset),
                source: GridRef {
                    path: path.to_path_buf(),
                    index,
                },
            })
            .collect();

        let mut attributes = Attributes::new();
        for attr in file.attributes() {
            if let Ok(AttributeValue::Str(value)) = attr.value() {
                attributes.insert(attr.name().to_string(), value);
            }
        }

        Ok(GridFile {
            shape,
            attributes,
            time_units,
            grids,
        })
    }

    fn read(&self, grid: &GridRef) -> Result<Vec<f32>, GridError> {
        let path = grid.path.as_path();
        let file = open_file(path)?;
        let var = file
            .variable(&self.variable)
            .ok_or_else(|| malformed(path, &format!("no `{}` variable", self.variable)))?;

        let raw = match var.dimensions().len() {
            // time, zlev, lat, lon
            4 => {
                let levels = var.dimensions()[1].len();
                if levels != 1 {
                    return Err(malformed(path, &format!("depth axis has {} levels", levels)));
                }
                var.get_values::<f32, _>((grid.index, 0, .., ..))?
            }
            3 => var.get_values::<f32, _>((grid.index, .., ..))?,
            n => return Err(malformed(path, &format!("`{}` has {} dimensions", self.variable, n))),
        };

        let scale = attr_f64(&var, "scale_factor").unwrap_or(1.0);
        let offset = attr_f64(&var, "add_offset").unwrap_or(0.0);
        let fill = attr_f64(&var, "_FillValue").or_else(|| attr_f64(&var, "missing_value"));

        Ok(raw
            .into_iter()
            .map(|v| match fill {
                Some(fill) if f64::from(v) == fill => f32::NAN,
                _ => (f64::from(v) * scale + offset) as f32,
            })
            .collect())
    }

    fn write(&self, path: &Path, series: &AnnualSeries) -> Result<(), GridError> {
        let units = if series.time_units.is_empty() {
            TIME_UNITS
        } else {
            series.time_units.as_str()
        };
        let epoch = parse_time_units(units)
            .ok_or_else(|| malformed(path, &format!("unsupported time units `{}`", units)))?;

        let mut file = netcdf::create(path)?;

        let days = series.grids.len();
        if days == 0 {
            file.add_unlimited_dimension("time")?;
        } else {
            file.add_dimension("time", days)?;
        }
        file.add_dimension("lat", series.shape.lat.len())?;
        file.add_dimension("lon", series.shape.lon.len())?;

        for (name, value) in &series.attributes {
            file.add_attribute(name, value.as_str())?;
        }

        {
            let mut lat = file.add_variable::<f32>("lat", &["lat"])?;
            lat.put_attribute("units", "degrees_north")?;
            lat.put_values(&series.shape.lat, ..)?;
        }
        {
            let mut lon = file.add_variable::<f32>("lon", &["lon"])?;
            lon.put_attribute("units", "degrees_east")?;
            lon.put_values(&series.shape.lon, ..)?;
        }
        {
            let mut time = file.add_variable::<f64>("time", &["time"])?;
            time.put_attribute("units", units)?;
            time.put_attribute("calendar", "standard")?;
            if days > 0 {
                let offsets: Vec<f64> = series
                    .grids
                    .iter()
                    .map(|g| encode_time(epoch, g.time))
                    .collect();
                time.put_values(&offsets, ..)?;
            }
        }
        {
            let mut sst = file.add_variable::<f32>(&self.variable, &["time", "lat", "lon"])?;
            sst.set_fill_value(f32::NAN)?;
            sst.put_attribute("units", "degC")?;
            for (index, grid) in series.grids.iter().enumerate() {
                sst.put_values(&grid.values, (index, .., ..))?;
            }
        }

        Ok(())
    }
}

/// Opens `path`, reporting a missing file as [`GridError::NotFound`].
fn open_file(path: &Path) -> Result<netcdf::File, GridError> {
    netcdf::open(path).map_err(|e| match e {
        // positive status codes are errno values
        netcdf::Error::Netcdf(code)
            if code > 0 && io::Error::from_raw_os_error(code).kind() == io::ErrorKind::NotFound =>
        {
            GridError::NotFound(path.to_path_buf())
        }
        e => e.into(),
    })
}

/// Epoch of a `days since YYYY-MM-DD[ HH:MM:SS]` encoding.
fn parse_time_units(units: &str) -> Option<NaiveDateTime> {
    let reference = units.trim().strip_prefix("days since ")?.trim();
    NaiveDateTime::parse_from_str(reference, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(reference, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn decode_time(epoch: NaiveDateTime, days: f64) -> NaiveDate {
    (epoch + Duration::seconds((days * 86_400.0).round() as i64)).date()
}

fn encode_time(epoch: NaiveDateTime, date: NaiveDate) -> f64 {
    let midnight = date.and_time(epoch.time());
    (midnight - epoch).num_seconds() as f64 / 86_400.0
}

fn attr_f64(var: &Variable, name: &str) -> Option<f64> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().map(|x| f64::from(*x)),
        AttributeValue::Shorts(v) => v.first().map(|x| f64::from(*x)),
        _ => None,
    }
}

fn attr_string(var: &Variable, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

fn malformed(path: &Path, reason: &str) -> GridError {
    GridError::Format {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

// -- Tests -------------------------------------------------------------------
