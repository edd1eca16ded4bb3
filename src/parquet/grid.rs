//! Daily grids stored as parquet: one row, and one row group, per day.
//!
//! Schema: `time: Date32`, `sst: List<Float32>` (row-major lat x lon).
//! Coordinates, attributes and the time encoding live in the file's
//! key-value metadata.

use std::{fs::File, path::Path, sync::Arc};

use arrow::{
    array::{Array, Date32Array, Date32Builder, Float32Array, Float32Builder, ListArray, ListBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::{Datelike, NaiveDate};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter, ProjectionMask},
    basic::Compression,
    file::{metadata::KeyValue, properties::WriterProperties},
};

use crate::{
    error::GridError,
    grid::{
        codec::not_found, AnnualSeries, Attributes, GridCodec, GridFile, GridRef, GridShape,
        LazyGrid,
    },
};

const LAT_KEY: &str = "oisst.lat";
const LON_KEY: &str = "oisst.lon";
const ATTRIBUTES_KEY: &str = "oisst.attributes";
const TIME_UNITS_KEY: &str = "oisst.time_units";

// 1970-01-01 counted from 0001-01-01 as day 1
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

#[derive(Debug, Clone, Default)]
pub struct ParquetCodec;

impl GridCodec for ParquetCodec {
    fn extension(&self) -> &'static str {
        "parquet"
    }

    fn open(&self, path: &Path) -> Result<GridFile, GridError> {
        let file = File::open(path).map_err(|e| not_found(path, e))?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

        let metadata = builder.metadata().file_metadata().key_value_metadata();
        let lookup = |key: &str| -> Option<String> {
            metadata?
                .iter()
                .find(|kv| kv.key == key)
                .and_then(|kv| kv.value.clone())
        };

        let shape = GridShape {
            lat: decode(path, lookup(LAT_KEY))?.unwrap_or_default(),
            lon: decode(path, lookup(LON_KEY))?.unwrap_or_default(),
        };
        let attributes: Attributes = decode(path, lookup(ATTRIBUTES_KEY))?.unwrap_or_default();
        let time_units = lookup(TIME_UNITS_KEY).unwrap_or_default();

        let mask = ProjectionMask::roots(builder.parquet_schema(), [0]);
        let reader = builder.with_projection(mask).build()?;

        let mut grids = Vec::new();
        for batch in reader {
            let batch = batch?;
            let times = batch
                .column(0)
                .as_any()
                .downcast_ref::<Date32Array>()
                .ok_or_else(|| malformed(path, "time column is not Date32"))?;

            for days in times.iter() {
                let days = days.ok_or_else(|| malformed(path, "null time"))?;
                let time = NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_FROM_CE)
                    .ok_or_else(|| malformed(path, "time out of range"))?;
                grids.push(LazyGrid {
                    time,
                    source: GridRef {
                        path: path.to_path_buf(),
                        index: grids.len(),
                    },
                });
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
        let file = File::open(path).map_err(|e| not_found(path, e))?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

        let (group, mut offset) = locate_row(builder.metadata().row_groups(), grid.index)
            .ok_or_else(|| malformed(path, "row index out of range"))?;
        let mask = ProjectionMask::roots(builder.parquet_schema(), [1]);
        let reader = builder
            .with_row_groups(vec![group])
            .with_projection(mask)
            .build()?;

        for batch in reader {
            let batch = batch?;
            if offset >= batch.num_rows() {
                offset -= batch.num_rows();
                continue;
            }
            let list = batch
                .column(0)
                .as_any()
                .downcast_ref::<ListArray>()
                .ok_or_else(|| malformed(path, "sst column is not a list"))?;
            let row = list.value(offset);
            let values = row
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| malformed(path, "sst values are not Float32"))?;

            return Ok(values.iter().map(|v| v.unwrap_or(f32::NAN)).collect());
        }

        Err(malformed(path, "row index out of range"))
    }

    fn write(&self, path: &Path, series: &AnnualSeries) -> Result<(), GridError> {
        let file = File::create(path)?;

        let schema = Arc::new(Schema::new(vec![
            Field::new("time", DataType::Date32, false),
            Field::new(
                "sst",
                DataType::List(Arc::new(Field::new("item", DataType::Float32, true))),
                false,
            ),
        ]));

        let metadata = vec![
            KeyValue::new(LAT_KEY.to_string(), serde_json::to_string(&series.shape.lat)?),
            KeyValue::new(LON_KEY.to_string(), serde_json::to_string(&series.shape.lon)?),
            KeyValue::new(
                ATTRIBUTES_KEY.to_string(),
                serde_json::to_string(&series.attributes)?,
            ),
            KeyValue::new(TIME_UNITS_KEY.to_string(), series.time_units.clone()),
        ];

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .set_key_value_metadata(Some(metadata))
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        // One row group per day so `read` can fetch a single day.
        for grid in &series.grids {
            let mut time_builder = Date32Builder::with_capacity(1);
            let mut sst_builder = ListBuilder::new(Float32Builder::with_capacity(grid.values.len()));

            time_builder.append_value(grid.time.num_days_from_ce() - UNIX_EPOCH_FROM_CE);
            sst_builder.values().append_slice(&grid.values);
            sst_builder.append(true);

            let batch = RecordBatch::try_new(
                schema.clone(),
                vec![
                    Arc::new(time_builder.finish()),
                    Arc::new(sst_builder.finish()),
                ],
            )?;
            writer.write(&batch)?;
            writer.flush()?;
        }

        writer.close()?;
        Ok(())
    }
}

/// Finds the row group holding row `index` and the row's offset within it.
fn locate_row(
    groups: &[parquet::file::metadata::RowGroupMetaData],
    index: usize,
) -> Option<(usize, usize)> {
    let mut start = 0usize;
    for (i, group) in groups.iter().enumerate() {
        let rows = usize::try_from(group.num_rows()).ok()?;
        if index < start + rows {
            return Some((i, index - start));
        }
        start += rows;
    }
    None
}

fn decode<T: serde::de::DeserializeOwned>(
    path: &Path,
    raw: Option<String>,
) -> Result<Option<T>, GridError> {
    raw.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| malformed(path, &format!("bad metadata: {}", e)))
}

fn malformed(path: &Path, reason: &str) -> GridError {
    GridError::Format {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

// -- Tests -------------------------------------------------------------------
