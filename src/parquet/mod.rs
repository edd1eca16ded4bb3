//! Handles serialising grids to and from the _parquet_ file format.

pub mod grid;

pub use grid::ParquetCodec;
