//! # csv-parquet
//!
//! Convert delimited text files to typed Apache Parquet files and back, and
//! generate synthetic Parquet test data.
//!
//! ## Features
//!
//! - **Schema sniffing**: column types are guessed from the first data line
//!   (integers, floats, RFC 3339 and `YYYY-MM-DD HH:MM:SS` timestamps,
//!   `YYYY-MM-DD` and `YYYY/MM/DD` dates, text)
//! - **Schema import**: the flat column model is rebuilt from a Parquet file's
//!   own schema tree
//! - **Best-effort coercion**: a cell that does not parse is logged and stored
//!   as zero instead of failing the whole file
//! - **Synthetic data**: random rows from compact `name:TYPE` column specs
//!
//! ## Quick Start
//!
//! ```no_run
//! use csv_parquet::{ParquetReader, ParquetWriter};
//!
//! // Text to Parquet
//! let stats = ParquetWriter::new("data.parquet").convert_csv("data.csv")?;
//! println!("{}", stats.summary());
//!
//! // And back again
//! ParquetReader::from_file("data.parquet")?.write_csv("copy.csv")?;
//! # Ok::<(), csv_parquet::Error>(())
//! ```
//!
//! ## Synthetic Data
//!
//! ```no_run
//! use csv_parquet::{parse_column_specs, ParquetWriter};
//!
//! let schema = parse_column_specs(&["id:INT32", "score:FLOAT32", "day:DATE"])?;
//! ParquetWriter::new("fake.parquet").generate(&schema, 1_000)?;
//! # Ok::<(), csv_parquet::Error>(())
//! ```
//!
//! ## Data Types
//!
//! | Type | Stored as |
//! |---|---|
//! | `INT64`, `INT32` | signed integers |
//! | `DOUBLE`, `FLOAT32` | floats |
//! | `BYTE_ARRAY` | UTF-8 text |
//! | `DATE` | days since 1970-01-01 |
//! | `TIMESTAMP_MILLIS` | milliseconds since the Unix epoch |

// Public API modules
pub mod error;
pub mod reader;
pub mod writer;

// Re-export commonly used types
pub use error::{CoercionError, Error, Result};
pub use reader::{ParquetReader, ParquetReaderBuilder, ReadStats};
pub use writer::{ParquetWriter, ParquetWriterBuilder, WriteStats};

pub use column_spec::parse_column_specs;
pub use models::{ColumnSpec, ParseLayout, Schema, TypeCode, TypedRecord, TypedValue};
pub use sniffer::sniff;
pub use tree::{import_schema, ReservedNames, SchemaNode};

// Inference and conversion building blocks
pub mod coercion;
pub mod column_spec;
pub mod formats;
pub mod generator;
pub mod models;
pub mod sniffer;
pub mod transcoder;
pub mod tree;
