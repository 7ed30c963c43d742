//! High-level API for reading Parquet files back into delimited text.

use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::formats::parquet::ParquetSource;
use crate::models::Schema;
use crate::transcoder::Transcoder;
use crate::tree::{import_schema, ReservedNames, SchemaNode};

/// Default number of rows fetched per read.
pub const DEFAULT_READ_BATCH: usize = 100;

fn source_error(err: anyhow::Error) -> Error {
    Error::InvalidInput(format!("{:#}", err))
}

/// A reader for Parquet files whose schema is imported from the file itself.
///
/// # Examples
///
/// ```no_run
/// use csv_parquet::ParquetReader;
///
/// let reader = ParquetReader::from_file("people.parquet")?;
/// println!("{} rows", reader.num_rows());
///
/// let stats = reader.write_csv("people.csv")?;
/// println!("{}", stats.summary());
/// # Ok::<(), csv_parquet::Error>(())
/// ```
pub struct ParquetReader {
    path: PathBuf,
    source: ParquetSource,
    tree: SchemaNode,
    schema: Schema,
    delimiter: String,
    batch_size: usize,
    header: bool,
    reserved_names: ReservedNames,
}

impl ParquetReader {
    /// Open a Parquet file and import its schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not Parquet, or has a
    /// column whose type cannot be mapped.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        ParquetReaderBuilder::new().from_file(path)
    }

    pub fn num_rows(&self) -> i64 {
        self.source.num_rows()
    }

    /// The file's nested schema description.
    pub fn schema_tree(&self) -> &SchemaNode {
        &self.tree
    }

    /// The imported flat schema (upper-cased column names).
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Column names as they appear in output, after reserved-name renames.
    pub fn rendered_names(&self) -> Vec<String> {
        self.schema
            .names()
            .map(|n| self.reserved_names.render_name(n).to_string())
            .collect()
    }

    /// Convert the whole file to delimited text at `output_path`.
    ///
    /// Rows are read [`DEFAULT_READ_BATCH`] at a time unless configured
    /// otherwise. The output has no header line unless enabled on the builder.
    pub fn write_csv<P: AsRef<Path>>(self, output_path: P) -> Result<ReadStats> {
        let output_path = output_path.as_ref();
        let file = File::create(output_path).map_err(|e| {
            Error::OutputError(format!(
                "Can't create CSV file {}: {}",
                output_path.display(),
                e
            ))
        })?;
        let mut out = BufWriter::new(file);

        if self.header {
            writeln!(out, "{}", self.rendered_names().join(&self.delimiter))?;
        }

        let transcoder = Transcoder::new(&self.schema);
        let mut num_rows = 0usize;
        let batches = self
            .source
            .batches(&self.schema, self.batch_size)
            .map_err(source_error)?;

        for batch in batches {
            let records = batch.map_err(source_error)?;
            debug!("Read batch of {} rows", records.len());
            for record in &records {
                out.write_all(transcoder.to_line(record, &self.delimiter).as_bytes())?;
            }
            num_rows += records.len();
        }
        out.flush()?;

        info!(
            "CSV file {} written with {} rows from {}",
            output_path.display(),
            num_rows,
            self.path.display()
        );

        Ok(ReadStats {
            num_rows,
            num_fields: self.schema.n_fields(),
        })
    }

    /// Print every row as a JSON array of objects keyed by column name.
    ///
    /// Values are written in their stored form: dates as epoch days and
    /// timestamps as epoch milliseconds.
    ///
    /// # Errors
    ///
    /// Returns a schema error if two columns render to the same name.
    pub fn dump<W: Write>(self, out: &mut W) -> Result<usize> {
        let names = self.rendered_names();
        let mut seen = HashSet::with_capacity(names.len());
        if let Some(name) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(Error::SchemaError(format!(
                "Columns collide on output name {}",
                name
            )));
        }
        let mut rows = Vec::new();

        let batches = self
            .source
            .batches(&self.schema, self.batch_size)
            .map_err(source_error)?;
        for batch in batches {
            for record in batch.map_err(source_error)? {
                let mut object = Map::with_capacity(names.len());
                for (name, value) in names.iter().zip(record) {
                    let value = serde_json::to_value(value)
                        .map_err(|e| Error::OutputError(e.to_string()))?;
                    object.insert(name.clone(), value);
                }
                rows.push(Value::Object(object));
            }
        }

        let num_rows = rows.len();
        serde_json::to_writer(&mut *out, &Value::Array(rows))
            .map_err(|e| Error::OutputError(e.to_string()))?;
        writeln!(out)?;
        Ok(num_rows)
    }
}

/// Statistics about a Parquet read operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadStats {
    pub num_rows: usize,
    pub num_fields: usize,
}

impl ReadStats {
    pub fn summary(&self) -> String {
        format!(
            "Read {} rows with {} fields",
            self.num_rows, self.num_fields
        )
    }
}

/// Builder for configuring Parquet read options.
///
/// # Examples
///
/// ```no_run
/// use csv_parquet::ParquetReaderBuilder;
///
/// let reader = ParquetReaderBuilder::new()
///     .delimiter(";")
///     .header(true)
///     .from_file("data.parquet")?;
/// reader.write_csv("data.csv")?;
/// # Ok::<(), csv_parquet::Error>(())
/// ```
pub struct ParquetReaderBuilder {
    delimiter: String,
    batch_size: usize,
    header: bool,
    reserved_names: ReservedNames,
}

impl ParquetReaderBuilder {
    /// Create a new reader builder with default options.
    pub fn new() -> Self {
        Self {
            delimiter: ",".to_string(),
            batch_size: DEFAULT_READ_BATCH,
            header: false,
            reserved_names: ReservedNames::default(),
        }
    }

    /// Set the output field delimiter. Default is `,`.
    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    /// Set the number of rows read at a time.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Write a header line of rendered column names before the data.
    pub fn header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Replace the reserved-name renames applied to output column names.
    pub fn reserved_names(mut self, reserved_names: ReservedNames) -> Self {
        self.reserved_names = reserved_names;
        self
    }

    /// Build a reader from a file path.
    pub fn from_file<P: AsRef<Path>>(self, path: P) -> Result<ParquetReader> {
        let path = path.as_ref();
        let source = ParquetSource::open(path).map_err(source_error)?;
        info!("Rows: {}", source.num_rows());

        let tree = source.schema_tree();
        let schema = import_schema(&tree)?;
        debug!("Fields: {}", schema.n_fields());

        Ok(ParquetReader {
            path: path.to_path_buf(),
            source,
            tree,
            schema,
            delimiter: self.delimiter,
            batch_size: self.batch_size,
            header: self.header,
            reserved_names: self.reserved_names,
        })
    }
}

impl Default for ParquetReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
