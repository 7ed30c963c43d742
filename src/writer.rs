//! High-level API for producing Parquet files from delimited text or from
//! synthetic data.

use log::{debug, info, warn};
use parquet::basic::Compression;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::formats::delimited::LineSource;
use crate::formats::parquet::{ParquetSink, SinkOptions};
use crate::generator::Generator;
use crate::models::Schema;
use crate::sniffer::sniff;
use crate::transcoder::{split_fields, Transcoder};

fn output_error(err: anyhow::Error) -> Error {
    Error::OutputError(format!("{:#}", err))
}

/// Writer for producing a single Parquet file.
///
/// # Examples
///
/// ```no_run
/// use csv_parquet::ParquetWriter;
///
/// let stats = ParquetWriter::new("people.parquet")
///     .delimiter(";")
///     .convert_csv("people.csv")?;
///
/// println!("{}", stats.summary());
/// # Ok::<(), csv_parquet::Error>(())
/// ```
pub struct ParquetWriter {
    output_path: PathBuf,
    delimiter: String,
    options: SinkOptions,
}

impl ParquetWriter {
    /// Create a writer for the Parquet file at `output_path`.
    ///
    /// Defaults: `,` delimiter, 50,000-row batches, SNAPPY compression.
    pub fn new<P: AsRef<Path>>(output_path: P) -> Self {
        Self {
            output_path: output_path.as_ref().to_path_buf(),
            delimiter: ",".to_string(),
            options: SinkOptions::default(),
        }
    }

    /// Set the field delimiter of the text input.
    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    /// Set how many rows are buffered before they are handed to Parquet.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.options.batch_size = size;
        self
    }

    /// Set the compression codec of the output file.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.options.compression = compression;
        self
    }

    /// Set the maximum number of rows per row group.
    pub fn max_row_group_size(mut self, rows: usize) -> Self {
        self.options.max_row_group_size = rows;
        self
    }

    /// Convert a delimited text file to Parquet.
    ///
    /// The first line holds the column names and the second line decides the
    /// column types. Every data line, the second included, becomes one row.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input cannot be opened or has fewer than two lines
    /// - The header and the first data line have different field counts
    /// - A data line has the wrong number of fields
    /// - The Parquet file cannot be written
    ///
    /// A partially written output file is removed on error.
    pub fn convert_csv<P: AsRef<Path>>(self, input_path: P) -> Result<WriteStats> {
        let input_path = input_path.as_ref();
        info!("CSV file:      {}", input_path.display());
        info!("Parquet file:  {}", self.output_path.display());

        let mut source = LineSource::open(input_path)?;
        let (header, sample) = source.read_header_and_sample(&self.delimiter)?;
        let schema = sniff(&header, &sample)?;

        let result = self.write_lines(&schema, &sample, source);
        self.finish_or_clean_up(result)
    }

    fn write_lines(
        &self,
        schema: &Schema,
        sample: &[String],
        lines: LineSource,
    ) -> Result<WriteStats> {
        let mut sink =
            ParquetSink::create(&self.output_path, schema, &self.options).map_err(output_error)?;
        let mut transcoder = Transcoder::new(schema);

        let record = transcoder.to_typed(sample)?;
        sink.write(&record).map_err(output_error)?;

        for (i, line) in lines.enumerate() {
            let line = line?;
            debug!("Read:{}", line);

            let raw = split_fields(&line, &self.delimiter);
            let record = transcoder.to_typed(&raw).map_err(|e| match e {
                Error::ParseError(msg) => Error::ParseError(format!("data row {}: {}", i + 2, msg)),
                other => other,
            })?;
            sink.write(&record).map_err(output_error)?;
        }

        let num_rows = sink.finish().map_err(output_error)?;

        Ok(WriteStats {
            num_rows,
            num_fields: schema.n_fields(),
            substitutions: transcoder.substitutions(),
        })
    }

    /// Write `rows` random records shaped by `schema`.
    pub fn generate(self, schema: &Schema, rows: usize) -> Result<WriteStats> {
        info!("Parquet file:  {}", self.output_path.display());
        let result = self.write_generated(schema, rows);
        self.finish_or_clean_up(result)
    }

    fn write_generated(&self, schema: &Schema, rows: usize) -> Result<WriteStats> {
        let mut sink =
            ParquetSink::create(&self.output_path, schema, &self.options).map_err(output_error)?;
        for record in Generator::new(schema).take(rows) {
            sink.write(&record).map_err(output_error)?;
        }
        let num_rows = sink.finish().map_err(output_error)?;

        Ok(WriteStats {
            num_rows,
            num_fields: schema.n_fields(),
            substitutions: 0,
        })
    }

    fn finish_or_clean_up(&self, result: Result<WriteStats>) -> Result<WriteStats> {
        match result {
            Ok(stats) => {
                info!(
                    "Parquet file {} written with {} rows and {} fields",
                    self.output_path.display(),
                    stats.num_rows,
                    stats.num_fields
                );
                Ok(stats)
            }
            Err(e) => {
                if self.output_path.exists() {
                    if let Err(rm) = fs::remove_file(&self.output_path) {
                        warn!(
                            "Could not remove partial file {}: {}",
                            self.output_path.display(),
                            rm
                        );
                    }
                }
                Err(e)
            }
        }
    }
}

/// Statistics about a Parquet write operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteStats {
    /// Total number of rows written
    pub num_rows: usize,
    /// Number of columns in the schema
    pub num_fields: usize,
    /// Cells that failed to parse and were written as zero
    pub substitutions: u64,
}

impl WriteStats {
    /// Get a human-readable summary of the write operation.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Wrote {} rows with {} fields",
            self.num_rows, self.num_fields
        );
        if self.substitutions > 0 {
            summary.push_str(&format!(
                " ({} unparsable cells written as zero)",
                self.substitutions
            ));
        }
        summary
    }
}

/// Builder for configuring Parquet write options.
///
/// # Examples
///
/// ```no_run
/// use csv_parquet::ParquetWriterBuilder;
///
/// ParquetWriterBuilder::new()
///     .output_path("out.parquet")
///     .delimiter("\t")
///     .build()?
///     .convert_csv("in.tsv")?;
/// # Ok::<(), csv_parquet::Error>(())
/// ```
pub struct ParquetWriterBuilder {
    output_path: Option<PathBuf>,
    delimiter: String,
    options: SinkOptions,
}

impl ParquetWriterBuilder {
    /// Create a new Parquet writer builder with default options.
    pub fn new() -> Self {
        Self {
            output_path: None,
            delimiter: ",".to_string(),
            options: SinkOptions::default(),
        }
    }

    /// Set the output file.
    pub fn output_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.options.batch_size = size;
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.options.compression = compression;
        self
    }

    /// Build the Parquet writer.
    ///
    /// # Errors
    ///
    /// Returns an error if output_path was not set.
    pub fn build(self) -> Result<ParquetWriter> {
        let output_path = self
            .output_path
            .ok_or_else(|| Error::Other("Output path not set".to_string()))?;

        Ok(ParquetWriter {
            output_path,
            delimiter: self.delimiter,
            options: self.options,
        })
    }
}

impl Default for ParquetWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
