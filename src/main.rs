//! Command-line interface for csv-parquet.
//!
//! Converts delimited text to Parquet and back, dumps Parquet files as JSON,
//! and generates synthetic Parquet files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use csv_parquet::{parse_column_specs, ParquetReaderBuilder, ParquetWriter};
use log::{info, LevelFilter};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Convert delimited text files to Parquet and back",
    long_about = "Convert delimited text files to typed Apache Parquet files and back.\n\n\
                  Column types are sniffed from the first data line; unparsable cells are \
                  written as zero and reported on stderr."
)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a delimited text file to Parquet
    #[command(name = "convert-to-columnar", alias = "csv2parquet")]
    ToColumnar {
        #[arg(value_name = "CSV_FILE")]
        src: PathBuf,

        #[arg(value_name = "PARQUET_FILE")]
        dst: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: String,

        /// Tab delimited (same as -d '\t')
        #[arg(short = 't', long = "tab", conflicts_with = "delimiter")]
        tab: bool,
    },

    /// Convert a Parquet file to delimited text
    #[command(name = "convert-from-columnar", alias = "parquet2csv")]
    FromColumnar {
        #[arg(value_name = "PARQUET_FILE")]
        src: PathBuf,

        #[arg(value_name = "CSV_FILE")]
        dst: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: String,

        /// Write a header line with the column names
        #[arg(long)]
        header: bool,
    },

    /// Print the rows of a Parquet file as JSON
    #[command(alias = "show")]
    Dump {
        #[arg(value_name = "PARQUET_FILE")]
        file: PathBuf,

        /// Print the schema tree instead of the rows
        #[arg(long)]
        schema: bool,
    },

    /// Write a Parquet file of random rows
    #[command(alias = "simulate")]
    Generate {
        #[arg(value_name = "PARQUET_FILE")]
        file: PathBuf,

        /// Number of rows to generate
        #[arg(value_name = "ROW_COUNT")]
        rows: usize,

        /// Columns as name:TYPE (INT32, INT64, FLOAT32, DOUBLE, UTF8, DATE, TIMESTAMP)
        #[arg(value_name = "NAME:TYPE", required = true, num_args = 1..)]
        columns: Vec<String>,
    },
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::ToColumnar {
            src,
            dst,
            delimiter,
            tab,
        } => {
            let delimiter = if tab { "\t".to_string() } else { delimiter };
            let stats = ParquetWriter::new(&dst)
                .delimiter(&delimiter)
                .convert_csv(&src)
                .with_context(|| format!("converting {}", src.display()))?;
            info!("{}", stats.summary());
        }
        Command::FromColumnar {
            src,
            dst,
            delimiter,
            header,
        } => {
            let reader = ParquetReaderBuilder::new()
                .delimiter(&delimiter)
                .header(header)
                .from_file(&src)
                .with_context(|| format!("Error with file {}", src.display()))?;
            let stats = reader.write_csv(&dst)?;
            info!("{}", stats.summary());
        }
        Command::Dump { file, schema } => {
            let reader = ParquetReaderBuilder::new()
                .from_file(&file)
                .with_context(|| format!("Error with file {}", file.display()))?;
            let mut out = io::stdout().lock();
            if schema {
                serde_json::to_writer_pretty(&mut out, reader.schema_tree())?;
                writeln!(out)?;
            } else {
                reader.dump(&mut out)?;
            }
        }
        Command::Generate {
            file,
            rows,
            columns,
        } => {
            let schema = parse_column_specs(&columns)?;
            let stats = ParquetWriter::new(&file).generate(&schema, rows)?;
            info!("{}", stats.summary());
        }
    }

    Ok(())
}

fn main() {
    // Usage errors exit with 1 like every other fatal error.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format_timestamp(None)
        .init();

    let start = Instant::now();
    if let Err(e) = run(cli.command) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
    info!("Done in {:.2?}", start.elapsed());
}
