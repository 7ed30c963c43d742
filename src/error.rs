//! Error types for the csv-parquet library.

use thiserror::Error;

/// Result type alias for csv-parquet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors raised while inferring a schema or converting a file.
///
/// Any of these aborts the run. Bad individual cells are not errors at this
/// level; see [`CoercionError`] and the zero-fallback policy in
/// [`crate::coercion`].
#[derive(Debug, Error)]
pub enum Error {
    /// Input file is empty, too short, or otherwise unusable
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A `name:TYPE` token could not be parsed
    #[error("Invalid column spec #{position}: {token}")]
    InvalidColumnSpec { position: usize, token: String },

    /// Data parsing error (e.g., a row with the wrong number of fields)
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Schema inference, import or validation error
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Columnar output error (e.g., Parquet write error)
    #[error("Output error: {0}")]
    OutputError(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(format!("{:#}", err))
    }
}

impl From<parquet::errors::ParquetError> for Error {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Error::OutputError(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for Error {
    fn from(err: arrow::error::ArrowError) -> Self {
        Error::OutputError(err.to_string())
    }
}

/// A single cell that failed to convert to or from its column type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("'{text}' is not a valid {type_code}")]
    Number { text: String, type_code: String },

    #[error("'{text}' does not follow layout '{layout}'")]
    Layout { text: String, layout: String },

    #[error("{value} is out of range for {type_code}")]
    OutOfRange { value: i64, type_code: String },

    #[error("value {value} does not match column type {type_code}")]
    TypeMismatch { value: String, type_code: String },
}
