use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Logical column type. Every conversion in the crate switches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeCode {
    Int64,
    Double,
    Float32,
    ByteArray,
    Date,
    TimestampMillis,
    Int32,
}

impl TypeCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCode::Int64 => "INT64",
            TypeCode::Double => "DOUBLE",
            TypeCode::Float32 => "FLOAT32",
            TypeCode::ByteArray => "BYTE_ARRAY",
            TypeCode::Date => "DATE",
            TypeCode::TimestampMillis => "TIMESTAMP_MILLIS",
            TypeCode::Int32 => "INT32",
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive parse over the type vocabulary shared by column specs and
/// schema trees (`INT`, `FLOAT`, `VARCHAR`, `TIMESTAMP`, ...).
impl FromStr for TypeCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INT" | "INT32" => Ok(TypeCode::Int32),
            "INT64" => Ok(TypeCode::Int64),
            "FLOAT" | "FLOAT32" => Ok(TypeCode::Float32),
            "DOUBLE" | "FLOAT64" => Ok(TypeCode::Double),
            "UTF8" | "UTF" | "VARCHAR" | "STRING" | "BYTE_ARRAY" => Ok(TypeCode::ByteArray),
            "DATE" => Ok(TypeCode::Date),
            "TIMESTAMP" | "TIMESTAMP_MILLIS" => Ok(TypeCode::TimestampMillis),
            other => Err(Error::SchemaError(format!("Unknown type '{}'", other))),
        }
    }
}

/// Textual date/time layout recorded by the sniffer for temporal columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParseLayout {
    /// `2023-01-01T10:00:00Z`, `2023-01-01T10:00:00+02:00`
    Rfc3339,
    /// `2023-01-01 10:00:00`, optionally with a fraction (`10:00:00.500`)
    DateTime,
    /// `2023-01-01`
    IsoDate,
    /// `2023/01/01`
    SlashDate,
}

impl ParseLayout {
    /// The chrono format string, or `RFC3339` for the RFC 3339 parser.
    pub fn pattern(&self) -> &'static str {
        match self {
            ParseLayout::Rfc3339 => "RFC3339",
            ParseLayout::DateTime => "%Y-%m-%d %H:%M:%S%.f",
            ParseLayout::IsoDate => "%Y-%m-%d",
            ParseLayout::SlashDate => "%Y/%m/%d",
        }
    }

    pub fn is_date_only(&self) -> bool {
        matches!(self, ParseLayout::IsoDate | ParseLayout::SlashDate)
    }
}

impl fmt::Display for ParseLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub type_code: TypeCode,
    pub parse_layout: Option<ParseLayout>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            type_code,
            parse_layout: None,
        }
    }

    pub fn with_layout(mut self, layout: Option<ParseLayout>) -> Self {
        self.parse_layout = layout;
        self
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.type_code)
    }
}

/// Ordered, immutable set of columns. Position defines the mapping to record
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    /// Build a schema, rejecting empty column lists and duplicate names.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::SchemaError("Schema has no columns".to_string()));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::SchemaError(format!(
                    "Duplicate column name '{}'",
                    column.name
                )));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn n_fields(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// One typed cell. The variant always matches the column's [`TypeCode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Int64(i64),
    Int32(i32),
    Double(f64),
    Float32(f32),
    Text(String),
    /// Whole days since 1970-01-01 UTC
    Date(i32),
    /// Milliseconds since the Unix epoch, UTC
    TimestampMillis(i64),
}

impl TypedValue {
    /// The value substituted for a cell that fails to coerce.
    pub fn zero(type_code: TypeCode) -> Self {
        match type_code {
            TypeCode::Int64 => TypedValue::Int64(0),
            TypeCode::Int32 => TypedValue::Int32(0),
            TypeCode::Double => TypedValue::Double(0.0),
            TypeCode::Float32 => TypedValue::Float32(0.0),
            TypeCode::ByteArray => TypedValue::Text(String::new()),
            TypeCode::Date => TypedValue::Date(0),
            TypeCode::TimestampMillis => TypedValue::TimestampMillis(0),
        }
    }

    pub fn type_code(&self) -> TypeCode {
        match self {
            TypedValue::Int64(_) => TypeCode::Int64,
            TypedValue::Int32(_) => TypeCode::Int32,
            TypedValue::Double(_) => TypeCode::Double,
            TypedValue::Float32(_) => TypeCode::Float32,
            TypedValue::Text(_) => TypeCode::ByteArray,
            TypedValue::Date(_) => TypeCode::Date,
            TypedValue::TimestampMillis(_) => TypeCode::TimestampMillis,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Int64(v) | TypedValue::TimestampMillis(v) => write!(f, "{}", v),
            TypedValue::Int32(v) | TypedValue::Date(v) => write!(f, "{}", v),
            TypedValue::Double(v) => write!(f, "{}", v),
            TypedValue::Float32(v) => write!(f, "{}", v),
            TypedValue::Text(s) => f.write_str(s),
        }
    }
}

/// Typed values aligned positionally with a [`Schema`].
pub type TypedRecord = Vec<TypedValue>;

/// Text fields from one delimited line.
pub type RawRecord = Vec<String>;
