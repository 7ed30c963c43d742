//! Positional conversion between raw text records and typed records.

use log::debug;

use crate::coercion::{coerce, decode};
use crate::error::{Error, Result};
use crate::models::{RawRecord, Schema, TypedRecord, TypedValue};

/// Split a line on `delimiter`. No quoting or escaping is recognised.
pub fn split_fields(line: &str, delimiter: &str) -> RawRecord {
    line.split(delimiter).map(str::to_string).collect()
}

pub struct Transcoder<'a> {
    schema: &'a Schema,
    substitutions: u64,
}

impl<'a> Transcoder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            substitutions: 0,
        }
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Number of cells replaced by a zero value so far.
    pub fn substitutions(&self) -> u64 {
        self.substitutions
    }

    /// Forward path: text fields to typed values, column by column.
    ///
    /// A record with the wrong number of fields is an error; a cell that does
    /// not parse is replaced by its zero value.
    pub fn to_typed(&mut self, raw: &[String]) -> Result<TypedRecord> {
        if raw.len() != self.schema.n_fields() {
            return Err(Error::ParseError(format!(
                "Expected {} fields but found {}: {:?}",
                self.schema.n_fields(),
                raw.len(),
                raw
            )));
        }

        let mut record = TypedRecord::with_capacity(raw.len());
        for (text, column) in raw.iter().zip(self.schema.columns()) {
            let coerced = coerce(text, column);
            if coerced.substituted {
                self.substitutions += 1;
            }
            record.push(coerced.value);
        }

        Ok(record)
    }

    /// Reverse path: typed values to one delimited line with a trailing `\n`.
    pub fn to_line(&self, record: &[TypedValue], delimiter: &str) -> String {
        let mut line = String::new();
        for (i, (value, column)) in record.iter().zip(self.schema.columns()).enumerate() {
            if i > 0 {
                line.push_str(delimiter);
            }
            line.push_str(&decode(value, column));
        }
        line.push('\n');
        debug!("Line: {}", line.trim_end());
        line
    }
}
