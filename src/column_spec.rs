//! Parser for compact `name:TYPE` column definitions.

use crate::error::{Error, Result};
use crate::models::{ColumnSpec, Schema, TypeCode};

/// Parse one `name:TYPE` token. `position` is 1-based and only used for errors.
pub fn parse_column_spec(token: &str, position: usize) -> Result<ColumnSpec> {
    let invalid = || Error::InvalidColumnSpec {
        position,
        token: token.to_string(),
    };

    let parts: Vec<&str> = token.split(':').collect();
    let [name, type_name] = parts.as_slice() else {
        return Err(invalid());
    };
    if name.is_empty() {
        return Err(invalid());
    }

    let type_code: TypeCode = type_name.parse().map_err(|_| invalid())?;
    Ok(ColumnSpec::new(*name, type_code))
}

/// Build a schema from ordered `name:TYPE` tokens.
pub fn parse_column_specs<S: AsRef<str>>(tokens: &[S]) -> Result<Schema> {
    let columns = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| parse_column_spec(token.as_ref(), i + 1))
        .collect::<Result<Vec<_>>>()?;

    Schema::new(columns)
}
