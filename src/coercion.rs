//! Conversion between raw text cells and [`TypedValue`]s.
//!
//! The `try_*` functions report failures as [`CoercionError`]. [`encode`] and
//! [`decode`] wrap them in the zero-fallback policy: a cell that does not
//! convert is logged and replaced by its type's zero value (`0`, `0.0`,
//! 1970-01-01) and processing carries on. A single bad cell never fails a file.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use log::warn;

use crate::error::CoercionError;
use crate::models::{ColumnSpec, ParseLayout, TypeCode, TypedValue};

const SECONDS_PER_DAY: i64 = 86_400;

pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// chrono accepts `2023-1-5` for `%Y-%m-%d`; the fixed layouts require every
/// date and time field to be zero-padded to two digits.
fn is_zero_padded(text: &str, layout: ParseLayout) -> bool {
    let bytes = text.as_bytes();
    let (width, separators): (usize, &[(usize, u8)]) = match layout {
        ParseLayout::Rfc3339 => return true,
        ParseLayout::IsoDate => (10, &[(4, b'-'), (7, b'-')]),
        ParseLayout::SlashDate => (10, &[(4, b'/'), (7, b'/')]),
        ParseLayout::DateTime => (
            19,
            &[(4, b'-'), (7, b'-'), (10, b' '), (13, b':'), (16, b':')],
        ),
    };

    let width_ok = match layout {
        ParseLayout::DateTime => bytes.len() == width || bytes.get(width) == Some(&b'.'),
        _ => bytes.len() == width,
    };
    width_ok && separators.iter().all(|&(i, sep)| bytes.get(i) == Some(&sep))
}

/// Parse `text` with `layout` and return whole seconds since the Unix epoch.
///
/// Layouts without a zone are read as UTC; date-only layouts mean midnight.
/// Fractional seconds are accepted and dropped.
pub fn parse_unix_seconds(text: &str, layout: ParseLayout) -> Result<i64, CoercionError> {
    let layout_error = || CoercionError::Layout {
        text: text.to_string(),
        layout: layout.to_string(),
    };
    if !is_zero_padded(text, layout) {
        return Err(layout_error());
    }

    let parsed = match layout {
        ParseLayout::Rfc3339 => DateTime::parse_from_rfc3339(text).map(|dt| dt.timestamp()),
        ParseLayout::DateTime => NaiveDateTime::parse_from_str(text, layout.pattern())
            .map(|dt| dt.and_utc().timestamp()),
        ParseLayout::IsoDate | ParseLayout::SlashDate => {
            NaiveDate::parse_from_str(text, layout.pattern())
                .map(|d| d.and_time(NaiveTime::MIN).and_utc().timestamp())
        }
    };

    parsed.map_err(|_| layout_error())
}

/// Epoch seconds to epoch days. Truncates toward zero.
pub fn unix_seconds_to_days(seconds: i64) -> i32 {
    (seconds / SECONDS_PER_DAY) as i32
}

/// Epoch seconds to epoch milliseconds.
pub fn unix_seconds_to_millis(seconds: i64) -> i64 {
    seconds * 1000
}

/// Convert one text cell to the canonical encoding of `type_code`.
///
/// `layout` is only consulted for `DATE` and `TIMESTAMP_MILLIS`; when absent
/// they default to `YYYY-MM-DD` and `YYYY-MM-DD HH:MM:SS`.
pub fn try_encode(
    text: &str,
    type_code: TypeCode,
    layout: Option<ParseLayout>,
) -> Result<TypedValue, CoercionError> {
    let number_error = || CoercionError::Number {
        text: text.to_string(),
        type_code: type_code.to_string(),
    };

    match type_code {
        TypeCode::Int64 => text
            .parse::<i64>()
            .map(TypedValue::Int64)
            .map_err(|_| number_error()),
        TypeCode::Int32 => text
            .parse::<i32>()
            .map(TypedValue::Int32)
            .map_err(|_| number_error()),
        TypeCode::Double => text
            .parse::<f64>()
            .map(TypedValue::Double)
            .map_err(|_| number_error()),
        TypeCode::Float32 => text
            .parse::<f32>()
            .map(TypedValue::Float32)
            .map_err(|_| number_error()),
        TypeCode::ByteArray => Ok(TypedValue::Text(text.to_string())),
        TypeCode::Date => {
            let seconds = parse_unix_seconds(text, layout.unwrap_or(ParseLayout::IsoDate))?;
            Ok(TypedValue::Date(unix_seconds_to_days(seconds)))
        }
        TypeCode::TimestampMillis => {
            let seconds = parse_unix_seconds(text, layout.unwrap_or(ParseLayout::DateTime))?;
            Ok(TypedValue::TimestampMillis(unix_seconds_to_millis(seconds)))
        }
    }
}

/// Result of applying the zero-fallback policy to one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: TypedValue,
    /// `true` when the text did not parse and `value` is the zero value
    pub substituted: bool,
}

/// Convert one text cell for `column` under the zero-fallback policy.
pub fn coerce(text: &str, column: &ColumnSpec) -> Coerced {
    match try_encode(text, column.type_code, column.parse_layout) {
        Ok(value) => Coerced {
            value,
            substituted: false,
        },
        Err(e) => {
            warn!("Column {}: {}, using zero", column.name, e);
            Coerced {
                value: TypedValue::zero(column.type_code),
                substituted: true,
            }
        }
    }
}

/// Convert one text cell for `column`, substituting the zero value on failure.
pub fn encode(text: &str, column: &ColumnSpec) -> TypedValue {
    coerce(text, column).value
}

/// Render a typed value as text for a column of `type_code`.
pub fn try_decode(value: &TypedValue, type_code: TypeCode) -> Result<String, CoercionError> {
    match (type_code, value) {
        (TypeCode::Int64, TypedValue::Int64(v)) => Ok(v.to_string()),
        (TypeCode::Int32, TypedValue::Int32(v)) => Ok(v.to_string()),
        (TypeCode::Double, TypedValue::Double(v)) => Ok(v.to_string()),
        (TypeCode::Float32, TypedValue::Float32(v)) => Ok(v.to_string()),
        (TypeCode::ByteArray, TypedValue::Text(s)) => Ok(s.clone()),
        (TypeCode::Date, TypedValue::Date(days)) => {
            DateTime::from_timestamp(i64::from(*days) * SECONDS_PER_DAY, 0)
                .map(|dt| dt.format(DATE_OUTPUT_FORMAT).to_string())
                .ok_or(CoercionError::OutOfRange {
                    value: i64::from(*days),
                    type_code: type_code.to_string(),
                })
        }
        (TypeCode::TimestampMillis, TypedValue::TimestampMillis(millis)) => {
            DateTime::from_timestamp(millis / 1000, 0)
                .map(|dt| dt.format(TIMESTAMP_OUTPUT_FORMAT).to_string())
                .ok_or(CoercionError::OutOfRange {
                    value: *millis,
                    type_code: type_code.to_string(),
                })
        }
        (_, other) => Err(CoercionError::TypeMismatch {
            value: other.to_string(),
            type_code: type_code.to_string(),
        }),
    }
}

/// Render a typed value for `column`, falling back to its raw form on failure.
pub fn decode(value: &TypedValue, column: &ColumnSpec) -> String {
    match try_decode(value, column.type_code) {
        Ok(text) => text,
        Err(e) => {
            warn!("Column {}: {}, writing raw value", column.name, e);
            value.to_string()
        }
    }
}
