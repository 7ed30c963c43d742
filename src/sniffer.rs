//! Schema inference from a header line and a single sample row.

use log::info;

use crate::coercion::parse_unix_seconds;
use crate::error::{Error, Result};
use crate::models::{ColumnSpec, ParseLayout, Schema, TypeCode};

/// Temporal layouts in the order they are tried, after the numeric checks.
const TEMPORAL_CANDIDATES: [(TypeCode, ParseLayout); 4] = [
    (TypeCode::TimestampMillis, ParseLayout::Rfc3339),
    (TypeCode::TimestampMillis, ParseLayout::DateTime),
    (TypeCode::Date, ParseLayout::IsoDate),
    (TypeCode::Date, ParseLayout::SlashDate),
];

/// Guess the type of one sample cell. First match wins.
///
/// Numbers are checked before dates, so `20230101` is an `INT64`.
pub fn classify(text: &str) -> (TypeCode, Option<ParseLayout>) {
    if text.parse::<i64>().is_ok() {
        return (TypeCode::Int64, None);
    }

    if text.parse::<f64>().is_ok() {
        return (TypeCode::Double, None);
    }

    for (type_code, layout) in TEMPORAL_CANDIDATES {
        if parse_unix_seconds(text, layout).is_ok() {
            return (type_code, Some(layout));
        }
    }

    (TypeCode::ByteArray, None)
}

/// Build a schema from the header fields and one row of sample data.
///
/// Only `sample` decides the column types; later rows are not checked.
pub fn sniff(header: &[String], sample: &[String]) -> Result<Schema> {
    if header.len() != sample.len() {
        return Err(Error::SchemaError(format!(
            "Header has {} fields but the first data row has {}",
            header.len(),
            sample.len()
        )));
    }

    let columns: Vec<ColumnSpec> = header
        .iter()
        .zip(sample)
        .map(|(name, value)| {
            let (type_code, layout) = classify(value);
            ColumnSpec::new(name.as_str(), type_code).with_layout(layout)
        })
        .collect();

    let schema = Schema::new(columns)?;

    info!("Structure:");
    for column in schema.columns() {
        info!("  {}: {}", column.name, column.type_code);
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(line: &str) -> Vec<String> {
        line.split(',').map(str::to_string).collect()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(classify("20230101"), (TypeCode::Int64, None));
        assert_eq!(classify("-42"), (TypeCode::Int64, None));
        assert_eq!(classify("2.5"), (TypeCode::Double, None));
        assert_eq!(classify("1e3"), (TypeCode::Double, None));
        assert_eq!(
            classify("2023-01-01T10:00:00Z"),
            (TypeCode::TimestampMillis, Some(ParseLayout::Rfc3339))
        );
        assert_eq!(
            classify("2023-01-01 10:00:00"),
            (TypeCode::TimestampMillis, Some(ParseLayout::DateTime))
        );
        assert_eq!(
            classify("2023-01-01"),
            (TypeCode::Date, Some(ParseLayout::IsoDate))
        );
        assert_eq!(
            classify("2023/01/01"),
            (TypeCode::Date, Some(ParseLayout::SlashDate))
        );
        assert_eq!(
            classify("2023-01-01 10:00:00.500"),
            (TypeCode::TimestampMillis, Some(ParseLayout::DateTime))
        );
        assert_eq!(classify("2023-1-5"), (TypeCode::ByteArray, None));
        assert_eq!(classify("hello"), (TypeCode::ByteArray, None));
        assert_eq!(classify(""), (TypeCode::ByteArray, None));
    }

    #[test]
    fn test_sniff_mismatched_counts() {
        let result = sniff(&fields("a,b,c"), &fields("1,2"));
        assert!(matches!(result, Err(Error::SchemaError(_))));
    }

    #[test]
    fn test_sniff_duplicate_header() {
        assert!(sniff(&fields("a,a"), &fields("1,2")).is_err());
    }
}
