//! Random typed records for synthetic test files.

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::coercion::{unix_seconds_to_days, unix_seconds_to_millis};
use crate::models::{Schema, TypeCode, TypedRecord, TypedValue};

const CHARACTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// 2021-01-01T00:00:00Z
pub const WINDOW_START: i64 = 1_609_459_200;
/// 2023-01-01T00:00:00Z
pub const WINDOW_END: i64 = WINDOW_START + 2 * 365 * 86_400;

pub const MIN_STRING_LEN: usize = 3;
pub const MAX_STRING_LEN: usize = 15;

pub struct Generator<'a, R: Rng = ThreadRng> {
    schema: &'a Schema,
    rng: R,
}

impl<'a> Generator<'a, ThreadRng> {
    pub fn new(schema: &'a Schema) -> Self {
        Self::with_rng(schema, rand::rng())
    }
}

impl<'a, R: Rng> Generator<'a, R> {
    pub fn with_rng(schema: &'a Schema, rng: R) -> Self {
        Self { schema, rng }
    }

    fn random_string(&mut self) -> String {
        let len = self.rng.random_range(MIN_STRING_LEN..MAX_STRING_LEN);
        (0..len)
            .map(|_| CHARACTERS[self.rng.random_range(0..CHARACTERS.len())] as char)
            .collect()
    }

    fn random_unix_seconds(&mut self) -> i64 {
        self.rng.random_range(WINDOW_START..WINDOW_END)
    }

    fn value(&mut self, type_code: TypeCode) -> TypedValue {
        match type_code {
            TypeCode::Int64 => TypedValue::Int64(self.rng.random()),
            TypeCode::Int32 => TypedValue::Int32(self.rng.random()),
            TypeCode::Double => TypedValue::Double(self.rng.random_range(-1.0..1.0)),
            TypeCode::Float32 => TypedValue::Float32(self.rng.random_range(-1.0..1.0)),
            TypeCode::ByteArray => TypedValue::Text(self.random_string()),
            TypeCode::Date => {
                let seconds = self.random_unix_seconds();
                TypedValue::Date(unix_seconds_to_days(seconds))
            }
            TypeCode::TimestampMillis => {
                let seconds = self.random_unix_seconds();
                TypedValue::TimestampMillis(unix_seconds_to_millis(seconds))
            }
        }
    }

    /// One record with a fresh random value per column.
    pub fn record(&mut self) -> TypedRecord {
        let schema = self.schema;
        schema
            .columns()
            .iter()
            .map(|column| self.value(column.type_code))
            .collect()
    }
}

/// Endless stream of records; bound it with `take(n)`.
impl<R: Rng> Iterator for Generator<'_, R> {
    type Item = TypedRecord;

    fn next(&mut self) -> Option<TypedRecord> {
        Some(self.record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_spec::parse_column_specs;

    #[test]
    fn test_temporal_values_stay_in_window() {
        let schema = parse_column_specs(&["d:DATE", "t:TIMESTAMP"]).unwrap();
        for record in Generator::new(&schema).take(200) {
            match (&record[0], &record[1]) {
                (TypedValue::Date(d), TypedValue::TimestampMillis(t)) => {
                    assert!((18_628..18_628 + 730).contains(d));
                    assert!((WINDOW_START * 1000..WINDOW_END * 1000).contains(t));
                }
                other => panic!("unexpected values {:?}", other),
            }
        }
    }
}
