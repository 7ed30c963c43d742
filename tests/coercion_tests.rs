use csv_parquet::coercion::{coerce, decode, encode, try_decode, try_encode};
use csv_parquet::{CoercionError, ColumnSpec, ParseLayout, TypeCode, TypedValue};

fn column(type_code: TypeCode, layout: Option<ParseLayout>) -> ColumnSpec {
    ColumnSpec::new("c", type_code).with_layout(layout)
}

// ============================================================================
// ROUND TRIPS
// ============================================================================

#[test]
fn test_int64_round_trip() {
    let col = column(TypeCode::Int64, None);
    for text in ["0", "7", "-42", "9223372036854775807", "-9223372036854775808"] {
        assert_eq!(decode(&encode(text, &col), &col), text);
    }
    // Canonical re-formatting drops a leading plus sign.
    assert_eq!(decode(&encode("+5", &col), &col), "5");
}

#[test]
fn test_date_round_trip() {
    let col = column(TypeCode::Date, Some(ParseLayout::IsoDate));
    for text in ["1970-01-01", "2000-02-29", "2023-06-15", "1969-12-31", "2099-12-31"] {
        assert_eq!(decode(&encode(text, &col), &col), text, "{}", text);
    }
}

#[test]
fn test_timestamp_round_trip() {
    let col = column(TypeCode::TimestampMillis, Some(ParseLayout::DateTime));
    for text in [
        "1970-01-01 00:00:00",
        "2023-01-01 10:00:00",
        "2024-02-29 23:59:59",
    ] {
        assert_eq!(decode(&encode(text, &col), &col), text, "{}", text);
    }
}

#[test]
fn test_slash_date_decodes_to_iso() {
    let col = column(TypeCode::Date, Some(ParseLayout::SlashDate));
    assert_eq!(decode(&encode("2023/06/15", &col), &col), "2023-06-15");
}

// ============================================================================
// ENCODINGS
// ============================================================================

#[test]
fn test_epoch_encodings() {
    assert_eq!(
        try_encode("2023-06-15", TypeCode::Date, Some(ParseLayout::IsoDate)),
        Ok(TypedValue::Date(19_523))
    );
    assert_eq!(
        try_encode(
            "1970-01-01 00:00:01",
            TypeCode::TimestampMillis,
            Some(ParseLayout::DateTime)
        ),
        Ok(TypedValue::TimestampMillis(1_000))
    );
    // Sub-second digits are dropped.
    assert_eq!(
        try_encode(
            "1970-01-01T00:00:01.750Z",
            TypeCode::TimestampMillis,
            Some(ParseLayout::Rfc3339)
        ),
        Ok(TypedValue::TimestampMillis(1_000))
    );
}

#[test]
fn test_fractional_timestamp_keeps_whole_seconds() {
    let col = column(TypeCode::TimestampMillis, Some(ParseLayout::DateTime));
    let coerced = coerce("2023-01-01 10:00:00.500", &col);
    assert!(!coerced.substituted);
    assert_eq!(coerced.value, TypedValue::TimestampMillis(1_672_567_200_000));
    assert_eq!(decode(&coerced.value, &col), "2023-01-01 10:00:00");
}

#[test]
fn test_unpadded_date_is_substituted() {
    let col = column(TypeCode::Date, Some(ParseLayout::IsoDate));
    let coerced = coerce("2023-1-5", &col);
    assert!(coerced.substituted);
    assert_eq!(coerced.value, TypedValue::Date(0));
}

#[test]
fn test_missing_layout_uses_defaults() {
    assert_eq!(
        try_encode("1970-01-03", TypeCode::Date, None),
        Ok(TypedValue::Date(2))
    );
    assert_eq!(
        try_encode("1970-01-01 00:01:00", TypeCode::TimestampMillis, None),
        Ok(TypedValue::TimestampMillis(60_000))
    );
}

#[test]
fn test_byte_array_is_identity() {
    let col = column(TypeCode::ByteArray, None);
    let text = "héllo; wörld";
    assert_eq!(encode(text, &col), TypedValue::Text(text.to_string()));
    assert_eq!(decode(&encode(text, &col), &col), text);
}

#[test]
fn test_float_types() {
    assert_eq!(
        try_encode("2.75", TypeCode::Double, None),
        Ok(TypedValue::Double(2.75))
    );
    assert_eq!(
        try_encode("2.5", TypeCode::Float32, None),
        Ok(TypedValue::Float32(2.5))
    );
    let col = column(TypeCode::Double, None);
    assert_eq!(decode(&TypedValue::Double(2.75), &col), "2.75");
}

// ============================================================================
// ZERO FALLBACK
// ============================================================================

#[test]
fn test_bad_numbers_become_zero() {
    let int_col = column(TypeCode::Int64, None);
    let coerced = coerce("abc", &int_col);
    assert_eq!(coerced.value, TypedValue::Int64(0));
    assert!(coerced.substituted);

    assert_eq!(
        encode("1.5", &column(TypeCode::Int32, None)),
        TypedValue::Int32(0)
    );
    assert_eq!(
        encode("", &column(TypeCode::Double, None)),
        TypedValue::Double(0.0)
    );
    assert_eq!(
        encode("99999999999", &column(TypeCode::Int32, None)),
        TypedValue::Int32(0)
    );
}

#[test]
fn test_bad_dates_become_epoch() {
    let date_col = column(TypeCode::Date, Some(ParseLayout::IsoDate));
    let coerced = coerce("15/06/2023", &date_col);
    assert_eq!(coerced.value, TypedValue::Date(0));
    assert!(coerced.substituted);
    assert_eq!(decode(&coerced.value, &date_col), "1970-01-01");

    let ts_col = column(TypeCode::TimestampMillis, Some(ParseLayout::Rfc3339));
    assert_eq!(
        encode("2023-01-01 10:00:00", &ts_col),
        TypedValue::TimestampMillis(0)
    );
}

#[test]
fn test_good_value_is_not_substituted() {
    let coerced = coerce("0", &column(TypeCode::Int64, None));
    assert_eq!(coerced.value, TypedValue::Int64(0));
    assert!(!coerced.substituted);
}

#[test]
fn test_try_encode_reports_layout() {
    match try_encode("nope", TypeCode::Date, Some(ParseLayout::SlashDate)) {
        Err(CoercionError::Layout { text, layout }) => {
            assert_eq!(text, "nope");
            assert_eq!(layout, "%Y/%m/%d");
        }
        other => panic!("expected layout error, got {:?}", other),
    }
}

// ============================================================================
// DECODING
// ============================================================================

#[test]
fn test_decode_type_mismatch_falls_back_to_raw() {
    assert!(matches!(
        try_decode(&TypedValue::Int64(5), TypeCode::Date),
        Err(CoercionError::TypeMismatch { .. })
    ));
    assert_eq!(
        decode(&TypedValue::Int64(5), &column(TypeCode::Date, None)),
        "5"
    );
}

#[test]
fn test_decode_truncates_millis() {
    let col = column(TypeCode::TimestampMillis, None);
    assert_eq!(
        decode(&TypedValue::TimestampMillis(1_999), &col),
        "1970-01-01 00:00:01"
    );
}

#[test]
fn test_decode_negative_days() {
    let col = column(TypeCode::Date, None);
    assert_eq!(decode(&TypedValue::Date(-1), &col), "1969-12-31");
}
