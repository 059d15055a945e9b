use chrono::{NaiveDate, TimeZone, Utc};
use fieldcrypt_model::{CoercionError, ScalarType, Value};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── Rendering ────────────────────────────────────────────────────

#[test]
fn plaintext_rendering_is_canonical() {
    assert_eq!(Value::from("abc").to_plaintext(), "abc");
    assert_eq!(Value::from(date(2020, 1, 1)).to_plaintext(), "2020-01-01");
    assert_eq!(Value::from(42i64).to_plaintext(), "42");
    assert_eq!(Value::from(-7).to_plaintext(), "-7");
    assert_eq!(Value::from(true).to_plaintext(), "true");
    let dt = Utc.with_ymd_and_hms(2021, 6, 30, 12, 5, 0).unwrap();
    assert_eq!(Value::from(dt).to_plaintext(), "2021-06-30T12:05:00Z");
}

#[test]
fn scalar_type_of_value() {
    assert_eq!(Value::from("x").scalar_type(), ScalarType::String);
    assert_eq!(Value::from(1).scalar_type(), ScalarType::Integer);
    assert_eq!(Value::from(false).scalar_type(), ScalarType::Boolean);
}

#[test]
fn json_forms() {
    assert_eq!(Value::from(5).to_json(), serde_json::json!(5));
    assert_eq!(Value::from(true).to_json(), serde_json::json!(true));
    assert_eq!(Value::from(date(2020, 1, 1)).to_json(), serde_json::json!("2020-01-01"));
    assert_eq!(Value::from("s").to_json(), serde_json::json!("s"));
}

// ── Coercion ─────────────────────────────────────────────────────

#[test]
fn coerce_string_is_verbatim() {
    assert_eq!(
        Value::coerce("  padded ", ScalarType::String).unwrap(),
        Value::String("  padded ".into())
    );
}

#[test]
fn coerce_date_plain() {
    let v = Value::coerce("2020-01-01", ScalarType::Date).unwrap();
    assert_eq!(v.as_date(), Some(date(2020, 1, 1)));
}

#[test]
fn coerce_date_from_timestamp() {
    let v = Value::coerce("2020-01-01T23:30:00+00:00", ScalarType::Date).unwrap();
    assert_eq!(v.as_date(), Some(date(2020, 1, 1)));
}

#[test]
fn coerce_date_rejects_garbage() {
    let err = Value::coerce("yesterday", ScalarType::Date).unwrap_err();
    assert_eq!(
        err,
        CoercionError {
            raw: "yesterday".into(),
            expected: ScalarType::Date
        }
    );
}

#[test]
fn coerce_date_rejects_impossible_day() {
    assert!(Value::coerce("2021-02-30", ScalarType::Date).is_err());
}

#[test]
fn coerce_datetime_variants() {
    let expected = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();
    for raw in [
        "2020-01-01T10:00:00Z",
        "2020-01-01T12:00:00+02:00",
        "2020-01-01 10:00:00",
        "2020-01-01T10:00:00",
    ] {
        let v = Value::coerce(raw, ScalarType::DateTime).unwrap();
        assert_eq!(v.as_datetime(), Some(expected), "input {raw}");
    }
}

#[test]
fn coerce_datetime_from_bare_date_is_midnight() {
    let v = Value::coerce("2020-01-01", ScalarType::DateTime).unwrap();
    assert_eq!(v.as_datetime(), Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()));
}

#[test]
fn coerce_integer() {
    assert_eq!(Value::coerce(" 42 ", ScalarType::Integer).unwrap(), Value::Integer(42));
    assert_eq!(Value::coerce("-3", ScalarType::Integer).unwrap(), Value::Integer(-3));
    assert!(Value::coerce("12abc", ScalarType::Integer).is_err());
    assert!(Value::coerce("", ScalarType::Integer).is_err());
}

#[test]
fn coerce_boolean_normalizes() {
    for raw in ["true", "T", "1", "yes", "Y", "on"] {
        assert_eq!(Value::coerce(raw, ScalarType::Boolean).unwrap(), Value::Boolean(true));
    }
    for raw in ["false", "F", "0", "No", "n", "OFF"] {
        assert_eq!(Value::coerce(raw, ScalarType::Boolean).unwrap(), Value::Boolean(false));
    }
    assert!(Value::coerce("maybe", ScalarType::Boolean).is_err());
}

#[test]
fn coercion_error_display() {
    let err = Value::coerce("abc", ScalarType::Integer).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("abc"));
    assert!(msg.contains("integer"));
}

// ── Properties ───────────────────────────────────────────────────

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        ".{0,64}".prop_map(Value::String),
        (1i32..9999, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| Value::Date(date(y, m, d))),
        (0i64..4_102_444_800, 0u32..1_000_000_000).prop_map(|(secs, nanos)| {
            Value::DateTime(Utc.timestamp_opt(secs, nanos).unwrap())
        }),
        any::<i64>().prop_map(Value::Integer),
        any::<bool>().prop_map(Value::Boolean),
    ]
}

proptest! {
    #[test]
    fn rendered_plaintext_coerces_back(value in value_strategy()) {
        let back = Value::coerce(&value.to_plaintext(), value.scalar_type()).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn coercion_never_panics(raw in ".{0,64}") {
        for ty in [
            ScalarType::String,
            ScalarType::Date,
            ScalarType::DateTime,
            ScalarType::Integer,
            ScalarType::Boolean,
        ] {
            let _ = Value::coerce(&raw, ty);
        }
    }
}
