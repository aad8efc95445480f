//! Field values held by a [`Record`](crate::Record).
//!
//! Records coming from a hosted backend are loosely typed, so [`Value`] only
//! distinguishes the kinds a table actually needs: strings, numbers, dates,
//! booleans and null. Three projections drive the engine:
//!
//! - [`Value::to_text`] - the string form used by search and the string operators
//! - [`Value::to_number`] - the numeric coercion used by `greaterThan` / `lessThan`
//! - [`compare_values`] - the raw ordering used for sorting

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single field value.
///
/// # Example
///
/// ```
/// use tabulon_table::{Number, Value};
///
/// let name = Value::from("Bob");
/// let age = Value::from(30);
///
/// assert_eq!(name.to_text().as_deref(), Some("Bob"));
/// assert_eq!(age, Value::Number(Number::I64(30)));
/// assert_eq!(age.to_number(), 30.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing or null field.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// Date/time value.
    Timestamp(Timestamp),
    /// Text value.
    String(String),
}

impl Value {
    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String form of the value. `None` for null.
    ///
    /// Integral floats print without a fractional part (`30.0` becomes `"30"`)
    /// and timestamps print as RFC 3339, so that searching for `"2024-03"`
    /// finds dates in March 2024.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Timestamp(t) => Some(t.to_string()),
            Value::String(s) => Some(s.clone()),
        }
    }

    /// Numeric coercion. Returns `NaN` when the value has no numeric reading.
    ///
    /// Booleans read as `0`/`1`, timestamps as their milliseconds, and blank
    /// strings as `0`. Null is never numeric.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => f64::NAN,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => n.to_f64(),
            Value::Timestamp(t) => t.as_millis() as f64,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
        }
    }

    /// Strict equality: both values must be of the same kind.
    ///
    /// Numbers compare by value across integer and float representations,
    /// so `30` equals `30.0`, but `30` never equals `"30"`.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.compare(*b) == Some(Ordering::Equal),
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }

    /// Converts a JSON value. Arrays and objects are kept as compact JSON text.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Number::I64(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Number::U64(u))
                } else {
                    Value::Number(Number::F64(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            other => Value::String(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Value::from_json)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Timestamp> for Value {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Numeric value.
///
/// Integers keep their precision; comparisons across representations go
/// through `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types. `None` when NaN is involved.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident, $target:ty, $($source:ty),+) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )+
    };
}

number_from!(I64, i64, i8, i16, i32, i64, isize);
number_from!(U64, u64, u8, u16, u32, u64, usize);
number_from!(F64, f64, f32, f64);

macro_rules! value_from_number {
    ($($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(n: $source) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )+
    };
}

value_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

/// Date/time value as milliseconds since the Unix epoch (UTC).
///
/// Serializes as an RFC 3339 string.
///
/// ```
/// use tabulon_table::Timestamp;
///
/// let ts = Timestamp::parse("2024-03-01").unwrap();
/// assert_eq!(ts.to_string(), "2024-03-01T00:00:00Z");
/// assert!(ts < Timestamp::parse("2024-03-02T08:00:00Z").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a timestamp from seconds since the Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    /// Returns the timestamp as milliseconds since the Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Parses an RFC 3339 date-time, a naive `YYYY-MM-DDTHH:MM:SS`
    /// date-time (read as UTC), or a plain `YYYY-MM-DD` date (midnight UTC).
    pub fn parse(text: &str) -> Option<Timestamp> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Timestamp(dt.timestamp_millis()));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
            return Some(Timestamp(naive.and_utc().timestamp_millis()));
        }
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
        let midnight = date.and_hms_opt(0, 0, 0)?;
        Some(Timestamp(midnight.and_utc().timestamp_millis()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp_millis(self.0) {
            Some(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Raw ordering of two values, as used by column sorting.
///
/// Values of the same kind compare naturally (NaN sorts after every other
/// number). Values of different kinds order by kind so the comparison stays
/// total: booleans, numbers, dates, text, then null last.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => compare_numbers(*a, *b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn compare_numbers(a: Number, b: Number) -> Ordering {
    match (a, b) {
        (Number::I64(a), Number::I64(b)) => a.cmp(&b),
        (Number::U64(a), Number::U64(b)) => a.cmp(&b),
        _ => {
            let (a, b) = (a.to_f64(), b.to_f64());
            match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            }
        }
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::Timestamp(_) => 2,
        Value::String(_) => 3,
        Value::Null => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_text_forms() {
        assert_eq!(Value::Null.to_text(), None);
        assert_eq!(Value::from(true).to_text().as_deref(), Some("true"));
        assert_eq!(Value::from(30).to_text().as_deref(), Some("30"));
        assert_eq!(Value::from(30.0).to_text().as_deref(), Some("30"));
        assert_eq!(Value::from(2.5).to_text().as_deref(), Some("2.5"));
        assert_eq!(Value::from("Bob").to_text().as_deref(), Some("Bob"));
        assert_eq!(
            Value::from(Timestamp::from_secs(0)).to_text().as_deref(),
            Some("1970-01-01T00:00:00Z")
        );
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::from(30).to_number(), 30.0);
        assert_eq!(Value::from(" 12.5 ").to_number(), 12.5);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::from(true).to_number(), 1.0);
        assert!(Value::from("abc").to_number().is_nan());
        assert!(Value::Null.to_number().is_nan());
    }

    #[test]
    fn strict_equality_requires_same_kind() {
        assert!(Value::from(30).strict_eq(&Value::from(30.0)));
        assert!(!Value::from(30).strict_eq(&Value::from("30")));
        assert!(!Value::from("bob").strict_eq(&Value::from("Bob")));
        assert!(Value::Null.strict_eq(&Value::Null));
    }

    #[test]
    fn json_conversion() {
        let json = serde_json::json!({"a": 1});
        assert_eq!(Value::from_json(json), Value::from("{\"a\":1}"));
        assert_eq!(
            Value::from_json(serde_json::json!(-4)),
            Value::Number(Number::I64(-4))
        );
        assert_eq!(
            Value::from_json(serde_json::json!(1.5)),
            Value::Number(Number::F64(1.5))
        );
        assert_eq!(Value::from_json(serde_json::Value::Null), Value::Null);
    }

    #[test]
    fn serializes_untagged() {
        let values = vec![
            Value::Null,
            Value::from(1),
            Value::from("x"),
            Value::from(Timestamp::from_secs(60)),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,1,"x","1970-01-01T00:01:00Z"]"#);
    }

    #[test]
    fn huge_second_counts_saturate() {
        assert_eq!(Timestamp::from_secs(i64::MAX).as_millis(), i64::MAX);
        assert_eq!(Timestamp::from_secs(i64::MIN).as_millis(), i64::MIN);
        assert_eq!(Timestamp::from_secs(i64::MAX).to_string(), i64::MAX.to_string());
    }

    #[test]
    fn timestamp_parsing() {
        assert_eq!(Timestamp::parse("1970-01-02"), Some(Timestamp(86_400_000)));
        assert_eq!(
            Timestamp::parse("1970-01-01T00:00:01Z"),
            Some(Timestamp(1000))
        );
        assert_eq!(
            Timestamp::parse("1970-01-01T01:00:00+01:00"),
            Some(Timestamp(0))
        );
        assert_eq!(Timestamp::parse("1970-01-01T00:00:02"), Some(Timestamp(2000)));
        assert_eq!(Timestamp::parse("yesterday"), None);
    }

    #[test]
    fn compare_same_kind() {
        assert_eq!(
            compare_values(&Value::from("Al"), &Value::from("Bob")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::from(30), &Value::from(25.5)),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::from(false), &Value::from(true)),
            Ordering::Less
        );
    }

    #[test]
    fn compare_null_sorts_last() {
        assert_eq!(
            compare_values(&Value::Null, &Value::from(1)),
            Ordering::Greater
        );
        assert_eq!(compare_values(&Value::from(1), &Value::Null), Ordering::Less);
    }

    #[test]
    fn compare_mixed_kinds_by_rank() {
        assert_eq!(
            compare_values(&Value::from(1), &Value::from("1")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::from("a"), &Value::from(true)),
            Ordering::Greater
        );
    }

    #[test]
    fn compare_nan_sorts_after_numbers() {
        assert_eq!(
            compare_values(&Value::from(f64::NAN), &Value::from(1)),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::from(f64::NAN), &Value::from(f64::NAN)),
            Ordering::Equal
        );
    }
}
