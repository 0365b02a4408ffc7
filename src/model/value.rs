//! Scalar cell values
//!
//! Every record exposes its columns as `Value`s so the table can sort,
//! filter and export without knowing the concrete record type.

use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Numeric view of the value (ints and floats only)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Calendar day of a date value, in UTC
    pub fn calendar_day(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    /// Natural ordering for sorting.
    ///
    /// Nulls sort first. Values of different types fall back to comparing
    /// their text form so the ordering stays total.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                _ => a.to_string().cmp(&b.to_string()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::Date(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_compare_same_types() {
        assert_eq!(Value::from("a").compare(&Value::from("b")), Ordering::Less);
        assert_eq!(Value::from(10).compare(&Value::from(2)), Ordering::Greater);
        assert_eq!(Value::from(1.5).compare(&Value::from(1)), Ordering::Greater);

        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(Value::from(early).compare(&Value::from(late)), Ordering::Less);
    }

    #[test]
    fn test_null_sorts_first() {
        assert_eq!(Value::Null.compare(&Value::from("a")), Ordering::Less);
        assert_eq!(Value::from(0).compare(&Value::Null), Ordering::Greater);
    }

    #[test]
    fn test_numbers_compare_numerically() {
        // "10" < "9" lexicographically, but not as numbers
        assert_eq!(Value::from(10).compare(&Value::from(9)), Ordering::Greater);
    }

    #[test]
    fn test_display_is_raw() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(42).to_string(), "42");
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(Value::from(dt).to_string(), "2024-03-05T12:00:00+00:00");
    }
}
