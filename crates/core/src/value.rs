//! Tagged field values produced by field accessors.
//!
//! The comparator dispatches on the tag instead of probing runtime types, and text
//! that looks like a date is only interpreted as one when it is compared.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

// Zone-less layouts; interpreted as UTC.
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

impl Value {
    /// Map a JSON value onto a tag. Strings stay text; booleans and containers are
    /// stringified so they still sort and search deterministically.
    pub fn from_json(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    pub fn as_number(&self) -> Option<f64> {
        match self { Value::Number(n) => Some(*n), _ => None }
    }

    /// Instant for dates and for text in one of the accepted date layouts.
    pub fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Text(s) => parse_instant(s),
            Value::Number(_) | Value::Null => None,
        }
    }

    /// Display stringification; `Null` becomes the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Number(n) => format_number(*n),
            Value::Date(d) => d.to_rfc3339(),
            Value::Text(s) => s.clone(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parse a date-like string. Returns `None` for anything that is not clearly a date,
/// including bare numbers.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.len() < 7 || !s.as_bytes()[..4].iter().all(|b| b.is_ascii_digit()) {
        // RFC 2822 starts with a weekday or day number; everything else starts with a year
        return DateTime::parse_from_rfc2822(s).ok().map(|d| d.with_timezone(&Utc));
    }
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(nd) = NaiveDate::parse_from_str(s, layout) {
            return nd.and_hms_opt(0, 0, 0).map(|ndt| Utc.from_utc_datetime(&ndt));
        }
    }
    // Year-month, as used by monthly series ("2024-03")
    if s.len() == 7 && s.as_bytes()[4] == b'-' {
        if let Ok(nd) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
            return nd.and_hms_opt(0, 0, 0).map(|ndt| Utc.from_utc_datetime(&ndt));
        }
    }
    None
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

macro_rules! number_from {
    ($($t:ty),*) => { $(impl From<$t> for Value { fn from(n: $t) -> Self { Value::Number(n as f64) } })* };
}
number_from!(i32, i64, u32, u64, usize, f32);

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Text(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Text(s) }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self { Value::Date(d) }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self { v.map(Into::into).unwrap_or(Value::Null) }
}
