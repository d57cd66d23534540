//! Type-aware ordering: numbers, then dates, then locale-aware text.
//!
//! The mode is picked once per column, so a column mixing numbers, dates and free
//! text still sorts by a single total order.

use std::borrow::Borrow;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tabula_core::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Precomputed sort key for one cell of a classified column.
#[derive(Debug, Clone)]
pub enum SortValue {
    /// Null in a numeric or chronological column; first in ascending order.
    Missing,
    Number(f64),
    Instant(DateTime<Utc>),
    Text(CollationKey),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Missing => 0,
            SortValue::Number(_) => 1,
            SortValue::Instant(_) => 2,
            SortValue::Text(_) => 3,
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Instant(a), SortValue::Instant(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for SortValue {}

/// Sort keys for a whole column.
///
/// Numeric when every non-null value is a number; else chronological when every
/// non-null value is (or parses as) an instant; else locale-aware text of every
/// value, nulls included as empty text. Each value is parsed once.
pub fn column_keys<V: Borrow<Value>>(values: &[V]) -> Vec<SortValue> {
    let numeric = values.iter().all(|v| matches!(v.borrow(), Value::Null | Value::Number(_)));
    if numeric {
        return values
            .iter()
            .map(|v| match v.borrow() {
                Value::Number(n) => SortValue::Number(*n),
                _ => SortValue::Missing,
            })
            .collect();
    }
    let instants: Vec<Option<DateTime<Utc>>> = values.iter().map(|v| v.borrow().as_instant()).collect();
    if values.iter().zip(&instants).all(|(v, t)| v.borrow().is_null() || t.is_some()) {
        return instants.into_iter().map(|t| t.map_or(SortValue::Missing, SortValue::Instant)).collect();
    }
    values.iter().map(|v| SortValue::Text(CollationKey::new(&v.borrow().to_text()))).collect()
}

/// Ascending order of two field values, classified as a two-value column.
///
/// Both numbers compare numerically; otherwise both parseable as instants compare
/// chronologically; anything else (including one-sided parse failures) falls back to
/// locale-aware comparison of the display text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match column_keys(&[a, b]).as_slice() {
        [x, y] => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Descending flips the ascending result, so ties stay ties in both directions.
pub fn compare(a: &Value, b: &Value, descending: bool) -> Ordering {
    let ord = compare_values(a, b);
    if descending { ord.reverse() } else { ord }
}

/// Collation close to a root-locale `localeCompare`: base letters first, then
/// accents, then case (lowercase first). Only canonically equal strings tie.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

/// Field order is comparison order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: String,
    accents: String,
    case: Vec<bool>,
    canonical: String,
}

impl CollationKey {
    pub fn new(text: &str) -> Self {
        let canonical: String = text.nfd().collect();
        Self {
            primary: canonical.chars().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect(),
            accents: canonical.to_lowercase(),
            case: canonical.chars().map(char::is_uppercase).collect(),
            canonical,
        }
    }
}
