//! Engine tuning knobs, overridable through `TABULA_*` environment variables.

use tracing::warn;

use crate::{PageSize, TableError};

#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    /// Maximum `errors / pattern length` accepted by the approximate matcher.
    pub search_threshold: f64,
    /// Cleaned queries shorter than this leave the table unfiltered.
    pub min_query_chars: usize,
    pub initial_page_size: PageSize,
    /// Skip the `1/sqrt(tokens)` field-length norm when ranking.
    pub ignore_field_norm: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { search_threshold: 0.3, min_query_chars: 2, initial_page_size: PageSize::Ten, ignore_field_norm: false }
    }
}

impl TableConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env` over an arbitrary lookup. Bad values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = lookup("TABULA_SEARCH_THRESHOLD") {
            match parse_threshold(&v) {
                Ok(t) => cfg.search_threshold = t,
                Err(e) => warn!(error = %e, "ignoring TABULA_SEARCH_THRESHOLD"),
            }
        }
        if let Some(v) = lookup("TABULA_MIN_QUERY_CHARS") {
            match v.trim().parse::<usize>() {
                Ok(n) => cfg.min_query_chars = n,
                Err(_) => warn!(value = %v, "ignoring TABULA_MIN_QUERY_CHARS; expected an integer"),
            }
        }
        if let Some(v) = lookup("TABULA_PAGE_SIZE") {
            match v.parse::<PageSize>() {
                Ok(p) => cfg.initial_page_size = p,
                Err(e) => warn!(error = %e, "ignoring TABULA_PAGE_SIZE"),
            }
        }
        if let Some(v) = lookup("TABULA_IGNORE_FIELD_NORM") {
            match v.trim() {
                "1" | "true" | "yes" => cfg.ignore_field_norm = true,
                "0" | "false" | "no" => cfg.ignore_field_norm = false,
                _ => warn!(value = %v, "ignoring TABULA_IGNORE_FIELD_NORM; expected true/false"),
            }
        }
        cfg
    }
}

fn parse_threshold(v: &str) -> Result<f64, TableError> {
    let bad = || TableError::InvalidConfig { key: "search_threshold".into(), value: v.to_string() };
    let t = v.trim().parse::<f64>().map_err(|_| bad())?;
    if (0.0..=1.0).contains(&t) { Ok(t) } else { Err(bad()) }
}
