//! Immutable view state (query, sort, page) and its transitions.
//!
//! Every transition returns a fresh `ViewState`; nothing is patched in place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{FieldId, TableError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "usize", try_from = "usize")]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Ten, PageSize::Twenty, PageSize::Fifty];

    pub fn get(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
        }
    }
}

impl From<PageSize> for usize {
    fn from(p: PageSize) -> usize { p.get() }
}

impl TryFrom<usize> for PageSize {
    type Error = TableError;
    fn try_from(n: usize) -> Result<Self, Self::Error> {
        PageSize::ALL.into_iter().find(|p| p.get() == n).ok_or(TableError::InvalidPageSize(n))
    }
}

impl FromStr for PageSize {
    type Err = TableError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s.trim().parse::<usize>().map_err(|_| TableError::InvalidConfig {
            key: "page_size".to_string(),
            value: s.to_string(),
        })?;
        PageSize::try_from(n)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.get()) }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: FieldId,
    pub descending: bool,
}

/// Header glyph the renderer shows for one field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortIndicator {
    Neutral,
    Ascending,
    Descending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub query: String,
    pub sort: Option<SortKey>,
    /// 1-based. Not clamped; an out-of-range page renders as empty.
    pub page: usize,
    pub page_size: PageSize,
}

impl Default for ViewState {
    fn default() -> Self { Self::new(PageSize::default()) }
}

impl ViewState {
    pub fn new(page_size: PageSize) -> Self {
        Self { query: String::new(), sort: None, page: 1, page_size }
    }

    pub fn active_field(&self) -> Option<&FieldId> { self.sort.as_ref().map(|s| &s.field) }

    pub fn sort_descending(&self) -> bool { self.sort.as_ref().map(|s| s.descending).unwrap_or(false) }

    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self { query: query.into(), page: 1, ..self.clone() }
    }

    /// Header click: unsorted -> ascending -> descending -> unsorted for the same field;
    /// a different field always starts ascending. Always back to page 1.
    pub fn cycle_sort(&self, field: &FieldId) -> Self {
        let sort = match &self.sort {
            Some(SortKey { field: cur, descending: false }) if cur == field => {
                Some(SortKey { field: field.clone(), descending: true })
            }
            Some(SortKey { field: cur, descending: true }) if cur == field => None,
            _ => Some(SortKey { field: field.clone(), descending: false }),
        };
        Self { sort, page: 1, ..self.clone() }
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self { page, ..self.clone() }
    }

    pub fn with_page_size(&self, page_size: PageSize) -> Self {
        Self { page_size, page: 1, ..self.clone() }
    }

    pub fn indicator(&self, field: &str) -> SortIndicator {
        match &self.sort {
            Some(s) if s.field.as_str() == field => {
                if s.descending { SortIndicator::Descending } else { SortIndicator::Ascending }
            }
            _ => SortIndicator::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_cycles_through_three_states() {
        let qty = FieldId::from("qty");
        let v0 = ViewState::default();
        let v1 = v0.cycle_sort(&qty);
        assert_eq!(v1.active_field(), Some(&qty));
        assert!(!v1.sort_descending());
        assert_eq!(v1.indicator("qty"), SortIndicator::Ascending);

        let v2 = v1.cycle_sort(&qty);
        assert_eq!(v2.active_field(), Some(&qty));
        assert!(v2.sort_descending());
        assert_eq!(v2.indicator("qty"), SortIndicator::Descending);

        let v3 = v2.cycle_sort(&qty);
        assert_eq!(v3.active_field(), None);
        assert!(!v3.sort_descending());
        assert_eq!(v3.indicator("qty"), SortIndicator::Neutral);
        // the originals are untouched
        assert_eq!(v0.sort, None);
        assert!(!v1.sort_descending());
    }

    #[test]
    fn other_field_starts_ascending_from_any_state() {
        let a = FieldId::from("a");
        let b = FieldId::from("b");
        let desc_a = ViewState::default().cycle_sort(&a).cycle_sort(&a);
        let v = desc_a.cycle_sort(&b);
        assert_eq!(v.sort, Some(SortKey { field: b.clone(), descending: false }));
        assert_eq!(v.indicator("a"), SortIndicator::Neutral);
    }

    #[test]
    fn transitions_reset_page() {
        let v = ViewState::default().with_page(3);
        assert_eq!(v.page, 3);
        assert_eq!(v.with_query("ford").page, 1);
        assert_eq!(v.cycle_sort(&FieldId::from("x")).page, 1);
        assert_eq!(v.with_page_size(PageSize::Fifty).page, 1);
        assert_eq!(v.with_page_size(PageSize::Fifty).page_size.get(), 50);
    }

    #[test]
    fn page_size_parses_fixed_set_only() {
        assert_eq!("20".parse::<PageSize>(), Ok(PageSize::Twenty));
        assert_eq!(PageSize::try_from(50), Ok(PageSize::Fifty));
        assert_eq!(PageSize::try_from(25), Err(TableError::InvalidPageSize(25)));
        assert!("ten".parse::<PageSize>().is_err());
        assert_eq!(PageSize::default().to_string(), "10");
    }

    #[test]
    fn view_state_serializes_page_size_as_number() {
        let v = ViewState::default().cycle_sort(&FieldId::from("qty"));
        let j = serde_json::to_value(&v).unwrap();
        assert_eq!(j["page_size"], serde_json::json!(10));
        assert_eq!(j["sort"]["field"], serde_json::json!("qty"));
    }
}
