//! Result pipeline: filter, then sort, then paginate. The order is fixed.

use std::ops::Range;

use tabula_core::{FieldSet, TableResult, Value, ViewState};
use tabula_search::SearchIndex;
use tracing::trace;

use crate::compare::column_keys;

/// Trim, then drop commas (thousand separators typed into numeric searches).
pub fn clean_query(raw: &str) -> String {
    raw.trim().replace(',', "")
}

/// Filtered and sorted record positions for `view`.
///
/// A cleaned query shorter than `min_query_chars` (or empty) is treated as no filter
/// and keeps insertion order; otherwise the index's relevance order is used. An
/// active sort then reorders stably, so equal keys keep the order of the step before.
pub fn process<T, I>(
    records: &[T],
    fields: &FieldSet<T>,
    index: &I,
    view: &ViewState,
    min_query_chars: usize,
) -> TableResult<Vec<usize>>
where
    I: SearchIndex + ?Sized,
{
    let query = clean_query(&view.query);
    let qlen = query.chars().count();
    let mut rows: Vec<usize> = if qlen == 0 || qlen < min_query_chars {
        (0..records.len()).collect()
    } else {
        index.search(&query).into_iter().map(|h| h.doc).filter(|&d| d < records.len()).collect()
    };
    trace!(query = %query, matched = rows.len(), total = records.len(), "filter");

    if let Some(sort) = &view.sort {
        let field = fields.require(sort.field.as_str())?;
        // Classify over every record so a row's rank does not depend on the query.
        // Each value is read and parsed once, not once per comparison.
        let values: Vec<Value> = records.iter().map(|r| field.value(r)).collect();
        let keys = column_keys(&values);
        rows.sort_by(|&a, &b| {
            let ord = keys[a].cmp(&keys[b]);
            if sort.descending { ord.reverse() } else { ord }
        });
    }
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Positions into the processed sequence; empty when the page is out of range.
    pub range: Range<usize>,
    pub total_pages: usize,
}

/// Window for 1-based `page`. Page 0, pages past the end and a zero `page_size`
/// are empty, not errors.
pub fn paginate(len: usize, page: usize, page_size: usize) -> PageWindow {
    let size = page_size;
    if size == 0 {
        return PageWindow { range: len..len, total_pages: 0 };
    }
    let total_pages = (len + size - 1) / size;
    let start = page.saturating_sub(1).saturating_mul(size);
    let range = if page == 0 || start >= len { len..len } else { start..(start + size).min(len) };
    PageWindow { range, total_pages }
}
