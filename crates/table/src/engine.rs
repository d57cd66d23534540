//! Memoizing table engine.
//!
//! The search index is rebuilt only when the records or the field set change; the
//! processed rows only when records, index, cleaned query or sort change. Slicing a
//! page is cheap and always recomputed.

use std::io;

use tabula_core::{
    FieldDescriptor, FieldSet, PageSize, SortIndicator, SortKey, TableConfig, TableError, TableResult, ViewState,
};
use tabula_search::{EditDistance, FuzzyIndex, SearchKey, SearchOptions};
use tracing::debug;

use crate::export::write_csv;
use crate::pipeline::{clean_query, paginate, process};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub index_builds: u64,
    pub process_runs: u64,
}

/// One rendered page.
#[derive(Debug)]
pub struct PageView<'a, T> {
    pub rows: Vec<&'a T>,
    pub page: usize,
    pub page_size: PageSize,
    pub total_pages: usize,
    /// Length of the processed (filtered) sequence.
    pub total_rows: usize,
}

impl<'a, T> PageView<'a, T> {
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

// (records generation, fields generation)
type InputKey = (u64, u64);

struct CachedIndex {
    key: InputKey,
    index: FuzzyIndex,
}

#[derive(PartialEq)]
struct ProcessKey {
    input: InputKey,
    query: String,
    sort: Option<SortKey>,
}

struct CachedRows {
    key: ProcessKey,
    rows: Vec<usize>,
}

pub struct DataTable<T> {
    records: Vec<T>,
    fields: FieldSet<T>,
    /// `None` searches every field with equal weight.
    search_keys: Option<Vec<SearchKey>>,
    config: TableConfig,
    view: ViewState,
    records_gen: u64,
    fields_gen: u64,
    index: Option<CachedIndex>,
    processed: Option<CachedRows>,
    stats: EngineStats,
}

impl<T> DataTable<T> {
    pub fn new(records: Vec<T>, fields: Vec<FieldDescriptor<T>>, config: TableConfig) -> TableResult<Self> {
        let view = ViewState::new(config.initial_page_size);
        Ok(Self {
            records,
            fields: FieldSet::new(fields)?,
            search_keys: None,
            config,
            view,
            records_gen: 0,
            fields_gen: 0,
            index: None,
            processed: None,
            stats: EngineStats::default(),
        })
    }

    /// Weighted search instead of the equal-weight default.
    pub fn with_search_keys(mut self, keys: Vec<SearchKey>) -> TableResult<Self> {
        check_keys(&self.fields, &keys)?;
        self.search_keys = Some(keys);
        self.fields_gen += 1;
        Ok(self)
    }

    pub fn records(&self) -> &[T] { &self.records }
    pub fn fields(&self) -> &FieldSet<T> { &self.fields }
    pub fn view(&self) -> &ViewState { &self.view }
    pub fn config(&self) -> &TableConfig { &self.config }
    pub fn stats(&self) -> EngineStats { self.stats }

    pub fn indicator(&self, field: &str) -> SortIndicator { self.view.indicator(field) }

    pub fn set_records(&mut self, records: Vec<T>) {
        self.records = records;
        self.records_gen += 1;
    }

    /// Replace the descriptors. A sort on a field that no longer exists is dropped.
    pub fn set_fields(&mut self, fields: Vec<FieldDescriptor<T>>) -> TableResult<()> {
        let fields = FieldSet::new(fields)?;
        if let Some(keys) = &self.search_keys {
            check_keys(&fields, keys)?;
        }
        if let Some(field) = self.view.active_field() {
            if fields.get(field.as_str()).is_none() {
                debug!(field = %field, "sort field removed; clearing sort");
                self.view = ViewState { sort: None, page: 1, ..self.view.clone() };
            }
        }
        self.fields = fields;
        self.fields_gen += 1;
        Ok(())
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.view = self.view.with_query(query);
    }

    /// Header click on `field`; see `ViewState::cycle_sort`.
    pub fn click_sort(&mut self, field: &str) -> TableResult<()> {
        let f = self.fields.require(field)?;
        if !f.sortable {
            return Err(TableError::NotSortable(field.to_string()));
        }
        self.view = self.view.cycle_sort(&f.key);
        Ok(())
    }

    pub fn set_page(&mut self, page: usize) {
        self.view = self.view.with_page(page);
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.view = self.view.with_page_size(page_size);
    }

    /// Swap in a whole view state, e.g. one restored by the caller.
    pub fn replace_view(&mut self, view: ViewState) -> TableResult<()> {
        if let Some(field) = view.active_field() {
            let f = self.fields.require(field.as_str())?;
            if !f.sortable {
                return Err(TableError::NotSortable(field.to_string()));
            }
        }
        self.view = view;
        Ok(())
    }

    /// Bring the index and processed rows up to date with the current inputs.
    pub fn refresh(&mut self) -> TableResult<()> {
        let input: InputKey = (self.records_gen, self.fields_gen);
        let Self { records, fields, search_keys, config, view, index, processed, stats, .. } = self;

        let cached = match index.take() {
            Some(c) if c.key == input => index.insert(c),
            _ => {
                let keys = search_keys.clone().unwrap_or_else(|| SearchKey::equal(fields.as_slice()));
                let built = FuzzyIndex::build(
                    records.as_slice(),
                    fields.as_slice(),
                    &keys,
                    EditDistance::new(config.search_threshold),
                    SearchOptions { ignore_field_norm: config.ignore_field_norm },
                )?;
                stats.index_builds += 1;
                metrics::counter!("table_index_builds_total", 1);
                index.insert(CachedIndex { key: input, index: built })
            }
        };

        let key = ProcessKey { input, query: clean_query(&view.query), sort: view.sort.clone() };
        if processed.as_ref().is_some_and(|c| c.key == key) {
            return Ok(());
        }
        let rows = process(records.as_slice(), &*fields, &cached.index, &*view, config.min_query_chars)?;
        stats.process_runs += 1;
        metrics::counter!("table_process_runs_total", 1);
        debug!(rows = rows.len(), total = records.len(), query = %key.query, "processed rows recomputed");
        *processed = Some(CachedRows { key, rows });
        Ok(())
    }

    fn rows(&self) -> &[usize] {
        self.processed.as_ref().map(|c| c.rows.as_slice()).unwrap_or(&[])
    }

    /// Full filtered and sorted sequence, e.g. for exporting the current view.
    pub fn processed(&mut self) -> TableResult<Vec<&T>> {
        self.refresh()?;
        Ok(self.rows().iter().map(|&i| &self.records[i]).collect())
    }

    pub fn page(&mut self) -> TableResult<PageView<'_, T>> {
        self.refresh()?;
        let rows = self.rows();
        let window = paginate(rows.len(), self.view.page, self.view.page_size.get());
        Ok(PageView {
            rows: rows[window.range].iter().map(|&i| &self.records[i]).collect(),
            page: self.view.page,
            page_size: self.view.page_size,
            total_pages: window.total_pages,
            total_rows: rows.len(),
        })
    }

    /// Write the current view as CSV.
    pub fn export_csv<W: io::Write>(&mut self, out: W) -> io::Result<()> {
        self.refresh().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let rows: Vec<&T> = self.rows().iter().map(|&i| &self.records[i]).collect();
        write_csv(out, self.fields.as_slice(), &rows)
    }
}

fn check_keys<T>(fields: &FieldSet<T>, keys: &[SearchKey]) -> TableResult<()> {
    for k in keys {
        fields.require(k.field.as_str())?;
    }
    Ok(())
}
