//! Tabula table engine: query filter, type-aware sort and pagination over
//! caller-owned records, recomputed only when an input changes.

#![forbid(unsafe_code)]

pub mod compare;
pub mod engine;
pub mod export;
pub mod pipeline;

pub use compare::{column_keys, compare, compare_values, locale_cmp, CollationKey, SortValue};
pub use engine::{DataTable, EngineStats, PageView};
pub use export::write_csv;
pub use pipeline::{clean_query, paginate, process, PageWindow};
