//! Errors raised for structural (programmer) mistakes. Data conditions never error.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TableError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("field is not sortable: {0}")]
    NotSortable(String),
    #[error("duplicate field key: {0}")]
    DuplicateField(String),
    #[error("invalid page size: {0} (expected 10, 20 or 50)")]
    InvalidPageSize(usize),
    #[error("invalid config {key}={value}")]
    InvalidConfig { key: String, value: String },
}

pub type TableResult<T> = Result<T, TableError>;
