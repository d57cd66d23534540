//! Tabula core types: tagged field values, field descriptors and view state.

#![forbid(unsafe_code)]

pub mod columns;
pub mod config;
pub mod error;
pub mod value;
pub mod view;

pub use columns::{FieldDescriptor, FieldId, FieldSet};
pub use config::TableConfig;
pub use error::{TableError, TableResult};
pub use value::Value;
pub use view::{PageSize, SortIndicator, SortKey, ViewState};

pub mod prelude {
    pub use super::{
        FieldDescriptor, FieldId, FieldSet, PageSize, SortIndicator, SortKey, TableConfig,
        TableError, TableResult, Value, ViewState,
    };
}
