//! Field descriptors: how to read, stringify and order one attribute of a record.
//!
//! This module provides:
//! - `FieldId`, the stable key of a field
//! - `FieldDescriptor<T>` with a typed accessor bound at construction
//! - `FieldSet<T>`, an ordered descriptor list with keyed lookup

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{TableError, TableResult, Value};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(key: impl Into<String>) -> Self { Self(key.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str { &self.0 }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl From<String> for FieldId {
    fn from(s: String) -> Self { Self(s) }
}

type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;
type Stringify<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

pub struct FieldDescriptor<T> {
    pub key: FieldId,
    /// Header text; only the renderer and CSV export read it.
    pub label: String,
    pub sortable: bool,
    accessor: Accessor<T>,
    searchable: Option<Stringify<T>>,
}

impl<T> FieldDescriptor<T> {
    pub fn new(
        key: impl Into<FieldId>,
        label: impl Into<String>,
        accessor: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            accessor: Arc::new(accessor),
            searchable: None,
        }
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Override the text this field contributes to search and export.
    pub fn searchable_with(mut self, f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.searchable = Some(Arc::new(f));
        self
    }

    pub fn value(&self, record: &T) -> Value { (self.accessor)(record) }

    pub fn search_text(&self, record: &T) -> String {
        match &self.searchable {
            Some(f) => f(record),
            None => self.value(record).to_text(),
        }
    }
}

impl FieldDescriptor<serde_json::Value> {
    /// Descriptor over JSON objects. Keys starting with `/` are JSON pointers,
    /// anything else names a top-level member.
    pub fn json(key: impl Into<String>, label: impl Into<String>) -> Self {
        let key: String = key.into();
        let path = key.clone();
        Self::new(key, label, move |rec: &serde_json::Value| {
            let hit = if path.starts_with('/') { rec.pointer(&path) } else { rec.get(path.as_str()) };
            hit.map(Value::from_json).unwrap_or(Value::Null)
        })
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            sortable: self.sortable,
            accessor: Arc::clone(&self.accessor),
            searchable: self.searchable.clone(),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("searchable", &self.searchable.is_some())
            .finish()
    }
}

/// Ordered, validated descriptor list.
pub struct FieldSet<T> {
    fields: Vec<FieldDescriptor<T>>,
    by_key: FxHashMap<FieldId, usize>,
}

impl<T> FieldSet<T> {
    pub fn new(fields: Vec<FieldDescriptor<T>>) -> TableResult<Self> {
        let mut by_key = FxHashMap::default();
        for (i, f) in fields.iter().enumerate() {
            if by_key.insert(f.key.clone(), i).is_some() {
                return Err(TableError::DuplicateField(f.key.to_string()));
            }
        }
        Ok(Self { fields, by_key })
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor<T>> {
        self.by_key.get(key).map(|&i| &self.fields[i])
    }

    pub fn require(&self, key: &str) -> TableResult<&FieldDescriptor<T>> {
        self.get(key).ok_or_else(|| TableError::UnknownField(key.to_string()))
    }

    pub fn as_slice(&self) -> &[FieldDescriptor<T>] { &self.fields }
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor<T>> { self.fields.iter() }
    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

impl<T> Clone for FieldSet<T> {
    fn clone(&self) -> Self { Self { fields: self.fields.clone(), by_key: self.by_key.clone() } }
}

impl<T> fmt::Debug for FieldSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_list().entries(&self.fields).finish() }
}

impl<T> Default for FieldSet<T> {
    fn default() -> Self { Self { fields: Vec::new(), by_key: FxHashMap::default() } }
}
