//! Search index builder: flattens records into per-key strings and ranks matches.

use std::time::Instant;

use smallvec::SmallVec;
use tabula_core::{FieldDescriptor, FieldId, TableError, TableResult};
use tracing::debug;

use crate::matcher::{EditDistance, Matcher};
use crate::{DocId, Hit, SearchIndex};

/// Exact matches still need a non-zero base so weights keep ordering them.
const PERFECT: f64 = f64::EPSILON;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchKey {
    pub field: FieldId,
    pub weight: f64,
}

impl SearchKey {
    pub fn new(field: impl Into<FieldId>, weight: f64) -> Self {
        Self { field: field.into(), weight }
    }

    /// One key per field, all weighted the same.
    pub fn equal<T>(fields: &[FieldDescriptor<T>]) -> Vec<SearchKey> {
        fields.iter().map(|f| SearchKey::new(f.key.clone(), 1.0)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchOptions {
    pub ignore_field_norm: bool,
}

// One flattened record. `origin` is the back-reference and is never matched against.
struct Projection {
    origin: DocId,
    texts: SmallVec<[String; 8]>,
    norms: SmallVec<[f64; 8]>,
}

pub struct FuzzyIndex<M = EditDistance> {
    keys: Vec<FieldId>,
    weights: Vec<f64>,
    docs: Vec<Projection>,
    matcher: M,
    opts: SearchOptions,
}

impl<M: Matcher> FuzzyIndex<M> {
    /// Project every record through the descriptors named by `keys`.
    pub fn build<T>(
        records: &[T],
        fields: &[FieldDescriptor<T>],
        keys: &[SearchKey],
        matcher: M,
        opts: SearchOptions,
    ) -> TableResult<Self> {
        let started = Instant::now();
        let mut resolved: Vec<&FieldDescriptor<T>> = Vec::with_capacity(keys.len());
        for k in keys {
            let f = fields
                .iter()
                .find(|f| f.key == k.field)
                .ok_or_else(|| TableError::UnknownField(k.field.to_string()))?;
            resolved.push(f);
        }
        let total_weight: f64 = keys.iter().map(|k| k.weight.max(0.0)).sum();
        let weights: Vec<f64> = keys
            .iter()
            .map(|k| if total_weight > 0.0 { k.weight.max(0.0) / total_weight } else { 1.0 })
            .collect();

        let mut docs = Vec::with_capacity(records.len());
        for (i, rec) in records.iter().enumerate() {
            let mut texts = SmallVec::new();
            let mut norms = SmallVec::new();
            for f in resolved.iter() {
                let text = f.search_text(rec).to_lowercase();
                norms.push(field_norm(&text));
                texts.push(text);
            }
            docs.push(Projection { origin: i, texts, norms });
        }

        metrics::gauge!("index_docs", docs.len() as f64);
        debug!(docs = docs.len(), keys = keys.len(), elapsed_us = started.elapsed().as_micros() as u64, "search index built");
        Ok(Self {
            keys: keys.iter().map(|k| k.field.clone()).collect(),
            weights,
            docs,
            matcher,
            opts,
        })
    }

    pub fn keys(&self) -> &[FieldId] { &self.keys }
}

impl<M: Matcher> SearchIndex for FuzzyIndex<M> {
    fn search(&self, query: &str) -> Vec<Hit> {
        let started = Instant::now();
        let pattern = query.to_lowercase();
        if pattern.trim().is_empty() {
            return Vec::new();
        }
        let mut hits: Vec<Hit> = Vec::new();
        for doc in &self.docs {
            let mut total = 1.0f64;
            let mut matched = false;
            for (k, text) in doc.texts.iter().enumerate() {
                if text.is_empty() {
                    continue;
                }
                let Some(s) = self.matcher.score(text, &pattern) else { continue };
                matched = true;
                let norm = if self.opts.ignore_field_norm { 1.0 } else { doc.norms[k] };
                let base = if s == 0.0 { PERFECT } else { s };
                total *= base.powf(self.weights[k] * norm);
            }
            if matched {
                hits.push(Hit { doc: doc.origin, score: total });
            }
        }
        // Stable ranking
        hits.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.doc.cmp(&b.doc)));
        metrics::histogram!("search_eval_ms", started.elapsed().as_secs_f64() * 1_000.0);
        hits
    }

    fn len(&self) -> usize { self.docs.len() }
}

/// `1/sqrt(tokens)`, rounded to three decimals; short values weigh more.
fn field_norm(text: &str) -> f64 {
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count().max(1);
    ((1.0 / (tokens as f64).sqrt()) * 1000.0).round() / 1000.0
}
