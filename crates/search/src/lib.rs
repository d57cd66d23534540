//! Tabula search: approximate, location-agnostic search over record projections.
//!
//! The pipeline only ever talks to [`SearchIndex`]; any matcher satisfying
//! [`Matcher`] can back a [`FuzzyIndex`].

#![forbid(unsafe_code)]

pub mod command;
pub mod extended;
pub mod index;
pub mod matcher;

pub use command::{Command, CommandHit, CommandSearch, CommandSearchConfig};
pub use extended::{Extended, ExtendedQuery, Term};
pub use index::{FuzzyIndex, SearchKey, SearchOptions};
pub use matcher::{EditDistance, Matcher, Subsequence};

/// Position of the originating record in the indexed slice.
pub type DocId = usize;

/// One ranked search result. Lower scores are better; exact matches score close to `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit { pub doc: DocId, pub score: f64 }

pub trait SearchIndex {
    /// Ranked hits, best first. Ties keep record order.
    fn search(&self, query: &str) -> Vec<Hit>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool { self.len() == 0 }
}
