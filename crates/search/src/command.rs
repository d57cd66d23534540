//! Global command search over the application's page catalog.
//!
//! Titles outweigh keywords, which outweigh descriptions. Queries use the extended
//! syntax of [`crate::extended`]. A blank query lists the first few visible commands
//! instead of searching.

use serde::{Deserialize, Serialize};
use tabula_core::{FieldDescriptor, TableResult, Value};
use tracing::debug;

use crate::extended::{Extended, ExtendedQuery};
use crate::index::{FuzzyIndex, SearchKey, SearchOptions};
use crate::matcher::{EditDistance, Subsequence};
use crate::SearchIndex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub key: String,
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: String,
    /// Roles allowed to see the command; empty means everyone.
    #[serde(default)]
    pub authority: Vec<String>,
}

impl Command {
    pub fn visible_to(&self, roles: &[String]) -> bool {
        self.authority.is_empty() || self.authority.iter().any(|a| roles.contains(a))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandSearchConfig {
    pub threshold: f64,
    pub min_match_chars: usize,
    /// Commands listed for a blank query.
    pub idle_limit: usize,
    pub title_weight: f64,
    pub keywords_weight: f64,
    pub description_weight: f64,
}

impl Default for CommandSearchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            min_match_chars: 2,
            idle_limit: 5,
            title_weight: 2.5,
            keywords_weight: 1.5,
            description_weight: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandHit<'a> {
    pub command: &'a Command,
    pub score: f64,
    /// Character positions in the title to emphasize.
    pub title_hits: Vec<usize>,
}

pub struct CommandSearch {
    visible: Vec<Command>,
    index: FuzzyIndex<Extended<EditDistance>>,
    highlighter: Subsequence,
    idle_limit: usize,
}

fn command_fields() -> Vec<FieldDescriptor<Command>> {
    vec![
        FieldDescriptor::new("title", "Title", |c: &Command| Value::from(c.title.as_str())),
        FieldDescriptor::new("keywords", "Keywords", |c: &Command| Value::from(c.keywords.as_str())),
        FieldDescriptor::new("description", "Description", |c: &Command| Value::from(c.description.as_str())),
    ]
}

impl CommandSearch {
    /// Index the commands visible to `roles`, keeping catalog order.
    pub fn new(catalog: &[Command], roles: &[String], cfg: CommandSearchConfig) -> TableResult<Self> {
        let visible: Vec<Command> = catalog.iter().filter(|c| c.visible_to(roles)).cloned().collect();
        let keys = [
            SearchKey::new("title", cfg.title_weight),
            SearchKey::new("keywords", cfg.keywords_weight),
            SearchKey::new("description", cfg.description_weight),
        ];
        let matcher = Extended::new(EditDistance::new(cfg.threshold).min_match_chars(cfg.min_match_chars));
        let index = FuzzyIndex::build(
            &visible,
            &command_fields(),
            &keys,
            matcher,
            SearchOptions { ignore_field_norm: true },
        )?;
        debug!(catalog = catalog.len(), visible = visible.len(), "command search ready");
        Ok(Self { visible, index, highlighter: Subsequence::default(), idle_limit: cfg.idle_limit })
    }

    pub fn visible(&self) -> &[Command] { &self.visible }

    pub fn search(&self, query: &str) -> Vec<CommandHit<'_>> {
        let q = query.trim();
        if q.is_empty() {
            return self
                .visible
                .iter()
                .take(self.idle_limit)
                .map(|command| CommandHit { command, score: 0.0, title_hits: Vec::new() })
                .collect();
        }
        let parsed = ExtendedQuery::parse(&q.to_lowercase());
        self.index
            .search(q)
            .into_iter()
            .map(|h| {
                let command = &self.visible[h.doc];
                let title_hits = self.title_hits(&command.title, &parsed);
                CommandHit { command, score: h.score, title_hits }
            })
            .collect()
    }

    // Union of the positions each non-excluding term covers in the title.
    fn title_hits(&self, title: &str, query: &ExtendedQuery) -> Vec<usize> {
        let mut hits: Vec<usize> = query
            .groups()
            .iter()
            .flatten()
            .filter_map(|t| t.needle())
            .filter_map(|n| self.highlighter.indices(title, n))
            .flatten()
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }
}
