//! Extended query syntax.
//!
//! Whitespace separates terms that must all match within one field; `|` separates
//! alternatives. Operators: `=exact`, `'include`, `^prefix`, `suffix$`, `!exclude`,
//! `!^prefix`, `!suffix$`. Any other term is approximate. Operands may be quoted
//! (`="vision inspection"`).

use crate::matcher::{EditDistance, Matcher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Fuzzy(String),
    Exact(String),
    Include(String),
    Prefix(String),
    Suffix(String),
    NotInclude(String),
    NotPrefix(String),
    NotSuffix(String),
}

impl Term {
    pub fn parse(token: &str) -> Term {
        let operand = |s: &str| -> Option<String> {
            let s = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(s);
            (!s.is_empty()).then(|| s.to_string())
        };
        if let Some(t) = token.strip_prefix('=').and_then(operand) {
            return Term::Exact(t);
        }
        if let Some(t) = token.strip_prefix('\'').and_then(operand) {
            return Term::Include(t);
        }
        if let Some(t) = token.strip_prefix('^').and_then(operand) {
            return Term::Prefix(t);
        }
        if let Some(t) = token.strip_prefix("!^").and_then(operand) {
            return Term::NotPrefix(t);
        }
        if let Some(t) = token.strip_prefix('!').and_then(|s| s.strip_suffix('$')).and_then(operand) {
            return Term::NotSuffix(t);
        }
        if let Some(t) = token.strip_suffix('$').and_then(operand) {
            return Term::Suffix(t);
        }
        if let Some(t) = token.strip_prefix('!').and_then(operand) {
            return Term::NotInclude(t);
        }
        Term::Fuzzy(token.to_string())
    }

    /// Text a hit of this term would cover; `None` for exclusions.
    pub fn needle(&self) -> Option<&str> {
        match self {
            Term::Fuzzy(t) | Term::Exact(t) | Term::Include(t) | Term::Prefix(t) | Term::Suffix(t) => Some(t),
            Term::NotInclude(_) | Term::NotPrefix(_) | Term::NotSuffix(_) => None,
        }
    }

    fn score<M: Matcher>(&self, text: &str, fuzzy: &M) -> Option<f64> {
        let hit = match self {
            Term::Fuzzy(t) => return fuzzy.score(text, t),
            Term::Exact(t) => text == t,
            Term::Include(t) => text.contains(t.as_str()),
            Term::Prefix(t) => text.starts_with(t.as_str()),
            Term::Suffix(t) => text.ends_with(t.as_str()),
            Term::NotInclude(t) => !text.contains(t.as_str()),
            Term::NotPrefix(t) => !text.starts_with(t.as_str()),
            Term::NotSuffix(t) => !text.ends_with(t.as_str()),
        };
        hit.then_some(0.0)
    }
}

/// Alternatives of conjunctions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtendedQuery {
    groups: Vec<Vec<Term>>,
}

impl ExtendedQuery {
    pub fn parse(query: &str) -> Self {
        let groups = query
            .split('|')
            .map(tokens)
            .filter(|g| !g.is_empty())
            .map(|g| g.iter().map(|t| Term::parse(t)).collect())
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[Vec<Term>] { &self.groups }

    pub fn is_empty(&self) -> bool { self.groups.is_empty() }

    /// Score of the first alternative whose terms all match `text`: the mean of its
    /// term scores.
    pub fn score<M: Matcher>(&self, text: &str, fuzzy: &M) -> Option<f64> {
        self.groups.iter().find_map(|group| {
            let mut total = 0.0;
            for term in group {
                total += term.score(text, fuzzy)?;
            }
            Some(total / group.len() as f64)
        })
    }
}

// Split on whitespace outside double quotes.
fn tokens(group: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut quoted = false;
    for c in group.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                cur.push(c);
            }
            c if c.is_whitespace() && !quoted => {
                if !cur.is_empty() {
                    out.push(std::mem::take(&mut cur));
                }
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

/// Matcher that reads each pattern as an [`ExtendedQuery`], scoring approximate
/// terms with the wrapped matcher.
#[derive(Debug, Clone, Default)]
pub struct Extended<M = EditDistance> {
    fuzzy: M,
}

impl<M: Matcher> Extended<M> {
    pub fn new(fuzzy: M) -> Self { Self { fuzzy } }
}

impl<M: Matcher> Matcher for Extended<M> {
    fn score(&self, text: &str, pattern: &str) -> Option<f64> {
        ExtendedQuery::parse(pattern).score(text, &self.fuzzy)
    }
}
