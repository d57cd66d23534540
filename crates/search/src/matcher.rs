//! Approximate string matchers.
//!
//! Scores live in `[0, 1]` with `0` a perfect match. Inputs arrive lowercased.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

pub trait Matcher {
    fn score(&self, text: &str, pattern: &str) -> Option<f64>;
}

/// Edit-distance tolerant substring matching. A hit anywhere in the text counts the
/// same; the score is `errors / pattern length`, accepted up to `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditDistance {
    pub threshold: f64,
    /// Patterns with fewer non-space characters never match.
    pub min_match_chars: usize,
}

impl Default for EditDistance {
    fn default() -> Self { Self { threshold: 0.3, min_match_chars: 1 } }
}

impl EditDistance {
    pub fn new(threshold: f64) -> Self { Self { threshold, ..Self::default() } }

    pub fn min_match_chars(mut self, n: usize) -> Self {
        self.min_match_chars = n;
        self
    }
}

impl Matcher for EditDistance {
    fn score(&self, text: &str, pattern: &str) -> Option<f64> {
        let pat: Vec<char> = pattern.chars().collect();
        let significant = pat.iter().filter(|c| !c.is_whitespace()).count();
        if pat.is_empty() || significant < self.min_match_chars.max(1) {
            return None;
        }
        if text.contains(pattern) {
            return Some(0.0);
        }
        let max_errors = (self.threshold * pat.len() as f64).floor() as usize;
        if max_errors == 0 {
            return None;
        }
        let hay: Vec<char> = text.chars().collect();
        best_substring_distance(&hay, &pat, max_errors).map(|e| e as f64 / pat.len() as f64)
    }
}

/// Smallest edit distance between `pat` and any substring of `hay` (Sellers), if it
/// is within `max_errors`.
fn best_substring_distance(hay: &[char], pat: &[char], max_errors: usize) -> Option<usize> {
    let m = pat.len();
    // prev[i]: distance of pat[..i] against the best suffix of the text read so far
    let mut prev: Vec<usize> = (0..=m).collect();
    let mut cur: Vec<usize> = vec![0; m + 1];
    let mut best = m;
    for &tc in hay {
        cur[0] = 0;
        for i in 1..=m {
            let diag = prev[i - 1] + usize::from(pat[i - 1] != tc);
            cur[i] = diag.min(prev[i] + 1).min(cur[i - 1] + 1);
        }
        best = best.min(cur[m]);
        if best == 0 { break; }
        std::mem::swap(&mut prev, &mut cur);
    }
    (best <= max_errors).then_some(best)
}

/// fzf-style subsequence matching backed by `SkimMatcherV2`, used for highlights.
pub struct Subsequence {
    inner: SkimMatcherV2,
}

impl Default for Subsequence {
    fn default() -> Self { Self { inner: SkimMatcherV2::default().ignore_case() } }
}

impl Subsequence {
    /// Character positions in `text` covered by the match, for highlighting.
    pub fn indices(&self, text: &str, pattern: &str) -> Option<Vec<usize>> {
        self.inner.fuzzy_indices(text, pattern).map(|(_, idx)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_substring_scores_zero_anywhere() {
        let m = EditDistance::default();
        assert_eq!(m.score("toyota corolla", "corolla"), Some(0.0));
        assert_eq!(m.score("toyota corolla", "toyota"), Some(0.0));
    }

    #[test]
    fn typos_within_threshold_match() {
        let m = EditDistance::default();
        // one deletion over five chars
        assert_eq!(m.score("cherry", "chery"), Some(0.2));
        // one substitution over ten chars
        let s = m.score("forecast volume", "forecest v").unwrap();
        assert!((s - 0.1).abs() < 1e-9);
    }

    #[test]
    fn too_many_errors_reject() {
        let m = EditDistance::default();
        assert_eq!(m.score("banana", "xyz"), None);
        // three chars allow zero errors
        assert_eq!(m.score("apple", "apx"), None);
        assert_eq!(m.score("", "apple"), None);
    }

    #[test]
    fn min_match_chars_gates_short_patterns() {
        let m = EditDistance::default().min_match_chars(2);
        assert_eq!(m.score("apple", "a"), None);
        assert_eq!(m.score("apple", "ap"), Some(0.0));
    }

    #[test]
    fn substring_distance_counts_edits() {
        let hay: Vec<char> = "registration".chars().collect();
        let pat: Vec<char> = "regstration".chars().collect();
        assert_eq!(best_substring_distance(&hay, &pat, 3), Some(1));
        let pat2: Vec<char> = "xxxxxxx".chars().collect();
        assert_eq!(best_substring_distance(&hay, &pat2, 2), None);
    }

    #[test]
    fn subsequence_highlights() {
        let m = Subsequence::default();
        assert!(m.indices("Registration Intelligence", "regint").is_some());
        assert!(m.indices("Settings", "zzz").is_none());
        assert_eq!(m.indices("Settings", "set"), Some(vec![0, 1, 2]));
    }
}
