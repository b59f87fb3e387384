//! Stoplist heuristic deciding which extracted strings are useful names.

use std::collections::HashSet;

use indexmap::IndexSet;
use tracing::trace;

use crate::constants::filter::{DEFAULT_STOPLIST, MAX_SHORT_TOKENS};
use crate::tokenize::distinct_lowercase_tokens;
use crate::types::{NameString, Token};

/// Immutable set of lower-cased low-information terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stoplist {
    terms: HashSet<Token>,
}

impl Default for Stoplist {
    fn default() -> Self {
        Self::new(DEFAULT_STOPLIST.iter().copied())
    }
}

impl Stoplist {
    /// Build a stoplist; terms are lower-cased so lookups are case-insensitive.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|term| term.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// True if `token` (already lower-cased) is a stoplist term.
    pub fn contains(&self, token: &str) -> bool {
        self.terms.contains(token)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if the stoplist has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Outcome of scoring a single candidate string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    /// Number of distinct lower-cased tokens.
    pub distinct_tokens: usize,
    /// Distinct tokens that hit the stoplist, in first-seen order.
    pub stoplist_hits: Vec<Token>,
    /// Whether the string is kept.
    pub keep: bool,
}

/// Scores candidate strings against a stoplist.
#[derive(Clone, Debug)]
pub struct TokenFilter {
    stoplist: Stoplist,
    max_short_tokens: usize,
}

impl Default for TokenFilter {
    fn default() -> Self {
        Self::new(Stoplist::default(), MAX_SHORT_TOKENS)
    }
}

impl TokenFilter {
    /// Create a filter; strings with more than `max_short_tokens` distinct tokens always pass.
    pub fn new(stoplist: Stoplist, max_short_tokens: usize) -> Self {
        Self {
            stoplist,
            max_short_tokens,
        }
    }

    /// Score one string.
    ///
    /// A string is kept when none of its tokens is a stoplist term, or when it
    /// has more than `max_short_tokens` distinct tokens. The empty string has no
    /// tokens and is therefore kept.
    pub fn verdict(&self, text: &str) -> Verdict {
        let tokens = distinct_lowercase_tokens(text);
        let stoplist_hits: Vec<Token> = tokens
            .iter()
            .filter(|token| self.stoplist.contains(token))
            .cloned()
            .collect();
        let keep = stoplist_hits.is_empty() || tokens.len() > self.max_short_tokens;
        Verdict {
            distinct_tokens: tokens.len(),
            stoplist_hits,
            keep,
        }
    }

    /// True if `text` survives the heuristic.
    pub fn is_useful(&self, text: &str) -> bool {
        self.verdict(text).keep
    }

    /// Keep the useful strings of one line, deduplicated in first-seen order.
    pub fn useful_strings<I, S>(&self, candidates: I) -> IndexSet<NameString>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept = IndexSet::new();
        for candidate in candidates {
            let candidate = candidate.as_ref();
            if kept.contains(candidate) {
                continue;
            }
            let verdict = self.verdict(candidate);
            if verdict.keep {
                kept.insert(candidate.to_string());
            } else {
                trace!(
                    candidate,
                    distinct_tokens = verdict.distinct_tokens,
                    hits = ?verdict.stoplist_hits,
                    "dropping low-information string"
                );
            }
        }
        kept
    }
}
