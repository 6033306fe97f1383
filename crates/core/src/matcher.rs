//! Case-insensitive, multi-keyword matching.
//!
//! Matching is plain substring matching on lower-cased text: a keyword
//! matches inside a longer word, and keywords are OR-combined. Each keyword
//! is counted on its own, so two keywords whose spellings overlap both count
//! the shared text.

use crate::{Error, Result};
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// How several keywords are substituted into one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionMode {
    /// One pass per keyword, in caller order. A later keyword can match text
    /// inserted by an earlier pass.
    #[default]
    Sequential,
    /// A single left-to-right pass over all keywords. Inserted text is never
    /// matched again.
    SinglePass,
}

/// An ordered list of validated keywords.
///
/// Duplicates are kept and matched independently.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
    /// Alternation of every keyword, used by [`SubstitutionMode::SinglePass`].
    combined: Regex,
}

#[derive(Debug, Clone)]
struct Keyword {
    text: String,
    lowered: String,
    pattern: Regex,
}

impl KeywordSet {
    /// Build a keyword set, rejecting an empty list and empty keywords.
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        if keywords.is_empty() {
            return Err(Error::NoKeywords);
        }

        let mut compiled = Vec::with_capacity(keywords.len());
        for (idx, text) in keywords.into_iter().enumerate() {
            if text.is_empty() {
                return Err(Error::EmptyKeyword(idx + 1));
            }
            let pattern = literal_pattern(&regex::escape(&text))?;
            compiled.push(Keyword {
                lowered: text.to_lowercase(),
                text,
                pattern,
            });
        }

        let alternation = compiled
            .iter()
            .map(|k| regex::escape(&k.text))
            .collect::<Vec<_>>()
            .join("|");
        let combined = literal_pattern(&alternation)?;

        Ok(Self {
            keywords: compiled,
            combined,
        })
    }

    /// Keywords in caller order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Whether any keyword occurs in `text`, ignoring case.
    pub fn is_match(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .any(|k| lowered.contains(k.lowered.as_str()))
    }

    /// Count every keyword's non-overlapping occurrences in `text`.
    pub fn find(&self, text: &str) -> KeywordMatch {
        let lowered = text.to_lowercase();
        let hits: Vec<KeywordHit> = self
            .keywords
            .iter()
            .map(|k| KeywordHit {
                keyword: k.text.clone(),
                count: lowered.matches(k.lowered.as_str()).count(),
            })
            .collect();
        let total = hits.iter().map(|h| h.count).sum();

        KeywordMatch { hits, total }
    }

    /// Replace every occurrence of every keyword with `replacement`.
    ///
    /// The replacement is inserted literally; `$1` and friends are not
    /// expanded.
    pub fn substitute(&self, text: &str, replacement: &str, mode: SubstitutionMode) -> String {
        self.passes(mode).into_iter().fold(text.to_string(), |acc, pattern| {
            pattern.replace_all(&acc, NoExpand(replacement)).into_owned()
        })
    }

    /// The patterns applied, in order, by one substitution in `mode`.
    pub(crate) fn passes(&self, mode: SubstitutionMode) -> Vec<&Regex> {
        match mode {
            SubstitutionMode::Sequential => self.keywords.iter().map(|k| &k.pattern).collect(),
            SubstitutionMode::SinglePass => vec![&self.combined],
        }
    }
}

fn literal_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Config(format!("Keyword cannot be compiled: {}", e)))
}

/// Occurrences of one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordHit {
    pub keyword: String,
    pub count: usize,
}

/// Result of matching a keyword set against one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatch {
    /// One entry per keyword, in keyword order, including zero counts.
    pub hits: Vec<KeywordHit>,
    /// Sum of all per-keyword counts.
    pub total: usize,
}

impl KeywordMatch {
    /// True iff at least one keyword occurred.
    pub fn matched(&self) -> bool {
        self.total > 0
    }

    /// Keywords that occurred at least once, in keyword order.
    pub fn matched_keywords(&self) -> Vec<String> {
        self.hits
            .iter()
            .filter(|h| h.count > 0)
            .map(|h| h.keyword.clone())
            .collect()
    }
}
