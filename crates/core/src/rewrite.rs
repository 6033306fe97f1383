//! Paragraph rewriting.
//!
//! Run boundaries do not line up with keywords ("Hitachi " + "Astemo"), so a
//! paragraph is always rewritten in two phases: rebuild its logical text from
//! all fragments, then substitute against that text and write the result back
//! into the fragments.
//!
//! Writing back uses one of two policies. [`FormattingPolicy::Collapse`] puts
//! the whole new text into the first fragment and empties the rest, which
//! loses per-run formatting for the paragraph. [`FormattingPolicy::Preserve`]
//! edits each match inside the fragments it covers and leaves the other runs
//! alone.

use crate::matcher::{KeywordSet, SubstitutionMode};
use crate::model::{Fragment, Paragraph};
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What a rewrite does with each keyword occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Replace,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Replace => f.write_str("replace"),
            Action::Delete => f.write_str("delete"),
        }
    }
}

/// The caller's rewrite request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    action: Action,
    replacement: String,
}

impl Directive {
    /// Replace every occurrence with `replacement`.
    pub fn replace(replacement: impl Into<String>) -> Self {
        Self {
            action: Action::Replace,
            replacement: replacement.into(),
        }
    }

    /// Remove every occurrence.
    pub fn delete() -> Self {
        Self {
            action: Action::Delete,
            replacement: String::new(),
        }
    }

    /// Build a directive from an action selector. The text is ignored for
    /// [`Action::Delete`].
    pub fn new(action: Action, replacement: impl Into<String>) -> Self {
        match action {
            Action::Replace => Self::replace(replacement),
            Action::Delete => Self::delete(),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Text inserted for each occurrence; always empty for a delete.
    pub fn replacement(&self) -> &str {
        match self.action {
            Action::Replace => &self.replacement,
            Action::Delete => "",
        }
    }

    /// Reject a replace with blank replacement text.
    pub fn validate(&self) -> Result<()> {
        if self.action == Action::Replace && self.replacement.trim().is_empty() {
            return Err(Error::MissingReplacement);
        }
        Ok(())
    }
}

/// How rewritten text is written back into fragments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormattingPolicy {
    /// First fragment receives all text; the others are emptied.
    #[default]
    Collapse,
    /// Matches are edited inside the fragments they span.
    Preserve,
}

/// Knobs shared by every rewrite in one engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    pub substitution: SubstitutionMode,
    pub formatting: FormattingPolicy,
}

/// Rewrite one paragraph in place.
///
/// Returns whether the paragraph's logical text changed. Paragraphs with no
/// keyword occurrence are not touched at all.
pub fn rewrite_paragraph<P: Paragraph>(
    paragraph: &mut P,
    keywords: &KeywordSet,
    replacement: &str,
    options: RewriteOptions,
) -> bool {
    let before = paragraph.text();
    if !keywords.is_match(&before) {
        return false;
    }

    match options.formatting {
        FormattingPolicy::Collapse => {
            let after = keywords.substitute(&before, replacement, options.substitution);
            collapse(paragraph, after);
        }
        FormattingPolicy::Preserve => {
            for pattern in keywords.passes(options.substitution) {
                splice(paragraph, pattern, replacement);
            }
        }
    }

    paragraph.text() != before
}

fn collapse<P: Paragraph>(paragraph: &mut P, text: String) {
    if paragraph.fragments().is_empty() {
        paragraph.push_fragment(text);
        return;
    }

    if let Some((first, rest)) = paragraph.fragments_mut().split_first_mut() {
        for fragment in rest {
            fragment.set_text(String::new());
        }
        first.set_text(text);
    }
}

/// Apply one substitution pass without moving text between fragments.
///
/// Each match's replacement lands in the fragment where the match starts;
/// matched characters are cut from every fragment the match covers.
fn splice<P: Paragraph>(paragraph: &mut P, pattern: &Regex, replacement: &str) {
    let full = paragraph.text();
    let spans: Vec<(usize, usize)> = pattern
        .find_iter(&full)
        .map(|m| (m.start(), m.end()))
        .collect();
    if spans.is_empty() {
        return;
    }

    let mut rebuilt = Vec::with_capacity(paragraph.fragments().len());
    let mut fragment_start = 0;
    for fragment in paragraph.fragments() {
        let fragment_end = fragment_start + fragment.text().len();
        let mut out = String::new();
        let mut pos = fragment_start;

        for &(start, end) in &spans {
            if end <= fragment_start || start >= fragment_end {
                continue;
            }
            if start > pos {
                out.push_str(&full[pos..start]);
            }
            if start >= fragment_start {
                out.push_str(replacement);
            }
            pos = pos.max(end.min(fragment_end));
        }
        if pos < fragment_end {
            out.push_str(&full[pos..fragment_end]);
        }

        rebuilt.push(out);
        fragment_start = fragment_end;
    }

    for (fragment, text) in paragraph.fragments_mut().iter_mut().zip(rebuilt) {
        if fragment.text() != text {
            fragment.set_text(text);
        }
    }
}
