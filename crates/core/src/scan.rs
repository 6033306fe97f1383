//! Deck scanning: find every text element that contains a keyword.

use crate::matcher::KeywordSet;
use crate::model::{Container, Deck, Element};
use serde::Serialize;
use std::fmt;

/// Where a match was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerRef {
    /// 1-based slide number.
    Slide(usize),
    /// 1-based layout number within the slide master.
    MasterLayout(usize),
}

impl ContainerRef {
    pub fn is_master(&self) -> bool {
        matches!(self, ContainerRef::MasterLayout(_))
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRef::Slide(n) => write!(f, "Slide {}", n),
            ContainerRef::MasterLayout(n) => write!(f, "Master {}", n),
        }
    }
}

/// One text element containing at least one keyword.
///
/// An element with several matching paragraphs yields a single record whose
/// count covers all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    /// Source document name, filled in by the batch layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub container: ContainerRef,
    /// 0-based index of the element within its container.
    pub element: usize,
    /// The element's full logical text.
    pub text: String,
    /// Keywords that occurred, in keyword order.
    pub keywords: Vec<String>,
    /// Sum of all keywords' occurrence counts.
    pub count: usize,
    pub is_master: bool,
}

/// Records from one scan plus the problems that were skipped over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub records: Vec<MatchRecord>,
    pub warnings: Vec<String>,
}

impl ScanOutcome {
    /// Total keyword occurrences across all records.
    pub fn total_count(&self) -> usize {
        self.records.iter().map(|r| r.count).sum()
    }

    /// Number of elements with at least one occurrence.
    pub fn affected_elements(&self) -> usize {
        self.records.len()
    }
}

/// Scan every slide, then every master layout, for keyword occurrences.
///
/// A master set that cannot be traversed is logged and recorded as a
/// warning; the slide results are still returned. Layouts the deck skipped
/// are reported as warnings too.
pub fn scan<D: Deck>(deck: &D, keywords: &KeywordSet) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for (idx, slide) in deck.slides().iter().enumerate() {
        scan_container(slide, ContainerRef::Slide(idx + 1), keywords, &mut outcome.records);
    }

    match deck.master_layouts() {
        Ok(layouts) => {
            for (idx, layout) in layouts.iter().enumerate() {
                scan_container(
                    layout,
                    ContainerRef::MasterLayout(idx + 1),
                    keywords,
                    &mut outcome.records,
                );
            }
        }
        Err(e) => {
            log::warn!("Skipping master layouts while scanning: {}", e);
            outcome.warnings.push(e.to_string());
        }
    }
    outcome.warnings.extend(deck.skipped_layouts().iter().cloned());

    outcome
}

fn scan_container<C: Container>(
    container: &C,
    location: ContainerRef,
    keywords: &KeywordSet,
    records: &mut Vec<MatchRecord>,
) {
    for (idx, element) in container.elements().iter().enumerate() {
        if !element.has_text() {
            continue;
        }

        let text = element.text();
        if text.trim().is_empty() {
            continue;
        }

        let found = keywords.find(&text);
        if found.matched() {
            records.push(MatchRecord {
                file: None,
                container: location,
                element: idx,
                keywords: found.matched_keywords(),
                count: found.total,
                is_master: location.is_master(),
                text,
            });
        }
    }
}
