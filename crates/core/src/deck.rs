//! Deck-level rewriting.

use crate::matcher::KeywordSet;
use crate::model::{Container, Deck, Element};
use crate::rewrite::{rewrite_paragraph, Directive, RewriteOptions};
use serde::Serialize;

/// Result of rewriting one deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteOutcome {
    /// Elements whose logical text changed.
    pub modified_elements: usize,
    pub warnings: Vec<String>,
}

/// Rewrite every slide, then every master layout, in place.
///
/// Slide changes stay applied when the master set cannot be traversed; the
/// failure is logged and recorded as a warning.
pub fn rewrite_deck<D: Deck>(
    deck: &mut D,
    keywords: &KeywordSet,
    directive: &Directive,
    options: RewriteOptions,
) -> RewriteOutcome {
    let replacement = directive.replacement();
    let mut outcome = RewriteOutcome::default();

    for slide in deck.slides_mut() {
        outcome.modified_elements += rewrite_container(slide, keywords, replacement, options);
    }

    match deck.master_layouts_mut() {
        Ok(layouts) => {
            for layout in layouts {
                outcome.modified_elements +=
                    rewrite_container(layout, keywords, replacement, options);
            }
        }
        Err(e) => {
            log::warn!("Skipping master layouts while rewriting: {}", e);
            outcome.warnings.push(e.to_string());
        }
    }
    outcome.warnings.extend(deck.skipped_layouts().iter().cloned());

    outcome
}

fn rewrite_container<C: Container>(
    container: &mut C,
    keywords: &KeywordSet,
    replacement: &str,
    options: RewriteOptions,
) -> usize {
    let mut modified = 0;

    for element in container.elements_mut() {
        if !element.has_text() {
            continue;
        }

        let before = element.text();
        if !keywords.is_match(&before) {
            continue;
        }

        for paragraph in element.paragraphs_mut() {
            rewrite_paragraph(paragraph, keywords, replacement, options);
        }

        if element.text() != before {
            modified += 1;
        }
    }

    modified
}
