//! Run-aware keyword detection, replacement and deletion for slide decks.
//!
//! The engine works on any deck exposed through the [`model`] traits: it
//! rebuilds each paragraph's text from its formatting runs, matches keywords
//! case-insensitively against that text, and writes substitutions back into
//! the runs.

pub mod batch;
pub mod config;
pub mod deck;
pub mod error;
pub mod matcher;
pub mod model;
pub mod rewrite;
pub mod scan;

#[cfg(test)]
mod testing;

pub use batch::{
    DeckInput, DetectReport, DocumentMatches, KeywordEngine, MatchStats, PreviewReport,
    RewrittenDeck,
};
pub use config::Config;
pub use deck::{rewrite_deck, RewriteOutcome};
pub use error::{Error, Result};
pub use matcher::{KeywordHit, KeywordMatch, KeywordSet, SubstitutionMode};
pub use model::{Container, Deck, DeckLoader, Element, Fragment, Paragraph};
pub use rewrite::{rewrite_paragraph, Action, Directive, FormattingPolicy, RewriteOptions};
pub use scan::{scan, ContainerRef, MatchRecord, ScanOutcome};
