//! Batch operations over one or more documents.
//!
//! Documents are processed one after another. When a batch holds more than
//! one document, a document that fails to open or rewrite is logged and left
//! out of the result; a single-document call returns the failure instead.

use crate::config::Config;
use crate::deck::rewrite_deck;
use crate::matcher::KeywordSet;
use crate::model::{Deck, DeckLoader};
use crate::rewrite::{Action, Directive, RewriteOptions};
use crate::scan::{scan, MatchRecord, ScanOutcome};
use crate::{Error, Result};
use serde::Serialize;

/// Raw bytes of one document plus the name it is reported under.
#[derive(Debug, Clone)]
pub struct DeckInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl DeckInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Matches found in one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMatches {
    pub name: String,
    pub total_count: usize,
    pub records: Vec<MatchRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Aggregate result of [`KeywordEngine::detect`].
#[derive(Debug, Clone, Serialize)]
pub struct DetectReport {
    pub keywords: Vec<String>,
    pub total_count: usize,
    pub affected_elements: usize,
    pub documents_processed: usize,
    pub documents: Vec<DocumentMatches>,
}

/// Occurrence totals at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub count: usize,
    pub affected_elements: usize,
}

impl MatchStats {
    fn of(outcome: &ScanOutcome) -> Self {
        Self {
            count: outcome.total_count(),
            affected_elements: outcome.affected_elements(),
        }
    }

    fn add(&mut self, other: MatchStats) {
        self.count += other.count;
        self.affected_elements += other.affected_elements;
    }
}

/// Aggregate result of [`KeywordEngine::preview`].
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    pub action: Action,
    pub before: MatchStats,
    pub after: MatchStats,
    pub modified_elements: usize,
    pub documents_processed: usize,
}

/// One rewritten document.
#[derive(Debug, Clone)]
pub struct RewrittenDeck {
    pub source_name: String,
    /// Suggested output name, `modified_<source_name>`.
    pub file_name: String,
    pub modified_elements: usize,
    pub bytes: Vec<u8>,
}

/// Runs detection and rewriting over batches of documents.
#[derive(Debug, Clone)]
pub struct KeywordEngine<L> {
    loader: L,
    options: RewriteOptions,
    max_document_bytes: Option<usize>,
}

impl<L: DeckLoader> KeywordEngine<L> {
    /// Create an engine with default options and no size limit.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            options: RewriteOptions::default(),
            max_document_bytes: None,
        }
    }

    /// Create an engine using the rewrite options and size limit of `config`.
    pub fn with_config(loader: L, config: &Config) -> Self {
        Self {
            loader,
            options: config.rewrite_options(),
            max_document_bytes: config.max_file_size_bytes(),
        }
    }

    pub fn with_options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_document_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_document_bytes = limit;
        self
    }

    pub fn options(&self) -> RewriteOptions {
        self.options
    }

    /// Find keyword occurrences without modifying anything.
    pub fn detect(&self, inputs: &[DeckInput], keywords: &KeywordSet) -> Result<DetectReport> {
        ensure_documents(inputs)?;

        let documents = self.each_document(inputs, |input| {
            let deck = self.open(input)?;
            let outcome = scan(&deck, keywords);
            let total_count = outcome.total_count();
            let records = outcome
                .records
                .into_iter()
                .map(|record| MatchRecord {
                    file: Some(input.name.clone()),
                    ..record
                })
                .collect();

            Ok(DocumentMatches {
                name: input.name.clone(),
                total_count,
                records,
                warnings: outcome.warnings,
            })
        })?;

        Ok(DetectReport {
            keywords: keywords.keywords().map(str::to_string).collect(),
            total_count: documents.iter().map(|d| d.total_count).sum(),
            affected_elements: documents.iter().map(|d| d.records.len()).sum(),
            documents_processed: documents.len(),
            documents,
        })
    }

    /// Rewrite every document and return the re-encoded bytes.
    pub fn replace_or_delete(
        &self,
        inputs: &[DeckInput],
        keywords: &KeywordSet,
        directive: &Directive,
    ) -> Result<Vec<RewrittenDeck>> {
        ensure_documents(inputs)?;
        directive.validate()?;

        self.each_document(inputs, |input| {
            let mut deck = self.open(input)?;
            let outcome = rewrite_deck(&mut deck, keywords, directive, self.options);
            let bytes = deck.serialize()?;
            log::debug!(
                "{}: {} element(s) modified",
                input.name,
                outcome.modified_elements
            );

            Ok(RewrittenDeck {
                source_name: input.name.clone(),
                file_name: format!("modified_{}", input.name),
                modified_elements: outcome.modified_elements,
                bytes,
            })
        })
    }

    /// Report occurrence totals before and after a rewrite.
    ///
    /// The rewritten documents are discarded.
    pub fn preview(
        &self,
        inputs: &[DeckInput],
        keywords: &KeywordSet,
        directive: &Directive,
    ) -> Result<PreviewReport> {
        ensure_documents(inputs)?;
        directive.validate()?;

        let per_document = self.each_document(inputs, |input| {
            let mut deck = self.open(input)?;
            let before = MatchStats::of(&scan(&deck, keywords));
            let outcome = rewrite_deck(&mut deck, keywords, directive, self.options);
            let after = MatchStats::of(&scan(&deck, keywords));
            Ok((before, after, outcome.modified_elements))
        })?;

        let mut report = PreviewReport {
            action: directive.action(),
            before: MatchStats::default(),
            after: MatchStats::default(),
            modified_elements: 0,
            documents_processed: per_document.len(),
        };
        for (before, after, modified) in per_document {
            report.before.add(before);
            report.after.add(after);
            report.modified_elements += modified;
        }

        Ok(report)
    }

    fn open(&self, input: &DeckInput) -> Result<L::Deck> {
        if let Some(limit) = self.max_document_bytes {
            if input.bytes.len() > limit {
                return Err(Error::DocumentTooLarge {
                    size: input.bytes.len(),
                    limit,
                });
            }
        }
        self.loader.open(&input.bytes)
    }

    fn each_document<T, F>(&self, inputs: &[DeckInput], mut process: F) -> Result<Vec<T>>
    where
        F: FnMut(&DeckInput) -> Result<T>,
    {
        let isolate = inputs.len() > 1;
        let mut results = Vec::with_capacity(inputs.len());

        for input in inputs {
            log::debug!("Processing {}", input.name);
            match process(input) {
                Ok(result) => results.push(result),
                Err(e) if isolate => log::warn!("Skipping {}: {}", input.name, e),
                Err(e) => return Err(e),
            }
        }

        Ok(results)
    }
}

fn ensure_documents(inputs: &[DeckInput]) -> Result<()> {
    if inputs.is_empty() {
        return Err(Error::NoDocuments);
    }
    Ok(())
}
