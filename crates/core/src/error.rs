//! Error types for keyword detection and rewriting.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scanning or rewriting slide decks.
#[derive(Error, Debug)]
pub enum Error {
    /// No documents were supplied to a batch operation.
    #[error("No documents were supplied")]
    NoDocuments,

    /// The keyword list is empty.
    #[error("At least one keyword is required")]
    NoKeywords,

    /// A keyword in the list is the empty string.
    #[error("Keyword #{0} is empty")]
    EmptyKeyword(usize),

    /// A replace action was requested without replacement text.
    #[error("A replacement text is required for the replace action")]
    MissingReplacement,

    /// The document bytes could not be parsed as a deck.
    #[error("Failed to decode document: {0}")]
    Decode(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for PPTX).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// The document is larger than the configured limit.
    #[error("Document is {size} bytes, which exceeds the {limit} byte limit")]
    DocumentTooLarge { size: usize, limit: usize },

    /// Master layouts or an element could not be traversed.
    #[error("Traversal error: {0}")]
    Traversal(String),

    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration file is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error stems from caller input rather than a document.
    ///
    /// Input errors are raised before any document is opened.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::NoDocuments | Error::NoKeywords | Error::EmptyKeyword(_) | Error::MissingReplacement
        )
    }

    /// The message without its category prefix, for wrapping in another error.
    pub fn detail(&self) -> String {
        match self {
            Error::Decode(m)
            | Error::ZipError(m)
            | Error::XmlError(m)
            | Error::Traversal(m)
            | Error::Config(m) => m.clone(),
            other => other.to_string(),
        }
    }
}
