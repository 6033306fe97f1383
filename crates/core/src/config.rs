//! Runtime configuration.
//!
//! Loaded from a JSON file whose fields are all optional:
//!
//! ```json
//! {
//!   "default_keywords": ["Hitachi Astemo", "日立Astemo"],
//!   "default_replacement": "Astemo",
//!   "max_file_size_mb": 50,
//!   "allowed_extensions": ["pptx"],
//!   "substitution": "sequential",
//!   "formatting": "collapse"
//! }
//! ```

use crate::matcher::SubstitutionMode;
use crate::rewrite::{FormattingPolicy, RewriteOptions};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keywords used when the caller supplies none.
    pub default_keywords: Vec<String>,
    /// Replacement used when the caller supplies none.
    pub default_replacement: String,
    /// Per-document size limit in MiB. Zero disables the limit.
    pub max_file_size_mb: u64,
    /// Accepted file extensions, without the dot.
    pub allowed_extensions: Vec<String>,
    pub substitution: SubstitutionMode,
    pub formatting: FormattingPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_keywords: vec![
                "Hitachi Astemo".to_string(),
                "日立Astemo".to_string(),
                "日立アステモ".to_string(),
            ],
            default_replacement: "Astemo".to_string(),
            max_file_size_mb: 50,
            allowed_extensions: vec!["pptx".to_string()],
            substitution: SubstitutionMode::default(),
            formatting: FormattingPolicy::default(),
        }
    }
}

impl Config {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Load a configuration file, falling back to defaults.
    ///
    /// A missing file is silent; an unreadable or invalid one is logged.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Size limit in bytes, if any.
    pub fn max_file_size_bytes(&self) -> Option<usize> {
        if self.max_file_size_mb == 0 {
            return None;
        }
        usize::try_from(self.max_file_size_mb.saturating_mul(1024 * 1024)).ok()
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            substitution: self.substitution,
            formatting: self.formatting,
        }
    }

    /// Whether a file with this name should be processed.
    ///
    /// Hidden files are rejected, as are extensions outside
    /// `allowed_extensions` (compared case-insensitively).
    pub fn accepts_file_name(&self, name: &str) -> bool {
        if name.is_empty() || name.starts_with('.') {
            return false;
        }

        match name.rsplit_once('.') {
            Some((_, ext)) => self
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}
