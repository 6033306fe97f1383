//! Input discovery and output writing.

use anyhow::{Context, Result};
use slidescrub_core::{Config, RewrittenDeck};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name of the bundle written for multi-document runs.
pub const BUNDLE_NAME: &str = "modified_presentations.zip";

/// Expand the given paths into the files that should be processed.
///
/// Directories are only descended into when `recursive` is set. Hidden files
/// and files the config does not accept are skipped.
pub fn collect_files(paths: &[PathBuf], recursive: bool, config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            if recursive {
                walk_dir(path, config, &mut files)?;
            } else {
                log::info!("Skipping directory {} (use --recursive)", path.display());
            }
        } else if accepts(path, config) {
            files.push(path.clone());
        } else {
            log::info!("Skipping {}", path.display());
        }
    }

    Ok(files)
}

fn walk_dir(dir: &Path, config: &Config, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            if is_hidden(&path) {
                log::info!("Skipping hidden directory {}", path.display());
                continue;
            }
            walk_dir(&path, config, files)?;
        } else if accepts(&path, config) {
            files.push(path);
        } else {
            log::info!("Skipping {}", path.display());
        }
    }

    Ok(())
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

fn is_hidden(path: &Path) -> bool {
    file_name(path).starts_with('.')
}

fn accepts(path: &Path, config: &Config) -> bool {
    config.accepts_file_name(file_name(path))
}

/// Name a document is reported under.
pub fn display_name(path: &Path) -> String {
    match file_name(path) {
        "" => path.display().to_string(),
        name => name.to_string(),
    }
}

/// Where to write `file_name`: in `output_dir` when given, otherwise beside
/// the source document.
pub fn output_path(source: &Path, file_name: &str, output_dir: Option<&Path>) -> Result<PathBuf> {
    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(file_name)
        }
        None => match source.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        },
    };

    Ok(output_path)
}

/// Write bytes to a file.
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

/// Write every rewritten document into one ZIP archive.
pub fn write_bundle(path: &Path, decks: &[RewrittenDeck]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for deck in decks {
        writer
            .start_file(deck.file_name.clone(), options)
            .with_context(|| format!("Failed to add {} to bundle", deck.file_name))?;
        writer
            .write_all(&deck.bytes)
            .with_context(|| format!("Failed to add {} to bundle", deck.file_name))?;
    }

    writer
        .finish()
        .with_context(|| format!("Failed to finish {}", path.display()))?;
    Ok(())
}
