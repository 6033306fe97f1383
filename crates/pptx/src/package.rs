//! ZIP package access and relationship resolution.
//!
//! Every entry is held in memory in archive order so the package can be
//! written back with only the rewritten parts changed.

use quick_xml::events::Event;
use quick_xml::Reader;
use slidescrub_core::{Error, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// One archive entry.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// An Office Open XML package held in memory.
#[derive(Debug, Clone)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Read every entry of a ZIP archive.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for idx in 0..archive.len() {
            let mut file = archive
                .by_index(idx)
                .map_err(|e| Error::ZipError(format!("Failed to read entry #{}: {}", idx, e)))?;
            let name = file.name().to_string();

            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;

            entries.push(Entry {
                compression: file.compression(),
                is_dir: file.is_dir(),
                name,
                data,
            });
        }

        Ok(Self { entries })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.name == path)
    }

    /// Entry names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Raw bytes of a part.
    pub fn read_bytes(&self, path: &str) -> Result<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == path)
            .map(|e| e.data.as_slice())
            .ok_or_else(|| Error::Decode(format!("Part not found in package: {}", path)))
    }

    /// A part decoded as UTF-8 text.
    pub fn read_string(&self, path: &str) -> Result<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::Decode(format!("Part '{}' is not UTF-8: {}", path, e)))
    }

    /// Relationships declared by `part`. A part without a `.rels` file has
    /// none.
    pub fn relationships(&self, part: &str) -> Result<Vec<Relationship>> {
        let path = rels_path(part);
        if !self.contains(&path) {
            return Ok(Vec::new());
        }
        parse_relationships(&self.read_string(&path)?)
    }

    /// Write the package back out, substituting the given parts.
    ///
    /// Entries keep their order and compression method; entries not listed in
    /// `replacements` keep their original bytes.
    pub fn to_bytes(&self, replacements: &HashMap<String, String>) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let options = FileOptions::default().compression_method(writable(entry.compression));
            if entry.is_dir {
                writer
                    .add_directory(entry.name.clone(), options)
                    .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", entry.name, e)))?;
                continue;
            }

            writer
                .start_file(entry.name.clone(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", entry.name, e)))?;
            let data = match replacements.get(&entry.name) {
                Some(xml) => xml.as_bytes(),
                None => entry.data.as_slice(),
            };
            writer.write_all(data)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// Compression methods we can write; anything exotic is re-deflated.
fn writable(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path, relative to the source part unless it starts with '/'
    pub target: String,
    /// Whether the target lives outside the package
    pub external: bool,
}

impl Relationship {
    /// Whether the type URI ends in `/<kind>`, e.g. `slide` or `slideLayout`.
    pub fn is_type(&self, kind: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(kind)
    }
}

/// Parse a .rels document.
pub fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut relationships = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                    external: false,
                };

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => rel.id = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Type" => rel.rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => rel.target = String::from_utf8_lossy(&attr.value).to_string(),
                        b"TargetMode" => rel.external = attr.value.as_ref() == b"External",
                        _ => {}
                    }
                }

                relationships.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(relationships)
}

/// Location of the .rels file for a part.
pub fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that declares it.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
