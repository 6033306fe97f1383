//! Whole-presentation loading and write-back.

use crate::package::{resolve_target, Package, Relationship};
use crate::parser::{collect_id_list, extract_slide_number, parse_part};
use crate::part::SlidePart;
use slidescrub_core::{Deck, DeckLoader, Error, Result};
use std::collections::HashMap;

/// Used when the package relationships name no main document.
const DEFAULT_MAIN_PART: &str = "ppt/presentation.xml";

/// A `.pptx` document opened for scanning and rewriting.
#[derive(Debug, Clone)]
pub struct PptxDeck {
    package: Package,
    slides: Vec<SlidePart>,
    /// Layouts of the first slide master, or why they could not be read.
    layouts: std::result::Result<Vec<SlidePart>, String>,
    /// Layouts left out because their XML could not be parsed.
    skipped_layouts: Vec<String>,
}

impl PptxDeck {
    /// Open a presentation from its ZIP bytes.
    ///
    /// Slides must all parse. A missing or unreadable slide master only
    /// makes [`Deck::master_layouts`] fail, and a layout that does not parse
    /// is left out and reported by [`Deck::skipped_layouts`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = Package::from_bytes(bytes)?;
        let main = main_part(&package)?;

        let slides = slide_paths(&package, &main)?
            .iter()
            .map(|path| load_part(&package, path))
            .collect::<Result<Vec<_>>>()?;

        let mut skipped_layouts = Vec::new();
        let layouts = match load_master_layouts(&package, &main, &mut skipped_layouts) {
            Ok(layouts) => Ok(layouts),
            Err(e) => {
                log::warn!("Slide master unavailable: {}", e);
                Err(e.detail())
            }
        };

        log::debug!(
            "Opened presentation with {} slide(s) and {} master layout(s)",
            slides.len(),
            layouts.as_ref().map(Vec::len).unwrap_or(0)
        );

        Ok(Self {
            package,
            slides,
            layouts,
            skipped_layouts,
        })
    }
}

impl Deck for PptxDeck {
    type Container = SlidePart;

    fn slides(&self) -> &[SlidePart] {
        &self.slides
    }

    fn slides_mut(&mut self) -> &mut [SlidePart] {
        &mut self.slides
    }

    fn master_layouts(&self) -> Result<&[SlidePart]> {
        self.layouts
            .as_deref()
            .map_err(|e| Error::Traversal(e.clone()))
    }

    fn master_layouts_mut(&mut self) -> Result<&mut [SlidePart]> {
        self.layouts
            .as_deref_mut()
            .map_err(|e| Error::Traversal(e.clone()))
    }

    fn skipped_layouts(&self) -> &[String] {
        &self.skipped_layouts
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        let layouts = self.layouts.as_deref().unwrap_or(&[]);

        let mut replacements = HashMap::new();
        for part in self.slides.iter().chain(layouts) {
            if let Some(xml) = part.render() {
                replacements.insert(part.path().to_string(), xml);
            }
        }

        log::debug!("Writing presentation with {} rewritten part(s)", replacements.len());
        self.package.to_bytes(&replacements)
    }
}

/// Opens `.pptx` bytes as a [`PptxDeck`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxLoader;

impl PptxLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DeckLoader for PptxLoader {
    type Deck = PptxDeck;

    fn open(&self, bytes: &[u8]) -> Result<PptxDeck> {
        PptxDeck::from_bytes(bytes)
    }
}

fn main_part(package: &Package) -> Result<String> {
    let main = package
        .relationships("")?
        .iter()
        .find(|rel| rel.is_type("officeDocument"))
        .map(|rel| resolve_target("", &rel.target))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());

    if !package.contains(&main) {
        return Err(Error::Decode(format!(
            "Not a presentation: missing {}",
            main
        )));
    }
    Ok(main)
}

fn load_part(package: &Package, path: &str) -> Result<SlidePart> {
    parse_part(path, package.read_string(path)?)
}

/// Slide part paths in presentation order.
///
/// The order comes from `p:sldIdLst`. Without one, slide relationships are
/// sorted by the number at the end of their ID or target.
fn slide_paths(package: &Package, main: &str) -> Result<Vec<String>> {
    let rels: Vec<Relationship> = package
        .relationships(main)?
        .into_iter()
        .filter(|rel| rel.is_type("slide") && !rel.external)
        .collect();
    let ids = collect_id_list(&package.read_string(main)?, b"sldIdLst", b"sldId")?;

    if !ids.is_empty() {
        let by_id: HashMap<&str, &Relationship> =
            rels.iter().map(|rel| (rel.id.as_str(), rel)).collect();
        let mut paths = Vec::with_capacity(ids.len());
        for id in &ids {
            match by_id.get(id.as_str()) {
                Some(rel) => paths.push(resolve_target(main, &rel.target)),
                None => log::warn!("Slide {} has no relationship in {}", id, main),
            }
        }
        return Ok(paths);
    }

    let mut slides: Vec<(String, Option<usize>)> = rels
        .iter()
        .map(|rel| {
            let order_num = extract_slide_number(&rel.id).or_else(|| extract_slide_number(&rel.target));
            (resolve_target(main, &rel.target), order_num)
        })
        .collect();

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    Ok(slides.into_iter().map(|(path, _)| path).collect())
}

/// Relationship targets of `kind`, ordered by the ID list when there is
/// one and by relationship order otherwise.
fn ordered_targets(rels: &[Relationship], kind: &str, ids: &[String], source: &str) -> Vec<String> {
    let of_kind = rels.iter().filter(|rel| rel.is_type(kind) && !rel.external);

    if ids.is_empty() {
        return of_kind.map(|rel| resolve_target(source, &rel.target)).collect();
    }

    let by_id: HashMap<&str, &Relationship> = of_kind.map(|rel| (rel.id.as_str(), rel)).collect();
    ids.iter()
        .filter_map(|id| by_id.get(id.as_str()))
        .map(|rel| resolve_target(source, &rel.target))
        .collect()
}

/// Layouts of the first slide master.
///
/// A layout that cannot be parsed is logged, described in `skipped` and left
/// untouched in the package.
fn load_master_layouts(
    package: &Package,
    main: &str,
    skipped: &mut Vec<String>,
) -> Result<Vec<SlidePart>> {
    let rels = package.relationships(main)?;
    let master_ids = collect_id_list(
        &package.read_string(main)?,
        b"sldMasterIdLst",
        b"sldMasterId",
    )?;
    let master = ordered_targets(&rels, "slideMaster", &master_ids, main)
        .into_iter()
        .next()
        .ok_or_else(|| Error::Traversal("presentation has no slide master".to_string()))?;

    let master_rels = package.relationships(&master)?;
    let layout_ids = collect_id_list(
        &package.read_string(&master)?,
        b"sldLayoutIdLst",
        b"sldLayoutId",
    )?;

    let mut layouts = Vec::new();
    for path in ordered_targets(&master_rels, "slideLayout", &layout_ids, &master) {
        match load_part(package, &path) {
            Ok(layout) => layouts.push(layout),
            Err(e) => {
                log::warn!("Skipping layout {}: {}", path, e);
                skipped.push(format!("Layout {} skipped: {}", path, e.detail()));
            }
        }
    }
    Ok(layouts)
}
