//! PPTX (Office Open XML) backend for keyword scanning and rewriting.
//!
//! A .pptx file is a ZIP archive of XML parts. Slides and the layouts of the
//! first slide master are parsed into shapes, paragraphs and runs; rewritten
//! run text is spliced back into the original XML so that every other byte
//! of the package survives unchanged.

pub mod package;
mod parser;
pub mod part;
pub mod presentation;

#[cfg(test)]
mod fixtures;

pub use part::{Shape, ShapeKind, SlidePart, TextParagraph, TextRun};
pub use presentation::{PptxDeck, PptxLoader};
