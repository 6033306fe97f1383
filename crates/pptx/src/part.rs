//! Slides and slide layouts as run-partitioned text.
//!
//! A part keeps its original XML text. Parsing records where each run's
//! `a:t` content sits in that text; writing back splices the new run texts
//! into those spans, so everything else in the part (formatting, geometry,
//! unknown extensions) is emitted byte for byte.

use quick_xml::escape::escape;
use slidescrub_core::{Container, Element, Fragment, Paragraph};

/// Shape element kinds that appear directly under `p:spTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// `p:sp`, the only kind that can carry a text body.
    Shape,
    Group,
    GraphicFrame,
    Connector,
    Picture,
    ContentPart,
}

impl ShapeKind {
    pub(crate) fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"sp" => Some(Self::Shape),
            b"grpSp" => Some(Self::Group),
            b"graphicFrame" => Some(Self::GraphicFrame),
            b"cxnSp" => Some(Self::Connector),
            b"pic" => Some(Self::Picture),
            b"contentPart" => Some(Self::ContentPart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shape => "shape",
            Self::Group => "group",
            Self::GraphicFrame => "graphic frame",
            Self::Connector => "connector",
            Self::Picture => "picture",
            Self::ContentPart => "content part",
        }
    }
}

/// Byte range in the part's XML text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TextSlot {
    /// Content between `<a:t>` and `</a:t>`.
    Inner { start: usize, end: usize },
    /// A self-closing `<a:t/>`; `qname` is its qualified name.
    Empty {
        start: usize,
        end: usize,
        qname: String,
    },
}

/// Where runs appended to a paragraph are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Anchor {
    /// Before `a:endParaRPr`, or before `</a:p>` when there is none.
    Open { insert_at: usize },
    /// A self-closing `<a:p/>` spanning `start..end`, rewritten as an open
    /// element starting with `open_tag`.
    SelfClosing {
        start: usize,
        end: usize,
        open_tag: String,
    },
}

/// One `a:r` run.
#[derive(Debug, Clone)]
pub struct TextRun {
    text: String,
    original: String,
    /// `None` for runs appended after parsing.
    slot: Option<TextSlot>,
}

impl TextRun {
    pub(crate) fn parsed(text: String, slot: TextSlot) -> Self {
        Self {
            original: text.clone(),
            text,
            slot: Some(slot),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.slot.is_none() || self.text != self.original
    }
}

impl Fragment for TextRun {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

/// One `a:p` paragraph directly inside a shape's text body.
#[derive(Debug, Clone)]
pub struct TextParagraph {
    /// Qualified element name, e.g. `a:p`.
    qname: String,
    anchor: Anchor,
    runs: Vec<TextRun>,
}

impl TextParagraph {
    pub(crate) fn new(qname: String, anchor: Anchor, runs: Vec<TextRun>) -> Self {
        Self {
            qname,
            anchor,
            runs,
        }
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    fn prefix(&self) -> &str {
        match self.qname.split_once(':') {
            Some((prefix, _)) => prefix,
            None => "",
        }
    }

    fn run_markup(&self, text: &str) -> String {
        let (r, t) = match self.prefix() {
            "" => ("r".to_string(), "t".to_string()),
            prefix => (format!("{}:r", prefix), format!("{}:t", prefix)),
        };
        format!("<{r}><{t}>{}</{t}></{r}>", escape(text))
    }

    fn collect_patches(&self, patches: &mut Vec<Patch>) {
        let mut appended = String::new();

        for run in &self.runs {
            match &run.slot {
                Some(_) if run.text == run.original => {}
                Some(TextSlot::Inner { start, end }) => patches.push(Patch {
                    start: *start,
                    end: *end,
                    text: escape(&run.text).into_owned(),
                }),
                Some(TextSlot::Empty { start, end, qname }) => patches.push(Patch {
                    start: *start,
                    end: *end,
                    text: format!("<{q}>{}</{q}>", escape(&run.text), q = qname),
                }),
                None => appended.push_str(&self.run_markup(&run.text)),
            }
        }

        if appended.is_empty() {
            return;
        }

        match &self.anchor {
            Anchor::Open { insert_at } => patches.push(Patch {
                start: *insert_at,
                end: *insert_at,
                text: appended,
            }),
            Anchor::SelfClosing {
                start,
                end,
                open_tag,
            } => patches.push(Patch {
                start: *start,
                end: *end,
                text: format!("{}{}</{}>", open_tag, appended, self.qname),
            }),
        }
    }
}

impl Paragraph for TextParagraph {
    type Fragment = TextRun;

    fn fragments(&self) -> &[TextRun] {
        &self.runs
    }

    fn fragments_mut(&mut self) -> &mut [TextRun] {
        &mut self.runs
    }

    fn push_fragment(&mut self, text: String) {
        self.runs.push(TextRun {
            text,
            original: String::new(),
            slot: None,
        });
    }
}

/// A shape directly under `p:spTree`.
#[derive(Debug, Clone)]
pub struct Shape {
    kind: ShapeKind,
    name: Option<String>,
    has_text_body: bool,
    paragraphs: Vec<TextParagraph>,
}

impl Shape {
    pub(crate) fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            name: None,
            has_text_body: false,
            paragraphs: Vec::new(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// The `name` attribute of the shape's `p:cNvPr`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    pub(crate) fn mark_text_body(&mut self) {
        self.has_text_body = true;
    }

    pub(crate) fn push_paragraph(&mut self, paragraph: TextParagraph) {
        self.paragraphs.push(paragraph);
    }
}

impl Element for Shape {
    type Paragraph = TextParagraph;

    fn has_text(&self) -> bool {
        self.has_text_body
    }

    fn paragraphs(&self) -> &[TextParagraph] {
        &self.paragraphs
    }

    fn paragraphs_mut(&mut self) -> &mut [TextParagraph] {
        &mut self.paragraphs
    }
}

/// A slide or slide layout part.
#[derive(Debug, Clone)]
pub struct SlidePart {
    path: String,
    xml: String,
    shapes: Vec<Shape>,
}

/// Replace `xml[start..end]` with `text`.
#[derive(Debug)]
struct Patch {
    start: usize,
    end: usize,
    text: String,
}

impl SlidePart {
    pub(crate) fn new(path: String, xml: String, shapes: Vec<Shape>) -> Self {
        Self { path, xml, shapes }
    }

    /// Path of the part inside the package.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Whether any run text differs from what was parsed.
    pub fn is_modified(&self) -> bool {
        self.shapes
            .iter()
            .flat_map(|s| s.paragraphs.iter())
            .flat_map(|p| p.runs.iter())
            .any(TextRun::is_modified)
    }

    /// The part's XML with all run edits applied, or `None` when nothing
    /// changed.
    pub fn render(&self) -> Option<String> {
        let mut patches = Vec::new();
        for paragraph in self.shapes.iter().flat_map(|s| s.paragraphs.iter()) {
            paragraph.collect_patches(&mut patches);
        }
        if patches.is_empty() {
            return None;
        }
        patches.sort_by_key(|p| p.start);

        let mut out = String::with_capacity(self.xml.len());
        let mut cursor = 0;
        for patch in patches {
            out.push_str(&self.xml[cursor..patch.start]);
            out.push_str(&patch.text);
            cursor = patch.end;
        }
        out.push_str(&self.xml[cursor..]);

        Some(out)
    }
}

impl Container for SlidePart {
    type Element = Shape;

    fn elements(&self) -> &[Shape] {
        &self.shapes
    }

    fn elements_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }
}
