//! Slide and layout XML parsing.
//!
//! Shapes are the direct children of `p:spTree`. Only a `p:sp` with its own
//! `p:txBody` carries text; its paragraphs are the `a:p` children of that
//! body and its runs are the `a:r` children of each paragraph. Fields and
//! line breaks are left alone.
//!
//! Field text (`a:fld`, e.g. slide numbers and dates) is therefore not part
//! of an element's text, so a keyword inside a field is neither detected nor
//! rewritten. Text readers that walk every `a:t` in the body, such as
//! python-pptx's `shape.text`, do see it.

use crate::package::local_name;
use crate::part::{Anchor, Shape, ShapeKind, SlidePart, TextParagraph, TextRun, TextSlot};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidescrub_core::{Error, Result};

/// Parse a slide or layout part, keeping its XML text for write-back.
pub(crate) fn parse_part(path: &str, xml: String) -> Result<SlidePart> {
    let shapes = PartParser::new(path, &xml).run()?;
    Ok(SlidePart::new(path.to_string(), xml, shapes))
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
pub(crate) fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

/// Relationship IDs listed under `list`, e.g. the `r:id` of every
/// `p:sldId` in `p:sldIdLst`, in document order.
pub(crate) fn collect_id_list(xml: &str, list: &[u8], item: &[u8]) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut in_list = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == list => in_list = true,
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == list => in_list = false,
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if in_list && local_name(e.name().as_ref()) == item =>
            {
                let id = e
                    .attributes()
                    .flatten()
                    .find(|attr| attr.key.as_ref().ends_with(b":id"))
                    .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
                if let Some(id) = id {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing id list: {}", e)));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// A shape whose closing tag has not been seen yet.
struct OpenShape {
    shape: Shape,
    /// Stack depth of the shape element.
    depth: usize,
    /// Stack depth of its `p:txBody`, while inside it.
    body_depth: Option<usize>,
    paragraph: Option<OpenParagraph>,
}

struct OpenParagraph {
    qname: String,
    depth: usize,
    insert_at: Option<usize>,
    runs: Vec<TextRun>,
    /// Stack depth of the enclosing `a:r`, while inside one.
    run_depth: Option<usize>,
    text: Option<OpenText>,
}

/// Content of an `a:t` being read.
struct OpenText {
    start: usize,
    value: String,
}

struct PartParser<'a> {
    path: &'a str,
    xml: &'a str,
    stack: Vec<Vec<u8>>,
    shapes: Vec<Shape>,
    current: Option<OpenShape>,
}

impl<'a> PartParser<'a> {
    fn new(path: &'a str, xml: &'a str) -> Self {
        Self {
            path,
            xml,
            stack: Vec::new(),
            shapes: Vec::new(),
            current: None,
        }
    }

    fn run(mut self) -> Result<Vec<Shape>> {
        let offset = if self.xml.starts_with('\u{feff}') {
            '\u{feff}'.len_utf8()
        } else {
            0
        };
        let xml = self.xml;
        let path = self.path;
        let mut reader = Reader::from_str(&xml[offset..]);
        reader.trim_text(false);

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::XmlError(format!("Error parsing {}: {}", path, e)))?;
            let end = offset + reader.buffer_position();

            match event {
                Event::Start(ref e) => {
                    self.open(e, end, false);
                    self.stack.push(local_name(e.name().as_ref()).to_vec());
                }
                Event::Empty(ref e) => self.open(e, end, true),
                Event::End(_) => {
                    self.close(end);
                    self.stack.pop();
                }
                Event::Text(ref e) => {
                    if let Some(text) = self.open_text() {
                        let value = e.unescape().map_err(|e| {
                            Error::XmlError(format!("Bad text in {}: {}", path, e))
                        })?;
                        text.value.push_str(&value);
                    }
                }
                Event::CData(ref e) => {
                    if let Some(text) = self.open_text() {
                        text.value.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if self.current.is_some() {
            return Err(Error::XmlError(format!(
                "Unexpected end of {} inside a shape",
                path
            )));
        }

        Ok(self.shapes)
    }

    /// Start of the tag that ends at `end`.
    fn tag_start(&self, end: usize) -> usize {
        self.xml[..end].rfind('<').unwrap_or(end)
    }

    fn open_text(&mut self) -> Option<&mut OpenText> {
        self.current
            .as_mut()
            .and_then(|open| open.paragraph.as_mut())
            .and_then(|paragraph| paragraph.text.as_mut())
    }

    fn open(&mut self, e: &BytesStart, end: usize, empty: bool) {
        let start = self.tag_start(end);
        let depth = self.stack.len();
        let name = e.name();
        let name = local_name(name.as_ref());

        let open = match self.current.as_mut() {
            Some(open) => open,
            None => {
                if self.stack.last().map(Vec::as_slice) != Some(b"spTree".as_slice()) {
                    return;
                }
                if let Some(kind) = ShapeKind::from_local_name(name) {
                    let shape = Shape::new(kind);
                    if empty {
                        self.shapes.push(shape);
                    } else {
                        self.current = Some(OpenShape {
                            shape,
                            depth: depth + 1,
                            body_depth: None,
                            paragraph: None,
                        });
                    }
                }
                return;
            }
        };

        if name == b"cNvPr" && open.shape.name().is_none() {
            if let Some(value) = attribute(e, b"name") {
                open.shape.set_name(value);
            }
            return;
        }

        if name == b"txBody" && depth == open.depth && open.shape.kind() == ShapeKind::Shape {
            open.shape.mark_text_body();
            if !empty {
                open.body_depth = Some(depth + 1);
            }
            return;
        }

        if name == b"p" && open.body_depth == Some(depth) {
            let qname = String::from_utf8_lossy(e.name().as_ref()).to_string();
            if empty {
                let raw = &self.xml[start..end];
                let open_tag = format!("{}>", raw.strip_suffix("/>").unwrap_or(raw).trim_end());
                open.shape.push_paragraph(TextParagraph::new(
                    qname,
                    Anchor::SelfClosing {
                        start,
                        end,
                        open_tag,
                    },
                    Vec::new(),
                ));
            } else {
                open.paragraph = Some(OpenParagraph {
                    qname,
                    depth: depth + 1,
                    insert_at: None,
                    runs: Vec::new(),
                    run_depth: None,
                    text: None,
                });
            }
            return;
        }

        let Some(paragraph) = open.paragraph.as_mut() else {
            return;
        };

        if depth == paragraph.depth {
            match name {
                b"r" if !empty => paragraph.run_depth = Some(depth + 1),
                b"endParaRPr" => {
                    paragraph.insert_at.get_or_insert(start);
                }
                _ => {}
            }
        } else if name == b"t" && paragraph.run_depth == Some(depth) {
            if empty {
                let qname = String::from_utf8_lossy(e.name().as_ref()).to_string();
                paragraph.runs.push(TextRun::parsed(
                    String::new(),
                    TextSlot::Empty { start, end, qname },
                ));
            } else {
                paragraph.text = Some(OpenText {
                    start: end,
                    value: String::new(),
                });
            }
        }
    }

    fn close(&mut self, end: usize) {
        let start = self.tag_start(end);
        let depth = self.stack.len();

        let Some(open) = self.current.as_mut() else {
            return;
        };

        if depth == open.depth {
            if let Some(open) = self.current.take() {
                self.shapes.push(open.shape);
            }
            return;
        }

        if open.body_depth == Some(depth) {
            open.body_depth = None;
            return;
        }

        let Some(paragraph) = open.paragraph.as_mut() else {
            return;
        };

        if depth == paragraph.depth {
            if let Some(paragraph) = open.paragraph.take() {
                let insert_at = paragraph.insert_at.unwrap_or(start);
                open.shape.push_paragraph(TextParagraph::new(
                    paragraph.qname,
                    Anchor::Open { insert_at },
                    paragraph.runs,
                ));
            }
        } else if paragraph.run_depth == Some(depth) {
            paragraph.run_depth = None;
        } else if paragraph.run_depth.map(|d| d + 1) == Some(depth) {
            if let Some(text) = paragraph.text.take() {
                paragraph.runs.push(TextRun::parsed(
                    text.value,
                    TextSlot::Inner {
                        start: text.start,
                        end: start,
                    },
                ));
            }
        }
    }
}

fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.to_string(),
            Err(_) => String::from_utf8_lossy(&attr.value).to_string(),
        })
}
