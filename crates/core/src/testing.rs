//! In-memory deck used by the engine's unit tests.
//!
//! Decks are written in a tiny line format:
//!
//! ```text
//! # slide
//! Hitachi |Astemo // second paragraph
//! -
//! # layout
//! *Bold run|plain run
//! ```
//!
//! `# slide` and `# layout` open a container, `# no-master` makes the master
//! layouts unreachable, `# broken-layout` stands for a layout that could not
//! be read, `-` is an element without text, `//` separates
//! paragraphs, `|` separates fragments and a leading `*` marks a fragment as
//! bold. Sources starting with `!` fail to decode.

use crate::model::{Container, Deck, DeckLoader, Element, Fragment, Paragraph};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeFragment {
    pub text: String,
    pub bold: bool,
}

impl Fragment for FakeFragment {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeParagraph {
    pub fragments: Vec<FakeFragment>,
}

impl FakeParagraph {
    pub fn from_texts(texts: &[&str]) -> Self {
        Self {
            fragments: texts
                .iter()
                .map(|t| FakeFragment {
                    text: t.to_string(),
                    bold: false,
                })
                .collect(),
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

impl Paragraph for FakeParagraph {
    type Fragment = FakeFragment;

    fn fragments(&self) -> &[FakeFragment] {
        &self.fragments
    }

    fn fragments_mut(&mut self) -> &mut [FakeFragment] {
        &mut self.fragments
    }

    fn push_fragment(&mut self, text: String) {
        self.fragments.push(FakeFragment { text, bold: false });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    pub has_text: bool,
    pub paragraphs: Vec<FakeParagraph>,
}

impl Element for FakeElement {
    type Paragraph = FakeParagraph;

    fn has_text(&self) -> bool {
        self.has_text
    }

    fn paragraphs(&self) -> &[FakeParagraph] {
        &self.paragraphs
    }

    fn paragraphs_mut(&mut self) -> &mut [FakeParagraph] {
        &mut self.paragraphs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeContainer {
    pub elements: Vec<FakeElement>,
}

impl Container for FakeContainer {
    type Element = FakeElement;

    fn elements(&self) -> &[FakeElement] {
        &self.elements
    }

    fn elements_mut(&mut self) -> &mut [FakeElement] {
        &mut self.elements
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeDeck {
    pub slides: Vec<FakeContainer>,
    pub layouts: Option<Vec<FakeContainer>>,
    pub skipped: Vec<String>,
}

impl FakeDeck {
    pub fn parse(source: &str) -> Result<Self> {
        if source.starts_with('!') {
            return Err(Error::Decode("not a fake deck".to_string()));
        }

        let mut deck = FakeDeck {
            slides: Vec::new(),
            layouts: Some(Vec::new()),
            skipped: Vec::new(),
        };
        let mut broken_master = false;
        let mut in_layouts = false;

        for line in source.lines() {
            match line {
                "" => {}
                "# slide" => {
                    in_layouts = false;
                    deck.slides.push(FakeContainer::default());
                }
                "# layout" => {
                    in_layouts = true;
                    deck.layouts
                        .get_or_insert_with(Vec::new)
                        .push(FakeContainer::default());
                }
                "# no-master" => broken_master = true,
                "# broken-layout" => {
                    let n = deck.layouts.as_ref().map_or(0, Vec::len) + deck.skipped.len() + 1;
                    deck.skipped.push(format!("layout {} could not be read", n));
                }
                element => {
                    let container = if in_layouts {
                        deck.layouts.as_mut().and_then(|l| l.last_mut())
                    } else {
                        deck.slides.last_mut()
                    }
                    .ok_or_else(|| Error::Decode(format!("element outside container: {}", element)))?;
                    container.elements.push(parse_element(element));
                }
            }
        }

        if broken_master {
            deck.layouts = None;
        }
        Ok(deck)
    }

    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for slide in &self.slides {
            out.push_str("# slide\n");
            write_container(slide, &mut out);
        }
        match &self.layouts {
            Some(layouts) => {
                for layout in layouts {
                    out.push_str("# layout\n");
                    write_container(layout, &mut out);
                }
            }
            None => out.push_str("# no-master\n"),
        }
        for _ in &self.skipped {
            out.push_str("# broken-layout\n");
        }
        out
    }

    pub fn slide_paragraph(&self, slide: usize, element: usize, paragraph: usize) -> &FakeParagraph {
        &self.slides[slide].elements[element].paragraphs[paragraph]
    }
}

fn parse_element(line: &str) -> FakeElement {
    if line == "-" {
        return FakeElement {
            has_text: false,
            paragraphs: Vec::new(),
        };
    }

    let paragraphs = line
        .split(" // ")
        .map(|p| FakeParagraph {
            fragments: p
                .split('|')
                .map(|f| match f.strip_prefix('*') {
                    Some(text) => FakeFragment {
                        text: text.to_string(),
                        bold: true,
                    },
                    None => FakeFragment {
                        text: f.to_string(),
                        bold: false,
                    },
                })
                .collect(),
        })
        .collect();

    FakeElement {
        has_text: true,
        paragraphs,
    }
}

fn write_container(container: &FakeContainer, out: &mut String) {
    for element in &container.elements {
        if !element.has_text {
            out.push_str("-\n");
            continue;
        }
        let line = element
            .paragraphs
            .iter()
            .map(|p| {
                p.fragments
                    .iter()
                    .map(|f| {
                        if f.bold {
                            format!("*{}", f.text)
                        } else {
                            f.text.clone()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join(" // ");
        out.push_str(&line);
        out.push('\n');
    }
}

impl Deck for FakeDeck {
    type Container = FakeContainer;

    fn slides(&self) -> &[FakeContainer] {
        &self.slides
    }

    fn slides_mut(&mut self) -> &mut [FakeContainer] {
        &mut self.slides
    }

    fn master_layouts(&self) -> Result<&[FakeContainer]> {
        self.layouts
            .as_deref()
            .ok_or_else(|| Error::Traversal("deck has no slide master".to_string()))
    }

    fn master_layouts_mut(&mut self) -> Result<&mut [FakeContainer]> {
        self.layouts
            .as_deref_mut()
            .ok_or_else(|| Error::Traversal("deck has no slide master".to_string()))
    }

    fn skipped_layouts(&self) -> &[String] {
        &self.skipped
    }

    fn serialize(&self) -> Result<Vec<u8>> {
        Ok(self.to_source().into_bytes())
    }
}

/// Loads [`FakeDeck`]s from UTF-8 sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeLoader;

impl DeckLoader for FakeLoader {
    type Deck = FakeDeck;

    fn open(&self, bytes: &[u8]) -> Result<FakeDeck> {
        let source = std::str::from_utf8(bytes).map_err(|e| Error::Decode(e.to_string()))?;
        FakeDeck::parse(source)
    }
}
