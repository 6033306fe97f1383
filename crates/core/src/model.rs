//! Fragment model consumed by the scanner and rewriter.
//!
//! A deck is a list of slides plus the layouts of its slide master. Each of
//! those containers holds shapes ("elements"), a text-bearing element holds
//! paragraphs, and a paragraph is split into formatting runs ("fragments").
//! Run boundaries follow formatting, not words, so a keyword may straddle
//! several fragments.
//!
//! Format backends implement these traits over their own storage; the engine
//! only ever reads and writes fragment text.

use crate::Result;

/// A formatting-bounded span of paragraph text.
pub trait Fragment {
    /// The text carried by this fragment.
    fn text(&self) -> &str;

    /// Replace the text carried by this fragment, keeping its formatting.
    fn set_text(&mut self, text: String);
}

/// An ordered sequence of fragments.
pub trait Paragraph {
    type Fragment: Fragment;

    fn fragments(&self) -> &[Self::Fragment];

    fn fragments_mut(&mut self) -> &mut [Self::Fragment];

    /// Append a new, unformatted fragment.
    fn push_fragment(&mut self, text: String);

    /// Logical text: fragment texts concatenated with no separator.
    fn text(&self) -> String {
        self.fragments().iter().map(|f| f.text()).collect()
    }
}

/// A shape-like unit that may carry paragraphs.
pub trait Element {
    type Paragraph: Paragraph;

    /// Whether the element has a text body at all.
    fn has_text(&self) -> bool;

    fn paragraphs(&self) -> &[Self::Paragraph];

    fn paragraphs_mut(&mut self) -> &mut [Self::Paragraph];

    /// Logical text: paragraph texts joined by newlines.
    fn text(&self) -> String {
        self.paragraphs()
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A slide or a master layout.
pub trait Container {
    type Element: Element;

    fn elements(&self) -> &[Self::Element];

    fn elements_mut(&mut self) -> &mut [Self::Element];
}

/// A whole document, owned by one scan or rewrite call.
pub trait Deck {
    type Container: Container;

    /// Ordinary slides in presentation order.
    fn slides(&self) -> &[Self::Container];

    fn slides_mut(&mut self) -> &mut [Self::Container];

    /// Layouts of the slide master.
    ///
    /// Fails with [`crate::Error::Traversal`] when the master set is missing
    /// or could not be read; ordinary slides remain usable.
    fn master_layouts(&self) -> Result<&[Self::Container]>;

    fn master_layouts_mut(&mut self) -> Result<&mut [Self::Container]>;

    /// Individual layouts that were left out of [`Deck::master_layouts`]
    /// because they could not be read, one message each.
    fn skipped_layouts(&self) -> &[String] {
        &[]
    }

    /// Encode the (possibly modified) deck back into document bytes.
    fn serialize(&self) -> Result<Vec<u8>>;
}

/// Opens raw document bytes as a [`Deck`].
pub trait DeckLoader {
    type Deck: Deck;

    fn open(&self, bytes: &[u8]) -> Result<Self::Deck>;
}
