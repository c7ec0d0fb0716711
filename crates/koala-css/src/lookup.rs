//! Per-element style lookup.

use std::collections::HashMap;
use std::rc::Rc;

use koala_dom::NodeId;
use strum_macros::{Display, EnumString};

use crate::style::ComputedStyle;

/// [§ 11 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
///
/// Pseudo-elements that can carry their own computed style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PseudoType {
    /// `::before`
    Before,
    /// `::after`
    After,
    /// `::marker`
    Marker,
    /// `::first-letter`
    FirstLetter,
    /// `::first-line`
    FirstLine,
    /// [§ 2.3 The footnote call](https://www.w3.org/TR/css-gcpm-3/#footnote-call)
    FootnoteCall,
    /// [§ 2.4 The footnote marker](https://www.w3.org/TR/css-gcpm-3/#footnote-marker)
    FootnoteMarker,
}

impl PseudoType {
    /// Every pseudo-element type.
    pub const ALL: [Self; 7] = [
        Self::Before,
        Self::After,
        Self::Marker,
        Self::FirstLetter,
        Self::FirstLine,
        Self::FootnoteCall,
        Self::FootnoteMarker,
    ];
}

/// Resolved styles for elements and their pseudo-elements.
///
/// `None` for the pseudo type asks for the element's own style. A missing
/// style means the element (or pseudo-element) generates nothing.
pub trait StyleLookup {
    /// The computed style of `node`, or of one of its pseudo-elements.
    fn get(&self, node: NodeId, pseudo: Option<PseudoType>) -> Option<Rc<ComputedStyle>>;
}

/// A [`StyleLookup`] backed by a hash map.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    styles: HashMap<(NodeId, Option<PseudoType>), Rc<ComputedStyle>>,
}

impl StyleMap {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the style of an element or pseudo-element, replacing any
    /// previous one.
    pub fn insert(&mut self, node: NodeId, pseudo: Option<PseudoType>, style: ComputedStyle) {
        let _ = self.styles.insert((node, pseudo), Rc::new(style));
    }

    /// Number of stored styles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether no style is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl StyleLookup for StyleMap {
    fn get(&self, node: NodeId, pseudo: Option<PseudoType>) -> Option<Rc<ComputedStyle>> {
        self.styles.get(&(node, pseudo)).cloned()
    }
}
