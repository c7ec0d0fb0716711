//! The box record shared by every box kind.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! "Box generation is the part of the CSS visual formatting model that
//! creates boxes from the document's elements."

use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use koala_common::image::Image;
use koala_css::{ComputedStyle, Float, Overflow, Position, PseudoType};
use koala_dom::NodeId;

use crate::border::BorderGrids;
use crate::box_kind::BoxKind;
use crate::box_model::BoxDimensions;
use crate::counters::CounterTable;
use crate::error::BoxTreeError;

static NEXT_BOX_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a box, stable while the box moves around the tree.
///
/// Deferred content evaluations refer to the box they fill by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(u32);

impl BoxId {
    fn next() -> Self {
        Self(NEXT_BOX_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One node of the formatting structure.
///
/// A box owns its children. Links to other boxes (`missing_link`,
/// `footnote`) are [`BoxId`]s and only used for lookup.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct LayoutBox {
    /// Identity used by deferred content evaluation.
    pub id: BoxId,
    /// What kind of box this is.
    pub kind: BoxKind,
    /// The element that generated the box. Anonymous boxes share their
    /// parent's element.
    pub element: Option<NodeId>,
    /// `tag` or `tag::pseudo`, empty when there is no element.
    pub element_tag: String,
    /// The pseudo-element that generated the box.
    pub pseudo_type: Option<PseudoType>,
    /// Computed style, shared with the style lookup until mutated.
    pub style: Rc<ComputedStyle>,
    /// [§ 7.2 ::first-letter](https://www.w3.org/TR/css-pseudo-4/#first-letter-pseudo)
    pub first_letter_style: Option<Rc<ComputedStyle>>,
    /// [§ 7.1 ::first-line](https://www.w3.org/TR/css-pseudo-4/#first-line-pseudo)
    pub first_line_style: Option<Rc<ComputedStyle>>,
    /// Child boxes in order.
    pub children: Vec<LayoutBox>,
    /// Text of a text box.
    pub text: String,
    /// Image of a replaced box.
    pub replacement: Option<Rc<Image>>,
    /// Geometry, filled in by layout.
    pub dimensions: BoxDimensions,
    /// The block or inline-block around a table and its captions.
    pub is_table_wrapper: bool,
    /// Direct child of a flex container.
    pub is_flex_item: bool,
    /// Direct child of a grid container.
    pub is_grid_item: bool,
    /// The box of the root element.
    pub is_for_root_element: bool,
    /// [§ 2 leader()](https://www.w3.org/TR/css-gcpm-3/#leaders)
    pub is_leader: bool,
    /// A `table-header-group` row group.
    pub is_header: bool,
    /// A `table-footer-group` row group.
    pub is_footer: bool,
    /// Whitespace collapsed away at the start of the box.
    pub leading_collapsible_space: bool,
    /// The box ends with a collapsible space.
    pub trailing_collapsible_space: bool,
    /// [§ 3.1 'bookmark-label'](https://www.w3.org/TR/css-gcpm-3/#bookmark-label)
    pub bookmark_label: String,
    /// [§ 1.1 'string-set'](https://www.w3.org/TR/css-gcpm-3/#setting-named-strings-the-string-set-pro)
    ///
    /// Named strings set by this box, in declaration order.
    pub string_set: Vec<(String, String)>,
    /// Counter values seen when the box's content was first evaluated.
    pub cached_counter_values: Option<CounterTable>,
    /// The box waiting for counter values this box's content is missing.
    pub missing_link: Option<BoxId>,
    /// The footnote body called from this `::footnote-call` box.
    pub footnote: Option<BoxId>,
    /// Overflow propagated to the viewport, set on the root box.
    pub viewport_overflow: Option<Overflow>,
    /// Column groups of a table box.
    pub column_groups: Vec<LayoutBox>,
    /// Resolved borders of a table in the collapsing border model.
    pub collapsed_border_grid: Option<BorderGrids>,
    /// Columns spanned by a column or column group.
    pub span: usize,
    /// Columns spanned by a cell.
    pub colspan: usize,
    /// Rows spanned by a cell; 0 spans the rest of the row group.
    pub rowspan: usize,
    /// First grid column of a cell, column or column group.
    pub grid_x: usize,
}

impl LayoutBox {
    /// A box generated by `element` (or one of its pseudo-elements).
    #[must_use]
    pub fn new(
        kind: BoxKind,
        style: Rc<ComputedStyle>,
        element: Option<(NodeId, &str)>,
        pseudo_type: Option<PseudoType>,
        children: Vec<Self>,
    ) -> Self {
        let element_tag = match (element, pseudo_type) {
            (None, _) => String::new(),
            (Some((_, tag)), None) => tag.to_string(),
            (Some((_, tag)), Some(pseudo)) => format!("{tag}::{pseudo}"),
        };
        Self {
            id: BoxId::next(),
            kind,
            element: element.map(|(node, _)| node),
            element_tag,
            pseudo_type,
            style,
            first_letter_style: None,
            first_line_style: None,
            children,
            text: String::new(),
            replacement: None,
            dimensions: BoxDimensions::default(),
            is_table_wrapper: false,
            is_flex_item: false,
            is_grid_item: false,
            is_for_root_element: false,
            is_leader: false,
            is_header: false,
            is_footer: false,
            leading_collapsible_space: false,
            trailing_collapsible_space: false,
            bookmark_label: String::new(),
            string_set: Vec::new(),
            cached_counter_values: None,
            missing_link: None,
            footnote: None,
            viewport_overflow: None,
            column_groups: Vec::new(),
            collapsed_border_grid: None,
            span: 1,
            colspan: 1,
            rowspan: 1,
            grid_x: 0,
        }
    }

    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "The properties of anonymous boxes are inherited from the enclosing
    /// non-anonymous box."
    ///
    /// The new box shares `parent`'s element and pseudo-element.
    #[must_use]
    pub fn anonymous_from(kind: BoxKind, parent: &Self, children: Vec<Self>) -> Self {
        let mut anonymous = Self::new(
            kind,
            Rc::new(ComputedStyle::anonymous_from(&parent.style)),
            None,
            parent.pseudo_type,
            children,
        );
        anonymous.element = parent.element;
        anonymous.element_tag.clone_from(&parent.element_tag);
        anonymous
    }

    /// [§ 9.2.2.1 Anonymous inline boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous)
    ///
    /// An anonymous text run inside `parent`.
    ///
    /// # Errors
    ///
    /// Text boxes never hold empty text: an empty `text` is an
    /// [`BoxTreeError::InvariantViolation`].
    pub fn text_from(parent: &Self, text: String) -> Result<Self, BoxTreeError> {
        if text.is_empty() {
            return Err(BoxTreeError::invariant(format!(
                "empty text box in {}",
                parent.element_tag
            )));
        }
        let mut text_box = Self::anonymous_from(BoxKind::Text, parent, Vec::new());
        text_box.text = text;
        Ok(text_box)
    }

    /// An anonymous inline replaced box showing `image`.
    #[must_use]
    pub fn replaced_from(parent: &Self, image: Rc<Image>) -> Self {
        let mut replaced = Self::anonymous_from(BoxKind::InlineReplaced, parent, Vec::new());
        replaced.replacement = Some(image);
        replaced
    }

    /// A copy of this box with other children. The copy keeps the id.
    #[must_use]
    pub fn copy_with_children(&self, children: Vec<Self>) -> Self {
        let mut copy = self.clone();
        copy.children = children;
        copy
    }

    /// A copy of this box with other children and a fresh id: the part of a
    /// box that continues after a split.
    #[must_use]
    pub fn continuation(&self, children: Vec<Self>) -> Self {
        let mut copy = self.copy_with_children(children);
        copy.id = BoxId::next();
        copy
    }

    /// A deep copy of the subtree where every box gets a fresh id.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let mut copy = self.copy_with_children(self.children.iter().map(Self::duplicate).collect());
        copy.id = BoxId::next();
        copy.column_groups = self.column_groups.iter().map(Self::duplicate).collect();
        copy
    }

    /// Mutable access to the style, unsharing it first.
    pub fn style_mut(&mut self) -> &mut ComputedStyle {
        Rc::make_mut(&mut self.style)
    }

    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    ///
    /// Footnotes count as floated.
    #[must_use]
    pub fn is_floated(&self) -> bool {
        self.style.float() != Float::None
    }

    /// [§ 2.2 Creating footnotes](https://www.w3.org/TR/css-gcpm-3/#creating-footnotes)
    #[must_use]
    pub fn is_footnote(&self) -> bool {
        self.style.float() == Float::Footnote
    }

    /// [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
    #[must_use]
    pub fn is_absolutely_positioned(&self) -> bool {
        self.style.position().is_absolutely_positioned()
    }

    /// [§ 1.3 Running elements](https://www.w3.org/TR/css-gcpm-3/#running-elements)
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.style.position(), Position::Running(_))
    }

    /// [§ 9.3 Positioning schemes](https://www.w3.org/TR/CSS2/visuren.html#positioning-scheme)
    ///
    /// "An element is called out of flow if it is floated, absolutely
    /// positioned, or is the root element." Running elements and footnotes
    /// leave the flow too.
    #[must_use]
    pub fn is_in_normal_flow(&self) -> bool {
        !(self.is_floated() || self.is_absolutely_positioned() || self.is_running())
    }

    /// The box and all its descendants, in tree order.
    pub fn descendants(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// The box with `id` in this subtree.
    #[must_use]
    pub fn find(&self, id: BoxId) -> Option<&Self> {
        self.descendants().find(|candidate| candidate.id == id)
    }

    /// The box with `id` in this subtree, mutably.
    pub fn find_mut(&mut self, id: BoxId) -> Option<&mut Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Whether this is a text box with nothing but collapsible whitespace.
    #[must_use]
    pub fn is_whitespace_text(&self) -> bool {
        self.kind == BoxKind::Text
            && self
                .text
                .chars()
                .all(|c| matches!(c, ' ' | '\n' | '\t' | '\r' | '\u{c}'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(children: Vec<LayoutBox>) -> LayoutBox {
        LayoutBox::new(
            BoxKind::Block,
            Rc::new(ComputedStyle::default()),
            Some((NodeId(1), "div")),
            None,
            children,
        )
    }

    #[test]
    fn element_tag_names_the_pseudo_element() {
        let marker = LayoutBox::new(
            BoxKind::Inline,
            Rc::new(ComputedStyle::default()),
            Some((NodeId(2), "li")),
            Some(PseudoType::Marker),
            Vec::new(),
        );
        assert_eq!(marker.element_tag, "li::marker");
        let text = LayoutBox::text_from(&marker, "1. ".to_string()).unwrap();
        assert_eq!(text.element_tag, "li::marker");
        assert_eq!(text.pseudo_type, Some(PseudoType::Marker));
    }

    #[test]
    fn empty_text_is_an_invariant_violation() {
        assert!(matches!(
            LayoutBox::text_from(&block(Vec::new()), String::new()),
            Err(BoxTreeError::InvariantViolation(_))
        ));
    }

    #[test]
    fn finds_boxes_by_id_after_moves() {
        let parent = block(Vec::new());
        let leaf = LayoutBox::text_from(&parent, "x".to_string()).unwrap();
        let id = leaf.id;
        let mut root = block(vec![block(vec![leaf])]);
        root.find_mut(id).unwrap().text = "y".to_string();
        assert_eq!(root.find(id).unwrap().text, "y");
        assert_eq!(root.descendants().count(), 3);
    }

    #[test]
    fn duplicates_get_fresh_ids() {
        let parent = block(Vec::new());
        let original = block(vec![LayoutBox::text_from(&parent, "x".to_string()).unwrap()]);
        let copy = original.duplicate();
        assert_ne!(copy.id, original.id);
        assert_ne!(copy.children[0].id, original.children[0].id);
        assert_eq!(copy.children[0].text, "x");
    }
}
