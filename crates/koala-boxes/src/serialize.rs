//! A comparable snapshot of a box tree.
//!
//! Each box becomes `{tag, kind, text}` or `{tag, kind, children}`. This is
//! the form box-tree tests compare against, and what the CLI prints as
//! JSON.

use serde::Serialize;

use crate::box_kind::BoxKind;
use crate::layout_box::LayoutBox;

/// One serialized box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializedBox {
    /// The element tag, with the pseudo-element if any (`p::before`).
    /// Anonymous boxes share the tag of the box they were created from.
    pub tag: String,
    /// The box kind.
    pub kind: BoxKind,
    /// Text or children.
    #[serde(flatten)]
    pub content: SerializedContent,
}

/// What a serialized box holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializedContent {
    /// The text of a text box, or `<replaced>` for replaced boxes.
    Text(String),
    /// The children of any other box.
    Children(Vec<SerializedBox>),
}

/// Text standing for the image of a replaced box.
pub const REPLACED_TEXT: &str = "<replaced>";

/// Serialize a list of sibling boxes.
///
/// Tables list their column groups before their row groups.
#[must_use]
pub fn serialize(boxes: &[LayoutBox]) -> Vec<SerializedBox> {
    boxes.iter().map(serialize_box).collect()
}

/// Serialize one box and its subtree.
#[must_use]
pub fn serialize_box(layout_box: &LayoutBox) -> SerializedBox {
    let content = if layout_box.kind == BoxKind::Text {
        SerializedContent::Text(layout_box.text.clone())
    } else if layout_box.kind.is_replaced() {
        SerializedContent::Text(REPLACED_TEXT.to_string())
    } else {
        SerializedContent::Children(
            layout_box
                .column_groups
                .iter()
                .chain(&layout_box.children)
                .map(serialize_box)
                .collect(),
        )
    };
    SerializedBox {
        tag: layout_box.element_tag.clone(),
        kind: layout_box.kind,
        content,
    }
}
