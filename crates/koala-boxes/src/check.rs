//! Structural sanity check of a finished box tree.

use crate::box_kind::BoxKind;
use crate::error::BoxTreeError;
use crate::layout_box::LayoutBox;

/// The kinds an in-flow child of `parent` may have, or `None` when any
/// kind goes.
fn accepts(parent: BoxKind) -> Option<fn(BoxKind) -> bool> {
    let accepts: fn(BoxKind) -> bool = match parent {
        // "A block container box either contains only block-level boxes or
        // establishes an inline formatting context and thus contains only
        // inline-level boxes", the latter wrapped in a line box.
        kind if kind.is_block_container() => |child| child.is_block_level() || child == BoxKind::Line,
        BoxKind::Line | BoxKind::Inline => BoxKind::is_inline_level,
        BoxKind::Table | BoxKind::InlineTable => BoxKind::is_proper_table_child,
        BoxKind::TableColumnGroup => |child| child == BoxKind::TableColumn,
        BoxKind::TableRowGroup => |child| child == BoxKind::TableRow,
        BoxKind::TableRow => |child| child == BoxKind::TableCell,
        _ => return None,
    };
    Some(accepts)
}

/// Check the rules the anonymous box passes establish:
///
/// - a block container holds block-level boxes or line boxes,
/// - line and inline boxes hold inline-level boxes,
/// - table internals sit in their proper parents.
///
/// Out-of-flow children are not checked against their parent. Running
/// elements are not checked at all.
///
/// # Errors
///
/// The first misplaced box, as an [`BoxTreeError::InvariantViolation`].
pub fn check_structure(layout_box: &LayoutBox) -> Result<(), BoxTreeError> {
    if !layout_box.kind.is_parent() || layout_box.is_running() {
        return Ok(());
    }
    if let Some(accepts) = accepts(layout_box.kind) {
        for child in &layout_box.children {
            if child.is_in_normal_flow() && !accepts(child.kind) {
                return Err(BoxTreeError::invariant(format!(
                    "{} box of {} inside {} box of {}",
                    child.kind, child.element_tag, layout_box.kind, layout_box.element_tag
                )));
            }
        }
    }
    layout_box
        .column_groups
        .iter()
        .chain(&layout_box.children)
        .try_for_each(check_structure)
}
