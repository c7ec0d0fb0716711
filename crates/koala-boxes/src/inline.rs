//! Line boxes and blocks inside inlines.
//!
//! [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
//!
//! "if a block container box has a block-level box inside it, then we force
//! it to have only block-level boxes inside it." Two passes enforce this:
//! [`inline_in_block`] wraps runs of inline-level children in line boxes,
//! then [`block_in_inline`] splits the inline boxes that still contain
//! block-level boxes.

use std::mem;

use crate::box_kind::BoxKind;
use crate::error::BoxTreeError;
use crate::layout_box::LayoutBox;

/// Wrap consecutive inline-level children of every block container in a
/// line box. The line box gets an anonymous block of its own unless it is
/// the only child.
///
/// ```text
/// Block[Text["Some "], Inline[Text["text"]], Block[Text["More text"]]]
/// ```
///
/// becomes
///
/// ```text
/// Block[
///     Block[Line[Text["Some "], Inline[Text["text"]]]],
///     Block[Line[Text["More text"]]],
/// ]
/// ```
///
/// Text boxes emptied by white space processing are removed here; the
/// spaces they held are remembered on their neighbours as break
/// opportunities.
///
/// # Errors
///
/// A line box in the input is an [`BoxTreeError::InvariantViolation`].
pub fn inline_in_block(mut layout_box: LayoutBox) -> Result<LayoutBox, BoxTreeError> {
    if layout_box.children.is_empty() || layout_box.is_running() {
        return Ok(layout_box);
    }
    if !layout_box.leading_collapsible_space {
        layout_box.leading_collapsible_space = layout_box.children[0].leading_collapsible_space;
    }

    // STEP 1: Recurse, dropping empty text.
    let mut children = Vec::with_capacity(layout_box.children.len());
    let mut trailing_collapsible_space = false;
    for mut child in mem::take(&mut layout_box.children) {
        if trailing_collapsible_space {
            child.leading_collapsible_space = true;
        }
        if child.kind == BoxKind::Text && child.text.is_empty() {
            trailing_collapsible_space = child.leading_collapsible_space;
        } else {
            trailing_collapsible_space = false;
            children.push(inline_in_block(child)?);
        }
    }
    if !layout_box.trailing_collapsible_space {
        layout_box.trailing_collapsible_space = trailing_collapsible_space;
    }

    if !layout_box.kind.is_block_container() {
        layout_box.children = children;
        return Ok(layout_box);
    }

    // STEP 2: Group the inline-level runs.
    let mut line_children = Vec::new();
    let mut new_children = Vec::with_capacity(children.len());
    for child in children {
        if child.kind == BoxKind::Line {
            return Err(BoxTreeError::invariant(format!(
                "line box in {} before lines are built",
                layout_box.element_tag
            )));
        }
        if !line_children.is_empty() && child.is_absolutely_positioned() {
            line_children.push(child);
        } else if child.kind.is_inline_level() || (!line_children.is_empty() && !child.is_in_normal_flow()) {
            // A collapsed space at the start of a line would be removed by
            // layout anyway.
            let collapsible_space = child.kind == BoxKind::Text
                && child.text == " "
                && child.style.white_space().collapses_spaces();
            if !line_children.is_empty() || !collapsible_space {
                line_children.push(child);
            }
        } else {
            if !line_children.is_empty() {
                let line = LayoutBox::anonymous_from(BoxKind::Line, &layout_box, mem::take(&mut line_children));
                new_children.push(LayoutBox::anonymous_from(BoxKind::Block, &layout_box, vec![line]));
            }
            new_children.push(child);
        }
    }
    if !line_children.is_empty() {
        let line = LayoutBox::anonymous_from(BoxKind::Line, &layout_box, line_children);
        if new_children.is_empty() {
            new_children.push(line);
        } else {
            new_children.push(LayoutBox::anonymous_from(BoxKind::Block, &layout_box, vec![line]));
        }
    }
    layout_box.children = new_children;
    Ok(layout_box)
}

/// Split the line boxes that contain in-flow block-level boxes, at any
/// depth of inline nesting.
///
/// ```text
/// Block[Line[Inline[Text["Some "], Block[Line[Text["More"]]], Text[" text"]]]]
/// ```
///
/// becomes
///
/// ```text
/// Block[
///     Block[Line[Inline[Text["Some "]]]],
///     Block[Line[Text["More"]]],
///     Block[Line[Inline[Text[" text"]]]],
/// ]
/// ```
///
/// The inline boxes on each side keep their style; the parts after a block
/// are continuations with new ids. Empty parts are kept, even between two
/// consecutive blocks.
///
/// # Errors
///
/// A line box with siblings, or a resume path that does not lead through
/// inline boxes, is an [`BoxTreeError::InvariantViolation`].
pub fn block_in_inline(mut layout_box: LayoutBox) -> Result<LayoutBox, BoxTreeError> {
    if layout_box.children.is_empty() || layout_box.is_running() {
        return Ok(layout_box);
    }
    let count = layout_box.children.len();
    let mut new_children = Vec::with_capacity(count);
    for child in mem::take(&mut layout_box.children) {
        if child.kind != BoxKind::Line {
            // Not in an inline formatting context.
            new_children.push(block_in_inline(child)?);
            continue;
        }
        if count != 1 {
            return Err(BoxTreeError::invariant(format!(
                "line box in {} has siblings",
                layout_box.element_tag
            )));
        }

        // Walk the same line again after each block, until no block is left.
        let mut resume_at = Vec::new();
        let new_line = loop {
            let (new_line, block, next) = inner_block_in_inline(&child, &resume_at)?;
            let (Some(block), Some(next)) = (block, next) else {
                break new_line;
            };
            new_children.push(LayoutBox::anonymous_from(BoxKind::Block, &layout_box, vec![new_line]));
            new_children.push(block_in_inline(block)?);
            resume_at = next;
        };
        if new_children.is_empty() {
            // Keep the single line box, without anonymous blocks.
            new_children.push(new_line);
        } else {
            new_children.push(LayoutBox::anonymous_from(BoxKind::Block, &layout_box, vec![new_line]));
        }
    }
    layout_box.children = new_children;
    Ok(layout_box)
}

/// Find the next in-flow block-level box in an inline formatting context.
///
/// `skip` is a path of child indices, one per inline nesting level, where
/// the walk starts; an empty path starts at the beginning. Returns the
/// content of `parent` between that position and the block, the block
/// itself, and the path just after the block. Without a block, only the
/// remaining content is returned.
///
/// The part at the start of `parent` keeps its identity, later parts are
/// continuations.
///
/// # Errors
///
/// A path that runs past the children, or descends into a box other than
/// an inline box, is an [`BoxTreeError::InvariantViolation`].
#[allow(clippy::type_complexity)]
fn inner_block_in_inline(
    parent: &LayoutBox,
    skip: &[usize],
) -> Result<(LayoutBox, Option<LayoutBox>, Option<Vec<usize>>), BoxTreeError> {
    let (start, mut nested_skip) = match skip.split_first() {
        Some((&start, rest)) => (start, rest),
        None => (0, &[][..]),
    };
    let remaining = parent.children.get(start..).ok_or_else(|| {
        BoxTreeError::invariant(format!("resume index {start} past the children of {}", parent.element_tag))
    })?;

    let mut new_children = Vec::with_capacity(remaining.len());
    for (offset, child) in remaining.iter().enumerate() {
        let index = start + offset;
        if child.kind.is_block_level() && child.is_in_normal_flow() {
            if !nested_skip.is_empty() {
                return Err(skip_misuse(child));
            }
            // Resume after the block.
            let part = inline_part(parent, new_children, skip.is_empty());
            return Ok((part, Some(child.clone()), Some(vec![index + 1])));
        }
        if child.kind == BoxKind::Inline {
            let (new_child, block, resume_at) = inner_block_in_inline(child, nested_skip)?;
            nested_skip = &[];
            new_children.push(new_child);
            if let (Some(block), Some(resume_at)) = (block, resume_at) {
                let mut path = Vec::with_capacity(resume_at.len() + 1);
                path.push(index);
                path.extend(resume_at);
                let part = inline_part(parent, new_children, skip.is_empty());
                return Ok((part, Some(block), Some(path)));
            }
        } else {
            if !nested_skip.is_empty() {
                return Err(skip_misuse(child));
            }
            new_children.push(block_in_inline(child.clone())?);
        }
    }
    Ok((inline_part(parent, new_children, skip.is_empty()), None, None))
}

fn skip_misuse(child: &LayoutBox) -> BoxTreeError {
    BoxTreeError::invariant(format!(
        "resume path descends into {} box {}",
        child.kind, child.element_tag
    ))
}

/// The first part keeps the identity of the split box.
fn inline_part(parent: &LayoutBox, children: Vec<LayoutBox>, first: bool) -> LayoutBox {
    if first {
        parent.copy_with_children(children)
    } else {
        parent.continuation(children)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use koala_css::ComputedStyle;
    use koala_dom::NodeId;

    use super::*;

    fn element(kind: BoxKind, tag: &str, children: Vec<LayoutBox>) -> LayoutBox {
        let display = if kind == BoxKind::Inline { "inline" } else { "block" };
        let mut style = ComputedStyle::default();
        style.set_property("display", display).unwrap();
        LayoutBox::new(kind, Rc::new(style), Some((NodeId(1), tag)), None, children)
    }

    fn text(value: &str) -> LayoutBox {
        let parent = element(BoxKind::Block, "p", Vec::new());
        let mut text = LayoutBox::anonymous_from(BoxKind::Text, &parent, Vec::new());
        text.text = value.to_string();
        text
    }

    /// `Kind[child, ...]` with text content quoted.
    fn shape(layout_box: &LayoutBox) -> String {
        if layout_box.kind == BoxKind::Text {
            return format!("{:?}", layout_box.text);
        }
        let children: Vec<String> = layout_box.children.iter().map(shape).collect();
        format!("{}[{}]", layout_box.kind, children.join(", "))
    }

    #[test]
    fn inline_runs_get_line_boxes() {
        let block = element(
            BoxKind::Block,
            "div",
            vec![
                text("Some "),
                element(BoxKind::Inline, "em", vec![text("text")]),
                element(BoxKind::Block, "p", vec![text("More text")]),
            ],
        );
        let block = inline_in_block(block).unwrap();
        assert_eq!(
            shape(&block),
            "Block[Block[Line[\"Some \", Inline[\"text\"]]], Block[Line[\"More text\"]]]"
        );
    }

    #[test]
    fn empty_text_is_dropped_and_remembered() {
        let mut emptied = text("");
        emptied.leading_collapsible_space = true;
        let block = element(BoxKind::Block, "p", vec![text(" "), emptied, text("a")]);
        let block = inline_in_block(block).unwrap();
        assert_eq!(shape(&block), "Block[Line[\"a\"]]");
        assert!(block.children[0].children[0].leading_collapsible_space);
        assert!(!block.trailing_collapsible_space);
    }

    #[test]
    fn blocks_split_nested_inlines() {
        let outer = element(
            BoxKind::Inline,
            "span",
            vec![
                text("Some "),
                element(
                    BoxKind::Inline,
                    "em",
                    vec![
                        text("text"),
                        element(BoxKind::Block, "div", vec![text("More text")]),
                        element(BoxKind::Block, "div", vec![text("More text again")]),
                    ],
                ),
                element(BoxKind::Block, "div", vec![text("And again.")]),
            ],
        );
        let outer_id = outer.id;
        let block = element(BoxKind::Block, "body", vec![element(BoxKind::Inline, "b", vec![text("Hello.")]), outer]);
        let block = block_in_inline(inline_in_block(block).unwrap()).unwrap();
        assert_eq!(
            shape(&block),
            concat!(
                "Block[",
                "Block[Line[Inline[\"Hello.\"], Inline[\"Some \", Inline[\"text\"]]]], ",
                "Block[Line[\"More text\"]], ",
                "Block[Line[Inline[Inline[]]]], ",
                "Block[Line[\"More text again\"]], ",
                "Block[Line[Inline[Inline[]]]], ",
                "Block[Line[\"And again.\"]], ",
                "Block[Line[Inline[]]]",
                "]"
            )
        );
        let first_part = &block.children[0].children[0].children[1];
        assert_eq!(first_part.id, outer_id);
        let continuation = &block.children[6].children[0].children[0];
        assert_ne!(continuation.id, outer_id);
        assert_eq!(continuation.element_tag, "span");
    }

    #[test]
    fn resume_path_points_after_each_block() {
        let em = element(
            BoxKind::Inline,
            "em",
            vec![text("a"), element(BoxKind::Block, "div", vec![text("b")]), text("c")],
        );
        let line = LayoutBox::anonymous_from(BoxKind::Line, &em, vec![text("x"), em.clone()]);

        let (before, block, resume_at) = inner_block_in_inline(&line, &[]).unwrap();
        assert_eq!(shape(&before), "Line[\"x\", Inline[\"a\"]]");
        assert_eq!(before.id, line.id);
        assert_eq!(shape(&block.unwrap()), "Block[\"b\"]");
        let resume_at = resume_at.unwrap();
        assert_eq!(resume_at, [1, 2]);

        let (after, block, resume_at) = inner_block_in_inline(&line, &resume_at).unwrap();
        assert_eq!(shape(&after), "Line[Inline[\"c\"]]");
        assert_ne!(after.id, line.id);
        assert!(block.is_none());
        assert!(resume_at.is_none());
    }

    #[test]
    fn resume_path_through_text_is_an_error() {
        let line = LayoutBox::anonymous_from(BoxKind::Line, &text("x"), vec![text("x")]);
        assert!(matches!(
            inner_block_in_inline(&line, &[0, 1]),
            Err(BoxTreeError::InvariantViolation(_))
        ));
        assert!(matches!(
            inner_block_in_inline(&line, &[2]),
            Err(BoxTreeError::InvariantViolation(_))
        ));
    }

    #[test]
    fn line_box_without_blocks_is_kept() {
        let block = element(BoxKind::Block, "p", vec![element(BoxKind::Inline, "em", vec![text("a")])]);
        let block = block_in_inline(inline_in_block(block).unwrap()).unwrap();
        assert_eq!(shape(&block), "Block[Line[Inline[\"a\"]]]");
    }
}
