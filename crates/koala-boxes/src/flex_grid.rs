//! Flex and grid items.
//!
//! [§ 4 Flex Items](https://www.w3.org/TR/css-flexbox-1/#flex-items)
//! [§ 6.1 Grid Item Display](https://www.w3.org/TR/css-grid-2/#grid-item-display)
//!
//! "Each in-flow child of a flex container becomes a flex item, and each
//! contiguous sequence of child text runs is wrapped in an anonymous block
//! container flex item."

use std::rc::Rc;

use crate::box_kind::BoxKind;
use crate::layout_box::LayoutBox;

/// Whether a text box is empty once its spaces are ignored.
///
/// "if the entire sequence of child text runs contains only white space
/// ... it is instead not rendered".
///
/// Tabs and segment breaks only count as white space here when
/// `white-space` collapses them.
fn is_blank_text(child: &LayoutBox) -> bool {
    if child.kind != BoxKind::Text {
        return false;
    }
    let white_space = child.style.white_space();
    child.text.chars().all(|c| match c {
        ' ' => true,
        '\t' => white_space.collapses_spaces(),
        '\n' => white_space.collapses_new_lines(),
        _ => false,
    })
}

/// Apply `item_children` to every container of the subtree, bottom-up.
fn map_containers(mut layout_box: LayoutBox, item_children: fn(&LayoutBox, Vec<LayoutBox>) -> Vec<LayoutBox>) -> LayoutBox {
    if !layout_box.kind.is_parent() || layout_box.is_running() {
        return layout_box;
    }
    let children: Vec<LayoutBox> = std::mem::take(&mut layout_box.children)
        .into_iter()
        .map(|child| map_containers(child, item_children))
        .collect();
    layout_box.children = item_children(&layout_box, children);
    layout_box
}

/// Flag the flex items of every flex container in the subtree, dropping
/// blank text and wrapping inline-level children in anonymous blocks.
#[must_use]
pub fn flex_boxes(layout_box: LayoutBox) -> LayoutBox {
    map_containers(layout_box, flex_children)
}

fn flex_children(container: &LayoutBox, children: Vec<LayoutBox>) -> Vec<LayoutBox> {
    if !container.kind.is_flex_container() {
        return children;
    }
    let mut items = Vec::with_capacity(children.len());
    for mut child in children {
        if !child.is_absolutely_positioned() {
            child.is_flex_item = true;
        }
        if is_blank_text(&child) {
            continue;
        }
        if child.kind.is_inline_level() {
            let mut anonymous = LayoutBox::anonymous_from(BoxKind::Block, container, vec![child]);
            anonymous.is_flex_item = true;
            items.push(anonymous);
        } else {
            items.push(child);
        }
    }
    items
}

/// Flag the grid items of every grid container in the subtree.
///
/// An inline-level child is wrapped in an anonymous block that takes over
/// its style and its item role.
#[must_use]
pub fn grid_boxes(layout_box: LayoutBox) -> LayoutBox {
    map_containers(layout_box, grid_children)
}

fn grid_children(container: &LayoutBox, children: Vec<LayoutBox>) -> Vec<LayoutBox> {
    if !container.kind.is_grid_container() {
        return children;
    }
    let mut items = Vec::with_capacity(children.len());
    for mut child in children {
        if !child.is_absolutely_positioned() {
            child.is_grid_item = true;
        }
        if is_blank_text(&child) {
            continue;
        }
        if child.kind.is_inline_level() {
            let mut anonymous = LayoutBox::anonymous_from(BoxKind::Block, &child, Vec::new());
            anonymous.style = Rc::clone(&child.style);
            anonymous.is_grid_item = true;
            child.is_grid_item = false;
            anonymous.children = vec![child];
            items.push(anonymous);
        } else {
            items.push(child);
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use koala_css::ComputedStyle;
    use koala_dom::NodeId;

    use super::*;

    fn styled(kind: BoxKind, declarations: &[(&str, &str)], children: Vec<LayoutBox>) -> LayoutBox {
        let mut style = ComputedStyle::default();
        for (name, value) in declarations {
            style.set_property(name, value).unwrap();
        }
        LayoutBox::new(kind, Rc::new(style), Some((NodeId(1), "div")), None, children)
    }

    #[test]
    fn flex_children_become_items() {
        let container = styled(BoxKind::Flex, &[("display", "flex")], Vec::new());
        let children = vec![
            LayoutBox::text_from(&container, "  ".to_string()).unwrap(),
            LayoutBox::text_from(&container, "text".to_string()).unwrap(),
            styled(BoxKind::Block, &[("display", "block")], Vec::new()),
            styled(
                BoxKind::Block,
                &[("display", "block"), ("position", "absolute")],
                Vec::new(),
            ),
        ];
        let mut container = container;
        container.children = children;
        let container = flex_boxes(container);
        let kinds: Vec<_> = container.children.iter().map(|child| child.kind).collect();
        assert_eq!(kinds, [BoxKind::Block, BoxKind::Block, BoxKind::Block]);
        assert!(container.children[0].is_flex_item);
        assert_eq!(container.children[0].children[0].text, "text");
        assert!(container.children[1].is_flex_item);
        assert!(!container.children[2].is_flex_item);
    }

    #[test]
    fn grid_wrapper_takes_the_item_style() {
        let span = styled(BoxKind::Inline, &[("display", "inline"), ("color", "red")], Vec::new());
        let grid = flex_boxes(grid_boxes(styled(BoxKind::Grid, &[("display", "grid")], vec![span])));
        let [wrapper] = grid.children.as_slice() else {
            panic!("expected one grid item");
        };
        assert_eq!(wrapper.kind, BoxKind::Block);
        assert!(wrapper.is_grid_item);
        assert!(!wrapper.children[0].is_grid_item);
        assert!(Rc::ptr_eq(&wrapper.style, &wrapper.children[0].style));
    }

    #[test]
    fn preserved_segment_breaks_are_not_blank() {
        let grid = styled(BoxKind::Grid, &[("display", "grid")], Vec::new());
        let pre_line = styled(BoxKind::Grid, &[("display", "grid"), ("white-space", "pre-line")], Vec::new());
        assert!(is_blank_text(&LayoutBox::text_from(&grid, " \t\n ".to_string()).unwrap()));
        assert!(is_blank_text(&LayoutBox::text_from(&pre_line, " \t ".to_string()).unwrap()));
        assert!(!is_blank_text(&LayoutBox::text_from(&pre_line, " \n ".to_string()).unwrap()));

        let mut container = pre_line.clone();
        container.children = vec![
            LayoutBox::text_from(&pre_line, "\t".to_string()).unwrap(),
            LayoutBox::text_from(&pre_line, "\n".to_string()).unwrap(),
        ];
        let container = grid_boxes(container);
        assert_eq!(container.children.len(), 1);
        assert_eq!(container.children[0].children[0].text, "\n");
    }

    #[test]
    fn running_elements_are_left_alone() {
        let inner = styled(BoxKind::Flex, &[("display", "flex")], vec![styled(BoxKind::Inline, &[], Vec::new())]);
        let running = styled(BoxKind::Block, &[("position", "running(header)")], vec![inner]);
        let running = flex_boxes(running);
        assert_eq!(running.children[0].children[0].kind, BoxKind::Inline);
    }
}
