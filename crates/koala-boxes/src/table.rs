//! Anonymous table objects and the table grid.
//!
//! [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
//!
//! "Document languages other than HTML may not contain all the elements in
//! the CSS 2.1 table model. In these cases, the 'missing' elements must be
//! assumed in order for the table model to work."
//!
//! Every table ends up in an anonymous wrapper box together with its
//! captions, with its rows grouped, its columns grouped and every cell
//! placed on the grid.

use std::collections::HashSet;

use koala_css::{BorderCollapse, CaptionSide, DisplayValue, InternalDisplayType};

use crate::border::collapse_table_borders;
use crate::box_kind::BoxKind;
use crate::layout_box::LayoutBox;

/// Fix up the table structure of a subtree.
///
/// Running elements keep their content untouched, and so do table
/// wrappers, whose content is already fixed up.
#[must_use]
pub fn anonymous_table_boxes(mut layout_box: LayoutBox) -> LayoutBox {
    if !layout_box.kind.is_parent() || layout_box.is_running() || layout_box.is_table_wrapper {
        return layout_box;
    }
    let children = std::mem::take(&mut layout_box.children)
        .into_iter()
        .map(anonymous_table_boxes)
        .collect();
    table_boxes_children(layout_box, children)
}

/// Apply the anonymous table object rules to already processed `children`
/// and give them back to `layout_box`. Tables come back in their wrapper.
fn table_boxes_children(mut layout_box: LayoutBox, mut children: Vec<LayoutBox>) -> LayoutBox {
    // STEP 1: Remove irrelevant boxes.
    match layout_box.kind {
        // "1.1 All child boxes of a 'table-column' parent are treated as if
        // they had 'display: none'."
        BoxKind::TableColumn => children.clear(),
        // "1.2 If a child C of a 'table-column-group' parent is not a
        // 'table-column' box, then it is treated as if it had
        // 'display: none'."
        BoxKind::TableColumnGroup => {
            children.retain(|child| child.kind == BoxKind::TableColumn);
            // Column groups have at least one column.
            if children.is_empty() {
                children = (0..layout_box.span.max(1))
                    .map(|_| LayoutBox::anonymous_from(BoxKind::TableColumn, &layout_box, Vec::new()))
                    .collect();
            }
        }
        _ => {}
    }

    // "1.3 If a child C of a tabular container P is an anonymous inline box
    // that contains only white space, and its immediately preceding and
    // following siblings, if any, are proper table descendants of P and are
    // either 'table-caption' or internal table boxes, then it is treated as
    // if it had 'display: none'."
    if layout_box.kind.is_tabular_container() && children.len() >= 2 {
        let last = children.len() - 1;
        if children[last].is_whitespace_text() && children[last - 1].kind.is_internal_table_or_caption() {
            let _ = children.pop();
        }
        if children.len() >= 2
            && children[0].is_whitespace_text()
            && children[1].kind.is_internal_table_or_caption()
        {
            let _ = children.remove(0);
        }
    }

    // "1.4 If a box B is an anonymous inline containing only white space,
    // and is between two immediate siblings each of which is a
    // 'table-caption' or internal table box, then B is treated as if it had
    // 'display: none'."
    let internal = |index: Option<usize>, children: &[LayoutBox]| {
        index
            .and_then(|index| children.get(index))
            .is_some_and(|sibling| sibling.kind.is_internal_table_or_caption())
    };
    let removed: Vec<bool> = (0..children.len())
        .map(|index| {
            children[index].is_whitespace_text()
                && internal(index.checked_sub(1), &children)
                && internal(Some(index + 1), &children)
        })
        .collect();
    let mut removed = removed.into_iter();
    children.retain(|_| !removed.next().unwrap_or(false));

    // STEP 2: Generate missing child wrappers.
    let kind = layout_box.kind;
    if kind.is_table() {
        // "2.1 An anonymous 'table-row' box must be generated around each
        // sequence of consecutive children of a 'table' or 'inline-table'
        // box which are not proper table child boxes."
        children = wrap_improper(&layout_box, children, BoxKind::TableRow, |child| {
            child.kind.is_proper_table_child()
        });
    } else if kind == BoxKind::TableRowGroup {
        // "2.2 An anonymous 'table-row' box must be generated around each
        // sequence of consecutive children of a row group box which are not
        // 'table-row' boxes."
        children = wrap_improper(&layout_box, children, BoxKind::TableRow, |child| {
            child.kind == BoxKind::TableRow
        });
    }
    if kind == BoxKind::TableRow {
        // "2.3 An anonymous 'table-cell' box must be generated around each
        // sequence of consecutive children of a 'table-row' box which are
        // not 'table-cell' boxes."
        children = wrap_improper(&layout_box, children, BoxKind::TableCell, |child| {
            child.kind == BoxKind::TableCell
        });
    } else {
        // STEP 3: Generate missing parents.
        //
        // "3.1 An anonymous 'table-row' box must be generated around each
        // sequence of consecutive 'table-cell' boxes whose parent is not a
        // 'table-row'."
        children = wrap_improper(&layout_box, children, BoxKind::TableRow, |child| {
            child.kind != BoxKind::TableCell
        });
    }

    // "3.2 An anonymous 'table' or 'inline-table' box must be generated
    // around each sequence of consecutive proper table child boxes which
    // are misparented. If the box's parent is an 'inline' box, then an
    // 'inline-table' box must be generated; otherwise it must be a 'table'
    // box."
    children = if kind == BoxKind::Inline {
        wrap_improper(&layout_box, children, BoxKind::InlineTable, |child| {
            !child.kind.is_proper_table_child()
        })
    } else {
        wrap_improper(&layout_box, children, BoxKind::Table, |child| {
            !child.kind.is_proper_table_child() || kind.is_proper_parent_of(child.kind)
        })
    };

    if kind.is_table() {
        return wrap_table(layout_box, children);
    }
    layout_box.children = children;
    layout_box
}

/// Wrap each run of consecutive children failing `test` in an anonymous
/// box of `wrapper_kind`, itself fixed up by the same rules.
///
/// Flex containers drop the failing children instead.
fn wrap_improper(
    parent: &LayoutBox,
    children: Vec<LayoutBox>,
    wrapper_kind: BoxKind,
    test: impl Fn(&LayoutBox) -> bool,
) -> Vec<LayoutBox> {
    let drop_improper = parent.kind.is_flex_container();
    let mut wrapped = Vec::with_capacity(children.len());
    let mut improper = Vec::new();
    let flush = |improper: &mut Vec<LayoutBox>, wrapped: &mut Vec<LayoutBox>| {
        if !improper.is_empty() {
            let wrapper = LayoutBox::anonymous_from(wrapper_kind, parent, Vec::new());
            wrapped.push(table_boxes_children(wrapper, std::mem::take(improper)));
        }
    };
    for child in children {
        if test(&child) {
            flush(&mut improper, &mut wrapped);
            wrapped.push(child);
        } else if !drop_improper {
            improper.push(child);
        }
    }
    flush(&mut improper, &mut wrapped);
    wrapped
}

/// [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
///
/// Put the table in its wrapper box with the captions, group and reorder
/// its children and give each column and cell its place on the grid.
///
/// Rows are implicitly placed by their index. Column 0 is the first column
/// whatever the direction.
fn wrap_table(mut table: LayoutBox, children: Vec<LayoutBox>) -> LayoutBox {
    // STEP 1: Group the children by kind.
    let mut columns = Vec::new();
    let mut rows = Vec::new();
    let mut captions_top = Vec::new();
    let mut captions_bottom = Vec::new();
    for child in children {
        match child.kind {
            BoxKind::TableColumn | BoxKind::TableColumnGroup => columns.push(child),
            BoxKind::TableRow | BoxKind::TableRowGroup => rows.push(child),
            BoxKind::TableCaption => match child.style.caption_side() {
                CaptionSide::Top => captions_top.push(child),
                CaptionSide::Bottom => captions_bottom.push(child),
            },
            // Anything else was wrapped in a row.
            _ => {}
        }
    }

    // STEP 2: Place the columns.
    let mut column_groups = wrap_improper(&table, columns, BoxKind::TableColumnGroup, |child| {
        child.kind == BoxKind::TableColumnGroup
    });
    let mut grid_x = 0;
    for group in &mut column_groups {
        group.grid_x = grid_x;
        if group.children.is_empty() {
            grid_x += group.span;
        } else {
            // A spanning group already has one column per spanned column.
            for column in &mut group.children {
                column.grid_x = grid_x;
                grid_x += 1;
            }
        }
    }
    let mut grid_width = grid_x;

    // STEP 3: Extract the first header and footer groups.
    //
    // [§ 17.2 The CSS table model](https://www.w3.org/TR/CSS2/tables.html#table-display)
    //
    // "Print user agents may repeat header rows on each page spanned by a
    // table."
    let row_groups = wrap_improper(&table, rows, BoxKind::TableRowGroup, |child| {
        child.kind == BoxKind::TableRowGroup
    });
    let mut header = None;
    let mut footer = None;
    let mut bodies = Vec::with_capacity(row_groups.len());
    for mut group in row_groups {
        match group.style.display() {
            DisplayValue::Internal(InternalDisplayType::TableHeaderGroup) if header.is_none() => {
                group.is_header = true;
                header = Some(group);
            }
            DisplayValue::Internal(InternalDisplayType::TableFooterGroup) if footer.is_none() => {
                group.is_footer = true;
                footer = Some(group);
            }
            _ => bodies.push(group),
        }
    }
    let mut row_groups: Vec<LayoutBox> = header.into_iter().chain(bodies).chain(footer).collect();

    // STEP 4: Place the cells. Rows cannot span across row groups, so each
    // group is independent.
    let mut grid_height = 0;
    for group in &mut row_groups {
        let row_count = group.children.len();
        // Columns already taken by cells spanning from a previous row.
        let mut occupied: Vec<HashSet<usize>> = vec![HashSet::new(); row_count];
        for (row_index, row) in group.children.iter_mut().enumerate() {
            let mut grid_x = 0;
            for cell in &mut row.children {
                while occupied[row_index].contains(&grid_x) {
                    grid_x += 1;
                }
                cell.grid_x = grid_x;
                let new_grid_x = grid_x + cell.colspan;
                if cell.rowspan != 1 {
                    // "rowspan = 0" spans all the remaining rows of the
                    // group, other values are clamped to them.
                    let max_rowspan = row_count - row_index;
                    cell.rowspan = if cell.rowspan == 0 {
                        max_rowspan
                    } else {
                        cell.rowspan.min(max_rowspan)
                    };
                    for spanned in &mut occupied[row_index + 1..row_index + cell.rowspan] {
                        spanned.extend(grid_x..new_grid_x);
                    }
                }
                grid_x = new_grid_x;
                grid_width = grid_width.max(grid_x);
            }
        }
        grid_height += row_count;
    }

    table.children = row_groups;
    table.column_groups = column_groups;
    if table.style.border_collapse() == BorderCollapse::Collapse {
        table.collapsed_border_grid = Some(collapse_table_borders(&mut table, grid_width, grid_height));
    }

    // STEP 5: The wrapper.
    //
    // [§ 17.4 Tables in the visual formatting model](https://www.w3.org/TR/CSS2/tables.html#model)
    //
    // "The table wrapper box is a 'block' box if the table is block-level,
    // and an 'inline-block' box if the table is inline-level."
    let wrapper_kind = if table.kind == BoxKind::InlineTable {
        BoxKind::InlineBlock
    } else {
        BoxKind::Block
    };
    let mut wrapper = LayoutBox::anonymous_from(wrapper_kind, &table, Vec::new());
    wrapper.is_table_wrapper = true;
    wrapper.style_mut().move_table_wrapper_properties(table.style_mut());
    wrapper.children = captions_top
        .into_iter()
        .chain(std::iter::once(table))
        .chain(captions_bottom)
        .collect();
    wrapper
}
