//! Border conflict resolution for the collapsing border model.
//!
//! [§ 17.6.2 The collapsing border model](https://www.w3.org/TR/CSS2/tables.html#collapsing-borders)
//!
//! "In this model, adjacent cells share borders." Every segment of the
//! table grid gets the winning border among the cell, row, row group,
//! column, column group and table that touch it.

use koala_css::{BorderStyle, ColorValue, ComputedStyle, Side};

use crate::layout_box::LayoutBox;

/// The rank of a border in a conflict: `hidden`, then width, then style.
///
/// Compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Score {
    /// 1 for `hidden`, which "takes precedence over all other conflicting
    /// borders".
    pub hidden: u8,
    /// "Wider borders are preferred over narrower ones."
    pub width: f64,
    /// Rank of the style, see [`style_rank`].
    pub style: u8,
}

/// [§ 17.6.2.1 Border conflict resolution](https://www.w3.org/TR/CSS2/tables.html#border-conflict-resolution)
///
/// "If border styles differ, styles are preferred in this order: 'double',
/// 'solid', 'dashed', 'dotted', 'ridge', 'outset', 'groove', and the lowest:
/// 'inset'."
const fn style_rank(style: BorderStyle) -> u8 {
    match style {
        BorderStyle::Hidden => 9,
        BorderStyle::Double => 8,
        BorderStyle::Solid => 7,
        BorderStyle::Dashed => 6,
        BorderStyle::Dotted => 5,
        BorderStyle::Ridge => 4,
        BorderStyle::Outset => 3,
        BorderStyle::Groove => 2,
        BorderStyle::Inset => 1,
        BorderStyle::None => 0,
    }
}

/// One resolved segment of the border grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    /// Drawn style. `inset` and `outset` are drawn as `ridge` and `groove`
    /// in this model.
    pub style: BorderStyle,
    /// The score that won the conflict.
    pub score: Score,
    /// Width in pixels.
    pub width: f64,
    /// Resolved color.
    pub color: ColorValue,
}

impl Border {
    /// "If all styles are 'none', the result is 'none'": the weakest border.
    pub const WEAK_NULL: Self = Self {
        style: BorderStyle::None,
        score: Score {
            hidden: 0,
            width: 0.0,
            style: 0,
        },
        width: 0.0,
        color: ColorValue::TRANSPARENT,
    };

    /// A hidden border that nothing overrides, used inside spanning cells.
    pub const STRONG_NULL: Self = Self {
        style: BorderStyle::Hidden,
        score: Score {
            hidden: 1,
            width: 0.0,
            style: style_rank(BorderStyle::Hidden),
        },
        width: 0.0,
        color: ColorValue::TRANSPARENT,
    };
}

/// The resolved border segments of a table with collapsed borders.
///
/// `vertical[y][x]` is the segment left of column `x` in row `y`, so rows
/// hold `width + 1` segments. `horizontal[y][x]` is the segment above row `y`
/// in column `x`, with `height + 1` rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BorderGrids {
    /// Segments between columns.
    pub vertical: Vec<Vec<Border>>,
    /// Segments between rows.
    pub horizontal: Vec<Vec<Border>>,
}

impl BorderGrids {
    fn new(grid_width: usize, grid_height: usize) -> Self {
        Self {
            vertical: vec![vec![Border::WEAK_NULL; grid_width + 1]; grid_height],
            horizontal: vec![vec![Border::WEAK_NULL; grid_width]; grid_height + 1],
        }
    }

    fn set_one(&mut self, side: Side, style: &ComputedStyle, x: usize, y: usize) {
        let grid = match side {
            Side::Left | Side::Right => &mut self.vertical,
            Side::Top | Side::Bottom => &mut self.horizontal,
        };
        let Some(slot) = grid.get_mut(y).and_then(|row| row.get_mut(x)) else {
            return;
        };
        let border_style = style.border_style(side);
        let width = style.border_width(side);
        let score = Score {
            hidden: u8::from(border_style == BorderStyle::Hidden),
            width,
            style: style_rank(border_style),
        };
        // Strictly greater: on a tie the earlier box wins.
        if slot.score < score {
            *slot = Border {
                style: match border_style {
                    BorderStyle::Inset => BorderStyle::Ridge,
                    BorderStyle::Outset => BorderStyle::Groove,
                    other => other,
                },
                score,
                width,
                color: style.border_color(side),
            };
        }
    }

    /// Offer the borders of a box covering `w` columns and `h` rows from
    /// `(x, y)`.
    fn set_borders(&mut self, layout_box: &LayoutBox, x: usize, y: usize, w: usize, h: usize) {
        let style = &layout_box.style;
        for yy in y..y + h {
            self.set_one(Side::Left, style, x, yy);
            self.set_one(Side::Right, style, x + w, yy);
        }
        for xx in x..x + w {
            self.set_one(Side::Top, style, xx, y);
            self.set_one(Side::Bottom, style, xx, y + h);
        }
    }

    fn max_vertical_width(&self, x: usize, y: usize, h: usize) -> f64 {
        self.vertical
            .iter()
            .skip(y)
            .take(h)
            .filter_map(|row| row.get(x))
            .fold(0.0, |max, border| border.width.max(max))
    }

    fn max_horizontal_width(&self, x: usize, y: usize, w: usize) -> f64 {
        self.horizontal
            .get(y)
            .into_iter()
            .flat_map(|row| row.iter().skip(x).take(w))
            .fold(0.0, |max, border| border.width.max(max))
    }
}

/// Set the used border width of one side: half the resolved segment, the
/// other half belongs to the neighbour.
fn set_used_width(layout_box: &mut LayoutBox, side: Side, twice_width: f64) {
    layout_box.dimensions.border.set(side, twice_width / 2.0);
}

fn remove_borders(layout_box: &mut LayoutBox) {
    for side in Side::ALL {
        set_used_width(layout_box, side, 0.0);
    }
}

/// Resolve the collapsed borders of `table`, whose children are row groups
/// with `grid_x`, `colspan` and `rowspan` already set on the cells.
///
/// "A style set on a cell wins over one on a row, which wins over a row
/// group, column, column group and, lastly, table." Boxes are offered in
/// that order, and the used border widths of the table and its cells are
/// set from the result.
pub fn collapse_table_borders(table: &mut LayoutBox, grid_width: usize, grid_height: usize) -> BorderGrids {
    if grid_width == 0 || grid_height == 0 {
        return BorderGrids::default();
    }
    let mut grids = BorderGrids::new(grid_width, grid_height);

    // STEP 1: Cells. No border inside a spanning cell.
    let mut grid_y = 0;
    for row_group in &table.children {
        for row in &row_group.children {
            for cell in &row.children {
                for xx in cell.grid_x + 1..cell.grid_x + cell.colspan {
                    for yy in grid_y..grid_y + cell.rowspan {
                        if let Some(slot) = grids.vertical.get_mut(yy).and_then(|row| row.get_mut(xx)) {
                            *slot = Border::STRONG_NULL;
                        }
                    }
                }
                for xx in cell.grid_x..cell.grid_x + cell.colspan {
                    for yy in grid_y + 1..grid_y + cell.rowspan {
                        if let Some(slot) = grids.horizontal.get_mut(yy).and_then(|row| row.get_mut(xx)) {
                            *slot = Border::STRONG_NULL;
                        }
                    }
                }
                grids.set_borders(cell, cell.grid_x, grid_y, cell.colspan, cell.rowspan);
            }
            grid_y += 1;
        }
    }

    // STEP 2: Rows.
    let mut grid_y = 0;
    for row_group in &table.children {
        for row in &row_group.children {
            grids.set_borders(row, 0, grid_y, grid_width, 1);
            grid_y += 1;
        }
    }

    // STEP 3: Row groups.
    let mut grid_y = 0;
    for row_group in &table.children {
        let rows = row_group.children.len();
        grids.set_borders(row_group, 0, grid_y, grid_width, rows);
        grid_y += rows;
    }

    // STEP 4: Columns, then column groups.
    for column_group in &table.column_groups {
        for column in &column_group.children {
            grids.set_borders(column, column.grid_x, 0, 1, grid_height);
        }
    }
    for column_group in &table.column_groups {
        let span = if column_group.children.is_empty() {
            column_group.span
        } else {
            column_group.children.len()
        };
        grids.set_borders(column_group, column_group.grid_x, 0, span, grid_height);
    }

    // STEP 5: The table itself.
    grids.set_borders(table, 0, 0, grid_width, grid_height);

    // STEP 6: Used widths.
    let mut grid_y = 0;
    for row_group in &mut table.children {
        remove_borders(row_group);
        for row in &mut row_group.children {
            remove_borders(row);
            for cell in &mut row.children {
                let (x, colspan, rowspan) = (cell.grid_x, cell.colspan, cell.rowspan);
                set_used_width(cell, Side::Top, grids.max_horizontal_width(x, grid_y, colspan));
                set_used_width(
                    cell,
                    Side::Bottom,
                    grids.max_horizontal_width(x, grid_y + rowspan, colspan),
                );
                set_used_width(cell, Side::Left, grids.max_vertical_width(x, grid_y, rowspan));
                set_used_width(
                    cell,
                    Side::Right,
                    grids.max_vertical_width(x + colspan, grid_y, rowspan),
                );
            }
            grid_y += 1;
        }
    }
    for column_group in &mut table.column_groups {
        remove_borders(column_group);
        for column in &mut column_group.children {
            remove_borders(column);
        }
    }

    set_used_width(table, Side::Top, grids.max_horizontal_width(0, 0, grid_width));
    set_used_width(
        table,
        Side::Bottom,
        grids.max_horizontal_width(0, grid_height, grid_width),
    );
    // "UAs must compute an initial left and right border width for the
    // table by examining the first and last cells in the first row of the
    // table."
    set_used_width(table, Side::Left, grids.max_vertical_width(0, 0, 1));
    set_used_width(table, Side::Right, grids.max_vertical_width(grid_width, 0, 1));

    grids
}
