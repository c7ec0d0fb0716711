//! The closed set of box kinds and their capabilities.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! "The following sections describe the types of boxes that may be generated
//! in CSS 2.1. A box's type affects, in part, its behavior in the visual
//! formatting model."

use koala_css::{DisplayValue, InnerDisplayType, InternalDisplayType, OuterDisplayType};
use serde::Serialize;
use strum_macros::{Display, EnumIter};

/// The kind of a box in the formatting structure.
///
/// Capability checks (`is_block_level`, `is_parent`, ...) replace type
/// tests: every kind has a fixed set of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
pub enum BoxKind {
    /// [§ 9.2.1 Block-level elements and block boxes](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    ///
    /// "A block-level box that is also a block container box is called a
    /// block box."
    Block,
    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    ///
    /// "An inline box is one that is both inline-level and whose contents
    /// participate in its containing inline formatting context."
    Inline,
    /// [§ 2.5 Text Runs](https://www.w3.org/TR/css-display-3/#text-nodes)
    ///
    /// "A text run is the most basic box generated."
    Text,
    /// A replaced element displayed as a block.
    BlockReplaced,
    /// [§ 3.4 Replaced elements](https://www.w3.org/TR/CSS2/conform.html#replaced-element)
    ///
    /// "An element whose content is outside the scope of the CSS formatting
    /// model, such as an image".
    InlineReplaced,
    /// "An inline-level block container is called an inline-block."
    InlineBlock,
    /// [§ 17.4 Tables in the visual formatting model](https://www.w3.org/TR/CSS2/tables.html#model)
    Table,
    /// A table that is inline-level on the outside.
    InlineTable,
    /// `table-row-group`, `table-header-group` or `table-footer-group`.
    TableRowGroup,
    /// `table-row`
    TableRow,
    /// `table-column-group`
    TableColumnGroup,
    /// `table-column`
    TableColumn,
    /// `table-cell`
    TableCell,
    /// `table-caption`
    TableCaption,
    /// [§ 3 Page model](https://www.w3.org/TR/css-page-3/#page-model)
    Page,
    /// [§ 4.2 Page-margin boxes](https://www.w3.org/TR/css-page-3/#margin-boxes)
    Margin,
    /// [§ 3 Flex containers](https://www.w3.org/TR/css-flexbox-1/#flex-containers)
    Flex,
    /// An inline-level flex container.
    InlineFlex,
    /// [§ 5 Grid containers](https://www.w3.org/TR/css-grid-1/#grid-containers)
    Grid,
    /// An inline-level grid container.
    InlineGrid,
    /// [§ 2.1 The footnote area](https://www.w3.org/TR/css-gcpm-3/#footnote-area)
    FootnoteArea,
    /// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// "The rectangular area that contains the boxes that form a line is
    /// called a line box."
    Line,
}

impl BoxKind {
    /// The kind generated by a computed `display`, or `None` when the
    /// builder has no box for it (`run-in`, `none`, `contents`).
    #[must_use]
    pub const fn for_display(display: DisplayValue) -> Option<Self> {
        use InnerDisplayType as In;
        use OuterDisplayType as Out;
        let kind = match display {
            DisplayValue::Pair { outer, inner, .. } => match (outer, inner) {
                (Out::Block, In::Flow | In::FlowRoot) => Self::Block,
                (Out::Inline, In::Flow) => Self::Inline,
                (Out::Inline, In::FlowRoot) => Self::InlineBlock,
                (Out::Block, In::Table) => Self::Table,
                (Out::Inline, In::Table) => Self::InlineTable,
                (Out::Block, In::Flex) => Self::Flex,
                (Out::Inline, In::Flex) => Self::InlineFlex,
                (Out::Block, In::Grid) => Self::Grid,
                (Out::Inline, In::Grid) => Self::InlineGrid,
                (Out::RunIn, _) => return None,
            },
            DisplayValue::Internal(internal) => match internal {
                InternalDisplayType::TableRowGroup
                | InternalDisplayType::TableHeaderGroup
                | InternalDisplayType::TableFooterGroup => Self::TableRowGroup,
                InternalDisplayType::TableRow => Self::TableRow,
                InternalDisplayType::TableCell => Self::TableCell,
                InternalDisplayType::TableColumnGroup => Self::TableColumnGroup,
                InternalDisplayType::TableColumn => Self::TableColumn,
                InternalDisplayType::TableCaption => Self::TableCaption,
            },
            DisplayValue::None | DisplayValue::Contents => return None,
        };
        Some(kind)
    }

    /// [§ 9.2.1 Block-level elements](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    ///
    /// "Block-level boxes are boxes that participate in a block formatting
    /// context."
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::BlockReplaced
                | Self::Flex
                | Self::Grid
                | Self::FootnoteArea
                | Self::Table
                | Self::InlineTable
                | Self::TableCaption
        )
    }

    /// [§ 9.2.2 Inline-level elements](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    ///
    /// "Inline-level boxes are boxes that participate in an inline formatting
    /// context." Inline tables are excluded: they are wrapped in an
    /// inline-block before line boxes are built.
    #[must_use]
    pub const fn is_inline_level(self) -> bool {
        matches!(
            self,
            Self::Inline
                | Self::InlineBlock
                | Self::InlineFlex
                | Self::InlineGrid
                | Self::InlineReplaced
                | Self::Text
        )
    }

    /// "A block container box either contains only block-level boxes or
    /// establishes an inline formatting context and thus contains only
    /// inline-level boxes."
    #[must_use]
    pub const fn is_block_container(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::FootnoteArea
                | Self::InlineBlock
                | Self::Margin
                | Self::TableCaption
                | Self::TableCell
        )
    }

    /// [§ 2.4 Atomic inlines](https://www.w3.org/TR/css-display-3/#atomic-inline)
    #[must_use]
    pub const fn is_atomic_inline_level(self) -> bool {
        matches!(self, Self::InlineBlock | Self::InlineReplaced)
    }

    /// Whether the box holds an image instead of children.
    #[must_use]
    pub const fn is_replaced(self) -> bool {
        matches!(self, Self::BlockReplaced | Self::InlineReplaced)
    }

    /// Whether the box can have children.
    #[must_use]
    pub const fn is_parent(self) -> bool {
        !matches!(self, Self::Text | Self::BlockReplaced | Self::InlineReplaced)
    }

    /// Flex containers, block or inline.
    #[must_use]
    pub const fn is_flex_container(self) -> bool {
        matches!(self, Self::Flex | Self::InlineFlex)
    }

    /// Grid containers, block or inline.
    #[must_use]
    pub const fn is_grid_container(self) -> bool {
        matches!(self, Self::Grid | Self::InlineGrid)
    }

    /// Table boxes, block or inline.
    #[must_use]
    pub const fn is_table(self) -> bool {
        matches!(self, Self::Table | Self::InlineTable)
    }

    /// [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
    ///
    /// "A proper table child is a 'table-row' box, row group box, 'table-column'
    /// box, 'table-column-group' box, or 'table-caption' box."
    #[must_use]
    pub const fn is_proper_table_child(self) -> bool {
        matches!(
            self,
            Self::TableRowGroup
                | Self::TableRow
                | Self::TableColumnGroup
                | Self::TableColumn
                | Self::TableCaption
        )
    }

    /// "An internal table box is a 'table-row' box, row group box,
    /// 'table-column' box, 'table-column-group' box or 'table-cell' box."
    /// Captions are included.
    #[must_use]
    pub const fn is_internal_table_or_caption(self) -> bool {
        self.is_proper_table_child() || matches!(self, Self::TableCell)
    }

    /// "A tabular container is a 'table-row' box or proper table parent."
    #[must_use]
    pub const fn is_tabular_container(self) -> bool {
        matches!(
            self,
            Self::Table | Self::InlineTable | Self::TableRowGroup | Self::TableRow
        )
    }

    /// Whether a box of kind `child` already sits in a proper parent when
    /// its parent has this kind.
    ///
    /// "A proper table row parent is a 'table' or 'inline-table' box or row
    /// group box." Row groups, column groups and captions need a table;
    /// columns need a table or a column group.
    #[must_use]
    pub const fn is_proper_parent_of(self, child: Self) -> bool {
        match child {
            Self::TableRowGroup | Self::TableColumnGroup | Self::TableCaption => self.is_table(),
            Self::TableRow => self.is_table() || matches!(self, Self::TableRowGroup),
            Self::TableColumn => self.is_table() || matches!(self, Self::TableColumnGroup),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn maps_display_pairs() {
        assert_eq!(BoxKind::for_display(DisplayValue::block()), Some(BoxKind::Block));
        assert_eq!(BoxKind::for_display(DisplayValue::inline()), Some(BoxKind::Inline));
        assert_eq!(
            BoxKind::for_display("inline-block".parse().unwrap()),
            Some(BoxKind::InlineBlock)
        );
        assert_eq!(
            BoxKind::for_display("table-header-group".parse().unwrap()),
            Some(BoxKind::TableRowGroup)
        );
        assert_eq!(BoxKind::for_display("list-item".parse().unwrap()), Some(BoxKind::Block));
        assert_eq!(BoxKind::for_display("run-in".parse().unwrap()), None);
    }

    #[test]
    fn inline_table_is_neither_inline_nor_parentless() {
        assert!(!BoxKind::InlineTable.is_inline_level());
        assert!(BoxKind::InlineTable.is_block_level());
        assert!(BoxKind::InlineTable.is_parent());
    }

    #[test]
    fn leaves_are_text_and_replaced() {
        let leaves: Vec<_> = BoxKind::iter().filter(|kind| !kind.is_parent()).collect();
        assert_eq!(
            leaves,
            [BoxKind::Text, BoxKind::BlockReplaced, BoxKind::InlineReplaced]
        );
        assert!(BoxKind::iter().filter(|kind| kind.is_replaced()).all(|kind| !kind.is_parent()));
    }

    #[test]
    fn atomic_inlines() {
        let atomic: Vec<_> = BoxKind::iter().filter(|kind| kind.is_atomic_inline_level()).collect();
        assert_eq!(atomic, [BoxKind::InlineReplaced, BoxKind::InlineBlock]);
    }

    #[test]
    fn proper_parents() {
        assert!(BoxKind::Table.is_proper_parent_of(BoxKind::TableRow));
        assert!(BoxKind::TableRowGroup.is_proper_parent_of(BoxKind::TableRow));
        assert!(!BoxKind::TableRowGroup.is_proper_parent_of(BoxKind::TableColumn));
        assert!(BoxKind::TableColumnGroup.is_proper_parent_of(BoxKind::TableColumn));
        assert!(!BoxKind::Block.is_proper_parent_of(BoxKind::TableCaption));
    }
}
