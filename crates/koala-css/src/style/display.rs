//! CSS Display property types and parsing
//!
//! [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)

use std::fmt;
use std::str::FromStr;

use strum_macros::{Display as StrumDisplay, EnumString};

// [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
//
// "The display property defines an element's display type, which consists of
// the two basic qualities of how an element generates boxes:
//   - the inner display type, which defines the kind of formatting context
//     it generates, dictating how its descendant boxes are laid out.
//   - the outer display type, which dictates how the principal box itself
//     participates in flow layout."

/// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
///
/// "The `<display-outside>` keywords specify the element's outer display type,
/// which is essentially its principal box's role in flow layout."
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum OuterDisplayType {
    /// "The element generates a block-level box when placed in flow layout."
    Block,
    /// "The element generates an inline-level box when placed in flow layout."
    Inline,
    /// "The element generates a run-in box, which is a type of inline-level box."
    RunIn,
}

/// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
///
/// "The `<display-inside>` keywords specify the element's inner display type,
/// which defines the type of formatting context that lays out its contents."
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum InnerDisplayType {
    /// "The element lays out its contents using flow layout (block-and-inline layout)."
    Flow,
    /// Same as Flow but establishes a new block formatting context.
    FlowRoot,
    /// "The element lays out its contents using table layout."
    Table,
    /// "The element lays out its contents using flex layout."
    Flex,
    /// "The element lays out its contents using grid layout."
    Grid,
}

/// [§ 2.4 Layout-Internal Display Types](https://www.w3.org/TR/css-display-3/#layout-specific-display)
///
/// "Some layout models split boxes into multiple types with specialized
/// roles. These `<display-internal>` keywords define these roles."
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum InternalDisplayType {
    /// `table-row-group`
    TableRowGroup,
    /// `table-header-group`
    TableHeaderGroup,
    /// `table-footer-group`
    TableFooterGroup,
    /// `table-row`
    TableRow,
    /// `table-cell`
    TableCell,
    /// `table-column-group`
    TableColumnGroup,
    /// `table-column`
    TableColumn,
    /// `table-caption`
    TableCaption,
}

/// Combined display value
/// [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayValue {
    /// [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#valdef-display-none)
    ///
    /// "The element and its descendants generate no boxes or text runs."
    None,
    /// [§ 2.5 Box Generation](https://www.w3.org/TR/css-display-3/#valdef-display-contents)
    ///
    /// "The element itself does not generate any boxes, but its children and
    /// pseudo-elements still generate boxes and text runs as normal."
    Contents,
    /// An outer/inner pair, optionally generating a `::marker`.
    Pair {
        /// "how the box participates in flow layout"
        outer: OuterDisplayType,
        /// "how its descendant boxes are laid out"
        inner: InnerDisplayType,
        /// [§ 2.3 Generating Marker Boxes](https://www.w3.org/TR/css-display-3/#list-items)
        list_item: bool,
    },
    /// A table-internal display type.
    Internal(InternalDisplayType),
}

impl Default for DisplayValue {
    fn default() -> Self {
        Self::inline()
    }
}

impl DisplayValue {
    /// `display: block` - block outer, flow inner
    #[must_use]
    pub const fn block() -> Self {
        Self::Pair {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Flow,
            list_item: false,
        }
    }

    /// `display: inline` - inline outer, flow inner
    #[must_use]
    pub const fn inline() -> Self {
        Self::Pair {
            outer: OuterDisplayType::Inline,
            inner: InnerDisplayType::Flow,
            list_item: false,
        }
    }

    /// Whether the element generates no box at all.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether the element generates a `::marker` box.
    #[must_use]
    pub const fn is_list_item(self) -> bool {
        matches!(self, Self::Pair { list_item: true, .. })
    }

    /// Whether the outer display type is `block`.
    #[must_use]
    pub const fn is_block_outside(self) -> bool {
        matches!(
            self,
            Self::Pair {
                outer: OuterDisplayType::Block,
                ..
            }
        )
    }

    /// [§ 2.7 Automatic Box Type Transformations](https://www.w3.org/TR/css-display-3/#transformations)
    ///
    /// "Some layout effects require blockification or inlinification of the
    /// box type, which sets the box's computed outer display type to block
    /// or inline (respectively)."
    ///
    /// "If a layout-internal box is blockified, its inner display type
    /// converts to flow so that it becomes a block container."
    #[must_use]
    pub const fn blockified(self) -> Self {
        match self {
            Self::Pair {
                inner, list_item, ..
            } => Self::Pair {
                outer: OuterDisplayType::Block,
                inner,
                list_item,
            },
            Self::Internal(_) => Self::block(),
            other => other,
        }
    }
}

impl FromStr for DisplayValue {
    type Err = String;

    /// [§ 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
    ///
    /// Accepts the single-keyword forms of § 2.4/§ 2.5 as well as the
    /// multi-keyword `<display-outside> || <display-inside>` syntax with an
    /// optional `list-item`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let keywords: Vec<&str> = lower.split_whitespace().collect();
        let pair = |outer, inner| Self::Pair {
            outer,
            inner,
            list_item: false,
        };
        if let [keyword] = keywords.as_slice() {
            // [§ 2.6 Precomposed Inner/Outer Display Values](https://www.w3.org/TR/css-display-3/#display-value-summary)
            let value = match *keyword {
                "none" => Self::None,
                "contents" => Self::Contents,
                "block" => Self::block(),
                "inline" => Self::inline(),
                "run-in" => pair(OuterDisplayType::RunIn, InnerDisplayType::Flow),
                "flow" => Self::block(),
                "flow-root" => pair(OuterDisplayType::Block, InnerDisplayType::FlowRoot),
                "inline-block" => pair(OuterDisplayType::Inline, InnerDisplayType::FlowRoot),
                "table" => pair(OuterDisplayType::Block, InnerDisplayType::Table),
                "inline-table" => pair(OuterDisplayType::Inline, InnerDisplayType::Table),
                "flex" => pair(OuterDisplayType::Block, InnerDisplayType::Flex),
                "inline-flex" => pair(OuterDisplayType::Inline, InnerDisplayType::Flex),
                "grid" => pair(OuterDisplayType::Block, InnerDisplayType::Grid),
                "inline-grid" => pair(OuterDisplayType::Inline, InnerDisplayType::Grid),
                "list-item" => Self::Pair {
                    outer: OuterDisplayType::Block,
                    inner: InnerDisplayType::Flow,
                    list_item: true,
                },
                other => Self::Internal(other.parse().map_err(|_| s.to_string())?),
            };
            return Ok(value);
        }

        let mut outer = None;
        let mut inner = None;
        let mut list_item = false;
        for keyword in keywords {
            if keyword == "list-item" && !list_item {
                list_item = true;
            } else if let (None, Ok(value)) = (outer, keyword.parse::<OuterDisplayType>()) {
                outer = Some(value);
            } else if let (None, Ok(value)) = (inner, keyword.parse::<InnerDisplayType>()) {
                inner = Some(value);
            } else {
                return Err(s.to_string());
            }
        }
        let inner = inner.unwrap_or(InnerDisplayType::Flow);
        // "list-item" is only valid with flow or flow-root inner types.
        if list_item && !matches!(inner, InnerDisplayType::Flow | InnerDisplayType::FlowRoot) {
            return Err(s.to_string());
        }
        Ok(Self::Pair {
            outer: outer.unwrap_or(OuterDisplayType::Block),
            inner,
            list_item,
        })
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Contents => f.write_str("contents"),
            Self::Internal(internal) => write!(f, "{internal}"),
            Self::Pair {
                outer,
                inner,
                list_item,
            } => {
                write!(f, "{outer} {inner}")?;
                if *list_item {
                    f.write_str(" list-item")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_precomposed_keywords() {
        assert_eq!("block".parse(), Ok(DisplayValue::block()));
        assert_eq!(
            "inline-table".parse(),
            Ok(DisplayValue::Pair {
                outer: OuterDisplayType::Inline,
                inner: InnerDisplayType::Table,
                list_item: false
            })
        );
        assert_eq!(
            "table-header-group".parse(),
            Ok(DisplayValue::Internal(InternalDisplayType::TableHeaderGroup))
        );
        assert!("tabel".parse::<DisplayValue>().is_err());
    }

    #[test]
    fn parses_multi_keyword_syntax() {
        assert_eq!(
            "inline list-item".parse(),
            Ok(DisplayValue::Pair {
                outer: OuterDisplayType::Inline,
                inner: InnerDisplayType::Flow,
                list_item: true
            })
        );
        assert!("list-item table".parse::<DisplayValue>().is_err());
    }

    #[test]
    fn blockification() {
        let inline_block: DisplayValue = "inline-block".parse().unwrap();
        assert_eq!(
            inline_block.blockified(),
            DisplayValue::Pair {
                outer: OuterDisplayType::Block,
                inner: InnerDisplayType::FlowRoot,
                list_item: false
            }
        );
        let cell: DisplayValue = "table-cell".parse().unwrap();
        assert_eq!(cell.blockified(), DisplayValue::block());
        assert_eq!(DisplayValue::None.blockified(), DisplayValue::None);
    }
}
