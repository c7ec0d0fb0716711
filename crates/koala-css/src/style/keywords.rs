//! Keyword-valued properties.
//!
//! Each enum parses from (and prints as) its CSS keywords, in kebab-case.
//! The `#[default]` variant is the property's initial value.

use std::fmt;
use std::str::FromStr;

use strum_macros::{Display, EnumString};

/// [§ 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position)
/// extended with [`footnote`](https://www.w3.org/TR/css-gcpm-3/#footnote-area).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Float {
    /// "The box is not floated."
    #[default]
    None,
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "Similar to 'left', except the box is floated to the right."
    Right,
    /// [§ 2.2 Creating footnotes](https://www.w3.org/TR/css-gcpm-3/#creating-footnotes)
    ///
    /// "The element becomes a footnote element."
    Footnote,
}

/// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
/// extended with [`running()`](https://www.w3.org/TR/css-gcpm-3/#running-elements).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Position {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow."
    Relative,
    /// "The box's position is specified with the 'top', 'right', 'bottom',
    /// and 'left' properties."
    Absolute,
    /// "The box's position is calculated according to the 'absolute' model,
    /// but in addition, the box is fixed with respect to some reference."
    Fixed,
    /// [§ 1.3 Running elements](https://www.w3.org/TR/css-gcpm-3/#running-elements)
    ///
    /// "The element is removed from the normal flow, and is available to
    /// place in a page margin box using `element()`."
    Running(String),
}

impl Position {
    /// Whether the box is absolutely positioned (`absolute` or `fixed`).
    #[must_use]
    pub const fn is_absolutely_positioned(&self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if let Some(name) = value
            .strip_prefix("running(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let name = name.trim();
            if name.is_empty() {
                return Err(s.to_string());
            }
            return Ok(Self::Running(name.to_string()));
        }
        match value.to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "relative" => Ok(Self::Relative),
            "absolute" => Ok(Self::Absolute),
            "fixed" => Ok(Self::Fixed),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => f.write_str("static"),
            Self::Relative => f.write_str("relative"),
            Self::Absolute => f.write_str("absolute"),
            Self::Fixed => f.write_str("fixed"),
            Self::Running(name) => write!(f, "running({name})"),
        }
    }
}

/// [§ 2.4 'footnote-display'](https://www.w3.org/TR/css-gcpm-3/#footnote-display)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FootnoteDisplay {
    /// "The footnote element is placed in the footnote area as a block element"
    #[default]
    Block,
    /// "The footnote element is placed in the footnote area as an inline element"
    Inline,
    /// "The user agent determines whether a given footnote is displayed as
    /// a block or inline element"
    Compact,
}

/// [§ 3 White Space and Wrapping: the white-space property](https://www.w3.org/TR/css-text-3/#white-space-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum WhiteSpace {
    /// collapse spaces and new lines, allow wrapping
    #[default]
    Normal,
    /// preserve spaces and new lines, no wrapping
    Pre,
    /// collapse spaces and new lines, no wrapping
    Nowrap,
    /// preserve spaces and new lines, allow wrapping
    PreWrap,
    /// collapse spaces, preserve new lines
    PreLine,
    /// like `pre-wrap`, but trailing spaces are never hung
    BreakSpaces,
}

impl WhiteSpace {
    /// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
    ///
    /// Whether spaces and tabs are collapsible.
    #[must_use]
    pub const fn collapses_spaces(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// Whether segment breaks are collapsible (turned into spaces).
    #[must_use]
    pub const fn collapses_new_lines(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap)
    }
}

/// [§ 2.1 Case Transforms: the text-transform property](https://www.w3.org/TR/css-text-3/#text-transform-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextTransform {
    /// "No effects."
    #[default]
    None,
    /// "Puts the first typographic letter unit of each word, if lowercase,
    /// in titlecase; other characters are unaffected."
    Capitalize,
    /// "Puts all letters in uppercase."
    Uppercase,
    /// "Puts all letters in lowercase."
    Lowercase,
    /// "Puts all typographic character units in fullwidth form."
    FullWidth,
}

/// [§ 6.1 Hyphenation Control: the hyphens property](https://www.w3.org/TR/css-text-3/#hyphens-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Hyphens {
    /// "Words are not hyphenated, even if characters inside the word
    /// explicitly define hyphenation opportunities."
    None,
    /// "Words are only hyphenated where there are characters inside the word
    /// that explicitly suggest hyphenation opportunities."
    #[default]
    Manual,
    /// "Words may be broken at hyphenation opportunities determined
    /// automatically by a language-appropriate hyphenation resource"
    Auto,
}

/// [§ 2.1 'direction'](https://www.w3.org/TR/css-writing-modes-3/#direction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Direction {
    /// "Left-to-right directionality."
    #[default]
    Ltr,
    /// "Right-to-left directionality."
    Rtl,
}

/// [§ 7.2 'appearance'](https://www.w3.org/TR/css-ui-4/#appearance-switching)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Appearance {
    /// "The element is rendered following the usual rules of CSS."
    #[default]
    None,
    /// "The user agent may render the element using native widgets."
    Auto,
    /// Same as `auto`, restricted to widgets with a native look.
    MenulistButton,
    /// Same as `auto`.
    Textfield,
}

/// [§ 11.1.1 'overflow'](https://www.w3.org/TR/CSS2/visufx.html#overflow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Overflow {
    /// "This value indicates that content is not clipped"
    #[default]
    Visible,
    /// "This value indicates that the content is clipped"
    Hidden,
    /// like `hidden`, with scrolling
    Scroll,
    /// user agent dependent
    Auto,
    /// like `hidden`, forbidding all scrolling
    Clip,
}

/// [§ 12.5.1 'list-style-position'](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ListStylePosition {
    /// "The marker box is outside the principal block box."
    #[default]
    Outside,
    /// "The marker box is placed as the first inline box in the principal
    /// block box"
    Inside,
}

/// [§ 17.4.1 'caption-side'](https://www.w3.org/TR/CSS2/tables.html#caption-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CaptionSide {
    /// "Positions the caption box above the table box."
    #[default]
    Top,
    /// "Positions the caption box below the table box."
    Bottom,
}

/// [§ 17.6 'border-collapse'](https://www.w3.org/TR/CSS2/tables.html#borders)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderCollapse {
    /// "the separated borders model"
    #[default]
    Separate,
    /// "the collapsing borders model"
    Collapse,
}

/// [§ 8.5.3 Border style](https://www.w3.org/TR/CSS2/box.html#border-style-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderStyle {
    /// "No border; the computed border width is zero."
    #[default]
    None,
    /// "Same as 'none', except in terms of border conflict resolution for
    /// table elements."
    Hidden,
    /// "The border is a series of dots."
    Dotted,
    /// "The border is a series of short line segments."
    Dashed,
    /// "The border is a single line segment."
    Solid,
    /// "The border is two solid lines."
    Double,
    /// "The border looks as though it were carved into the canvas."
    Groove,
    /// "The opposite of 'groove'"
    Ridge,
    /// "The border makes the box look as though it were embedded in the canvas."
    Inset,
    /// "The opposite of 'inset'."
    Outset,
}

/// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Clear {
    /// "No constraint on the box's position with respect to floats."
    #[default]
    None,
    /// below left-floating boxes
    Left,
    /// below right-floating boxes
    Right,
    /// below all floating boxes
    Both,
}

/// [§ 3.1 'break-before', 'break-after'](https://www.w3.org/TR/css-break-3/#break-between)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BreakBetween {
    /// "Neither force nor forbid a break before/after the principal box."
    #[default]
    Auto,
    /// "Avoid a break before/after the principal box."
    Avoid,
    /// "Avoid a page break before/after the principal box."
    AvoidPage,
    /// "Always force a page break before/after the principal box."
    Page,
    /// force a page break so the next page is a left page
    Left,
    /// force a page break so the next page is a right page
    Right,
    /// force a page break so the next page is a recto page
    Recto,
    /// force a page break so the next page is a verso page
    Verso,
    /// "Avoid a column break before/after the principal box."
    AvoidColumn,
    /// "Always force a column break before/after the principal box."
    Column,
}

/// [§ 3.2 'break-inside'](https://www.w3.org/TR/css-break-3/#break-within)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BreakInside {
    /// "Impose no additional breaking constraints within the box."
    #[default]
    Auto,
    /// "Avoid breaks within the box."
    Avoid,
    /// "Avoid a page break within the box."
    AvoidPage,
    /// "Avoid a column break within the box."
    AvoidColumn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip_in_kebab_case() {
        assert_eq!("pre-line".parse(), Ok(WhiteSpace::PreLine));
        assert_eq!(WhiteSpace::PreWrap.to_string(), "pre-wrap");
        assert_eq!("FULL-WIDTH".parse(), Ok(TextTransform::FullWidth));
        assert_eq!(BreakBetween::AvoidPage.to_string(), "avoid-page");
    }

    #[test]
    fn running_position() {
        assert_eq!(
            "running(header)".parse(),
            Ok(Position::Running("header".to_string()))
        );
        assert!("running()".parse::<Position>().is_err());
        assert!(Position::Fixed.is_absolutely_positioned());
    }
}
