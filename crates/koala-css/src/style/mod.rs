//! CSS computed style representation and value parsing
//!
//! This module implements CSS value types and computed style representation per:
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//! - [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//! - [CSS Generated Content Module Level 3](https://www.w3.org/TR/css-content-3/)
//! - [CSS Lists and Counters Module Level 3](https://www.w3.org/TR/css-lists-3/)

pub mod computed;
pub mod content;
mod display;
mod keywords;
pub mod parse;
mod values;

// Re-export all public types
pub use computed::{ComputedStyle, Side};
pub use content::{
    Anchor, AnchorRef, BookmarkLabel, BookmarkLevel, ContentToken, ContentValue, CounterIncrement,
    CounterList, CounterValues, ListStyleImage, ListStyleType, Quotes, StringSet,
};
pub use display::{DisplayValue, InnerDisplayType, InternalDisplayType, OuterDisplayType};
pub use keywords::{
    Appearance, BorderCollapse, BorderStyle, BreakBetween, BreakInside, CaptionSide, Clear,
    Direction, Float, FootnoteDisplay, Hyphens, ListStylePosition, Overflow, Position,
    TextTransform, WhiteSpace,
};
pub use values::{
    AutoLength, Color, ColorValue, DEFAULT_FONT_SIZE_PX, LengthValue, Opacity, TransformFunction,
    TransformOrigin, Transforms, VerticalAlign, ZIndex,
};
