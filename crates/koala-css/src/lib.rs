//! Computed styles for the Koala box-tree builder.
//!
//! # Scope
//!
//! This crate implements:
//! - **Property values** ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/))
//!   - A value tokenizer and typed values for every supported property
//!   - Display values, including multi-keyword syntax ([CSS Display Level 3](https://www.w3.org/TR/css-display-3/))
//!   - Content lists, quotes, counters, `string-set` and bookmarks
//!     ([CSS Generated Content Level 3](https://www.w3.org/TR/css-content-3/),
//!     [CSS GCPM](https://www.w3.org/TR/css-gcpm-3/))
//!
//! - **Computed Styles** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Initial values and inheritance
//!   - CSS-wide keywords (`initial`, `inherit`, `unset`)
//!   - Shorthand property expansion (margin, padding, border, list-style)
//!   - `attr()` substitution and blockification
//!
//! - **User-agent defaults** for HTML elements and pseudo-elements
//! - **Counter styles** ([CSS Counter Styles Level 3](https://www.w3.org/TR/css-counter-styles-3/))
//! - **Styled documents** loaded from JSON, with a per-element style lookup
//!
//! # Not Implemented
//!
//! - Selector matching: styles are declared per element
//! - Fonts and used values that need layout

/// Origin layering, CSS-wide keywords and shorthand expansion per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Counter styles per [CSS Counter Styles Level 3](https://www.w3.org/TR/css-counter-styles-3/).
pub mod counter_style;
/// JSON styled documents.
pub mod document;
/// Style errors.
pub mod error;
/// Style lookup by element and pseudo-element.
pub mod lookup;
/// Computed style representation per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod style;
/// User-agent stylesheet per [WHATWG HTML § 15](https://html.spec.whatwg.org/multipage/rendering.html).
pub mod ua_stylesheet;

pub use counter_style::{BuiltinCounterStyles, CounterStyleRenderer};
pub use document::StyledDocument;
pub use error::StyleError;
pub use lookup::{PseudoType, StyleLookup, StyleMap};
pub use style::*;
