//! Formatting structure (box tree) builder for the Koala engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Box generation** ([CSS 2.1 § 9.2](https://www.w3.org/TR/CSS2/visuren.html#box-gen))
//!   - One box per element, per generated pseudo-element and per text run
//!   - Replaced elements (`img`, `embed`, `object`, inline `svg`)
//!   - White space processing and `text-transform`
//!     ([CSS Text Level 3](https://www.w3.org/TR/css-text-3/))
//!
//! - **Generated content** ([CSS Generated Content Level 3](https://www.w3.org/TR/css-content-3/))
//!   - `::before`, `::after` and `::marker` content lists
//!   - Counters and quotes ([CSS Lists Level 3](https://www.w3.org/TR/css-lists-3/))
//!   - Cross-references, `string-set`, bookmarks and footnotes
//!     ([CSS GCPM](https://www.w3.org/TR/css-gcpm-3/)), with deferred
//!     evaluation of forward references
//!
//! - **Anonymous boxes**
//!   - Anonymous table objects, grid positions and collapsed borders
//!     ([CSS 2.1 § 17](https://www.w3.org/TR/CSS2/tables.html))
//!   - Flex and grid items
//!   - Line boxes and blocks inside inlines
//!
//! - **Serialization** of box trees for comparison and display
//!
//! # Not Implemented
//!
//! - Layout: box geometry stays at zero, except collapsed table borders
//! - Pagination and painting

/// Border conflict resolution for collapsed table borders.
pub mod border;
/// The closed set of box kinds.
pub mod box_kind;
/// Box geometry.
pub mod box_model;
/// Box tree construction.
pub mod build;
/// Structural sanity check.
pub mod check;
/// Content lists and generated text.
pub mod content;
/// Counters, quote depth and counter scopes.
pub mod counters;
/// Build errors.
pub mod error;
/// Flex and grid items.
pub mod flex_grid;
/// Element-specific boxes.
mod html;
/// Line boxes and blocks inside inlines.
pub mod inline;
/// The box record.
pub mod layout_box;
/// Page-margin context.
pub mod page;
/// Box tree snapshots.
pub mod serialize;
/// Anonymous table objects and the table grid.
pub mod table;
/// Cross-references and deferred content.
pub mod target;
/// White space and text transformation.
pub mod text;

pub use border::{Border, BorderGrids, Score};
pub use box_kind::BoxKind;
pub use build::{
    BuildOptions, DEFAULT_MAX_DEPTH, FormattingStructure, build_document, build_formatting_structure,
    create_anonymous_boxes,
};
pub use check::check_structure;
pub use content::ContentContext;
pub use counters::{CounterTable, PageState};
pub use error::BoxTreeError;
pub use layout_box::{BoxId, LayoutBox};
pub use page::PageContext;
pub use serialize::{SerializedBox, SerializedContent, serialize, serialize_box};
pub use target::{PageReplay, TargetCollector};
