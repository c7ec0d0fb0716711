//! Page-margin context for `string()` and `element()`.
//!
//! [§ 1 Running headers and footers](https://www.w3.org/TR/css-gcpm-3/#running-headers-and-footers)

use crate::layout_box::LayoutBox;

/// What a paginator knows about the page whose margin boxes are being
/// filled.
///
/// Content evaluated with a page context may use `string()` and
/// `element()`; without one those functions are skipped with a warning.
pub trait PageContext {
    /// [§ 1.1 Named strings](https://www.w3.org/TR/css-gcpm-3/#named-strings)
    ///
    /// The value of the named string `name` on the page, picked according
    /// to `keyword` (`first`, `start`, `last` or `first-except`).
    fn string_set_for(&self, name: &str, keyword: &str) -> String;

    /// [§ 1.3 Running elements](https://www.w3.org/TR/css-gcpm-3/#running-elements)
    ///
    /// The box of the running element `name` on the page, picked according
    /// to `keyword`.
    fn running_element_for(&self, name: &str, keyword: &str) -> Option<LayoutBox>;
}
