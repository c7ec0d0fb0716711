//! Errors raised by the style system.

use thiserror::Error;

/// An invalid declaration or an unusable styled document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// [§ 4.1 Invalid declarations](https://www.w3.org/TR/css-syntax-3/#style-rules)
    ///
    /// The value does not match the property's grammar; the declaration
    /// is ignored.
    #[error("invalid value for {name}: \"{value}\"")]
    InvalidValue {
        /// Property name.
        name: String,
        /// Raw declared value.
        value: String,
    },
    /// The property is not supported.
    #[error("ignored unknown property \"{0}\"")]
    UnknownProperty(String),
    /// The document is not valid JSON or does not match the document format.
    #[error("invalid styled document: {0}")]
    Document(String),
    /// The document's root node is a text node.
    #[error("styled document has no root element")]
    NoRootElement,
}
