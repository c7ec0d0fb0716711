//! Errors raised while building the box tree.

use thiserror::Error;

/// A build that cannot produce a box tree.
///
/// Bad input never ends up here: unsupported displays, broken images and
/// invalid content values are warned about and skipped. These variants are
/// limits and internal inconsistencies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoxTreeError {
    /// The element tree nests deeper than `BuildOptions::max_depth`.
    #[error("element tree is nested deeper than {limit} levels")]
    TooDeep {
        /// The configured depth limit.
        limit: usize,
    },
    /// A structural invariant of the builder does not hold.
    #[error("box tree invariant violated: {0}")]
    InvariantViolation(String),
    /// The document has no root element.
    #[error("document has no root element")]
    NoRootElement,
}

impl BoxTreeError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}
