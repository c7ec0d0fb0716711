//! Common utilities for the Koala box-tree builder.
//!
//! This crate provides shared infrastructure used by all components:
//! - **Warning System** - colored, deduplicated terminal output for
//!   recoverable problems, recorded per thread for inspection
//! - **URL resolution** - resolving references against a document base URL
//! - **Resource fetching** - `data:`, `file:` and `http(s):` loaders
//! - **Images** - image resource records and the [`image::ImageFetcher`] seam

pub mod image;
pub mod net;
pub mod url;
pub mod warning;
