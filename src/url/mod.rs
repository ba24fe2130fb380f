//! URL handling for Site-Mirror
//!
//! This module provides the crawl-boundary type (`TargetOrigin`), URL
//! normalization, and the deterministic URL-to-filename derivation shared by
//! the page materializer and the existing-output index.

mod filename;
mod normalize;
mod origin;

pub use filename::{derive_filename, sanitize};
pub use normalize::normalize_url;
pub use origin::TargetOrigin;
