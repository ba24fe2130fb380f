//! Page materialization
//!
//! A page goes through fetch, reference extraction, asset retrieval, link
//! rewriting, and an atomic write. The filename each page lands under comes
//! from [`crate::url::derive_filename`], the same function the
//! existing-output index uses for its skip decision.

mod materialize;
pub mod parse;

pub use materialize::{materialize_page, MaterializedPage};
pub use parse::{parse_page, resolve_href, AnchorRef, AssetRef, ParsedPage};
