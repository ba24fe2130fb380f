//! Configuration for clone runs
//!
//! A [`RunConfig`] is assembled once (from CLI flags, optionally seeded by a
//! TOML file), validated, and then handed to the scheduler. The core never
//! reads interactive input or global state mid-run.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{CloneMode, RunConfig};
pub use validation::validate;
