//! Configuration for generation, scoring and test sessions
//!
//! Provides types and parsing for `raven.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
