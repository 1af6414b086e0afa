//! CLI command implementations.

pub mod admin;
pub mod prompt;
pub mod public;
pub mod render;
