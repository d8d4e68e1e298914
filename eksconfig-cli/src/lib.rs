//! Library exports for eksconfig-cli.
//!
//! The build script and the integration tests use the CLI structure through
//! this crate.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
