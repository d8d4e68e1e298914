//! CLI command implementations.
//!
//! - `create_config`: write a default configuration
//! - `validate`: overlay, validate and sync a configuration
//! - `env_keys`: list writable environment variables
//! - `completions`: generate shell completion scripts

pub mod completions;
pub mod create_config;
pub mod env_keys;
pub mod validate;

pub use completions::CompletionsCommand;
pub use create_config::CreateConfigCommand;
pub use env_keys::EnvKeysCommand;
pub use validate::ValidateCommand;
