//! CLI-specific error types with exit codes.

use eksconfig::Error as LibError;
use thiserror::Error;

/// CLI-specific error type with exit code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Library error (wrapped).
    #[error(transparent)]
    Library(#[from] LibError),

    /// Invalid command-line arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Semantic failure, e.g. nothing matched a filter.
    #[error("{0}")]
    SemanticFailure(String),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: Semantic failure (a configuration that does not validate,
    ///   a malformed document or environment value)
    /// - 2: Usage or I/O failure
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SemanticFailure(_) => 1,
            CliError::Library(lib_err) => match lib_err.root_kind() {
                LibError::InvalidPath { .. } | LibError::Io(_) => 2,
                _ => 1,
            },
            CliError::InvalidArguments(_) | CliError::Io(_) => 2,
        }
    }
}
