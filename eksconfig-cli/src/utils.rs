//! Utility functions for CLI operations.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // `verbose` is consumed by the logger in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Makes `path` absolute against the current directory without touching the
/// filesystem, so the file may not exist yet.
pub fn absolute_path(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_kept() {
        let path = Path::new("/tmp/c1.yaml");
        assert_eq!(absolute_path(path).unwrap(), path);
    }

    #[test]
    fn test_relative_path_joined_to_cwd() {
        let resolved = absolute_path(Path::new("c1.yaml")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("c1.yaml"));
    }
}
