//! Error types for the eksconfig library.
//!
//! Every fallible operation in the crate returns [`Result`]. The four
//! validation kinds (`SchemaParse`, `InvariantViolation`,
//! `CrossConstraintViolation`, `CapabilityMissing`) are what callers match
//! on; pipeline steps wrap them in [`Error::Step`] so the message names the
//! failing add-on.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with an eksconfig error.
///
/// # Examples
///
/// ```
/// use eksconfig::{Error, Result};
///
/// fn cluster_count() -> Result<usize> {
///     Ok(1)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the eksconfig library.
#[derive(Debug, Error)]
pub enum Error {
    /// An environment value could not be parsed into the field's kind.
    #[error("failed to parse {key}={value:?} for field '{field}': {reason}")]
    SchemaParse {
        /// Serialization key of the target field.
        field: String,
        /// Environment variable key.
        key: String,
        /// Raw value that failed to parse.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// A single-field constraint failed.
    #[error("invalid {field}: {message}")]
    InvariantViolation {
        /// The offending field.
        field: String,
        /// Description of the failure.
        message: String,
    },

    /// Two or more fields are inconsistent.
    #[error("{message}")]
    CrossConstraintViolation {
        /// Description of the conflict.
        message: String,
    },

    /// An add-on needs something the configuration cannot provide.
    #[error("capability missing: {message}")]
    CapabilityMissing {
        /// Description of the missing capability.
        message: String,
    },

    /// A validation step failed.
    #[error("{step} failed [{source}]")]
    Step {
        /// Name of the pipeline step.
        step: &'static str,
        /// The first error the step encountered.
        #[source]
        source: Box<Error>,
    },

    /// An invalid filesystem path was provided.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The invalid path.
        path: PathBuf,
        /// The reason the path is invalid.
        reason: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML encoding or decoding failed.
    #[error("configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON decoding of a structured environment value failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for [`Error::InvariantViolation`].
    pub(crate) fn invariant(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::CrossConstraintViolation`].
    pub(crate) fn cross(message: impl Into<String>) -> Self {
        Self::CrossConstraintViolation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::CapabilityMissing`].
    pub(crate) fn capability(message: impl Into<String>) -> Self {
        Self::CapabilityMissing {
            message: message.into(),
        }
    }

    /// Returns the innermost error, looking through [`Error::Step`] wrappers.
    ///
    /// # Examples
    ///
    /// ```
    /// use eksconfig::Error;
    ///
    /// let err = Error::Step {
    ///     step: "validateConfig",
    ///     source: Box::new(Error::CrossConstraintViolation { message: "x".into() }),
    /// };
    /// assert!(err.root_kind().is_cross_constraint());
    /// ```
    #[must_use]
    pub fn root_kind(&self) -> &Self {
        match self {
            Self::Step { source, .. } => source.root_kind(),
            other => other,
        }
    }

    /// Name of the failing step, if the error is wrapped.
    #[must_use]
    pub fn step(&self) -> Option<&'static str> {
        match self {
            Self::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Check if error is a [`Error::SchemaParse`].
    #[must_use]
    pub fn is_schema_parse(&self) -> bool {
        matches!(self, Self::SchemaParse { .. })
    }

    /// Check if error is a [`Error::InvariantViolation`].
    #[must_use]
    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }

    /// Check if error is a [`Error::CrossConstraintViolation`].
    #[must_use]
    pub fn is_cross_constraint(&self) -> bool {
        matches!(self, Self::CrossConstraintViolation { .. })
    }

    /// Check if error is a [`Error::CapabilityMissing`].
    #[must_use]
    pub fn is_capability_missing(&self) -> bool {
        matches!(self, Self::CapabilityMissing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_parse_error() {
        let err = Error::SchemaParse {
            field: "clients".to_string(),
            key: "AWS_K8S_TESTER_EKS_CLIENTS".to_string(),
            value: "three".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("AWS_K8S_TESTER_EKS_CLIENTS"));
        assert!(display.contains("\"three\""));
        assert!(display.contains("clients"));
    }

    #[test]
    fn test_invariant_error() {
        let err = Error::invariant("Parameters.Version", "1.13 < 1.14");
        let display = format!("{err}");
        assert!(display.contains("invalid Parameters.Version"));
        assert!(display.contains("1.13 < 1.14"));
        assert!(err.is_invariant());
    }

    #[test]
    fn test_step_error_display() {
        let err = Error::Step {
            step: "validateAddOnJobsEcho",
            source: Box::new(Error::cross("Namespace is same as cluster name")),
        };
        assert_eq!(
            format!("{err}"),
            "validateAddOnJobsEcho failed [Namespace is same as cluster name]"
        );
        assert_eq!(err.step(), Some("validateAddOnJobsEcho"));
    }

    #[test]
    fn test_root_kind_unwraps_nested_steps() {
        let err = Error::Step {
            step: "outer",
            source: Box::new(Error::Step {
                step: "inner",
                source: Box::new(Error::capability("no GPU")),
            }),
        };
        assert!(err.root_kind().is_capability_missing());
        assert!(!err.is_capability_missing());
    }

    #[test]
    fn test_invalid_path_error() {
        let err = Error::InvalidPath {
            path: PathBuf::from("/invalid/path"),
            reason: "does not exist".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("invalid path"));
        let normalized = display.replace(std::path::MAIN_SEPARATOR, "/");
        assert!(normalized.contains("/invalid/path"));
        assert!(display.contains("does not exist"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(format!("{err}").contains("I/O error"));
    }
}
