#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # eksconfig
//!
//! Configuration schema, defaults, environment overlay and validation for
//! test harnesses that provision Amazon EKS clusters with optional add-ons.
//!
//! This library is the declarative input contract of a provisioner: it
//! builds the default tree, overlays environment variables, validates the
//! result while filling derived defaults, and persists it as YAML.
//!
//! ## Core Types
//!
//! - [`Config`]: the root document, with one optional slot per add-on
//! - [`AddOnKind`]: the catalogue of add-on slots in validation order
//! - [`EnvironmentBinder`]: the `AWS_K8S_TESTER_EKS_*` overlay
//! - [`ConfigValidator`]: the validate-and-default pipeline
//! - [`SharedConfig`]: a lock-guarded tree that persists every mutation
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use eksconfig::{AddOnKind, Config};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut cfg = Config::new_default_with(&mut StdRng::seed_from_u64(7));
//! cfg.name = "c1".to_string();
//! cfg.config_path = dir.path().join("c1.yaml").display().to_string();
//!
//! cfg.validate_and_set_defaults_with(&mut StdRng::seed_from_u64(7)).unwrap();
//!
//! // Disabled add-ons are dropped from the validated tree.
//! assert!(!cfg.is_present(AddOnKind::JobsEcho));
//! assert_eq!(cfg.parameters.role_name, "c1-role-cluster");
//! ```

mod commands;
pub mod config;
pub mod duration;
pub mod error;
pub mod logging;
pub mod random;
pub mod regions;

// Re-export key types at crate root for convenience
pub use config::{
    AddOnKind, ClusterLifecycle, Config, ConfigMerger, ConfigValidator, EnvMap, EnvironmentBinder,
    SharedConfig, Status, TimeFrame,
};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
