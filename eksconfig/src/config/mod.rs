//! Configuration system for EKS test clusters.
//!
//! A [`Config`] is built in layers, each one overriding the last:
//!
//! 1. Built-in defaults ([`Config::new_default`])
//! 2. A persisted YAML document ([`Config::load`])
//! 3. A whole YAML document in `AWS_K8S_TESTER_EKS_CONFIG`
//! 4. Per-field environment variables (`AWS_K8S_TESTER_EKS_*`)
//!
//! [`ConfigValidator`] then checks the tree and fills derived defaults, and
//! [`Config::sync`] writes it back.
//!
//! # Examples
//!
//! ```
//! use eksconfig::config::{Config, EnvironmentBinder, EnvMap};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut cfg = Config::new_default();
//! cfg.name = "c1".to_string();
//! cfg.config_path = dir.path().join("c1.yaml").display().to_string();
//!
//! let env = EnvMap::from([("AWS_K8S_TESTER_EKS_REGION".to_string(), "us-east-1".to_string())]);
//! EnvironmentBinder::apply(&mut cfg, &env).unwrap();
//! cfg.validate_and_set_defaults_with(&mut StdRng::seed_from_u64(1)).unwrap();
//!
//! assert_eq!(cfg.region, "us-east-1");
//! assert!(cfg.kubeconfig_path.ends_with("c1.kubeconfig.yaml"));
//! ```

pub mod addons;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod status;
pub mod timeframe;
pub mod validator;

#[cfg(test)]
mod proptests;

// Re-export key types at module root
pub use addons::AddOnKind;
pub use environment::{EnvFields, EnvMap, EnvironmentBinder, FieldMut, FieldVisitor};
pub use loader::SharedConfig;
pub use merger::ConfigMerger;
pub use schema::{Config, Parameters};
pub use status::{ClusterLifecycle, ClusterStatus, Status};
pub use timeframe::TimeFrame;
pub use validator::ConfigValidator;
