//! Merging a YAML document over an existing configuration.
//!
//! The whole-document environment override (`AWS_K8S_TESTER_EKS_CONFIG`)
//! may name only a few keys. Mappings are merged key by key, so nested
//! records keep every field the document leaves out; any other value
//! replaces the target outright.

use serde_yaml::Value;

use crate::config::schema::Config;
use crate::error::Result;

/// Merges configuration documents according to precedence rules.
///
/// # Examples
///
/// ```
/// use eksconfig::config::{Config, ConfigMerger};
///
/// let base = Config { name: "low".to_string(), region: "us-east-1".to_string(), ..Config::default() };
/// let merged = ConfigMerger::merge_document(&base, "name: high\n").unwrap();
/// assert_eq!(merged.name, "high");
/// assert_eq!(merged.region, "us-east-1");
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// Returns `target` with the YAML `document` merged over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML or the merged tree
    /// no longer deserializes as a [`Config`].
    pub fn merge_document(target: &Config, document: &str) -> Result<Config> {
        let mut base = serde_yaml::to_value(target)?;
        let overlay: Value = serde_yaml::from_str(document)?;
        Self::merge_values(&mut base, overlay);
        Ok(serde_yaml::from_value(base)?)
    }

    /// Merges `source` into `target` (source wins).
    ///
    /// # Merging Rules
    ///
    /// - Mapping over mapping: merged per key, recursively
    /// - Null source: target kept
    /// - Anything else: source replaces target, sequences included
    pub fn merge_values(target: &mut Value, source: Value) {
        match (target, source) {
            (_, Value::Null) => {}
            (Value::Mapping(target_map), Value::Mapping(source_map)) => {
                for (key, value) in source_map {
                    match target_map.get_mut(&key) {
                        Some(slot) => Self::merge_values(slot, value),
                        None => {
                            target_map.insert(key, value);
                        }
                    }
                }
            }
            (slot, value) => *slot = value,
        }
    }
}
