//! Environment variable overlay.
//!
//! Every record in the tree lists its fields once through [`EnvFields`]: the
//! serialization key, a typed mutable handle ([`FieldMut`]) for writable
//! fields, or a bare key for read-only ones. The binder walks that list with
//! a [`FieldVisitor`]. Overlaying values and enumerating keys are two
//! visitors over the same declarations, so the key set cannot drift.
//!
//! Variable names are the subtree prefix followed by the serialization key
//! upper-cased with `-` replaced by `_`:
//!
//! | subtree | prefix |
//! |---|---|
//! | root | `AWS_K8S_TESTER_EKS_` |
//! | parameters | `AWS_K8S_TESTER_EKS_PARAMETERS_` |
//! | add-on | `AWS_K8S_TESTER_EKS_ADD_ON_<TOKEN>_` |

mod fields;

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::addons::managed_node_groups::Mng;
use crate::config::addons::node_groups::Asg;
use crate::config::addons::AddOnKind;
use crate::config::merger::ConfigMerger;
use crate::config::schema::{Config, ENV_CONFIG, ENV_PREFIX, ENV_PREFIX_PARAMETERS};
use crate::duration::parse_duration;
use crate::error::{Error, Result};

pub(crate) use fields::slot_fields;

/// A flat environment: variable name to raw value.
pub type EnvMap = BTreeMap<String, String>;

/// Typed handle to one writable field.
#[derive(Debug)]
pub enum FieldMut<'a> {
    /// `true`/`false` and the usual synonyms.
    Bool(&'a mut bool),
    /// Signed base-10 integer.
    I64(&'a mut i64),
    /// Unsigned base-10 integer.
    U32(&'a mut u32),
    /// Unsigned base-10 integer.
    U64(&'a mut u64),
    /// Decimal float.
    F32(&'a mut f32),
    /// Decimal float.
    F64(&'a mut f64),
    /// Taken verbatim.
    Str(&'a mut String),
    /// Comma-separated.
    StrList(&'a mut Vec<String>),
    /// `k1=v1;k2=v2`, or a JSON object.
    StrMap(&'a mut BTreeMap<String, String>),
    /// Duration literal such as `1h30m` or `90s`.
    Duration(&'a mut Duration),
    /// JSON object of self-managed groups.
    Asgs(&'a mut BTreeMap<String, Asg>),
    /// JSON object of managed groups.
    Mngs(&'a mut BTreeMap<String, Mng>),
}

impl FieldMut<'_> {
    /// Short name of the field kind, used in listings.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I64(_) => "i64",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Str(_) => "string",
            Self::StrList(_) => "list",
            Self::StrMap(_) => "map",
            Self::Duration(_) => "duration",
            Self::Asgs(_) => "asgs-json",
            Self::Mngs(_) => "mngs-json",
        }
    }
}

/// Receives the field declarations of a record.
pub trait FieldVisitor {
    /// A writable field with serialization key `key`.
    ///
    /// # Errors
    ///
    /// Implementations return an error to stop the walk.
    fn field(&mut self, key: &'static str, field: FieldMut<'_>) -> Result<()>;

    /// A read-only field with serialization key `key`.
    ///
    /// # Errors
    ///
    /// Implementations return an error to stop the walk.
    fn read_only(&mut self, key: &'static str) -> Result<()> {
        let _ = key;
        Ok(())
    }
}

/// A record whose fields can be bound to environment variables.
///
/// Implementations list fields in serialization order. Nested subtrees with
/// their own prefix are not descended into: the root lists neither
/// `parameters` nor the add-on slots.
pub trait EnvFields {
    /// Calls `visitor` once per field.
    ///
    /// # Errors
    ///
    /// Propagates the first visitor error.
    fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<()>;
}

/// Variable name of serialization key `key` under `prefix`.
///
/// # Examples
///
/// ```
/// use eksconfig::config::environment::env_key;
///
/// assert_eq!(
///     env_key("AWS_K8S_TESTER_EKS_ADD_ON_ALB_2048_", "deployment-replicas-2048"),
///     "AWS_K8S_TESTER_EKS_ADD_ON_ALB_2048_DEPLOYMENT_REPLICAS_2048",
/// );
/// ```
#[must_use]
pub fn env_key(prefix: &str, key: &str) -> String {
    format!("{prefix}{}", key.to_uppercase().replace('-', "_"))
}

/// Applies environment overlays to a [`Config`].
///
/// # Examples
///
/// ```
/// use eksconfig::config::environment::{EnvMap, EnvironmentBinder};
/// use eksconfig::Config;
///
/// let mut cfg = Config::default();
/// let env = EnvMap::from([
///     ("AWS_K8S_TESTER_EKS_CLIENTS".to_string(), "7".to_string()),
///     ("AWS_K8S_TESTER_EKS_ADD_ON_JOBS_PI_ENABLE".to_string(), "true".to_string()),
/// ]);
/// EnvironmentBinder::apply(&mut cfg, &env).unwrap();
/// assert_eq!(cfg.clients, 7);
/// assert!(cfg.add_on_jobs_pi.unwrap().enable);
/// ```
pub struct EnvironmentBinder;

impl EnvironmentBinder {
    /// Overlays `env` on every subtree of `cfg`.
    ///
    /// Order: the [`ENV_CONFIG`] document, then absent add-on slots are
    /// filled with zero values, then the root, parameters and add-on
    /// prefixes. Nothing is written to `cfg` unless every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaParse`] for the first value that fails to
    /// parse.
    pub fn apply(cfg: &mut Config, env: &EnvMap) -> Result<()> {
        let mut next = match env.get(ENV_CONFIG).filter(|doc| !doc.trim().is_empty()) {
            Some(doc) => ConfigMerger::merge_document(cfg, doc).map_err(|err| Error::SchemaParse {
                field: "config".to_string(),
                key: ENV_CONFIG.to_string(),
                value: doc.clone(),
                reason: err.to_string(),
            })?,
            None => cfg.clone(),
        };
        next.fill_absent_add_ons();

        Self::apply_subtree(ENV_PREFIX, &mut next, env)?;
        Self::apply_subtree(ENV_PREFIX_PARAMETERS, &mut next.parameters, env)?;
        for kind in AddOnKind::ALL {
            if let Some(slot) = slot_fields(&mut next, kind) {
                Self::apply_subtree(&kind.env_prefix(), slot, env)?;
            }
        }

        *cfg = next;
        Ok(())
    }

    /// Overlays the process environment.
    ///
    /// # Errors
    ///
    /// See [`EnvironmentBinder::apply`].
    pub fn apply_process_env(cfg: &mut Config) -> Result<()> {
        Self::apply(cfg, &Self::process_env())
    }

    /// Overlays `env` on a single subtree rooted at `target`.
    ///
    /// Empty values are skipped. Keys that name read-only fields are logged
    /// and skipped. On error `target` may be partially updated; callers that
    /// need atomicity work on a copy, as [`EnvironmentBinder::apply`] does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaParse`] for the first value that fails to
    /// parse.
    pub fn apply_subtree(prefix: &str, target: &mut dyn EnvFields, env: &EnvMap) -> Result<()> {
        target.visit_fields(&mut Overlay { prefix, env })
    }

    /// Collects the `AWS_K8S_TESTER_EKS_*` variables of this process.
    ///
    /// Variables that are not valid Unicode are ignored.
    #[must_use]
    pub fn process_env() -> EnvMap {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect()
    }

    /// Every writable variable name, grouped by subtree in slot order.
    #[must_use]
    pub fn env_keys() -> Vec<String> {
        Self::collect(false)
    }

    /// Every variable name that targets a read-only field.
    #[must_use]
    pub fn read_only_keys() -> Vec<String> {
        Self::collect(true)
    }

    fn collect(read_only: bool) -> Vec<String> {
        let mut cfg = Config::default();
        cfg.fill_absent_add_ons();

        let mut collector = KeyCollector {
            prefix: ENV_PREFIX.to_string(),
            read_only,
            keys: Vec::new(),
        };
        // The collector never fails.
        let _ = cfg.visit_fields(&mut collector);
        collector.prefix = ENV_PREFIX_PARAMETERS.to_string();
        let _ = cfg.parameters.visit_fields(&mut collector);
        for kind in AddOnKind::ALL {
            collector.prefix = kind.env_prefix();
            if let Some(slot) = slot_fields(&mut cfg, kind) {
                let _ = slot.visit_fields(&mut collector);
            }
        }
        collector.keys
    }
}

impl Config {
    /// Overlays the process environment on this configuration.
    ///
    /// # Errors
    ///
    /// See [`EnvironmentBinder::apply`].
    pub fn update_from_env(&mut self) -> Result<()> {
        EnvironmentBinder::apply_process_env(self)
    }
}

/// Parses a boolean literal.
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off` and `t`/`f` in
/// any case.
///
/// # Errors
///
/// Returns a message naming the value when it is none of those.
pub fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" => Ok(true),
        "false" | "0" | "no" | "off" | "f" => Ok(false),
        other => Err(format!("'{other}' is not a boolean (expected true/false, 1/0, yes/no, on/off)")),
    }
}

/// Splits a comma-separated list, dropping empty items.
#[must_use]
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `k1=v1;k2=v2`. A value starting with `{` is read as a JSON object.
///
/// # Errors
///
/// Returns a message naming the first entry without `=` or with an empty
/// key.
pub fn parse_map(value: &str) -> std::result::Result<BTreeMap<String, String>, String> {
    let trimmed = value.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed).map_err(|e| e.to_string());
    }
    let mut out = BTreeMap::new();
    for entry in trimmed.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((k, v)) = entry.split_once('=') else {
            return Err(format!("entry '{entry}' is not key=value"));
        };
        let k = k.trim();
        if k.is_empty() {
            return Err(format!("entry '{entry}' has an empty key"));
        }
        out.insert(k.to_string(), v.trim().to_string());
    }
    Ok(out)
}

struct Overlay<'a> {
    prefix: &'a str,
    env: &'a EnvMap,
}

impl FieldVisitor for Overlay<'_> {
    fn field(&mut self, key: &'static str, field: FieldMut<'_>) -> Result<()> {
        let name = env_key(self.prefix, key);
        let Some(value) = self.env.get(&name).filter(|v| !v.is_empty()) else {
            return Ok(());
        };
        let fail = |reason: String| Error::SchemaParse {
            field: key.to_string(),
            key: name.clone(),
            value: value.clone(),
            reason,
        };

        match field {
            FieldMut::Bool(b) => *b = parse_bool(value).map_err(fail)?,
            FieldMut::I64(n) => *n = value.trim().parse::<i64>().map_err(|e| fail(e.to_string()))?,
            FieldMut::U32(n) => *n = value.trim().parse::<u32>().map_err(|e| fail(e.to_string()))?,
            FieldMut::U64(n) => *n = value.trim().parse::<u64>().map_err(|e| fail(e.to_string()))?,
            FieldMut::F32(n) => *n = value.trim().parse::<f32>().map_err(|e| fail(e.to_string()))?,
            FieldMut::F64(n) => *n = value.trim().parse::<f64>().map_err(|e| fail(e.to_string()))?,
            FieldMut::Str(s) => value.clone_into(s),
            FieldMut::StrList(list) => {
                let items = parse_list(value);
                if !items.is_empty() {
                    *list = items;
                }
            }
            FieldMut::StrMap(map) => *map = parse_map(value).map_err(fail)?,
            FieldMut::Duration(d) => *d = parse_duration(value.trim()).map_err(fail)?,
            FieldMut::Asgs(asgs) => {
                let decoded: BTreeMap<String, Asg> =
                    serde_json::from_str(value).map_err(|e| fail(e.to_string()))?;
                *asgs = fields::reset_asg_status(asgs, decoded);
            }
            FieldMut::Mngs(mngs) => {
                let decoded: BTreeMap<String, Mng> =
                    serde_json::from_str(value).map_err(|e| fail(e.to_string()))?;
                *mngs = fields::reset_mng_status(mngs, decoded);
            }
        }
        log::debug!("applied {name}");
        Ok(())
    }

    fn read_only(&mut self, key: &'static str) -> Result<()> {
        let name = env_key(self.prefix, key);
        if self.env.get(&name).is_some_and(|v| !v.is_empty()) {
            log::warn!("ignoring {name}: '{key}' is read-only");
        }
        Ok(())
    }
}

struct KeyCollector {
    prefix: String,
    read_only: bool,
    keys: Vec<String>,
}

impl FieldVisitor for KeyCollector {
    fn field(&mut self, key: &'static str, _field: FieldMut<'_>) -> Result<()> {
        if !self.read_only {
            self.keys.push(env_key(&self.prefix, key));
        }
        Ok(())
    }

    fn read_only(&mut self, key: &'static str) -> Result<()> {
        if self.read_only {
            self.keys.push(env_key(&self.prefix, key));
        }
        Ok(())
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[allow(unused_doc_comments)]
    proptest! {
        /// Property: a read-only key never changes the tree, whatever its value.
        #[test]
        fn prop_read_only_keys_are_inert(
            index in 0usize..64,
            value in "[ -~]{1,24}",
        ) {
            let keys = EnvironmentBinder::read_only_keys();
            let key = keys[index % keys.len()].clone();

            let mut cfg = Config::default();
            cfg.fill_absent_add_ons();
            let snapshot = cfg.clone();
            EnvironmentBinder::apply(&mut cfg, &EnvMap::from([(key, value)])).unwrap();
            prop_assert_eq!(cfg, snapshot);
        }

        /// Property: any u32 round-trips through its decimal form.
        #[test]
        fn prop_u32_fields_parse_decimal(n in any::<u32>()) {
            let mut cfg = Config::default();
            let env = EnvMap::from([("AWS_K8S_TESTER_EKS_CLIENT_BURST".to_string(), n.to_string())]);
            EnvironmentBinder::apply(&mut cfg, &env).unwrap();
            prop_assert_eq!(cfg.client_burst, n);
        }

        /// Property: a non-numeric value for an integer field fails and leaves the tree unchanged.
        #[test]
        fn prop_bad_integers_are_atomic(junk in "[a-z]{1,8}") {
            let mut cfg = Config { name: "c".to_string(), ..Config::default() };
            let snapshot = cfg.clone();
            let env = EnvMap::from([
                ("AWS_K8S_TESTER_EKS_NAME".to_string(), "changed".to_string()),
                ("AWS_K8S_TESTER_EKS_CLIENTS".to_string(), junk),
            ]);
            prop_assert!(EnvironmentBinder::apply(&mut cfg, &env).is_err());
            prop_assert_eq!(cfg, snapshot);
        }

        /// Property: lists keep their non-empty items in order.
        #[test]
        fn prop_lists_split_on_commas(items in prop::collection::vec("[a-z0-9]{1,6}", 1..6)) {
            let mut cfg = Config::default();
            let env = EnvMap::from([(
                "AWS_K8S_TESTER_EKS_PARAMETERS_ROLE_MANAGED_POLICY_ARNS".to_string(),
                items.join(","),
            )]);
            EnvironmentBinder::apply(&mut cfg, &env).unwrap();
            prop_assert_eq!(cfg.parameters.role_managed_policy_arns, items);
        }
    }
}
