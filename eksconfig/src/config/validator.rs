//! Validation and defaulting.
//!
//! [`ConfigValidator`] runs a fixed pipeline over the tree: the root fields,
//! the cluster parameters, then every add-on slot in [`AddOnKind::ALL`]
//! order. Upstream steps fill defaults (names, namespaces, S3 prefixes) that
//! later steps read. A disabled slot is emptied. The first failure aborts the
//! run and is wrapped in [`Error::Step`] with the name of the failing step.

mod apps;
mod identity;
mod managed_node_groups;
mod node_groups;
mod testing;
mod workloads;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::config::addons::{expand_name_ref, AddOnKind, GET_REF_CLUSTER_ARN};
use crate::config::schema::{
    host_os, Config, DEFAULT_CLIENTS, DEFAULT_CLIENT_BURST, DEFAULT_CLIENT_QPS,
    DEFAULT_CLIENT_TIMEOUT, DEFAULT_COMMAND_AFTER_CREATE_TIMEOUT,
};
use crate::duration::format_duration;
use crate::error::{Error, Result};
use crate::logging::LogLevel;
use crate::random::rand_string;
use crate::regions;

/// Lowest Kubernetes version that supports managed node groups, Fargate and
/// service-account roles.
pub const MIN_VERSION_VALUE: f64 = 1.14;

/// Validates a configuration tree and fills its derived defaults.
///
/// # Examples
///
/// ```
/// use eksconfig::config::{Config, ConfigValidator};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut cfg = Config::new_default_with(&mut StdRng::seed_from_u64(1));
/// cfg.name = "c1".to_string();
/// cfg.config_path = dir.path().join("c1.yaml").display().to_string();
///
/// ConfigValidator::validate_and_set_defaults(&mut cfg, &mut StdRng::seed_from_u64(2)).unwrap();
/// assert!(cfg.kubeconfig_path.ends_with("c1.kubeconfig.yaml"));
/// assert!(cfg.add_on_jobs_pi.is_none());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Runs the whole pipeline over `cfg`.
    ///
    /// The pipeline works on a copy; `cfg` is replaced only when every step
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Step`] wrapping the first error of the first failing
    /// step. Use [`Error::root_kind`] to match on the underlying kind.
    pub fn validate_and_set_defaults<R: Rng + ?Sized>(cfg: &mut Config, rng: &mut R) -> Result<()> {
        let mut next = cfg.clone();
        Self::run(&mut next, rng)?;
        *cfg = next;
        Ok(())
    }

    fn run<R: Rng + ?Sized>(cfg: &mut Config, rng: &mut R) -> Result<()> {
        in_step("validateConfig", Self::validate_config(cfg))?;
        in_step("validateParameters", Self::validate_parameters(cfg, rng))?;

        for kind in AddOnKind::ALL {
            if !is_requested(cfg, kind) {
                if cfg.is_present(kind) {
                    debug!("{kind} disabled; dropping slot");
                }
                cfg.clear(kind);
                continue;
            }
            in_step(kind.step(), Self::validate_add_on(cfg, kind, rng))?;
        }
        Ok(())
    }

    fn validate_add_on<R: Rng + ?Sized>(cfg: &mut Config, kind: AddOnKind, rng: &mut R) -> Result<()> {
        if kind.requires_version_1_14() && cfg.parameters.version_value < MIN_VERSION_VALUE {
            return Err(Error::invariant(
                "Parameters.Version",
                format!("{:?} is not supported by {kind} (requires >= 1.14)", cfg.parameters.version),
            ));
        }
        if kind.requires_node_group() && !cfg.any_node_group_enabled() {
            return Err(Error::cross(format!("{kind}.Enable true but no node group is enabled")));
        }

        match kind {
            AddOnKind::NodeGroups => node_groups::validate(cfg),
            AddOnKind::ManagedNodeGroups => managed_node_groups::validate(cfg),
            AddOnKind::CsiEbs
            | AddOnKind::NlbHelloWorld
            | AddOnKind::NlbGuestbook
            | AddOnKind::Alb2048
            | AddOnKind::JobsPi
            | AddOnKind::JobsEcho
            | AddOnKind::CronJobs
            | AddOnKind::Csrs
            | AddOnKind::ConfigMaps
            | AddOnKind::Secrets
            | AddOnKind::PhpApache
            | AddOnKind::AmiSoftLockupIssue454 => workloads::validate(cfg, kind),
            AddOnKind::Irsa | AddOnKind::Fargate | AddOnKind::IrsaFargate => {
                identity::validate(cfg, kind, rng)
            }
            AddOnKind::AppMesh
            | AddOnKind::KubernetesDashboard
            | AddOnKind::PrometheusGrafana
            | AddOnKind::Wordpress
            | AddOnKind::JupyterHub
            | AddOnKind::Kubeflow
            | AddOnKind::CniVpc
            | AddOnKind::Fluentd => apps::validate(cfg, kind, rng),
            AddOnKind::ClusterLoader
            | AddOnKind::ClusterLoaderRemote
            | AddOnKind::Conformance
            | AddOnKind::HollowNodesLocal
            | AddOnKind::HollowNodesRemote
            | AddOnKind::ClusterVersionUpgrade => testing::validate(cfg, kind, rng),
        }
    }

    /// Root fields: identity, logging, client tuning, output paths and the
    /// artifact bucket.
    fn validate_config(cfg: &mut Config) -> Result<()> {
        if !regions::is_known(&cfg.region) {
            return Err(Error::invariant("Region", format!("unknown region {:?}", cfg.region)));
        }
        if cfg.name.is_empty() {
            return Err(Error::invariant("Name", "must not be empty"));
        }
        if cfg.name != cfg.name.to_lowercase() {
            return Err(Error::invariant(
                "Name",
                format!("{:?} must be lower-case", cfg.name),
            ));
        }

        LogLevel::parse(&cfg.log_level).map_err(|e| Error::invariant("LogLevel", e))?;
        if cfg.log_outputs.is_empty() {
            return Err(Error::invariant("LogOutputs", "must not be empty"));
        }

        if cfg.clients == 0 {
            cfg.clients = DEFAULT_CLIENTS;
        }
        if cfg.client_qps == 0.0 {
            cfg.client_qps = DEFAULT_CLIENT_QPS;
        }
        if cfg.client_burst == 0 {
            cfg.client_burst = DEFAULT_CLIENT_BURST;
        }
        if cfg.client_timeout.is_zero() {
            cfg.client_timeout = DEFAULT_CLIENT_TIMEOUT;
        }
        cfg.client_timeout_string = format_duration(cfg.client_timeout);

        if cfg.config_path.is_empty() {
            cfg.config_path = working_dir().join(format!("{}.yaml", cfg.name)).display().to_string();
        }
        cfg.config_path = absolute(&cfg.config_path).display().to_string();
        if let Some(parent) = Path::new(&cfg.config_path).parent() {
            fs::create_dir_all(parent)?;
        }
        let base = cfg.config_base();

        if matches!(cfg.log_outputs.as_slice(), [only] if only == "stderr" || only == "stdout") {
            cfg.log_outputs.push(format!("{base}.log"));
        }

        default_with_extension(&mut cfg.kubectl_commands_output_path, format!("{base}.kubectl.sh"), "sh");
        default_with_extension(
            &mut cfg.remote_access_commands_output_path,
            format!("{base}.ssh.sh"),
            "sh",
        );
        default_with_extension(
            &mut cfg.command_after_create_cluster_output_path,
            format!("{base}.after-create-cluster.out.log"),
            "log",
        );
        default_with_extension(
            &mut cfg.command_after_create_add_ons_output_path,
            format!("{base}.after-create-add-ons.out.log"),
            "log",
        );

        if cfg.command_after_create_cluster_timeout.is_zero() {
            cfg.command_after_create_cluster_timeout = DEFAULT_COMMAND_AFTER_CREATE_TIMEOUT;
        }
        cfg.command_after_create_cluster_timeout_string =
            format_duration(cfg.command_after_create_cluster_timeout);
        if cfg.command_after_create_add_ons_timeout.is_zero() {
            cfg.command_after_create_add_ons_timeout = DEFAULT_COMMAND_AFTER_CREATE_TIMEOUT;
        }
        cfg.command_after_create_add_ons_timeout_string =
            format_duration(cfg.command_after_create_add_ons_timeout);

        if cfg.kubeconfig_path.is_empty() {
            cfg.kubeconfig_path = format!("{base}.kubeconfig.yaml");
        }
        if !cfg.kubectl_download_url.contains(host_os()) {
            return Err(Error::invariant(
                "KubectlDownloadURL",
                format!("{:?} does not match the host OS {:?}", cfg.kubectl_download_url, host_os()),
            ));
        }

        cfg.command_after_create_cluster = cfg.evaluate_command_refs(&cfg.command_after_create_cluster);
        cfg.command_after_create_add_ons = cfg.evaluate_command_refs(&cfg.command_after_create_add_ons);

        if cfg.s3_bucket_create {
            if cfg.s3_bucket_name.is_empty() {
                cfg.s3_bucket_name = format!("{}-s3-bucket", cfg.name);
            }
            if matches!(cfg.s3_bucket_lifecycle_expiration_days, 1 | 2) {
                cfg.s3_bucket_lifecycle_expiration_days = 3;
            }
        }
        Ok(())
    }

    /// Cluster parameters: version, role, VPC and the remote-access key.
    fn validate_parameters<R: Rng + ?Sized>(cfg: &mut Config, rng: &mut R) -> Result<()> {
        let name = cfg.name.clone();
        let p = &mut cfg.parameters;

        if p.version.is_empty() {
            return Err(Error::invariant("Parameters.Version", "must not be empty"));
        }
        p.version_value = parse_version("Parameters.Version", &p.version)?;

        validate_role(RoleFields {
            field: "Parameters",
            create: p.role_create,
            default_name: format!("{name}-role-cluster"),
            name: &mut p.role_name,
            arn: &p.role_arn,
            service_principals: &p.role_service_principals,
            managed_policy_arns: &p.role_managed_policy_arns,
        })?;

        if !p.vpc_create && p.vpc_id.is_empty() {
            return Err(Error::invariant(
                "Parameters.VPCID",
                "VPCCreate false; expect non-empty VPCID",
            ));
        }
        let subnets = [
            &p.public_subnet_cidr_1,
            &p.public_subnet_cidr_2,
            &p.public_subnet_cidr_3,
            &p.private_subnet_cidr_1,
            &p.private_subnet_cidr_2,
        ];
        if p.vpc_cidr.is_empty() {
            if subnets.iter().any(|cidr| !cidr.is_empty()) {
                return Err(Error::cross("subnet CIDRs require Parameters.VPCCIDR"));
            }
        } else if subnets.iter().any(|cidr| cidr.is_empty()) {
            return Err(Error::cross(format!(
                "Parameters.VPCCIDR {:?} requires all five subnet CIDRs",
                p.vpc_cidr
            )));
        }

        if cfg.remote_access_key_create {
            if cfg.remote_access_key_name.is_empty() {
                cfg.remote_access_key_name = format!("{name}-key-nodes");
            }
            if cfg.remote_access_private_key_path.is_empty() {
                cfg.remote_access_private_key_path = std::env::temp_dir()
                    .join(format!("{}.insecure.key", rand_string(rng, 10)))
                    .display()
                    .to_string();
            }
        } else {
            if cfg.remote_access_key_name.is_empty() {
                return Err(Error::invariant(
                    "RemoteAccessKeyName",
                    "RemoteAccessKeyCreate false; expect non-empty RemoteAccessKeyName",
                ));
            }
            if cfg.remote_access_private_key_path.is_empty() {
                return Err(Error::invariant(
                    "RemoteAccessPrivateKeyPath",
                    "RemoteAccessKeyCreate false; expect non-empty RemoteAccessPrivateKeyPath",
                ));
            }
            if !Path::new(&cfg.remote_access_private_key_path).exists() {
                return Err(Error::invariant(
                    "RemoteAccessPrivateKeyPath",
                    format!("{:?} does not exist", cfg.remote_access_private_key_path),
                ));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Validates this configuration and fills its defaults, drawing random
    /// values from the thread RNG.
    ///
    /// # Errors
    ///
    /// See [`ConfigValidator::validate_and_set_defaults`].
    pub fn validate_and_set_defaults(&mut self) -> Result<()> {
        ConfigValidator::validate_and_set_defaults(self, &mut rand::thread_rng())
    }

    /// Like [`Config::validate_and_set_defaults`], with an injected generator.
    ///
    /// # Errors
    ///
    /// See [`ConfigValidator::validate_and_set_defaults`].
    pub fn validate_and_set_defaults_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        ConfigValidator::validate_and_set_defaults(self, rng)
    }

    /// Expands `GetRef.Name` and `GetRef.ClusterARN` in a post-create command.
    #[must_use]
    pub fn evaluate_command_refs(&self, command: &str) -> String {
        expand_name_ref(command, &self.name).replace(GET_REF_CLUSTER_ARN, &self.status.cluster_arn)
    }
}

fn in_step(step: &'static str, result: Result<()>) -> Result<()> {
    result.map_err(|source| Error::Step {
        step,
        source: Box::new(source),
    })
}

/// Whether the pipeline should validate `kind` rather than drop it.
///
/// Node-group slots are validated as soon as their flag is set, so an
/// enabled slot without groups is reported instead of silently dropped.
fn is_requested(cfg: &Config, kind: AddOnKind) -> bool {
    match kind {
        AddOnKind::NodeGroups => cfg.add_on_node_groups.as_ref().is_some_and(|a| a.enable),
        AddOnKind::ManagedNodeGroups => {
            cfg.add_on_managed_node_groups.as_ref().is_some_and(|a| a.enable)
        }
        other => cfg.is_enabled(other),
    }
}

fn working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir())
}

pub(crate) fn absolute(path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir().join(path)
    }
}

/// Sets `value` to `default` when empty, then appends `.ext` unless the
/// value already carries that extension.
fn default_with_extension(value: &mut String, default: String, ext: &str) {
    if value.is_empty() {
        *value = default;
    }
    if Path::new(value.as_str()).extension().and_then(|e| e.to_str()) != Some(ext) {
        value.push('.');
        value.push_str(ext);
    }
}

/// Parses a `major.minor` version string.
pub(crate) fn parse_version(field: &str, version: &str) -> Result<f64> {
    version
        .parse::<f64>()
        .map_err(|e| Error::invariant(field, format!("invalid version {version:?} ({e})")))
}

/// Last `/`-separated segment of an ARN.
pub(crate) fn name_from_arn(arn: &str) -> String {
    arn.rsplit('/').next().unwrap_or(arn).to_string()
}

/// Role settings shared by the cluster, node groups and Fargate.
pub(crate) struct RoleFields<'a> {
    pub field: &'static str,
    pub create: bool,
    pub default_name: String,
    pub name: &'a mut String,
    pub arn: &'a str,
    pub service_principals: &'a [String],
    pub managed_policy_arns: &'a [String],
}

/// A role being created gets a default name. An existing role must be named
/// by ARN and take no policies or principals.
pub(crate) fn validate_role(role: RoleFields<'_>) -> Result<()> {
    let field = role.field;
    if role.create {
        if role.name.is_empty() {
            *role.name = role.default_name;
        }
        return Ok(());
    }
    if role.arn.is_empty() {
        return Err(Error::invariant(
            format!("{field}.RoleARN"),
            "RoleCreate false; expect non-empty RoleARN",
        ));
    }
    if role.name.is_empty() {
        *role.name = name_from_arn(role.arn);
    }
    if !role.managed_policy_arns.is_empty() {
        return Err(Error::cross(format!(
            "{field}.RoleCreate false; expect empty RoleManagedPolicyARNs but got {:?}",
            role.managed_policy_arns
        )));
    }
    if !role.service_principals.is_empty() {
        return Err(Error::cross(format!(
            "{field}.RoleCreate false; expect empty RoleServicePrincipals but got {:?}",
            role.service_principals
        )));
    }
    Ok(())
}

/// Defaults an add-on namespace and rejects one equal to the cluster name.
pub(crate) fn default_namespace(namespace: &mut String, kind: AddOnKind, cluster_name: &str) -> Result<()> {
    if namespace.is_empty() {
        *namespace = kind.default_namespace(cluster_name);
    }
    if namespace == cluster_name {
        return Err(Error::cross(format!(
            "{kind}.Namespace {namespace:?} conflicts with the cluster name"
        )));
    }
    Ok(())
}

/// Fails unless `value` ends with `suffix`.
pub(crate) fn require_suffix(field: &str, value: &str, suffix: &str) -> Result<()> {
    if value.ends_with(suffix) {
        Ok(())
    } else {
        Err(Error::invariant(field, format!("{value:?} must have '{suffix}' extension")))
    }
}

/// Sets `value` to `default` when empty, then requires `suffix`.
pub(crate) fn default_with_suffix(field: &str, value: &mut String, default: String, suffix: &str) -> Result<()> {
    if value.is_empty() {
        *value = default;
    }
    require_suffix(field, value, suffix)
}

/// Fails when `value` is empty.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(Error::invariant(field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// Sets `d` to `default` when zero and returns its text form.
pub(crate) fn default_duration(d: &mut Duration, default: Duration) -> String {
    if d.is_zero() {
        *d = default;
    }
    format_duration(*d)
}

/// `<dir>/<file>` as a string.
pub(crate) fn join(dir: &Path, file: impl AsRef<Path>) -> String {
    dir.join(file).display().to_string()
}

/// `<prefix>/<basename of path>`, the S3 key of an uploaded artifact.
pub(crate) fn s3_key(prefix: &str, path: &str) -> String {
    let base = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{prefix}/{base}")
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_default_tree_validates() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        validate(&mut cfg).unwrap();

        let base = join(dir.path(), "c1");
        assert_eq!(cfg.kubectl_commands_output_path, format!("{base}.kubectl.sh"));
        assert_eq!(cfg.remote_access_commands_output_path, format!("{base}.ssh.sh"));
        assert_eq!(cfg.kubeconfig_path, format!("{base}.kubeconfig.yaml"));
        assert_eq!(
            cfg.command_after_create_cluster_output_path,
            format!("{base}.after-create-cluster.out.log")
        );
        assert_eq!(cfg.log_outputs, vec!["stderr".to_string(), format!("{base}.log")]);
        assert_eq!(cfg.client_timeout_string, "30s");
        assert_eq!(cfg.command_after_create_add_ons_timeout_string, "3m0s");
        assert!((cfg.parameters.version_value - 1.15).abs() < f64::EPSILON);
        assert_eq!(cfg.parameters.role_name, "c1-role-cluster");
        assert_eq!(cfg.remote_access_key_name, "c1-key-nodes");
    }

    #[test]
    fn test_disabled_slots_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        validate(&mut cfg).unwrap();
        for kind in AddOnKind::ALL {
            assert!(!cfg.is_present(kind), "{kind} kept");
        }
    }

    #[test]
    fn test_failure_leaves_config_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.parameters.version = "one".to_string();
        let before = cfg.clone();
        let err = validate(&mut cfg).unwrap_err();
        assert_eq!(err.step(), Some("validateParameters"));
        assert!(err.root_kind().is_invariant());
        assert_eq!(cfg, before);
    }

    #[test]
    fn test_unknown_region() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.region = "mars-west-1".to_string();
        let err = validate(&mut cfg).unwrap_err();
        assert_eq!(err.step(), Some("validateConfig"));
        assert!(err.to_string().contains("mars-west-1"));
    }

    #[test]
    fn test_upper_case_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.name = "C1".to_string();
        assert!(validate(&mut cfg).unwrap_err().root_kind().is_invariant());
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.log_level = "verbose".to_string();
        let err = validate(&mut cfg).unwrap_err();
        assert!(err.to_string().contains("LogLevel"));
    }

    #[test]
    fn test_file_log_outputs_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.log_outputs = vec!["stderr".to_string(), "/tmp/x.log".to_string()];
        validate(&mut cfg).unwrap();
        assert_eq!(cfg.log_outputs.len(), 2);
    }

    #[test]
    fn test_output_extensions_are_forced() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.kubectl_commands_output_path = join(dir.path(), "cmds.txt");
        cfg.command_after_create_cluster_output_path = join(dir.path(), "after");
        validate(&mut cfg).unwrap();
        assert!(cfg.kubectl_commands_output_path.ends_with("cmds.txt.sh"));
        assert!(cfg.command_after_create_cluster_output_path.ends_with("after.log"));
    }

    #[test]
    fn test_command_refs_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.status.cluster_arn = "arn:aws:eks:us-west-2:1:cluster/c1".to_string();
        cfg.command_after_create_cluster = "echo GetRef.Name GetRef.ClusterARN".to_string();
        validate(&mut cfg).unwrap();
        assert_eq!(
            cfg.command_after_create_cluster,
            "echo c1 arn:aws:eks:us-west-2:1:cluster/c1"
        );
    }

    #[test]
    fn test_s3_bucket_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.s3_bucket_create = true;
        cfg.s3_bucket_lifecycle_expiration_days = 2;
        validate(&mut cfg).unwrap();
        assert_eq!(cfg.s3_bucket_name, "c1-s3-bucket");
        assert_eq!(cfg.s3_bucket_lifecycle_expiration_days, 3);
    }

    #[test]
    fn test_existing_role_requires_arn() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.parameters.role_create = false;
        let err = validate(&mut cfg).unwrap_err();
        assert!(err.to_string().contains("RoleARN"));

        cfg.parameters.role_arn = "arn:aws:iam::123:role/existing".to_string();
        validate(&mut cfg).unwrap();
        assert_eq!(cfg.parameters.role_name, "existing");
    }

    #[test]
    fn test_existing_role_rejects_policies() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.parameters.role_create = false;
        cfg.parameters.role_arn = "arn:aws:iam::123:role/existing".to_string();
        cfg.parameters.role_managed_policy_arns = vec!["arn:aws:iam::aws:policy/X".to_string()];
        assert!(validate(&mut cfg).unwrap_err().root_kind().is_cross_constraint());
    }

    #[test]
    fn test_existing_vpc_requires_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.parameters.vpc_create = false;
        assert!(validate(&mut cfg).unwrap_err().to_string().contains("VPCID"));
    }

    #[test]
    fn test_vpc_cidr_requires_every_subnet() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.parameters.vpc_cidr = "192.168.0.0/16".to_string();
        cfg.parameters.public_subnet_cidr_1 = "192.168.64.0/19".to_string();
        assert!(validate(&mut cfg).unwrap_err().root_kind().is_cross_constraint());
    }

    #[test]
    fn test_existing_key_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.remote_access_key_create = false;
        cfg.remote_access_key_name = "mine".to_string();
        cfg.remote_access_private_key_path = join(dir.path(), "missing.pem");
        assert!(validate(&mut cfg).unwrap_err().to_string().contains("does not exist"));

        fs::write(&cfg.remote_access_private_key_path, "key").unwrap();
        validate(&mut cfg).unwrap();
    }

    #[test]
    fn test_generated_key_path_is_in_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.remote_access_private_key_path.clear();
        validate(&mut cfg).unwrap();
        assert!(cfg.remote_access_private_key_path.ends_with(".insecure.key"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(name_from_arn("arn:aws:iam::1:role/a/b"), "b");
        assert_eq!(s3_key("c1/add-on", "/tmp/x/report.tar.gz"), "c1/add-on/report.tar.gz");
        assert!(require_suffix("f", "a.csv", ".csv").is_ok());
        assert!(require_suffix("f", "a.txt", ".csv").is_err());

        let mut ns = String::new();
        default_namespace(&mut ns, AddOnKind::JobsEcho, "c1").unwrap();
        assert_eq!(ns, "c1-jobs-echo");
        let mut ns = "c1".to_string();
        assert!(default_namespace(&mut ns, AddOnKind::JobsEcho, "c1")
            .unwrap_err()
            .is_cross_constraint());
    }
}

// Property-based tests for the validation pipeline
#[cfg(test)]
#[allow(unused_doc_comments)] // proptest! macro doesn't support doc comments
mod property_tests {
    use super::test_support::*;
    use super::*;
    use proptest::prelude::*;

    fn node_group_dependents() -> Vec<AddOnKind> {
        AddOnKind::ALL
            .into_iter()
            .filter(|k| k.requires_node_group())
            .collect()
    }

    fn enable(cfg: &mut Config, kind: AddOnKind) {
        cfg.fill_absent_add_ons();
        let env = crate::config::environment::EnvMap::from([(
            format!("{}ENABLE", kind.env_prefix()),
            "true".to_string(),
        )]);
        crate::config::environment::EnvironmentBinder::apply(cfg, &env).unwrap();
    }

    /// Property: validation is idempotent
    ///
    /// For any accepted tree T, validating T again yields T unchanged.
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn prop_validation_is_idempotent(desired in 1u32..=50, nlb in any::<bool>()) {
            let dir = tempfile::tempdir().unwrap();
            let mut cfg = base_config(dir.path());
            with_mng(&mut cfg, desired);
            if nlb {
                enable(&mut cfg, AddOnKind::NlbHelloWorld);
            }
            validate(&mut cfg).unwrap();
            let once = cfg.clone();
            validate(&mut cfg).unwrap();
            prop_assert_eq!(once, cfg);
        }
    }

    /// Property: NLB and ALB replicas never fall below node-group capacity
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn prop_replicas_follow_desired_capacity(desired in 1u32..=100, replicas in 0u32..=120) {
            let dir = tempfile::tempdir().unwrap();
            let mut cfg = base_config(dir.path());
            with_mng(&mut cfg, desired);
            enable(&mut cfg, AddOnKind::NlbHelloWorld);
            enable(&mut cfg, AddOnKind::Alb2048);
            cfg.add_on_nlb_hello_world.as_mut().unwrap().deployment_replicas = replicas;
            cfg.add_on_alb_2048.as_mut().unwrap().deployment_replicas_alb = replicas;
            validate(&mut cfg).unwrap();

            let nlb = cfg.add_on_nlb_hello_world.as_ref().unwrap();
            let alb = cfg.add_on_alb_2048.as_ref().unwrap();
            prop_assert_eq!(nlb.deployment_replicas, replicas.max(desired));
            prop_assert!(alb.deployment_replicas_alb >= desired);
            prop_assert!(alb.deployment_replicas_2048 >= desired);
        }
    }

    /// Property: add-ons that need workers fail without a node group
    proptest! {
        #[test]
        fn prop_dependents_need_node_group(idx in 0usize..23) {
            let kinds = node_group_dependents();
            let kind = kinds[idx % kinds.len()];
            let dir = tempfile::tempdir().unwrap();
            let mut cfg = base_config(dir.path());
            enable(&mut cfg, kind);
            let err = validate(&mut cfg).unwrap_err();
            prop_assert_eq!(err.step(), Some(kind.step()));
            prop_assert!(err.root_kind().is_cross_constraint(), "{}", err);
        }
    }

    /// Property: version-gated add-ons reject versions below 1.14
    proptest! {
        #[test]
        fn prop_version_gate(minor in 0u32..14, idx in 0usize..4) {
            let kinds = [
                AddOnKind::ManagedNodeGroups,
                AddOnKind::Fargate,
                AddOnKind::Irsa,
                AddOnKind::IrsaFargate,
            ];
            let dir = tempfile::tempdir().unwrap();
            let mut cfg = base_config(dir.path());
            cfg.parameters.version = format!("1.{minor:02}");
            cfg.s3_bucket_name = "bucket".to_string();
            if kinds[idx] == AddOnKind::ManagedNodeGroups {
                with_mng(&mut cfg, 2);
            } else {
                with_ng(&mut cfg, "AL2_x86_64", 2);
                enable(&mut cfg, kinds[idx]);
            }
            let err = validate(&mut cfg).unwrap_err();
            prop_assert_eq!(err.step(), Some(kinds[idx].step()));
            prop_assert!(err.root_kind().is_invariant(), "{}", err);
            prop_assert!(err.to_string().contains("Version"));
        }
    }

    /// Property: m3 and c4 instance types are rejected behind load balancers
    proptest! {
        #[test]
        fn prop_old_instance_types_rejected(
            family in prop::sample::select(vec!["m3", "c4"]),
            size in prop::sample::select(vec!["medium", "large", "xlarge", "2xlarge"]),
            alb in any::<bool>(),
        ) {
            let dir = tempfile::tempdir().unwrap();
            let mut cfg = base_config(dir.path());
            with_mng(&mut cfg, 2);
            cfg.add_on_managed_node_groups
                .as_mut()
                .unwrap()
                .mngs
                .get_mut("c1-mng")
                .unwrap()
                .instance_types = vec![format!("{family}.{size}")];
            enable(&mut cfg, if alb { AddOnKind::Alb2048 } else { AddOnKind::NlbHelloWorld });
            let err = validate(&mut cfg).unwrap_err();
            prop_assert!(err.root_kind().is_cross_constraint());
            let instance_type = format!("{family}.{size}");
            prop_assert!(err.to_string().contains(&instance_type));
        }
    }
}
