//! Root configuration schema.
//!
//! [`Config`] is the persisted document: identity, output paths, tool
//! locations, client tuning, the cluster [`Parameters`], one optional slot per
//! add-on and the read-only [`Status`]. Every record deserializes with
//! defaults so partial documents load.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use super::addons::apps::{
    self, AddOnAppMesh, AddOnCniVpc, AddOnFluentd, AddOnJupyterHub, AddOnKubeflow,
    AddOnKubernetesDashboard, AddOnPrometheusGrafana, AddOnWordpress,
};
use super::addons::identity::{AddOnFargate, AddOnIrsa, AddOnIrsaFargate};
use super::addons::managed_node_groups::{AddOnManagedNodeGroups, Mng};
use super::addons::node_groups::{
    AddOnNodeGroups, Asg, AMI_TYPE_AL2_X86_64, DEFAULT_NODE_INSTANCE_TYPE_CPU,
    DEFAULT_NODE_VOLUME_SIZE, DEFAULT_REMOTE_ACCESS_USER_NAME,
};
use super::addons::testing::{
    self, AddOnClusterLoader, AddOnClusterLoaderRemote, AddOnClusterVersionUpgrade,
    AddOnConformance, AddOnHollowNodesLocal, AddOnHollowNodesRemote,
};
use super::addons::workloads::{
    self, AddOnAlb2048, AddOnAmiSoftLockupIssue454, AddOnConfigMaps, AddOnCronJobs, AddOnCsiEbs,
    AddOnCsrs, AddOnJobsEcho, AddOnJobsPi, AddOnNlbGuestbook, AddOnNlbHelloWorld, AddOnPhpApache,
    AddOnSecrets,
};
use super::addons::AddOnKind;
use super::status::Status;
use crate::duration;
use crate::random::rand_string;

/// Prefix of every root environment key.
pub const ENV_PREFIX: &str = "AWS_K8S_TESTER_EKS_";
/// Prefix of the [`Parameters`] environment keys.
pub const ENV_PREFIX_PARAMETERS: &str = "AWS_K8S_TESTER_EKS_PARAMETERS_";
/// Environment key holding a whole YAML document merged before the per-field overlay.
pub const ENV_CONFIG: &str = "AWS_K8S_TESTER_EKS_CONFIG";

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-west-2";
/// Kubernetes version used when none is configured.
pub const DEFAULT_VERSION: &str = "1.15";
/// Default SigV4 signing name for the EKS API.
pub const DEFAULT_SIGNING_NAME: &str = "eks";

/// Default kubectl binary location.
pub const DEFAULT_KUBECTL_PATH: &str = "/tmp/kubectl-test-v1.16.9";
/// Default kubectl download URL.
pub const DEFAULT_KUBECTL_DOWNLOAD_URL: &str =
    "https://storage.googleapis.com/kubernetes-release/release/v1.16.9/bin/linux/amd64/kubectl";

/// Default number of API clients.
pub const DEFAULT_CLIENTS: u32 = 3;
/// Default client queries per second.
pub const DEFAULT_CLIENT_QPS: f32 = 5.0;
/// Default client burst.
pub const DEFAULT_CLIENT_BURST: u32 = 10;
/// Default client timeout.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout of the post-create commands.
pub const DEFAULT_COMMAND_AFTER_CREATE_TIMEOUT: Duration = Duration::from_secs(180);

/// Operating system name as it appears in download URLs.
///
/// Release artifacts say `darwin` where Rust says `macos`.
#[must_use]
pub fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Cluster-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct Parameters {
    /// Kubernetes version, e.g. `1.15`.
    pub version: String,
    /// [`Parameters::version`] parsed.
    pub version_value: f64,

    pub role_create: bool,
    pub role_name: String,
    pub role_arn: String,
    pub role_service_principals: Vec<String>,
    pub role_managed_policy_arns: Vec<String>,
    pub role_cfn_stack_id: String,

    pub tags: BTreeMap<String, String>,
    pub request_header_key: String,
    pub request_header_value: String,
    pub resolver_url: String,
    pub signing_name: String,

    pub vpc_create: bool,
    pub vpc_id: String,
    pub vpc_cfn_stack_id: String,
    pub vpc_cidr: String,
    pub public_subnet_cidr_1: String,
    pub public_subnet_cidr_2: String,
    pub public_subnet_cidr_3: String,
    pub private_subnet_cidr_1: String,
    pub private_subnet_cidr_2: String,
    pub public_subnet_ids: Vec<String>,
    pub private_subnet_ids: Vec<String>,
    pub dhcp_options_domain_name: String,
    pub dhcp_options_domain_name_servers: Vec<String>,
    pub control_plane_security_group_id: String,

    pub encryption_cmk_create: bool,
    pub encryption_cmk_arn: String,
}

/// The root configuration document.
///
/// # Examples
///
/// ```
/// use eksconfig::Config;
///
/// let cfg = Config::new_default();
/// assert_eq!(cfg.region, "us-west-2");
/// assert!(cfg.add_on_node_groups.is_some());
/// assert!(!cfg.is_enabled(eksconfig::config::addons::AddOnKind::NodeGroups));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Absolute path of this document.
    pub config_path: String,
    /// Script of reproducible kubectl commands; must end in `.sh`.
    pub kubectl_commands_output_path: String,
    /// Script of SSH commands for every worker; must end in `.sh`.
    pub remote_access_commands_output_path: String,

    /// AWS region; must be one of [`crate::regions::all`].
    pub region: String,
    /// Cluster name, lower-case.
    pub name: String,

    /// One of the [`crate::LogLevel`] names.
    pub log_level: String,
    /// Log sinks: `stderr`, `stdout` or file paths.
    pub log_outputs: Vec<String>,

    /// AWS CLI binary.
    pub aws_cli_path: String,
    /// kubectl binary.
    pub kubectl_path: String,
    /// kubectl download URL; must match the host OS.
    pub kubectl_download_url: String,
    /// Kubeconfig written for the cluster.
    pub kubeconfig_path: String,

    /// Shell command run after the cluster is created.
    pub command_after_create_cluster: String,
    #[allow(missing_docs)]
    pub command_after_create_cluster_output_path: String,
    #[allow(missing_docs)]
    #[serde(with = "duration::nanos")]
    pub command_after_create_cluster_timeout: Duration,
    #[allow(missing_docs)]
    pub command_after_create_cluster_timeout_string: String,
    /// Shell command run after every add-on is installed.
    pub command_after_create_add_ons: String,
    #[allow(missing_docs)]
    pub command_after_create_add_ons_output_path: String,
    #[allow(missing_docs)]
    #[serde(with = "duration::nanos")]
    pub command_after_create_add_ons_timeout: Duration,
    #[allow(missing_docs)]
    pub command_after_create_add_ons_timeout_string: String,

    /// Tear everything down when creation fails.
    pub on_failure_delete: bool,
    /// Delay before the teardown.
    pub on_failure_delete_wait_seconds: u64,

    /// Create the artifact bucket.
    pub s3_bucket_create: bool,
    #[allow(missing_docs)]
    pub s3_bucket_name: String,
    /// Object expiration; 1 and 2 are raised to 3.
    pub s3_bucket_lifecycle_expiration_days: i64,

    /// Create the SSH key pair.
    pub remote_access_key_create: bool,
    #[allow(missing_docs)]
    pub remote_access_key_name: String,
    #[allow(missing_docs)]
    pub remote_access_private_key_path: String,

    /// Number of concurrent API clients.
    pub clients: u32,
    #[allow(missing_docs)]
    pub client_qps: f32,
    #[allow(missing_docs)]
    pub client_burst: u32,
    #[allow(missing_docs)]
    #[serde(with = "duration::nanos")]
    pub client_timeout: Duration,
    #[allow(missing_docs)]
    pub client_timeout_string: String,

    /// Cluster-wide settings.
    pub parameters: Parameters,

    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_node_groups: Option<AddOnNodeGroups>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_managed_node_groups: Option<AddOnManagedNodeGroups>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_csi_ebs: Option<AddOnCsiEbs>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_nlb_hello_world: Option<AddOnNlbHelloWorld>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_nlb_guestbook: Option<AddOnNlbGuestbook>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_alb_2048: Option<AddOnAlb2048>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_jobs_pi: Option<AddOnJobsPi>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_jobs_echo: Option<AddOnJobsEcho>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_cron_jobs: Option<AddOnCronJobs>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_csrs: Option<AddOnCsrs>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_config_maps: Option<AddOnConfigMaps>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_secrets: Option<AddOnSecrets>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_irsa: Option<AddOnIrsa>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_fargate: Option<AddOnFargate>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_irsa_fargate: Option<AddOnIrsaFargate>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_app_mesh: Option<AddOnAppMesh>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_kubernetes_dashboard: Option<AddOnKubernetesDashboard>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_prometheus_grafana: Option<AddOnPrometheusGrafana>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_wordpress: Option<AddOnWordpress>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_jupyter_hub: Option<AddOnJupyterHub>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_kubeflow: Option<AddOnKubeflow>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_cluster_loader: Option<AddOnClusterLoader>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_cluster_loader_remote: Option<AddOnClusterLoaderRemote>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_conformance: Option<AddOnConformance>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_cni_vpc: Option<AddOnCniVpc>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_fluentd: Option<AddOnFluentd>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_hollow_nodes_local: Option<AddOnHollowNodesLocal>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_hollow_nodes_remote: Option<AddOnHollowNodesRemote>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_php_apache: Option<AddOnPhpApache>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_ami_soft_lockup_issue_454: Option<AddOnAmiSoftLockupIssue454>,
    #[allow(missing_docs)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_on_cluster_version_upgrade: Option<AddOnClusterVersionUpgrade>,

    /// Provisioner-owned state.
    pub status: Status,
}

impl Config {
    /// Builds the default configuration using the thread RNG.
    #[must_use]
    pub fn new_default() -> Self {
        Self::new_default_with(&mut rand::thread_rng())
    }

    /// Builds the default configuration, drawing random names from `rng`.
    ///
    /// Every add-on slot is present and disabled. The cluster name comes from
    /// `AWS_K8S_TESTER_EKS_NAME` when set.
    #[must_use]
    pub fn new_default_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let name = match std::env::var(format!("{ENV_PREFIX}NAME")) {
            Ok(name) if !name.is_empty() => name,
            _ => format!("eks-{}-{}", Utc::now().format("%Y%m%d%H"), rand_string(rng, 12)),
        };

        let mut cfg = Self {
            region: DEFAULT_REGION.to_string(),
            log_level: crate::logging::DEFAULT_LOG_LEVEL.to_string(),
            log_outputs: vec!["stderr".to_string()],
            aws_cli_path: find_in_path("aws")
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            kubectl_path: DEFAULT_KUBECTL_PATH.to_string(),
            kubectl_download_url: DEFAULT_KUBECTL_DOWNLOAD_URL.to_string(),
            on_failure_delete: true,
            on_failure_delete_wait_seconds: 120,
            remote_access_key_create: true,
            remote_access_private_key_path: home::home_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(".ssh")
                .join("kube_aws_rsa")
                .display()
                .to_string(),
            clients: DEFAULT_CLIENTS,
            client_qps: DEFAULT_CLIENT_QPS,
            client_burst: DEFAULT_CLIENT_BURST,
            parameters: Parameters {
                version: DEFAULT_VERSION.to_string(),
                role_create: true,
                vpc_create: true,
                encryption_cmk_create: true,
                signing_name: DEFAULT_SIGNING_NAME.to_string(),
                ..Parameters::default()
            },
            add_on_node_groups: Some(default_node_groups(&name)),
            add_on_managed_node_groups: Some(default_managed_node_groups(&name)),
            add_on_csi_ebs: Some(AddOnCsiEbs {
                chart_repo_url: workloads::DEFAULT_CSI_EBS_CHART_REPO_URL.to_string(),
                ..AddOnCsiEbs::default()
            }),
            add_on_nlb_hello_world: Some(AddOnNlbHelloWorld {
                deployment_replicas: 3,
                ..AddOnNlbHelloWorld::default()
            }),
            add_on_nlb_guestbook: Some(AddOnNlbGuestbook {
                deployment_replicas: 3,
                ..AddOnNlbGuestbook::default()
            }),
            add_on_alb_2048: Some(AddOnAlb2048 {
                deployment_replicas_alb: 3,
                deployment_replicas_2048: 3,
                ..AddOnAlb2048::default()
            }),
            add_on_jobs_pi: Some(AddOnJobsPi {
                completes: 30,
                parallels: 10,
                ..AddOnJobsPi::default()
            }),
            add_on_jobs_echo: Some(AddOnJobsEcho {
                completes: 10,
                parallels: 10,
                echo_size: 100 * 1024,
                ..AddOnJobsEcho::default()
            }),
            add_on_cron_jobs: Some(AddOnCronJobs {
                schedule: "*/10 * * * *".to_string(),
                completes: 10,
                parallels: 10,
                successful_jobs_history_limit: 3,
                failed_jobs_history_limit: 1,
                echo_size: 100 * 1024,
                ..AddOnCronJobs::default()
            }),
            add_on_csrs: Some(AddOnCsrs {
                objects: 10,
                ..AddOnCsrs::default()
            }),
            add_on_config_maps: Some(AddOnConfigMaps {
                objects: 10,
                size: 10 * 1024,
                ..AddOnConfigMaps::default()
            }),
            add_on_secrets: Some(AddOnSecrets {
                objects: 10,
                size: 10 * 1024,
                ..AddOnSecrets::default()
            }),
            add_on_irsa: Some(AddOnIrsa {
                deployment_replicas: 10,
                ..AddOnIrsa::default()
            }),
            add_on_fargate: Some(AddOnFargate {
                role_create: true,
                ..AddOnFargate::default()
            }),
            add_on_irsa_fargate: Some(AddOnIrsaFargate::default()),
            add_on_app_mesh: Some(AddOnAppMesh::default()),
            add_on_kubernetes_dashboard: Some(AddOnKubernetesDashboard {
                url: apps::DEFAULT_KUBERNETES_DASHBOARD_URL.to_string(),
                ..AddOnKubernetesDashboard::default()
            }),
            add_on_prometheus_grafana: Some(AddOnPrometheusGrafana {
                grafana_admin_user_name: "admin".to_string(),
                ..AddOnPrometheusGrafana::default()
            }),
            add_on_wordpress: Some(AddOnWordpress {
                user_name: "user".to_string(),
                ..AddOnWordpress::default()
            }),
            add_on_jupyter_hub: Some(AddOnJupyterHub::default()),
            add_on_kubeflow: Some(AddOnKubeflow {
                kfctl_path: apps::DEFAULT_KFCTL_PATH.to_string(),
                kfctl_download_url: apps::DEFAULT_KFCTL_DOWNLOAD_URL.to_string(),
                ..AddOnKubeflow::default()
            }),
            add_on_cluster_loader: Some(AddOnClusterLoader::default()),
            add_on_cluster_loader_remote: Some(default_cluster_loader_remote()),
            add_on_conformance: Some(AddOnConformance {
                sonobuoy_path: testing::DEFAULT_SONOBUOY_PATH.to_string(),
                sonobuoy_download_url: testing::DEFAULT_SONOBUOY_DOWNLOAD_URL.to_string(),
                ..AddOnConformance::default()
            }),
            add_on_cni_vpc: Some(AddOnCniVpc {
                version: apps::CNI_VPC_VERSION.to_string(),
                node_selector: BTreeMap::from([("NodeType".to_string(), "regular".to_string())]),
                ..AddOnCniVpc::default()
            }),
            add_on_fluentd: Some(default_fluentd()),
            add_on_hollow_nodes_local: Some(AddOnHollowNodesLocal {
                nodes: 2,
                node_name_prefix: format!("hollow{}", rand_string(rng, 5)),
                max_open_files: 1_000_000,
                ..AddOnHollowNodesLocal::default()
            }),
            add_on_hollow_nodes_remote: Some(AddOnHollowNodesRemote {
                nodes: 2,
                deployment_replicas: 5,
                max_open_files: 1_000_000,
                ..AddOnHollowNodesRemote::default()
            }),
            add_on_php_apache: Some(AddOnPhpApache {
                deployment_replicas: 3,
                ..AddOnPhpApache::default()
            }),
            add_on_ami_soft_lockup_issue_454: Some(AddOnAmiSoftLockupIssue454 {
                deployment_replicas: 50,
                ..AddOnAmiSoftLockupIssue454::default()
            }),
            add_on_cluster_version_upgrade: Some(AddOnClusterVersionUpgrade::default()),
            name,
            ..Self::default()
        };

        let os = host_os();
        if os != "linux" {
            cfg.kubectl_download_url = cfg.kubectl_download_url.replace("linux", os);
            for url in [
                cfg.add_on_kubeflow.as_mut().map(|a| &mut a.kfctl_download_url),
                cfg.add_on_cluster_loader_remote
                    .as_mut()
                    .map(|a| &mut a.cluster_loader_download_url),
                cfg.add_on_conformance.as_mut().map(|a| &mut a.sonobuoy_download_url),
            ]
            .into_iter()
            .flatten()
            {
                *url = url.replace("linux", os);
            }
        }
        if os == "darwin" {
            cfg.remote_access_private_key_path = std::env::temp_dir()
                .join(format!("{}.insecure.key", rand_string(rng, 10)))
                .display()
                .to_string();
        }

        cfg
    }

    /// Whether the add-on in slot `kind` is present and enabled.
    ///
    /// Node-group slots also need at least one group.
    #[must_use]
    pub fn is_enabled(&self, kind: AddOnKind) -> bool {
        fn on<T>(slot: Option<&T>, enable: impl Fn(&T) -> bool) -> bool {
            slot.is_some_and(enable)
        }
        match kind {
            AddOnKind::NodeGroups => on(self.add_on_node_groups.as_ref(), AddOnNodeGroups::is_active),
            AddOnKind::ManagedNodeGroups => on(
                self.add_on_managed_node_groups.as_ref(),
                AddOnManagedNodeGroups::is_active,
            ),
            AddOnKind::CsiEbs => on(self.add_on_csi_ebs.as_ref(), |a| a.enable),
            AddOnKind::NlbHelloWorld => on(self.add_on_nlb_hello_world.as_ref(), |a| a.enable),
            AddOnKind::NlbGuestbook => on(self.add_on_nlb_guestbook.as_ref(), |a| a.enable),
            AddOnKind::Alb2048 => on(self.add_on_alb_2048.as_ref(), |a| a.enable),
            AddOnKind::JobsPi => on(self.add_on_jobs_pi.as_ref(), |a| a.enable),
            AddOnKind::JobsEcho => on(self.add_on_jobs_echo.as_ref(), |a| a.enable),
            AddOnKind::CronJobs => on(self.add_on_cron_jobs.as_ref(), |a| a.enable),
            AddOnKind::Csrs => on(self.add_on_csrs.as_ref(), |a| a.enable),
            AddOnKind::ConfigMaps => on(self.add_on_config_maps.as_ref(), |a| a.enable),
            AddOnKind::Secrets => on(self.add_on_secrets.as_ref(), |a| a.enable),
            AddOnKind::Irsa => on(self.add_on_irsa.as_ref(), |a| a.enable),
            AddOnKind::Fargate => on(self.add_on_fargate.as_ref(), |a| a.enable),
            AddOnKind::IrsaFargate => on(self.add_on_irsa_fargate.as_ref(), |a| a.enable),
            AddOnKind::AppMesh => on(self.add_on_app_mesh.as_ref(), |a| a.enable),
            AddOnKind::KubernetesDashboard => {
                on(self.add_on_kubernetes_dashboard.as_ref(), |a| a.enable)
            }
            AddOnKind::PrometheusGrafana => {
                on(self.add_on_prometheus_grafana.as_ref(), |a| a.enable)
            }
            AddOnKind::Wordpress => on(self.add_on_wordpress.as_ref(), |a| a.enable),
            AddOnKind::JupyterHub => on(self.add_on_jupyter_hub.as_ref(), |a| a.enable),
            AddOnKind::Kubeflow => on(self.add_on_kubeflow.as_ref(), |a| a.enable),
            AddOnKind::ClusterLoader => on(self.add_on_cluster_loader.as_ref(), |a| a.enable),
            AddOnKind::ClusterLoaderRemote => {
                on(self.add_on_cluster_loader_remote.as_ref(), |a| a.enable)
            }
            AddOnKind::Conformance => on(self.add_on_conformance.as_ref(), |a| a.enable),
            AddOnKind::CniVpc => on(self.add_on_cni_vpc.as_ref(), |a| a.enable),
            AddOnKind::Fluentd => on(self.add_on_fluentd.as_ref(), |a| a.enable),
            AddOnKind::HollowNodesLocal => {
                on(self.add_on_hollow_nodes_local.as_ref(), |a| a.enable)
            }
            AddOnKind::HollowNodesRemote => {
                on(self.add_on_hollow_nodes_remote.as_ref(), |a| a.enable)
            }
            AddOnKind::PhpApache => on(self.add_on_php_apache.as_ref(), |a| a.enable),
            AddOnKind::AmiSoftLockupIssue454 => {
                on(self.add_on_ami_soft_lockup_issue_454.as_ref(), |a| a.enable)
            }
            AddOnKind::ClusterVersionUpgrade => {
                on(self.add_on_cluster_version_upgrade.as_ref(), |a| a.enable)
            }
        }
    }

    /// Whether the slot `kind` holds a record at all.
    #[must_use]
    pub fn is_present(&self, kind: AddOnKind) -> bool {
        match kind {
            AddOnKind::NodeGroups => self.add_on_node_groups.is_some(),
            AddOnKind::ManagedNodeGroups => self.add_on_managed_node_groups.is_some(),
            AddOnKind::CsiEbs => self.add_on_csi_ebs.is_some(),
            AddOnKind::NlbHelloWorld => self.add_on_nlb_hello_world.is_some(),
            AddOnKind::NlbGuestbook => self.add_on_nlb_guestbook.is_some(),
            AddOnKind::Alb2048 => self.add_on_alb_2048.is_some(),
            AddOnKind::JobsPi => self.add_on_jobs_pi.is_some(),
            AddOnKind::JobsEcho => self.add_on_jobs_echo.is_some(),
            AddOnKind::CronJobs => self.add_on_cron_jobs.is_some(),
            AddOnKind::Csrs => self.add_on_csrs.is_some(),
            AddOnKind::ConfigMaps => self.add_on_config_maps.is_some(),
            AddOnKind::Secrets => self.add_on_secrets.is_some(),
            AddOnKind::Irsa => self.add_on_irsa.is_some(),
            AddOnKind::Fargate => self.add_on_fargate.is_some(),
            AddOnKind::IrsaFargate => self.add_on_irsa_fargate.is_some(),
            AddOnKind::AppMesh => self.add_on_app_mesh.is_some(),
            AddOnKind::KubernetesDashboard => self.add_on_kubernetes_dashboard.is_some(),
            AddOnKind::PrometheusGrafana => self.add_on_prometheus_grafana.is_some(),
            AddOnKind::Wordpress => self.add_on_wordpress.is_some(),
            AddOnKind::JupyterHub => self.add_on_jupyter_hub.is_some(),
            AddOnKind::Kubeflow => self.add_on_kubeflow.is_some(),
            AddOnKind::ClusterLoader => self.add_on_cluster_loader.is_some(),
            AddOnKind::ClusterLoaderRemote => self.add_on_cluster_loader_remote.is_some(),
            AddOnKind::Conformance => self.add_on_conformance.is_some(),
            AddOnKind::CniVpc => self.add_on_cni_vpc.is_some(),
            AddOnKind::Fluentd => self.add_on_fluentd.is_some(),
            AddOnKind::HollowNodesLocal => self.add_on_hollow_nodes_local.is_some(),
            AddOnKind::HollowNodesRemote => self.add_on_hollow_nodes_remote.is_some(),
            AddOnKind::PhpApache => self.add_on_php_apache.is_some(),
            AddOnKind::AmiSoftLockupIssue454 => self.add_on_ami_soft_lockup_issue_454.is_some(),
            AddOnKind::ClusterVersionUpgrade => self.add_on_cluster_version_upgrade.is_some(),
        }
    }

    /// Empties the slot `kind`.
    pub fn clear(&mut self, kind: AddOnKind) {
        match kind {
            AddOnKind::NodeGroups => self.add_on_node_groups = None,
            AddOnKind::ManagedNodeGroups => self.add_on_managed_node_groups = None,
            AddOnKind::CsiEbs => self.add_on_csi_ebs = None,
            AddOnKind::NlbHelloWorld => self.add_on_nlb_hello_world = None,
            AddOnKind::NlbGuestbook => self.add_on_nlb_guestbook = None,
            AddOnKind::Alb2048 => self.add_on_alb_2048 = None,
            AddOnKind::JobsPi => self.add_on_jobs_pi = None,
            AddOnKind::JobsEcho => self.add_on_jobs_echo = None,
            AddOnKind::CronJobs => self.add_on_cron_jobs = None,
            AddOnKind::Csrs => self.add_on_csrs = None,
            AddOnKind::ConfigMaps => self.add_on_config_maps = None,
            AddOnKind::Secrets => self.add_on_secrets = None,
            AddOnKind::Irsa => self.add_on_irsa = None,
            AddOnKind::Fargate => self.add_on_fargate = None,
            AddOnKind::IrsaFargate => self.add_on_irsa_fargate = None,
            AddOnKind::AppMesh => self.add_on_app_mesh = None,
            AddOnKind::KubernetesDashboard => self.add_on_kubernetes_dashboard = None,
            AddOnKind::PrometheusGrafana => self.add_on_prometheus_grafana = None,
            AddOnKind::Wordpress => self.add_on_wordpress = None,
            AddOnKind::JupyterHub => self.add_on_jupyter_hub = None,
            AddOnKind::Kubeflow => self.add_on_kubeflow = None,
            AddOnKind::ClusterLoader => self.add_on_cluster_loader = None,
            AddOnKind::ClusterLoaderRemote => self.add_on_cluster_loader_remote = None,
            AddOnKind::Conformance => self.add_on_conformance = None,
            AddOnKind::CniVpc => self.add_on_cni_vpc = None,
            AddOnKind::Fluentd => self.add_on_fluentd = None,
            AddOnKind::HollowNodesLocal => self.add_on_hollow_nodes_local = None,
            AddOnKind::HollowNodesRemote => self.add_on_hollow_nodes_remote = None,
            AddOnKind::PhpApache => self.add_on_php_apache = None,
            AddOnKind::AmiSoftLockupIssue454 => self.add_on_ami_soft_lockup_issue_454 = None,
            AddOnKind::ClusterVersionUpgrade => self.add_on_cluster_version_upgrade = None,
        }
    }

    /// Fills every empty slot with a zero-valued, disabled record.
    pub fn fill_absent_add_ons(&mut self) {
        self.add_on_node_groups.get_or_insert_with(Default::default);
        self.add_on_managed_node_groups.get_or_insert_with(Default::default);
        self.add_on_csi_ebs.get_or_insert_with(Default::default);
        self.add_on_nlb_hello_world.get_or_insert_with(Default::default);
        self.add_on_nlb_guestbook.get_or_insert_with(Default::default);
        self.add_on_alb_2048.get_or_insert_with(Default::default);
        self.add_on_jobs_pi.get_or_insert_with(Default::default);
        self.add_on_jobs_echo.get_or_insert_with(Default::default);
        self.add_on_cron_jobs.get_or_insert_with(Default::default);
        self.add_on_csrs.get_or_insert_with(Default::default);
        self.add_on_config_maps.get_or_insert_with(Default::default);
        self.add_on_secrets.get_or_insert_with(Default::default);
        self.add_on_irsa.get_or_insert_with(Default::default);
        self.add_on_fargate.get_or_insert_with(Default::default);
        self.add_on_irsa_fargate.get_or_insert_with(Default::default);
        self.add_on_app_mesh.get_or_insert_with(Default::default);
        self.add_on_kubernetes_dashboard.get_or_insert_with(Default::default);
        self.add_on_prometheus_grafana.get_or_insert_with(Default::default);
        self.add_on_wordpress.get_or_insert_with(Default::default);
        self.add_on_jupyter_hub.get_or_insert_with(Default::default);
        self.add_on_kubeflow.get_or_insert_with(Default::default);
        self.add_on_cluster_loader.get_or_insert_with(Default::default);
        self.add_on_cluster_loader_remote.get_or_insert_with(Default::default);
        self.add_on_conformance.get_or_insert_with(Default::default);
        self.add_on_cni_vpc.get_or_insert_with(Default::default);
        self.add_on_fluentd.get_or_insert_with(Default::default);
        self.add_on_hollow_nodes_local.get_or_insert_with(Default::default);
        self.add_on_hollow_nodes_remote.get_or_insert_with(Default::default);
        self.add_on_php_apache.get_or_insert_with(Default::default);
        self.add_on_ami_soft_lockup_issue_454.get_or_insert_with(Default::default);
        self.add_on_cluster_version_upgrade.get_or_insert_with(Default::default);
    }

    /// Whether any self-managed or managed node group is enabled.
    #[must_use]
    pub fn any_node_group_enabled(&self) -> bool {
        self.is_enabled(AddOnKind::NodeGroups) || self.is_enabled(AddOnKind::ManagedNodeGroups)
    }

    /// Directory holding [`Config::config_path`].
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        PathBuf::from(&self.config_path)
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default()
    }

    /// [`Config::config_path`] without its `.yaml` suffix, the stem of every
    /// derived output path.
    #[must_use]
    pub fn config_base(&self) -> String {
        self.config_path.replace(".yaml", "")
    }
}

fn default_node_groups(name: &str) -> AddOnNodeGroups {
    let asg_name = format!("{name}-ng-asg-cpu");
    let asg = Asg {
        name: asg_name.clone(),
        remote_access_user_name: DEFAULT_REMOTE_ACCESS_USER_NAME.to_string(),
        ami_type: AMI_TYPE_AL2_X86_64.to_string(),
        image_id_ssm_parameter: "/aws/service/eks/optimized-ami/1.15/amazon-linux-2/recommended/image_id"
            .to_string(),
        asg_min_size: 1,
        asg_max_size: 1,
        asg_desired_capacity: 1,
        instance_types: vec![DEFAULT_NODE_INSTANCE_TYPE_CPU.to_string()],
        volume_size: DEFAULT_NODE_VOLUME_SIZE,
        ..Asg::default()
    };
    AddOnNodeGroups {
        fetch_logs: true,
        role_create: true,
        asgs: BTreeMap::from([(asg_name, asg)]),
        ..AddOnNodeGroups::default()
    }
}

fn default_managed_node_groups(name: &str) -> AddOnManagedNodeGroups {
    let mng_name = format!("{name}-mng-cpu");
    let mng = Mng {
        name: mng_name.clone(),
        remote_access_user_name: DEFAULT_REMOTE_ACCESS_USER_NAME.to_string(),
        ami_type: AMI_TYPE_AL2_X86_64.to_string(),
        asg_min_size: 2,
        asg_max_size: 2,
        asg_desired_capacity: 2,
        instance_types: vec![DEFAULT_NODE_INSTANCE_TYPE_CPU.to_string()],
        volume_size: DEFAULT_NODE_VOLUME_SIZE,
        ..Mng::default()
    };
    AddOnManagedNodeGroups {
        fetch_logs: true,
        role_create: true,
        signing_name: DEFAULT_SIGNING_NAME.to_string(),
        mngs: BTreeMap::from([(mng_name, mng)]),
        ..AddOnManagedNodeGroups::default()
    }
}

fn default_cluster_loader_remote() -> AddOnClusterLoaderRemote {
    AddOnClusterLoaderRemote {
        cluster_loader_path: testing::DEFAULT_CLUSTER_LOADER_PATH.to_string(),
        cluster_loader_download_url: testing::DEFAULT_CLUSTER_LOADER_DOWNLOAD_URL.to_string(),
        runs: 2,
        timeout: Duration::from_secs(30 * 60),
        nodes: 10,
        nodes_per_namespace: 10,
        pods_per_node: 10,
        big_group_size: 25,
        medium_group_size: 10,
        small_group_size: 5,
        cl2_load_test_throughput: testing::DEFAULT_CL2_LOAD_TEST_THROUGHPUT,
        ..AddOnClusterLoaderRemote::default()
    }
}

fn default_fluentd() -> AddOnFluentd {
    AddOnFluentd {
        threads: 8,
        metadata_log_level: "warn".to_string(),
        metadata_cache_size: 20_000,
        metadata_skip_labels: true,
        metadata_skip_master_url: true,
        metadata_skip_container_metadata: true,
        metadata_skip_namespace_metadata: true,
        ..AddOnFluentd::default()
    }
}

/// First executable named `binary` on `PATH`.
fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}
