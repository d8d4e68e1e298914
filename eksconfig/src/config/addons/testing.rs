//! Scale, conformance and upgrade test drivers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::timeframe::TimeFrame;
use crate::duration;

/// Default local clusterloader2 binary.
pub const DEFAULT_CLUSTER_LOADER_PATH: &str = "/tmp/clusterloader2";
/// Default clusterloader2 release binary.
pub const DEFAULT_CLUSTER_LOADER_DOWNLOAD_URL: &str =
    "https://github.com/aws/aws-k8s-tester/releases/download/v1.5.0/clusterloader2-linux-amd64";
/// Load-test throughput used when none is configured.
pub const DEFAULT_CL2_LOAD_TEST_THROUGHPUT: u32 = 20;

/// Default sonobuoy binary location.
pub const DEFAULT_SONOBUOY_PATH: &str = "/tmp/sonobuoy";
/// Default sonobuoy release archive.
pub const DEFAULT_SONOBUOY_DOWNLOAD_URL: &str =
    "https://github.com/vmware-tanzu/sonobuoy/releases/download/v0.56.16/sonobuoy_0.56.16_linux_amd64.tar.gz";
/// Accepted values of [`AddOnConformance::sonobuoy_run_mode`].
pub const SONOBUOY_RUN_MODES: &[&str] = &["non-disruptive-conformance", "quick", "certified-conformance"];
/// Run mode used when none is configured.
pub const DEFAULT_SONOBUOY_RUN_MODE: &str = "certified-conformance";

/// Longest node label prefix that still yields valid label values.
pub const HOLLOW_NODE_LABEL_PREFIX_MAX: usize = 55;

/// clusterloader2 run from the local host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnClusterLoader {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    #[serde(with = "duration::nanos")]
    pub duration: Duration,
    pub duration_string: String,
}

/// clusterloader2 run from a pod inside the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnClusterLoaderRemote {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub s3_dir: String,
    pub namespace: String,

    pub repository_account_id: String,
    pub repository_region: String,
    pub repository_name: String,
    pub repository_image_tag: String,

    pub cluster_loader_path: String,
    pub cluster_loader_download_url: String,

    pub report_tar_gz_path: String,
    pub report_tar_gz_s3_key: String,
    pub log_path: String,
    pub log_s3_key: String,
    pub pod_startup_latency_path: String,
    pub pod_startup_latency_s3_key: String,

    pub runs: u32,
    #[serde(with = "duration::nanos")]
    pub timeout: Duration,
    pub timeout_string: String,
    pub nodes: u32,

    pub nodes_per_namespace: u32,
    pub pods_per_node: u32,
    pub big_group_size: u32,
    pub medium_group_size: u32,
    pub small_group_size: u32,
    pub small_stateful_sets_per_namespace: u32,
    pub medium_stateful_sets_per_namespace: u32,

    pub cl2_use_host_network_pods: bool,
    pub cl2_load_test_throughput: u32,
    pub cl2_enable_pvs: bool,
    /// Not supported; must stay false.
    pub prometheus_scrape_kube_proxy: bool,
    /// Not supported; must stay false.
    pub enable_system_pod_metrics: bool,
}

/// Sonobuoy conformance run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnConformance {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub s3_dir: String,
    pub namespace: String,

    pub sonobuoy_path: String,
    pub sonobuoy_download_url: String,
    pub sonobuoy_e2e_repo_config: String,
    pub sonobuoy_image: String,
    pub systemd_logs_image: String,

    #[serde(with = "duration::nanos")]
    pub sonobuoy_delete_timeout: Duration,
    pub sonobuoy_delete_timeout_string: String,
    #[serde(with = "duration::nanos")]
    pub sonobuoy_run_timeout: Duration,
    pub sonobuoy_run_timeout_string: String,

    /// One of [`SONOBUOY_RUN_MODES`].
    pub sonobuoy_run_mode: String,
    pub sonobuoy_run_kube_conformance_image: String,
    pub sonobuoy_run_e2e_focus: String,
    pub sonobuoy_run_e2e_skip: String,

    pub sonobuoy_result_tar_gz_path: String,
    pub sonobuoy_result_tar_gz_s3_key: String,
    pub sonobuoy_result_dir: String,
    pub sonobuoy_result_e2e_log_path: String,
    pub sonobuoy_result_e2e_log_s3_key: String,
    pub sonobuoy_result_junit_xml_path: String,
    pub sonobuoy_result_junit_xml_s3_key: String,
}

/// Hollow (kubemark) nodes run as local processes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnHollowNodesLocal {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub nodes: u32,
    pub node_name_prefix: String,
    /// At most [`HOLLOW_NODE_LABEL_PREFIX_MAX`] characters.
    pub node_label_prefix: String,
    pub node_labels: BTreeMap<String, String>,
    pub max_open_files: u64,
    pub created_node_names: Vec<String>,
}

/// Hollow nodes run as a deployment inside the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnHollowNodesRemote {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,

    pub repository_account_id: String,
    pub repository_name: String,
    /// Must contain [`AddOnHollowNodesRemote::repository_account_id`].
    pub repository_uri: String,
    pub repository_image_tag: String,

    pub nodes: u32,
    pub deployment_replicas: u32,
    pub node_label_prefix: String,
    pub node_labels: BTreeMap<String, String>,
    pub max_open_files: u64,
    pub created_node_names: Vec<String>,
}

/// One-minor control plane upgrade after the add-ons are installed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnClusterVersionUpgrade {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    #[serde(with = "duration::nanos")]
    pub wait_before_upgrade: Duration,
    pub wait_before_upgrade_string: String,
    /// Target version, e.g. `1.16`.
    pub version: String,
    pub version_value: f64,
}
