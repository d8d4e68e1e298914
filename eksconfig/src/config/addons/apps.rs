//! Application stacks and cluster plumbing installed on top of the workers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::timeframe::TimeFrame;

/// Namespace App Mesh is always installed into.
pub const APP_MESH_NAMESPACE: &str = "appmesh-system";

/// Proxy URL of the dashboard login page.
pub const DEFAULT_KUBERNETES_DASHBOARD_URL: &str =
    "http://localhost:8001/api/v1/namespaces/kubernetes-dashboard/services/https:kubernetes-dashboard:/proxy/#/login";

/// Default kfctl binary location.
pub const DEFAULT_KFCTL_PATH: &str = "/tmp/kfctl-test-v1.0.2";
/// Default kfctl release archive.
pub const DEFAULT_KFCTL_DOWNLOAD_URL: &str =
    "https://github.com/kubeflow/kfctl/releases/download/v1.0.2/kfctl_v1.0.2-0-ga476281_linux.tar.gz";

/// The only CNI release the add-on knows how to install.
pub const CNI_VPC_VERSION: &str = "v1.7";

/// Length in bytes of the generated JupyterHub proxy token, before hex encoding.
pub const JUPYTER_HUB_PROXY_SECRET_TOKEN_BYTES: usize = 32;

/// App Mesh controller and sidecar injector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnAppMesh {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub controller_image: String,
    pub injector_image: String,
    pub policy_cfn_stack_id: String,
}

/// Kubernetes dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnKubernetesDashboard {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub url: String,
    /// Bearer token for the login page, filled after install.
    pub authentication_token: String,
}

/// Prometheus with a Grafana front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnPrometheusGrafana {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub grafana_admin_user_name: String,
    pub grafana_admin_password: String,
    pub grafana_url: String,
}

/// Wordpress backed by EBS volumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnWordpress {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub user_name: String,
    pub password: String,
    pub url: String,
}

/// JupyterHub on GPU workers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnJupyterHub {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    /// Hex-encoded secret shared by the hub and its proxy.
    pub proxy_secret_token: String,
    pub url: String,
}

/// Kubeflow deployed with kfctl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnKubeflow {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub kfctl_path: String,
    pub kfctl_download_url: String,
    /// Working directory; the deployment lives in `<base-dir>/<cluster-name>`.
    pub base_dir: String,
    pub kf_dir: String,
    pub kfctl_config_path: String,
}

/// Alternate build of the VPC CNI plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnCniVpc {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    /// Must be [`CNI_VPC_VERSION`].
    pub version: String,

    pub repository_init_account_id: String,
    pub repository_init_region: String,
    pub repository_init_name: String,
    pub repository_init_image_tag: String,

    pub repository_account_id: String,
    pub repository_region: String,
    pub repository_name: String,
    pub repository_image_tag: String,

    pub minimum_ip_target: u32,
    pub warm_ip_target: u32,
    pub node_selector: BTreeMap<String, String>,
}

/// Fluentd log forwarder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnFluentd {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,

    pub repository_busybox_account_id: String,
    pub repository_busybox_region: String,
    pub repository_busybox_name: String,
    pub repository_busybox_image_tag: String,

    pub threads: u32,
    pub metadata_log_level: String,
    pub metadata_cache_size: u32,
    pub metadata_watch: bool,
    pub metadata_skip_labels: bool,
    pub metadata_skip_master_url: bool,
    pub metadata_skip_container_metadata: bool,
    pub metadata_skip_namespace_metadata: bool,
}
