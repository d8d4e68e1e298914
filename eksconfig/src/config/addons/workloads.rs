//! Workload add-ons: storage driver, load balancers, batch jobs and API object
//! load generators.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::timeframe::TimeFrame;

/// Default chart for the EBS CSI driver.
pub const DEFAULT_CSI_EBS_CHART_REPO_URL: &str =
    "https://github.com/kubernetes-sigs/aws-ebs-csi-driver/releases/download/v0.5.0/helm-chart.tgz";

/// Largest echo payload a job may write.
pub const MAX_ECHO_SIZE: u32 = 250_000;
/// Largest value a single config map may carry.
pub const MAX_CONFIG_MAP_SIZE: u32 = 900_000;

/// Accepted values of [`AddOnCsrs::initial_request_condition_type`].
pub const CSR_CONDITION_TYPES: &[&str] = &["Approved", "Denied", "Pending", "", "Random"];

/// EBS CSI driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnCsiEbs {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    /// Helm chart archive URL.
    pub chart_repo_url: String,
}

/// NLB-fronted hello-world deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnNlbHelloWorld {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    /// Raised to the largest node-group desired capacity during validation.
    pub deployment_replicas: u32,
    pub nlb_arn: String,
    pub nlb_name: String,
    pub url: String,
}

/// NLB-fronted guestbook deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnNlbGuestbook {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub deployment_replicas: u32,
    pub nlb_arn: String,
    pub nlb_name: String,
    pub url: String,
}

/// ALB ingress controller plus the 2048 game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnAlb2048 {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub deployment_replicas_alb: u32,
    pub deployment_replicas_2048: u32,
    pub policy_cfn_stack_id: String,
    pub policy_name: String,
    pub alb_arn: String,
    pub alb_name: String,
    pub url: String,
}

/// Batch jobs computing digits of pi.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnJobsPi {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub completes: u32,
    pub parallels: u32,
}

/// Batch jobs echoing a payload of [`AddOnJobsEcho::echo_size`] bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnJobsEcho {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub completes: u32,
    pub parallels: u32,
    pub echo_size: u32,
}

/// Cron jobs echoing a payload on a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnCronJobs {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    /// Cron expression.
    pub schedule: String,
    pub completes: u32,
    pub parallels: u32,
    pub successful_jobs_history_limit: u32,
    pub failed_jobs_history_limit: u32,
    pub echo_size: u32,
}

/// Certificate signing request load generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnCsrs {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub objects: u32,
    /// One of [`CSR_CONDITION_TYPES`].
    pub initial_request_condition_type: String,
    pub fail_threshold: u32,
    pub created_names: Vec<String>,
}

/// Config map load generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnConfigMaps {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub objects: u32,
    /// Value size in bytes, at most [`MAX_CONFIG_MAP_SIZE`].
    pub size: u32,
    pub fail_threshold: u32,
    pub created_names: Vec<String>,
}

/// Secret write/read load generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnSecrets {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub objects: u32,
    pub size: u32,
    pub fail_threshold: u32,
    /// Per-write latency table; must end in `.csv`.
    pub writes_result_path: String,
    /// Per-read latency table; must end in `.csv`.
    pub reads_result_path: String,
}

/// PHP/Apache deployment used for autoscaling tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnPhpApache {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub repository_account_id: String,
    pub repository_region: String,
    pub repository_name: String,
    pub repository_image_tag: String,
    pub deployment_replicas: u32,
    pub deployment_node_selector: BTreeMap<String, String>,
}

/// Reproducer deployment for the AMI soft-lockup issue 454.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnAmiSoftLockupIssue454 {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,
    pub deployment_replicas: u32,
    pub deployment_node_selector: BTreeMap<String, String>,
}
