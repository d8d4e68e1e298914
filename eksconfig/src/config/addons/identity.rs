//! IAM roles for service accounts and Fargate profiles.

use serde::{Deserialize, Serialize};

use crate::config::timeframe::TimeFrame;

/// Policy attached to the service-account role by default.
pub const DEFAULT_IRSA_ROLE_MANAGED_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess";

/// Service-account role test on regular node groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnIrsa {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,

    pub role_name: String,
    pub role_arn: String,
    pub role_managed_policy_arns: Vec<String>,
    pub role_cfn_stack_id: String,

    pub service_account_name: String,
    pub config_map_name: String,
    pub config_map_script_file_name: String,
    /// Object the test pods read through the role.
    pub s3_key: String,

    pub deployment_name: String,
    pub deployment_replicas: u32,
    /// Log of the test pods' output.
    pub deployment_result_path: String,
}

/// Fargate profile with a test pod.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnFargate {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,

    pub role_name: String,
    pub role_create: bool,
    pub role_arn: String,
    pub role_service_principals: Vec<String>,
    pub role_managed_policy_arns: Vec<String>,
    pub role_cfn_stack_id: String,

    /// Must not start with `eks-`.
    pub profile_name: String,
    /// Lower-case alphanumeric.
    pub secret_name: String,
    pub pod_name: String,
    pub container_name: String,
}

/// Service-account role test on a Fargate profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnIrsaFargate {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub namespace: String,

    pub role_name: String,
    pub role_arn: String,
    pub role_service_principals: Vec<String>,
    pub role_managed_policy_arns: Vec<String>,
    pub role_cfn_stack_id: String,

    pub service_account_name: String,
    pub config_map_name: String,
    pub config_map_script_file_name: String,
    pub s3_key: String,

    pub profile_name: String,
    pub pod_name: String,
    pub container_name: String,
}
