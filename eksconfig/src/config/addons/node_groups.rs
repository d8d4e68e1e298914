//! Self-managed node groups backed by auto scaling groups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::timeframe::TimeFrame;

/// Bottlerocket on x86-64.
pub const AMI_TYPE_BOTTLEROCKET_CPU: &str = "BOTTLEROCKET_x86_64";
/// Amazon Linux 2 on x86-64.
pub const AMI_TYPE_AL2_X86_64: &str = "AL2_x86_64";
/// Amazon Linux 2 on x86-64 with GPU drivers.
pub const AMI_TYPE_AL2_X86_64_GPU: &str = "AL2_x86_64_GPU";

/// Default worker instance type for CPU AMIs.
pub const DEFAULT_NODE_INSTANCE_TYPE_CPU: &str = "c5.xlarge";
/// Default worker instance type for GPU AMIs.
pub const DEFAULT_NODE_INSTANCE_TYPE_GPU: &str = "p3.8xlarge";
/// Default root volume size in GiB.
pub const DEFAULT_NODE_VOLUME_SIZE: u32 = 40;
/// Default login user for Amazon Linux 2 and Bottlerocket workers.
pub const DEFAULT_REMOTE_ACCESS_USER_NAME: &str = "ec2-user";

/// Maximum number of self-managed node groups.
pub const NGS_MAX_LIMIT: usize = 10;
/// Maximum desired capacity per self-managed node group.
pub const NG_MAX_LIMIT: u32 = 300;

/// Maximum number of instance types a single group may list.
pub const INSTANCE_TYPES_MAX: usize = 4;

/// One worker instance as recorded by the provisioner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct Instance {
    pub architecture: String,
    pub image_id: String,
    pub instance_id: String,
    pub instance_type: String,
    pub key_name: String,
    pub private_dns_name: String,
    pub private_ip: String,
    pub public_dns_name: String,
    pub public_ip: String,
    pub subnet_id: String,
    pub vpc_id: String,
    pub launch_time: String,
    pub remote_access_user_name: String,
}

/// Provisioner-owned state of one auto scaling group.
///
/// Kept as a separate record so the environment binder can reset it wholesale
/// after decoding user-supplied JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AsgStatus {
    pub asg_cfn_stack_id: String,
    pub asg_cfn_stack_yaml_path: String,
    pub asg_cfn_stack_yaml_s3_key: String,
    pub ssm_document_cfn_stack_id: String,
    pub ssm_document_cfn_stack_yaml_path: String,
    pub ssm_document_cfn_stack_yaml_s3_key: String,
    pub ssm_document_command_ids: Vec<String>,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub instances: BTreeMap<String, Instance>,
    pub logs: BTreeMap<String, Vec<String>>,
}

/// A self-managed node group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct Asg {
    /// Group name; must equal its key in [`AddOnNodeGroups::asgs`].
    pub name: String,
    /// SSH login user.
    pub remote_access_user_name: String,

    /// Whether to create an SSM document that runs on every instance.
    pub ssm_document_create: bool,
    /// SSM document name. Non-alphanumeric characters are stripped.
    pub ssm_document_name: String,
    /// CloudFormation stack name for the SSM document.
    pub ssm_document_cfn_stack_name: String,
    /// Commands the SSM document executes.
    pub ssm_document_commands: String,
    /// SSM execution timeout.
    pub ssm_document_execution_timeout_in_seconds: u32,

    /// One of the `AMI_TYPE_*` constants.
    pub ami_type: String,
    /// Explicit image id. Either this or [`Asg::image_id_ssm_parameter`] is required.
    pub image_id: String,
    /// SSM parameter that resolves to the image id.
    pub image_id_ssm_parameter: String,
    /// Candidate instance types, at most four.
    pub instance_types: Vec<String>,
    /// Root volume size in GiB.
    pub volume_size: u32,

    pub asg_min_size: u32,
    pub asg_max_size: u32,
    pub asg_desired_capacity: u32,

    /// Extra arguments passed to the kubelet. Not allowed on Bottlerocket.
    pub kubelet_extra_args: String,

    /// Read-only provisioner state.
    #[serde(flatten)]
    pub status: AsgStatus,
}

/// Self-managed node groups add-on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnNodeGroups {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,

    /// S3 prefix for uploaded templates and logs.
    pub s3_dir: String,
    /// Whether to fetch worker logs after creation.
    pub fetch_logs: bool,

    pub role_name: String,
    pub role_create: bool,
    pub role_arn: String,
    pub role_service_principals: Vec<String>,
    pub role_managed_policy_arns: Vec<String>,
    pub role_cfn_stack_id: String,
    pub role_cfn_stack_yaml_path: String,
    pub role_cfn_stack_yaml_s3_key: String,

    /// Local directory for fetched logs.
    pub logs_dir: String,
    /// Tarball of fetched logs.
    pub logs_tar_gz_path: String,

    /// Groups keyed by name.
    pub asgs: BTreeMap<String, Asg>,
}

impl AddOnNodeGroups {
    /// Enabled with at least one group.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enable && !self.asgs.is_empty()
    }

    /// Largest desired capacity across all groups.
    #[must_use]
    pub fn max_desired_capacity(&self) -> u32 {
        self.asgs
            .values()
            .map(|asg| asg.asg_desired_capacity)
            .max()
            .unwrap_or(0)
    }
}
