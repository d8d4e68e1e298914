//! Managed node groups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::node_groups::Instance;
use crate::config::timeframe::TimeFrame;
use crate::duration;

/// Maximum number of managed node groups per cluster.
pub const MNGS_MAX_LIMIT: usize = 10;
/// Maximum desired capacity per managed node group.
pub const MNG_MAX_LIMIT: u32 = 100;

/// An in-place resize of a managed node group, applied after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MngScaleUpdate {
    /// Whether this step runs.
    pub enable: bool,
    /// Set once the update has been applied.
    pub created: bool,
    /// Set by the provisioner.
    pub time_frame_create: TimeFrame,
    /// Delay before the update.
    #[serde(with = "duration::nanos")]
    pub initial_wait: Duration,
    /// [`MngScaleUpdate::initial_wait`] as text, regenerated on validation.
    pub initial_wait_string: String,
    /// Identifier of the step.
    pub id: String,
    #[allow(missing_docs)]
    pub asg_min_size: u32,
    #[allow(missing_docs)]
    pub asg_max_size: u32,
    #[allow(missing_docs)]
    pub asg_desired_capacity: u32,
}

/// A one-minor Kubernetes upgrade of a managed node group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MngVersionUpgrade {
    /// Whether the upgrade runs.
    pub enable: bool,
    /// Delay before the upgrade.
    #[serde(with = "duration::nanos")]
    pub initial_wait: Duration,
    /// [`MngVersionUpgrade::initial_wait`] as text, regenerated on validation.
    pub initial_wait_string: String,
    /// Set once the upgrade has been applied.
    pub created: bool,
    /// Set by the provisioner.
    pub time_frame_create: TimeFrame,
    /// Target version, e.g. `1.16`.
    pub version: String,
    /// [`MngVersionUpgrade::version`] parsed.
    pub version_value: f64,
}

/// Provisioner-owned state of one managed node group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct MngStatus {
    pub asg_name: String,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub release_version_value: f64,
    pub create_requested: bool,
    pub physical_id: String,
    pub mng_cfn_stack_id: String,
    pub mng_cfn_stack_yaml_path: String,
    pub mng_cfn_stack_yaml_s3_key: String,
    pub remote_access_security_group_id: String,
    pub remote_access_security_group_ingress_egress_cfn_stack_id: String,
    pub remote_access_security_group_cfn_stack_yaml_path: String,
    pub remote_access_security_group_cfn_stack_yaml_s3_key: String,
    pub status: String,
    pub instances: BTreeMap<String, Instance>,
    pub logs: BTreeMap<String, Vec<String>>,
}

/// A managed node group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct Mng {
    /// Group name; must equal its key in [`AddOnManagedNodeGroups::mngs`].
    pub name: String,
    pub remote_access_user_name: String,
    pub tags: BTreeMap<String, String>,
    /// AMI release version, e.g. `1.15.11-20200609`. Empty picks the latest.
    pub release_version: String,
    /// `AL2_x86_64` or `AL2_x86_64_GPU`.
    pub ami_type: String,
    pub instance_types: Vec<String>,
    pub volume_size: u32,
    pub asg_min_size: u32,
    pub asg_max_size: u32,
    pub asg_desired_capacity: u32,

    /// Resizes applied in order after creation.
    pub scale_updates: Vec<MngScaleUpdate>,
    /// Optional version upgrade after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_upgrade: Option<MngVersionUpgrade>,

    /// Read-only provisioner state.
    #[serde(flatten)]
    pub status: MngStatus,
}

/// Managed node groups add-on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct AddOnManagedNodeGroups {
    pub enable: bool,
    pub created: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,

    pub s3_dir: String,
    pub fetch_logs: bool,

    pub role_name: String,
    pub role_create: bool,
    pub role_arn: String,
    pub role_service_principals: Vec<String>,
    pub role_managed_policy_arns: Vec<String>,
    pub role_cfn_stack_id: String,
    pub role_cfn_stack_yaml_path: String,
    pub role_cfn_stack_yaml_s3_key: String,

    /// Extra header attached to EKS API requests.
    pub request_header_key: String,
    pub request_header_value: String,
    /// Alternative EKS API endpoint.
    pub resolver_url: String,
    /// SigV4 signing name for the EKS API.
    pub signing_name: String,

    pub logs_dir: String,
    pub logs_tar_gz_path: String,

    /// Groups keyed by name.
    pub mngs: BTreeMap<String, Mng>,
}

impl AddOnManagedNodeGroups {
    /// Enabled with at least one group.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enable && !self.mngs.is_empty()
    }

    /// Largest desired capacity across all groups.
    #[must_use]
    pub fn max_desired_capacity(&self) -> u32 {
        self.mngs
            .values()
            .map(|mng| mng.asg_desired_capacity)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_upgrade_omitted_when_absent() {
        let mng = Mng {
            name: "m".into(),
            ..Mng::default()
        };
        let yaml = serde_yaml::to_string(&mng).unwrap();
        assert!(!yaml.contains("version-upgrade"));
        assert!(yaml.contains("mng-cfn-stack-id"));
    }

    #[test]
    fn test_json_with_read_only_keys_decodes_into_status() {
        let mng: Mng = serde_json::from_str(
            r#"{"name":"m","mng-cfn-stack-id":"injected","asg-desired-capacity":2}"#,
        )
        .unwrap();
        assert_eq!(mng.status.mng_cfn_stack_id, "injected");
        assert_eq!(mng.asg_desired_capacity, 2);
    }

    #[test]
    fn test_scale_updates_round_trip() {
        let mng = Mng {
            name: "m".into(),
            scale_updates: vec![MngScaleUpdate {
                enable: true,
                id: "up".into(),
                initial_wait: Duration::from_secs(120),
                initial_wait_string: "2m0s".into(),
                asg_min_size: 1,
                asg_max_size: 5,
                asg_desired_capacity: 3,
                ..MngScaleUpdate::default()
            }],
            ..Mng::default()
        };
        let yaml = serde_yaml::to_string(&mng).unwrap();
        assert!(yaml.contains("initial-wait: 120000000000"));
        let back: Mng = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, mng);
    }
}
