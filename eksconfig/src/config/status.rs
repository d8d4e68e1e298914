//! Read-only cluster status recorded by the provisioner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::timeframe::TimeFrame;

/// Maximum number of entries kept in [`Status::cluster_status`].
pub const STATUS_HISTORY_LIMIT: usize = 100;

/// Cluster lifecycle values as reported by the control plane, plus the
/// synthesized `DELETED/NOT-EXIST` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterLifecycle {
    /// `CREATING`
    #[serde(rename = "CREATING")]
    Creating,
    /// `ACTIVE`
    #[serde(rename = "ACTIVE")]
    Active,
    /// `UPDATING`
    #[serde(rename = "UPDATING")]
    Updating,
    /// `DELETING`
    #[serde(rename = "DELETING")]
    Deleting,
    /// `FAILED`
    #[serde(rename = "FAILED")]
    Failed,
    /// `DELETED/NOT-EXIST`
    #[serde(rename = "DELETED/NOT-EXIST")]
    DeletedOrNotExist,
}

impl ClusterLifecycle {
    /// The wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creating => "CREATING",
            Self::Active => "ACTIVE",
            Self::Updating => "UPDATING",
            Self::Deleting => "DELETING",
            Self::Failed => "FAILED",
            Self::DeletedOrNotExist => "DELETED/NOT-EXIST",
        }
    }
}

impl fmt::Display for ClusterLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterLifecycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATING" => Ok(Self::Creating),
            "ACTIVE" => Ok(Self::Active),
            "UPDATING" => Ok(Self::Updating),
            "DELETING" => Ok(Self::Deleting),
            "FAILED" => Ok(Self::Failed),
            "DELETED/NOT-EXIST" => Ok(Self::DeletedOrNotExist),
            _ => Err(format!("unknown cluster status {s:?}")),
        }
    }
}

/// One entry of the status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatus {
    /// When the status was observed.
    pub time: DateTime<Utc>,
    /// The observed status.
    pub status: ClusterLifecycle,
}

/// Kubernetes server version as reported by the API server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ServerVersionInfo {
    pub major: String,
    pub minor: String,
    #[serde(rename = "gitVersion")]
    pub git_version: String,
    #[serde(rename = "gitCommit")]
    pub git_commit: String,
    #[serde(rename = "gitTreeState")]
    pub git_tree_state: String,
    #[serde(rename = "buildDate")]
    pub build_date: String,
    #[serde(rename = "goVersion")]
    pub go_version: String,
    pub compiler: String,
    pub platform: String,
    #[serde(rename = "version-value")]
    pub version_value: f64,
}

/// SSH coordinates for one worker, keyed by private DNS name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SshConfig {
    /// Public IPv4 address.
    pub public_ip: String,
    /// Public DNS name.
    pub public_dns_name: String,
    /// Login user.
    pub user_name: String,
}

/// Cluster status. Every field is owned by the provisioner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(missing_docs)]
pub struct Status {
    pub up: bool,
    pub time_frame_create: TimeFrame,
    pub time_frame_delete: TimeFrame,
    pub server_version_info: ServerVersionInfo,
    pub aws_account_id: String,
    pub aws_user_id: String,
    pub aws_iam_role_arn: String,
    pub aws_credential_path: String,
    pub cluster_arn: String,
    pub cluster_cfn_stack_id: String,
    pub cluster_cfn_stack_yaml_file_path: String,
    pub cluster_control_plane_security_group_id: String,
    pub cluster_api_server_endpoint: String,
    pub cluster_oidc_issuer_url: String,
    pub cluster_oidc_issuer_host_path: String,
    pub cluster_oidc_issuer_arn: String,
    pub cluster_oidc_issuer_ca_thumbprint: String,
    pub cluster_ca: String,
    pub cluster_ca_decoded: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_status_current: Option<ClusterLifecycle>,
    pub cluster_status: Vec<ClusterStatus>,
    pub private_dns_to_ssh_config: BTreeMap<String, SshConfig>,
}

impl Status {
    /// Records a lifecycle transition observed at `now`.
    ///
    /// The newest entry goes first; the history keeps at most
    /// [`STATUS_HISTORY_LIMIT`] entries. `ACTIVE` marks the cluster up and
    /// `DELETED/NOT-EXIST` marks it down; other values leave `up` alone.
    pub fn record(&mut self, status: ClusterLifecycle, now: DateTime<Utc>) {
        self.cluster_status_current = Some(status);
        match status {
            ClusterLifecycle::Active => self.up = true,
            ClusterLifecycle::DeletedOrNotExist => self.up = false,
            _ => {}
        }
        self.cluster_status
            .insert(0, ClusterStatus { time: now, status });
        self.cluster_status.truncate(STATUS_HISTORY_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_600_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_record_prepends() {
        let mut status = Status::default();
        status.record(ClusterLifecycle::Creating, at(0));
        status.record(ClusterLifecycle::Active, at(1));
        assert_eq!(status.cluster_status.len(), 2);
        assert_eq!(status.cluster_status[0].status, ClusterLifecycle::Active);
        assert_eq!(status.cluster_status[1].status, ClusterLifecycle::Creating);
        assert_eq!(status.cluster_status_current, Some(ClusterLifecycle::Active));
    }

    #[test]
    fn test_record_flips_up() {
        let mut status = Status::default();
        status.record(ClusterLifecycle::Active, at(0));
        assert!(status.up);
        status.record(ClusterLifecycle::Deleting, at(1));
        assert!(status.up);
        status.record(ClusterLifecycle::DeletedOrNotExist, at(2));
        assert!(!status.up);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut status = Status::default();
        for i in 0..(STATUS_HISTORY_LIMIT as i64 + 20) {
            status.record(ClusterLifecycle::Updating, at(i));
        }
        assert_eq!(status.cluster_status.len(), STATUS_HISTORY_LIMIT);
        assert_eq!(
            status.cluster_status[0].time,
            at(STATUS_HISTORY_LIMIT as i64 + 19)
        );
    }

    #[test]
    fn test_lifecycle_parse_and_display() {
        for s in ["CREATING", "ACTIVE", "UPDATING", "DELETING", "FAILED", "DELETED/NOT-EXIST"] {
            let parsed: ClusterLifecycle = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
        assert!("active".parse::<ClusterLifecycle>().is_err());
    }

    #[test]
    fn test_status_yaml_keys() {
        let mut status = Status::default();
        status.record(ClusterLifecycle::DeletedOrNotExist, at(0));
        let yaml = serde_yaml::to_string(&status).unwrap();
        assert!(yaml.contains("cluster-status-current: DELETED/NOT-EXIST"));
        assert!(yaml.contains("aws-account-id"));
        assert!(yaml.contains("cluster-oidc-issuer-url"));
    }
}
