//! Add-on records and the catalogue of add-on slots.
//!
//! Every add-on is an optional subtree of [`Config`](crate::Config). The
//! records live in the submodules, grouped by what they install; the
//! [`AddOnKind`] enum enumerates the slots in validation order and derives the
//! serialization key, environment prefix, default namespace suffix and
//! pipeline step name of each one.
//!
//! # Examples
//!
//! ```
//! use eksconfig::config::addons::AddOnKind;
//!
//! let kind = AddOnKind::NlbHelloWorld;
//! assert_eq!(kind.key(), "add-on-nlb-hello-world");
//! assert_eq!(kind.env_prefix(), "AWS_K8S_TESTER_EKS_ADD_ON_NLB_HELLO_WORLD_");
//! assert_eq!(kind.step(), "validateAddOnNLBHelloWorld");
//! ```

pub mod apps;
pub mod identity;
pub mod managed_node_groups;
pub mod node_groups;
pub mod testing;
pub mod workloads;

use std::fmt;

pub use apps::{
    AddOnAppMesh, AddOnCniVpc, AddOnFluentd, AddOnJupyterHub, AddOnKubeflow,
    AddOnKubernetesDashboard, AddOnPrometheusGrafana, AddOnWordpress,
};
pub use identity::{AddOnFargate, AddOnIrsa, AddOnIrsaFargate};
pub use managed_node_groups::{
    AddOnManagedNodeGroups, Mng, MngScaleUpdate, MngStatus, MngVersionUpgrade,
};
pub use node_groups::{AddOnNodeGroups, Asg, AsgStatus, Instance};
pub use testing::{
    AddOnClusterLoader, AddOnClusterLoaderRemote, AddOnClusterVersionUpgrade, AddOnConformance,
    AddOnHollowNodesLocal, AddOnHollowNodesRemote,
};
pub use workloads::{
    AddOnAlb2048, AddOnAmiSoftLockupIssue454, AddOnConfigMaps, AddOnCronJobs, AddOnCsiEbs,
    AddOnCsrs, AddOnJobsEcho, AddOnJobsPi, AddOnNlbGuestbook, AddOnNlbHelloWorld, AddOnPhpApache,
    AddOnSecrets,
};

/// Placeholder in user-supplied names, replaced by the cluster name.
pub const GET_REF_NAME: &str = "GetRef.Name";
/// Placeholder in post-create commands, replaced by the cluster ARN.
pub const GET_REF_CLUSTER_ARN: &str = "GetRef.ClusterARN";

/// Prefix shared by every add-on environment key.
pub const ENV_PREFIX_ADD_ON: &str = "AWS_K8S_TESTER_EKS_ADD_ON_";

/// One add-on slot of the root configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum AddOnKind {
    NodeGroups,
    ManagedNodeGroups,
    CsiEbs,
    NlbHelloWorld,
    NlbGuestbook,
    Alb2048,
    JobsPi,
    JobsEcho,
    CronJobs,
    Csrs,
    ConfigMaps,
    Secrets,
    Irsa,
    Fargate,
    IrsaFargate,
    AppMesh,
    KubernetesDashboard,
    PrometheusGrafana,
    Wordpress,
    JupyterHub,
    Kubeflow,
    ClusterLoader,
    ClusterLoaderRemote,
    Conformance,
    CniVpc,
    Fluentd,
    HollowNodesLocal,
    HollowNodesRemote,
    PhpApache,
    AmiSoftLockupIssue454,
    ClusterVersionUpgrade,
}

impl AddOnKind {
    /// Every slot, in validation order.
    pub const ALL: [Self; 31] = [
        Self::NodeGroups,
        Self::ManagedNodeGroups,
        Self::CsiEbs,
        Self::NlbHelloWorld,
        Self::NlbGuestbook,
        Self::Alb2048,
        Self::JobsPi,
        Self::JobsEcho,
        Self::CronJobs,
        Self::Csrs,
        Self::ConfigMaps,
        Self::Secrets,
        Self::Irsa,
        Self::Fargate,
        Self::IrsaFargate,
        Self::AppMesh,
        Self::KubernetesDashboard,
        Self::PrometheusGrafana,
        Self::Wordpress,
        Self::JupyterHub,
        Self::Kubeflow,
        Self::ClusterLoader,
        Self::ClusterLoaderRemote,
        Self::Conformance,
        Self::CniVpc,
        Self::Fluentd,
        Self::HollowNodesLocal,
        Self::HollowNodesRemote,
        Self::PhpApache,
        Self::AmiSoftLockupIssue454,
        Self::ClusterVersionUpgrade,
    ];

    /// Upper-case environment token, e.g. `NLB_HELLO_WORLD`.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::NodeGroups => "NODE_GROUPS",
            Self::ManagedNodeGroups => "MANAGED_NODE_GROUPS",
            Self::CsiEbs => "CSI_EBS",
            Self::NlbHelloWorld => "NLB_HELLO_WORLD",
            Self::NlbGuestbook => "NLB_GUESTBOOK",
            Self::Alb2048 => "ALB_2048",
            Self::JobsPi => "JOBS_PI",
            Self::JobsEcho => "JOBS_ECHO",
            Self::CronJobs => "CRON_JOBS",
            Self::Csrs => "CSRS",
            Self::ConfigMaps => "CONFIG_MAPS",
            Self::Secrets => "SECRETS",
            Self::Irsa => "IRSA",
            Self::Fargate => "FARGATE",
            Self::IrsaFargate => "IRSA_FARGATE",
            Self::AppMesh => "APP_MESH",
            Self::KubernetesDashboard => "KUBERNETES_DASHBOARD",
            Self::PrometheusGrafana => "PROMETHEUS_GRAFANA",
            Self::Wordpress => "WORDPRESS",
            Self::JupyterHub => "JUPYTER_HUB",
            Self::Kubeflow => "KUBEFLOW",
            Self::ClusterLoader => "CLUSTER_LOADER",
            Self::ClusterLoaderRemote => "CLUSTER_LOADER_REMOTE",
            Self::Conformance => "CONFORMANCE",
            Self::CniVpc => "CNI_VPC",
            Self::Fluentd => "FLUENTD",
            Self::HollowNodesLocal => "HOLLOW_NODES_LOCAL",
            Self::HollowNodesRemote => "HOLLOW_NODES_REMOTE",
            Self::PhpApache => "PHP_APACHE",
            Self::AmiSoftLockupIssue454 => "AMI_SOFT_LOCKUP_ISSUE_454",
            Self::ClusterVersionUpgrade => "CLUSTER_VERSION_UPGRADE",
        }
    }

    /// Validation step name, as it appears in [`Error::Step`](crate::Error::Step).
    #[must_use]
    pub const fn step(self) -> &'static str {
        match self {
            Self::NodeGroups => "validateAddOnNodeGroups",
            Self::ManagedNodeGroups => "validateAddOnManagedNodeGroups",
            Self::CsiEbs => "validateAddOnCSIEBS",
            Self::NlbHelloWorld => "validateAddOnNLBHelloWorld",
            Self::NlbGuestbook => "validateAddOnNLBGuestbook",
            Self::Alb2048 => "validateAddOnALB2048",
            Self::JobsPi => "validateAddOnJobsPi",
            Self::JobsEcho => "validateAddOnJobsEcho",
            Self::CronJobs => "validateAddOnCronJobs",
            Self::Csrs => "validateAddOnCSRs",
            Self::ConfigMaps => "validateAddOnConfigMaps",
            Self::Secrets => "validateAddOnSecrets",
            Self::Irsa => "validateAddOnIRSA",
            Self::Fargate => "validateAddOnFargate",
            Self::IrsaFargate => "validateAddOnIRSAFargate",
            Self::AppMesh => "validateAddOnAppMesh",
            Self::KubernetesDashboard => "validateAddOnKubernetesDashboard",
            Self::PrometheusGrafana => "validateAddOnPrometheusGrafana",
            Self::Wordpress => "validateAddOnWordpress",
            Self::JupyterHub => "validateAddOnJupyterHub",
            Self::Kubeflow => "validateAddOnKubeflow",
            Self::ClusterLoader => "validateAddOnClusterLoader",
            Self::ClusterLoaderRemote => "validateAddOnClusterLoaderRemote",
            Self::Conformance => "validateAddOnConformance",
            Self::CniVpc => "validateAddOnCNIVPC",
            Self::Fluentd => "validateAddOnFluentd",
            Self::HollowNodesLocal => "validateAddOnHollowNodesLocal",
            Self::HollowNodesRemote => "validateAddOnHollowNodesRemote",
            Self::PhpApache => "validateAddOnPHPApache",
            Self::AmiSoftLockupIssue454 => "validateAddOnAmiSoftLockupIssue454",
            Self::ClusterVersionUpgrade => "validateAddOnClusterVersionUpgrade",
        }
    }

    /// Display name used in error messages, e.g. `AddOnNLBHelloWorld`.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.step().trim_start_matches("validate")
    }

    /// Lower-case slug, e.g. `nlb-hello-world`.
    #[must_use]
    pub fn slug(self) -> String {
        self.token().to_ascii_lowercase().replace('_', "-")
    }

    /// Serialization key of the slot, e.g. `add-on-nlb-hello-world`.
    #[must_use]
    pub fn key(self) -> String {
        format!("add-on-{}", self.slug())
    }

    /// Environment prefix of the slot's fields.
    #[must_use]
    pub fn env_prefix(self) -> String {
        format!("{ENV_PREFIX_ADD_ON}{}_", self.token())
    }

    /// Default namespace for a cluster named `cluster_name`.
    #[must_use]
    pub fn default_namespace(self, cluster_name: &str) -> String {
        format!("{cluster_name}-{}", self.slug())
    }

    /// Whether enabling this add-on needs at least one node group.
    #[must_use]
    pub const fn requires_node_group(self) -> bool {
        !matches!(
            self,
            Self::NodeGroups
                | Self::ManagedNodeGroups
                | Self::CsiEbs
                | Self::CniVpc
                | Self::HollowNodesLocal
                | Self::HollowNodesRemote
                | Self::ClusterVersionUpgrade
        )
    }

    /// Whether the slot's cluster version must be at least 1.14.
    #[must_use]
    pub const fn requires_version_1_14(self) -> bool {
        matches!(
            self,
            Self::ManagedNodeGroups | Self::Fargate | Self::Irsa | Self::IrsaFargate
        )
    }
}

impl fmt::Display for AddOnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Replaces every [`GET_REF_NAME`] in `s` with `cluster_name`.
#[must_use]
pub fn expand_name_ref(s: &str, cluster_name: &str) -> String {
    s.replace(GET_REF_NAME, cluster_name)
}
