//! Field declarations of every record in the tree.

use std::collections::BTreeMap;

use super::{EnvFields, FieldMut as F, FieldVisitor};
use crate::config::addons::apps::{
    AddOnAppMesh, AddOnCniVpc, AddOnFluentd, AddOnJupyterHub, AddOnKubeflow,
    AddOnKubernetesDashboard, AddOnPrometheusGrafana, AddOnWordpress,
};
use crate::config::addons::identity::{AddOnFargate, AddOnIrsa, AddOnIrsaFargate};
use crate::config::addons::managed_node_groups::{AddOnManagedNodeGroups, Mng};
use crate::config::addons::node_groups::{AddOnNodeGroups, Asg};
use crate::config::addons::testing::{
    AddOnClusterLoader, AddOnClusterLoaderRemote, AddOnClusterVersionUpgrade, AddOnConformance,
    AddOnHollowNodesLocal, AddOnHollowNodesRemote,
};
use crate::config::addons::workloads::{
    AddOnAlb2048, AddOnAmiSoftLockupIssue454, AddOnConfigMaps, AddOnCronJobs, AddOnCsiEbs,
    AddOnCsrs, AddOnJobsEcho, AddOnJobsPi, AddOnNlbGuestbook, AddOnNlbHelloWorld, AddOnPhpApache,
    AddOnSecrets,
};
use crate::config::addons::AddOnKind;
use crate::config::schema::{Config, Parameters};
use crate::error::Result;

/// The record in slot `kind`, if present.
pub(crate) fn slot_fields(cfg: &mut Config, kind: AddOnKind) -> Option<&mut dyn EnvFields> {
    fn dyn_mut<T: EnvFields>(slot: &mut Option<T>) -> Option<&mut dyn EnvFields> {
        slot.as_mut().map(|r| r as &mut dyn EnvFields)
    }
    match kind {
        AddOnKind::NodeGroups => dyn_mut(&mut cfg.add_on_node_groups),
        AddOnKind::ManagedNodeGroups => dyn_mut(&mut cfg.add_on_managed_node_groups),
        AddOnKind::CsiEbs => dyn_mut(&mut cfg.add_on_csi_ebs),
        AddOnKind::NlbHelloWorld => dyn_mut(&mut cfg.add_on_nlb_hello_world),
        AddOnKind::NlbGuestbook => dyn_mut(&mut cfg.add_on_nlb_guestbook),
        AddOnKind::Alb2048 => dyn_mut(&mut cfg.add_on_alb_2048),
        AddOnKind::JobsPi => dyn_mut(&mut cfg.add_on_jobs_pi),
        AddOnKind::JobsEcho => dyn_mut(&mut cfg.add_on_jobs_echo),
        AddOnKind::CronJobs => dyn_mut(&mut cfg.add_on_cron_jobs),
        AddOnKind::Csrs => dyn_mut(&mut cfg.add_on_csrs),
        AddOnKind::ConfigMaps => dyn_mut(&mut cfg.add_on_config_maps),
        AddOnKind::Secrets => dyn_mut(&mut cfg.add_on_secrets),
        AddOnKind::Irsa => dyn_mut(&mut cfg.add_on_irsa),
        AddOnKind::Fargate => dyn_mut(&mut cfg.add_on_fargate),
        AddOnKind::IrsaFargate => dyn_mut(&mut cfg.add_on_irsa_fargate),
        AddOnKind::AppMesh => dyn_mut(&mut cfg.add_on_app_mesh),
        AddOnKind::KubernetesDashboard => dyn_mut(&mut cfg.add_on_kubernetes_dashboard),
        AddOnKind::PrometheusGrafana => dyn_mut(&mut cfg.add_on_prometheus_grafana),
        AddOnKind::Wordpress => dyn_mut(&mut cfg.add_on_wordpress),
        AddOnKind::JupyterHub => dyn_mut(&mut cfg.add_on_jupyter_hub),
        AddOnKind::Kubeflow => dyn_mut(&mut cfg.add_on_kubeflow),
        AddOnKind::ClusterLoader => dyn_mut(&mut cfg.add_on_cluster_loader),
        AddOnKind::ClusterLoaderRemote => dyn_mut(&mut cfg.add_on_cluster_loader_remote),
        AddOnKind::Conformance => dyn_mut(&mut cfg.add_on_conformance),
        AddOnKind::CniVpc => dyn_mut(&mut cfg.add_on_cni_vpc),
        AddOnKind::Fluentd => dyn_mut(&mut cfg.add_on_fluentd),
        AddOnKind::HollowNodesLocal => dyn_mut(&mut cfg.add_on_hollow_nodes_local),
        AddOnKind::HollowNodesRemote => dyn_mut(&mut cfg.add_on_hollow_nodes_remote),
        AddOnKind::PhpApache => dyn_mut(&mut cfg.add_on_php_apache),
        AddOnKind::AmiSoftLockupIssue454 => dyn_mut(&mut cfg.add_on_ami_soft_lockup_issue_454),
        AddOnKind::ClusterVersionUpgrade => dyn_mut(&mut cfg.add_on_cluster_version_upgrade),
    }
}

/// Replaces the provisioner-owned part of each decoded group with the prior
/// state of the group under the same key, or with nothing.
pub(super) fn reset_asg_status(
    prior: &BTreeMap<String, Asg>,
    decoded: BTreeMap<String, Asg>,
) -> BTreeMap<String, Asg> {
    decoded
        .into_iter()
        .map(|(key, mut asg)| {
            asg.status = prior.get(&key).map(|p| p.status.clone()).unwrap_or_default();
            (key, asg)
        })
        .collect()
}

/// Like [`reset_asg_status`], also covering scale updates (matched by id)
/// and the version upgrade.
pub(super) fn reset_mng_status(
    prior: &BTreeMap<String, Mng>,
    decoded: BTreeMap<String, Mng>,
) -> BTreeMap<String, Mng> {
    decoded
        .into_iter()
        .map(|(key, mut mng)| {
            let before = prior.get(&key);
            mng.status = before.map(|p| p.status.clone()).unwrap_or_default();

            for update in &mut mng.scale_updates {
                let old = before.and_then(|p| p.scale_updates.iter().find(|u| u.id == update.id));
                update.created = old.is_some_and(|u| u.created);
                update.time_frame_create = old.map(|u| u.time_frame_create.clone()).unwrap_or_default();
            }
            if let Some(upgrade) = mng.version_upgrade.as_mut() {
                let old = before.and_then(|p| p.version_upgrade.as_ref());
                upgrade.created = old.is_some_and(|u| u.created);
                upgrade.time_frame_create = old.map(|u| u.time_frame_create.clone()).unwrap_or_default();
                upgrade.version_value = old.map_or(0.0, |u| u.version_value);
            }
            (key, mng)
        })
        .collect()
}

/// `enable` plus the read-only lifecycle fields every add-on carries.
fn envelope(v: &mut dyn FieldVisitor, enable: &mut bool) -> Result<()> {
    v.field("enable", F::Bool(enable))?;
    v.read_only("created")?;
    v.read_only("time-frame-create")?;
    v.read_only("time-frame-delete")
}

fn read_only(v: &mut dyn FieldVisitor, keys: &[&'static str]) -> Result<()> {
    keys.iter().try_for_each(|key| v.read_only(key))
}

impl EnvFields for Config {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        v.field("config-path", F::Str(&mut self.config_path))?;
        v.field("kubectl-commands-output-path", F::Str(&mut self.kubectl_commands_output_path))?;
        v.field(
            "remote-access-commands-output-path",
            F::Str(&mut self.remote_access_commands_output_path),
        )?;
        v.field("region", F::Str(&mut self.region))?;
        v.field("name", F::Str(&mut self.name))?;
        v.field("log-level", F::Str(&mut self.log_level))?;
        v.field("log-outputs", F::StrList(&mut self.log_outputs))?;

        v.field("aws-cli-path", F::Str(&mut self.aws_cli_path))?;
        v.field("kubectl-path", F::Str(&mut self.kubectl_path))?;
        v.field("kubectl-download-url", F::Str(&mut self.kubectl_download_url))?;
        v.field("kubeconfig-path", F::Str(&mut self.kubeconfig_path))?;

        v.field("command-after-create-cluster", F::Str(&mut self.command_after_create_cluster))?;
        v.read_only("command-after-create-cluster-output-path")?;
        v.field(
            "command-after-create-cluster-timeout",
            F::Duration(&mut self.command_after_create_cluster_timeout),
        )?;
        v.read_only("command-after-create-cluster-timeout-string")?;
        v.field("command-after-create-add-ons", F::Str(&mut self.command_after_create_add_ons))?;
        v.read_only("command-after-create-add-ons-output-path")?;
        v.field(
            "command-after-create-add-ons-timeout",
            F::Duration(&mut self.command_after_create_add_ons_timeout),
        )?;
        v.read_only("command-after-create-add-ons-timeout-string")?;

        v.field("on-failure-delete", F::Bool(&mut self.on_failure_delete))?;
        v.field("on-failure-delete-wait-seconds", F::U64(&mut self.on_failure_delete_wait_seconds))?;

        v.field("s3-bucket-create", F::Bool(&mut self.s3_bucket_create))?;
        v.field("s3-bucket-name", F::Str(&mut self.s3_bucket_name))?;
        v.field(
            "s3-bucket-lifecycle-expiration-days",
            F::I64(&mut self.s3_bucket_lifecycle_expiration_days),
        )?;

        v.field("remote-access-key-create", F::Bool(&mut self.remote_access_key_create))?;
        v.field("remote-access-key-name", F::Str(&mut self.remote_access_key_name))?;
        v.field(
            "remote-access-private-key-path",
            F::Str(&mut self.remote_access_private_key_path),
        )?;

        v.field("clients", F::U32(&mut self.clients))?;
        v.field("client-qps", F::F32(&mut self.client_qps))?;
        v.field("client-burst", F::U32(&mut self.client_burst))?;
        v.field("client-timeout", F::Duration(&mut self.client_timeout))?;
        v.read_only("client-timeout-string")?;

        v.read_only("status")
    }
}

impl EnvFields for Parameters {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        v.field("version", F::Str(&mut self.version))?;
        v.read_only("version-value")?;

        v.field("role-create", F::Bool(&mut self.role_create))?;
        v.field("role-name", F::Str(&mut self.role_name))?;
        v.field("role-arn", F::Str(&mut self.role_arn))?;
        v.field("role-service-principals", F::StrList(&mut self.role_service_principals))?;
        v.field("role-managed-policy-arns", F::StrList(&mut self.role_managed_policy_arns))?;
        v.read_only("role-cfn-stack-id")?;

        v.field("tags", F::StrMap(&mut self.tags))?;
        v.field("request-header-key", F::Str(&mut self.request_header_key))?;
        v.field("request-header-value", F::Str(&mut self.request_header_value))?;
        v.field("resolver-url", F::Str(&mut self.resolver_url))?;
        v.field("signing-name", F::Str(&mut self.signing_name))?;

        v.field("vpc-create", F::Bool(&mut self.vpc_create))?;
        v.field("vpc-id", F::Str(&mut self.vpc_id))?;
        v.read_only("vpc-cfn-stack-id")?;
        v.field("vpc-cidr", F::Str(&mut self.vpc_cidr))?;
        v.field("public-subnet-cidr-1", F::Str(&mut self.public_subnet_cidr_1))?;
        v.field("public-subnet-cidr-2", F::Str(&mut self.public_subnet_cidr_2))?;
        v.field("public-subnet-cidr-3", F::Str(&mut self.public_subnet_cidr_3))?;
        v.field("private-subnet-cidr-1", F::Str(&mut self.private_subnet_cidr_1))?;
        v.field("private-subnet-cidr-2", F::Str(&mut self.private_subnet_cidr_2))?;
        v.read_only("public-subnet-ids")?;
        v.read_only("private-subnet-ids")?;
        v.field("dhcp-options-domain-name", F::Str(&mut self.dhcp_options_domain_name))?;
        v.field(
            "dhcp-options-domain-name-servers",
            F::StrList(&mut self.dhcp_options_domain_name_servers),
        )?;
        v.read_only("control-plane-security-group-id")?;

        v.field("encryption-cmk-create", F::Bool(&mut self.encryption_cmk_create))?;
        v.field("encryption-cmk-arn", F::Str(&mut self.encryption_cmk_arn))
    }
}

impl EnvFields for AddOnNodeGroups {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("s3-dir", F::Str(&mut self.s3_dir))?;
        v.field("fetch-logs", F::Bool(&mut self.fetch_logs))?;
        v.field("role-name", F::Str(&mut self.role_name))?;
        v.field("role-create", F::Bool(&mut self.role_create))?;
        v.field("role-arn", F::Str(&mut self.role_arn))?;
        v.field("role-service-principals", F::StrList(&mut self.role_service_principals))?;
        v.field("role-managed-policy-arns", F::StrList(&mut self.role_managed_policy_arns))?;
        read_only(
            v,
            &[
                "role-cfn-stack-id",
                "role-cfn-stack-yaml-path",
                "role-cfn-stack-yaml-s3-key",
                "logs-dir",
                "logs-tar-gz-path",
            ],
        )?;
        v.field("asgs", F::Asgs(&mut self.asgs))
    }
}

impl EnvFields for AddOnManagedNodeGroups {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("s3-dir", F::Str(&mut self.s3_dir))?;
        v.field("fetch-logs", F::Bool(&mut self.fetch_logs))?;
        v.field("role-name", F::Str(&mut self.role_name))?;
        v.field("role-create", F::Bool(&mut self.role_create))?;
        v.field("role-arn", F::Str(&mut self.role_arn))?;
        v.field("role-service-principals", F::StrList(&mut self.role_service_principals))?;
        v.field("role-managed-policy-arns", F::StrList(&mut self.role_managed_policy_arns))?;
        read_only(
            v,
            &["role-cfn-stack-id", "role-cfn-stack-yaml-path", "role-cfn-stack-yaml-s3-key"],
        )?;
        v.field("request-header-key", F::Str(&mut self.request_header_key))?;
        v.field("request-header-value", F::Str(&mut self.request_header_value))?;
        v.field("resolver-url", F::Str(&mut self.resolver_url))?;
        v.field("signing-name", F::Str(&mut self.signing_name))?;
        read_only(v, &["logs-dir", "logs-tar-gz-path"])?;
        v.field("mngs", F::Mngs(&mut self.mngs))
    }
}

impl EnvFields for AddOnCsiEbs {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("chart-repo-url", F::Str(&mut self.chart_repo_url))
    }
}

impl EnvFields for AddOnNlbHelloWorld {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("deployment-replicas", F::U32(&mut self.deployment_replicas))?;
        read_only(v, &["nlb-arn", "nlb-name", "url"])
    }
}

impl EnvFields for AddOnNlbGuestbook {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("deployment-replicas", F::U32(&mut self.deployment_replicas))?;
        read_only(v, &["nlb-arn", "nlb-name", "url"])
    }
}

impl EnvFields for AddOnAlb2048 {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("deployment-replicas-alb", F::U32(&mut self.deployment_replicas_alb))?;
        v.field("deployment-replicas-2048", F::U32(&mut self.deployment_replicas_2048))?;
        v.read_only("policy-cfn-stack-id")?;
        v.field("policy-name", F::Str(&mut self.policy_name))?;
        read_only(v, &["alb-arn", "alb-name", "url"])
    }
}

impl EnvFields for AddOnJobsPi {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("completes", F::U32(&mut self.completes))?;
        v.field("parallels", F::U32(&mut self.parallels))
    }
}

impl EnvFields for AddOnJobsEcho {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("completes", F::U32(&mut self.completes))?;
        v.field("parallels", F::U32(&mut self.parallels))?;
        v.field("echo-size", F::U32(&mut self.echo_size))
    }
}

impl EnvFields for AddOnCronJobs {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("schedule", F::Str(&mut self.schedule))?;
        v.field("completes", F::U32(&mut self.completes))?;
        v.field("parallels", F::U32(&mut self.parallels))?;
        v.field("successful-jobs-history-limit", F::U32(&mut self.successful_jobs_history_limit))?;
        v.field("failed-jobs-history-limit", F::U32(&mut self.failed_jobs_history_limit))?;
        v.field("echo-size", F::U32(&mut self.echo_size))
    }
}

impl EnvFields for AddOnCsrs {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("objects", F::U32(&mut self.objects))?;
        v.field(
            "initial-request-condition-type",
            F::Str(&mut self.initial_request_condition_type),
        )?;
        v.field("fail-threshold", F::U32(&mut self.fail_threshold))?;
        v.read_only("created-names")
    }
}

impl EnvFields for AddOnConfigMaps {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("objects", F::U32(&mut self.objects))?;
        v.field("size", F::U32(&mut self.size))?;
        v.field("fail-threshold", F::U32(&mut self.fail_threshold))?;
        v.read_only("created-names")
    }
}

impl EnvFields for AddOnSecrets {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("objects", F::U32(&mut self.objects))?;
        v.field("size", F::U32(&mut self.size))?;
        v.field("fail-threshold", F::U32(&mut self.fail_threshold))?;
        v.field("writes-result-path", F::Str(&mut self.writes_result_path))?;
        v.field("reads-result-path", F::Str(&mut self.reads_result_path))
    }
}

impl EnvFields for AddOnIrsa {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("role-name", F::Str(&mut self.role_name))?;
        v.field("role-arn", F::Str(&mut self.role_arn))?;
        v.field("role-managed-policy-arns", F::StrList(&mut self.role_managed_policy_arns))?;
        v.read_only("role-cfn-stack-id")?;
        v.field("service-account-name", F::Str(&mut self.service_account_name))?;
        v.field("config-map-name", F::Str(&mut self.config_map_name))?;
        v.field("config-map-script-file-name", F::Str(&mut self.config_map_script_file_name))?;
        v.field("s3-key", F::Str(&mut self.s3_key))?;
        v.field("deployment-name", F::Str(&mut self.deployment_name))?;
        v.field("deployment-replicas", F::U32(&mut self.deployment_replicas))?;
        v.field("deployment-result-path", F::Str(&mut self.deployment_result_path))
    }
}

impl EnvFields for AddOnFargate {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("role-name", F::Str(&mut self.role_name))?;
        v.field("role-create", F::Bool(&mut self.role_create))?;
        v.field("role-arn", F::Str(&mut self.role_arn))?;
        v.field("role-service-principals", F::StrList(&mut self.role_service_principals))?;
        v.field("role-managed-policy-arns", F::StrList(&mut self.role_managed_policy_arns))?;
        v.read_only("role-cfn-stack-id")?;
        v.field("profile-name", F::Str(&mut self.profile_name))?;
        v.field("secret-name", F::Str(&mut self.secret_name))?;
        v.field("pod-name", F::Str(&mut self.pod_name))?;
        v.field("container-name", F::Str(&mut self.container_name))
    }
}

impl EnvFields for AddOnIrsaFargate {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("role-name", F::Str(&mut self.role_name))?;
        v.field("role-arn", F::Str(&mut self.role_arn))?;
        v.field("role-service-principals", F::StrList(&mut self.role_service_principals))?;
        v.field("role-managed-policy-arns", F::StrList(&mut self.role_managed_policy_arns))?;
        v.read_only("role-cfn-stack-id")?;
        v.field("service-account-name", F::Str(&mut self.service_account_name))?;
        v.field("config-map-name", F::Str(&mut self.config_map_name))?;
        v.field("config-map-script-file-name", F::Str(&mut self.config_map_script_file_name))?;
        v.field("s3-key", F::Str(&mut self.s3_key))?;
        v.field("profile-name", F::Str(&mut self.profile_name))?;
        v.field("pod-name", F::Str(&mut self.pod_name))?;
        v.field("container-name", F::Str(&mut self.container_name))
    }
}

impl EnvFields for AddOnAppMesh {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("controller-image", F::Str(&mut self.controller_image))?;
        v.field("injector-image", F::Str(&mut self.injector_image))?;
        v.read_only("policy-cfn-stack-id")
    }
}

impl EnvFields for AddOnKubernetesDashboard {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("url", F::Str(&mut self.url))?;
        v.read_only("authentication-token")
    }
}

impl EnvFields for AddOnPrometheusGrafana {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("grafana-admin-user-name", F::Str(&mut self.grafana_admin_user_name))?;
        v.field("grafana-admin-password", F::Str(&mut self.grafana_admin_password))?;
        v.read_only("grafana-url")
    }
}

impl EnvFields for AddOnWordpress {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("user-name", F::Str(&mut self.user_name))?;
        v.field("password", F::Str(&mut self.password))?;
        v.read_only("url")
    }
}

impl EnvFields for AddOnJupyterHub {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("proxy-secret-token", F::Str(&mut self.proxy_secret_token))?;
        v.read_only("url")
    }
}

impl EnvFields for AddOnKubeflow {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("kfctl-path", F::Str(&mut self.kfctl_path))?;
        v.field("kfctl-download-url", F::Str(&mut self.kfctl_download_url))?;
        v.field("base-dir", F::Str(&mut self.base_dir))?;
        read_only(v, &["kf-dir", "kfctl-config-path"])
    }
}

impl EnvFields for AddOnClusterLoader {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("duration", F::Duration(&mut self.duration))?;
        v.read_only("duration-string")
    }
}

impl EnvFields for AddOnClusterLoaderRemote {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("s3-dir", F::Str(&mut self.s3_dir))?;
        v.field("namespace", F::Str(&mut self.namespace))?;

        v.field("repository-account-id", F::Str(&mut self.repository_account_id))?;
        v.field("repository-region", F::Str(&mut self.repository_region))?;
        v.field("repository-name", F::Str(&mut self.repository_name))?;
        v.field("repository-image-tag", F::Str(&mut self.repository_image_tag))?;

        v.field("cluster-loader-path", F::Str(&mut self.cluster_loader_path))?;
        v.field("cluster-loader-download-url", F::Str(&mut self.cluster_loader_download_url))?;

        read_only(
            v,
            &[
                "report-tar-gz-path",
                "report-tar-gz-s3-key",
                "log-path",
                "log-s3-key",
                "pod-startup-latency-path",
                "pod-startup-latency-s3-key",
            ],
        )?;

        v.field("runs", F::U32(&mut self.runs))?;
        v.field("timeout", F::Duration(&mut self.timeout))?;
        v.read_only("timeout-string")?;
        v.field("nodes", F::U32(&mut self.nodes))?;
        v.field("nodes-per-namespace", F::U32(&mut self.nodes_per_namespace))?;
        v.field("pods-per-node", F::U32(&mut self.pods_per_node))?;
        v.field("big-group-size", F::U32(&mut self.big_group_size))?;
        v.field("medium-group-size", F::U32(&mut self.medium_group_size))?;
        v.field("small-group-size", F::U32(&mut self.small_group_size))?;
        v.field(
            "small-stateful-sets-per-namespace",
            F::U32(&mut self.small_stateful_sets_per_namespace),
        )?;
        v.field(
            "medium-stateful-sets-per-namespace",
            F::U32(&mut self.medium_stateful_sets_per_namespace),
        )?;
        v.field("cl2-use-host-network-pods", F::Bool(&mut self.cl2_use_host_network_pods))?;
        v.field("cl2-load-test-throughput", F::U32(&mut self.cl2_load_test_throughput))?;
        v.field("cl2-enable-pvs", F::Bool(&mut self.cl2_enable_pvs))?;
        v.field("prometheus-scrape-kube-proxy", F::Bool(&mut self.prometheus_scrape_kube_proxy))?;
        v.field("enable-system-pod-metrics", F::Bool(&mut self.enable_system_pod_metrics))
    }
}

impl EnvFields for AddOnConformance {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("s3-dir", F::Str(&mut self.s3_dir))?;
        v.field("namespace", F::Str(&mut self.namespace))?;

        v.field("sonobuoy-path", F::Str(&mut self.sonobuoy_path))?;
        v.field("sonobuoy-download-url", F::Str(&mut self.sonobuoy_download_url))?;
        v.field("sonobuoy-e2e-repo-config", F::Str(&mut self.sonobuoy_e2e_repo_config))?;
        v.field("sonobuoy-image", F::Str(&mut self.sonobuoy_image))?;
        v.field("systemd-logs-image", F::Str(&mut self.systemd_logs_image))?;

        v.field("sonobuoy-delete-timeout", F::Duration(&mut self.sonobuoy_delete_timeout))?;
        v.read_only("sonobuoy-delete-timeout-string")?;
        v.field("sonobuoy-run-timeout", F::Duration(&mut self.sonobuoy_run_timeout))?;
        v.read_only("sonobuoy-run-timeout-string")?;

        v.field("sonobuoy-run-mode", F::Str(&mut self.sonobuoy_run_mode))?;
        v.field(
            "sonobuoy-run-kube-conformance-image",
            F::Str(&mut self.sonobuoy_run_kube_conformance_image),
        )?;
        v.field("sonobuoy-run-e2e-focus", F::Str(&mut self.sonobuoy_run_e2e_focus))?;
        v.field("sonobuoy-run-e2e-skip", F::Str(&mut self.sonobuoy_run_e2e_skip))?;

        read_only(
            v,
            &[
                "sonobuoy-result-tar-gz-path",
                "sonobuoy-result-tar-gz-s3-key",
                "sonobuoy-result-dir",
                "sonobuoy-result-e2e-log-path",
                "sonobuoy-result-e2e-log-s3-key",
                "sonobuoy-result-junit-xml-path",
                "sonobuoy-result-junit-xml-s3-key",
            ],
        )
    }
}

impl EnvFields for AddOnCniVpc {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("version", F::Str(&mut self.version))?;

        v.field("repository-init-account-id", F::Str(&mut self.repository_init_account_id))?;
        v.field("repository-init-region", F::Str(&mut self.repository_init_region))?;
        v.field("repository-init-name", F::Str(&mut self.repository_init_name))?;
        v.field("repository-init-image-tag", F::Str(&mut self.repository_init_image_tag))?;

        v.field("repository-account-id", F::Str(&mut self.repository_account_id))?;
        v.field("repository-region", F::Str(&mut self.repository_region))?;
        v.field("repository-name", F::Str(&mut self.repository_name))?;
        v.field("repository-image-tag", F::Str(&mut self.repository_image_tag))?;

        v.field("minimum-ip-target", F::U32(&mut self.minimum_ip_target))?;
        v.field("warm-ip-target", F::U32(&mut self.warm_ip_target))?;
        v.field("node-selector", F::StrMap(&mut self.node_selector))
    }
}

impl EnvFields for AddOnFluentd {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;

        v.field(
            "repository-busybox-account-id",
            F::Str(&mut self.repository_busybox_account_id),
        )?;
        v.field("repository-busybox-region", F::Str(&mut self.repository_busybox_region))?;
        v.field("repository-busybox-name", F::Str(&mut self.repository_busybox_name))?;
        v.field("repository-busybox-image-tag", F::Str(&mut self.repository_busybox_image_tag))?;

        v.field("threads", F::U32(&mut self.threads))?;
        v.field("metadata-log-level", F::Str(&mut self.metadata_log_level))?;
        v.field("metadata-cache-size", F::U32(&mut self.metadata_cache_size))?;
        v.field("metadata-watch", F::Bool(&mut self.metadata_watch))?;
        v.field("metadata-skip-labels", F::Bool(&mut self.metadata_skip_labels))?;
        v.field("metadata-skip-master-url", F::Bool(&mut self.metadata_skip_master_url))?;
        v.field(
            "metadata-skip-container-metadata",
            F::Bool(&mut self.metadata_skip_container_metadata),
        )?;
        v.field(
            "metadata-skip-namespace-metadata",
            F::Bool(&mut self.metadata_skip_namespace_metadata),
        )
    }
}

impl EnvFields for AddOnHollowNodesLocal {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("nodes", F::U32(&mut self.nodes))?;
        v.field("node-name-prefix", F::Str(&mut self.node_name_prefix))?;
        v.field("node-label-prefix", F::Str(&mut self.node_label_prefix))?;
        v.read_only("node-labels")?;
        v.field("max-open-files", F::U64(&mut self.max_open_files))?;
        v.read_only("created-node-names")
    }
}

impl EnvFields for AddOnHollowNodesRemote {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("repository-account-id", F::Str(&mut self.repository_account_id))?;
        v.field("repository-name", F::Str(&mut self.repository_name))?;
        v.field("repository-uri", F::Str(&mut self.repository_uri))?;
        v.field("repository-image-tag", F::Str(&mut self.repository_image_tag))?;
        v.field("nodes", F::U32(&mut self.nodes))?;
        v.field("deployment-replicas", F::U32(&mut self.deployment_replicas))?;
        v.field("node-label-prefix", F::Str(&mut self.node_label_prefix))?;
        v.read_only("node-labels")?;
        v.field("max-open-files", F::U64(&mut self.max_open_files))?;
        v.read_only("created-node-names")
    }
}

impl EnvFields for AddOnPhpApache {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("repository-account-id", F::Str(&mut self.repository_account_id))?;
        v.field("repository-region", F::Str(&mut self.repository_region))?;
        v.field("repository-name", F::Str(&mut self.repository_name))?;
        v.field("repository-image-tag", F::Str(&mut self.repository_image_tag))?;
        v.field("deployment-replicas", F::U32(&mut self.deployment_replicas))?;
        v.field("deployment-node-selector", F::StrMap(&mut self.deployment_node_selector))
    }
}

impl EnvFields for AddOnAmiSoftLockupIssue454 {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("namespace", F::Str(&mut self.namespace))?;
        v.field("deployment-replicas", F::U32(&mut self.deployment_replicas))?;
        v.field("deployment-node-selector", F::StrMap(&mut self.deployment_node_selector))
    }
}

impl EnvFields for AddOnClusterVersionUpgrade {
    fn visit_fields(&mut self, v: &mut dyn FieldVisitor) -> Result<()> {
        envelope(v, &mut self.enable)?;
        v.field("wait-before-upgrade", F::Duration(&mut self.wait_before_upgrade))?;
        v.read_only("wait-before-upgrade-string")?;
        v.field("version", F::Str(&mut self.version))?;
        v.read_only("version-value")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::addons::managed_node_groups::{MngScaleUpdate, MngVersionUpgrade};
    use crate::config::timeframe::TimeFrame;

    /// Serialization keys of a record, as declared.
    struct Keys(Vec<&'static str>);

    impl FieldVisitor for Keys {
        fn field(&mut self, key: &'static str, _field: F<'_>) -> Result<()> {
            self.0.push(key);
            Ok(())
        }

        fn read_only(&mut self, key: &'static str) -> Result<()> {
            self.0.push(key);
            Ok(())
        }
    }

    fn declared(record: &mut dyn EnvFields) -> Vec<&'static str> {
        let mut keys = Keys(Vec::new());
        record.visit_fields(&mut keys).unwrap();
        keys.0
    }

    fn serialized<T: serde::Serialize>(record: &T) -> Vec<String> {
        match serde_yaml::to_value(record).unwrap() {
            serde_yaml::Value::Mapping(map) => map
                .keys()
                .filter_map(|k| k.as_str().map(str::to_string))
                .collect(),
            other => panic!("not a mapping: {other:?}"),
        }
    }

    /// Every declared key must exist in the persisted form, and every
    /// persisted add-on field must be declared.
    #[test]
    fn test_add_on_declarations_match_serde_keys() {
        let mut cfg = Config::default();
        cfg.fill_absent_add_ons();
        let tree = serde_yaml::to_value(&cfg).unwrap();

        for kind in AddOnKind::ALL {
            let persisted = serialized(&tree[kind.key().as_str()]);
            let slot = slot_fields(&mut cfg, kind).unwrap();
            let mut keys = declared(slot);
            keys.sort_unstable();
            let mut expected: Vec<&str> = persisted.iter().map(String::as_str).collect();
            expected.sort_unstable();
            assert_eq!(keys, expected, "{kind}");
        }
    }

    #[test]
    fn test_root_declarations_cover_scalars() {
        let mut cfg = Config::default();
        let keys = declared(&mut cfg);
        for key in serialized(&cfg) {
            if key == "parameters" {
                continue;
            }
            assert!(keys.contains(&key.as_str()), "{key} not declared");
        }
    }

    #[test]
    fn test_parameter_declarations_match_serde_keys() {
        let mut params = Parameters::default();
        let mut keys = declared(&mut params);
        keys.sort_unstable();
        let mut expected = serialized(&params);
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_reset_mng_status_scale_updates() {
        let prior = BTreeMap::from([(
            "m".to_string(),
            Mng {
                scale_updates: vec![MngScaleUpdate {
                    id: "up".to_string(),
                    created: true,
                    ..MngScaleUpdate::default()
                }],
                ..Mng::default()
            },
        )]);
        let decoded = BTreeMap::from([(
            "m".to_string(),
            Mng {
                scale_updates: vec![
                    MngScaleUpdate {
                        id: "up".to_string(),
                        ..MngScaleUpdate::default()
                    },
                    MngScaleUpdate {
                        id: "new".to_string(),
                        created: true,
                        time_frame_create: TimeFrame {
                            took_string: "forged".to_string(),
                            ..TimeFrame::default()
                        },
                        ..MngScaleUpdate::default()
                    },
                ],
                version_upgrade: Some(MngVersionUpgrade {
                    created: true,
                    version_value: 9.9,
                    version: "1.16".to_string(),
                    ..MngVersionUpgrade::default()
                }),
                ..Mng::default()
            },
        )]);

        let out = reset_mng_status(&prior, decoded);
        let mng = &out["m"];
        assert!(mng.scale_updates[0].created);
        assert!(!mng.scale_updates[1].created);
        assert_eq!(mng.scale_updates[1].time_frame_create, TimeFrame::default());
        let upgrade = mng.version_upgrade.as_ref().unwrap();
        assert!(!upgrade.created);
        assert!(upgrade.version_value.abs() < f64::EPSILON);
        assert_eq!(upgrade.version, "1.16");
    }
}
