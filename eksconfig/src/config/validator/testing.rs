//! Scale, conformance and upgrade test drivers.

use std::collections::BTreeMap;
use std::time::Duration;

use rand::Rng;

use super::{
    default_duration, default_namespace, default_with_suffix, join, parse_version, require_non_empty,
    s3_key,
};
use crate::config::addons::testing::{
    DEFAULT_CL2_LOAD_TEST_THROUGHPUT, DEFAULT_SONOBUOY_RUN_MODE, HOLLOW_NODE_LABEL_PREFIX_MAX,
    SONOBUOY_RUN_MODES,
};
use crate::config::addons::AddOnKind;
use crate::config::schema::Config;
use crate::duration::format_duration;
use crate::error::{Error, Result};
use crate::random::rand_string;

const DEFAULT_CLUSTER_LOADER_DURATION: Duration = Duration::from_secs(60);
const DEFAULT_SONOBUOY_DELETE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const DEFAULT_SONOBUOY_RUN_TIMEOUT: Duration = Duration::from_secs(5 * 60 * 60);
const DEFAULT_HOLLOW_NODES: u32 = 2;
const DEFAULT_HOLLOW_NODES_REMOTE_REPLICAS: u32 = 5;
const DEFAULT_MAX_OPEN_FILES: u64 = 1_000_000;

pub(super) fn validate<R: Rng + ?Sized>(cfg: &mut Config, kind: AddOnKind, rng: &mut R) -> Result<()> {
    match kind {
        AddOnKind::ClusterLoader => {
            if let Some(a) = cfg.add_on_cluster_loader.as_mut() {
                a.duration_string = default_duration(&mut a.duration, DEFAULT_CLUSTER_LOADER_DURATION);
            }
            Ok(())
        }
        AddOnKind::ClusterLoaderRemote => validate_cluster_loader_remote(cfg),
        AddOnKind::Conformance => validate_conformance(cfg),
        AddOnKind::HollowNodesLocal => validate_hollow_nodes_local(cfg, rng),
        AddOnKind::HollowNodesRemote => validate_hollow_nodes_remote(cfg, rng),
        AddOnKind::ClusterVersionUpgrade => {
            if let Some(a) = cfg.add_on_cluster_version_upgrade.as_mut() {
                a.wait_before_upgrade_string = format_duration(a.wait_before_upgrade);
                require_non_empty("AddOnClusterVersionUpgrade.Version", &a.version)?;
                a.version_value = parse_version("AddOnClusterVersionUpgrade.Version", &a.version)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn validate_cluster_loader_remote(cfg: &mut Config) -> Result<()> {
    let kind = AddOnKind::ClusterLoaderRemote;
    let name = cfg.name.clone();
    let region = cfg.region.clone();
    let config_dir = cfg.config_dir();
    let Some(a) = cfg.add_on_cluster_loader_remote.as_mut() else {
        return Ok(());
    };

    if a.s3_dir.is_empty() {
        a.s3_dir = format!("{name}/{}", kind.key());
    }
    default_namespace(&mut a.namespace, kind, &name)?;

    require_non_empty("AddOnClusterLoaderRemote.RepositoryAccountID", &a.repository_account_id)?;
    require_non_empty("AddOnClusterLoaderRemote.RepositoryName", &a.repository_name)?;
    require_non_empty("AddOnClusterLoaderRemote.RepositoryImageTag", &a.repository_image_tag)?;
    if a.repository_region.is_empty() {
        a.repository_region = region;
    }

    if a.cluster_loader_path.is_empty() && a.cluster_loader_download_url.is_empty() {
        return Err(Error::invariant(
            "AddOnClusterLoaderRemote.ClusterLoaderPath",
            "empty ClusterLoaderPath and ClusterLoaderDownloadURL",
        ));
    }

    default_with_suffix(
        "AddOnClusterLoaderRemote.ReportTarGzPath",
        &mut a.report_tar_gz_path,
        join(&config_dir, format!("{name}-cluster-loader-remote.tar.gz")),
        ".tar.gz",
    )?;
    if a.report_tar_gz_s3_key.is_empty() {
        a.report_tar_gz_s3_key = s3_key(&a.s3_dir, &a.report_tar_gz_path);
    }
    default_with_suffix(
        "AddOnClusterLoaderRemote.LogPath",
        &mut a.log_path,
        join(&config_dir, format!("{name}-cluster-loader-remote.log")),
        ".log",
    )?;
    if a.log_s3_key.is_empty() {
        a.log_s3_key = s3_key(&a.s3_dir, &a.log_path);
    }
    default_with_suffix(
        "AddOnClusterLoaderRemote.PodStartupLatencyPath",
        &mut a.pod_startup_latency_path,
        join(&config_dir, format!("{name}-cluster-loader-remote-pod-startup-latency.json")),
        ".json",
    )?;
    if a.pod_startup_latency_s3_key.is_empty() {
        a.pod_startup_latency_s3_key = s3_key(&a.s3_dir, &a.pod_startup_latency_path);
    }

    if a.runs == 0 {
        return Err(Error::invariant("AddOnClusterLoaderRemote.Runs", "must be > 0"));
    }
    if a.timeout.is_zero() {
        return Err(Error::invariant("AddOnClusterLoaderRemote.Timeout", "must be > 0"));
    }
    a.timeout_string = format_duration(a.timeout);
    if a.nodes == 0 {
        return Err(Error::invariant("AddOnClusterLoaderRemote.Nodes", "must be > 0"));
    }
    if a.cl2_load_test_throughput == 0 {
        a.cl2_load_test_throughput = DEFAULT_CL2_LOAD_TEST_THROUGHPUT;
    }
    if a.prometheus_scrape_kube_proxy {
        return Err(Error::invariant(
            "AddOnClusterLoaderRemote.PrometheusScrapeKubeProxy",
            "true is not supported",
        ));
    }
    if a.enable_system_pod_metrics {
        return Err(Error::invariant(
            "AddOnClusterLoaderRemote.EnableSystemPodMetrics",
            "true is not supported",
        ));
    }
    Ok(())
}

fn validate_conformance(cfg: &mut Config) -> Result<()> {
    let kind = AddOnKind::Conformance;
    if cfg.is_enabled(AddOnKind::ManagedNodeGroups) {
        return Err(Error::cross(format!(
            "{kind}.Enable true but AddOnManagedNodeGroups.Enable true; conformance runs on self-managed node groups only"
        )));
    }
    let name = cfg.name.clone();
    let version = cfg.parameters.version.clone();
    let config_dir = cfg.config_dir();
    let Some(a) = cfg.add_on_conformance.as_mut() else {
        return Ok(());
    };

    if a.s3_dir.is_empty() {
        a.s3_dir = format!("{name}/{}", kind.key());
    }
    default_namespace(&mut a.namespace, kind, &name)?;

    a.sonobuoy_delete_timeout_string =
        default_duration(&mut a.sonobuoy_delete_timeout, DEFAULT_SONOBUOY_DELETE_TIMEOUT);
    a.sonobuoy_run_timeout_string =
        default_duration(&mut a.sonobuoy_run_timeout, DEFAULT_SONOBUOY_RUN_TIMEOUT);

    if a.sonobuoy_run_mode.is_empty() {
        a.sonobuoy_run_mode = DEFAULT_SONOBUOY_RUN_MODE.to_string();
    }
    if !SONOBUOY_RUN_MODES.contains(&a.sonobuoy_run_mode.as_str()) {
        return Err(Error::invariant(
            "AddOnConformance.SonobuoyRunMode",
            format!(
                "unknown mode {:?}, expected one of {SONOBUOY_RUN_MODES:?}",
                a.sonobuoy_run_mode
            ),
        ));
    }
    if a.sonobuoy_run_kube_conformance_image.is_empty() {
        a.sonobuoy_run_kube_conformance_image = format!("k8s.gcr.io/conformance:v{version}.0");
    }

    if a.sonobuoy_result_dir.is_empty() {
        a.sonobuoy_result_dir = join(&config_dir, format!("{name}-sonobuoy-results"));
    }
    default_with_suffix(
        "AddOnConformance.SonobuoyResultTarGzPath",
        &mut a.sonobuoy_result_tar_gz_path,
        join(&config_dir, format!("{name}-sonobuoy-result.tar.gz")),
        ".tar.gz",
    )?;
    if a.sonobuoy_result_tar_gz_s3_key.is_empty() {
        a.sonobuoy_result_tar_gz_s3_key = s3_key(&a.s3_dir, &a.sonobuoy_result_tar_gz_path);
    }
    default_with_suffix(
        "AddOnConformance.SonobuoyResultE2ELogPath",
        &mut a.sonobuoy_result_e2e_log_path,
        join(&config_dir, format!("{name}-sonobuoy-result.e2e.log")),
        ".log",
    )?;
    if a.sonobuoy_result_e2e_log_s3_key.is_empty() {
        a.sonobuoy_result_e2e_log_s3_key = s3_key(&a.s3_dir, &a.sonobuoy_result_e2e_log_path);
    }
    default_with_suffix(
        "AddOnConformance.SonobuoyResultJunitXMLPath",
        &mut a.sonobuoy_result_junit_xml_path,
        join(&config_dir, format!("{name}-sonobuoy-result.junit.xml")),
        ".xml",
    )?;
    if a.sonobuoy_result_junit_xml_s3_key.is_empty() {
        a.sonobuoy_result_junit_xml_s3_key = s3_key(&a.s3_dir, &a.sonobuoy_result_junit_xml_path);
    }
    Ok(())
}

fn check_label_prefix(field: &str, prefix: &str) -> Result<()> {
    if prefix.len() > HOLLOW_NODE_LABEL_PREFIX_MAX {
        Err(Error::invariant(
            field,
            format!(
                "{prefix:?} is {} characters, at most {HOLLOW_NODE_LABEL_PREFIX_MAX} allowed",
                prefix.len()
            ),
        ))
    } else {
        Ok(())
    }
}

/// Labels the hollow kubelets register with, derived from the label prefix.
fn hollow_node_labels(prefix: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("AMIType".to_string(), format!("{prefix}-ami-type")),
        ("NGType".to_string(), format!("{prefix}-ng-type")),
        ("NGName".to_string(), format!("{prefix}-ng-name")),
    ])
}

fn validate_hollow_nodes_local<R: Rng + ?Sized>(cfg: &mut Config, rng: &mut R) -> Result<()> {
    let Some(a) = cfg.add_on_hollow_nodes_local.as_mut() else {
        return Ok(());
    };
    if a.nodes == 0 {
        a.nodes = DEFAULT_HOLLOW_NODES;
    }
    if a.node_name_prefix.is_empty() {
        a.node_name_prefix = format!("hollow{}", rand_string(rng, 5));
    }
    if a.node_label_prefix.is_empty() {
        a.node_label_prefix = format!("hollow{}", rand_string(rng, 5));
    }
    check_label_prefix("AddOnHollowNodesLocal.NodeLabelPrefix", &a.node_label_prefix)?;

    let mut labels = hollow_node_labels(&a.node_label_prefix);
    labels.insert("NodeType".to_string(), "hollow-node".to_string());
    a.node_labels = labels;

    if a.max_open_files == 0 {
        a.max_open_files = DEFAULT_MAX_OPEN_FILES;
    }
    Ok(())
}

fn validate_hollow_nodes_remote<R: Rng + ?Sized>(cfg: &mut Config, rng: &mut R) -> Result<()> {
    let kind = AddOnKind::HollowNodesRemote;
    let name = cfg.name.clone();
    let Some(a) = cfg.add_on_hollow_nodes_remote.as_mut() else {
        return Ok(());
    };

    default_namespace(&mut a.namespace, kind, &name)?;
    require_non_empty("AddOnHollowNodesRemote.RepositoryAccountID", &a.repository_account_id)?;
    require_non_empty("AddOnHollowNodesRemote.RepositoryName", &a.repository_name)?;
    require_non_empty("AddOnHollowNodesRemote.RepositoryURI", &a.repository_uri)?;
    require_non_empty("AddOnHollowNodesRemote.RepositoryImageTag", &a.repository_image_tag)?;
    if !a.repository_uri.contains(&a.repository_account_id) {
        return Err(Error::invariant(
            "AddOnHollowNodesRemote.RepositoryURI",
            format!(
                "{:?} does not contain RepositoryAccountID {:?}",
                a.repository_uri, a.repository_account_id
            ),
        ));
    }

    if a.nodes == 0 {
        a.nodes = DEFAULT_HOLLOW_NODES;
    }
    if a.deployment_replicas == 0 {
        a.deployment_replicas = DEFAULT_HOLLOW_NODES_REMOTE_REPLICAS;
    }
    if a.node_label_prefix.is_empty() {
        a.node_label_prefix = format!("fake{}", rand_string(rng, 10));
    }
    check_label_prefix("AddOnHollowNodesRemote.NodeLabelPrefix", &a.node_label_prefix)?;
    a.node_labels = hollow_node_labels(&a.node_label_prefix);

    if a.max_open_files == 0 {
        a.max_open_files = DEFAULT_MAX_OPEN_FILES;
    }
    Ok(())
}
