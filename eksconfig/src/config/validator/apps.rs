//! Application stacks installed on top of the workers.

use rand::Rng;
use std::path::Path;

use super::{default_namespace, join, require_non_empty};
use crate::config::addons::apps::{
    APP_MESH_NAMESPACE, CNI_VPC_VERSION, DEFAULT_KUBERNETES_DASHBOARD_URL,
    JUPYTER_HUB_PROXY_SECRET_TOKEN_BYTES,
};
use crate::config::addons::node_groups::{AMI_TYPE_AL2_X86_64, AMI_TYPE_AL2_X86_64_GPU};
use crate::config::addons::AddOnKind;
use crate::config::schema::Config;
use crate::error::{Error, Result};
use crate::random::{rand_hex, rand_string};

pub(super) fn validate<R: Rng + ?Sized>(cfg: &mut Config, kind: AddOnKind, rng: &mut R) -> Result<()> {
    let name = cfg.name.clone();
    let region = cfg.region.clone();

    match kind {
        AddOnKind::AppMesh => {
            if let Some(a) = cfg.add_on_app_mesh.as_mut() {
                if a.namespace.is_empty() {
                    a.namespace = APP_MESH_NAMESPACE.to_string();
                }
            }
        }
        AddOnKind::KubernetesDashboard => {
            if let Some(a) = cfg.add_on_kubernetes_dashboard.as_mut() {
                if a.url.is_empty() {
                    a.url = DEFAULT_KUBERNETES_DASHBOARD_URL.to_string();
                }
            }
        }
        AddOnKind::PrometheusGrafana => {
            require_block_storage(cfg, kind)?;
            if let Some(a) = cfg.add_on_prometheus_grafana.as_mut() {
                if a.grafana_admin_user_name.is_empty() {
                    a.grafana_admin_user_name = rand_string(rng, 10);
                }
                if a.grafana_admin_password.is_empty() {
                    a.grafana_admin_password = rand_string(rng, 10);
                }
            }
        }
        AddOnKind::Wordpress => {
            require_block_storage(cfg, kind)?;
            if let Some(a) = cfg.add_on_wordpress.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                if a.user_name.is_empty() {
                    a.user_name = "user".to_string();
                }
                if a.password.is_empty() {
                    a.password = rand_string(rng, 10);
                }
            }
        }
        AddOnKind::JupyterHub => {
            if !node_group_ami_types(cfg).contains(&AMI_TYPE_AL2_X86_64_GPU.to_string()) {
                return Err(Error::capability(format!(
                    "{kind}.Enable true but no node group has AMI type {AMI_TYPE_AL2_X86_64_GPU:?}"
                )));
            }
            if let Some(a) = cfg.add_on_jupyter_hub.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                if a.proxy_secret_token.is_empty() {
                    a.proxy_secret_token = rand_hex(rng, JUPYTER_HUB_PROXY_SECRET_TOKEN_BYTES);
                }
                if let Err(e) = hex::decode(&a.proxy_secret_token) {
                    return Err(Error::invariant(
                        "AddOnJupyterHub.ProxySecretToken",
                        format!("must be hex encoded ({e})"),
                    ));
                }
            }
        }
        AddOnKind::Kubeflow => {
            let config_dir = cfg.config_dir();
            if let Some(a) = cfg.add_on_kubeflow.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                if a.base_dir.is_empty() {
                    a.base_dir = join(&config_dir, format!("{name}-kubeflow"));
                }
                if a.kf_dir.is_empty() {
                    a.kf_dir = join(Path::new(&a.base_dir), &name);
                }
                if a.kfctl_config_path.is_empty() {
                    a.kfctl_config_path = join(Path::new(&a.kf_dir), "kfctl_aws.yaml");
                }
            }
        }
        AddOnKind::CniVpc => {
            if let Some(a) = cfg.add_on_cni_vpc.as_mut() {
                if a.version != CNI_VPC_VERSION {
                    return Err(Error::invariant(
                        "AddOnCNIVPC.Version",
                        format!("{:?} is not supported, expected {CNI_VPC_VERSION:?}", a.version),
                    ));
                }
                require_non_empty("AddOnCNIVPC.RepositoryInitAccountID", &a.repository_init_account_id)?;
                require_non_empty("AddOnCNIVPC.RepositoryInitName", &a.repository_init_name)?;
                require_non_empty("AddOnCNIVPC.RepositoryInitImageTag", &a.repository_init_image_tag)?;
                require_non_empty("AddOnCNIVPC.RepositoryAccountID", &a.repository_account_id)?;
                require_non_empty("AddOnCNIVPC.RepositoryName", &a.repository_name)?;
                require_non_empty("AddOnCNIVPC.RepositoryImageTag", &a.repository_image_tag)?;
                if a.repository_init_region.is_empty() {
                    a.repository_init_region.clone_from(&region);
                }
                if a.repository_region.is_empty() {
                    a.repository_region = region;
                }
            }
        }
        AddOnKind::Fluentd => {
            if let Some(a) = cfg.add_on_fluentd.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                if a.repository_busybox_region.is_empty() {
                    a.repository_busybox_region = region;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn require_block_storage(cfg: &Config, kind: AddOnKind) -> Result<()> {
    if !cfg.is_enabled(AddOnKind::CsiEbs) {
        return Err(Error::cross(format!(
            "{kind}.Enable true but AddOnCSIEBS.Enable false"
        )));
    }
    let amis = node_group_ami_types(cfg);
    if !amis.iter().any(|t| t == AMI_TYPE_AL2_X86_64 || t == AMI_TYPE_AL2_X86_64_GPU) {
        return Err(Error::capability(format!(
            "{kind} needs an Amazon Linux 2 node group but got AMI types {amis:?}"
        )));
    }
    Ok(())
}

/// AMI types of every enabled node group, self-managed and managed.
fn node_group_ami_types(cfg: &Config) -> Vec<String> {
    let ngs = cfg
        .add_on_node_groups
        .iter()
        .filter(|ngs| ngs.enable)
        .flat_map(|ngs| ngs.asgs.values().map(|asg| asg.ami_type.clone()));
    let mngs = cfg
        .add_on_managed_node_groups
        .iter()
        .filter(|mngs| mngs.enable)
        .flat_map(|mngs| mngs.mngs.values().map(|mng| mng.ami_type.clone()));
    ngs.chain(mngs).collect()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{base_config, validate, with_mng, with_ng};
    use super::*;
    use crate::config::addons::node_groups::AMI_TYPE_BOTTLEROCKET_CPU;

    fn with_workers(dir: &std::path::Path, ami_type: &str) -> Config {
        let mut cfg = base_config(dir);
        with_ng(&mut cfg, ami_type, 2);
        cfg
    }

    #[test]
    fn test_app_mesh_and_dashboard_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = with_workers(dir.path(), AMI_TYPE_AL2_X86_64);
        cfg.add_on_app_mesh.as_mut().unwrap().enable = true;
        let dashboard = cfg.add_on_kubernetes_dashboard.as_mut().unwrap();
        dashboard.enable = true;
        dashboard.url.clear();
        validate(&mut cfg).unwrap();
        assert_eq!(cfg.add_on_app_mesh.as_ref().unwrap().namespace, APP_MESH_NAMESPACE);
        assert_eq!(
            cfg.add_on_kubernetes_dashboard.as_ref().unwrap().url,
            DEFAULT_KUBERNETES_DASHBOARD_URL
        );
    }

    #[test]
    fn test_storage_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = with_workers(dir.path(), AMI_TYPE_AL2_X86_64);
        cfg.add_on_wordpress.as_mut().unwrap().enable = true;
        let err = validate(&mut cfg).unwrap_err();
        assert_eq!(err.step(), Some("validateAddOnWordpress"));
        assert!(err.root_kind().is_cross_constraint());

        cfg.add_on_csi_ebs.as_mut().unwrap().enable = true;
        validate(&mut cfg).unwrap();
        let wp = cfg.add_on_wordpress.as_ref().unwrap();
        assert_eq!(wp.user_name, "user");
        assert_eq!(wp.password.len(), 10);
        assert_eq!(wp.namespace, "c1-wordpress");
    }

    #[test]
    fn test_bottlerocket_only_lacks_capability() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = with_workers(dir.path(), AMI_TYPE_BOTTLEROCKET_CPU);
        cfg.add_on_csi_ebs.as_mut().unwrap().enable = true;
        cfg.add_on_prometheus_grafana.as_mut().unwrap().enable = true;
        let err = validate(&mut cfg).unwrap_err();
        assert!(err.root_kind().is_capability_missing());

        with_mng(&mut cfg, 1);
        validate(&mut cfg).unwrap();
        let pg = cfg.add_on_prometheus_grafana.as_ref().unwrap();
        assert_eq!(pg.grafana_admin_user_name, "admin");
        assert_eq!(pg.grafana_admin_password.len(), 10);
    }

    #[test]
    fn test_jupyter_hub_needs_gpu() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = with_workers(dir.path(), AMI_TYPE_AL2_X86_64);
        cfg.add_on_jupyter_hub.as_mut().unwrap().enable = true;
        assert!(validate(&mut cfg).unwrap_err().root_kind().is_capability_missing());

        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64_GPU, 1);
        validate(&mut cfg).unwrap();
        let token = &cfg.add_on_jupyter_hub.as_ref().unwrap().proxy_secret_token;
        assert_eq!(token.len(), 2 * JUPYTER_HUB_PROXY_SECRET_TOKEN_BYTES);
        assert!(hex::decode(token).is_ok());
    }

    #[test]
    fn test_jupyter_hub_rejects_non_hex_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = with_workers(dir.path(), AMI_TYPE_AL2_X86_64_GPU);
        let hub = cfg.add_on_jupyter_hub.as_mut().unwrap();
        hub.enable = true;
        hub.proxy_secret_token = "not-hex".to_string();
        assert!(validate(&mut cfg).unwrap_err().to_string().contains("hex"));
    }

    #[test]
    fn test_kubeflow_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = with_workers(dir.path(), AMI_TYPE_AL2_X86_64);
        cfg.add_on_kubeflow.as_mut().unwrap().enable = true;
        validate(&mut cfg).unwrap();
        let kf = cfg.add_on_kubeflow.as_ref().unwrap();
        assert_eq!(kf.base_dir, join(dir.path(), "c1-kubeflow"));
        assert_eq!(kf.kf_dir, join(&dir.path().join("c1-kubeflow"), "c1"));
        assert!(kf.kfctl_config_path.ends_with("kfctl_aws.yaml"));
    }

    #[test]
    fn test_cni_vpc_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        cfg.add_on_cni_vpc.as_mut().unwrap().enable = true;
        let err = validate(&mut cfg).unwrap_err();
        assert_eq!(err.step(), Some("validateAddOnCNIVPC"));
        assert!(err.to_string().contains("RepositoryInitAccountID"));

        {
            let cni = cfg.add_on_cni_vpc.as_mut().unwrap();
            cni.repository_init_account_id = "123".to_string();
            cni.repository_init_name = "amazon-k8s-cni-init".to_string();
            cni.repository_init_image_tag = "v1.7.0".to_string();
            cni.repository_account_id = "123".to_string();
            cni.repository_name = "amazon-k8s-cni".to_string();
            cni.repository_image_tag = "v1.7.0".to_string();
        }
        validate(&mut cfg).unwrap();
        let cni = cfg.add_on_cni_vpc.as_ref().unwrap();
        assert_eq!(cni.repository_region, cfg.region);
        assert_eq!(cni.repository_init_region, cfg.region);

        cfg.add_on_cni_vpc.as_mut().unwrap().version = "v1.6".to_string();
        assert!(validate(&mut cfg).unwrap_err().root_kind().is_invariant());
    }
}
