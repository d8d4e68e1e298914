//! Service-account roles and Fargate profiles.

use rand::Rng;

use super::{default_namespace, join, validate_role, RoleFields};
use crate::config::addons::identity::DEFAULT_IRSA_ROLE_MANAGED_POLICY_ARN;
use crate::config::addons::AddOnKind;
use crate::config::schema::Config;
use crate::error::{Error, Result};
use crate::random::rand_string;

pub(super) fn validate<R: Rng + ?Sized>(cfg: &mut Config, kind: AddOnKind, rng: &mut R) -> Result<()> {
    match kind {
        AddOnKind::Irsa => validate_irsa(cfg),
        AddOnKind::Fargate => validate_fargate(cfg, rng),
        AddOnKind::IrsaFargate => validate_irsa_fargate(cfg, rng),
        _ => Ok(()),
    }
}

fn require_bucket(cfg: &Config, kind: AddOnKind) -> Result<()> {
    if cfg.s3_bucket_name.is_empty() {
        Err(Error::cross(format!("{kind}.Enable true but empty S3BucketName")))
    } else {
        Ok(())
    }
}

fn set_if_empty(value: &mut String, default: impl FnOnce() -> String) {
    if value.is_empty() {
        *value = default();
    }
}

/// Profile names may not carry the reserved `eks-` prefix.
fn profile_name(value: &mut String, default: String) {
    set_if_empty(value, || default);
    if let Some(stripped) = value.strip_prefix("eks-") {
        *value = stripped.to_string();
    }
}

fn validate_irsa(cfg: &mut Config) -> Result<()> {
    require_bucket(cfg, AddOnKind::Irsa)?;
    let name = cfg.name.clone();
    let config_dir = cfg.config_dir();
    let Some(a) = cfg.add_on_irsa.as_mut() else {
        return Ok(());
    };

    default_namespace(&mut a.namespace, AddOnKind::Irsa, &name)?;
    set_if_empty(&mut a.role_name, || format!("{name}-role-irsa"));
    if a.role_managed_policy_arns.is_empty() {
        a.role_managed_policy_arns = vec![DEFAULT_IRSA_ROLE_MANAGED_POLICY_ARN.to_string()];
    }
    set_if_empty(&mut a.service_account_name, || format!("{name}-service-account-irsa"));
    set_if_empty(&mut a.config_map_name, || format!("{name}-configmap-irsa"));
    set_if_empty(&mut a.config_map_script_file_name, || format!("{name}-configmap-irsa.sh"));
    set_if_empty(&mut a.s3_key, || format!("{name}/s3-key-irsa"));
    set_if_empty(&mut a.deployment_name, || format!("{name}-deployment-irsa"));
    set_if_empty(&mut a.deployment_result_path, || {
        join(&config_dir, format!("{name}-deployment-irsa-result.log"))
    });
    Ok(())
}

fn validate_fargate<R: Rng + ?Sized>(cfg: &mut Config, rng: &mut R) -> Result<()> {
    let name = cfg.name.clone();
    let Some(a) = cfg.add_on_fargate.as_mut() else {
        return Ok(());
    };

    default_namespace(&mut a.namespace, AddOnKind::Fargate, &name)?;
    validate_role(RoleFields {
        field: "AddOnFargate",
        create: a.role_create,
        default_name: format!("{name}-role-fargate"),
        name: &mut a.role_name,
        arn: &a.role_arn,
        service_principals: &a.role_service_principals,
        managed_policy_arns: &a.role_managed_policy_arns,
    })?;
    profile_name(&mut a.profile_name, format!("{name}-fargate-profile"));

    set_if_empty(&mut a.secret_name, || format!("{name}addonfargatesecret"));
    a.secret_name = a
        .secret_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();

    set_if_empty(&mut a.pod_name, || format!("{name}-pod-fargate"));
    set_if_empty(&mut a.container_name, || format!("{name}-{}", rand_string(rng, 10)));
    Ok(())
}

fn validate_irsa_fargate<R: Rng + ?Sized>(cfg: &mut Config, rng: &mut R) -> Result<()> {
    require_bucket(cfg, AddOnKind::IrsaFargate)?;
    let name = cfg.name.clone();
    let Some(a) = cfg.add_on_irsa_fargate.as_mut() else {
        return Ok(());
    };

    default_namespace(&mut a.namespace, AddOnKind::IrsaFargate, &name)?;
    set_if_empty(&mut a.role_name, || format!("{name}-role-irsa-fargate"));
    if a.role_managed_policy_arns.is_empty() {
        a.role_managed_policy_arns = vec![DEFAULT_IRSA_ROLE_MANAGED_POLICY_ARN.to_string()];
    }
    set_if_empty(&mut a.service_account_name, || {
        format!("{name}-service-account-irsa-fargate")
    });
    set_if_empty(&mut a.config_map_name, || format!("{name}-configmap-irsa-fargate"));
    set_if_empty(&mut a.config_map_script_file_name, || {
        format!("{name}-configmap-irsa-fargate.sh")
    });
    set_if_empty(&mut a.s3_key, || format!("{name}/s3-key-irsa-fargate"));
    profile_name(&mut a.profile_name, format!("{name}-irsa-fargate-profile"));
    set_if_empty(&mut a.pod_name, || format!("{name}-pod-irsa-fargate"));
    set_if_empty(&mut a.container_name, || format!("{name}-{}", rand_string(rng, 10)));
    Ok(())
}
