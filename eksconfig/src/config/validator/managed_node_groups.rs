//! Managed node groups and their post-create scale and upgrade plans.

use std::collections::BTreeMap;

use super::node_groups::{
    check_capacity, check_group_name, check_user, couple_replicas, default_instance_types,
    require_ec2_principal, Capacity, LoadBalancers,
};
use super::{default_with_suffix, join, parse_version, s3_key, validate_role, RoleFields};
use crate::config::addons::managed_node_groups::{MNGS_MAX_LIMIT, MNG_MAX_LIMIT};
use crate::config::addons::node_groups::{
    AMI_TYPE_AL2_X86_64, AMI_TYPE_AL2_X86_64_GPU, DEFAULT_NODE_VOLUME_SIZE,
    DEFAULT_REMOTE_ACCESS_USER_NAME, INSTANCE_TYPES_MAX,
};
use crate::config::addons::{expand_name_ref, AddOnKind, Mng};
use crate::config::schema::Config;
use crate::duration::format_duration;
use crate::error::{Error, Result};

/// Sibling state a managed group is checked against.
struct Context {
    cluster_name: String,
    config_base: String,
    cluster_version: String,
    cluster_version_value: f64,
    cluster_upgrade_enabled: bool,
    asg_names: Vec<String>,
    lb: LoadBalancers,
}

pub(super) fn validate(cfg: &mut Config) -> Result<()> {
    let config_dir = cfg.config_dir();
    let ctx = Context {
        cluster_name: cfg.name.clone(),
        config_base: cfg.config_base(),
        cluster_version: cfg.parameters.version.clone(),
        cluster_version_value: cfg.parameters.version_value,
        cluster_upgrade_enabled: cfg.is_enabled(AddOnKind::ClusterVersionUpgrade),
        asg_names: cfg
            .add_on_node_groups
            .as_ref()
            .filter(|ngs| ngs.enable)
            .map(|ngs| ngs.asgs.keys().cloned().collect())
            .unwrap_or_default(),
        lb: LoadBalancers::of(cfg),
    };
    let name = ctx.cluster_name.as_str();

    let Some(mngs) = cfg.add_on_managed_node_groups.as_mut() else {
        return Ok(());
    };

    let n = mngs.mngs.len();
    if n == 0 {
        return Err(Error::invariant("AddOnManagedNodeGroups.MNGs", "empty MNGs"));
    }
    if n > MNGS_MAX_LIMIT {
        return Err(Error::invariant(
            "AddOnManagedNodeGroups.MNGs",
            format!("{n} groups exceed the maximum of {MNGS_MAX_LIMIT}"),
        ));
    }

    if mngs.s3_dir.is_empty() {
        mngs.s3_dir = format!("{name}/{}", AddOnKind::ManagedNodeGroups.key());
    }
    if mngs.logs_dir.is_empty() {
        mngs.logs_dir = join(&config_dir, format!("{name}-logs-mngs"));
    }
    default_with_suffix(
        "AddOnManagedNodeGroups.LogsTarGzPath",
        &mut mngs.logs_tar_gz_path,
        join(&config_dir, format!("{name}-logs-mngs.tar.gz")),
        ".tar.gz",
    )?;
    if mngs.role_cfn_stack_yaml_path.is_empty() {
        mngs.role_cfn_stack_yaml_path =
            format!("{}.add-on-managed-node-groups.role.cfn.yaml", ctx.config_base);
    }
    if mngs.role_cfn_stack_yaml_s3_key.is_empty() {
        mngs.role_cfn_stack_yaml_s3_key = s3_key(&mngs.s3_dir, &mngs.role_cfn_stack_yaml_path);
    }

    if mngs.role_create {
        require_ec2_principal("AddOnManagedNodeGroups", &mngs.role_service_principals)?;
    }
    validate_role(RoleFields {
        field: "AddOnManagedNodeGroups",
        create: mngs.role_create,
        default_name: format!("{name}-role-mng"),
        name: &mut mngs.role_name,
        arn: &mngs.role_arn,
        service_principals: &mngs.role_service_principals,
        managed_policy_arns: &mngs.role_managed_policy_arns,
    })?;

    let s3_dir = mngs.s3_dir.clone();
    let mut processed = BTreeMap::new();
    for (key, mut mng) in std::mem::take(&mut mngs.mngs) {
        let key = expand_name_ref(&key, name);
        mng.name = expand_name_ref(&mng.name, name);
        check_group_name("AddOnManagedNodeGroups.MNGs", &key, &mng.name, &processed)?;
        if ctx.asg_names.contains(&mng.name) {
            return Err(Error::cross(format!(
                "AddOnManagedNodeGroups.MNGs[{key:?}] name conflicts with a self-managed node group"
            )));
        }
        validate_mng(&key, &mut mng, &ctx, &s3_dir)?;
        processed.insert(key, mng);
    }
    mngs.mngs = processed;

    let desired = mngs.max_desired_capacity();
    couple_replicas(cfg, desired);
    Ok(())
}

fn validate_mng(key: &str, mng: &mut Mng, ctx: &Context, s3_dir: &str) -> Result<()> {
    let field = format!("AddOnManagedNodeGroups.MNGs[{key:?}]");

    mng.status.release_version_value = release_version_value(&field, &mng.release_version)?;
    validate_scale_updates(&field, mng)?;
    validate_version_upgrade(&field, mng, ctx)?;

    if mng.instance_types.len() > INSTANCE_TYPES_MAX {
        return Err(Error::invariant(
            format!("{field}.InstanceTypes"),
            format!("too many instance types {:?}", mng.instance_types),
        ));
    }
    if mng.volume_size == 0 {
        mng.volume_size = DEFAULT_NODE_VOLUME_SIZE;
    }
    if mng.remote_access_user_name.is_empty() {
        mng.remote_access_user_name = DEFAULT_REMOTE_ACCESS_USER_NAME.to_string();
    }

    let status = &mut mng.status;
    if status.mng_cfn_stack_yaml_path.is_empty() {
        status.mng_cfn_stack_yaml_path = format!("{}.mng.cfn.{key}.yaml", ctx.config_base);
    }
    if status.mng_cfn_stack_yaml_s3_key.is_empty() {
        status.mng_cfn_stack_yaml_s3_key = s3_key(s3_dir, &status.mng_cfn_stack_yaml_path);
    }
    if status.remote_access_security_group_cfn_stack_yaml_path.is_empty() {
        status.remote_access_security_group_cfn_stack_yaml_path =
            format!("{}.mng-sg.cfn.{key}.yaml", ctx.config_base);
    }
    if status.remote_access_security_group_cfn_stack_yaml_s3_key.is_empty() {
        status.remote_access_security_group_cfn_stack_yaml_s3_key =
            s3_key(s3_dir, &status.remote_access_security_group_cfn_stack_yaml_path);
    }

    match mng.ami_type.as_str() {
        AMI_TYPE_AL2_X86_64 | AMI_TYPE_AL2_X86_64_GPU => {
            check_user(&field, &mng.ami_type, &mng.remote_access_user_name)?;
        }
        other => {
            return Err(Error::invariant(
                format!("{field}.AMIType"),
                format!("unknown AMI type {other:?}"),
            ))
        }
    }
    default_instance_types(&mng.ami_type, &mut mng.instance_types);
    ctx.lb.check_instance_types(&field, &mng.instance_types)?;

    check_capacity(
        &field,
        Capacity {
            min: &mut mng.asg_min_size,
            desired: mng.asg_desired_capacity,
            max: &mut mng.asg_max_size,
            limit: MNG_MAX_LIMIT,
        },
    )
}

/// `1.16` from a release version such as `1.16.8-20200609`; zero when unset.
fn release_version_value(field: &str, release_version: &str) -> Result<f64> {
    let parts: Vec<&str> = release_version.split('.').collect();
    if parts.len() <= 2 {
        return Ok(0.0);
    }
    parse_version(&format!("{field}.ReleaseVersion"), &parts[..2].join("."))
}

fn validate_scale_updates(field: &str, mng: &mut Mng) -> Result<()> {
    for (idx, update) in mng.scale_updates.iter_mut().enumerate() {
        if !update.enable {
            continue;
        }
        update.initial_wait_string = format_duration(update.initial_wait);
        if update.asg_desired_capacity == 0 {
            return Err(Error::invariant(
                format!("{field}.ScaleUpdates[{idx}].ASGDesiredCapacity"),
                "must be > 0",
            ));
        }
        if update.asg_desired_capacity < update.asg_min_size {
            return Err(Error::invariant(
                format!("{field}.ScaleUpdates[{idx}].ASGDesiredCapacity"),
                format!(
                    "ASGDesiredCapacity {} < ASGMinSize {}",
                    update.asg_desired_capacity, update.asg_min_size
                ),
            ));
        }
    }
    Ok(())
}

/// An upgrade targets exactly one minor above the group's release version,
/// or above the cluster version when no release version is pinned.
fn validate_version_upgrade(field: &str, mng: &mut Mng, ctx: &Context) -> Result<()> {
    let release_value = mng.status.release_version_value;
    let Some(upgrade) = mng.version_upgrade.as_mut().filter(|u| u.enable) else {
        return Ok(());
    };
    upgrade.initial_wait_string = format_duration(upgrade.initial_wait);

    let target_field = format!("{field}.VersionUpgrade.Version");
    if upgrade.version.is_empty() {
        return Err(Error::invariant(target_field, "VersionUpgrade.Enable but empty Version"));
    }
    upgrade.version_value = parse_version(&target_field, &upgrade.version)?;

    let baseline = if release_value > 0.0 {
        release_value
    } else {
        ctx.cluster_version_value
    };
    let delta = format!("{:.2}", upgrade.version_value - baseline);
    if delta != "0.01" {
        return Err(Error::invariant(
            target_field,
            format!(
                "only a single minor version upgrade is supported but got {delta} \
                 [cluster version {:?}, release version {:?}, upgrade version {:?}]",
                ctx.cluster_version, mng.release_version, upgrade.version
            ),
        ));
    }
    if release_value == 0.0 && !ctx.cluster_upgrade_enabled {
        return Err(Error::cross(format!(
            "{field} VersionUpgrade {:?} would diverge from Parameters.Version {:?} \
             without AddOnClusterVersionUpgrade",
            upgrade.version, ctx.cluster_version
        )));
    }
    Ok(())
}
