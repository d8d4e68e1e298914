//! Self-managed node groups, plus the rules both node-group kinds share.

use std::collections::BTreeMap;

use super::{default_with_suffix, join, validate_role, RoleFields};
use crate::config::addons::node_groups::{
    AMI_TYPE_AL2_X86_64, AMI_TYPE_AL2_X86_64_GPU, AMI_TYPE_BOTTLEROCKET_CPU,
    DEFAULT_NODE_INSTANCE_TYPE_CPU, DEFAULT_NODE_INSTANCE_TYPE_GPU, DEFAULT_NODE_VOLUME_SIZE,
    DEFAULT_REMOTE_ACCESS_USER_NAME, INSTANCE_TYPES_MAX, NGS_MAX_LIMIT, NG_MAX_LIMIT,
};
use crate::config::addons::{expand_name_ref, AddOnKind, Asg};
use crate::config::schema::Config;
use crate::error::{Error, Result};

/// Trust principal every worker role needs.
pub(super) const EC2_PRINCIPAL: &str = "ec2.amazonaws.com";

/// Instance families whose targets load balancers reject.
const LOAD_BALANCER_UNSUPPORTED_FAMILIES: [&str; 2] = ["m3.", "c4."];

pub(super) fn validate(cfg: &mut Config) -> Result<()> {
    let name = cfg.name.clone();
    let config_dir = cfg.config_dir();
    let has_bucket = !cfg.s3_bucket_name.is_empty();
    let lb = LoadBalancers::of(cfg);

    let Some(ngs) = cfg.add_on_node_groups.as_mut() else {
        return Ok(());
    };

    let n = ngs.asgs.len();
    if n == 0 {
        return Err(Error::invariant("AddOnNodeGroups.ASGs", "empty ASGs"));
    }
    if n > NGS_MAX_LIMIT {
        return Err(Error::invariant(
            "AddOnNodeGroups.ASGs",
            format!("{n} groups exceed the maximum of {NGS_MAX_LIMIT}"),
        ));
    }

    if ngs.s3_dir.is_empty() {
        ngs.s3_dir = format!("{name}/{}", AddOnKind::NodeGroups.key());
    }
    if ngs.logs_dir.is_empty() {
        ngs.logs_dir = join(&config_dir, format!("{name}-logs-ngs"));
    }
    default_with_suffix(
        "AddOnNodeGroups.LogsTarGzPath",
        &mut ngs.logs_tar_gz_path,
        join(&config_dir, format!("{name}-logs-ngs.tar.gz")),
        ".tar.gz",
    )?;

    if ngs.role_create {
        require_ec2_principal("AddOnNodeGroups", &ngs.role_service_principals)?;
    }
    validate_role(RoleFields {
        field: "AddOnNodeGroups",
        create: ngs.role_create,
        default_name: format!("{name}-role-ng"),
        name: &mut ngs.role_name,
        arn: &ngs.role_arn,
        service_principals: &ngs.role_service_principals,
        managed_policy_arns: &ngs.role_managed_policy_arns,
    })?;

    let mut processed = BTreeMap::new();
    for (key, mut asg) in std::mem::take(&mut ngs.asgs) {
        let key = expand_name_ref(&key, &name);
        asg.name = expand_name_ref(&asg.name, &name);
        check_group_name("AddOnNodeGroups.ASGs", &key, &asg.name, &processed)?;
        validate_asg(&key, &mut asg, &name, has_bucket, lb)?;
        processed.insert(key, asg);
    }
    ngs.asgs = processed;

    let desired = ngs.max_desired_capacity();
    couple_replicas(cfg, desired);
    Ok(())
}

fn validate_asg(key: &str, asg: &mut Asg, cluster_name: &str, has_bucket: bool, lb: LoadBalancers) -> Result<()> {
    let field = format!("AddOnNodeGroups.ASGs[{key:?}]");

    if asg.instance_types.len() > INSTANCE_TYPES_MAX {
        return Err(Error::invariant(
            format!("{field}.InstanceTypes"),
            format!("too many instance types {:?}", asg.instance_types),
        ));
    }
    if asg.volume_size == 0 {
        asg.volume_size = DEFAULT_NODE_VOLUME_SIZE;
    }
    if asg.remote_access_user_name.is_empty() {
        asg.remote_access_user_name = DEFAULT_REMOTE_ACCESS_USER_NAME.to_string();
    }
    if asg.image_id.is_empty() && asg.image_id_ssm_parameter.is_empty() {
        return Err(Error::invariant(
            format!("{field}.ImageID"),
            "both ImageID and ImageIDSSMParameter are empty",
        ));
    }

    match asg.ami_type.as_str() {
        AMI_TYPE_BOTTLEROCKET_CPU => {
            check_user(&field, &asg.ami_type, &asg.remote_access_user_name)?;
            if !asg.ssm_document_name.is_empty() && !has_bucket {
                return Err(Error::cross(format!(
                    "{field} AMIType {:?} with SSMDocumentName {:?} requires S3BucketName",
                    asg.ami_type, asg.ssm_document_name
                )));
            }
            if !asg.kubelet_extra_args.is_empty() {
                return Err(Error::cross(format!(
                    "{field} AMIType {:?} does not take KubeletExtraArgs {:?}",
                    asg.ami_type, asg.kubelet_extra_args
                )));
            }
        }
        AMI_TYPE_AL2_X86_64 | AMI_TYPE_AL2_X86_64_GPU => {
            check_user(&field, &asg.ami_type, &asg.remote_access_user_name)?;
        }
        other => {
            return Err(Error::invariant(
                format!("{field}.AMIType"),
                format!("unknown AMI type {other:?}"),
            ))
        }
    }
    default_instance_types(&asg.ami_type, &mut asg.instance_types);
    lb.check_instance_types(&field, &asg.instance_types)?;

    check_capacity(
        &field,
        Capacity {
            min: &mut asg.asg_min_size,
            desired: asg.asg_desired_capacity,
            max: &mut asg.asg_max_size,
            limit: NG_MAX_LIMIT,
        },
    )?;

    if asg.ssm_document_create {
        if asg.ssm_document_cfn_stack_name.is_empty() {
            asg.ssm_document_cfn_stack_name = format!("{}-ssm-document", asg.name);
        }
        if asg.ssm_document_name.is_empty() {
            asg.ssm_document_name = format!("{}SSMDocument", asg.name);
        }
        if asg.ssm_document_execution_timeout_in_seconds == 0 {
            asg.ssm_document_execution_timeout_in_seconds = 3600;
        }
    }
    asg.ssm_document_cfn_stack_name = expand_name_ref(&asg.ssm_document_cfn_stack_name, cluster_name);
    asg.ssm_document_name = expand_name_ref(&asg.ssm_document_name, cluster_name)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    Ok(())
}

/// NLB and ALB enable flags, read before a node-group slot is borrowed.
#[derive(Debug, Clone, Copy)]
pub(super) struct LoadBalancers {
    nlb: bool,
    alb: bool,
}

impl LoadBalancers {
    pub(super) fn of(cfg: &Config) -> Self {
        Self {
            nlb: cfg.is_enabled(AddOnKind::NlbHelloWorld),
            alb: cfg.is_enabled(AddOnKind::Alb2048),
        }
    }

    /// Rejects instance families load-balancer target groups cannot register.
    pub(super) fn check_instance_types(self, field: &str, instance_types: &[String]) -> Result<()> {
        if !self.nlb && !self.alb {
            return Ok(());
        }
        match instance_types
            .iter()
            .find(|t| LOAD_BALANCER_UNSUPPORTED_FAMILIES.iter().any(|f| t.starts_with(f)))
        {
            Some(t) => Err(Error::cross(format!(
                "AddOnNLBHelloWorld.Enable {} || AddOnALB2048.Enable {}, but {field} has older instance type {t:?}",
                self.nlb, self.alb
            ))),
            None => Ok(()),
        }
    }
}

/// Scaling bounds of one group.
pub(super) struct Capacity<'a> {
    pub min: &'a mut u32,
    pub desired: u32,
    pub max: &'a mut u32,
    pub limit: u32,
}

/// Defaults missing bounds to the desired capacity and checks
/// `min <= desired <= max <= limit`.
pub(super) fn check_capacity(field: &str, c: Capacity<'_>) -> Result<()> {
    if *c.min == 0 && c.desired == 0 {
        return Err(Error::invariant(
            format!("{field}.ASGDesiredCapacity"),
            "ASGMinSize or ASGDesiredCapacity must be > 0",
        ));
    }
    if *c.min == 0 {
        *c.min = c.desired;
    }
    if *c.min > c.desired {
        return Err(Error::invariant(
            format!("{field}.ASGMinSize"),
            format!("ASGMinSize {} > ASGDesiredCapacity {}", c.min, c.desired),
        ));
    }
    if *c.max == 0 {
        *c.max = c.desired;
    }
    if *c.min > *c.max {
        return Err(Error::invariant(
            format!("{field}.ASGMinSize"),
            format!("ASGMinSize {} > ASGMaxSize {}", c.min, c.max),
        ));
    }
    if c.desired > *c.max {
        return Err(Error::invariant(
            format!("{field}.ASGDesiredCapacity"),
            format!("ASGDesiredCapacity {} > ASGMaxSize {}", c.desired, c.max),
        ));
    }
    if *c.max > c.limit {
        return Err(Error::invariant(
            format!("{field}.ASGMaxSize"),
            format!("ASGMaxSize {} > limit {}", c.max, c.limit),
        ));
    }
    Ok(())
}

/// Raises load-balancer replica counts to `desired`.
pub(super) fn couple_replicas(cfg: &mut Config, desired: u32) {
    if let Some(nlb) = cfg.add_on_nlb_hello_world.as_mut().filter(|a| a.enable) {
        nlb.deployment_replicas = nlb.deployment_replicas.max(desired);
    }
    if let Some(guestbook) = cfg.add_on_nlb_guestbook.as_mut().filter(|a| a.enable) {
        guestbook.deployment_replicas = guestbook.deployment_replicas.max(desired);
    }
    if let Some(alb) = cfg.add_on_alb_2048.as_mut().filter(|a| a.enable) {
        alb.deployment_replicas_alb = alb.deployment_replicas_alb.max(desired);
        alb.deployment_replicas_2048 = alb.deployment_replicas_2048.max(desired);
    }
}

/// A group's name must be set, match its key and be unique.
pub(super) fn check_group_name<V>(field: &str, key: &str, name: &str, seen: &BTreeMap<String, V>) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invariant(format!("{field}[{key:?}].Name"), "must not be empty"));
    }
    if key != name {
        return Err(Error::invariant(
            format!("{field}[{key:?}].Name"),
            format!("name {name:?} differs from its key"),
        ));
    }
    if seen.contains_key(name) {
        return Err(Error::invariant(
            format!("{field}[{key:?}].Name"),
            format!("{name:?} is redundant"),
        ));
    }
    Ok(())
}

pub(super) fn check_user(field: &str, ami_type: &str, user: &str) -> Result<()> {
    if user == DEFAULT_REMOTE_ACCESS_USER_NAME {
        Ok(())
    } else {
        Err(Error::cross(format!(
            "{field} AMIType {ami_type:?} but unexpected RemoteAccessUserName {user:?}"
        )))
    }
}

pub(super) fn default_instance_types(ami_type: &str, instance_types: &mut Vec<String>) {
    if instance_types.is_empty() {
        let default = if ami_type == AMI_TYPE_AL2_X86_64_GPU {
            DEFAULT_NODE_INSTANCE_TYPE_GPU
        } else {
            DEFAULT_NODE_INSTANCE_TYPE_CPU
        };
        instance_types.push(default.to_string());
    }
}

pub(super) fn require_ec2_principal(field: &str, principals: &[String]) -> Result<()> {
    if principals.is_empty()
        || principals
            .iter()
            .any(|p| p == EC2_PRINCIPAL || p == "ec2.amazonaws.com.cn")
    {
        Ok(())
    } else {
        Err(Error::invariant(
            format!("{field}.RoleServicePrincipals"),
            format!("{principals:?} must include '{EC2_PRINCIPAL}'"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{base_config, validate, with_ng};
    use super::*;

    fn asg(cfg: &Config) -> &Asg {
        &cfg.add_on_node_groups.as_ref().unwrap().asgs["c1-ng"]
    }

    #[test]
    fn test_asg_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64_GPU, 2);
        validate(&mut cfg).unwrap();

        let ngs = cfg.add_on_node_groups.as_ref().unwrap();
        assert_eq!(ngs.role_name, "c1-role-ng");
        assert_eq!(ngs.s3_dir, "c1/add-on-node-groups");
        assert!(ngs.logs_dir.ends_with("c1-logs-ngs"));
        assert!(ngs.logs_tar_gz_path.ends_with("c1-logs-ngs.tar.gz"));
        let a = asg(&cfg);
        assert_eq!(a.instance_types, vec![DEFAULT_NODE_INSTANCE_TYPE_GPU.to_string()]);
        assert_eq!(a.volume_size, 40);
        assert_eq!(a.remote_access_user_name, "ec2-user");
    }

    #[test]
    fn test_get_ref_name_expanded_in_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, 1);
        let ngs = cfg.add_on_node_groups.as_mut().unwrap();
        let mut a = ngs.asgs.remove("c1-ng").unwrap();
        a.name = "GetRef.Name-ng".to_string();
        ngs.asgs.insert("GetRef.Name-ng".to_string(), a);
        validate(&mut cfg).unwrap();
        assert!(cfg.add_on_node_groups.as_ref().unwrap().asgs.contains_key("c1-ng"));
    }

    #[test]
    fn test_name_must_match_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, 1);
        cfg.add_on_node_groups.as_mut().unwrap().asgs.get_mut("c1-ng").unwrap().name = "other".to_string();
        let err = validate(&mut cfg).unwrap_err();
        assert_eq!(err.step(), Some("validateAddOnNodeGroups"));
        assert!(err.to_string().contains("differs from its key"));
    }

    #[test]
    fn test_enabled_without_groups_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, 1);
        cfg.add_on_node_groups.as_mut().unwrap().asgs.clear();
        assert!(validate(&mut cfg).unwrap_err().to_string().contains("empty ASGs"));
    }

    #[test]
    fn test_unknown_ami_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, "WINDOWS", 1);
        assert!(validate(&mut cfg).unwrap_err().to_string().contains("unknown AMI type"));
    }

    #[test]
    fn test_bottlerocket_rejects_kubelet_args() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_BOTTLEROCKET_CPU, 1);
        cfg.add_on_node_groups.as_mut().unwrap().asgs.get_mut("c1-ng").unwrap().kubelet_extra_args =
            "--node-labels=a=b".to_string();
        assert!(validate(&mut cfg).unwrap_err().root_kind().is_cross_constraint());
    }

    #[test]
    fn test_wrong_user_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, 1);
        cfg.add_on_node_groups.as_mut().unwrap().asgs.get_mut("c1-ng").unwrap().remote_access_user_name =
            "ubuntu".to_string();
        assert!(validate(&mut cfg).unwrap_err().to_string().contains("ubuntu"));
    }

    #[test]
    fn test_capacity_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, 5);
        cfg.add_on_node_groups.as_mut().unwrap().asgs.get_mut("c1-ng").unwrap().asg_max_size = 4;
        assert!(validate(&mut cfg).unwrap_err().to_string().contains("ASGMaxSize"));

        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, 301);
        assert!(validate(&mut cfg).unwrap_err().to_string().contains("limit 300"));
    }

    #[test]
    fn test_missing_bounds_default_to_desired() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, 3);
        {
            let a = cfg.add_on_node_groups.as_mut().unwrap().asgs.get_mut("c1-ng").unwrap();
            a.asg_min_size = 0;
            a.asg_max_size = 0;
        }
        validate(&mut cfg).unwrap();
        assert_eq!((asg(&cfg).asg_min_size, asg(&cfg).asg_max_size), (3, 3));
    }

    #[test]
    fn test_ssm_document_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, 1);
        cfg.add_on_node_groups.as_mut().unwrap().asgs.get_mut("c1-ng").unwrap().ssm_document_create = true;
        validate(&mut cfg).unwrap();
        let a = asg(&cfg);
        assert_eq!(a.ssm_document_cfn_stack_name, "c1-ng-ssm-document");
        assert_eq!(a.ssm_document_name, "c1ngSSMDocument");
        assert_eq!(a.ssm_document_execution_timeout_in_seconds, 3600);
    }

    #[test]
    fn test_role_principal_must_include_ec2() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, 1);
        cfg.add_on_node_groups.as_mut().unwrap().role_service_principals = vec!["eks.amazonaws.com".to_string()];
        assert!(validate(&mut cfg).unwrap_err().to_string().contains(EC2_PRINCIPAL));
    }

    #[test]
    fn test_replicas_follow_ng_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, 7);
        cfg.add_on_nlb_guestbook.as_mut().unwrap().enable = true;
        validate(&mut cfg).unwrap();
        assert_eq!(cfg.add_on_nlb_guestbook.as_ref().unwrap().deployment_replicas, 7);
    }

    #[test]
    fn test_min_above_desired_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = base_config(dir.path());
        for desired in [0, 1] {
            with_ng(&mut cfg, AMI_TYPE_AL2_X86_64, desired);
            {
                let a = cfg.add_on_node_groups.as_mut().unwrap().asgs.get_mut("c1-ng").unwrap();
                a.asg_min_size = 2;
                a.asg_max_size = 0;
            }
            let err = validate(&mut cfg).unwrap_err();
            assert!(err.root_kind().is_invariant());
            assert!(err.to_string().contains(&format!("ASGMinSize 2 > ASGDesiredCapacity {desired}")));
        }
    }

    #[test]
    fn test_check_capacity_direct() {
        let (mut min, mut max) = (0, 0);
        check_capacity("f", Capacity { min: &mut min, desired: 0, max: &mut max, limit: 10 }).unwrap_err();
        let (mut min, mut max) = (2, 0);
        check_capacity("f", Capacity { min: &mut min, desired: 1, max: &mut max, limit: 10 }).unwrap_err();
        let (mut min, mut max) = (2, 0);
        check_capacity("f", Capacity { min: &mut min, desired: 0, max: &mut max, limit: 10 }).unwrap_err();
        assert_eq!(max, 0);
        let (mut min, mut max) = (2, 0);
        check_capacity("f", Capacity { min: &mut min, desired: 3, max: &mut max, limit: 10 }).unwrap();
        assert_eq!((min, max), (2, 3));
    }
}
