//! Storage driver, load-balancer demos, batch jobs and object load generators.

use super::{default_namespace, default_with_suffix, join, require_non_empty};
use crate::config::addons::workloads::{CSR_CONDITION_TYPES, MAX_CONFIG_MAP_SIZE, MAX_ECHO_SIZE};
use crate::config::addons::AddOnKind;
use crate::config::schema::Config;
use crate::error::{Error, Result};

const DEFAULT_PHP_APACHE_REPLICAS: u32 = 3;
const DEFAULT_AMI_SOFT_LOCKUP_REPLICAS: u32 = 50;

pub(super) fn validate(cfg: &mut Config, kind: AddOnKind) -> Result<()> {
    let name = cfg.name.clone();
    let config_dir = cfg.config_dir();
    let region = cfg.region.clone();

    // Slots are validated only when enabled, so a missing slot is a no-op.
    match kind {
        AddOnKind::CsiEbs => {
            if let Some(a) = cfg.add_on_csi_ebs.as_mut() {
                require_non_empty("AddOnCSIEBS.ChartRepoURL", &a.chart_repo_url)?;
            }
        }
        AddOnKind::NlbHelloWorld => {
            if let Some(a) = cfg.add_on_nlb_hello_world.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
            }
        }
        AddOnKind::NlbGuestbook => {
            if let Some(a) = cfg.add_on_nlb_guestbook.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
            }
        }
        AddOnKind::Alb2048 => {
            if let Some(a) = cfg.add_on_alb_2048.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
            }
        }
        AddOnKind::JobsPi => {
            if let Some(a) = cfg.add_on_jobs_pi.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
            }
        }
        AddOnKind::JobsEcho => {
            if let Some(a) = cfg.add_on_jobs_echo.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                check_echo_size("AddOnJobsEcho.EchoSize", a.echo_size)?;
            }
        }
        AddOnKind::CronJobs => {
            if let Some(a) = cfg.add_on_cron_jobs.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                check_echo_size("AddOnCronJobs.EchoSize", a.echo_size)?;
            }
        }
        AddOnKind::Csrs => {
            if let Some(a) = cfg.add_on_csrs.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                if !CSR_CONDITION_TYPES.contains(&a.initial_request_condition_type.as_str()) {
                    return Err(Error::invariant(
                        "AddOnCSRs.InitialRequestConditionType",
                        format!(
                            "unknown condition {:?}, expected one of {CSR_CONDITION_TYPES:?}",
                            a.initial_request_condition_type
                        ),
                    ));
                }
            }
        }
        AddOnKind::ConfigMaps => {
            if let Some(a) = cfg.add_on_config_maps.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                if a.size > MAX_CONFIG_MAP_SIZE {
                    return Err(Error::invariant(
                        "AddOnConfigMaps.Size",
                        format!("{} exceeds {MAX_CONFIG_MAP_SIZE}", a.size),
                    ));
                }
            }
        }
        AddOnKind::Secrets => {
            if let Some(a) = cfg.add_on_secrets.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                default_with_suffix(
                    "AddOnSecrets.WritesResultPath",
                    &mut a.writes_result_path,
                    join(&config_dir, format!("{name}-secret-writes.csv")),
                    ".csv",
                )?;
                default_with_suffix(
                    "AddOnSecrets.ReadsResultPath",
                    &mut a.reads_result_path,
                    join(&config_dir, format!("{name}-secret-reads.csv")),
                    ".csv",
                )?;
            }
        }
        AddOnKind::PhpApache => {
            if let Some(a) = cfg.add_on_php_apache.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                if a.repository_region.is_empty() {
                    a.repository_region = region;
                }
                if a.deployment_replicas == 0 {
                    a.deployment_replicas = DEFAULT_PHP_APACHE_REPLICAS;
                }
            }
        }
        AddOnKind::AmiSoftLockupIssue454 => {
            if let Some(a) = cfg.add_on_ami_soft_lockup_issue_454.as_mut() {
                default_namespace(&mut a.namespace, kind, &name)?;
                if a.deployment_replicas == 0 {
                    a.deployment_replicas = DEFAULT_AMI_SOFT_LOCKUP_REPLICAS;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_echo_size(field: &str, size: u32) -> Result<()> {
    if size > MAX_ECHO_SIZE {
        Err(Error::invariant(field, format!("{size} exceeds {MAX_ECHO_SIZE}")))
    } else {
        Ok(())
    }
}
