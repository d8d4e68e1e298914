//! Integration tests for the create-config, validate and env-keys commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

// ============================================================================
// create-config
// ============================================================================

#[test]
fn test_create_config_writes_defaults() {
    let env = TestEnv::new();
    let path = env.config_path();

    env.command()
        .arg("create-config")
        .arg("--path")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(path.display().to_string()));

    let doc: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["name"].as_str(), Some("c1"));
    assert_eq!(doc["region"].as_str(), Some("us-west-2"));
    assert_eq!(doc["add-on-jobs-echo"]["enable"].as_bool(), Some(false));
}

#[test]
fn test_create_config_relative_path() {
    let env = TestEnv::new();

    env.command()
        .args(["create-config", "--path", "nested/c1.yaml"])
        .assert()
        .success();

    assert!(env.temp_path.join("nested/c1.yaml").exists());
}

#[test]
fn test_create_config_refuses_overwrite() {
    let env = TestEnv::new();
    let path = env.create_config();

    env.command()
        .arg("create-config")
        .arg("--path")
        .arg(&path)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    env.command()
        .arg("create-config")
        .arg("--path")
        .arg(&path)
        .arg("--overwrite")
        .assert()
        .success();
}

#[test]
fn test_create_config_quiet() {
    let env = TestEnv::new();

    env.command()
        .args(["--quiet", "create-config", "--path", "c1.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_default_config() {
    let env = TestEnv::new();
    let path = env.create_config();

    env.command()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("name: c1"))
        .stdout(predicate::str::contains(format!("config-path: {}", path.display())));

    let doc: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let kubeconfig = doc["kubeconfig-path"].as_str().unwrap();
    assert!(kubeconfig.ends_with("c1.kubeconfig.yaml"));
    // Disabled add-ons are dropped from the validated document.
    assert!(doc.get("add-on-jobs-echo").is_none());
}

#[test]
fn test_validate_applies_environment() {
    let env = TestEnv::new();
    let path = env.create_config();

    env.command()
        .arg("validate")
        .arg(&path)
        .env("AWS_K8S_TESTER_EKS_REGION", "us-east-1")
        .env("AWS_K8S_TESTER_EKS_CLIENTS", "7")
        .assert()
        .success();

    let doc: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["region"].as_str(), Some("us-east-1"));
    assert_eq!(doc["clients"].as_u64(), Some(7));
}

#[test]
fn test_validate_prints_kubectl_commands() {
    let env = TestEnv::new();
    let path = env.create_config();

    env.command()
        .arg("validate")
        .arg(&path)
        .arg("--kubectl-commands")
        .assert()
        .success()
        .stdout(predicate::str::contains("# kubectl commands"))
        .stdout(predicate::str::contains("get nodes"));
}

#[test]
fn test_validate_missing_file() {
    let env = TestEnv::new();

    env.command()
        .arg("validate")
        .arg(env.temp_path.join("missing.yaml"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid path"));
}

#[test]
fn test_validate_rejects_malformed_environment() {
    let env = TestEnv::new();
    let path = env.create_config();
    let before = fs::read_to_string(&path).unwrap();

    env.command()
        .arg("validate")
        .arg(&path)
        .env("AWS_K8S_TESTER_EKS_CLIENTS", "three")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("AWS_K8S_TESTER_EKS_CLIENTS"));

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_validate_reports_failing_step() {
    let env = TestEnv::new();
    let path = env.create_config();

    env.command()
        .arg("validate")
        .arg(&path)
        .env("AWS_K8S_TESTER_EKS_ADD_ON_JOBS_ECHO_ENABLE", "true")
        .env("AWS_K8S_TESTER_EKS_ADD_ON_JOBS_ECHO_NAMESPACE", "c1")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("validateAddOnJobsEcho failed"));
}

// ============================================================================
// env-keys
// ============================================================================

#[test]
fn test_env_keys_lists_root_and_add_on_keys() {
    let env = TestEnv::new();

    env.command()
        .arg("env-keys")
        .assert()
        .success()
        .stdout(predicate::str::contains("AWS_K8S_TESTER_EKS_NAME\n"))
        .stdout(predicate::str::contains("AWS_K8S_TESTER_EKS_PARAMETERS_VERSION\n"))
        .stdout(predicate::str::contains("AWS_K8S_TESTER_EKS_ADD_ON_JOBS_ECHO_ENABLE\n"));
}

#[test]
fn test_env_keys_prefix() {
    let env = TestEnv::new();

    let output = env
        .command()
        .args(["env-keys", "--prefix", "AWS_K8S_TESTER_EKS_ADD_ON_JOBS_PI_"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.is_empty());
    assert!(stdout
        .lines()
        .all(|line| line.starts_with("AWS_K8S_TESTER_EKS_ADD_ON_JOBS_PI_")));
}

#[test]
fn test_env_keys_unknown_prefix() {
    let env = TestEnv::new();

    env.command()
        .args(["env-keys", "--prefix", "NOT_A_KEY_"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no environment keys match"));
}
