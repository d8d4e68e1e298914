//! Common test utilities for CLI integration tests.

use assert_cmd::Command;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment with an isolated directory for configuration files.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Path of the configuration file used by most tests.
    pub fn config_path(&self) -> PathBuf {
        self.temp_path.join("c1.yaml")
    }

    /// A command with no inherited `AWS_K8S_TESTER_EKS_*` variables and the
    /// cluster name pinned to `c1`.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("eksconfig").expect("Failed to find eksconfig binary");
        for (key, _) in env::vars().filter(|(k, _)| k.starts_with("AWS_K8S_TESTER_EKS_")) {
            cmd.env_remove(key);
        }
        cmd.env("AWS_K8S_TESTER_EKS_NAME", "c1");
        cmd.current_dir(&self.temp_path);
        cmd
    }

    /// Writes a default configuration to [`TestEnv::config_path`].
    pub fn create_config(&self) -> PathBuf {
        let path = self.config_path();
        self.command()
            .arg("create-config")
            .arg("--path")
            .arg(&path)
            .assert()
            .success();
        path
    }
}
