//! Command to validate an EKS test cluster configuration file.

use crate::error::CliError;
use crate::utils::{absolute_path, GlobalOptions};
use clap::Args;
use eksconfig::SharedConfig;
use log::debug;
use std::path::PathBuf;

/// Overlay the environment on a configuration file, validate it and write
/// it back.
#[derive(Args)]
pub struct ValidateCommand {
    /// Configuration file to validate
    #[arg(value_name = "CONFIG_PATH")]
    pub config_path: PathBuf,

    /// Also print the kubectl and sonobuoy commands for the cluster
    #[arg(long)]
    pub kubectl_commands: bool,
}

impl ValidateCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = absolute_path(&self.config_path)?;

        let shared = SharedConfig::load(&path)?;
        shared.update_from_env()?;
        debug!("overlaid environment on {}", path.display());
        shared.validate_and_set_defaults()?;

        let cfg = shared.read();
        if !global.quiet {
            println!("name: {}", cfg.name);
            println!("config-path: {}", cfg.config_path);
        }
        if self.kubectl_commands {
            print!("{}", cfg.kubectl_commands());
        }
        Ok(())
    }
}
