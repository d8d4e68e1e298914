//! Command to write a default configuration file.

use crate::error::CliError;
use crate::utils::{absolute_path, GlobalOptions};
use clap::Args;
use eksconfig::Config;
use log::info;
use std::path::PathBuf;

/// Write a default configuration file.
#[derive(Args)]
pub struct CreateConfigCommand {
    /// Where to write the configuration
    #[arg(long, value_name = "PATH")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub overwrite: bool,
}

impl CreateConfigCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let path = absolute_path(&self.path)?;
        if path.exists() && !self.overwrite {
            return Err(CliError::InvalidArguments(format!(
                "{} already exists (use --overwrite to replace it)",
                path.display()
            )));
        }

        let mut cfg = Config::new_default();
        cfg.config_path = path.display().to_string();
        cfg.sync()?;
        info!("wrote default configuration {:?}", cfg.name);

        if !global.quiet {
            println!("{}", cfg.config_path);
        }
        Ok(())
    }
}
