//! Build script for eksconfig-cli.
//!
//! Generates the man page at build time using clap_mangen and places it in
//! OUT_DIR.
//!
//! Build scripts cannot depend on the crate being built, so the command
//! structure is declared again here.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// Keep this synchronized with src/cli.rs.
fn build_cli() -> Command {
    Command::new("eksconfig")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Create, overlay and validate EKS test cluster configurations")
        .long_about(
            "Writes default EKS test cluster configurations, overlays AWS_K8S_TESTER_EKS_* \
             environment variables on them, and validates the result",
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommands(vec![
            Command::new("create-config")
                .about("Write a default configuration file")
                .arg(Arg::new("path").long("path").value_name("PATH").required(true))
                .arg(Arg::new("overwrite").long("overwrite").action(ArgAction::SetTrue)),
            Command::new("validate")
                .about("Overlay the environment on a configuration file, validate it and write it back")
                .arg(Arg::new("CONFIG_PATH").required(true))
                .arg(
                    Arg::new("kubectl-commands")
                        .long("kubectl-commands")
                        .action(ArgAction::SetTrue),
                ),
            Command::new("env-keys")
                .about("Print every writable environment variable")
                .arg(Arg::new("prefix").long("prefix").value_name("PREFIX")),
            Command::new("completions")
                .about("Generate shell completion scripts")
                .long_about("Generate shell completion scripts for bash, zsh, fish, or PowerShell"),
        ])
}

fn main() -> std::io::Result<()> {
    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR").ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "OUT_DIR is not set")
    })?);
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir)?;

    let mut buffer = Vec::new();
    Man::new(build_cli()).render(&mut buffer)?;
    fs::write(man_dir.join("eksconfig.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
    Ok(())
}
