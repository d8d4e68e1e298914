//! CLI structure and command definitions.

use crate::commands::{CompletionsCommand, CreateConfigCommand, EnvKeysCommand, ValidateCommand};
use clap::{Parser, Subcommand};

/// Command-line tool for EKS test cluster configurations.
#[derive(Parser)]
#[command(name = "eksconfig")]
#[command(version, about = "Create, overlay and validate EKS test cluster configurations", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Write a default configuration file
    CreateConfig(CreateConfigCommand),

    /// Overlay the environment on a configuration file, validate it and write it back
    Validate(ValidateCommand),

    /// Print every writable environment variable
    EnvKeys(EnvKeysCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}
