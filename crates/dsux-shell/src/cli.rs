//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Interactive shell for browsing a DSU.
///
/// Without `--store` or `--ephemeral`, the first DSU in the registry is
/// opened; an empty registry gets a freshly created local DSU.
#[derive(Debug, Parser)]
#[command(name = "dsux", version, about)]
pub struct Cli {
    /// Open (or create) a local store in this directory
    #[arg(long, value_name = "DIR", env = "DSUX_STORE")]
    pub store: Option<PathBuf>,

    /// Use a throwaway in-memory store
    #[arg(long)]
    pub ephemeral: bool,

    /// DSU registry file
    #[arg(long, value_name = "FILE", env = "DSUX_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE", env = "DSUX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run this command instead of reading stdin; repeatable
    #[arg(short = 'c', long = "command", value_name = "COMMAND")]
    pub commands: Vec<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
