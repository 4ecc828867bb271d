//! dsux — an interactive shell over a DSU.
//!
//! Parses arguments, sets up logging, loads configuration, opens the store
//! and then either runs the `-c` commands or reads commands from stdin.

mod bootstrap;
mod cli;
mod logging;
mod repl;

use anyhow::Context;
use clap::Parser;
use dsux_core::config::settings::default_config_path;
use dsux_core::{Config, Session};
use tokio::io::BufReader;

use crate::bootstrap::StoreSource;
use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let path = default_config_path();
            Config::load_or_default(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
    };

    let source = StoreSource::from_args(&cli, &config);
    tracing::debug!("store source: {source:?}");
    let opened = bootstrap::open(&source).await?;
    if let Some(notice) = &opened.notice {
        println!("{notice}");
    }

    let mut session = Session::new(opened.store, &config);
    tracing::info!("attached to {}", session.store_label());

    let mut stdout = std::io::stdout();
    if cli.commands.is_empty() {
        let stdin = BufReader::new(tokio::io::stdin());
        repl::run_interactive(&mut session, stdin, &mut stdout).await?;
    } else {
        repl::run_script(&mut session, &cli.commands, &mut stdout).await?;
    }
    Ok(())
}
