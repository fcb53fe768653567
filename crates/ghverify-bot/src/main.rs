use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ghverify_core::config::{Config, paths};
use ghverify_core::logging;

#[derive(Parser)]
#[command(name = "ghverify-bot")]
#[command(version)]
#[command(about = "Verify GitHub account ownership from Telegram")]
struct Cli {
    /// Config file (default: $GHVERIFY_HOME/config.toml)
    #[arg(long, env = "GHVERIFY_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Callback listen address, overrides callback.listen_addr
    #[arg(long, env = "GHVERIFY_LISTEN", value_name = "ADDR")]
    listen: Option<String>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let config_path = cli.config.unwrap_or_else(paths::config_path);
    config.apply_env();
    if let Some(listen) = cli.listen {
        config.callback.listen_addr = listen;
    }

    let _log_guard = logging::init(&config.log)?;
    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Loaded config file");
    }

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(ghverify_bot::run_with_config(config))
}
