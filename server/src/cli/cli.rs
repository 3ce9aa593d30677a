// server/src/cli/cli.rs

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::debug;
use rendezvous::load_config;

use super::commands::CliArgs;
use super::handlers::{handle_command, CliContext};

/// CLI entry point: parse arguments, load config, start logging, run.
pub async fn start_cli() -> Result<()> {
    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref())?;

    // RUST_LOG wins over the configured level.
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log.level.as_str())).init();
    debug!("Loaded configuration: {:?}", config);

    let context = CliContext::open(&config).await?;
    handle_command(&context, args.command).await
}
