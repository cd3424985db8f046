//! `fanlog`: emit a single log event from the command line.

use anyhow::Result;
use clap::Parser;
use fanlog::{cli::Cli, config::Config, Level};
use log::debug;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::load_layered(cli.config.as_deref(), cli.clone())?;
    debug!("loaded {} handler(s) from configuration", config.handlers.len());

    let registry = Arc::new(config.build_registry()?);
    let context = cli.context();

    // FATAL exits with status 1 once the event has been dispatched.
    let fatal = cli.level == Level::Fatal;
    match &cli.name {
        Some(name) => {
            let logger = registry.get_logger(name.as_str());
            if fatal {
                logger.fatalm(&cli.message, context)?;
            } else {
                logger.logm(cli.level, &cli.message, context)?;
            }
        }
        None if fatal => registry.fatalm(&cli.message, context)?,
        None => registry.logm(cli.level, &cli.message, context)?,
    }
    Ok(())
}
