mod check;
mod import;
mod pass;
mod refresh;
mod run;

use std::process::ExitCode;

use stockvault_core::YahooSource;
use stockvault_warehouse::Dispatcher;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::config::{self, AppConfig};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let path = config::resolve_path(cli.config.as_deref());
    let config = AppConfig::load(&path)?;
    info!(
        path = %path.display(),
        instruments = config.instruments.len(),
        "config loaded"
    );

    if let Command::Check = &cli.command {
        return check::run(&config, &path).await;
    }

    let source = YahooSource::default();
    let mut dispatcher = open_dispatcher(&config).await?;

    let result = match &cli.command {
        Command::Import(args) => import::run(args, &config, &source, &mut dispatcher).await,
        Command::Refresh(args) => refresh::run(args, &config, &source, &mut dispatcher).await,
        Command::Run => run::run(&config, &source, &mut dispatcher).await,
        Command::Check => Ok(ExitCode::SUCCESS),
    };

    dispatcher.close_all().await;
    result
}

/// Build and initialize the configured stores. Any initialization failure is
/// fatal; stores opened before it are closed again.
async fn open_dispatcher(config: &AppConfig) -> Result<Dispatcher, CliError> {
    let mut dispatcher = Dispatcher::new(config.build_stores());
    if let Err(failure) = dispatcher.initialize_all().await {
        dispatcher.close_all().await;
        return Err(failure.into());
    }
    info!(stores = ?dispatcher.store_ids(), "stores ready");
    Ok(dispatcher)
}
