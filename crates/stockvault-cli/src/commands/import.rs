use std::process::ExitCode;

use stockvault_core::{parse_date, QuoteSource};
use stockvault_warehouse::Dispatcher;
use tracing::info;

use super::pass::{run_pass, tomorrow};
use crate::cli::ImportArgs;
use crate::config::AppConfig;
use crate::error::CliError;

pub async fn run(
    args: &ImportArgs,
    config: &AppConfig,
    source: &dyn QuoteSource,
    dispatcher: &mut Dispatcher,
) -> Result<ExitCode, CliError> {
    let start = match &args.from {
        Some(value) => parse_date(value)?,
        None => config.history_start,
    };

    info!(%start, instruments = config.instruments.len(), "starting history import");
    let summary = run_pass(
        source,
        dispatcher,
        &config.instruments,
        start,
        tomorrow(),
        config.pause,
    )
    .await;
    Ok(summary.exit_code())
}
