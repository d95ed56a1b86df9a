use std::process::ExitCode;

use stockvault_core::QuoteSource;
use stockvault_warehouse::Dispatcher;
use time::Date;

use super::pass::{run_pass, today, tomorrow, PassSummary};
use crate::cli::RefreshArgs;
use crate::config::AppConfig;
use crate::error::CliError;

pub async fn run(
    args: &RefreshArgs,
    config: &AppConfig,
    source: &dyn QuoteSource,
    dispatcher: &mut Dispatcher,
) -> Result<ExitCode, CliError> {
    let lookback_days = args.lookback_days.unwrap_or(config.lookback_days);
    let summary = refresh_pass(config, lookback_days, source, dispatcher).await;
    Ok(summary.exit_code())
}

/// One incremental pass over `[today - lookback_days, tomorrow)`.
///
/// Windows of consecutive passes overlap; the upsert makes that harmless and
/// picks up late revisions from the provider.
pub async fn refresh_pass(
    config: &AppConfig,
    lookback_days: u32,
    source: &dyn QuoteSource,
    dispatcher: &mut Dispatcher,
) -> PassSummary {
    let start = window_start(today(), lookback_days);
    run_pass(
        source,
        dispatcher,
        &config.instruments,
        start,
        tomorrow(),
        config.pause,
    )
    .await
}

fn window_start(today: Date, lookback_days: u32) -> Date {
    today.saturating_sub(time::Duration::days(i64::from(lookback_days)))
}
