use std::process::ExitCode;

use stockvault_core::QuoteSource;
use stockvault_warehouse::Dispatcher;
use tracing::{info, warn};

use super::pass::{run_pass, tomorrow};
use super::refresh::refresh_pass;
use crate::config::AppConfig;
use crate::error::CliError;

/// Import once, then refresh every `refresh_interval` until Ctrl-C.
pub async fn run(
    config: &AppConfig,
    source: &dyn QuoteSource,
    dispatcher: &mut Dispatcher,
) -> Result<ExitCode, CliError> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tokio::select! {
        _ = run_pass(
            source,
            dispatcher,
            &config.instruments,
            config.history_start,
            tomorrow(),
            config.pause,
        ) => {}
        signal = &mut shutdown => {
            log_shutdown(signal);
            return Ok(ExitCode::SUCCESS);
        }
    }

    loop {
        info!(
            interval_secs = config.refresh_interval.as_secs(),
            "waiting for next refresh"
        );
        tokio::select! {
            _ = tokio::time::sleep(config.refresh_interval) => {}
            signal = &mut shutdown => {
                log_shutdown(signal);
                break;
            }
        }

        tokio::select! {
            _ = refresh_pass(config, config.lookback_days, source, dispatcher) => {}
            signal = &mut shutdown => {
                log_shutdown(signal);
                break;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn log_shutdown(signal: std::io::Result<()>) {
    match signal {
        Ok(()) => info!("interrupt received, stopping"),
        Err(error) => warn!(error = %error, "cannot listen for interrupt, stopping"),
    }
}
