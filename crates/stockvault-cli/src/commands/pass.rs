use std::process::ExitCode;
use std::time::Duration;

use stockvault_core::{HistoryRequest, InstrumentDescriptor, QuoteSource};
use stockvault_warehouse::Dispatcher;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

/// Counters for one pass over all instruments.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub instruments: usize,
    pub rows: usize,
    pub empty: usize,
    pub source_errors: usize,
    pub store_failures: usize,
}

impl PassSummary {
    /// Store write failures map to exit code 3; skipped symbols do not.
    pub fn exit_code(&self) -> ExitCode {
        if self.store_failures > 0 {
            ExitCode::from(3)
        } else {
            ExitCode::SUCCESS
        }
    }
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Exclusive end of a window that includes today.
pub fn tomorrow() -> Date {
    today().saturating_add(time::Duration::days(1))
}

/// Fetch `[start, end)` for every instrument and persist it through `dispatcher`.
///
/// A fetch failure skips that symbol. `pause` is slept between symbols, not
/// after the last one.
pub async fn run_pass(
    source: &dyn QuoteSource,
    dispatcher: &mut Dispatcher,
    instruments: &[InstrumentDescriptor],
    start: Date,
    end: Date,
    pause: Duration,
) -> PassSummary {
    let mut summary = PassSummary {
        instruments: instruments.len(),
        ..PassSummary::default()
    };

    for (index, instrument) in instruments.iter().enumerate() {
        if index > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        let fetched = match HistoryRequest::new(instrument.symbol.clone(), start, end) {
            Ok(request) => source.fetch_daily(&request).await,
            Err(error) => Err(error),
        };

        match fetched {
            Ok(series) => {
                let report = dispatcher.persist(series.as_ref(), instrument).await;
                if report.is_empty() {
                    summary.empty += 1;
                }
                summary.rows += report.rows;
                summary.store_failures += report.failed();
            }
            Err(error) => {
                summary.source_errors += 1;
                warn!(
                    symbol = %instrument.symbol,
                    source = source.id(),
                    code = error.code(),
                    error = %error,
                    "fetch failed, skipping symbol"
                );
            }
        }
    }

    info!(
        %start,
        %end,
        instruments = summary.instruments,
        rows = summary.rows,
        empty = summary.empty,
        source_errors = summary.source_errors,
        store_failures = summary.store_failures,
        "pass finished"
    );
    summary
}
