use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;

use crate::config::AppConfig;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct CheckReport {
    config: String,
    instruments: Vec<String>,
    stores: Vec<&'static str>,
    history_import_date: String,
}

/// Open and close every store, then print what the config resolves to.
pub async fn run(config: &AppConfig, path: &Path) -> Result<ExitCode, CliError> {
    let mut dispatcher = super::open_dispatcher(config).await?;
    let stores = dispatcher.store_ids();
    dispatcher.close_all().await;

    let report = CheckReport {
        config: path.display().to_string(),
        instruments: config
            .instruments
            .iter()
            .map(|i| format!("{} ({}, {})", i.symbol, i.instrument_type, i.currency))
            .collect(),
        stores,
        history_import_date: config.history_start.to_string(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::SUCCESS)
}
