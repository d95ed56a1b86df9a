//! CLI argument definitions for stockvault.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `import` | Load full daily history from `history_import_date` |
//! | `refresh` | Re-fetch the last `lookback_days` for every instrument |
//! | `run` | Import once, then refresh on a fixed interval until Ctrl-C |
//! | `check` | Validate config and open/close every store |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | `$STOCKVAULT_CONFIG`, then `./config.json` | Config file |
//! | `--log-format` | `text` | Log output format (text, json) |
//!
//! ```bash
//! stockvault --config /etc/stockvault.json check
//! RUST_LOG=stockvault=debug stockvault import --from 2024-01-01
//! stockvault --log-format json run
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Daily price collector for DuckDB and Postgres.
#[derive(Debug, Parser)]
#[command(
    name = "stockvault",
    version,
    about = "Fetch daily stock prices and upsert them into DuckDB and Postgres"
)]
pub struct Cli {
    /// Path to the JSON config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import full daily history for every configured instrument.
    ///
    ///   stockvault import
    ///   stockvault import --from 2020-01-01
    Import(ImportArgs),

    /// Re-fetch recent days for every configured instrument.
    ///
    ///   stockvault refresh
    ///   stockvault refresh --lookback-days 30
    Refresh(RefreshArgs),

    /// Import once, then refresh periodically until interrupted.
    Run,

    /// Validate the config and probe every store.
    Check,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// First day to import (YYYY-MM-DD). Overrides `history_import_date`.
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// Days to look back. Overrides `lookback_days`.
    #[arg(long)]
    pub lookback_days: Option<u32>,
}
