//! Job configuration.
//!
//! The file is JSON:
//!
//! ```json
//! {
//!   "stocks": [{"symbol": "^GSPC", "name": "S&P 500", "type": "INDEX", "currency": "USD"}],
//!   "data_source": {
//!     "duckdb_cfg": {"db_file": "data/stock.duckdb"},
//!     "pg_cfg": {"host": "localhost", "port": 5432, "user": "postgres", "pass": "", "db": "stocks"}
//!   },
//!   "history_import_date": "2000-01-01"
//! }
//! ```
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `pause_secs` | `30` | Pause between two symbols |
//! | `refresh_interval_secs` | `86400` | Delay between refresh passes in `run` |
//! | `lookback_days` | `5` | Window of an incremental refresh |
//! | `pg_cfg.connect_timeout_secs` | `10` | Postgres connect timeout |
//! | `pg_cfg.statement_timeout_secs` | `60` | Postgres `statement_timeout` |
//!
//! `STOCKVAULT_PG_PASSWORD`, when set, replaces `pg_cfg.pass`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use stockvault_core::{parse_date, InstrumentDescriptor, InstrumentType, Symbol};
use stockvault_warehouse::{DuckDbStore, PostgresConfig, PostgresStore, PriceStore};
use time::Date;
use tracing::warn;

use crate::error::CliError;

pub const CONFIG_ENV: &str = "STOCKVAULT_CONFIG";
pub const PG_PASSWORD_ENV: &str = "STOCKVAULT_PG_PASSWORD";
const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    stocks: Vec<RawStock>,
    #[serde(default)]
    data_source: RawDataSource,
    history_import_date: String,
    #[serde(default = "default_pause_secs")]
    pause_secs: u64,
    #[serde(default = "default_refresh_interval_secs")]
    refresh_interval_secs: u64,
    #[serde(default = "default_lookback_days")]
    lookback_days: u32,
}

#[derive(Debug, Deserialize)]
struct RawStock {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    instrument_type: String,
    currency: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawDataSource {
    duckdb_cfg: Option<RawDuckDb>,
    pg_cfg: Option<RawPostgres>,
}

#[derive(Debug, Deserialize)]
struct RawDuckDb {
    db_file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawPostgres {
    host: String,
    #[serde(default = "default_pg_port")]
    port: u16,
    user: String,
    #[serde(default)]
    pass: String,
    db: String,
    #[serde(default = "default_connect_timeout_secs")]
    connect_timeout_secs: u64,
    #[serde(default = "default_statement_timeout_secs")]
    statement_timeout_secs: u64,
}

const fn default_pause_secs() -> u64 {
    30
}

const fn default_refresh_interval_secs() -> u64 {
    86_400
}

const fn default_lookback_days() -> u32 {
    5
}

const fn default_pg_port() -> u16 {
    5432
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_statement_timeout_secs() -> u64 {
    60
}

/// Validated job configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub instruments: Vec<InstrumentDescriptor>,
    pub duckdb_file: Option<PathBuf>,
    pub postgres: Option<PostgresConfig>,
    pub history_start: Date,
    pub pause: Duration,
    pub refresh_interval: Duration,
    pub lookback_days: u32,
}

impl AppConfig {
    /// Read and validate the file at `path`, applying env overrides.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let password = std::env::var(PG_PASSWORD_ENV).ok();
        Self::from_json(&text, password)
    }

    /// Parse and validate a JSON document. `pg_password` replaces `pg_cfg.pass`.
    pub fn from_json(text: &str, pg_password: Option<String>) -> Result<Self, CliError> {
        let raw: RawConfig = serde_json::from_str(text)
            .map_err(|e| CliError::Config(format!("invalid config json: {e}")))?;

        let mut instruments = Vec::with_capacity(raw.stocks.len());
        for (index, stock) in raw.stocks.into_iter().enumerate() {
            if stock.symbol.trim().is_empty() {
                warn!(index, name = %stock.name, "skipping stock entry with empty symbol");
                continue;
            }
            instruments.push(stock.into_descriptor()?);
        }

        let postgres = raw.data_source.pg_cfg.map(|pg| PostgresConfig {
            host: pg.host,
            port: pg.port,
            user: pg.user,
            password: pg_password.unwrap_or(pg.pass),
            database: pg.db,
            connect_timeout: Duration::from_secs(pg.connect_timeout_secs),
            statement_timeout: Duration::from_secs(pg.statement_timeout_secs),
        });
        let duckdb_file = raw.data_source.duckdb_cfg.map(|d| d.db_file);

        if duckdb_file.is_none() && postgres.is_none() {
            return Err(CliError::Config(String::from(
                "data_source must configure at least one of duckdb_cfg, pg_cfg",
            )));
        }
        if raw.refresh_interval_secs == 0 {
            return Err(CliError::Config(String::from(
                "refresh_interval_secs must be greater than zero",
            )));
        }

        Ok(Self {
            instruments,
            duckdb_file,
            postgres,
            history_start: parse_date(&raw.history_import_date)?,
            pause: Duration::from_secs(raw.pause_secs),
            refresh_interval: Duration::from_secs(raw.refresh_interval_secs),
            lookback_days: raw.lookback_days,
        })
    }

    /// Construct the configured stores: DuckDB first, then Postgres.
    pub fn build_stores(&self) -> Vec<Box<dyn PriceStore>> {
        let mut stores: Vec<Box<dyn PriceStore>> = Vec::new();
        if let Some(path) = &self.duckdb_file {
            stores.push(Box::new(DuckDbStore::new(path)));
        }
        if let Some(pg) = &self.postgres {
            stores.push(Box::new(PostgresStore::new(pg)));
        }
        stores
    }
}

impl RawStock {
    fn into_descriptor(self) -> Result<InstrumentDescriptor, CliError> {
        let symbol = Symbol::parse(&self.symbol)?;
        let instrument_type: InstrumentType = self.instrument_type.parse()?;
        let name = if self.name.trim().is_empty() {
            symbol.as_str().to_owned()
        } else {
            self.name
        };
        Ok(InstrumentDescriptor::new(
            symbol,
            name,
            instrument_type,
            &self.currency,
        )?)
    }
}

/// `--config`, else `$STOCKVAULT_CONFIG`, else `./config.json`.
pub fn resolve_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    std::env::var_os(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
