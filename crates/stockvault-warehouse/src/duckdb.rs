use std::fs;
use std::path::PathBuf;

use ::duckdb::{Connection, ToSql};
use stockvault_core::PriceBar;
use tracing::{debug, info, warn};

use crate::schema::{DUCKDB_CREATE_TABLE, DUCKDB_UPSERT};
use crate::store::{PriceStore, StoreFuture};
use crate::StoreError;

const STORE_ID: &str = "duckdb";

/// Embedded single-file store.
#[derive(Debug)]
pub struct DuckDbStore {
    db_path: PathBuf,
    connection: Option<Connection>,
}

impl DuckDbStore {
    /// Create a store for `db_path`. Nothing is opened until
    /// [`PriceStore::initialize`].
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            connection: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    fn open(&mut self) -> Result<(), StoreError> {
        if self.connection.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let connection = Connection::open(&self.db_path)?;
        connection.execute_batch("PRAGMA disable_progress_bar;")?;
        connection.execute_batch(DUCKDB_CREATE_TABLE)?;

        info!(store = STORE_ID, path = %self.db_path.display(), "store initialized");
        self.connection = Some(connection);
        Ok(())
    }

    fn upsert(&self, bars: &[PriceBar]) -> Result<(), StoreError> {
        if bars.is_empty() {
            return Ok(());
        }

        let connection = self
            .connection
            .as_ref()
            .ok_or(StoreError::NotInitialized { store: STORE_ID })?;

        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), StoreError> {
            for bar in bars {
                let ts = bar.timestamp.format_sql();
                let symbol = bar.symbol.as_str();
                let stock_type = bar.instrument_type.as_str();
                let params: [&dyn ToSql; 10] = [
                    &ts,
                    &symbol,
                    &bar.open,
                    &bar.high,
                    &bar.low,
                    &bar.close,
                    &bar.volume,
                    &bar.currency,
                    &bar.instrument_name,
                    &stock_type,
                ];
                connection.execute(DUCKDB_UPSERT, params.as_slice())?;
            }
            Ok(())
        })();

        finalize_transaction(connection, result)?;
        debug!(store = STORE_ID, rows = bars.len(), "batch committed");
        Ok(())
    }
}

impl PriceStore for DuckDbStore {
    fn identify(&self) -> &'static str {
        STORE_ID
    }

    fn initialize(&mut self) -> StoreFuture<'_, ()> {
        let result = self.open();
        Box::pin(async move { result })
    }

    fn batch_upsert<'a>(&'a mut self, bars: &'a [PriceBar]) -> StoreFuture<'a, ()> {
        let result = self.upsert(bars);
        Box::pin(async move { result })
    }

    fn close(&mut self) -> StoreFuture<'_, ()> {
        let result = match self.connection.take() {
            Some(connection) => connection
                .close()
                .map(|()| info!(store = STORE_ID, "store closed"))
                .map_err(|(_, error)| StoreError::from(error)),
            None => Ok(()),
        };
        Box::pin(async move { result })
    }
}

/// Commit on success, roll back on failure.
fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = connection.execute_batch("ROLLBACK") {
                warn!(store = STORE_ID, error = %rollback_error, "rollback failed");
            }
            Err(error)
        }
    }
}
