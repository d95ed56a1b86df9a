use std::time::Duration;

use thiserror::Error;

/// Errors raised by price stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `DuckDB` engine error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// Postgres driver error.
    #[error(transparent)]
    Postgres(#[from] sqlx::Error),

    /// File system error while preparing the database location.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A write reached a store whose connection is not open.
    #[error("{store} store is not initialized")]
    NotInitialized { store: &'static str },

    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),

    #[error("{store} store timed out after {}ms", .after.as_millis())]
    Timeout {
        store: &'static str,
        after: Duration,
    },
}
