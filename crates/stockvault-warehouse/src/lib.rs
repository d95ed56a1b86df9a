//! # Stockvault Warehouse
//!
//! Idempotent persistence of [`PriceBar`](stockvault_core::PriceBar) batches.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PriceStore`] | Backend contract: initialize, batch_upsert, close, identify |
//! | [`DuckDbStore`] | Embedded single-file `DuckDB` store |
//! | [`PostgresStore`] | Postgres store over one `sqlx` connection |
//! | [`Dispatcher`] | Writes one batch to every store, isolating failures |
//!
//! Every backend keeps the same `stock_prices` table keyed on
//! `(symbol, currency, stock_name, stock_type, ts)`. Writing a bar whose key
//! already exists overwrites `open_price`, `high`, `low`, `close_price` and
//! `volume`, so replaying a batch is harmless.
//!
//! ```rust,no_run
//! use stockvault_warehouse::{Dispatcher, DuckDbStore, PriceStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut dispatcher = Dispatcher::new(vec![
//!     Box::new(DuckDbStore::new("data/stock.duckdb")) as Box<dyn PriceStore>,
//! ]);
//! dispatcher.initialize_all().await?;
//! // dispatcher.persist(series.as_ref(), &descriptor).await;
//! dispatcher.close_all().await;
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod duckdb;
pub mod error;
pub mod postgres;
pub mod schema;
pub mod store;

pub use dispatcher::{Dispatcher, PersistReport, StoreFailure, StoreOutcome};
pub use duckdb::DuckDbStore;
pub use error::StoreError;
pub use postgres::{PostgresConfig, PostgresStore};
pub use store::{PriceStore, StoreFuture};
