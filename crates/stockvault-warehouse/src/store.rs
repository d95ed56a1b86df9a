use std::future::Future;
use std::pin::Pin;

use stockvault_core::PriceBar;

use crate::StoreError;

/// Boxed future returned by [`PriceStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// A backend that holds `stock_prices` and accepts idempotent batch writes.
///
/// Each store owns a single connection for its lifetime. Calls are sequential;
/// nothing here is shared between tasks.
pub trait PriceStore: Send {
    /// Backend name for logs, e.g. `"duckdb"`.
    fn identify(&self) -> &'static str;

    /// Open the connection and create `stock_prices` if it does not exist.
    ///
    /// Calling it again on an initialized store is a no-op.
    fn initialize(&mut self) -> StoreFuture<'_, ()>;

    /// Insert `bars`, overwriting the measured columns of rows whose natural key
    /// already exists. All rows commit together or none do.
    ///
    /// An empty slice returns `Ok(())` without touching the backend, even on a
    /// store that was never initialized.
    fn batch_upsert<'a>(&'a mut self, bars: &'a [PriceBar]) -> StoreFuture<'a, ()>;

    /// Release the connection. Safe to call repeatedly and after a failed
    /// initialization.
    fn close(&mut self) -> StoreFuture<'_, ()>;
}
