use stockvault_core::{to_price_bars, InstrumentDescriptor, QuoteSeries, Symbol};
use tracing::{info, warn};

use crate::store::PriceStore;
use crate::StoreError;

/// A store that failed, with the error it returned.
#[derive(Debug)]
pub struct StoreFailure {
    pub store: &'static str,
    pub error: StoreError,
}

impl std::fmt::Display for StoreFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.store, self.error)
    }
}

impl std::error::Error for StoreFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Result of one store write inside [`Dispatcher::persist`].
#[derive(Debug)]
pub struct StoreOutcome {
    pub store: &'static str,
    pub result: Result<(), StoreError>,
}

/// What happened to one symbol's batch across all stores.
#[derive(Debug)]
pub struct PersistReport {
    pub symbol: Symbol,
    pub rows: usize,
    /// One entry per store, in store order. Empty when `rows == 0`.
    pub outcomes: Vec<StoreOutcome>,
}

impl PersistReport {
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &StoreError)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.store, e)))
    }
}

/// Fans a converted batch out to every configured store.
///
/// Stores are written sequentially in the order given. A failing store never
/// stops the ones after it, and nothing is retried here.
pub struct Dispatcher {
    stores: Vec<Box<dyn PriceStore>>,
}

impl Dispatcher {
    pub fn new(stores: Vec<Box<dyn PriceStore>>) -> Self {
        Self { stores }
    }

    pub fn store_ids(&self) -> Vec<&'static str> {
        self.stores.iter().map(|s| s.identify()).collect()
    }

    /// Initialize every store in order, stopping at the first failure.
    ///
    /// On failure the stores already opened are left open; callers are
    /// expected to follow up with [`Dispatcher::close_all`].
    pub async fn initialize_all(&mut self) -> Result<(), StoreFailure> {
        for store in &mut self.stores {
            let id = store.identify();
            store
                .initialize()
                .await
                .map_err(|error| StoreFailure { store: id, error })?;
        }
        Ok(())
    }

    /// Convert `series` once and upsert it into every store.
    pub async fn persist(
        &mut self,
        series: Option<&QuoteSeries>,
        descriptor: &InstrumentDescriptor,
    ) -> PersistReport {
        let symbol = descriptor.symbol.clone();
        let bars = to_price_bars(series, descriptor);

        if bars.is_empty() {
            info!(symbol = %symbol, "no data to persist");
            return PersistReport {
                symbol,
                rows: 0,
                outcomes: Vec::new(),
            };
        }

        let mut outcomes = Vec::with_capacity(self.stores.len());
        for store in &mut self.stores {
            let id = store.identify();
            let result = store.batch_upsert(&bars).await;
            match &result {
                Ok(()) => info!(store = id, symbol = %symbol, rows = bars.len(), "batch stored"),
                Err(error) => warn!(
                    store = id,
                    symbol = %symbol,
                    rows = bars.len(),
                    error = %error,
                    "batch write failed"
                ),
            }
            outcomes.push(StoreOutcome { store: id, result });
        }

        PersistReport {
            symbol,
            rows: bars.len(),
            outcomes,
        }
    }

    /// Close every store, logging failures. Returns how many failed to close.
    pub async fn close_all(&mut self) -> usize {
        let mut failed = 0;
        for store in &mut self.stores {
            if let Err(error) = store.close().await {
                failed += 1;
                warn!(store = store.identify(), error = %error, "close failed");
            }
        }
        failed
    }
}
