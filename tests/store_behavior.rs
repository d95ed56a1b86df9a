//! Behavior tests for the price stores and the dispatcher.
//!
//! These run against real `DuckDB` files in a temp directory and check what a
//! caller can observe in `stock_prices` after each write.

use std::path::Path;

use duckdb::Connection;
use stockvault_core::{
    to_price_bars, InstrumentDescriptor, InstrumentType, PriceBar, QuoteSeries, Symbol,
    UtcDateTime,
};
use stockvault_warehouse::{Dispatcher, DuckDbStore, PriceStore, StoreError, StoreFuture};
use tempfile::tempdir;

#[derive(Debug, PartialEq)]
struct Row {
    symbol: String,
    ts: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    currency: String,
    stock_name: String,
    stock_type: String,
}

fn read_rows(path: &Path) -> Vec<Row> {
    let connection = Connection::open(path).expect("reopen database");
    let mut statement = connection
        .prepare(
            "SELECT symbol, CAST(ts AS VARCHAR), open_price, high, low, close_price, volume, \
             currency, stock_name, stock_type \
             FROM stock_prices ORDER BY symbol, ts",
        )
        .expect("prepare");
    statement
        .query_map([], |row| {
            Ok(Row {
                symbol: row.get(0)?,
                ts: row.get(1)?,
                open: row.get(2)?,
                high: row.get(3)?,
                low: row.get(4)?,
                close: row.get(5)?,
                volume: row.get(6)?,
                currency: row.get(7)?,
                stock_name: row.get(8)?,
                stock_type: row.get(9)?,
            })
        })
        .expect("query")
        .collect::<Result<Vec<_>, _>>()
        .expect("rows")
}

fn abc() -> InstrumentDescriptor {
    InstrumentDescriptor::new(
        Symbol::parse("ABC").expect("valid symbol"),
        "ABC Corp",
        InstrumentType::Stock,
        "USD",
    )
    .expect("valid descriptor")
}

fn day(value: &str) -> UtcDateTime {
    UtcDateTime::parse(value).expect("valid timestamp")
}

fn bar(ts: &str, open: f64, high: f64, low: f64, close: f64, volume: f64) -> PriceBar {
    PriceBar::from_descriptor(&abc(), day(ts), open, high, low, close, volume)
}

// =============================================================================
// Idempotent upsert
// =============================================================================

#[tokio::test]
async fn writing_the_same_key_twice_keeps_one_row_with_the_latest_values() {
    // Given: An initialized store
    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("prices.duckdb");
    let mut store = DuckDbStore::new(&db_path);
    store.initialize().await.expect("initialize");

    // When: The same natural key is written twice with different prices
    let first = bar("2024-01-02T00:00:00Z", 10.0, 12.0, 9.0, 11.0, 100.0);
    let second = bar("2024-01-02T00:00:00Z", 10.5, 12.5, 9.5, 11.5, 120.0);
    store.batch_upsert(&[first]).await.expect("first write");
    store.batch_upsert(&[second]).await.expect("second write");
    store.close().await.expect("close");

    // Then: One row remains and every measured column reflects the second write
    let rows = read_rows(&db_path);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.ts, "2024-01-02 00:00:00");
    assert_eq!(
        (row.open, row.high, row.low, row.close, row.volume),
        (10.5, 12.5, 9.5, 11.5, 120.0)
    );
    assert_eq!(
        (row.currency.as_str(), row.stock_name.as_str(), row.stock_type.as_str()),
        ("USD", "ABC Corp", "STOCK")
    );
}

#[tokio::test]
async fn two_day_history_with_a_revised_first_day() {
    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("prices.duckdb");
    let mut store = DuckDbStore::new(&db_path);
    store.initialize().await.expect("initialize");

    let series = QuoteSeries::new(
        vec![day("2024-01-02T00:00:00Z"), day("2024-01-03T00:00:00Z")],
        vec![10.0, 11.0],
        vec![12.0, 13.0],
        vec![9.0, 10.0],
        vec![11.0, 12.0],
        vec![100.0, 150.0],
    )
    .expect("aligned series");
    let bars = to_price_bars(Some(&series), &abc());
    store.batch_upsert(&bars).await.expect("initial import");

    // The provider later revises day 1's close.
    let revised = bar("2024-01-02T00:00:00Z", 10.0, 12.0, 9.0, 11.5, 100.0);
    store.batch_upsert(&[revised]).await.expect("revision");
    store.close().await.expect("close");

    let rows = read_rows(&db_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].ts, "2024-01-02 00:00:00");
    assert_eq!(rows[0].close, 11.5);
    assert_eq!(rows[1].ts, "2024-01-03 00:00:00");
    assert_eq!(rows[1].close, 12.0);
    assert_eq!(rows[1].volume, 150.0);
    assert!(rows.iter().all(|row| row.symbol == "ABC"));
}

#[tokio::test]
async fn replaying_a_batch_changes_nothing() {
    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("prices.duckdb");
    let mut store = DuckDbStore::new(&db_path);
    store.initialize().await.expect("initialize");

    let bars: Vec<PriceBar> = (0..5)
        .map(|i| {
            let base = 100.0 + f64::from(i);
            PriceBar::from_descriptor(
                &abc(),
                UtcDateTime::from_unix_timestamp(1_704_153_600 + i64::from(i) * 86_400)
                    .expect("timestamp"),
                base,
                base + 1.0,
                base - 1.0,
                base + 0.5,
                1_000.0,
            )
        })
        .collect();

    store.batch_upsert(&bars).await.expect("first pass");
    store.batch_upsert(&bars).await.expect("replay");
    store.close().await.expect("close");

    let rows = read_rows(&db_path);
    assert_eq!(rows.len(), 5);
    for (row, bar) in rows.iter().zip(&bars) {
        assert_eq!(row.open, bar.open);
        assert_eq!(row.close, bar.close);
    }
}

#[tokio::test]
async fn different_currency_is_a_different_key() {
    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("prices.duckdb");
    let mut store = DuckDbStore::new(&db_path);
    store.initialize().await.expect("initialize");

    let usd = bar("2024-01-02T00:00:00Z", 1.0, 1.0, 1.0, 1.0, 1.0);
    let mut eur = usd.clone();
    eur.currency = String::from("EUR");
    store.batch_upsert(&[usd, eur]).await.expect("write");
    store.close().await.expect("close");

    assert_eq!(read_rows(&db_path).len(), 2);
}

// =============================================================================
// Transactions and lifecycle
// =============================================================================

#[tokio::test]
async fn a_failing_row_rolls_back_the_whole_batch() {
    // Given: A table that rejects negative volume
    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("prices.duckdb");
    {
        let connection = Connection::open(&db_path).expect("open");
        connection
            .execute_batch(
                "CREATE TABLE stock_prices (
                    ts TIMESTAMP NOT NULL, symbol VARCHAR NOT NULL,
                    open_price DOUBLE, high DOUBLE, low DOUBLE, close_price DOUBLE,
                    volume DOUBLE CHECK (volume >= 0),
                    currency VARCHAR NOT NULL, stock_name VARCHAR NOT NULL,
                    stock_type VARCHAR NOT NULL,
                    PRIMARY KEY (symbol, currency, stock_name, stock_type, ts)
                );",
            )
            .expect("create strict table");
    }
    let mut store = DuckDbStore::new(&db_path);
    store.initialize().await.expect("initialize keeps the existing table");

    // When: The second of three rows violates the constraint
    let batch = [
        bar("2024-01-02T00:00:00Z", 1.0, 1.0, 1.0, 1.0, 10.0),
        bar("2024-01-03T00:00:00Z", 1.0, 1.0, 1.0, 1.0, -1.0),
        bar("2024-01-04T00:00:00Z", 1.0, 1.0, 1.0, 1.0, 10.0),
    ];
    let error = store.batch_upsert(&batch).await.expect_err("row 2 fails");
    assert!(matches!(error, StoreError::DuckDb(_)));

    // Then: The store stays usable and no row of the failed batch is visible
    store
        .batch_upsert(&batch[..1])
        .await
        .expect("store is usable after rollback");
    store.close().await.expect("close");

    let rows = read_rows(&db_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].ts, "2024-01-02 00:00:00");
}

#[tokio::test]
async fn empty_batch_succeeds_without_initialize() {
    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("never-opened.duckdb");
    let mut store = DuckDbStore::new(&db_path);

    store.batch_upsert(&[]).await.expect("empty batch is a no-op");
    store.close().await.expect("close");

    assert!(!db_path.exists(), "no file should be created");
}

// =============================================================================
// Dispatcher
// =============================================================================

struct BrokenStore;

impl PriceStore for BrokenStore {
    fn identify(&self) -> &'static str {
        "broken"
    }

    fn initialize(&mut self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn batch_upsert<'a>(&'a mut self, _bars: &'a [PriceBar]) -> StoreFuture<'a, ()> {
        Box::pin(async { Err(StoreError::NotInitialized { store: "broken" }) })
    }

    fn close(&mut self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

#[tokio::test]
async fn a_broken_store_does_not_keep_data_from_a_healthy_one() {
    // Given: A failing store listed before a working DuckDB store
    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("prices.duckdb");
    let mut dispatcher = Dispatcher::new(vec![
        Box::new(BrokenStore) as Box<dyn PriceStore>,
        Box::new(DuckDbStore::new(&db_path)),
    ]);
    dispatcher.initialize_all().await.expect("initialize");

    // When: A batch is persisted
    let series = QuoteSeries::new(
        vec![day("2024-01-02T00:00:00Z")],
        vec![10.0],
        vec![12.0],
        vec![9.0],
        vec![11.0],
        vec![100.0],
    )
    .expect("aligned series");
    let report = dispatcher.persist(Some(&series), &abc()).await;
    assert_eq!(dispatcher.close_all().await, 0);

    // Then: The failure is reported and the healthy store has the row
    assert_eq!(report.rows, 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.outcomes[0].store, "broken");
    assert!(report.outcomes[1].result.is_ok());
    assert_eq!(read_rows(&db_path).len(), 1);
}

#[tokio::test]
async fn initialize_failure_names_the_store() {
    // A directory where the database file should be makes open fail.
    let temp = tempdir().expect("tempdir");
    let db_path = temp.path().join("occupied");
    std::fs::create_dir_all(&db_path).expect("create directory");

    let mut dispatcher = Dispatcher::new(vec![Box::new(DuckDbStore::new(&db_path)) as Box<dyn PriceStore>]);
    let failure = dispatcher
        .initialize_all()
        .await
        .expect_err("cannot open a directory as a database");

    assert_eq!(failure.store, "duckdb");
    assert_eq!(dispatcher.close_all().await, 0);
}
