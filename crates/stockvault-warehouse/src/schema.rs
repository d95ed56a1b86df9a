//! Table definition and upsert statements for `stock_prices`.
//!
//! Both backends share the column layout and natural key; only the dialect
//! differs. Conflicts always overwrite all five measured columns.

pub const TABLE_NAME: &str = "stock_prices";

/// Natural key, in primary-key order.
pub const KEY_COLUMNS: [&str; 5] = ["symbol", "currency", "stock_name", "stock_type", "ts"];

/// Columns replaced when a write hits an existing key.
pub const MUTABLE_COLUMNS: [&str; 5] = ["open_price", "high", "low", "close_price", "volume"];

pub(crate) const DUCKDB_CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS stock_prices (
    ts TIMESTAMP NOT NULL,
    symbol VARCHAR NOT NULL,
    open_price DOUBLE,
    high DOUBLE,
    low DOUBLE,
    close_price DOUBLE,
    volume DOUBLE,
    currency VARCHAR NOT NULL,
    stock_name VARCHAR NOT NULL,
    stock_type VARCHAR NOT NULL,
    PRIMARY KEY (symbol, currency, stock_name, stock_type, ts)
);
"#;

pub(crate) const DUCKDB_UPSERT: &str = "\
INSERT INTO stock_prices \
    (ts, symbol, open_price, high, low, close_price, volume, currency, stock_name, stock_type) \
VALUES (CAST(? AS TIMESTAMP), ?, ?, ?, ?, ?, ?, ?, ?, ?) \
ON CONFLICT DO UPDATE SET \
    open_price = EXCLUDED.open_price, \
    high = EXCLUDED.high, \
    low = EXCLUDED.low, \
    close_price = EXCLUDED.close_price, \
    volume = EXCLUDED.volume";

pub(crate) const POSTGRES_CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS stock_prices (
    ts TIMESTAMP NOT NULL,
    symbol TEXT NOT NULL,
    open_price DOUBLE PRECISION,
    high DOUBLE PRECISION,
    low DOUBLE PRECISION,
    close_price DOUBLE PRECISION,
    volume DOUBLE PRECISION,
    currency TEXT NOT NULL,
    stock_name TEXT NOT NULL,
    stock_type TEXT NOT NULL,
    PRIMARY KEY (symbol, currency, stock_name, stock_type, ts)
)
"#;

pub(crate) const POSTGRES_UPSERT: &str = r#"
INSERT INTO stock_prices (
    ts, symbol, open_price, high, low, close_price, volume,
    currency, stock_name, stock_type
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
ON CONFLICT (symbol, currency, stock_name, stock_type, ts) DO UPDATE SET
    open_price = EXCLUDED.open_price,
    high = EXCLUDED.high,
    low = EXCLUDED.low,
    close_price = EXCLUDED.close_price,
    volume = EXCLUDED.volume
"#;
