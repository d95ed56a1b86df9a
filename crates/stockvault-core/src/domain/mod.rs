//! # Domain Models
//!
//! Canonical record types for stockvault.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PriceBar`] | One symbol-day OHLCV bar plus instrument metadata |
//! | [`InstrumentDescriptor`] | Configured metadata for one tracked symbol |
//! | [`InstrumentType`] | INDEX, STOCK, CRYPTO or OTHER |
//! | [`QuoteSeries`] | Raw provider history as parallel columns |
//! | [`Symbol`] | Validated provider ticker |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! [`to_price_bars`] is the only conversion between provider output and stored
//! records:
//!
//! ```rust,ignore
//! use stockvault_core::{to_price_bars, InstrumentDescriptor, InstrumentType, QuoteSeries, Symbol};
//!
//! let descriptor = InstrumentDescriptor::new(
//!     Symbol::parse("^GSPC")?, "S&P 500", InstrumentType::Index, "USD",
//! )?;
//! let bars = to_price_bars(series.as_ref(), &descriptor);
//! ```

mod models;
mod series;
mod symbol;
mod timestamp;

pub use models::{validate_currency_code, InstrumentDescriptor, InstrumentType, PriceBar};
pub use series::{to_price_bars, QuoteSeries};
pub use symbol::Symbol;
pub use timestamp::{parse_date, UtcDateTime};
