//! # Stockvault Core
//!
//! Domain model and quote source contract for the stockvault price collector.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Quote source implementations (Yahoo chart API) |
//! | [`data_source`] | `QuoteSource` trait, `HistoryRequest`, `SourceError` |
//! | [`domain`] | `PriceBar`, `InstrumentDescriptor`, `QuoteSeries` and conversion |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`retry`] | Backoff and retry policy |
//!
//! ## Flow
//!
//! ```text
//! QuoteSource::fetch_daily ──▶ Option<QuoteSeries>
//!                                   │
//!                                   ▼  to_price_bars(series, descriptor)
//!                              Vec<PriceBar> ──▶ stockvault-warehouse
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use stockvault_core::{SourceError, SourceErrorKind};
//!
//! fn should_skip_symbol(error: &SourceError) -> bool {
//!     matches!(error.kind(), SourceErrorKind::InvalidRequest)
//! }
//! ```

pub mod adapters;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod retry;

pub use adapters::YahooSource;

pub use data_source::{HistoryRequest, QuoteSource, SourceError, SourceErrorKind};

pub use domain::{
    parse_date, to_price_bars, validate_currency_code, InstrumentDescriptor, InstrumentType,
    PriceBar, QuoteSeries, Symbol, UtcDateTime,
};

pub use error::ValidationError;

pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use retry::{Backoff, RetryConfig};
