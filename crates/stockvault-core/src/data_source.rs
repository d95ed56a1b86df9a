//! Quote source contract and request/error types.
//!
//! A [`QuoteSource`] answers one question: the daily OHLCV history of a symbol
//! over a half-open date range `[start, end)`. "No data for that range" is a
//! successful `Ok(None)`; everything else that goes wrong is a [`SourceError`].
//!
//! ```rust,ignore
//! use stockvault_core::{HistoryRequest, QuoteSource, Symbol, YahooSource};
//! use time::macros::date;
//!
//! async fn latest(source: &YahooSource) -> Result<(), stockvault_core::SourceError> {
//!     let request = HistoryRequest::new(
//!         Symbol::parse("AAPL")?, date!(2024 - 01 - 01), date!(2024 - 02 - 01),
//!     )?;
//!     if let Some(series) = source.fetch_daily(&request).await? {
//!         println!("{} bars", series.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use time::Date;

use crate::{QuoteSeries, Symbol, ValidationError};

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure or upstream 5xx.
    Unavailable,
    /// Upstream throttled the request.
    RateLimited,
    /// Unknown symbol or malformed request; retrying will not help.
    InvalidRequest,
    /// Upstream answered with something we could not interpret.
    Internal,
}

/// Structured source error carried back to the fetch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Request payload for a daily history fetch over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub start: Date,
    pub end: Date,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, start: Date, end: Date) -> Result<Self, SourceError> {
        if start >= end {
            return Err(SourceError::invalid_request(format!(
                "history range start {start} must be before end {end}"
            )));
        }
        Ok(Self { symbol, start, end })
    }
}

/// External quote provider contract.
///
/// Implementations must be `Send + Sync`; the fetch loop holds one behind a
/// trait object and awaits it from the runtime's main task.
pub trait QuoteSource: Send + Sync {
    /// Short provider name for logs.
    fn id(&self) -> &'static str;

    /// Fetch daily bars for `req`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if:
    /// - The provider is unreachable or throttling (retryable)
    /// - The symbol is unknown to the provider
    /// - The response cannot be interpreted
    fn fetch_daily<'a>(
        &'a self,
        req: &'a HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Option<QuoteSeries>, SourceError>> + Send + 'a>>;
}
