use thiserror::Error;

/// Validation and contract errors exposed by `stockvault-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid instrument type '{value}', expected one of INDEX, STOCK, CRYPTO, OTHER")]
    InvalidInstrumentType { value: String },

    #[error("currency cannot be empty")]
    EmptyCurrency,

    #[error("instrument name cannot be empty")]
    EmptyInstrumentName,

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("invalid unix timestamp {value}")]
    InvalidUnixTimestamp { value: i64 },
    #[error("date must match YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("series column '{column}' has {actual} entries, expected {expected}")]
    MisalignedSeries {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}

