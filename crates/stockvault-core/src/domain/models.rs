use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Closed set of instrument classes stored in `stock_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstrumentType {
    Index,
    Stock,
    Crypto,
    Other,
}

impl InstrumentType {
    pub const ALL: [Self; 4] = [Self::Index, Self::Stock, Self::Crypto, Self::Other];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "INDEX",
            Self::Stock => "STOCK",
            Self::Crypto => "CRYPTO",
            Self::Other => "OTHER",
        }
    }
}

impl Display for InstrumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INDEX" => Ok(Self::Index),
            "STOCK" => Ok(Self::Stock),
            "CRYPTO" => Ok(Self::Crypto),
            "OTHER" => Ok(Self::Other),
            _ => Err(ValidationError::InvalidInstrumentType {
                value: value.to_owned(),
            }),
        }
    }
}

/// Static per-symbol metadata used to enrich provider rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentDescriptor {
    pub symbol: Symbol,
    pub display_name: String,
    pub instrument_type: InstrumentType,
    pub currency: String,
}

impl InstrumentDescriptor {
    pub fn new(
        symbol: Symbol,
        display_name: impl Into<String>,
        instrument_type: InstrumentType,
        currency: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(ValidationError::EmptyInstrumentName);
        }

        Ok(Self {
            symbol,
            display_name,
            instrument_type,
            currency: validate_currency_code(currency.as_ref())?,
        })
    }
}

/// One symbol-day OHLCV bar enriched with instrument metadata.
///
/// The natural key is `(symbol, currency, instrument_name, instrument_type, timestamp)`;
/// the remaining fields are overwritten when a bar with the same key is written again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub timestamp: UtcDateTime,
    pub symbol: Symbol,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub currency: String,
    pub instrument_name: String,
    pub instrument_type: InstrumentType,
}

impl PriceBar {
    /// Stamp one OHLCV row with the descriptor's metadata.
    pub fn from_descriptor(
        descriptor: &InstrumentDescriptor,
        timestamp: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            symbol: descriptor.symbol.clone(),
            open,
            high,
            low,
            close,
            volume,
            currency: descriptor.currency.clone(),
            instrument_name: descriptor.display_name.clone(),
            instrument_type: descriptor.instrument_type,
        }
    }
}

/// Trim a configured currency. Case is kept: `GBp` and `GBP` are different units.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyCurrency);
    }
    Ok(trimmed.to_owned())
}
