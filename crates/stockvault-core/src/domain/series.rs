use serde::Serialize;

use crate::{InstrumentDescriptor, PriceBar, UtcDateTime, ValidationError};

/// Raw daily history as returned by a quote source: parallel, index-aligned columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteSeries {
    dates: Vec<UtcDateTime>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
}

impl QuoteSeries {
    /// Build a series, rejecting columns whose length differs from `dates`.
    pub fn new(
        dates: Vec<UtcDateTime>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        volume: Vec<f64>,
    ) -> Result<Self, ValidationError> {
        let expected = dates.len();
        for (column, actual) in [
            ("open", open.len()),
            ("high", high.len()),
            ("low", low.len()),
            ("close", close.len()),
            ("volume", volume.len()),
        ] {
            if actual != expected {
                return Err(ValidationError::MisalignedSeries {
                    column,
                    expected,
                    actual,
                });
            }
        }

        Ok(Self {
            dates,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[UtcDateTime] {
        &self.dates
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    /// Append one row. Keeps the columns aligned by construction.
    pub fn push(&mut self, date: UtcDateTime, open: f64, high: f64, low: f64, close: f64, volume: f64) {
        self.dates.push(date);
        self.open.push(open);
        self.high.push(high);
        self.low.push(low);
        self.close.push(close);
        self.volume.push(volume);
    }
}

/// Convert a raw series into price bars stamped with `descriptor`.
///
/// An absent or empty series is a normal outcome and yields no bars.
pub fn to_price_bars(
    series: Option<&QuoteSeries>,
    descriptor: &InstrumentDescriptor,
) -> Vec<PriceBar> {
    let Some(series) = series else {
        return Vec::new();
    };

    (0..series.len())
        .map(|i| {
            PriceBar::from_descriptor(
                descriptor,
                series.dates[i],
                series.open[i],
                series.high[i],
                series.low[i],
                series.close[i],
                series.volume[i],
            )
        })
        .collect()
}
