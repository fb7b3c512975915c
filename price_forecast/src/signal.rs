//! Trading signal and series summaries derived from a finished run.

use std::fmt;

use market_data_loader::PricePoint;
use serde::Serialize;

/// Upper bound on reported confidence, in percent.
pub const MAX_CONFIDENCE: f64 = 95.0;
/// Rows shown in a [`DataPreview`].
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.write_str("BUY"),
            TradeAction::Sell => f.write_str("SELL"),
        }
    }
}

/// Buy/sell recommendation from the latest model prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub action: TradeAction,
    /// Percent, `clamp(r2 * 100, 0, 95)`.
    pub confidence: f64,
    pub predicted_price: f64,
    pub current_price: f64,
}

impl Signal {
    /// Compares the last test-set prediction with the last loaded close.
    ///
    /// Returns `None` if either is missing.
    pub fn from_run(predictions: &[f64], series: &[PricePoint], r2: f64) -> Option<Self> {
        let predicted_price = *predictions.last()?;
        let current_price = series.last()?.close;
        let action = if predicted_price > current_price {
            TradeAction::Buy
        } else {
            TradeAction::Sell
        };
        let confidence = if r2.is_finite() {
            (r2 * 100.0).clamp(0.0, MAX_CONFIDENCE)
        } else {
            0.0
        };
        Some(Self {
            action,
            confidence,
            predicted_price,
            current_price,
        })
    }

    /// Relative move implied by the prediction, in percent.
    ///
    /// `None` when the current close is zero.
    pub fn expected_change_pct(&self) -> Option<f64> {
        if self.current_price == 0.0 {
            return None;
        }
        let pct = (self.predicted_price - self.current_price) / self.current_price * 100.0;
        pct.is_finite().then_some(pct)
    }
}

/// Day-over-day close direction counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MovementSummary {
    pub up: usize,
    pub down: usize,
    pub flat: usize,
}

impl MovementSummary {
    pub fn from_series(series: &[PricePoint]) -> Self {
        series
            .windows(2)
            .fold(Self::default(), |mut acc, w| {
                match w[1].close.partial_cmp(&w[0].close) {
                    Some(std::cmp::Ordering::Greater) => acc.up += 1,
                    Some(std::cmp::Ordering::Less) => acc.down += 1,
                    _ => acc.flat += 1,
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.up + self.down + self.flat
    }
}

/// Head of the loaded series plus its size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPreview {
    pub head: Vec<PricePoint>,
    pub total_rows: usize,
}

impl DataPreview {
    pub fn from_series(series: &[PricePoint]) -> Self {
        Self {
            head: series.iter().take(PREVIEW_ROWS).cloned().collect(),
            total_rows: series.len(),
        }
    }
}
