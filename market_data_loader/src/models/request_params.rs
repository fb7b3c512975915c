use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ticker used when a caller doesn't name one.
pub const DEFAULT_TICKER: &str = "TSLA";

/// Parameters for requesting daily history from a market data provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Symbol to request (e.g. `"TSLA"`).
    pub ticker: String,

    /// First trading day to include.
    pub start: NaiveDate,

    /// Last trading day to include.
    ///
    /// Unlike most REST APIs the range here is inclusive on both ends;
    /// providers translate it into whatever their wire format expects.
    pub end: NaiveDate,
}

impl HistoryRequest {
    /// Request for the default ticker over `start..=end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            start,
            end,
        }
    }

    /// Same range, different ticker.
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = ticker.into();
        self
    }
}
