#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use market_data_loader::{
    HistoryRequest, PricePoint,
    providers::{DataProvider, ProviderError, ValidationSnafu},
};

/// Provider that answers from memory and counts how often it was asked.
#[derive(Clone, Default)]
pub struct CountingProvider {
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
}

impl CountingProvider {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataProvider for CountingProvider {
    async fn fetch_daily_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return ValidationSnafu {
                message: "scripted failure",
            }
            .fail();
        }
        Ok(series(request.start, 3))
    }
}

/// `n` consecutive daily points starting at `start` with a rising close.
pub fn series(start: NaiveDate, n: usize) -> Vec<PricePoint> {
    (0..n)
        .map(|i| {
            let close = 100.0 + i as f64;
            PricePoint {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000.0 + i as f64,
            }
        })
        .collect()
}

/// Renders points as an upload table with the canonical header.
pub fn to_csv(points: &[PricePoint]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for p in points {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            p.date, p.open, p.high, p.low, p.close, p.volume
        ));
    }
    out
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
