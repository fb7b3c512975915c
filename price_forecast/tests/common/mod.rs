#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use market_data_loader::{
    DataLoader, HistoryRequest, PricePoint,
    providers::{DataProvider, EmptyHistorySnafu, ProviderError},
};

/// Serves a fixed series for any request; an empty series fails like an
/// unknown ticker would.
#[derive(Clone, Default)]
pub struct StubProvider {
    pub series: Vec<PricePoint>,
    pub calls: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn with_series(series: Vec<PricePoint>) -> Self {
        Self {
            series,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataProvider for StubProvider {
    async fn fetch_daily_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.series.is_empty() {
            return EmptyHistorySnafu {
                ticker: request.ticker.clone(),
                start: request.start,
                end: request.end,
            }
            .fail();
        }
        Ok(self.series.clone())
    }
}

pub fn loader_with(series: Vec<PricePoint>) -> (DataLoader, StubProvider) {
    let provider = StubProvider::with_series(series);
    (DataLoader::new(Box::new(provider.clone())), provider)
}

/// Deterministic wavy upward series of `n` consecutive days.
pub fn synthetic_series(n: usize) -> Vec<PricePoint> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 200.0 + 0.3 * t + 6.0 * (t / 4.0).sin();
            PricePoint {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                open: close - 0.8 * (t / 3.0).cos(),
                high: close + 2.0 + (t / 5.0).sin().abs(),
                low: close - 2.0 - (t / 7.0).cos().abs(),
                close,
                volume: 25_000_000.0 + 1_000_000.0 * (t / 2.0).sin(),
            }
        })
        .collect()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Upload table for `points` with the canonical header.
pub fn to_csv(points: &[PricePoint]) -> Vec<u8> {
    let mut out = String::from("Date,Open,High,Low,Close,Volume\n");
    for p in points {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            p.date, p.open, p.high, p.low, p.close, p.volume
        ));
    }
    out.into_bytes()
}
