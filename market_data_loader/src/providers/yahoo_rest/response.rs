use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::models::{price_point::PricePoint, request_params::HistoryRequest};

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
pub struct ChartMeta {
    /// Exchange offset from UTC in seconds; bars are stamped at the local open.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl ChartResult {
    /// Converts the columnar chart payload into ascending [`PricePoint`]s.
    ///
    /// Bars with any missing OHLCV value, a negative volume, or a date outside
    /// `request.start..=request.end` are skipped. If the provider repeats a
    /// day, the last bar for that day wins.
    pub fn into_price_points(self, request: &HistoryRequest) -> Vec<PricePoint> {
        let offset = self.meta.gmtoffset;
        let timestamps = self.timestamp.unwrap_or_default();
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();

        let cell = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();

        let mut points: Vec<PricePoint> = timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let date = local_date(ts, offset)?;
                if date < request.start || date > request.end {
                    return None;
                }
                let volume = cell(&quote.volume, i).filter(|v| *v >= 0.0)?;
                Some(PricePoint {
                    date,
                    open: cell(&quote.open, i)?,
                    high: cell(&quote.high, i)?,
                    low: cell(&quote.low, i)?,
                    close: cell(&quote.close, i)?,
                    volume,
                })
            })
            .collect();

        points.sort_by_key(|p| p.date);
        // keep the last bar of each day
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();
        points
    }
}

fn local_date(ts: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts.checked_add(gmtoffset)?, 0).map(|dt| dt.date_naive())
}
