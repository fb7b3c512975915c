//! Technical-indicator features derived from a daily price series.
//!
//! Every [`FeatureRow`] is complete: rows whose rolling windows, lags or
//! forward target would be partial are dropped, never imputed.

use chrono::NaiveDate;
use market_data_loader::PricePoint;
use serde::Serialize;

/// Close moving-average windows.
pub const MA_WINDOWS: [usize; 3] = [5, 20, 50];
/// Volume moving-average window.
pub const VOLUME_MA_WINDOW: usize = 10;
/// Close lags carried as predictors.
pub const CLOSE_LAGS: [usize; 4] = [1, 2, 3, 5];
/// Leading rows dropped before the first complete row.
pub const WARMUP_ROWS: usize = 50;

/// Predictor columns in model order. `date`, `close` and `target` are never
/// predictors.
pub const FEATURE_COLUMNS: [&str; 14] = [
    "open",
    "high",
    "low",
    "volume",
    "ma_5",
    "ma_20",
    "ma_50",
    "price_change",
    "high_low_pct",
    "volume_ma",
    "close_lag_1",
    "close_lag_2",
    "close_lag_3",
    "close_lag_5",
];

/// A price point plus its engineered features and next-day target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub ma_5: f64,
    pub ma_20: f64,
    pub ma_50: f64,
    /// Fractional change of close from the previous day.
    pub price_change: f64,
    /// `(high - low) / close`.
    pub high_low_pct: f64,
    pub volume_ma: f64,
    pub close_lag_1: f64,
    pub close_lag_2: f64,
    pub close_lag_3: f64,
    pub close_lag_5: f64,
    /// Next day's close.
    pub target: f64,
}

impl FeatureRow {
    /// Predictor values in [`FEATURE_COLUMNS`] order.
    pub fn feature_vector(&self) -> Vec<f64> {
        vec![
            self.open,
            self.high,
            self.low,
            self.volume,
            self.ma_5,
            self.ma_20,
            self.ma_50,
            self.price_change,
            self.high_low_pct,
            self.volume_ma,
            self.close_lag_1,
            self.close_lag_2,
            self.close_lag_3,
            self.close_lag_5,
        ]
    }

    fn is_finite(&self) -> bool {
        self.feature_vector().iter().all(|v| v.is_finite())
            && self.close.is_finite()
            && self.target.is_finite()
    }
}

/// Builds complete feature rows from `points`.
///
/// Input is sorted by date first. For `n` points the result has
/// `n.saturating_sub(WARMUP_ROWS + 1)` rows, fewer only if a row would contain
/// a non-finite value (e.g. a zero close). Short input yields an empty vector.
pub fn build_features(points: &[PricePoint]) -> Vec<FeatureRow> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.date);

    let n = sorted.len();
    if n <= WARMUP_ROWS + 1 {
        return Vec::new();
    }

    let close: Vec<f64> = sorted.iter().map(|p| p.close).collect();
    let volume: Vec<f64> = sorted.iter().map(|p| p.volume).collect();

    let [ma5, ma20, ma50] = MA_WINDOWS.map(|w| rolling_mean(&close, w));
    let volume_ma = rolling_mean(&volume, VOLUME_MA_WINDOW);

    (WARMUP_ROWS..n - 1)
        .filter_map(|i| {
            let p = &sorted[i];
            let row = FeatureRow {
                date: p.date,
                open: p.open,
                high: p.high,
                low: p.low,
                close: p.close,
                volume: p.volume,
                ma_5: ma5[i]?,
                ma_20: ma20[i]?,
                ma_50: ma50[i]?,
                price_change: (close[i] - close[i - 1]) / close[i - 1],
                high_low_pct: (p.high - p.low) / p.close,
                volume_ma: volume_ma[i]?,
                close_lag_1: lag(&close, i, CLOSE_LAGS[0])?,
                close_lag_2: lag(&close, i, CLOSE_LAGS[1])?,
                close_lag_3: lag(&close, i, CLOSE_LAGS[2])?,
                close_lag_5: lag(&close, i, CLOSE_LAGS[3])?,
                target: close[i + 1],
            };
            row.is_finite().then_some(row)
        })
        .collect()
}

/// Mean of the `window` values ending at each index; `None` until the window
/// is full.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            (window > 0 && i + 1 >= window).then(|| {
                values[i + 1 - window..=i].iter().sum::<f64>() / window as f64
            })
        })
        .collect()
}

fn lag(values: &[f64], i: usize, k: usize) -> Option<f64> {
    i.checked_sub(k).map(|j| values[j])
}
