//! Canonical in-memory representation of a daily OHLCV record.
//!
//! Every data source (sample generator, uploaded table, remote provider)
//! produces a `Vec<PricePoint>` ordered by date ascending.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily price record.
///
/// Within a series, dates are strictly increasing and volume is never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading day.
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price of the day.
    pub high: f64,

    /// Lowest price of the day.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Shares traded during the day.
    pub volume: f64,
}

/// Returns `true` when `points` are strictly increasing by date.
pub fn is_strictly_ascending(points: &[PricePoint]) -> bool {
    points.windows(2).all(|w| w[0].date < w[1].date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(y: i32, m: u32, d: u32) -> PricePoint {
        PricePoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 0.0,
        }
    }

    #[test]
    fn ascending_check_rejects_duplicates_and_reversals() {
        assert!(is_strictly_ascending(&[]));
        assert!(is_strictly_ascending(&[point(2024, 1, 2), point(2024, 1, 3)]));
        assert!(!is_strictly_ascending(&[point(2024, 1, 2), point(2024, 1, 2)]));
        assert!(!is_strictly_ascending(&[point(2024, 1, 3), point(2024, 1, 2)]));
    }
}
