//! Synthetic daily series used when no real data is supplied.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::models::price_point::PricePoint;

/// Parameters of the seeded random walk.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSpec {
    pub seed: u64,
    pub start: NaiveDate,
    /// Inclusive.
    pub end: NaiveDate,
    pub start_price: f64,
    pub step_sigma: f64,
    pub range_sigma: f64,
    pub open_sigma: f64,
    pub volume_min: u64,
    pub volume_max: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            start_price: 250.0,
            step_sigma: 5.0,
            range_sigma: 3.0,
            open_sigma: 2.0,
            volume_min: 20_000_000,
            volume_max: 35_000_000,
        }
    }
}

/// Generates the default sample series: 261 business days of 2023.
pub fn generate_sample_series() -> Vec<PricePoint> {
    SampleSpec::default().generate()
}

impl SampleSpec {
    /// Runs the walk. Same spec, same output, bit for bit.
    pub fn generate(&self) -> Vec<PricePoint> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut price = self.start_price;

        business_days(self.start, self.end)
            .map(|date| {
                price += self.step_sigma * normal(&mut rng);
                let high = price + (self.range_sigma * normal(&mut rng)).abs();
                let low = price - (self.range_sigma * normal(&mut rng)).abs();
                let volume = rng.gen_range(self.volume_min..self.volume_max) as f64;
                let open = price + self.open_sigma * normal(&mut rng);
                PricePoint {
                    date,
                    open,
                    high,
                    low,
                    close: price,
                    volume,
                }
            })
            .collect()
    }
}

fn normal(rng: &mut ChaCha8Rng) -> f64 {
    rng.sample(StandardNormal)
}

fn business_days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |d| d.checked_add_days(Days::new(1)))
        .take_while(move |d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
}
