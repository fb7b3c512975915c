//! Yahoo Finance chart API provider.

pub mod params;
pub mod provider;
pub mod response;

pub use params::{ChartParams, Interval};
pub use provider::{YahooConfig, YahooProvider};
