//! Provider abstraction for remote market data sources.
//!
//! This module defines the [`DataProvider`] trait, the interface the loader
//! uses to fetch daily history from a market data vendor. The bundled
//! implementation talks to the Yahoo Finance chart API
//! ([`yahoo_rest::provider::YahooProvider`]); tests substitute in-memory
//! providers.
//!
//! The trait is designed for async usage and supports dynamic dispatch
//! (`dyn DataProvider`) so the loader can hold whichever provider it was built
//! with.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_loader::models::{
//!     price_point::PricePoint,
//!     request_params::HistoryRequest,
//! };
//! use market_data_loader::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_daily_history(
//!         &self,
//!         _request: &HistoryRequest,
//!     ) -> Result<Vec<PricePoint>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod yahoo_rest;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared_utils::config::ConfigError;
use snafu::{Backtrace, Snafu};

use crate::models::{price_point::PricePoint, request_params::HistoryRequest};

/// Trait for fetching daily OHLCV history from a market data provider.
#[async_trait]
pub trait DataProvider {
    /// Fetches daily bars for `request.ticker` over `request.start..=request.end`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PricePoint>)` - Points ascending by date, never empty.
    /// * `Err(ProviderError)` - Network, provider or decoding failure, or an
    ///   empty result.
    async fn fetch_daily_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Vec<PricePoint>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// An environment override is present but malformed.
    #[snafu(display("Invalid provider setting: {source}"))]
    InvalidSetting {
        source: ConfigError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The configured user agent contains invalid characters.
    #[snafu(display("Invalid user agent: {source}"))]
    InvalidUserAgent {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned an error status or error payload.
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The response body did not match the expected shape.
    #[snafu(display("Failed to decode provider response: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// The provider answered but had no bars for the requested range.
    #[snafu(display("No price history for {ticker} between {start} and {end}"))]
    EmptyHistory {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
        backtrace: Backtrace,
    },
}
