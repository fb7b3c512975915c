//! Daily OHLCV loading for the price forecaster.
//!
//! [`loader::DataLoader`] turns a [`sources::DataSource`] (sample walk, uploaded
//! table, or remote history) into an ascending series of
//! [`models::price_point::PricePoint`]s and memoises the result.

pub mod cache;
pub mod errors;
pub mod loader;
pub mod models;
pub mod providers;
pub mod sources;

pub use errors::{LoadError, ParseError};
pub use loader::DataLoader;
pub use models::{price_point::PricePoint, request_params::HistoryRequest};
pub use sources::{DataSource, upload::UploadedFile};
