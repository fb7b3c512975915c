//! Next-day close forecasting over daily OHLCV history.
//!
//! A run loads a series through [`market_data_loader`], derives
//! [`features::FeatureRow`]s, trains one of the [`model::ModelSpec`] kinds on
//! a seeded random 80/20 split, and derives a [`signal::Signal`] from the
//! held-out predictions. [`session::Session`] keeps the last successful run.

pub mod config;
pub mod dataset;
pub mod errors;
pub mod export;
pub mod features;
pub mod metrics;
pub mod model;
pub mod report;
pub mod session;
pub mod signal;
pub mod trainer;

pub use errors::{PipelineError, TrainingError};
pub use session::{RunRequest, Session, SessionState};
