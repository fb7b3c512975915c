use chrono::NaiveDate;
use thiserror::Error;

use crate::providers::ProviderError;

/// Errors raised while parsing an uploaded price table.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The header row lacks a required column.
    #[error("missing required column `{column}`")]
    MissingColumn { column: &'static str },

    /// A `Date` cell could not be read as a calendar date.
    #[error("line {line}: unparsable date {value:?}")]
    InvalidDate { line: u64, value: String },

    /// A numeric cell could not be read as a number.
    #[error("line {line}: column `{column}` has non-numeric value {value:?}")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    /// Two rows share the same date.
    #[error("duplicate row for date {date}")]
    DuplicateDate { date: NaiveDate },

    /// A row reports a negative volume.
    #[error("line {line}: negative volume {value}")]
    NegativeVolume { line: u64, value: f64 },

    /// The underlying reader rejected the input (bad quoting, ragged rows, ...).
    #[error("malformed delimited text: {0}")]
    Csv(#[from] csv::Error),
}

/// The unified error type for loading a price series from any source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// An uploaded table could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A remote provider failed or returned nothing.
    #[error("Fetch error: {0}")]
    Fetch(#[from] ProviderError),
}
