use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    models::request_params::HistoryRequest,
    providers::{ProviderError, ValidationSnafu},
};

/// Bar interval requested from the chart endpoint. Only daily bars are used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Interval {
    #[default]
    #[serde(rename = "1d")]
    Day,
}

/// Which corporate events to include in the response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Events {
    #[default]
    History,
}

/// Query string for `GET /v8/finance/chart/{symbol}`.
///
/// `period1` is inclusive and `period2` exclusive, both as unix seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartParams {
    pub period1: i64,
    pub period2: i64,
    pub interval: Interval,
    pub events: Events,
    pub include_adjusted_close: bool,
}

impl ChartParams {
    /// Builds daily-bar query parameters covering `request.start..=request.end`.
    pub fn daily(request: &HistoryRequest) -> Result<Self, ProviderError> {
        validate_request(request)?;
        let end_exclusive = request
            .end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| {
                ValidationSnafu {
                    message: format!("end date {} is out of range", request.end),
                }
                .build()
            })?;

        Ok(Self {
            period1: midnight_utc(request.start),
            period2: midnight_utc(end_exclusive),
            interval: Interval::Day,
            events: Events::History,
            include_adjusted_close: true,
        })
    }
}

/// Rejects requests the chart API would answer with garbage or an error page.
pub fn validate_request(request: &HistoryRequest) -> Result<(), ProviderError> {
    let ticker = request.ticker.trim();
    if ticker.is_empty() {
        return ValidationSnafu {
            message: "ticker cannot be empty",
        }
        .fail();
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return ValidationSnafu {
            message: format!("ticker {ticker:?} contains unsupported characters"),
        }
        .fail();
    }
    if request.start > request.end {
        return ValidationSnafu {
            message: format!(
                "start date {} is after end date {}",
                request.start, request.end
            ),
        }
        .fail();
    }
    Ok(())
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}
