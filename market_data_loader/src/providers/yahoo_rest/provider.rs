use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use shared_utils::{config::parse_env_var, env::get_env_var_opt};
use snafu::{ResultExt, ensure};
use tracing::{debug, warn};

use crate::{
    models::{price_point::PricePoint, request_params::HistoryRequest},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DecodeSnafu, EmptyHistorySnafu,
        InvalidSettingSnafu, InvalidUserAgentSnafu, ProviderError, ProviderInitError,
        ReqwestSnafu,
        yahoo_rest::{
            params::ChartParams,
            response::{ChartEnvelope, ChartResult},
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) price-forecast/0.1";

pub const ENV_BASE_URL: &str = "PRICE_FORECAST_YAHOO_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "PRICE_FORECAST_HTTP_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "PRICE_FORECAST_USER_AGENT";

/// Connection settings for [`YahooProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YahooConfig {
    /// Chart endpoint without the trailing symbol segment.
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl YahooConfig {
    /// Defaults overlaid with any `PRICE_FORECAST_*` environment overrides.
    ///
    /// Blank variables are ignored; a timeout that is not a positive integer
    /// number of seconds is an error.
    pub fn from_env() -> Result<Self, ProviderInitError> {
        let mut config = Self::default();

        if let Some(url) = get_env_var_opt(ENV_BASE_URL) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_env_var::<u64>(ENV_TIMEOUT_SECS).context(InvalidSettingSnafu)? {
            if secs == 0 {
                warn!(var = ENV_TIMEOUT_SECS, "zero timeout ignored, using default");
            } else {
                config.timeout = Duration::from_secs(secs);
            }
        }
        if let Some(agent) = get_env_var_opt(ENV_USER_AGENT) {
            config.user_agent = agent;
        }

        Ok(config)
    }
}

/// Daily history from the Yahoo Finance chart endpoint.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Builds a provider with its own HTTP client.
    pub fn new(config: YahooConfig) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent).context(InvalidUserAgentSnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/{}", self.base_url, ticker.trim())
    }
}

#[async_trait]
impl DataProvider for YahooProvider {
    async fn fetch_daily_history(
        &self,
        request: &HistoryRequest,
    ) -> Result<Vec<PricePoint>, ProviderError> {
        let params = ChartParams::daily(request)?;
        let url = self.chart_url(&request.ticker);
        debug!(%url, period1 = params.period1, period2 = params.period2, "requesting daily chart");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;

        if !status.is_success() {
            // Yahoo usually still sends a chart envelope describing the failure.
            let message = serde_json::from_str::<ChartEnvelope>(&body)
                .ok()
                .and_then(|env| env.chart.error)
                .map(|e| format!("{} ({}): {}", status, e.code, e.description))
                .unwrap_or_else(|| format!("{status} from chart endpoint"));
            return ApiSnafu { message }.fail();
        }

        let envelope: ChartEnvelope = serde_json::from_str(&body).context(DecodeSnafu)?;
        if let Some(err) = envelope.chart.error {
            return ApiSnafu {
                message: format!("{}: {}", err.code, err.description),
            }
            .fail();
        }

        let result: Option<ChartResult> = envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next());
        let points = result
            .map(|r| r.into_price_points(request))
            .unwrap_or_default();

        ensure!(
            !points.is_empty(),
            EmptyHistorySnafu {
                ticker: request.ticker.clone(),
                start: request.start,
                end: request.end,
            }
        );

        debug!(ticker = %request.ticker, rows = points.len(), "chart decoded");
        Ok(points)
    }
}
