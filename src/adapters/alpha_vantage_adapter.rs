//! Alpha Vantage price adapter.
//!
//! Uses the `TIME_SERIES_DAILY` endpoint and reports the close of the most
//! recent trading day in the series. Free-tier keys are limited to a handful
//! of calls per minute, which the provider signals with a `Note` or
//! `Information` body rather than an HTTP error.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::domain::error::StockfolioError;
use crate::domain::price_fanout::DEFAULT_LOOKUP_TIMEOUT;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: String,
}

pub struct AlphaVantageAdapter {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageAdapter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StockfolioError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StockfolioError::PriceProvider {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockfolioError> {
        let api_key = config.require_string("provider", "api_key")?;
        let base_url = config
            .get_string("provider", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_ms = config.get_int(
            "provider",
            "timeout_ms",
            DEFAULT_LOOKUP_TIMEOUT.as_millis() as i64,
        );
        Self::new(base_url, api_key, Duration::from_millis(timeout_ms.max(1) as u64))
    }
}

/// Extract the latest close from a `TIME_SERIES_DAILY` body.
///
/// An `Error Message` (the provider's answer for an unknown symbol) or an
/// empty series is `Ok(None)`. Rate-limit notices are errors so callers do
/// not mistake them for an unknown symbol.
pub fn parse_latest_close(body: &str) -> Result<Option<Decimal>, StockfolioError> {
    let response: TimeSeriesResponse =
        serde_json::from_str(body).map_err(|e| StockfolioError::PriceProvider {
            reason: format!("unexpected response body: {e}"),
        })?;

    if let Some(message) = response.note.or(response.information) {
        return Err(StockfolioError::PriceProvider { reason: message });
    }
    if let Some(message) = response.error_message {
        debug!(%message, "provider rejected symbol");
        return Ok(None);
    }

    let Some(series) = response.time_series else {
        return Ok(None);
    };
    let Some((date, bar)) = series.iter().max_by(|a, b| a.0.cmp(b.0)) else {
        return Ok(None);
    };

    Decimal::from_str(bar.close.trim())
        .map(Some)
        .map_err(|e| StockfolioError::PriceProvider {
            reason: format!("invalid close '{}' for {date}: {e}", bar.close),
        })
}

#[async_trait]
impl PricePort for AlphaVantageAdapter {
    async fn latest_close(&self, symbol: &str) -> Result<Option<Decimal>, StockfolioError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StockfolioError::PriceProvider {
                reason: format!("request for {symbol} failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StockfolioError::PriceProvider {
                reason: format!("request for {symbol} failed: HTTP {status}"),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| StockfolioError::PriceProvider {
                reason: format!("reading response for {symbol} failed: {e}"),
            })?;

        parse_latest_close(&body)
    }

    fn name(&self) -> &'static str {
        "alphavantage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn picks_most_recent_close() {
        let body = r#"{
            "Meta Data": {"2. Symbol": "MSFT"},
            "Time Series (Daily)": {
                "2024-04-25": {"1. open": "394.03", "2. high": "399.89", "3. low": "388.03", "4. close": "399.04", "5. volume": "40586466"},
                "2024-04-26": {"1. open": "412.17", "2. high": "413.00", "3. low": "405.76", "4. close": "406.32", "5. volume": "29694714"},
                "2024-04-24": {"1. open": "409.56", "2. high": "412.47", "3. low": "406.78", "4. close": "409.06", "5. volume": "15065327"}
            }
        }"#;
        assert_eq!(parse_latest_close(body).unwrap(), Some(dec!(406.32)));
    }

    #[test]
    fn error_message_means_no_data() {
        let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation for TIME_SERIES_DAILY."}"#;
        assert_eq!(parse_latest_close(body).unwrap(), None);
    }

    #[test]
    fn empty_series_means_no_data() {
        let body = r#"{"Time Series (Daily)": {}}"#;
        assert_eq!(parse_latest_close(body).unwrap(), None);
    }

    #[test]
    fn rate_limit_note_is_an_error() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        assert!(matches!(
            parse_latest_close(body),
            Err(StockfolioError::PriceProvider { .. })
        ));
    }

    #[test]
    fn information_notice_is_an_error() {
        let body = r#"{"Information": "The **demo** API key is for demo purposes only."}"#;
        assert!(parse_latest_close(body).is_err());
    }

    #[test]
    fn garbage_body_is_an_error() {
        assert!(parse_latest_close("<html>gateway timeout</html>").is_err());
    }

    #[test]
    fn from_config_requires_api_key() {
        use crate::adapters::file_config_adapter::FileConfigAdapter;
        let config = FileConfigAdapter::from_string("[provider]\nkind = alphavantage\n").unwrap();
        assert!(matches!(
            AlphaVantageAdapter::from_config(&config),
            Err(StockfolioError::ConfigMissing { .. })
        ));
    }
}
