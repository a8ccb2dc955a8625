use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::util::RetryPolicy;
use crate::core::currency::CurrencyRateProvider;

/// Reads exchange rates from the Yahoo Finance chart API.
pub struct YahooCurrencyProvider {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl YahooCurrencyProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fintrack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(YahooCurrencyProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug, Deserialize)]
struct YahooCurrencyResponse {
    chart: CurrencyChartResult,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartResult {
    result: Vec<CurrencyChartItem>,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartItem {
    meta: CurrencyChartMeta,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

#[async_trait]
impl CurrencyRateProvider for YahooCurrencyProvider {
    #[instrument(name = "YahooRateFetch", skip(self))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let symbol = format!("{from}{to}=X");
        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        debug!("Requesting currency rate from {}", url);

        let response = self
            .retry
            .run(|| self.client.get(&url).send())
            .await
            .map_err(|e| anyhow!("Request error: {} for currency pair: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;

        let data: YahooCurrencyResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}", symbol))?;

        let rate = item.meta.regular_market_price;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(anyhow!("Invalid rate {} for currency pair: {}", rate, symbol));
        }
        debug!(rate, "Received rate for {symbol}");
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(mock_server: &MockServer, symbol: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .respond_with(response)
            .mount(mock_server)
            .await;
    }

    fn provider(mock_server: &MockServer) -> YahooCurrencyProvider {
        YahooCurrencyProvider::new(&mock_server.uri())
            .unwrap()
            .with_retry(RetryPolicy::none())
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_server = MockServer::start().await;
        let mock_response = r#"{
            "chart": {
                "result": [
                    {
                        "meta": {
                            "regularMarketPrice": 36.125
                        }
                    }
                ]
            }
        }"#;
        mount(
            &mock_server,
            "USDTHB=X",
            ResponseTemplate::new(200).set_body_string(mock_response),
        )
        .await;

        let rate = provider(&mock_server)
            .get_rate("USD", "THB")
            .await
            .expect("Failed to get rate");
        assert_eq!(rate, 36.125);
    }

    #[tokio::test]
    async fn test_no_currency_rate_found() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "USDTHB=X",
            ResponseTemplate::new(200).set_body_string(r#"{"chart": {"result": []}}"#),
        )
        .await;

        let result = provider(&mock_server).get_rate("USD", "THB").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rate data found for currency pair: USDTHB=X"
        );
    }

    #[tokio::test]
    async fn test_yahoo_currency_api_error_response() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "EURTHB=X", ResponseTemplate::new(500)).await;

        let result = provider(&mock_server).get_rate("EUR", "THB").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for currency pair: EURTHB=X"
        );
    }

    #[tokio::test]
    async fn test_yahoo_currency_api_malformed_response() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "JPYTHB=X",
            ResponseTemplate::new(200).set_body_string(r#"{"chart": {"results": []}}"#),
        )
        .await;

        let result = provider(&mock_server).get_rate("JPY", "THB").await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for JPYTHB=X")
        );
    }

    #[tokio::test]
    async fn test_non_positive_rate_rejected() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "USDTHB=X",
            ResponseTemplate::new(200)
                .set_body_string(r#"{"chart": {"result": [{"meta": {"regularMarketPrice": 0.0}}]}}"#),
        )
        .await;

        let result = provider(&mock_server).get_rate("USD", "THB").await;
        assert!(result.unwrap_err().to_string().starts_with("Invalid rate"));
    }
}
