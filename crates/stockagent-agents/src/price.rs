use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use stockagent_models::{MarketDataConfig, PriceQuote};
use tracing::{info, warn};

use crate::error::AnalysisError;
use crate::http::{HttpRequest, HttpTransport};

/// Source of the latest close price for a ticker. Mockable for testing.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_price(&self, ticker: &str) -> Result<PriceQuote, AnalysisError>;
}

/// Price provider backed by the Yahoo Finance chart API.
pub struct YahooPriceProvider {
    transport: Arc<dyn HttpTransport>,
    config: MarketDataConfig,
}

impl YahooPriceProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, config: MarketDataConfig) -> Self {
        Self { transport, config }
    }

    pub fn chart_url(&self, ticker: &str) -> String {
        format!(
            "{}/{}?range={}&interval={}",
            self.config.chart_url.trim_end_matches('/'),
            urlencoding::encode(ticker),
            urlencoding::encode(&self.config.range),
            urlencoding::encode(&self.config.interval),
        )
    }

    async fn request_quote(&self, ticker: &str) -> Result<PriceQuote, AnalysisError> {
        let request = HttpRequest::get(self.chart_url(ticker))
            .with_header("accept", "application/json")
            .with_header("referer", "https://finance.yahoo.com/");

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| AnalysisError::provider(ticker, format!("transport error: {e}")))?;

        // Unknown and delisted symbols come back as 404 with a chart error payload.
        if response.status == 404 {
            return match parse_chart(ticker, &response.body) {
                Err(AnalysisError::Provider { .. }) => {
                    Err(AnalysisError::DataUnavailable(ticker.to_string()))
                }
                other => other,
            };
        }

        if !response.is_success() {
            return Err(AnalysisError::provider(
                ticker,
                format!("yahoo returned status {}", response.status),
            ));
        }

        parse_chart(ticker, &response.body)
    }
}

#[async_trait]
impl PriceProvider for YahooPriceProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_price(&self, ticker: &str) -> Result<PriceQuote, AnalysisError> {
        match self.request_quote(ticker).await {
            Ok(quote) => {
                info!(ticker = %ticker, price = quote.price, as_of = ?quote.as_of, "Fetched close price");
                Ok(quote)
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Price fetch failed");
                Err(e)
            }
        }
    }
}

/// Extract the last close from a chart payload.
pub fn parse_chart(ticker: &str, body: &str) -> Result<PriceQuote, AnalysisError> {
    let chart: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::provider(ticker, format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = chart.chart.error {
        warn!(
            ticker = %ticker,
            code = error.code.as_deref().unwrap_or_default(),
            description = error.description.as_deref().unwrap_or_default(),
            "Yahoo chart error"
        );
        return Err(AnalysisError::DataUnavailable(ticker.to_string()));
    }

    let no_data = || AnalysisError::DataUnavailable(ticker.to_string());

    let result = chart
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(no_data)?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let last = *closes.last().ok_or_else(no_data)?;
    let price = match last {
        Some(price) if PriceQuote::is_valid_price(price) => price,
        other => {
            return Err(AnalysisError::InvalidPrice {
                ticker: ticker.to_string(),
                price: other,
            })
        }
    };

    let as_of = result
        .timestamp
        .as_ref()
        .and_then(|ts| ts.last())
        .and_then(|&secs| DateTime::<Utc>::from_timestamp(secs, 0));

    let quote = PriceQuote::new(ticker, price);
    Ok(match as_of {
        Some(as_of) => quote.with_as_of(as_of),
        None => quote,
    })
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: YahooChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
