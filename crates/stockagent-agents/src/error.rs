use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No historical data found for ticker: {0}")]
    DataUnavailable(String),

    #[error("Invalid stock price retrieved for {ticker}: {price:?}")]
    InvalidPrice { ticker: String, price: Option<f64> },

    #[error("Price provider error for {ticker}: {message}")]
    Provider { ticker: String, message: String },

    #[error("Recommendation provider returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Recommendation transport error: {0}")]
    Transport(String),

    #[error("Malformed recommendation response: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    pub(crate) fn provider(ticker: &str, message: impl Into<String>) -> Self {
        Self::Provider {
            ticker: ticker.to_string(),
            message: message.into(),
        }
    }
}
