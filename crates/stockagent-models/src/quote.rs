use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest close for a ticker, as returned by the price provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    /// Ticker exactly as the caller supplied it.
    pub ticker: String,
    /// Last close. Always finite and strictly positive once constructed by a provider.
    pub price: f64,
    /// Session timestamp of the close, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<DateTime<Utc>>,
}

impl PriceQuote {
    pub fn new(ticker: impl Into<String>, price: f64) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            as_of: None,
        }
    }

    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// A price can be sent for a recommendation only if it is finite and above zero.
    pub fn is_valid_price(price: f64) -> bool {
        price.is_finite() && price > 0.0
    }
}
