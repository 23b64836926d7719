use serde::{Deserialize, Serialize};

use crate::quote::PriceQuote;

/// Terminal artifact of one analysis: the quote plus the model's free-text answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub ticker: String,
    pub price: f64,
    /// Raw model output, trimmed. Expected (not enforced) to read
    /// `Decision: ...` followed by `Explanation: ...`.
    pub recommendation: String,
}

impl RecommendationResult {
    pub fn from_quote(quote: PriceQuote, recommendation: String) -> Self {
        Self {
            ticker: quote.ticker,
            price: quote.price,
            recommendation,
        }
    }
}
