use std::sync::Arc;
use std::time::Instant;

use stockagent_models::RecommendationResult;
use tracing::info;

use crate::error::AnalysisError;
use crate::price::PriceProvider;
use crate::recommender::Recommender;

/// Runs the two-stage pipeline: price fetch, then recommendation.
///
/// Stages are sequential and fail-fast. The orchestrator holds no mutable
/// state, so one instance is shared across all requests.
pub struct Orchestrator {
    prices: Arc<dyn PriceProvider>,
    recommender: Arc<dyn Recommender>,
}

impl Orchestrator {
    pub fn new(prices: Arc<dyn PriceProvider>, recommender: Arc<dyn Recommender>) -> Self {
        Self {
            prices,
            recommender,
        }
    }

    pub async fn analyze(&self, ticker: &str) -> Result<RecommendationResult, AnalysisError> {
        let start = Instant::now();
        info!(
            ticker = %ticker,
            price_provider = self.prices.name(),
            recommender = self.recommender.name(),
            "Starting analysis"
        );

        let quote = self.prices.fetch_price(ticker).await?;
        let recommendation = self
            .recommender
            .get_recommendation(&quote.ticker, quote.price)
            .await?;

        let result = RecommendationResult::from_quote(quote, recommendation);
        info!(
            ticker = %ticker,
            price = result.price,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockPriceProvider, MockRecommender};

    #[tokio::test]
    async fn assembles_result_from_both_stages() {
        let prices = Arc::new(MockPriceProvider::returning(120.50));
        let recommender = Arc::new(MockRecommender::returning(
            "Decision: BUY\nExplanation: strong momentum.",
        ));
        let orchestrator = Orchestrator::new(prices.clone(), recommender.clone());

        let result = orchestrator.analyze("NVDA").await.unwrap();
        assert_eq!(result.ticker, "NVDA");
        assert_eq!(result.price, 120.50);
        assert_eq!(result.recommendation, "Decision: BUY\nExplanation: strong momentum.");

        assert_eq!(prices.calls(), vec!["NVDA".to_string()]);
        assert_eq!(recommender.calls(), vec![("NVDA".to_string(), 120.50)]);
    }

    #[tokio::test]
    async fn price_failure_skips_recommendation() {
        let prices = Arc::new(MockPriceProvider::failing_with(|t| {
            AnalysisError::DataUnavailable(t.to_string())
        }));
        let recommender = Arc::new(MockRecommender::returning("unused"));
        let orchestrator = Orchestrator::new(prices, recommender.clone());

        let err = orchestrator.analyze("GONE").await.unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable(ref t) if t == "GONE"));
        assert!(recommender.calls().is_empty());
    }

    #[tokio::test]
    async fn recommendation_failure_propagates_unchanged() {
        let prices = Arc::new(MockPriceProvider::returning(50.0));
        let recommender = Arc::new(MockRecommender::failing_with(|| AnalysisError::Upstream {
            status: 502,
            body: "bad gateway".to_string(),
        }));
        let orchestrator = Orchestrator::new(prices, recommender);

        let err = orchestrator.analyze("AAPL").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Upstream { status: 502, .. }));
    }

    #[tokio::test]
    async fn ticker_case_is_preserved_end_to_end() {
        let prices = Arc::new(MockPriceProvider::returning(10.0));
        let recommender = Arc::new(MockRecommender::returning("ok"));
        let orchestrator = Orchestrator::new(prices, recommender.clone());

        let result = orchestrator.analyze("nvda").await.unwrap();
        assert_eq!(result.ticker, "nvda");
        assert_eq!(recommender.calls()[0].0, "nvda");
    }
}
