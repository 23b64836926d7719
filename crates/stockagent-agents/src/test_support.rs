//! Test doubles for the provider seams.
//!
//! `StubTransport` replays canned HTTP responses and records every request so
//! tests can assert on what would have gone over the wire. The mock agents
//! stand in for whole providers when only the orchestration matters.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use stockagent_models::PriceQuote;

use crate::error::AnalysisError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::price::PriceProvider;
use crate::recommender::Recommender;

/// Transport that answers from a queue of canned results.
///
/// The last queued result is replayed for every further request.
pub struct StubTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(vec![Ok(HttpResponse::ok_json(body))])
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::new(vec![Ok(HttpResponse::new(status, body))])
    }

    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(TransportError::new(message))])
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.recorded_requests().len()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| TransportError::new("stub transport poisoned"))?;
        if responses.len() > 1 {
            responses
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::new("no stubbed response")))
        } else {
            responses
                .front()
                .cloned()
                .unwrap_or_else(|| Err(TransportError::new("no stubbed response")))
        }
    }
}

/// Yahoo chart payload with the given close series and matching timestamps.
pub fn chart_body(closes: &[Option<f64>]) -> String {
    let timestamps: Vec<i64> = (0..closes.len() as i64)
        .map(|i| 1_742_047_200 + i * 86_400)
        .collect();
    serde_json::json!({
        "chart": {
            "result": [{
                "meta": {"currency": "USD"},
                "timestamp": timestamps,
                "indicators": {"quote": [{"close": closes}]}
            }],
            "error": null
        }
    })
    .to_string()
}

/// Chat-completion payload whose first choice carries `content`.
pub fn chat_body(content: &str) -> String {
    serde_json::json!({
        "id": "gen-test",
        "model": "deepseek/deepseek-chat-v3-0324:free",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": {"role": "assistant", "content": content}
        }]
    })
    .to_string()
}

type PriceFailure = Box<dyn Fn(&str) -> AnalysisError + Send + Sync>;

/// Price provider returning a fixed price (or a fixed failure) for any ticker.
pub struct MockPriceProvider {
    price: f64,
    failure: Option<PriceFailure>,
    calls: Mutex<Vec<String>>,
}

impl MockPriceProvider {
    pub fn returning(price: f64) -> Self {
        Self {
            price,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with<F>(failure: F) -> Self
    where
        F: Fn(&str) -> AnalysisError + Send + Sync + 'static,
    {
        Self {
            price: 0.0,
            failure: Some(Box::new(failure)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_price(&self, ticker: &str) -> Result<PriceQuote, AnalysisError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(ticker.to_string());
        }
        match &self.failure {
            Some(failure) => Err(failure(ticker)),
            None => Ok(PriceQuote::new(ticker, self.price)),
        }
    }
}

type RecommendationFailure = Box<dyn Fn() -> AnalysisError + Send + Sync>;

/// Recommender returning fixed text (or a fixed failure) and recording its inputs.
pub struct MockRecommender {
    text: String,
    failure: Option<RecommendationFailure>,
    calls: Mutex<Vec<(String, f64)>>,
}

impl MockRecommender {
    pub fn returning(text: &str) -> Self {
        Self {
            text: text.to_string(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with<F>(failure: F) -> Self
    where
        F: Fn() -> AnalysisError + Send + Sync + 'static,
    {
        Self {
            text: String::new(),
            failure: Some(Box::new(failure)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, f64)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Recommender for MockRecommender {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_recommendation(&self, ticker: &str, price: f64) -> Result<String, AnalysisError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((ticker.to_string(), price));
        }
        match &self.failure {
            Some(failure) => Err(failure()),
            None => Ok(self.text.clone()),
        }
    }
}
