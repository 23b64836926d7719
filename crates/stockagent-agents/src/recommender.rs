use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stockagent_models::{Credentials, RecommendationConfig};
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::http::{HttpRequest, HttpTransport};
use crate::prompts::{analysis_user_prompt, ANALYST_SYSTEM_PROMPT};

/// Returned when the provider answers 2xx but without `choices[0].message.content`.
pub const FALLBACK_RECOMMENDATION: &str = "No recommendation provided.";

/// Produces a free-text recommendation for a ticker at a price. Mockable for testing.
#[async_trait]
pub trait Recommender: Send + Sync {
    fn name(&self) -> &str;

    /// `price` must already be validated as positive by the caller.
    async fn get_recommendation(&self, ticker: &str, price: f64) -> Result<String, AnalysisError>;
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Two-message conversation asking the analyst persona about `ticker` at `price`.
pub fn build_chat_request(model: &str, ticker: &str, price: f64) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(ANALYST_SYSTEM_PROMPT),
            ChatMessage::user(analysis_user_prompt(ticker, price)),
        ],
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the first choice's content out of a chat-completion body.
///
/// Returns `Ok(None)` when the body is JSON but the expected path is missing,
/// and an error only when the body is not a JSON object at all.
pub fn extract_content(body: &str) -> Result<Option<String>, AnalysisError> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| AnalysisError::MalformedResponse(format!("invalid JSON body: {e}")))?;

    Ok(response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string()))
}

/// Recommender backed by an OpenRouter (OpenAI-compatible) chat-completion endpoint.
pub struct OpenRouterRecommender {
    transport: Arc<dyn HttpTransport>,
    credentials: Credentials,
    config: RecommendationConfig,
}

impl OpenRouterRecommender {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        credentials: Credentials,
        config: RecommendationConfig,
    ) -> Self {
        Self {
            transport,
            credentials,
            config,
        }
    }
}

#[async_trait]
impl Recommender for OpenRouterRecommender {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn get_recommendation(&self, ticker: &str, price: f64) -> Result<String, AnalysisError> {
        let payload = build_chat_request(&self.config.model, ticker, price);
        let body = serde_json::to_string(&payload)
            .map_err(|e| AnalysisError::MalformedResponse(format!("request encoding: {e}")))?;

        debug!(ticker = %ticker, model = %self.config.model, "Requesting recommendation");

        let request = HttpRequest::post(&self.config.endpoint)
            .with_bearer(self.credentials.api_key())
            .with_json_body(body);

        let response = self.transport.execute(request).await.map_err(|e| {
            warn!(ticker = %ticker, error = %e, "Recommendation transport failed");
            AnalysisError::Transport(e.to_string())
        })?;

        if !response.is_success() {
            warn!(
                ticker = %ticker,
                status = response.status,
                body = %response.body,
                "Recommendation provider returned an error"
            );
            return Err(AnalysisError::Upstream {
                status: response.status,
                body: response.body,
            });
        }

        match extract_content(&response.body)? {
            Some(content) => Ok(content),
            None if self.config.strict_response => {
                warn!(ticker = %ticker, body = %response.body, "Recommendation response missing content");
                Err(AnalysisError::MalformedResponse(
                    "missing choices[0].message.content".to_string(),
                ))
            }
            None => {
                warn!(ticker = %ticker, "Recommendation response missing content, using fallback");
                Ok(FALLBACK_RECOMMENDATION.to_string())
            }
        }
    }
}
