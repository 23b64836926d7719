use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use stockagent_agents::Orchestrator;
use stockagent_models::RecommendationResult;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::lifespan::Lifespan;
use crate::SERVICE_NAME;

/// Body `detail` for every failed analysis. Never carries internal error text.
pub const GENERIC_ERROR_DETAIL: &str = "Error generating recommendation.";
pub const MISSING_TICKER_DETAIL: &str = "Missing required query parameter: ticker";
pub const MALFORMED_QUERY_DETAIL: &str = "Malformed query string";

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
}

/// Last `ticker` value, so `?ticker=A&ticker=B` resolves to `B`.
fn ticker_param(pairs: Vec<(String, String)>) -> Option<String> {
    pairs
        .into_iter()
        .filter(|(key, _)| key == "ticker")
        .map(|(_, value)| value)
        .last()
        .filter(|ticker| !ticker.is_empty())
}

/// Caller-visible failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    MissingTicker,
    MalformedQuery,
    Analysis,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::MissingTicker => (StatusCode::UNPROCESSABLE_ENTITY, MISSING_TICKER_DETAIL),
            Self::MalformedQuery => (StatusCode::UNPROCESSABLE_ENTITY, MALFORMED_QUERY_DETAIL),
            Self::Analysis => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR_DETAIL),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/stock", get(get_stock))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { orchestrator })
}

/// Fetch the latest price for `ticker` and return the model's recommendation.
async fn get_stock(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<RecommendationResult>, ApiError> {
    let request_id = Uuid::new_v4();

    let ticker = match query.map(|Query(pairs)| ticker_param(pairs)) {
        Ok(Some(ticker)) => ticker,
        Ok(None) => {
            warn!(%request_id, "Rejected request without ticker");
            return Err(ApiError::MissingTicker);
        }
        Err(rejection) => {
            warn!(%request_id, error = %rejection, "Rejected malformed query");
            return Err(ApiError::MalformedQuery);
        }
    };

    let span = info_span!("stock_request", %request_id, ticker = %ticker);
    async move {
        info!("Received request for ticker: {ticker}");
        match state.orchestrator.analyze(&ticker).await {
            Ok(result) => {
                info!(response = ?result, "Response");
                Ok(Json(result))
            }
            Err(e) => {
                error!(error = %e, "Error processing request for ticker: {ticker}");
                Err(ApiError::Analysis)
            }
        }
    }
    .instrument(span)
    .await
}

/// Serve the router on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    orchestrator: Arc<Orchestrator>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let _lifespan = Lifespan::start(SERVICE_NAME);

    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Listening");
    }

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server error")
}
