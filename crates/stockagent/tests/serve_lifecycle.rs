//! Runs the real server on an ephemeral port and shuts it down via the token.

use std::sync::Arc;
use std::time::Duration;

use stockagent::agents::http::HttpRequest;
use stockagent::agents::test_support::{chart_body, chat_body, StubTransport};
use stockagent::agents::{HttpTransport, ReqwestTransport};
use stockagent::models::{AppConfig, Credentials};
use stockagent::{build_orchestrator_with, serve};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn serves_over_tcp_and_stops_on_cancel() {
    let orchestrator = build_orchestrator_with(
        &AppConfig::default(),
        Credentials::new("sk-or-tcp").unwrap(),
        Arc::new(StubTransport::ok(chart_body(&[Some(310.25)]))),
        Arc::new(StubTransport::ok(chat_body("Decision: BUY\nExplanation: ok."))),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(serve(listener, Arc::new(orchestrator), shutdown.clone()));

    let client = ReqwestTransport::new(Some(Duration::from_secs(5)));
    let response = client
        .execute(HttpRequest::get(format!("http://{addr}/stock?ticker=MSFT")))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["ticker"], "MSFT");
    assert_eq!(body["price"], 310.25);
    assert_eq!(body["recommendation"], "Decision: BUY\nExplanation: ok.");

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop after cancellation")
        .unwrap();
    assert!(result.is_ok());
}
