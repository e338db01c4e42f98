// Webhook endpoint tests driven through the router directly, no listener.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use mentra_echo::{AppServer, Config, EchoHandler};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_server() -> AppServer {
    let config = Config::from_lookup(|key| match key {
        "PACKAGE_NAME" => Some("com.example.echo".to_string()),
        "MENTRAOS_API_KEY" => Some("test-key".to_string()),
        _ => None,
    })
    .unwrap();

    AppServer::new(config, Arc::new(EchoHandler))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[test]
fn test_default_stack_has_exactly_one_logging_layer() {
    let server = test_server();
    assert_eq!(server.state().interceptors.len(), 1);
}

#[tokio::test]
async fn test_health_reports_package_and_sessions() {
    let server = test_server();
    let router = mentra_echo::create_router(server.state().clone());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["package_name"], "com.example.echo");
    assert_eq!(body["active_sessions"], 0);
}

#[tokio::test]
async fn test_webhook_without_websocket_url_is_rejected() {
    let server = test_server();
    let router = mentra_echo::create_router(server.state().clone());

    let response = router
        .oneshot(json_request(
            "/webhook",
            json!({"userId": "user@example.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("websocketUrl"));
}

#[tokio::test]
async fn test_stop_request_for_unknown_session_is_ok() {
    let server = test_server();
    let router = mentra_echo::create_router(server.state().clone());

    let response = router
        .oneshot(json_request(
            "/webhook",
            json!({
                "type": "stop_request",
                "sessionId": "never-started",
                "userId": "u",
                "reason": "user_disabled"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_webhook_for_session_mid_bootstrap_is_a_noop() {
    let server = test_server();
    let router = mentra_echo::create_router(server.state().clone());

    // Another webhook for this id is still connecting; ours must not race it
    server
        .state()
        .pending
        .lock()
        .await
        .insert("sess-racing".to_string());

    let response = router
        .oneshot(json_request(
            "/webhook",
            json!({
                "sessionId": "sess-racing",
                "userId": "u",
                "augmentOSWebsocketUrl": "ws://127.0.0.1:9/app-ws"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(server.active_sessions().await, 0);
    // The reservation belongs to the in-flight webhook; it stays put
    assert!(server.state().pending.lock().await.contains("sess-racing"));
}

#[tokio::test]
async fn test_failed_bootstrap_releases_session_reservation() {
    let server = test_server();
    let router = mentra_echo::create_router(server.state().clone());

    let request = json!({
        "sessionId": "sess-retry",
        "userId": "u",
        "augmentOSWebsocketUrl": "ws://127.0.0.1:9/app-ws"
    });

    let response = router
        .clone()
        .oneshot(json_request("/webhook", request.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // A retry for the same id reaches the connect again instead of being
    // treated as a duplicate
    let response = router
        .oneshot(json_request("/webhook", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(server.state().pending.lock().await.is_empty());
}

#[tokio::test]
async fn test_webhook_with_unreachable_cloud_reports_error() {
    let server = test_server();
    let router = mentra_echo::create_router(server.state().clone());

    // Nothing listens here; the connect fails and the webhook surfaces it
    let response = router
        .oneshot(json_request(
            "/webhook",
            json!({
                "userId": "u",
                "augmentOSWebsocketUrl": "ws://127.0.0.1:9/app-ws"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(server.active_sessions().await, 0);
}
