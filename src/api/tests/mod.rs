use super::*;
use crate::Config;
use crate::client::test_helpers::{
    ADD_URL_PATH, FakeTransport, LOGIN_PATH, MAGNET, create_test_client, test_config,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;


/// Router over a fake-transport client holding `config`
fn test_app(config: Config) -> (Router, Arc<NasClient>, Arc<FakeTransport>) {
    let api = Arc::new(config.api.clone());
    let (client, transport) = create_test_client(config);
    let client = Arc::new(client);
    (create_router(client.clone(), api), client, transport)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn api_server_binds_and_serves() {
    let mut config = test_config();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let (_app, client, _transport) = test_app(config.clone());

    let handle = tokio::spawn(start_api_server(client, Arc::new(config.api)));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!handle.is_finished(), "server exited early");
    handle.abort();
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let (app, _client, _transport) = test_app(test_config());

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "chrome-extension://abcdef")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn cors_restricted_to_listed_origins() {
    let mut config = test_config();
    config.api.cors_origins = vec!["chrome-extension://abcdef".to_string()];
    let (app, _client, _transport) = test_app(config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "chrome-extension://abcdef")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("chrome-extension://abcdef")
    );
}

#[tokio::test]
async fn cors_disabled_sends_no_headers() {
    let mut config = test_config();
    config.api.cors_enabled = false;
    let (app, _client, _transport) = test_app(config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "chrome-extension://abcdef")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn api_key_guards_everything_but_health() {
    let mut config = test_config();
    config.api.api_key = Some("extension-key".to_string());
    let (app, _client, transport) = test_app(config);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/submit",
            json!({ "magnet_uri": MAGNET, "directory_index": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(transport.requests().is_empty());

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn swagger_ui_only_when_enabled() {
    let (app, _client, _transport) = test_app(test_config());
    let response = app.oneshot(get_request("/swagger-ui/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let mut config = test_config();
    config.api.swagger_ui = true;
    let (app, _client, _transport) = test_app(config);
    let response = app.oneshot(get_request("/swagger-ui/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
