use super::*;
use crate::hub::test_helpers::{
    StubAnalyzer, StubBooks, StubText, StubVideos, create_test_hub, create_test_hub_with,
    providers, stub_providers,
};
use axum::body::Body;
use axum::extract::{ConnectInfo, Request};
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;

mod content;
mod system;

/// Router over a hub with stub providers
async fn create_test_app() -> (Arc<StudyHub>, Router) {
    let hub = create_test_hub().await;
    let app = create_router(hub.clone(), hub.get_config());
    (hub, app)
}

async fn app_with(
    config: Config,
    providers: crate::providers::Providers,
    analyzer: Option<Arc<dyn crate::providers::DocumentAnalyzer>>,
) -> (Arc<StudyHub>, Router) {
    let hub = create_test_hub_with(config, providers, analyzer).await;
    let app = create_router(hub.clone(), hub.get_config());
    (hub, app)
}

async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn content_type(response: &Response) -> String {
    response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[tokio::test]
async fn test_api_server_serves_on_ephemeral_port_and_stops_on_shutdown() {
    let hub = create_test_hub().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let token = CancellationToken::new();

    let server = tokio::spawn(serve(listener, hub.clone(), hub.get_config(), token.clone()));

    let body: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");

    token.cancel();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after cancellation")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_cors_enabled() {
    let hub = create_test_hub().await;
    let mut config = (*hub.get_config()).clone();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(hub, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_specific_origins() {
    let hub = create_test_hub().await;
    let mut config = (*hub.get_config()).clone();
    config.server.api.cors_origins = vec!["http://study.example".to_string()];
    let app = create_router(hub, Arc::new(config));

    let allowed = Request::builder()
        .uri("/health")
        .header("Origin", "http://study.example")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://study.example"
    );

    let other = Request::builder()
        .uri("/health")
        .header("Origin", "http://elsewhere.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(other).await.unwrap();
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let hub = create_test_hub().await;
    let mut config = (*hub.get_config()).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(hub, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_swagger_ui_can_be_disabled() {
    let (hub, app) = create_test_app().await;
    let response = get(&app, "/swagger-ui/").await;
    assert_ne!(response.status(), StatusCode::NOT_FOUND);

    let mut config = (*hub.get_config()).clone();
    config.server.api.swagger_ui = false;
    let app = create_router(hub, Arc::new(config));
    let response = get(&app, "/swagger-ui/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
