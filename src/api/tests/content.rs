use super::*;
use crate::providers::BookVolume;
use crate::types::Event;
use std::net::SocketAddr;
use tokio::sync::Semaphore;

const AI_QUESTIONS_URI: &str = "/initiate-content-generation?topic=Photosynthesis&grade=Middle%20School&type=ai-questions&stage=Stage%201%3A%20Basics";

async fn poll_until_completed(app: &Router, task_id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let response = get(app, &format!("/check-content-status?taskId={task_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        if body["status"] == "completed" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("task {task_id} never completed");
}

#[tokio::test]
async fn test_initiate_returns_task_id_then_status_goes_pending_to_completed() {
    let gate = Arc::new(Semaphore::new(0));
    let text = Arc::new(StubText::replying("<li>What is chlorophyll?</li>").gated(gate.clone()));
    let (_hub, app) = app_with(
        Config::default(),
        providers(text, Arc::new(StubVideos::empty()), Arc::new(StubBooks::empty())),
        None,
    )
    .await;

    let response = get(&app, AI_QUESTIONS_URI).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let task_id = body["taskId"].as_str().unwrap().to_string();
    assert!(task_id.starts_with("ai-questions_"), "{task_id}");

    let response = get(&app, &format!("/check-content-status?taskId={task_id}")).await;
    assert_eq!(body_json(response).await, serde_json::json!({ "status": "pending" }));

    gate.add_permits(1);
    let body = poll_until_completed(&app, &task_id).await;
    let content = body["content"].as_str().unwrap();
    assert!(content.starts_with("<div class=\"content-wrapper\">"), "{content}");
    assert!(content.contains("What is chlorophyll?"));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_identical_initiations_get_distinct_ids() {
    let (_hub, app) = create_test_app().await;

    let first = body_json(get(&app, AI_QUESTIONS_URI).await).await;
    let second = body_json(get(&app, AI_QUESTIONS_URI).await).await;

    assert_ne!(first["taskId"], second["taskId"]);
}

#[tokio::test]
async fn test_initiate_with_missing_parameters_is_rejected_without_task() {
    let (hub, app) = create_test_app().await;
    let mut events = hub.subscribe();

    let response = get(
        &app,
        "/initiate-content-generation?topic=Photosynthesis&type=video",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid_request");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("grade") && message.contains("stage"), "{message}");

    assert!(events.try_recv().is_err(), "no task should have been created");
    assert_eq!(hub.in_flight_tasks(), 0);
}

#[tokio::test]
async fn test_status_requires_task_id() {
    let (_hub, app) = create_test_app().await;

    for uri in ["/check-content-status", "/check-content-status?taskId=%20"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["error"]["code"], "invalid_request");
    }
}

#[tokio::test]
async fn test_status_of_unknown_task_is_not_found() {
    let (_hub, app) = create_test_app().await;

    let response = get(&app, "/check-content-status?taskId=video_1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_books_provider_failure_completes_with_apology_and_error() {
    let (hub, app) = app_with(
        Config::default(),
        providers(
            Arc::new(StubText::replying("Books help.")),
            Arc::new(StubVideos::empty()),
            Arc::new(StubBooks::failing(500)),
        ),
        None,
    )
    .await;
    let mut events = hub.subscribe();

    let body = body_json(
        get(
            &app,
            "/initiate-content-generation?topic=Cells&grade=High%20School&type=books&stage=Stage%202%3A%20Mitosis",
        )
        .await,
    )
    .await;
    let task_id = body["taskId"].as_str().unwrap().to_string();

    let body = poll_until_completed(&app, &task_id).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(
        body["content"],
        "<div class=\"content-wrapper\"><p>Error generating books content. Please try again.</p></div>"
    );
    assert_eq!(body["error"]["code"], "provider_status");

    assert!(matches!(events.recv().await.unwrap(), Event::TaskCreated { .. }));
    assert!(matches!(events.recv().await.unwrap(), Event::TaskFailed { .. }));
}

#[tokio::test]
async fn test_generate_content_returns_html_directly() {
    let (_hub, app) = create_test_app().await;

    let response = get(
        &app,
        "/generate-content?topic=Fractions&grade=Elementary&type=websites&stage=Stage%201%3A%20Halves",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("text/html"));

    let html = body_text(response).await;
    assert!(html.starts_with("<div class=\"content-wrapper\">"));
    assert!(html.contains("Khan Academy"));
}

#[tokio::test]
async fn test_generate_content_provider_failure_returns_apology_html() {
    let (_hub, app) = app_with(
        Config::default(),
        providers(
            Arc::new(StubText::replying("intro")),
            Arc::new(StubVideos::failing(403)),
            Arc::new(StubBooks::replying(vec![BookVolume {
                title: "unused".into(),
                info_link: None,
                authors: Vec::new(),
            }])),
        ),
        None,
    )
    .await;

    let response = get(
        &app,
        "/generate-content?topic=Cells&grade=High%20School&type=video&stage=Stage%201%3A%20Basics",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(content_type(&response).starts_with("text/html"));
    assert!(
        body_text(response)
            .await
            .contains("Error generating video content. Please try again.")
    );
}

#[tokio::test]
async fn test_generation_routes_are_rate_limited_but_status_is_not() {
    let mut config = Config::default();
    config.server.api.rate_limit.enabled = true;
    config.server.api.rate_limit.requests_per_minute = 1;
    config.server.api.rate_limit.burst_size = 1;
    config.server.api.rate_limit.exempt_ips = Vec::new();
    let (_hub, app) = app_with(config, stub_providers(), None).await;

    let client: SocketAddr = "10.20.30.40:5555".parse().unwrap();
    let send = |uri: &'static str| {
        let app = app.clone();
        async move {
            let request = Request::builder()
                .uri(uri)
                .extension(ConnectInfo(client))
                .body(Body::empty())
                .unwrap();
            app.oneshot(request).await.unwrap()
        }
    };

    let uri = "/generate-content?topic=Cells&grade=High%20School&type=websites&stage=Stage%201";
    assert_eq!(send(uri).await.status(), StatusCode::OK);

    let limited = send(uri).await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(limited).await["error"]["code"], "rate_limited");

    for _ in 0..5 {
        let response = send("/check-content-status?taskId=websites_1").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
