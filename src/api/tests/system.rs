use super::*;
use crate::types::{Event, TaskId};
use futures::StreamExt;

#[tokio::test]
async fn test_health_reports_service_state() {
    let (_hub, app) = create_test_app().await;

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["in_flight_tasks"], 0);
    assert_eq!(body["document_upload"], false);
}

#[tokio::test]
async fn test_openapi_endpoint_serves_spec() {
    let (_hub, app) = create_test_app().await;

    let response = get(&app, "/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["paths"]["/check-content-status"].is_object());
    assert!(body["paths"]["/study-pathway"].is_object());
}

#[tokio::test]
async fn test_sse_event_stream_forwards_hub_events() {
    let (hub, app) = create_test_app().await;

    let request = Request::builder()
        .uri("/events")
        .header("Accept", "text/event-stream")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).contains("text/event-stream"));

    // The stream subscribed when the handler ran, so this event is delivered
    hub.initiate(crate::hub::test_helpers::request("websites"))
        .await
        .unwrap();

    let mut body = response.into_body().into_data_stream();
    let mut received = String::new();
    while !received.contains("\n\n") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("SSE stream should yield an event")
            .unwrap()
            .unwrap();
        received.push_str(std::str::from_utf8(&chunk).unwrap());
    }

    assert!(received.contains("event: task_created"), "{received}");
    assert!(received.contains("\"kind\":\"websites\""), "{received}");
}

#[tokio::test]
async fn test_sse_event_names_match_event_variants() {
    let event = Event::TaskCompleted {
        task_id: TaskId::from("video_1"),
    };
    assert_eq!(event.name(), "task_completed");
    assert_eq!(Event::Shutdown.name(), "shutdown");
}
