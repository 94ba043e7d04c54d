mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::{answer_turn, tool_call_turn, ScriptedBackend, TOKYO_ITINERARY};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use trip_planner_rs::{
    error::Result,
    server::{router, AppState},
    services::AssistantTurn,
    ItineraryPlanner, PlannerError,
};

fn app(turns: Vec<Result<AssistantTurn>>) -> Router {
    let backend = Arc::new(ScriptedBackend::new(turns));
    router(AppState::new(ItineraryPlanner::new(backend, None)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    json_of(&body)["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app(vec![]);
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_new_session_snapshot() {
    let app = app(vec![]);
    let id = new_session(&app).await;

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let snapshot = json_of(&body);
    assert_eq!(snapshot["destination"], "");
    assert_eq!(snapshot["day_count"], 7);
    assert!(snapshot["itinerary"].is_null());
}

#[tokio::test]
async fn test_generate_then_download_calendar() {
    let app = app(vec![
        tool_call_turn("call_1", "web_search", r#"{"query": "Tokyo"}"#),
        answer_turn(TOKYO_ITINERARY),
    ]);
    let id = new_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/itinerary"),
        Some(json!({ "destination": "Tokyo", "days": 3, "interests": "temples" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let generated = json_of(&body);
    assert_eq!(generated["destination"], "Tokyo");
    assert_eq!(generated["days"], 3);
    assert_eq!(generated["itinerary"], TOKYO_ITINERARY);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/sessions/{id}/calendar?start=2025-04-01"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/calendar; charset=utf-8"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment; filename=\"Tokyo_travel_itinerary.ics\""));

    let ics = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let ics = String::from_utf8(ics.to_vec()).unwrap();
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);
    assert!(ics.contains("DTSTART;VALUE=DATE:20250401"));
    assert!(ics.contains("DTSTART;VALUE=DATE:20250403"));
}

#[tokio::test]
async fn test_validation_errors_are_bad_requests() {
    let app = app(vec![]);
    let id = new_session(&app).await;
    let uri = format!("/api/sessions/{id}/itinerary");

    let (status, body) = send(&app, "POST", &uri, Some(json!({ "destination": "  ", "days": 3 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_of(&body)["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = send(&app, "POST", &uri, Some(json!({ "destination": "Rome", "days": 31 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_generation_clears_the_previous_itinerary() {
    let app = app(vec![
        answer_turn("Day 1: Colosseum"),
        Err(PlannerError::Api("HTTP 503 error: overloaded".to_string())),
    ]);
    let id = new_session(&app).await;
    let uri = format!("/api/sessions/{id}/itinerary");

    let (status, _) = send(&app, "POST", &uri, Some(json!({ "destination": "Rome", "days": 1 }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", &uri, Some(json!({ "destination": "Paris", "days": 2 }))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error = json_of(&body);
    assert!(error["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Agent execution failed: "));

    let (_, body) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    let snapshot = json_of(&body);
    assert_eq!(snapshot["destination"], "Paris");
    assert!(snapshot["itinerary"].is_null());

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{id}/calendar"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clearing_the_itinerary() {
    let app = app(vec![answer_turn("Day 1: Colosseum")]);
    let id = new_session(&app).await;
    let uri = format!("/api/sessions/{id}/itinerary");

    send(&app, "POST", &uri, Some(json!({ "destination": "Rome", "days": 1 }))).await;
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{id}/calendar"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_of(&body)["error"]["code"], "NO_ITINERARY");
}

#[tokio::test]
async fn test_unknown_sessions_are_not_found() {
    let app = app(vec![]);
    let missing = "00000000-0000-4000-8000-000000000000";

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_of(&body)["error"]["code"], "SESSION_NOT_FOUND");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sessions/{missing}/itinerary"),
        Some(json!({ "destination": "Rome", "days": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_a_session() {
    let app = app(vec![]);
    let id = new_session(&app).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_of(&body)["error"]["code"], "SESSION_NOT_FOUND");
}
