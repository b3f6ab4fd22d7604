#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use leave_planner::{CaregiverRecord, PlanDocument, PlanModel, ViewData, http_api};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let birth = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let plan = PlanModel::new(birth, "Mother", "Father").unwrap();
    let state = http_api::AppState::new(plan);
    http_api::router(state)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    payload: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match payload {
        Some(payload) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&payload).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn health_check() {
    let app = new_router();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn block_lifecycle_via_http_api() {
    let app = new_router();

    // Add a two-week block after the mandatory one
    let (status, body) = send(
        &app,
        "POST",
        "/caregivers/first/blocks",
        Some(json!({ "after_index": 0, "weeks": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let record: CaregiverRecord = serde_json::from_value(body).unwrap();
    assert_eq!(record.blocks.len(), 2);
    assert_eq!(record.blocks[1].label, "Block 2");
    assert_eq!(record.blocks[1].duration_weeks, Some(2));

    // Switch it to end-date mode
    let (status, body) = send(
        &app,
        "PUT",
        "/caregivers/first/blocks/1",
        Some(json!({
            "label": "Spring",
            "mode": "end_date",
            "start_date": "2024-03-04",
            "end_date": "2024-03-15"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blocks"][1]["label"], json!("Spring"));
    assert_eq!(body["blocks"][1]["end_date"], json!("2024-03-15"));

    // Delete it
    let (status, _) = send(&app, "DELETE", "/caregivers/first/blocks/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Gone now
    let (status, body) = send(&app, "DELETE", "/caregivers/first/blocks/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("not_found"));
}

#[tokio::test]
async fn mandatory_block_delete_is_a_conflict() {
    let app = new_router();
    let (status, body) = send(&app, "DELETE", "/caregivers/second/blocks/0", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("conflict"));
}

#[tokio::test]
async fn fractional_weeks_return_bad_request() {
    let app = new_router();
    send(&app, "POST", "/caregivers/second/blocks", Some(json!({}))).await;
    let (status, body) = send(
        &app,
        "PUT",
        "/caregivers/second/blocks/1",
        Some(json!({
            "label": "Half",
            "mode": "duration",
            "start_date": "2024-02-12",
            "duration_weeks": 1.5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_request"));
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("whole number of weeks")
    );
}

#[tokio::test]
async fn birth_date_conflict_and_shift() {
    let app = new_router();
    send(&app, "POST", "/caregivers/first/blocks", Some(json!({}))).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/plan/birth_date",
        Some(json!({ "birth_date": "2024-01-08" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("2024-02-19")
    );

    let (status, body) = send(
        &app,
        "PUT",
        "/plan/birth_date",
        Some(json!({ "birth_date": "2024-01-08", "policy": "shift_all" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let document: PlanDocument = serde_json::from_value(body).unwrap();
    assert_eq!(
        document.caregivers[0].blocks[1].start_date,
        NaiveDate::from_ymd_opt(2024, 2, 19).unwrap()
    );
}

#[tokio::test]
async fn overlaps_and_view_are_derived() {
    let app = new_router();
    let (status, body) = send(&app, "GET", "/overlaps", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["start_date"], json!("2024-01-01"));
    assert_eq!(body[0]["end_date"], json!("2024-02-12"));

    let (status, body) = send(
        &app,
        "POST",
        "/holidays",
        Some(json!([
            { "label": "New Year", "start_date": "2024-01-01", "end_date": "2024-01-01" }
        ])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send(&app, "GET", "/view", None).await;
    assert_eq!(status, StatusCode::OK);
    let view: ViewData = serde_json::from_value(body).unwrap();
    assert_eq!(view.rows.len(), 4);
    assert_eq!(view.summary.overlap_days, 42);
}

#[tokio::test]
async fn plan_document_replace_validates() {
    let app = new_router();
    let (status, mut document) = send(&app, "GET", "/plan", None).await;
    assert_eq!(status, StatusCode::OK);

    document["caregivers"][1]["name"] = json!("Sam");
    let (status, body) = send(&app, "PUT", "/plan", Some(document.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["caregivers"][1]["name"], json!("Sam"));

    let only_first = document["caregivers"][0].clone();
    document["caregivers"] = json!([only_first]);
    let (status, body) = send(&app, "PUT", "/plan", Some(document)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_request"));

    let (_, body) = send(&app, "GET", "/caregivers/second", None).await;
    assert_eq!(body["name"], json!("Sam"));
}
