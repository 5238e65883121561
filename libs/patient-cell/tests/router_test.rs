use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use patient_cell::router::patient_routes;
use shared_utils::test_utils::{seeded_store, TestConfig};

fn create_test_app() -> Router {
    patient_routes(TestConfig::default().to_state(seeded_store()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_list_patients_with_doctor_filter() {
    let (status, body) = get(create_test_app(), "/?page=0&size=2&search=&doctor_ids=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_elements"], 2);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["content"][0]["count"], 2);
    assert_eq!(body["content"][0]["patients"][0]["visits"][0]["doctor"]["total_patients"], 2);
}

#[tokio::test]
async fn test_list_patients_by_last_name() {
    let (status, body) = get(create_test_app(), "/?page=0&size=2&search=marry").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_elements"], 1);
    assert_eq!(body["content"][0]["patients"][0]["patient_first_name"], "Jane");
}

#[tokio::test]
async fn test_list_patients_defaults() {
    let (status, body) = get(create_test_app(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 0);
    assert_eq!(body["size"], 20);
    assert_eq!(body["content"][0]["count"], 2);
}

#[tokio::test]
async fn test_list_patients_multiple_doctors() {
    let (status, body) = get(create_test_app(), "/?size=2&doctor_ids=2,5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"][0]["patients"][0]["visits"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_list_patients_rejects_bad_doctor_ids() {
    let (status, _) = get(create_test_app(), "/?size=2&doctor_ids=2,abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_patients_rejects_zero_size() {
    let (status, body) = get(create_test_app(), "/?size=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Page size must be at least 1");
}
