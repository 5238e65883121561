use axum::{routing::get, Router};

use patient_cell::router::patient_routes;
use shared_database::AppState;
use visit_cell::router::visit_routes;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Visit Tracker API is running!" }))
        .nest("/visits", visit_routes(state.clone()))
        .nest("/visits/patients", patient_routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use shared_utils::test_utils::{seeded_store, TestConfig};

    fn app() -> Router {
        create_router(TestConfig::default().to_state(seeded_store()))
    }

    #[tokio::test]
    async fn test_root_is_alive() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_booking_then_listing() {
        let app = app();

        let booking = Request::builder()
            .method("POST")
            .uri("/visits")
            .header("content-type", "application/json")
            .body(Body::from(json!({
                "start_date_time": "2025-02-22 09:00:00+00:00",
                "end_date_time": "2025-02-22 09:30:00+00:00",
                "patient_id": 2,
                "doctor_id": 5
            }).to_string()))
            .unwrap();
        let response = app.clone().oneshot(booking).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let listing = Request::builder()
            .uri("/visits/patients?page=0&size=2&doctor_ids=5")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(listing).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let patients = &body["content"][0]["patients"];

        // Doctor 5 has now seen both patients.
        assert_eq!(body["content"][0]["count"], 2);
        assert_eq!(patients[1]["visits"][0]["start"], "2025-02-22T11:00:00");
        assert_eq!(patients[1]["visits"][0]["doctor"]["total_patients"], 2);
    }
}
