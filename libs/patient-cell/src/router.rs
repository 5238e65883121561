use axum::{routing::get, Router};

use shared_database::AppState;

use crate::handlers::*;

pub fn patient_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_patients))
        .with_state(state)
}
