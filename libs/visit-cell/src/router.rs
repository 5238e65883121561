use axum::{routing::post, Router};

use shared_database::AppState;

use crate::handlers;

pub fn visit_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::create_visit))
        .with_state(state)
}
