use axum::{
    extract::{Query, State},
    Json,
};

use shared_database::AppState;
use shared_models::error::AppError;
use shared_models::page::Page;

use crate::models::{PatientError, PatientListQuery, PatientResponse};
use crate::services::PatientVisitAggregator;

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<PatientListQuery>,
) -> Result<Json<Page<PatientResponse>>, AppError> {
    let aggregator = PatientVisitAggregator::new(state.store.clone(), state.config.max_page_size);

    let page = aggregator.list_patients(query)
        .await
        .map_err(|e| match e {
            PatientError::InvalidQuery(msg) => AppError::ValidationError(msg),
            PatientError::StorageUnavailable(_) => AppError::Database(e.to_string()),
        })?;

    Ok(Json(page))
}
