use axum::{extract::State, Json};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{VisitError, VisitRequest, VisitResponse};
use crate::services::VisitSchedulerService;

pub fn to_app_error(e: VisitError) -> AppError {
    match e {
        VisitError::InvalidTimestamp(_)
        | VisitError::UnknownTimeZone(_)
        | VisitError::InvalidInterval => AppError::ValidationError(e.to_string()),
        VisitError::DoctorNotFound | VisitError::PatientNotFound => AppError::NotFound(e.to_string()),
        VisitError::SchedulingConflict => AppError::BadRequest(e.to_string()),
        VisitError::StorageUnavailable(_) => AppError::Database(e.to_string()),
    }
}

#[axum::debug_handler]
pub async fn create_visit(
    State(state): State<AppState>,
    Json(request): Json<VisitRequest>,
) -> Result<Json<VisitResponse>, AppError> {
    request.validate().map_err(to_app_error)?;

    let scheduler = VisitSchedulerService::new(state.store.clone(), state.config.overlap_policy);

    let response = scheduler.create_visit(request)
        .await
        .map_err(to_app_error)?;

    Ok(Json(response))
}
