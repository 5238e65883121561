use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use shared_database::StoreError;

use crate::services::time::parse_instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRequest {
    /// `yyyy-MM-dd HH:mm:ss±HH:mm`
    pub start_date_time: String,
    pub end_date_time: String,
    pub patient_id: i64,
    pub doctor_id: i64,
}

impl VisitRequest {
    /// Boundary check: both timestamps parse and the end instant is strictly
    /// after the start instant.
    pub fn validate(&self) -> Result<(), VisitError> {
        let start = parse_instant(&self.start_date_time)?;
        let end = parse_instant(&self.end_date_time)?;

        if end <= start {
            return Err(VisitError::InvalidInterval);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitResponse {
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
    pub visit_start_date_time: NaiveDateTime,
    pub visit_end_date_time: NaiveDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum VisitError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    #[error("End time must be after start time")]
    InvalidInterval,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Doctor is already booked for this time")]
    SchedulingConflict,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<StoreError> for VisitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Overlap => VisitError::SchedulingConflict,
            StoreError::Unavailable(message) => VisitError::StorageUnavailable(message),
        }
    }
}
