use serde::{Deserialize, Deserializer, Serialize};

use shared_database::StoreError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientListQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
    /// Last name to match exactly, ignoring case. Only the empty string lists
    /// everyone; whitespace is matched as given.
    #[serde(default)]
    pub search: String,
    /// Doctors whose visits are kept. Empty keeps all visits.
    #[serde(default, deserialize_with = "comma_separated_ids")]
    pub doctor_ids: Vec<i64>,
}

/// Accepts `doctor_ids=1,2,5` (and an empty value).
fn comma_separated_ids<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid doctor id: {}", part)))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorDto {
    pub doctor_first_name: String,
    pub doctor_last_name: String,
    /// Distinct patients this doctor has ever seen.
    pub total_patients: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitDto {
    pub start: String,
    pub end: String,
    pub doctor: DoctorDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDto {
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub visits: Vec<VisitDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientResponse {
    pub patients: Vec<PatientDto>,
    pub count: usize,
}

impl PatientResponse {
    pub fn new(patients: Vec<PatientDto>) -> Self {
        let count = patients.len();
        Self { patients, count }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<StoreError> for PatientError {
    fn from(err: StoreError) -> Self {
        PatientError::StorageUnavailable(err.to_string())
    }
}
