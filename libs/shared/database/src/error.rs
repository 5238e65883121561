use thiserror::Error;

/// Failures talking to the PostgREST endpoint.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Conflict ({code:?}): {message}")]
    Conflict { code: Option<String>, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// PostgreSQL `exclusion_violation`, raised by the per-doctor visit constraint.
pub const EXCLUSION_VIOLATION: &str = "23P01";

impl DatabaseError {
    pub fn is_exclusion_violation(&self) -> bool {
        matches!(self, DatabaseError::Conflict { code: Some(code), .. } if code == EXCLUSION_VIOLATION)
    }
}

/// Failures surfaced by a [`crate::ClinicStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store refused a visit because it overlaps an existing one.
    #[error("Visit overlaps an existing visit for this doctor")]
    Overlap,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        if err.is_exclusion_violation() {
            StoreError::Overlap
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }
}
