use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use shared_config::OverlapPolicy;
use shared_database::ClinicStore;

use crate::models::VisitError;

pub struct ConflictDetectionService {
    store: Arc<dyn ClinicStore>,
    policy: OverlapPolicy,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn ClinicStore>, policy: OverlapPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Whether any stored visit of `doctor_id` overlaps `[start, end)` (or
    /// `[start, end]` under the inclusive policy).
    pub async fn has_conflict(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<bool, VisitError> {
        debug!("Checking conflicts for doctor {} from {} to {}", doctor_id, start, end);

        let existing = self.store
            .find_overlapping_visit(doctor_id, start, end, self.policy)
            .await?;

        match existing {
            Some(visit) => {
                warn!(
                    "Conflict detected for doctor {} with visit {} ({} - {})",
                    doctor_id, visit.id, visit.start_date_time, visit.end_date_time
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
