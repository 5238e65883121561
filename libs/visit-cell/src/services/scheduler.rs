use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_config::OverlapPolicy;
use shared_database::ClinicStore;
use shared_models::clinic::NewVisit;

use crate::models::{VisitError, VisitRequest, VisitResponse};
use crate::services::conflict::ConflictDetectionService;
use crate::services::time::normalize;

pub struct VisitSchedulerService {
    store: Arc<dyn ClinicStore>,
    conflict_service: ConflictDetectionService,
}

impl VisitSchedulerService {
    pub fn new(store: Arc<dyn ClinicStore>, policy: OverlapPolicy) -> Self {
        let conflict_service = ConflictDetectionService::new(Arc::clone(&store), policy);

        Self {
            store,
            conflict_service,
        }
    }

    /// Books a visit in the doctor's local time.
    ///
    /// Nothing is written unless both lookups succeed and the interval is
    /// free. The store's insert repeats the overlap check atomically, so a
    /// booking that loses a race is reported as a conflict as well.
    pub async fn create_visit(&self, request: VisitRequest) -> Result<VisitResponse, VisitError> {
        info!("Booking visit for patient {} with doctor {}", request.patient_id, request.doctor_id);

        let doctor = self.store
            .find_doctor_by_id(request.doctor_id)
            .await?
            .ok_or(VisitError::DoctorNotFound)?;

        let patient = self.store
            .find_patient_by_id(request.patient_id)
            .await?
            .ok_or(VisitError::PatientNotFound)?;

        let start = normalize(&request.start_date_time, &doctor.time_zone)?;
        let end = normalize(&request.end_date_time, &doctor.time_zone)?;
        debug!("Normalized visit to {} - {} ({})", start, end, doctor.time_zone);

        // A DST fold can put the civil end before the civil start.
        if end <= start {
            return Err(VisitError::InvalidInterval);
        }

        if self.conflict_service.has_conflict(doctor.id, start, end).await? {
            return Err(VisitError::SchedulingConflict);
        }

        let new_visit = NewVisit {
            start_date_time: start,
            end_date_time: end,
            doctor_id: doctor.id,
            patient_id: patient.id,
        };

        let visit = self.store
            .insert_visit(new_visit, self.conflict_service.policy())
            .await
            .map_err(|e| {
                let err = VisitError::from(e);
                if matches!(err, VisitError::SchedulingConflict) {
                    warn!("Visit for doctor {} lost an overlapping booking race", doctor.id);
                }
                err
            })?;

        info!("Visit {} booked: {} with {}", visit.id, patient.full_name(), doctor.full_name());

        Ok(VisitResponse {
            patient_first_name: patient.first_name,
            patient_last_name: patient.last_name,
            doctor_first_name: doctor.first_name,
            doctor_last_name: doctor.last_name,
            visit_start_date_time: visit.start_date_time,
            visit_end_date_time: visit.end_date_time,
        })
    }
}
