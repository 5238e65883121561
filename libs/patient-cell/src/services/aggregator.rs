use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use shared_database::ClinicStore;
use shared_models::clinic::{PatientWithVisits, VisitWithDoctor};
use shared_models::page::{Page, PageRequest};

use crate::models::{DoctorDto, PatientDto, PatientError, PatientListQuery, PatientResponse, VisitDto};

const VISIT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Number of distinct patients per doctor. Repeated pairs are counted once.
pub fn doctor_patient_counts(pairs: &[(i64, i64)]) -> HashMap<i64, u64> {
    let distinct: HashSet<&(i64, i64)> = pairs.iter().collect();

    let mut counts = HashMap::new();
    for (doctor_id, _) in distinct {
        *counts.entry(*doctor_id).or_insert(0) += 1;
    }
    counts
}

pub struct PatientVisitAggregator {
    store: Arc<dyn ClinicStore>,
    max_page_size: u32,
}

impl PatientVisitAggregator {
    pub fn new(store: Arc<dyn ClinicStore>, max_page_size: u32) -> Self {
        Self { store, max_page_size }
    }

    /// One page of patients with their visits, wrapped as a single
    /// [`PatientResponse`]. The page keeps the store's total patient count.
    pub async fn list_patients(&self, query: PatientListQuery) -> Result<Page<PatientResponse>, PatientError> {
        if query.size == 0 {
            return Err(PatientError::InvalidQuery("Page size must be at least 1".to_string()));
        }
        if query.size > self.max_page_size {
            return Err(PatientError::InvalidQuery(format!(
                "Page size must not exceed {}", self.max_page_size
            )));
        }

        let request = PageRequest::new(query.page, query.size);
        let search = query.search.as_str();

        debug!(
            "Listing patients page {} size {} search {:?} doctors {:?}",
            request.page, request.size, search, query.doctor_ids
        );

        let patients = if search.is_empty() {
            self.store.find_patients_page(request).await?
        } else {
            self.store.find_patients_page_by_last_name(search, request).await?
        };

        let pairs = self.store.list_distinct_doctor_patient_pairs().await?;
        let counts = doctor_patient_counts(&pairs);
        let doctor_ids: HashSet<i64> = query.doctor_ids.iter().copied().collect();

        let total_elements = patients.total_elements;
        let patient_dtos: Vec<PatientDto> = patients
            .content
            .into_iter()
            .map(|patient| assemble_patient_dto(patient, &doctor_ids, &counts))
            .filter(|dto| !dto.visits.is_empty())
            .collect();

        info!(
            "Listed {} patients with matching visits (page {}, {} total)",
            patient_dtos.len(), request.page, total_elements
        );

        Ok(Page::new(vec![PatientResponse::new(patient_dtos)], request, total_elements))
    }
}

fn assemble_patient_dto(
    patient: PatientWithVisits,
    doctor_ids: &HashSet<i64>,
    counts: &HashMap<i64, u64>,
) -> PatientDto {
    let visits = patient
        .visits
        .into_iter()
        .filter(|visit| doctor_ids.is_empty() || doctor_ids.contains(&visit.doctor.id))
        .map(|visit| {
            let total_patients = counts.get(&visit.doctor.id).copied().unwrap_or(0);
            assemble_visit_dto(visit, total_patients)
        })
        .collect();

    PatientDto {
        patient_first_name: patient.patient.first_name,
        patient_last_name: patient.patient.last_name,
        visits,
    }
}

fn assemble_visit_dto(visit: VisitWithDoctor, total_patients: u64) -> VisitDto {
    VisitDto {
        start: visit.visit.start_date_time.format(VISIT_TIME_FORMAT).to_string(),
        end: visit.visit.end_date_time.format(VISIT_TIME_FORMAT).to_string(),
        doctor: DoctorDto {
            doctor_first_name: visit.doctor.first_name,
            doctor_last_name: visit.doctor.last_name,
            total_patients,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_distinct_patients_per_doctor() {
        let pairs = [(2, 1), (2, 2), (2, 1), (5, 1)];
        let counts = doctor_patient_counts(&pairs);

        assert_eq!(counts.get(&2), Some(&2));
        assert_eq!(counts.get(&5), Some(&1));
        assert_eq!(counts.get(&9), None);
    }

    #[test]
    fn counts_are_empty_without_visits() {
        assert!(doctor_patient_counts(&[]).is_empty());
    }
}
