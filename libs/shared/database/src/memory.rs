use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use shared_config::OverlapPolicy;
use shared_models::clinic::{Doctor, NewVisit, Patient, PatientWithVisits, Visit, VisitWithDoctor};
use shared_models::page::{Page, PageRequest};

use crate::error::StoreError;
use crate::store::ClinicStore;

/// Initial contents for an [`InMemoryStore`], usually loaded from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub visits: Vec<Visit>,
}

#[derive(Debug, Default)]
struct MemoryState {
    doctors: BTreeMap<i64, Doctor>,
    patients: BTreeMap<i64, Patient>,
    visits: Vec<Visit>,
    next_visit_id: i64,
}

impl MemoryState {
    fn overlapping(&self, doctor_id: i64, start: NaiveDateTime, end: NaiveDateTime, policy: OverlapPolicy) -> Option<&Visit> {
        self.visits
            .iter()
            .filter(|visit| visit.doctor_id == doctor_id)
            .find(|visit| policy.overlaps(&start, &end, &visit.start_date_time, &visit.end_date_time))
    }

    fn with_visits(&self, patient: &Patient) -> PatientWithVisits {
        let mut visits: Vec<VisitWithDoctor> = self.visits
            .iter()
            .filter(|visit| visit.patient_id == patient.id)
            .filter_map(|visit| {
                self.doctors.get(&visit.doctor_id).map(|doctor| VisitWithDoctor {
                    visit: visit.clone(),
                    doctor: doctor.clone(),
                })
            })
            .collect();
        visits.sort_by_key(|v| (v.visit.start_date_time, v.visit.id));

        PatientWithVisits {
            patient: patient.clone(),
            visits,
        }
    }

    fn page_of<'a, I>(&self, patients: I, request: PageRequest) -> Page<PatientWithVisits>
    where
        I: Iterator<Item = &'a Patient> + Clone,
    {
        let total = patients.clone().count() as u64;
        let content = patients
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .map(|patient| self.with_visits(patient))
            .collect();

        Page::new(content, request, total)
    }
}

/// Process-local [`ClinicStore`]. Inserts check for overlaps under the same
/// write lock that performs the insert.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `seed`, rejecting visits that reference unknown
    /// rows, end before they start, or overlap another visit of the same
    /// doctor under `policy`.
    pub fn from_seed(seed: Seed, policy: OverlapPolicy) -> Result<Self, StoreError> {
        let mut state = MemoryState::default();

        for doctor in seed.doctors {
            state.doctors.insert(doctor.id, doctor);
        }
        for patient in seed.patients {
            state.patients.insert(patient.id, patient);
        }
        for visit in seed.visits {
            if !state.doctors.contains_key(&visit.doctor_id) {
                return Err(StoreError::Unavailable(format!(
                    "Seed visit {} references unknown doctor {}", visit.id, visit.doctor_id
                )));
            }
            if !state.patients.contains_key(&visit.patient_id) {
                return Err(StoreError::Unavailable(format!(
                    "Seed visit {} references unknown patient {}", visit.id, visit.patient_id
                )));
            }
            if visit.start_date_time >= visit.end_date_time {
                return Err(StoreError::Unavailable(format!(
                    "Seed visit {} does not end after it starts", visit.id
                )));
            }
            if let Some(existing) = state.overlapping(visit.doctor_id, visit.start_date_time, visit.end_date_time, policy) {
                return Err(StoreError::Unavailable(format!(
                    "Seed visit {} overlaps visit {} of doctor {}", visit.id, existing.id, visit.doctor_id
                )));
            }
            state.next_visit_id = state.next_visit_id.max(visit.id);
            state.visits.push(visit);
        }

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    pub async fn load_seed_file(path: impl AsRef<Path>, policy: OverlapPolicy) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to read seed {}: {}", path.display(), e)))?;
        let seed: Seed = serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Unavailable(format!("Invalid seed {}: {}", path.display(), e)))?;

        info!(
            "Loaded seed with {} doctors, {} patients, {} visits",
            seed.doctors.len(), seed.patients.len(), seed.visits.len()
        );

        Self::from_seed(seed, policy)
    }

    pub async fn insert_doctor(&self, doctor: Doctor) {
        self.state.write().await.doctors.insert(doctor.id, doctor);
    }

    pub async fn insert_patient(&self, patient: Patient) {
        self.state.write().await.patients.insert(patient.id, patient);
    }

    /// Stores a visit as-is, skipping the overlap guard.
    pub async fn seed_visit(&self, visit: NewVisit) -> Visit {
        let mut state = self.state.write().await;
        state.next_visit_id += 1;
        let stored = visit.with_id(state.next_visit_id);
        state.visits.push(stored.clone());
        stored
    }

    pub async fn visits(&self) -> Vec<Visit> {
        self.state.read().await.visits.clone()
    }
}

#[async_trait]
impl ClinicStore for InMemoryStore {
    async fn find_doctor_by_id(&self, id: i64) -> Result<Option<Doctor>, StoreError> {
        Ok(self.state.read().await.doctors.get(&id).cloned())
    }

    async fn find_patient_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError> {
        Ok(self.state.read().await.patients.get(&id).cloned())
    }

    async fn find_overlapping_visit(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        policy: OverlapPolicy,
    ) -> Result<Option<Visit>, StoreError> {
        let state = self.state.read().await;
        Ok(state.overlapping(doctor_id, start, end, policy).cloned())
    }

    async fn insert_visit(&self, visit: NewVisit, policy: OverlapPolicy) -> Result<Visit, StoreError> {
        let mut state = self.state.write().await;

        if state.overlapping(visit.doctor_id, visit.start_date_time, visit.end_date_time, policy).is_some() {
            debug!("Rejecting overlapping insert for doctor {}", visit.doctor_id);
            return Err(StoreError::Overlap);
        }

        state.next_visit_id += 1;
        let stored = visit.with_id(state.next_visit_id);
        state.visits.push(stored.clone());
        Ok(stored)
    }

    async fn find_patients_page(&self, request: PageRequest) -> Result<Page<PatientWithVisits>, StoreError> {
        let state = self.state.read().await;
        Ok(state.page_of(state.patients.values(), request))
    }

    async fn find_patients_page_by_last_name(
        &self,
        last_name: &str,
        request: PageRequest,
    ) -> Result<Page<PatientWithVisits>, StoreError> {
        let state = self.state.read().await;
        let wanted = last_name.to_lowercase();
        let matching = state
            .patients
            .values()
            .filter(move |patient| patient.last_name.to_lowercase() == wanted);
        Ok(state.page_of(matching, request))
    }

    async fn list_distinct_doctor_patient_pairs(&self) -> Result<Vec<(i64, i64)>, StoreError> {
        let state = self.state.read().await;
        let pairs: BTreeSet<(i64, i64)> = state
            .visits
            .iter()
            .map(|visit| (visit.doctor_id, visit.patient_id))
            .collect();
        Ok(pairs.into_iter().collect())
    }
}
