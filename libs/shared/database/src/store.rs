use async_trait::async_trait;
use chrono::NaiveDateTime;

use shared_config::OverlapPolicy;
use shared_models::clinic::{Doctor, NewVisit, Patient, PatientWithVisits, Visit};
use shared_models::page::{Page, PageRequest};

use crate::error::StoreError;

/// Storage seam for doctors, patients and visits.
///
/// `insert_visit` must refuse a visit that overlaps an existing one for the
/// same doctor under `policy`, atomically with the write, and report it as
/// [`StoreError::Overlap`].
#[async_trait]
pub trait ClinicStore: Send + Sync {
    async fn find_doctor_by_id(&self, id: i64) -> Result<Option<Doctor>, StoreError>;

    async fn find_patient_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError>;

    async fn find_overlapping_visit(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        policy: OverlapPolicy,
    ) -> Result<Option<Visit>, StoreError>;

    async fn insert_visit(&self, visit: NewVisit, policy: OverlapPolicy) -> Result<Visit, StoreError>;

    /// Patients ordered by id, each with all of its visits and their doctors.
    async fn find_patients_page(&self, request: PageRequest) -> Result<Page<PatientWithVisits>, StoreError>;

    /// Like [`ClinicStore::find_patients_page`], restricted to patients whose
    /// last name equals `last_name` ignoring case.
    async fn find_patients_page_by_last_name(
        &self,
        last_name: &str,
        request: PageRequest,
    ) -> Result<Page<PatientWithVisits>, StoreError>;

    /// Every (doctor_id, patient_id) pair that has at least one visit.
    async fn list_distinct_doctor_patient_pairs(&self) -> Result<Vec<(i64, i64)>, StoreError>;
}
