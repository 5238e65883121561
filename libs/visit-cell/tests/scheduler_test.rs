use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::NaiveDateTime;

use shared_config::OverlapPolicy;
use shared_database::{ClinicStore, InMemoryStore, StoreError};
use shared_models::clinic::{Doctor, NewVisit, Patient, PatientWithVisits, Visit};
use shared_models::page::{Page, PageRequest};
use shared_utils::test_utils::{civil, seeded_store};

use visit_cell::models::{VisitError, VisitRequest};
use visit_cell::services::{ConflictDetectionService, VisitSchedulerService};

fn request(doctor_id: i64, patient_id: i64, start: &str, end: &str) -> VisitRequest {
    VisitRequest {
        start_date_time: start.to_string(),
        end_date_time: end.to_string(),
        patient_id,
        doctor_id,
    }
}

fn scheduler(store: &Arc<InMemoryStore>, policy: OverlapPolicy) -> VisitSchedulerService {
    VisitSchedulerService::new(store.clone(), policy)
}

#[tokio::test]
async fn test_create_visit_success() {
    let store = seeded_store();

    let response = scheduler(&store, OverlapPolicy::HalfOpen)
        .create_visit(request(2, 1, "2025-02-20 13:00:00+02:00", "2025-02-20 13:30:00+02:00"))
        .await
        .unwrap();

    assert_eq!(response.patient_first_name, "Jane");
    assert_eq!(response.patient_last_name, "Marry");
    assert_eq!(response.doctor_first_name, "John");
    assert_eq!(response.doctor_last_name, "Torry");
    assert_eq!(response.visit_start_date_time, civil("2025-02-20", "11:00"));
    assert_eq!(response.visit_end_date_time, civil("2025-02-20", "11:30"));
    assert_eq!(store.visits().await.len(), 4);
}

#[tokio::test]
async fn test_create_visit_stores_doctor_local_time() {
    let store = seeded_store();

    // Doctor 5 works in Europe/Kyiv (UTC+2 in winter).
    let response = scheduler(&store, OverlapPolicy::HalfOpen)
        .create_visit(request(5, 2, "2025-02-21 08:00:00+00:00", "2025-02-21 08:30:00+00:00"))
        .await
        .unwrap();

    assert_eq!(response.visit_start_date_time, civil("2025-02-21", "10:00"));

    let stored = store.visits().await;
    let created = stored.last().unwrap();
    assert_eq!(created.doctor_id, 5);
    assert_eq!(created.patient_id, 2);
    assert_eq!(created.start_date_time, civil("2025-02-21", "10:00"));
    assert_eq!(created.end_date_time, civil("2025-02-21", "10:30"));
}

#[tokio::test]
async fn test_unknown_doctor_writes_nothing() {
    let store = seeded_store();

    let result = scheduler(&store, OverlapPolicy::HalfOpen)
        .create_visit(request(42, 1, "2025-02-20 13:00:00+02:00", "2025-02-20 13:30:00+02:00"))
        .await;

    assert_matches!(result, Err(VisitError::DoctorNotFound));
    assert_eq!(store.visits().await.len(), 3);
}

#[tokio::test]
async fn test_unknown_patient_writes_nothing() {
    let store = seeded_store();

    let result = scheduler(&store, OverlapPolicy::HalfOpen)
        .create_visit(request(2, 42, "2025-02-20 13:00:00+02:00", "2025-02-20 13:30:00+02:00"))
        .await;

    assert_matches!(result, Err(VisitError::PatientNotFound));
    assert_eq!(store.visits().await.len(), 3);
}

#[tokio::test]
async fn test_overlapping_visit_is_rejected() {
    let store = seeded_store();

    // Existing: doctor 2, 2025-02-20 10:00-10:30 UTC.
    let result = scheduler(&store, OverlapPolicy::HalfOpen)
        .create_visit(request(2, 2, "2025-02-20 10:15:00+00:00", "2025-02-20 10:45:00+00:00"))
        .await;

    assert_matches!(result, Err(VisitError::SchedulingConflict));
    assert_eq!(store.visits().await.len(), 3);
}

#[tokio::test]
async fn test_overlap_with_other_doctor_is_allowed() {
    let store = seeded_store();

    // Same wall-clock slot as doctor 2's visit, but doctor 5's calendar is free.
    let result = scheduler(&store, OverlapPolicy::HalfOpen)
        .create_visit(request(5, 2, "2025-02-20 12:15:00+02:00", "2025-02-20 12:45:00+02:00"))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_back_to_back_visit_under_half_open_policy() {
    let store = seeded_store();

    let result = scheduler(&store, OverlapPolicy::HalfOpen)
        .create_visit(request(2, 2, "2025-02-20 10:30:00+00:00", "2025-02-20 11:00:00+00:00"))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_back_to_back_visit_under_inclusive_policy() {
    let store = seeded_store();

    let result = scheduler(&store, OverlapPolicy::Inclusive)
        .create_visit(request(2, 2, "2025-02-20 10:30:00+00:00", "2025-02-20 11:00:00+00:00"))
        .await;

    assert_matches!(result, Err(VisitError::SchedulingConflict));
}

#[tokio::test]
async fn test_unknown_doctor_zone_writes_nothing() {
    let store = seeded_store();
    store.insert_doctor(shared_utils::test_utils::doctor(9, "Ann", "Nowhere", "Mars/Base")).await;

    let result = scheduler(&store, OverlapPolicy::HalfOpen)
        .create_visit(request(9, 1, "2025-02-20 13:00:00+02:00", "2025-02-20 13:30:00+02:00"))
        .await;

    assert_matches!(result, Err(VisitError::UnknownTimeZone(_)));
    assert_eq!(store.visits().await.len(), 3);
}

#[tokio::test]
async fn test_conflict_detector_reports_existing_visit() {
    let store = seeded_store();
    let detector = ConflictDetectionService::new(store.clone(), OverlapPolicy::HalfOpen);

    assert!(detector
        .has_conflict(2, civil("2025-02-20", "10:15"), civil("2025-02-20", "10:45"))
        .await
        .unwrap());
    assert!(!detector
        .has_conflict(2, civil("2025-02-20", "10:30"), civil("2025-02-20", "11:00"))
        .await
        .unwrap());
    assert!(!detector
        .has_conflict(5, civil("2025-02-20", "10:15"), civil("2025-02-20", "10:45"))
        .await
        .unwrap());
}

/// Store whose pre-check sees a free slot but whose insert loses a race.
struct RacingStore {
    inner: Arc<InMemoryStore>,
}

#[async_trait]
impl ClinicStore for RacingStore {
    async fn find_doctor_by_id(&self, id: i64) -> Result<Option<Doctor>, StoreError> {
        self.inner.find_doctor_by_id(id).await
    }

    async fn find_patient_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError> {
        self.inner.find_patient_by_id(id).await
    }

    async fn find_overlapping_visit(
        &self,
        _doctor_id: i64,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
        _policy: OverlapPolicy,
    ) -> Result<Option<Visit>, StoreError> {
        Ok(None)
    }

    async fn insert_visit(&self, _visit: NewVisit, _policy: OverlapPolicy) -> Result<Visit, StoreError> {
        Err(StoreError::Overlap)
    }

    async fn find_patients_page(&self, request: PageRequest) -> Result<Page<PatientWithVisits>, StoreError> {
        self.inner.find_patients_page(request).await
    }

    async fn find_patients_page_by_last_name(
        &self,
        last_name: &str,
        request: PageRequest,
    ) -> Result<Page<PatientWithVisits>, StoreError> {
        self.inner.find_patients_page_by_last_name(last_name, request).await
    }

    async fn list_distinct_doctor_patient_pairs(&self) -> Result<Vec<(i64, i64)>, StoreError> {
        self.inner.list_distinct_doctor_patient_pairs().await
    }
}

#[tokio::test]
async fn test_store_level_overlap_is_a_conflict() {
    let inner = seeded_store();
    let store = Arc::new(RacingStore { inner: inner.clone() });

    let result = VisitSchedulerService::new(store, OverlapPolicy::HalfOpen)
        .create_visit(request(2, 1, "2025-02-20 13:00:00+02:00", "2025-02-20 13:30:00+02:00"))
        .await;

    assert_matches!(result, Err(VisitError::SchedulingConflict));
    assert_eq!(inner.visits().await.len(), 3);
}

#[tokio::test]
async fn test_concurrent_bookings_for_same_slot_book_once() {
    let store = seeded_store();

    let first = scheduler(&store, OverlapPolicy::HalfOpen);
    let second = scheduler(&store, OverlapPolicy::HalfOpen);

    let (a, b) = tokio::join!(
        first.create_visit(request(2, 1, "2025-04-01 09:00:00+00:00", "2025-04-01 09:30:00+00:00")),
        second.create_visit(request(2, 2, "2025-04-01 09:10:00+00:00", "2025-04-01 09:40:00+00:00")),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(store.visits().await.len(), 4);
}
