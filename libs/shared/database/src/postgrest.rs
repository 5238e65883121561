use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{header::{HeaderMap, HeaderValue}, Method};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use shared_config::{AppConfig, OverlapPolicy};
use shared_models::clinic::{Doctor, NewVisit, Patient, PatientWithVisits, Visit};
use shared_models::page::{Page, PageRequest};

use crate::error::StoreError;
use crate::store::ClinicStore;
use crate::supabase::SupabaseClient;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Rows requested per call when scanning all visits. PostgREST may still
/// return fewer (`max_rows`), so scans follow `Content-Range` instead.
const VISIT_SCAN_BATCH: u64 = 1000;

const PATIENT_WITH_VISITS_SELECT: &str = "id,first_name,last_name,\
visits(id,start_date_time,end_date_time,doctor_id,patient_id,\
doctor:doctors(id,first_name,last_name,time_zone))";

#[derive(Debug, Deserialize)]
struct DoctorPatientRow {
    doctor_id: i64,
    patient_id: i64,
}

/// [`ClinicStore`] backed by Supabase's PostgREST API.
///
/// Overlap safety on insert relies on the `visits_no_overlap` exclusion
/// constraint from `migrations/`.
pub struct SupabaseStore {
    supabase: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn find_one<T>(&self, path: &str) -> Result<Option<T>, StoreError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut rows: Vec<T> = self.supabase.request(Method::GET, path, None).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }

    async fn fetch_patients_page(
        &self,
        filters: Vec<String>,
        request: PageRequest,
    ) -> Result<Page<PatientWithVisits>, StoreError> {
        let mut query_parts = vec![format!("select={}", PATIENT_WITH_VISITS_SELECT)];
        query_parts.extend(filters);
        query_parts.push("order=id.asc".to_string());
        query_parts.push("visits.order=start_date_time.asc".to_string());
        query_parts.push(format!("limit={}", request.size));
        query_parts.push(format!("offset={}", request.offset()));

        let path = format!("/rest/v1/patients?{}", query_parts.join("&"));
        let (patients, total): (Vec<PatientWithVisits>, Option<u64>) =
            self.supabase.request_with_count(&path).await?;

        let total = total.unwrap_or_else(|| {
            warn!("Patient page response had no exact count, using page length");
            request.offset() + patients.len() as u64
        });

        Ok(Page::new(patients, request, total))
    }
}

/// Operators for the two boundary comparisons of an overlap query.
fn overlap_operators(policy: OverlapPolicy) -> (&'static str, &'static str) {
    match policy {
        OverlapPolicy::HalfOpen => ("lt", "gt"),
        OverlapPolicy::Inclusive => ("lte", "gte"),
    }
}

/// Escapes LIKE metacharacters so `ilike` performs a case-insensitive
/// equality, then URL-encodes the value.
pub fn exact_ilike_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    urlencoding::encode(&escaped).into_owned()
}

#[async_trait]
impl ClinicStore for SupabaseStore {
    async fn find_doctor_by_id(&self, id: i64) -> Result<Option<Doctor>, StoreError> {
        debug!("Fetching doctor {}", id);
        self.find_one(&format!("/rest/v1/doctors?id=eq.{}&limit=1", id)).await
    }

    async fn find_patient_by_id(&self, id: i64) -> Result<Option<Patient>, StoreError> {
        debug!("Fetching patient {}", id);
        self.find_one(&format!("/rest/v1/patients?id=eq.{}&limit=1", id)).await
    }

    async fn find_overlapping_visit(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
        policy: OverlapPolicy,
    ) -> Result<Option<Visit>, StoreError> {
        let (start_op, end_op) = overlap_operators(policy);
        let query_parts = [
            format!("doctor_id=eq.{}", doctor_id),
            format!("start_date_time={}.{}", start_op, end.format(TIMESTAMP_FORMAT)),
            format!("end_date_time={}.{}", end_op, start.format(TIMESTAMP_FORMAT)),
            "order=start_date_time.asc".to_string(),
            "limit=1".to_string(),
        ];

        self.find_one(&format!("/rest/v1/visits?{}", query_parts.join("&"))).await
    }

    async fn insert_visit(&self, visit: NewVisit, _policy: OverlapPolicy) -> Result<Visit, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let body = json!({
            "start_date_time": visit.start_date_time.format(TIMESTAMP_FORMAT).to_string(),
            "end_date_time": visit.end_date_time.format(TIMESTAMP_FORMAT).to_string(),
            "doctor_id": visit.doctor_id,
            "patient_id": visit.patient_id,
        });

        let mut rows: Vec<Visit> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/visits",
            Some(body),
            Some(headers),
        ).await?;

        if rows.is_empty() {
            return Err(StoreError::Unavailable("Insert returned no visit row".to_string()));
        }

        let created = rows.swap_remove(0);
        debug!("Visit {} stored for doctor {}", created.id, created.doctor_id);
        Ok(created)
    }

    async fn find_patients_page(&self, request: PageRequest) -> Result<Page<PatientWithVisits>, StoreError> {
        self.fetch_patients_page(Vec::new(), request).await
    }

    async fn find_patients_page_by_last_name(
        &self,
        last_name: &str,
        request: PageRequest,
    ) -> Result<Page<PatientWithVisits>, StoreError> {
        let filters = vec![format!("last_name=ilike.{}", exact_ilike_pattern(last_name))];
        self.fetch_patients_page(filters, request).await
    }

    async fn list_distinct_doctor_patient_pairs(&self) -> Result<Vec<(i64, i64)>, StoreError> {
        let mut pairs = BTreeSet::new();
        let mut offset: u64 = 0;

        loop {
            let path = format!(
                "/rest/v1/visits?select=doctor_id,patient_id&order=id.asc&limit={}&offset={}",
                VISIT_SCAN_BATCH, offset
            );
            let (rows, total): (Vec<DoctorPatientRow>, Option<u64>) =
                self.supabase.request_with_count(&path).await?;

            if rows.is_empty() {
                break;
            }

            offset += rows.len() as u64;
            pairs.extend(rows.into_iter().map(|row| (row.doctor_id, row.patient_id)));

            if total.is_some_and(|total| offset >= total) {
                break;
            }
        }

        debug!("Scanned {} visits into {} doctor/patient pairs", offset, pairs.len());
        Ok(pairs.into_iter().collect())
    }
}
