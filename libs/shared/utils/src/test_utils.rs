use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use shared_config::{AppConfig, OverlapPolicy, StorageBackend};
use shared_database::{AppState, InMemoryStore, Seed};
use shared_models::clinic::{Doctor, Patient, Visit};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub overlap_policy: OverlapPolicy,
    pub max_page_size: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            overlap_policy: OverlapPolicy::HalfOpen,
            max_page_size: 50,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            storage_backend: StorageBackend::Memory,
            seed_path: None,
            overlap_policy: self.overlap_policy,
            max_page_size: self.max_page_size,
            ..AppConfig::default()
        }
    }

    pub fn to_state(&self, store: Arc<InMemoryStore>) -> AppState {
        AppState::new(self.to_app_config(), store)
    }
}

pub fn civil(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M")
        .expect("fixture timestamps are well formed")
}

pub fn doctor(id: i64, first_name: &str, last_name: &str, time_zone: &str) -> Doctor {
    Doctor {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        time_zone: time_zone.to_string(),
    }
}

pub fn patient(id: i64, first_name: &str, last_name: &str) -> Patient {
    Patient {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
    }
}

/// Two doctors and two patients with three visits:
///
/// - doctor 2 (John Torry, UTC): Jane Marry 2025-02-20 10:00-10:30, Sam Elliot 2025-03-10 10:00-10:30
/// - doctor 5 (Greg House, Europe/Kyiv): Jane Marry 2025-02-21 09:00-09:30
pub fn clinic_seed() -> Seed {
    let day = |y, m, d, h, min| {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("fixture date is valid")
    };

    Seed {
        doctors: vec![
            doctor(2, "John", "Torry", "UTC"),
            doctor(5, "Greg", "House", "Europe/Kyiv"),
        ],
        patients: vec![
            patient(1, "Jane", "Marry"),
            patient(2, "Sam", "Elliot"),
        ],
        visits: vec![
            Visit {
                id: 1,
                start_date_time: day(2025, 2, 20, 10, 0),
                end_date_time: day(2025, 2, 20, 10, 30),
                doctor_id: 2,
                patient_id: 1,
            },
            Visit {
                id: 2,
                start_date_time: day(2025, 3, 10, 10, 0),
                end_date_time: day(2025, 3, 10, 10, 30),
                doctor_id: 2,
                patient_id: 2,
            },
            Visit {
                id: 3,
                start_date_time: day(2025, 2, 21, 9, 0),
                end_date_time: day(2025, 2, 21, 9, 30),
                doctor_id: 5,
                patient_id: 1,
            },
        ],
    }
}

pub fn seeded_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::from_seed(clinic_seed(), OverlapPolicy::HalfOpen).expect("clinic seed is consistent"))
}
