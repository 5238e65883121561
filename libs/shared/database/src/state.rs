use std::sync::Arc;

use tracing::info;

use shared_config::{AppConfig, OverlapPolicy, StorageBackend};

use crate::error::StoreError;
use crate::memory::InMemoryStore;
use crate::postgrest::SupabaseStore;
use crate::store::ClinicStore;

/// Shared router state: configuration plus the selected store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ClinicStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ClinicStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub async fn from_config(config: AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn ClinicStore> = match config.storage_backend {
            StorageBackend::Supabase => {
                // The shipped exclusion constraint only guards half-open ranges.
                if config.overlap_policy == OverlapPolicy::Inclusive {
                    return Err(StoreError::Unavailable(
                        "VISIT_OVERLAP_POLICY=inclusive is not enforced by the Supabase \
                         visits_no_overlap constraint; use half-open or the memory backend"
                            .to_string(),
                    ));
                }
                info!("Using Supabase storage at {}", config.supabase_url);
                Arc::new(SupabaseStore::new(&config))
            }
            StorageBackend::Memory => {
                let store = match &config.seed_path {
                    Some(path) => InMemoryStore::load_seed_file(path, config.overlap_policy).await?,
                    None => InMemoryStore::new(),
                };
                info!("Using in-memory storage");
                Arc::new(store)
            }
        };

        Ok(Self::new(config, store))
    }
}
