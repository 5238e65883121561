use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How two visit intervals of the same doctor are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// `[start, end)`: a visit ending exactly when another starts is allowed.
    #[default]
    HalfOpen,
    /// `[start, end]`: touching boundaries count as a conflict.
    Inclusive,
}

impl OverlapPolicy {
    pub fn overlaps<T: PartialOrd>(&self, start: &T, end: &T, other_start: &T, other_end: &T) -> bool {
        match self {
            OverlapPolicy::HalfOpen => start < other_end && end > other_start,
            OverlapPolicy::Inclusive => start <= other_end && end >= other_start,
        }
    }
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "half-open" | "half_open" | "halfopen" => Ok(OverlapPolicy::HalfOpen),
            "inclusive" => Ok(OverlapPolicy::Inclusive),
            other => Err(format!("unknown overlap policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Supabase,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(StorageBackend::Supabase),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub storage_backend: StorageBackend,
    pub seed_path: Option<String>,
    pub overlap_policy: OverlapPolicy,
    pub max_page_size: u32,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            storage_backend: StorageBackend::Memory,
            seed_path: None,
            overlap_policy: OverlapPolicy::default(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let supabase_url = env::var("SUPABASE_URL")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            });
        let supabase_service_key = env::var("SUPABASE_SERVICE_KEY")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                String::new()
            });
        let supabase_configured = !supabase_url.is_empty() && !supabase_service_key.is_empty();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse().unwrap_or_else(|e: String| {
                warn!("{}, falling back to in-memory storage", e);
                StorageBackend::Memory
            }),
            Err(_) if supabase_configured => StorageBackend::Supabase,
            Err(_) => {
                warn!("STORAGE_BACKEND not set and Supabase not configured, using in-memory storage");
                StorageBackend::Memory
            }
        };

        let overlap_policy = env::var("VISIT_OVERLAP_POLICY")
            .ok()
            .and_then(|value| {
                value.parse().map_err(|e: String| warn!("{}, using half-open", e)).ok()
            })
            .unwrap_or_default();

        let max_page_size = env::var("MAX_PAGE_SIZE")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|size| *size > 0)
            .unwrap_or_else(|| {
                warn!("MAX_PAGE_SIZE not set or invalid, using default {}", DEFAULT_MAX_PAGE_SIZE);
                DEFAULT_MAX_PAGE_SIZE
            });

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_SERVER_PORT);

        let config = Self {
            supabase_url,
            supabase_service_key,
            storage_backend,
            seed_path: env::var("SEED_PATH").ok().filter(|path| !path.is_empty()),
            overlap_policy,
            max_page_size,
            server_port,
        };

        if config.storage_backend == StorageBackend::Supabase && !config.is_configured() {
            warn!("Supabase storage selected but SUPABASE_URL / SUPABASE_SERVICE_KEY are missing");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}
