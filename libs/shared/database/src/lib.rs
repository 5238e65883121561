pub mod error;
pub mod memory;
pub mod postgrest;
pub mod state;
pub mod store;
pub mod supabase;

pub use error::{DatabaseError, StoreError};
pub use memory::{InMemoryStore, Seed};
pub use postgrest::SupabaseStore;
pub use state::AppState;
pub use store::ClinicStore;
