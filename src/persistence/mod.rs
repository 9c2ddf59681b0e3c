//! Key-value blob persistence
//!
//! Features:
//! - One JSON blob per key (roulettes, totals, history, settings)
//! - LocalStorage backend on wasm32, in-memory map elsewhere
//! - Corrupt or missing blobs read back as "absent", never as errors

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod local;

pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Storage keys
pub mod keys {
    pub const ROULETTES: &str = "roulettes";
    pub const TOTALS: &str = "totals";
    pub const HISTORY: &str = "history";
    pub const SETTINGS: &str = "roulette_settings";
    /// Set once the bundled configuration file has been imported
    pub const INITIALIZED: &str = "roulette_init_from_json_v1";
}

/// Minimal string blob store
pub trait BlobStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    /// Drop every key
    fn clear(&mut self) -> Result<(), StoreError>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Read and decode a JSON blob. Parse failures are logged and read as absent.
pub fn load_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: BlobStore + ?Sized,
{
    let json = store.get(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Failed to load {} from storage: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON blob
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: BlobStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &json).inspect_err(|e| {
        log::error!("Failed to save {} to storage: {}", key, e);
    })
}
