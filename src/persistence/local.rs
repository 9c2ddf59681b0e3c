//! LocalStorage-backed blob store (wasm32 only)

use web_sys::Storage;

use super::BlobStore;
use crate::error::StoreError;

pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    /// Attach to `window.localStorage`; a missing or disabled storage leaves the store read-empty
    pub fn open() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if storage.is_none() {
            log::warn!("LocalStorage unavailable, nothing will be saved");
        }

        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StoreError> {
        self.storage.as_ref().ok_or(StoreError::Unavailable)
    }
}

fn write_error(key: &str, err: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Write {
        key: key.to_string(),
        reason: format!("{:?}", err),
    }
}

impl BlobStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| write_error(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| write_error(key, e))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.storage()?.clear().map_err(|e| write_error("*", e))
    }
}
