//! First-run import of the bundled roulette file
//!
//! The import runs once per store: a flag key records success. A failed
//! import leaves an unsaved empty default, so the next start tries again.

use crate::error::StoreError;
use crate::persistence::{BlobStore, keys};
use crate::roulettes::Roulettes;

/// Bundled configuration file, fetched relative to the page
pub const INIT_FILE: &str = "roulettes_init.json";

/// Where the startup roulettes came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapSource {
    /// Imported from the bundled file
    Imported,
    /// Read from storage
    Stored,
    /// Storage held nothing, an empty default was created and saved
    CreatedDefault,
    /// Import failed; the empty default lives only in memory
    Fallback { reason: String },
}

#[derive(Debug)]
pub struct BootstrapOutcome {
    pub roulettes: Roulettes,
    pub source: BootstrapSource,
    /// Writing the result failed; the roulettes are still usable
    pub persist_error: Option<StoreError>,
}

/// Whether the bundled file still has to be imported
pub fn needs_import<S: BlobStore + ?Sized>(store: &S) -> bool {
    !store.contains(keys::INITIALIZED)
}

/// Import a fetched file body, or fall back when fetching failed
pub fn import<S: BlobStore + ?Sized>(store: &mut S, fetched: Result<String, String>) -> BootstrapOutcome {
    let parsed = fetched.and_then(|body| {
        serde_json::from_str::<Roulettes>(&body).map_err(|e| format!("invalid JSON: {}", e))
    });

    let roulettes = match parsed {
        Ok(roulettes) => roulettes,
        Err(reason) => {
            log::error!("Failed to load {}: {}", INIT_FILE, reason);
            return BootstrapOutcome {
                roulettes: Roulettes::with_empty_default(),
                source: BootstrapSource::Fallback { reason },
                persist_error: None,
            };
        }
    };

    log::info!("Imported {} roulettes from {}", roulettes.len(), INIT_FILE);

    // The flag is only set once the roulettes are safely stored
    let persist_error = roulettes
        .save(store)
        .and_then(|_| store.set(keys::INITIALIZED, "true"))
        .err();
    if let Some(e) = &persist_error {
        log::error!("Imported roulettes could not be saved: {}", e);
    }

    BootstrapOutcome {
        roulettes,
        source: BootstrapSource::Imported,
        persist_error,
    }
}

/// Read roulettes saved by an earlier run
pub fn load_existing<S: BlobStore + ?Sized>(store: &mut S) -> BootstrapOutcome {
    let roulettes = Roulettes::load(&*store);
    if !roulettes.is_empty() {
        return BootstrapOutcome {
            roulettes,
            source: BootstrapSource::Stored,
            persist_error: None,
        };
    }

    log::warn!("No roulettes in storage, creating an empty default");
    let roulettes = Roulettes::with_empty_default();
    let persist_error = roulettes.save(store).err();
    BootstrapOutcome {
        roulettes,
        source: BootstrapSource::CreatedDefault,
        persist_error,
    }
}

/// Run the whole startup decision with a synchronous fetch
pub fn initialize<S, F>(store: &mut S, fetch: F) -> BootstrapOutcome
where
    S: BlobStore + ?Sized,
    F: FnOnce() -> Result<String, String>,
{
    if needs_import(&*store) {
        import(store, fetch())
    } else {
        load_existing(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::wheel::OutcomeKey;

    const BUNDLED: &str = r#"{"default": {"+1日": 60, "-1日": 40}, "週末": {"+2日": 100}}"#;

    #[test]
    fn test_first_run_imports_and_sets_flag() {
        let mut store = MemoryStore::new();
        let out = initialize(&mut store, || Ok(BUNDLED.to_string()));

        assert_eq!(out.source, BootstrapSource::Imported);
        assert!(out.persist_error.is_none());
        assert_eq!(out.roulettes.names().collect::<Vec<_>>(), vec!["default", "週末"]);
        assert!(store.contains(keys::INITIALIZED));
        assert_eq!(Roulettes::load(&store), out.roulettes);
    }

    #[test]
    fn test_second_run_does_not_fetch() {
        let mut store = MemoryStore::new();
        initialize(&mut store, || Ok(BUNDLED.to_string()));

        let out = initialize(&mut store, || panic!("fetched twice"));
        assert_eq!(out.source, BootstrapSource::Stored);
        let weight = out.roulettes.get("default").unwrap().weight(&OutcomeKey::parse("+1日"));
        assert_eq!(weight, Some(60));
    }

    #[test]
    fn test_fetch_failure_falls_back_in_memory() {
        let mut store = MemoryStore::new();
        let out = initialize(&mut store, || Err("HTTP error! status: 404".to_string()));

        assert!(matches!(out.source, BootstrapSource::Fallback { .. }));
        assert_eq!(out.roulettes, Roulettes::with_empty_default());
        assert!(store.is_empty());
        assert!(needs_import(&store));
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let mut store = MemoryStore::new();
        let out = initialize(&mut store, || Ok("[1, 2".to_string()));
        match out.source {
            BootstrapSource::Fallback { reason } => assert!(reason.starts_with("invalid JSON")),
            other => panic!("unexpected source {:?}", other),
        }
        assert!(!store.contains(keys::INITIALIZED));
    }

    #[test]
    fn test_flag_present_but_storage_empty() {
        let mut store = MemoryStore::new();
        store.set(keys::INITIALIZED, "true").unwrap();

        let out = initialize(&mut store, || panic!("should not fetch"));
        assert_eq!(out.source, BootstrapSource::CreatedDefault);
        assert_eq!(Roulettes::load(&store), Roulettes::with_empty_default());
    }

    #[test]
    fn test_import_save_failure_leaves_flag_unset() {
        let mut store = MemoryStore::new();
        store.fail_writes(true);
        let out = initialize(&mut store, || Ok(BUNDLED.to_string()));

        assert_eq!(out.source, BootstrapSource::Imported);
        assert!(out.persist_error.is_some());
        assert_eq!(out.roulettes.len(), 2);
        assert!(needs_import(&store));
    }
}
