//! Named roulette configurations
//!
//! Persisted to LocalStorage as one JSON object of objects:
//! `{"default": {"+1日": 50, "-1日": 50}, ...}`. Both levels keep insertion
//! order, since sector order on the wheel follows it.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::DEFAULT_ROULETTE_NAME;
use crate::error::{ConfigError, PartitionError, StoreError};
use crate::persistence::{BlobStore, keys, load_json, save_json};
use crate::wheel::{ConfigEntry, OutcomeKey, WeightPartition};

/// One roulette's ordered `(key, weight)` entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    entries: Vec<(OutcomeKey, i64)>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ConfigEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.key, e.weight)).collect(),
        }
    }

    pub fn entries(&self) -> &[(OutcomeKey, i64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn weight(&self, key: &OutcomeKey) -> Option<i64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, w)| *w)
    }

    /// Insert or replace, keeping the original position of an existing key
    pub fn set(&mut self, key: OutcomeKey, weight: i64) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = weight,
            None => self.entries.push((key, weight)),
        }
    }

    pub fn partition(&self) -> Result<WeightPartition, PartitionError> {
        WeightPartition::build(&self.entries)
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, weight) in &self.entries {
            map.serialize_entry(&key.to_string(), weight)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Configuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut entries = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            match value.as_i64() {
                Some(weight) => entries.push((OutcomeKey::from(key), weight)),
                None => log::warn!("Ignoring non-integer weight {}: {}", key, value),
            }
        }
        Ok(Self { entries })
    }
}

/// All named configurations, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roulettes {
    configs: Vec<(String, Configuration)>,
}

impl Roulettes {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding only an empty default roulette
    pub fn with_empty_default() -> Self {
        let mut roulettes = Self::new();
        roulettes.put(DEFAULT_ROULETTE_NAME, Configuration::new());
        roulettes
    }

    pub fn get(&self, name: &str) -> Option<&Configuration> {
        self.configs.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace a configuration (replacing keeps its position)
    pub fn put(&mut self, name: &str, config: Configuration) {
        match self.configs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = config,
            None => self.configs.push((name.to_string(), config)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.iter().map(|(n, _)| n.as_str())
    }

    pub fn first_name(&self) -> Option<&str> {
        self.configs.first().map(|(n, _)| n.as_str())
    }

    /// Remove a configuration. The default roulette is refused.
    pub fn remove(&mut self, name: &str) -> Result<Configuration, ConfigError> {
        if name == DEFAULT_ROULETTE_NAME {
            return Err(ConfigError::DefaultUndeletable);
        }
        let index = self
            .configs
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| ConfigError::UnknownRoulette(name.to_string()))?;
        Ok(self.configs.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Load from storage; missing or corrupt data reads as an empty collection
    pub fn load<S: BlobStore + ?Sized>(store: &S) -> Self {
        match load_json::<Self, _>(store, keys::ROULETTES) {
            Some(roulettes) => {
                log::info!("Loaded {} roulettes", roulettes.len());
                roulettes
            }
            None => Self::new(),
        }
    }

    pub fn save<S: BlobStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        save_json(store, keys::ROULETTES, self)?;
        log::info!("Roulettes saved ({} entries)", self.len());
        Ok(())
    }
}

impl Serialize for Roulettes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.configs.len()))?;
        for (name, config) in &self.configs {
            map.serialize_entry(name, config)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Roulettes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let mut configs = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let config = serde_json::from_value(value).unwrap_or_else(|e| {
                log::warn!("Roulette {} is unreadable, treating as empty: {}", name, e);
                Configuration::new()
            });
            configs.push((name, config));
        }
        Ok(Self { configs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_configuration_keeps_insertion_order() {
        let json = r#"{"-1日": 10, "+5日": 20, "+1日": 70}"#;
        let config: Configuration = serde_json::from_str(json).unwrap();
        let keys: Vec<_> = config.entries().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["-1日", "+5日", "+1日"]);
        assert_eq!(serde_json::to_string(&config).unwrap(), r#"{"-1日":10,"+5日":20,"+1日":70}"#);
    }

    #[test]
    fn test_configuration_drops_non_integer_weights() {
        let json = r#"{"+1日": 50, "+2日": "many", "+3日": 12.5, "legacy": 50}"#;
        let config: Configuration = serde_json::from_str(json).unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config.weight(&OutcomeKey::parse("legacy")), Some(50));
    }

    #[test]
    fn test_configuration_set_keeps_position() {
        let mut config = Configuration::new();
        config.set(OutcomeKey::parse("a"), 1);
        config.set(OutcomeKey::parse("b"), 2);
        config.set(OutcomeKey::parse("a"), 3);
        assert_eq!(config.entries()[0], (OutcomeKey::parse("a"), 3));
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_roulettes_put_get_remove() {
        let mut r = Roulettes::with_empty_default();
        r.put("work", Configuration::from_entries([ConfigEntry::new("+1日".into(), 100)]));
        assert_eq!(r.names().collect::<Vec<_>>(), vec!["default", "work"]);
        assert_eq!(r.get("work").unwrap().len(), 1);

        assert_eq!(r.remove(DEFAULT_ROULETTE_NAME), Err(ConfigError::DefaultUndeletable));
        assert_eq!(
            r.remove("missing"),
            Err(ConfigError::UnknownRoulette("missing".into()))
        );
        assert!(r.remove("work").is_ok());
        assert!(!r.contains("work"));
    }

    #[test]
    fn test_roulettes_load_tolerates_corruption() {
        let mut store = MemoryStore::new();
        store.set(keys::ROULETTES, "[broken").unwrap();
        assert!(Roulettes::load(&store).is_empty());

        store.set(keys::ROULETTES, r#"{"default": 5, "b": {"+1日": 100}}"#).unwrap();
        let r = Roulettes::load(&store);
        assert!(r.get("default").unwrap().is_empty());
        assert_eq!(r.get("b").unwrap().len(), 1);
    }

    #[test]
    fn test_roulettes_save_load() {
        let mut store = MemoryStore::new();
        let mut r = Roulettes::with_empty_default();
        r.put(
            "week",
            Configuration::from_entries([
                ConfigEntry::new("+7日".into(), 30),
                ConfigEntry::new("-7日".into(), 70),
            ]),
        );
        r.save(&mut store).unwrap();
        assert_eq!(Roulettes::load(&store), r);
    }
}
