//! Per-outcome spin counters
//!
//! Persisted to LocalStorage as `{"+1日": 4, "-1日": 2}`. Zero counts are
//! pruned so the map only lists outcomes that are currently counted.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::persistence::{BlobStore, keys, load_json, save_json};
use crate::wheel::OutcomeKey;

/// Outcome counters in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Totals {
    counts: Vec<(OutcomeKey, u64)>,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &OutcomeKey) {
        match self.counts.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 += 1,
            None => self.counts.push((key.clone(), 1)),
        }
    }

    /// Decrement, flooring at zero; a count reaching zero is removed
    pub fn decrement(&mut self, key: &OutcomeKey) {
        let Some(index) = self.counts.iter().position(|(k, _)| k == key) else {
            return;
        };
        let count = &mut self.counts[index].1;
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.counts.remove(index);
        }
    }

    pub fn get(&self, key: &OutcomeKey) -> u64 {
        self.counts
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutcomeKey, u64)> {
        self.counts.iter().map(|(k, c)| (k, *c))
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total spins counted
    pub fn spins(&self) -> u64 {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    /// Signed day sum over structured keys; free-form keys are ignored
    pub fn day_sum(&self) -> i64 {
        self.counts
            .iter()
            .filter_map(|(k, c)| k.signed_days().map(|d| d * *c as i64))
            .sum()
    }

    /// Load from storage; missing or corrupt data reads as empty
    pub fn load<S: BlobStore + ?Sized>(store: &S) -> Self {
        let totals = load_json::<Self, _>(store, keys::TOTALS).unwrap_or_default();
        log::info!("Loaded totals for {} outcomes", totals.counts.len());
        totals
    }

    pub fn save<S: BlobStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        save_json(store, keys::TOTALS, self)
    }
}

impl Serialize for Totals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (key, count) in &self.counts {
            map.serialize_entry(&key.to_string(), count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Totals {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let counts = raw
            .into_iter()
            .filter_map(|(key, value)| match value.as_u64() {
                Some(0) => None,
                Some(count) => Some((OutcomeKey::from(key), count)),
                None => {
                    log::warn!("Ignoring invalid total {}: {}", key, value);
                    None
                }
            })
            .collect();
        Ok(Self { counts })
    }
}

/// Format the day sum for display, e.g. `＋１２日`
pub fn format_day_sum(sum: i64) -> String {
    let sign = if sum >= 0 { '＋' } else { '－' };
    format!(
        "{}{}日",
        sign,
        crate::wheel::to_full_width(&sum.unsigned_abs().to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn key(s: &str) -> OutcomeKey {
        OutcomeKey::parse(s)
    }

    #[test]
    fn test_increment_and_get() {
        let mut t = Totals::new();
        t.increment(&key("+1日"));
        t.increment(&key("+1日"));
        t.increment(&key("-2日"));
        assert_eq!(t.get(&key("+1日")), 2);
        assert_eq!(t.get(&key("-2日")), 1);
        assert_eq!(t.get(&key("+9日")), 0);
        assert_eq!(t.spins(), 3);
    }

    #[test]
    fn test_decrement_prunes_and_floors() {
        let mut t = Totals::new();
        t.increment(&key("+1日"));
        t.decrement(&key("+1日"));
        assert!(t.is_empty());
        // Unknown key is a no-op, never negative
        t.decrement(&key("+1日"));
        assert_eq!(t.get(&key("+1日")), 0);
    }

    #[test]
    fn test_day_sum_ignores_freeform() {
        let mut t = Totals::new();
        for _ in 0..3 {
            t.increment(&key("+2日"));
        }
        t.increment(&key("-5日"));
        t.increment(&key("禁酒継続"));
        assert_eq!(t.day_sum(), 1);
        assert_eq!(format_day_sum(t.day_sum()), "＋１日");
        assert_eq!(format_day_sum(-12), "－１２日");
    }

    #[test]
    fn test_reset() {
        let mut t = Totals::new();
        t.increment(&key("+1日"));
        t.reset();
        assert!(t.is_empty());
        assert_eq!(t.day_sum(), 0);
    }

    #[test]
    fn test_load_save_round_trip() {
        let mut store = MemoryStore::new();
        let mut t = Totals::new();
        t.increment(&key("-1日"));
        t.increment(&key("+1日"));
        t.save(&mut store).unwrap();
        assert_eq!(Totals::load(&store), t);
        assert_eq!(store.get(keys::TOTALS).unwrap(), r#"{"-1日":1,"+1日":1}"#);
    }

    #[test]
    fn test_load_skips_zero_and_invalid_counts() {
        let mut store = MemoryStore::new();
        store
            .set(keys::TOTALS, r#"{"+1日": 0, "+2日": -1, "+3日": 4}"#)
            .unwrap();
        let t = Totals::load(&store);
        assert_eq!(t.iter().count(), 1);
        assert_eq!(t.get(&key("+3日")), 4);
    }
}
