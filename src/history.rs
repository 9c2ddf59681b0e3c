//! Spin history
//!
//! Persisted to LocalStorage, most recent first, capped at the configured
//! limit. Deleting an entry only flags it, so the list stays an audit trail.

use serde::{Deserialize, Serialize};

use crate::consts::HISTORY_LIMIT;
use crate::error::{HistoryError, StoreError};
use crate::persistence::{BlobStore, keys, load_json, save_json};
use crate::wheel::OutcomeKey;

/// What a history line records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    /// A finished spin
    #[default]
    Spin,
    /// Totals were cleared
    TotalsReset,
}

/// Result text the page stored for a totals reset before lines had a kind
const LEGACY_RESET_TEXT: &str = "合計をリセットしました";

/// A single history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredEntry")]
pub struct HistoryEntry {
    /// Unix timestamp (ms); zero for lines that only kept display text
    pub timestamp: f64,
    /// Preformatted time carried over from older data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Outcome of the spin (empty for non-spin lines)
    pub result: Option<OutcomeKey>,
    pub kind: HistoryKind,
    pub deleted: bool,
}

/// Any stored line: current entries, or `{time, result}` pairs
#[derive(Deserialize)]
struct StoredEntry {
    #[serde(default)]
    timestamp: f64,
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    kind: Option<HistoryKind>,
    #[serde(default)]
    deleted: bool,
}

impl From<StoredEntry> for HistoryEntry {
    fn from(raw: StoredEntry) -> Self {
        let kind = match (raw.kind, raw.result.as_deref()) {
            (Some(kind), _) => kind,
            (None, Some(LEGACY_RESET_TEXT)) => HistoryKind::TotalsReset,
            (None, _) => HistoryKind::Spin,
        };
        let result = match kind {
            HistoryKind::Spin => raw.result.map(OutcomeKey::from),
            HistoryKind::TotalsReset => None,
        };
        Self {
            timestamp: raw.timestamp,
            time: raw.time,
            result,
            kind,
            deleted: raw.deleted,
        }
    }
}

impl HistoryEntry {
    pub fn spin(timestamp: f64, result: OutcomeKey) -> Self {
        Self {
            timestamp,
            time: None,
            result: Some(result),
            kind: HistoryKind::Spin,
            deleted: false,
        }
    }

    pub fn totals_reset(timestamp: f64) -> Self {
        Self {
            timestamp,
            time: None,
            result: None,
            kind: HistoryKind::TotalsReset,
            deleted: false,
        }
    }

    /// When the line was written, as shown in the history list
    pub fn display_time(&self) -> String {
        match &self.time {
            Some(time) => time.clone(),
            None => format_timestamp(self.timestamp),
        }
    }

    /// Text shown in the history list
    pub fn describe(&self) -> String {
        match (self.kind, &self.result) {
            (HistoryKind::Spin, Some(key)) => key.to_string(),
            (HistoryKind::Spin, None) => "-".to_string(),
            (HistoryKind::TotalsReset, _) => "Totals reset".to_string(),
        }
    }
}

/// Spin history, newest first. Stored as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
    #[serde(skip, default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    HISTORY_LIMIT
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Apply a new cap, evicting the oldest entries beyond it
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.entries.truncate(self.limit);
    }

    /// Add an entry at the front, evicting the oldest past the cap
    pub fn prepend(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
    }

    /// Flag an entry as deleted.
    ///
    /// Returns the spin outcome whose total should be decremented, if any.
    /// A spin recorded before a later totals reset returns `None`.
    pub fn mark_deleted(&mut self, index: usize) -> Result<Option<OutcomeKey>, HistoryError> {
        let counted = !self.reset_after(index);
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(HistoryError::OutOfRange(index))?;
        if entry.deleted {
            return Err(HistoryError::AlreadyDeleted(index));
        }
        entry.deleted = true;

        Ok(match entry.kind {
            HistoryKind::Spin if counted => entry.result.clone(),
            _ => None,
        })
    }

    /// Whether totals were reset after the entry at `index`
    fn reset_after(&self, index: usize) -> bool {
        self.entries
            .iter()
            .take(index)
            .any(|e| e.kind == HistoryKind::TotalsReset)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Load history from storage; missing or corrupt data reads as empty
    pub fn load<S: BlobStore + ?Sized>(store: &S, limit: usize) -> Self {
        let mut history = load_json::<Self, _>(store, keys::HISTORY).unwrap_or_default();
        history.set_limit(limit);
        log::info!("Loaded {} history entries", history.len());
        history
    }

    pub fn save<S: BlobStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        save_json(store, keys::HISTORY, self)?;
        log::debug!("History saved ({} entries)", self.len());
        Ok(())
    }
}

/// Format a timestamp for the history list
#[cfg(target_arch = "wasm32")]
pub fn format_timestamp(timestamp: f64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
    String::from(date.to_locale_string("default", &wasm_bindgen::JsValue::UNDEFINED))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_timestamp(timestamp: f64) -> String {
    format!("{:.0}", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn key(s: &str) -> OutcomeKey {
        OutcomeKey::parse(s)
    }

    #[test]
    fn test_prepend_most_recent_first() {
        let mut h = History::new();
        h.prepend(HistoryEntry::spin(1.0, key("+1日")));
        h.prepend(HistoryEntry::spin(2.0, key("-1日")));
        assert_eq!(h.entries()[0].result, Some(key("-1日")));
        assert_eq!(h.entries()[1].timestamp, 1.0);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut h = History::new();
        for i in 0..150 {
            h.prepend(HistoryEntry::spin(i as f64, key("+1日")));
        }
        assert_eq!(h.len(), HISTORY_LIMIT);
        assert_eq!(h.entries()[0].timestamp, 149.0);
        assert_eq!(h.entries()[99].timestamp, 50.0);
    }

    #[test]
    fn test_mark_deleted() {
        let mut h = History::new();
        h.prepend(HistoryEntry::totals_reset(1.0));
        h.prepend(HistoryEntry::spin(2.0, key("+3日")));

        assert_eq!(h.mark_deleted(0), Ok(Some(key("+3日"))));
        assert!(h.entries()[0].deleted);
        assert_eq!(h.mark_deleted(0), Err(HistoryError::AlreadyDeleted(0)));
        assert_eq!(h.mark_deleted(1), Ok(None));
        assert_eq!(h.mark_deleted(5), Err(HistoryError::OutOfRange(5)));
        // Still listed
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_mark_deleted_before_reset_not_counted() {
        let mut h = History::new();
        h.prepend(HistoryEntry::spin(1.0, key("+1日")));
        h.prepend(HistoryEntry::totals_reset(2.0));
        h.prepend(HistoryEntry::spin(3.0, key("+1日")));

        assert_eq!(h.mark_deleted(2), Ok(None));
        assert!(h.entries()[2].deleted);
        assert_eq!(h.mark_deleted(0), Ok(Some(key("+1日"))));
    }

    #[test]
    fn test_set_limit_truncates() {
        let mut h = History::with_limit(10);
        for i in 0..10 {
            h.prepend(HistoryEntry::spin(i as f64, key("+1日")));
        }
        h.set_limit(3);
        assert_eq!(h.len(), 3);
        assert_eq!(h.entries()[0].timestamp, 9.0);
    }

    #[test]
    fn test_load_save_round_trip() {
        let mut store = MemoryStore::new();
        let mut h = History::new();
        h.prepend(HistoryEntry::spin(10.0, key("+1日")));
        h.prepend(HistoryEntry::totals_reset(20.0));
        h.mark_deleted(1).unwrap();
        h.save(&mut store).unwrap();
        assert_eq!(History::load(&store, HISTORY_LIMIT), h);
    }

    #[test]
    fn test_load_tolerates_missing_flags() {
        let mut store = MemoryStore::new();
        store
            .set(keys::HISTORY, r#"[{"timestamp":5.0,"result":"-2日"}]"#)
            .unwrap();
        let h = History::load(&store, HISTORY_LIMIT);
        assert_eq!(h.entries()[0].kind, HistoryKind::Spin);
        assert_eq!(h.entries()[0].result, Some(key("-2日")));
        assert!(!h.entries()[0].deleted);
    }

    #[test]
    fn test_saved_as_bare_array() {
        let mut store = MemoryStore::new();
        let mut h = History::new();
        h.prepend(HistoryEntry::spin(10.0, key("+1日")));
        h.save(&mut store).unwrap();
        let json = store.get(keys::HISTORY).unwrap();
        assert!(json.starts_with('['), "{}", json);
        assert!(!json.contains("\"time\""));
    }

    #[test]
    fn test_load_time_result_pairs() {
        let mut store = MemoryStore::new();
        store
            .set(
                keys::HISTORY,
                r#"[{"time":"2025/4/1 10:05:00","result":"-1日"},{"time":"2025/4/1 10:02:00","result":"合計をリセットしました"},{"time":"2025/4/1 10:00:00","result":"+1日"}]"#,
            )
            .unwrap();
        let mut h = History::load(&store, HISTORY_LIMIT);
        assert_eq!(h.len(), 3);
        assert_eq!(h.entries()[0].result, Some(key("-1日")));
        assert_eq!(h.entries()[0].display_time(), "2025/4/1 10:05:00");
        assert_eq!(h.entries()[1].kind, HistoryKind::TotalsReset);
        assert_eq!(h.entries()[1].result, None);
        assert_eq!(h.entries()[2].kind, HistoryKind::Spin);

        // New lines sit alongside the old ones and survive a save
        h.prepend(HistoryEntry::spin(1.0, key("+2日")));
        h.save(&mut store).unwrap();
        let reloaded = History::load(&store, HISTORY_LIMIT);
        assert_eq!(reloaded, h);
        assert_eq!(reloaded.entries()[3].time.as_deref(), Some("2025/4/1 10:00:00"));
    }

    #[test]
    fn test_describe() {
        assert_eq!(HistoryEntry::spin(0.0, key("+1日")).describe(), "+1日");
        assert_eq!(HistoryEntry::totals_reset(0.0).describe(), "Totals reset");
    }
}
