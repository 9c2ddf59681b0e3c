//! Wheel settings and preferences
//!
//! Read from LocalStorage at startup, separately from roulettes/totals/history.
//! The page never writes them; absent or unreadable settings use the defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{BlobStore, keys, load_json};
use crate::wheel::TargetParams;

/// Wheel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelSettings {
    // === Geometry ===
    /// Marker angle (0° = 3 o'clock, clockwise)
    pub marker_deg: f64,
    /// Full turns added to every spin (renderer convention)
    pub base_rotation_deg: f64,
    /// Full width of the cosmetic stop jitter
    pub jitter_range_deg: f64,

    // === Timing ===
    /// Spin animation length
    pub spin_duration_ms: u32,
    /// Extra wait before the fallback timer forces completion
    pub completion_grace_ms: u32,

    // === Records ===
    /// History entries kept
    pub history_limit: usize,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            marker_deg: MARKER_POSITION_DEG,
            base_rotation_deg: BASE_ROTATION_DEG,
            jitter_range_deg: JITTER_RANGE_DEG,

            spin_duration_ms: SPIN_DURATION_MS,
            completion_grace_ms: COMPLETION_GRACE_MS,

            history_limit: HISTORY_LIMIT,
        }
    }
}

impl WheelSettings {
    /// Rotation parameters for the target calculator
    pub fn target_params(&self) -> TargetParams {
        TargetParams {
            marker_deg: self.marker_deg,
            base_rotation_deg: self.base_rotation_deg,
            jitter_range_deg: self.jitter_range_deg.max(0.0),
        }
    }

    /// When the fallback timer fires, measured from the spin start
    pub fn completion_timeout_ms(&self) -> u32 {
        self.spin_duration_ms.saturating_add(self.completion_grace_ms)
    }

    /// Load settings from storage, falling back to defaults
    pub fn load<S: BlobStore + ?Sized>(store: &S) -> Self {
        match load_json(store, keys::SETTINGS) {
            Some(settings) => {
                log::info!("Loaded settings from storage");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_match_constants() {
        let s = WheelSettings::default();
        assert_eq!(s.marker_deg, 270.0);
        assert_eq!(s.base_rotation_deg, -3600.0);
        assert_eq!(s.spin_duration_ms, 5000);
        assert_eq!(s.history_limit, 100);
        assert_eq!(s.completion_timeout_ms(), 5250);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::SETTINGS, r#"{"jitter_range_deg": 4.0}"#).unwrap();
        let s = WheelSettings::load(&store);
        assert_eq!(s.jitter_range_deg, 4.0);
        assert_eq!(s.marker_deg, MARKER_POSITION_DEG);
    }

    #[test]
    fn test_negative_jitter_clamped() {
        let s = WheelSettings {
            jitter_range_deg: -3.0,
            ..Default::default()
        };
        assert_eq!(s.target_params().jitter_range_deg, 0.0);
    }

    #[test]
    fn test_unreadable_settings_use_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::SETTINGS, "not json").unwrap();
        assert_eq!(WheelSettings::load(&store), WheelSettings::default());

        // Fields from older versions are ignored
        store
            .set(keys::SETTINGS, r#"{"preset": "Quick", "spin_duration_ms": 2500}"#)
            .unwrap();
        let s = WheelSettings::load(&store);
        assert_eq!(s.spin_duration_ms, 2500);
        assert_eq!(s.base_rotation_deg, BASE_ROTATION_DEG);
    }
}
