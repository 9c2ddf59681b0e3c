//! Day Roulette - A weighted roulette wheel for the browser
//!
//! Core modules:
//! - `wheel`: Weighted selection and angle reconciliation (pure, deterministic given an RNG)
//! - `session`: Process-wide state and the two-phase spin lifecycle
//! - `roulettes`: Named configurations, `edit`: in-progress edits
//! - `bootstrap`: First-run import of the bundled configuration
//! - `renderer`: Sector shapes and the renderer seam
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Key-value blob storage (LocalStorage on web)

pub mod bootstrap;
pub mod edit;
pub mod error;
pub mod history;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod roulettes;
pub mod session;
pub mod settings;
pub mod totals;
pub mod wheel;

pub use edit::EditBuffer;
pub use error::{ConfigError, HistoryError, PartitionError, SessionError, SpinError, StoreError};
pub use history::{History, HistoryEntry, HistoryKind};
pub use roulettes::{Configuration, Roulettes};
pub use session::{PendingSpin, Session, SpinHandle, SpinOutcome};
pub use settings::WheelSettings;
pub use totals::Totals;
pub use wheel::{OutcomeKey, Sign, SpinResult, WeightPartition, WheelArc};

use glam::DVec2;

/// Wheel configuration constants
pub mod consts {
    /// Name of the roulette that can never be deleted
    pub const DEFAULT_ROULETTE_NAME: &str = "default";

    /// Marker angle (top of the wheel; 0° = 3 o'clock, clockwise positive)
    pub const MARKER_POSITION_DEG: f64 = 270.0;
    /// Minimum travel per spin (10 turns, renderer positive = counter-clockwise)
    pub const BASE_ROTATION_DEG: f64 = -3600.0;
    /// Spin animation length
    pub const SPIN_DURATION_MS: u32 = 5000;
    /// Extra wait after the animation before the fallback timer forces completion
    pub const COMPLETION_GRACE_MS: u32 = 250;
    /// Full width of the cosmetic stop jitter (±5°)
    pub const JITTER_RANGE_DEG: f64 = 10.0;

    /// Every saved configuration's ratios sum to this
    pub const RATIO_TOTAL: i64 = 100;
    /// Maximum history entries kept
    pub const HISTORY_LIMIT: usize = 100;

    pub const FULL_TURN_DEG: f64 = 360.0;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_deg(angle: f64) -> f64 {
    let turn = consts::FULL_TURN_DEG;
    let wrapped = angle % turn;
    let wrapped = if wrapped < 0.0 { wrapped + turn } else { wrapped };
    // Tiny negatives round up to a full turn
    if wrapped >= turn { 0.0 } else { wrapped }
}

/// Convert polar (r, degrees) to cartesian (x, y), y pointing down like screen space
#[inline]
pub fn polar_to_cartesian(r: f64, deg: f64) -> DVec2 {
    let theta = deg.to_radians();
    DVec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_deg() {
        assert_eq!(normalize_deg(0.0), 0.0);
        assert_eq!(normalize_deg(360.0), 0.0);
        assert_eq!(normalize_deg(-90.0), 270.0);
        assert_eq!(normalize_deg(-3690.0), 270.0);
        assert_eq!(normalize_deg(725.0), 5.0);
        assert_eq!(normalize_deg(-1e-15), 0.0);
    }

    #[test]
    fn test_polar_to_cartesian() {
        let p = polar_to_cartesian(10.0, 90.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 10.0).abs() < 1e-9);
    }
}
