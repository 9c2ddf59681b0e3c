//! Geometric cross-check of a finished spin
//!
//! The drawn key is always what gets recorded. The geometric read-back only
//! flags rendering drift.

use serde::{Deserialize, Serialize};

use super::arc::{WheelArc, arc_at};
use super::key::OutcomeKey;
use crate::normalize_deg;

/// Outcome of one spin, consumed right after the spin finishes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Key drawn by the selector (authoritative)
    pub determined_key: OutcomeKey,
    /// Key the marker geometrically points at, if any arc contains it
    pub actual_pointed_key: Option<OutcomeKey>,
    /// Rotation read back from the renderer
    pub final_rotation_deg: f64,
}

impl SpinResult {
    pub fn is_consistent(&self) -> bool {
        self.actual_pointed_key.as_ref() == Some(&self.determined_key)
    }
}

/// Wheel angle under the marker for a renderer rotation (counter-clockwise positive)
pub fn marker_points_to(rotation_deg: f64, marker_deg: f64) -> f64 {
    let wheel_cw = normalize_deg(-rotation_deg);
    normalize_deg(marker_deg - wheel_cw)
}

/// Compare the rendered stop against the drawn key
pub fn reconcile(
    determined_key: &OutcomeKey,
    final_rotation_deg: f64,
    arcs: &[WheelArc],
    marker_deg: f64,
) -> SpinResult {
    let pointed_deg = marker_points_to(final_rotation_deg, marker_deg);
    let actual_pointed_key = arc_at(arcs, pointed_deg).map(|a| a.key.clone());

    let result = SpinResult {
        determined_key: determined_key.clone(),
        actual_pointed_key,
        final_rotation_deg,
    };

    if !result.is_consistent() {
        log::warn!(
            "Spin result mismatch: determined={}, actual={}. Using determined result.",
            result.determined_key,
            result
                .actual_pointed_key
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "none".to_string())
        );
        log::debug!(
            "Marker points to {:.2}°, wheel rotation {:.2}°",
            pointed_deg,
            normalize_deg(-final_rotation_deg)
        );
    }

    result
}
