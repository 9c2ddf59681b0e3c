//! Final wheel rotation for a drawn outcome
//!
//! The renderer's rotation is positive counter-clockwise, so the clockwise
//! offset that brings the arc under the marker is negated before the base
//! turns are added.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arc::WheelArc;
use crate::normalize_deg;

/// Jitter may use at most this fraction of the half-span on either side of the mid-angle
const JITTER_ARC_FRACTION: f64 = 0.8;

/// Rotation parameters, taken from settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetParams {
    /// Marker reference angle (clockwise from 3 o'clock)
    pub marker_deg: f64,
    /// Full turns added to every spin, in renderer sign convention
    pub base_rotation_deg: f64,
    /// Full width of the cosmetic jitter window
    pub jitter_range_deg: f64,
}

/// Where the wheel should stop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinTarget {
    /// Clockwise wheel offset in [0, 360) that puts the (jittered) arc point under the marker
    pub final_cw_deg: f64,
    /// Applied jitter
    pub jitter_deg: f64,
    /// Rotation to animate to, renderer convention
    pub rotation_deg: f64,
}

/// Largest jitter magnitude that stays inside the arc
pub fn jitter_limit(arc: &WheelArc, jitter_range_deg: f64) -> f64 {
    let half_window = (jitter_range_deg / 2.0).max(0.0);
    let half_span = arc.span_deg() / 2.0 * JITTER_ARC_FRACTION;
    half_window.min(half_span)
}

/// Compute the rotation target for an arc with a random jitter
pub fn compute_target<R: Rng + ?Sized>(arc: &WheelArc, params: &TargetParams, rng: &mut R) -> SpinTarget {
    let limit = jitter_limit(arc, params.jitter_range_deg);
    // Uniform in [-limit, limit)
    let jitter = (rng.random::<f64>() - 0.5) * 2.0 * limit;
    compute_target_with_jitter(arc, params, jitter)
}

/// Compute the rotation target for an arc with a given jitter
pub fn compute_target_with_jitter(arc: &WheelArc, params: &TargetParams, jitter_deg: f64) -> SpinTarget {
    let mid = arc.mid_deg();
    let offset_to_marker = normalize_deg(params.marker_deg - mid);
    let final_cw_deg = normalize_deg(offset_to_marker + jitter_deg);

    SpinTarget {
        final_cw_deg,
        jitter_deg,
        rotation_deg: -final_cw_deg + params.base_rotation_deg,
    }
}
