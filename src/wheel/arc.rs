//! Sector arc geometry on a 360° wheel
//!
//! Angles are degrees with 0° at 3 o'clock, increasing clockwise (screen
//! space). Sectors are laid out consecutively from 0° in partition order.

use serde::{Deserialize, Serialize};

use super::key::OutcomeKey;
use crate::consts::FULL_TURN_DEG;
use crate::normalize_deg;

/// Below this a difference counts as zero
const ANGLE_EPSILON: f64 = 1e-9;

/// A wheel sector in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelArc {
    pub key: OutcomeKey,
    /// Start angle, [0, 360)
    pub start_deg: f64,
    /// End angle, (start, start + sector]; the last sector ends at exactly 360
    pub end_deg: f64,
}

impl WheelArc {
    /// Angular span of the arc (handles wraparound, full circle = 360)
    pub fn span_deg(&self) -> f64 {
        clockwise_delta(self.start_deg, self.end_deg)
    }

    /// Mid-angle of the arc, measured clockwise from the start
    pub fn mid_deg(&self) -> f64 {
        self.start_deg + self.span_deg() / 2.0
    }

    /// Check if an angle is within the arc's angular extent
    pub fn contains_angle(&self, deg: f64) -> bool {
        is_between(deg, self.start_deg, self.end_deg)
    }
}

/// Map a cumulative weight range to on-circle degrees
#[inline]
pub fn arc_for(lower: u64, upper: u64, total: u64) -> (f64, f64) {
    let scale = FULL_TURN_DEG / total as f64;
    (lower as f64 * scale, upper as f64 * scale)
}

/// Clockwise distance from `from` to `to`, in (0, 360].
///
/// A zero difference is a full circle, never a zero-width sector.
pub fn clockwise_delta(from: f64, to: f64) -> f64 {
    let mut diff = (to - from) % FULL_TURN_DEG;
    if diff < 0.0 {
        diff += FULL_TURN_DEG;
    }
    if diff < ANGLE_EPSILON || diff >= FULL_TURN_DEG {
        FULL_TURN_DEG
    } else {
        diff
    }
}

/// Membership test on the half-open arc `[start, end)`.
///
/// `start > end` (after normalization) crosses the seam and is treated as
/// `[start, 360) ∪ [0, end)`. An arc covering a whole turn contains every
/// angle.
pub fn is_between(angle: f64, start: f64, end: f64) -> bool {
    if (end - start).abs() >= FULL_TURN_DEG - ANGLE_EPSILON {
        return true;
    }

    let angle = normalize_deg(angle);
    let start = normalize_deg(start);
    let end = normalize_deg(end);

    if start < end {
        angle >= start && angle < end
    } else if start > end {
        // Wraparound case (e.g., start=350°, end=10°)
        angle >= start || angle < end
    } else {
        false
    }
}

/// Find the arc containing `deg`
pub fn arc_at(arcs: &[WheelArc], deg: f64) -> Option<&WheelArc> {
    arcs.iter().find(|a| a.contains_angle(deg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arc(start: f64, end: f64) -> WheelArc {
        WheelArc {
            key: OutcomeKey::Freeform("x".into()),
            start_deg: start,
            end_deg: end,
        }
    }

    #[test]
    fn test_is_between_no_wrap() {
        assert!(is_between(10.0, 10.0, 50.0));
        assert!(is_between(49.999, 10.0, 50.0));
        assert!(!is_between(50.0, 10.0, 50.0));
        assert!(!is_between(5.0, 10.0, 50.0));
    }

    #[test]
    fn test_is_between_wraparound() {
        assert!(is_between(5.0, 350.0, 10.0));
        assert!(is_between(350.0, 350.0, 10.0));
        assert!(is_between(359.9, 350.0, 10.0));
        assert!(!is_between(180.0, 350.0, 10.0));
        assert!(!is_between(10.0, 350.0, 10.0));
    }

    #[test]
    fn test_is_between_last_sector_closes_at_360() {
        // Last sector [180, 360) normalizes its end to 0
        assert!(is_between(270.0, 180.0, 360.0));
        assert!(is_between(359.999, 180.0, 360.0));
        assert!(!is_between(0.0, 180.0, 360.0));
        assert!(!is_between(90.0, 180.0, 360.0));
    }

    #[test]
    fn test_is_between_full_circle() {
        assert!(is_between(0.0, 0.0, 360.0));
        assert!(is_between(123.4, 0.0, 360.0));
        assert!(is_between(-1.0, 0.0, 360.0));
    }

    #[test]
    fn test_is_between_unnormalized_inputs() {
        assert!(is_between(-355.0, 350.0, 10.0));
        assert!(is_between(725.0, -10.0, 10.0));
    }

    #[test]
    fn test_clockwise_delta() {
        assert_eq!(clockwise_delta(10.0, 50.0), 40.0);
        assert_eq!(clockwise_delta(350.0, 10.0), 20.0);
        assert_eq!(clockwise_delta(0.0, 360.0), 360.0);
        assert_eq!(clockwise_delta(90.0, 90.0), 360.0);
        assert_eq!(clockwise_delta(50.0, 10.0), 320.0);
    }

    #[test]
    fn test_arc_for() {
        assert_eq!(arc_for(0, 25, 100), (0.0, 90.0));
        assert_eq!(arc_for(25, 100, 100), (90.0, 360.0));
        let (s, e) = arc_for(1, 2, 3);
        assert!((s - 120.0).abs() < 1e-9 && (e - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_mid_deg() {
        assert_eq!(arc(0.0, 90.0).mid_deg(), 45.0);
        assert_eq!(arc(0.0, 360.0).mid_deg(), 180.0);
        assert_eq!(arc(350.0, 10.0).mid_deg(), 360.0);
    }

    #[test]
    fn test_arc_at() {
        let arcs = vec![arc(0.0, 90.0), arc(90.0, 360.0)];
        assert_eq!(arc_at(&arcs, 0.0).unwrap().start_deg, 0.0);
        assert_eq!(arc_at(&arcs, 90.0).unwrap().start_deg, 90.0);
        assert_eq!(arc_at(&arcs, 359.0).unwrap().start_deg, 90.0);
    }

    proptest! {
        #[test]
        fn prop_normalize_range(a in -1.0e6f64..1.0e6) {
            let n = normalize_deg(a);
            prop_assert!((0.0..360.0).contains(&n));
        }

        #[test]
        fn prop_clockwise_delta_range(a in -720.0f64..720.0, b in -720.0f64..720.0) {
            let d = clockwise_delta(a, b);
            prop_assert!(d > 0.0 && d <= 360.0);
        }

        #[test]
        fn prop_start_is_member(start in 0.0f64..360.0, span in 0.001f64..359.0) {
            prop_assert!(is_between(start, start, start + span));
        }
    }
}
