//! Wheel rendering seam
//!
//! The core only hands a renderer arcs and a target rotation. Rotations use
//! the renderer's convention: positive = counter-clockwise degrees.

pub mod shapes;
#[cfg(target_arch = "wasm32")]
pub mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::DomRenderer;
pub use shapes::{SectorShape, wheel_markup, wheel_shapes};

use crate::wheel::WeightPartition;

/// Something that can draw the wheel and rotate it
pub trait WheelRenderer {
    /// Redraw all sectors at rotation 0
    fn draw(&mut self, partition: Option<&WeightPartition>);
    /// Instantaneous rendered rotation
    fn rotation_deg(&self) -> f64;
    /// Jump to a rotation without animating
    fn snap_to(&mut self, rotation_deg: f64);
    /// Start animating to a rotation
    fn animate_to(&mut self, rotation_deg: f64, duration_ms: u32);
}

/// Rotation in degrees from a computed CSS transform such as
/// `matrix(a, b, c, d, tx, ty)`; `none` reads as 0.
///
/// The matrix only carries the angle modulo one turn.
pub fn rotation_from_matrix(transform: &str) -> Option<f64> {
    let transform = transform.trim();
    if transform.is_empty() || transform == "none" {
        return Some(0.0);
    }
    let inner = transform.strip_prefix("matrix(")?.strip_suffix(')')?;
    let mut values = inner.split(',').map(|v| v.trim().parse::<f64>());
    let a = values.next()?.ok()?;
    let b = values.next()?.ok()?;
    Some(b.atan2(a).to_degrees())
}

/// What ended the wait for a spin animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionCause {
    /// The renderer reported the animation finished
    AnimationEnd,
    /// The fallback timer fired first
    Timeout,
}

/// Races the animation-end signal against the fallback timer.
///
/// Whichever arrives first completes the spin; the other is ignored.
#[derive(Debug, Default)]
pub struct CompletionLatch {
    fired: Option<CompletionCause>,
}

impl CompletionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a signal; returns the cause only for the first one
    pub fn fire(&mut self, cause: CompletionCause) -> Option<CompletionCause> {
        if self.fired.is_some() {
            return None;
        }
        if cause == CompletionCause::Timeout {
            log::warn!("Spin animation did not report completion, forcing it");
        }
        self.fired = Some(cause);
        Some(cause)
    }

    pub fn fired(&self) -> Option<CompletionCause> {
        self.fired
    }
}

/// Headless renderer for native runs and tests.
///
/// Animations land instantly on the target, plus an optional drift that
/// stands in for transform read-back imprecision.
#[derive(Debug, Default)]
pub struct SimulatedRenderer {
    rotation_deg: f64,
    /// Added to every animation target
    pub drift_deg: f64,
    /// When false the animation never reports its end
    pub reports_completion: bool,
    sectors: usize,
    pending_end: bool,
}

impl SimulatedRenderer {
    pub fn new() -> Self {
        Self {
            reports_completion: true,
            ..Default::default()
        }
    }

    pub fn sectors(&self) -> usize {
        self.sectors
    }

    /// Deliver the animation-end signal if one is due
    pub fn poll_animation_end(&mut self) -> Option<CompletionCause> {
        if std::mem::take(&mut self.pending_end) && self.reports_completion {
            Some(CompletionCause::AnimationEnd)
        } else {
            None
        }
    }
}

impl WheelRenderer for SimulatedRenderer {
    fn draw(&mut self, partition: Option<&WeightPartition>) {
        self.sectors = partition.map(|p| p.len()).unwrap_or(0);
        self.rotation_deg = 0.0;
    }

    fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    fn snap_to(&mut self, rotation_deg: f64) {
        self.rotation_deg = rotation_deg;
    }

    fn animate_to(&mut self, rotation_deg: f64, _duration_ms: u32) {
        self.rotation_deg = rotation_deg + self.drift_deg;
        self.pending_end = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_from_matrix() {
        assert_eq!(rotation_from_matrix("none"), Some(0.0));
        assert_eq!(rotation_from_matrix("matrix(1, 0, 0, 1, 0, 0)"), Some(0.0));
        let quarter = rotation_from_matrix("matrix(0, 1, -1, 0, 0, 0)").unwrap();
        assert!((quarter - 90.0).abs() < 1e-9);
        let back = rotation_from_matrix("matrix(0.707107, -0.707107, 0.707107, 0.707107, 0, 0)").unwrap();
        assert!((back + 45.0).abs() < 1e-3);
        assert_eq!(rotation_from_matrix("matrix3d(1, 0)"), None);
        assert_eq!(rotation_from_matrix("matrix(x, 0, 0, 1, 0, 0)"), None);
    }

    #[test]
    fn test_latch_first_signal_wins() {
        let mut latch = CompletionLatch::new();
        assert_eq!(latch.fire(CompletionCause::AnimationEnd), Some(CompletionCause::AnimationEnd));
        assert_eq!(latch.fire(CompletionCause::Timeout), None);
        assert_eq!(latch.fired(), Some(CompletionCause::AnimationEnd));
    }

    #[test]
    fn test_latch_timeout_first() {
        let mut latch = CompletionLatch::new();
        assert_eq!(latch.fire(CompletionCause::Timeout), Some(CompletionCause::Timeout));
        assert_eq!(latch.fire(CompletionCause::AnimationEnd), None);
    }

    #[test]
    fn test_simulated_renderer() {
        let mut r = SimulatedRenderer::new();
        r.drift_deg = 0.5;
        r.animate_to(-3700.0, 5000);
        assert_eq!(r.rotation_deg(), -3699.5);
        assert_eq!(r.poll_animation_end(), Some(CompletionCause::AnimationEnd));
        assert_eq!(r.poll_animation_end(), None);

        r.reports_completion = false;
        r.animate_to(-3600.0, 5000);
        assert_eq!(r.poll_animation_end(), None);
    }
}
