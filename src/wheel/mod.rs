//! Weighted selection and angle reconciliation
//!
//! Everything here is pure: no storage, no rendering, no platform calls.
//! Randomness comes in through a caller-supplied `rand::Rng` so runs can be
//! replayed from a seed.

pub mod arc;
pub mod key;
pub mod normalize;
pub mod partition;
pub mod reconcile;
pub mod select;
pub mod target;

pub use arc::{WheelArc, arc_at, arc_for, clockwise_delta, is_between};
pub use key::{OutcomeKey, Sign, to_full_width};
pub use normalize::{Adjustment, ConfigEntry, Normalized, validate};
pub use partition::{PartitionEntry, WeightPartition};
pub use reconcile::{SpinResult, marker_points_to, reconcile};
pub use select::{select, select_with_sample};
pub use target::{SpinTarget, TargetParams, compute_target, compute_target_with_jitter};
