//! Weighted outcome draw
//!
//! One uniform sample in [0, total), first-match scan over the cumulative
//! upper bounds.

use rand::Rng;

use super::key::OutcomeKey;
use super::partition::WeightPartition;

/// Draw one outcome from the partition
pub fn select<'a, R: Rng + ?Sized>(partition: &'a WeightPartition, rng: &mut R) -> &'a OutcomeKey {
    let sample = rng.random::<f64>() * partition.total() as f64;
    select_with_sample(partition, sample)
}

/// Resolve a sample in [0, total) to an outcome.
///
/// A sample at or past the last upper bound (floating-point drift) resolves
/// to the last entry.
pub fn select_with_sample(partition: &WeightPartition, sample: f64) -> &OutcomeKey {
    let entries = partition.entries();

    for entry in entries {
        if sample < entry.upper as f64 {
            return &entry.key;
        }
    }

    log::warn!(
        "Sample {} past partition total {}, falling back to last entry",
        sample,
        partition.total()
    );
    // Partitions are never empty once built
    &entries[entries.len() - 1].key
}
