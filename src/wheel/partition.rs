//! Cumulative weight partition
//!
//! Turns a configuration's weights into consecutive `[lower, upper)` ranges.
//! Order follows the configuration's insertion order; sector layout and the
//! last-entry adjustment both depend on it.

use serde::{Deserialize, Serialize};

use super::arc::{WheelArc, arc_for};
use super::key::OutcomeKey;
use crate::error::PartitionError;

/// One outcome's slice of the cumulative weight line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionEntry {
    pub key: OutcomeKey,
    pub lower: u64,
    pub upper: u64,
}

impl PartitionEntry {
    #[inline]
    pub fn weight(&self) -> u64 {
        self.upper - self.lower
    }
}

/// Ordered cumulative ranges over all positive-weight entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightPartition {
    entries: Vec<PartitionEntry>,
    total: u64,
}

impl WeightPartition {
    /// Build from `(key, weight)` pairs. Entries with weight ≤ 0 are skipped,
    /// as is any entry that would push the total past `u64::MAX`.
    pub fn build(weights: &[(OutcomeKey, i64)]) -> Result<Self, PartitionError> {
        let mut entries = Vec::with_capacity(weights.len());
        let mut cumulative = 0u64;

        for (key, weight) in weights {
            let Ok(weight) = u64::try_from(*weight) else {
                continue;
            };
            if weight == 0 {
                continue;
            }
            let lower = cumulative;
            let Some(upper) = cumulative.checked_add(weight) else {
                log::warn!("Skipping {}: weight {} overflows the partition total", key, weight);
                continue;
            };
            cumulative = upper;
            entries.push(PartitionEntry {
                key: key.clone(),
                lower,
                upper: cumulative,
            });
        }

        if entries.is_empty() {
            return Err(PartitionError::EmptyOrZeroTotal);
        }

        Ok(Self {
            entries,
            total: cumulative,
        })
    }

    pub fn entries(&self) -> &[PartitionEntry] {
        &self.entries
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a built partition
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &OutcomeKey) -> Option<&PartitionEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Share of the total as a percentage
    pub fn percentage(&self, entry: &PartitionEntry) -> f64 {
        entry.weight() as f64 / self.total as f64 * 100.0
    }

    /// Lay the partition out as consecutive clockwise arcs starting at 0°
    pub fn arcs(&self) -> Vec<WheelArc> {
        self.entries
            .iter()
            .map(|e| {
                let (start_deg, end_deg) = arc_for(e.lower, e.upper, self.total);
                WheelArc {
                    key: e.key.clone(),
                    start_deg,
                    end_deg,
                }
            })
            .collect()
    }
}
