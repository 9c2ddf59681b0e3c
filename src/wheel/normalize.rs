//! Ratio validation for edited configurations
//!
//! Every saved configuration sums to exactly 100. When it does not, the
//! difference goes onto the last entry; if that would leave the last entry
//! at zero or below, the whole edit is rejected.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::key::{OutcomeKey, Sign};
use crate::consts::RATIO_TOTAL;
use crate::error::ConfigError;

/// One edited `(key, ratio)` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: OutcomeKey,
    pub weight: i64,
}

impl ConfigEntry {
    pub fn new(key: OutcomeKey, weight: i64) -> Self {
        Self { key, weight }
    }

    pub fn days(sign: Sign, days: u32, weight: i64) -> Self {
        Self::new(OutcomeKey::structured(sign, days), weight)
    }
}

/// Automatic change applied to the last entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub key: OutcomeKey,
    /// Sum before adjusting
    pub previous_total: i64,
    pub old_weight: i64,
    pub new_weight: i64,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ratios summed to {}%, so the last item \"{}\" was adjusted from {}% to {}%.",
            self.previous_total, self.key, self.old_weight, self.new_weight
        )
    }
}

/// Entries that sum to 100, plus the note when they were adjusted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub entries: Vec<ConfigEntry>,
    pub adjustment: Option<Adjustment>,
}

impl Normalized {
    pub fn total(&self) -> i64 {
        self.entries.iter().map(|e| e.weight).sum()
    }
}

/// Validate an edited entry list and bring its sum to 100.
///
/// Every ratio must be positive.
pub fn validate(entries: &[ConfigEntry]) -> Result<Normalized, ConfigError> {
    let Some(last) = entries.last() else {
        return Err(ConfigError::Empty);
    };

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(&entry.key) {
            return Err(ConfigError::DuplicateKey(entry.key.clone()));
        }
    }

    let mut total = 0i64;
    for entry in entries {
        if entry.weight <= 0 {
            return Err(ConfigError::InvalidRatio(entry.weight));
        }
        total = total.checked_add(entry.weight).ok_or(ConfigError::RatioOverflow)?;
    }
    if total == RATIO_TOTAL {
        return Ok(Normalized {
            entries: entries.to_vec(),
            adjustment: None,
        });
    }

    let adjusted = last.weight + (RATIO_TOTAL - total);
    if adjusted <= 0 {
        return Err(ConfigError::InfeasibleAdjustment {
            total,
            last_key: last.key.clone(),
        });
    }

    let mut normalized = entries.to_vec();
    let last_index = normalized.len() - 1;
    normalized[last_index].weight = adjusted;

    Ok(Normalized {
        entries: normalized,
        adjustment: Some(Adjustment {
            key: last.key.clone(),
            previous_total: total,
            old_weight: last.weight,
            new_weight: adjusted,
        }),
    })
}
