//! In-progress edit of the selected roulette
//!
//! The buffer is only replaced after a successful commit, so a rejected
//! edit leaves the user's rows in place for correction.

use crate::consts::RATIO_TOTAL;
use crate::error::ConfigError;
use crate::roulettes::Configuration;
use crate::wheel::{ConfigEntry, Normalized, OutcomeKey, Sign, validate};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    items: Vec<ConfigEntry>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing a stored configuration. Only `±N日` rows are editable;
    /// other keys are skipped.
    pub fn load_from(config: &Configuration) -> Self {
        let items = config
            .entries()
            .iter()
            .filter_map(|(key, weight)| {
                if key.is_structured() {
                    Some(ConfigEntry::new(key.clone(), *weight))
                } else {
                    log::warn!("Ignoring non-editable item {}: {}", key, weight);
                    None
                }
            })
            .collect();
        Self { items }
    }

    /// Append a row. Duplicates are only caught on commit.
    pub fn add_item(&mut self, sign: Sign, days: i64, ratio: i64) -> Result<(), ConfigError> {
        let days = u32::try_from(days).map_err(|_| ConfigError::InvalidDays(days))?;
        if !(1..=RATIO_TOTAL).contains(&ratio) {
            return Err(ConfigError::InvalidRatio(ratio));
        }
        self.items.push(ConfigEntry::new(OutcomeKey::structured(sign, days), ratio));
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<ConfigEntry, ConfigError> {
        if index >= self.items.len() {
            return Err(ConfigError::NoSuchItem(index));
        }
        Ok(self.items.remove(index))
    }

    pub fn items(&self) -> &[ConfigEntry] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Validate without touching the buffer
    pub fn normalized(&self) -> Result<Normalized, ConfigError> {
        validate(&self.items)
    }

    pub(crate) fn replace(&mut self, items: Vec<ConfigEntry>) {
        self.items = items;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_validation() {
        let mut buf = EditBuffer::new();
        assert_eq!(buf.add_item(Sign::Plus, -1, 10), Err(ConfigError::InvalidDays(-1)));
        assert_eq!(buf.add_item(Sign::Plus, 1, 0), Err(ConfigError::InvalidRatio(0)));
        assert_eq!(buf.add_item(Sign::Plus, i64::MAX, 5), Err(ConfigError::InvalidDays(i64::MAX)));
        assert!(buf.is_empty());

        buf.add_item(Sign::Minus, 0, 5).unwrap();
        assert_eq!(buf.items()[0].key.to_string(), "-0日");
    }

    #[test]
    fn test_add_item_ratio_bounds() {
        let mut buf = EditBuffer::new();
        assert_eq!(buf.add_item(Sign::Plus, 1, i64::MAX), Err(ConfigError::InvalidRatio(i64::MAX)));
        assert_eq!(buf.add_item(Sign::Plus, 1, 101), Err(ConfigError::InvalidRatio(101)));
        assert!(buf.is_empty());

        buf.add_item(Sign::Plus, 1, 100).unwrap();
        buf.add_item(Sign::Minus, 1, 1).unwrap();
        // 101 in total: the last row absorbs the difference and hits zero
        assert!(matches!(buf.normalized(), Err(ConfigError::InfeasibleAdjustment { .. })));
    }

    #[test]
    fn test_stored_zero_ratio_cannot_be_committed() {
        let config: Configuration = serde_json::from_str(r#"{"+1日": 0, "-1日": 100}"#).unwrap();
        let buf = EditBuffer::load_from(&config);
        assert_eq!(buf.items().len(), 2);
        assert_eq!(buf.normalized(), Err(ConfigError::InvalidRatio(0)));
    }

    #[test]
    fn test_remove_item() {
        let mut buf = EditBuffer::new();
        buf.add_item(Sign::Plus, 1, 50).unwrap();
        buf.add_item(Sign::Plus, 2, 50).unwrap();
        let removed = buf.remove_item(0).unwrap();
        assert_eq!(removed.key.to_string(), "+1日");
        assert_eq!(buf.remove_item(3), Err(ConfigError::NoSuchItem(3)));
        assert_eq!(buf.items().len(), 1);
    }

    #[test]
    fn test_load_from_skips_freeform() {
        let config: Configuration =
            serde_json::from_str(r#"{"+1日": 40, "禁酒継続": 20, "-1日": 40}"#).unwrap();
        let buf = EditBuffer::load_from(&config);
        let keys: Vec<_> = buf.items().iter().map(|e| e.key.to_string()).collect();
        assert_eq!(keys, vec!["+1日", "-1日"]);
    }

    #[test]
    fn test_normalized_does_not_mutate() {
        let mut buf = EditBuffer::new();
        buf.add_item(Sign::Plus, 1, 30).unwrap();
        let n = buf.normalized().unwrap();
        assert_eq!(n.entries[0].weight, 100);
        assert_eq!(buf.items()[0].weight, 30);
    }
}
