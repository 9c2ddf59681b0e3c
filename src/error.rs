//! Error types for wheel configuration, spinning and storage

use thiserror::Error;

use crate::wheel::OutcomeKey;

/// Partition construction failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// No entry with a positive weight
    #[error("no entries with a positive weight")]
    EmptyOrZeroTotal,
}

/// Rejected configuration edit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// At least one item is required
    #[error("at least one item is required")]
    Empty,

    /// Two items share the same key
    #[error("duplicate item: {0}")]
    DuplicateKey(OutcomeKey),

    /// Adjusting the last ratio would leave it at zero or below
    #[error(
        "ratios sum to {total}%; adjusting the last item \"{last_key}\" cannot reach 100% without dropping to 0% or below"
    )]
    InfeasibleAdjustment { total: i64, last_key: OutcomeKey },

    /// Day count must be zero or more
    #[error("days must be 0 or more, got {0}")]
    InvalidDays(i64),

    /// Ratio must lie in 1..=100
    #[error("ratio must be between 1 and 100, got {0}")]
    InvalidRatio(i64),

    /// Ratios too large to add up
    #[error("ratios are too large to add up")]
    RatioOverflow,

    /// Edit buffer index out of range
    #[error("no item at index {0}")]
    NoSuchItem(usize),

    /// Roulette name is empty after trimming
    #[error("roulette name is empty")]
    EmptyName,

    /// Roulette name already taken
    #[error("a roulette named \"{0}\" already exists")]
    NameTaken(String),

    /// No roulette with this name
    #[error("unknown roulette \"{0}\"")]
    UnknownRoulette(String),

    /// The default roulette is permanent
    #[error("the default roulette cannot be deleted")]
    DefaultUndeletable,
}

/// Refused or invalid spin request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpinError {
    /// Another spin is still animating
    #[error("a spin is already in progress")]
    InProgress,

    /// Selected roulette has no entries at all
    #[error("roulette \"{0}\" is empty")]
    EmptyConfiguration(String),

    /// Selected roulette has entries, but none with a positive weight
    #[error("roulette \"{0}\" has no valid items")]
    NoValidEntries(String),

    /// Completion reported while idle
    #[error("no spin is in progress")]
    NotSpinning,

    /// Completion reported for a spin that is not the one in flight
    #[error("spin {got} is not the active spin {active}")]
    StaleHandle { active: u64, got: u64 },
}

/// History edit failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("no history entry at index {0}")]
    OutOfRange(usize),

    #[error("history entry {0} is already deleted")]
    AlreadyDeleted(usize),
}

/// Blob storage failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage backend not reachable (no window, storage disabled)
    #[error("storage unavailable")]
    Unavailable,

    /// Backend refused the write (quota, private mode)
    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },

    /// Value could not be encoded
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Any failure surfaced by a session operation
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Spin(#[from] SpinError),

    #[error(transparent)]
    History(#[from] HistoryError),

    /// The in-memory change was applied but could not be saved
    #[error("save failed: {0}")]
    Store(#[from] StoreError),
}
