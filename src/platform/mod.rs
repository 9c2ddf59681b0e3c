//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (history timestamps)
//! - RNG seeding

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed for the spin RNG
pub fn entropy_seed() -> u64 {
    let seed = rand::random::<u64>();
    log::debug!("RNG seeded with {}", seed);
    seed
}
