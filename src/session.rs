//! Process-wide wheel state and the two-phase spin lifecycle
//!
//! A spin is split in two so the animation can run between the halves:
//! `begin_spin` draws the outcome and hands back a target, `complete_spin`
//! reconciles the stop and records the result. Totals and history are only
//! touched in the second half.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{DEFAULT_ROULETTE_NAME, FULL_TURN_DEG};
use crate::edit::EditBuffer;
use crate::error::{ConfigError, SessionError, SpinError, StoreError};
use crate::history::{History, HistoryEntry};
use crate::persistence::BlobStore;
use crate::renderer::{CompletionCause, CompletionLatch, SimulatedRenderer, WheelRenderer};
use crate::roulettes::{Configuration, Roulettes};
use crate::settings::WheelSettings;
use crate::totals::Totals;
use crate::wheel::{
    Adjustment, OutcomeKey, SpinResult, SpinTarget, WeightPartition, WheelArc, compute_target,
    reconcile, select,
};

/// Identifies one spin; completion must present the handle of the spin in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpinHandle(u64);

impl SpinHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Everything the shell needs to animate a spin
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSpin {
    pub handle: SpinHandle,
    /// Snap to this rotation (current rotation modulo one turn) before animating
    pub reset_deg: f64,
    pub target: SpinTarget,
    pub duration_ms: u32,
    /// Fallback timer for a missing animation-end signal
    pub timeout_ms: u32,
    pub determined: OutcomeKey,
}

impl PendingSpin {
    pub fn target_deg(&self) -> f64 {
        self.target.rotation_deg
    }
}

/// A finished spin
#[derive(Debug)]
pub struct SpinOutcome {
    pub result: SpinResult,
    /// Set when totals or history could not be saved; the in-memory update stands
    pub persist_error: Option<StoreError>,
}

#[derive(Debug)]
enum SpinPhase {
    Idle,
    Spinning {
        handle: SpinHandle,
        determined: OutcomeKey,
        arcs: Vec<WheelArc>,
    },
}

/// Wheel state shared by every UI action
pub struct Session<S: BlobStore> {
    store: S,
    roulettes: Roulettes,
    current: String,
    totals: Totals,
    history: History,
    settings: WheelSettings,
    rng: Pcg32,
    phase: SpinPhase,
    next_handle: u64,
}

impl<S: BlobStore> Session<S> {
    /// Load everything from the store
    pub fn open(store: S, seed: u64) -> Self {
        let roulettes = Roulettes::load(&store);
        Self::with_roulettes(store, roulettes, seed)
    }

    /// Build a session around roulettes produced by bootstrap
    pub fn with_roulettes(store: S, roulettes: Roulettes, seed: u64) -> Self {
        let roulettes = if roulettes.is_empty() {
            log::warn!("No roulettes loaded, starting with an empty default");
            Roulettes::with_empty_default()
        } else {
            roulettes
        };
        let settings = WheelSettings::load(&store);
        let totals = Totals::load(&store);
        let history = History::load(&store, settings.history_limit);
        let current = initial_selection(&roulettes);

        log::info!(
            "Session ready: {} roulettes, current \"{}\", {} spins recorded",
            roulettes.len(),
            current,
            totals.spins()
        );

        Self {
            store,
            roulettes,
            current,
            totals,
            history,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            phase: SpinPhase::Idle,
            next_handle: 1,
        }
    }

    // === Accessors ===

    pub fn current_name(&self) -> &str {
        &self.current
    }

    pub fn current_config(&self) -> Option<&Configuration> {
        self.roulettes.get(&self.current)
    }

    pub fn roulette_names(&self) -> Vec<String> {
        self.roulettes.names().map(str::to_string).collect()
    }

    pub fn roulettes(&self) -> &Roulettes {
        &self.roulettes
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> &WheelSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, SpinPhase::Spinning { .. })
    }

    /// Partition of the selected roulette
    pub fn partition(&self) -> Result<WeightPartition, SpinError> {
        let config = self
            .current_config()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| SpinError::EmptyConfiguration(self.current.clone()))?;
        config
            .partition()
            .map_err(|_| SpinError::NoValidEntries(self.current.clone()))
    }

    /// Arcs of the selected roulette; empty when it cannot be spun
    pub fn arcs(&self) -> Vec<WheelArc> {
        self.partition().map(|p| p.arcs()).unwrap_or_default()
    }

    /// Edit buffer seeded from the selected roulette
    pub fn edit_buffer(&self) -> EditBuffer {
        self.current_config()
            .map(EditBuffer::load_from)
            .unwrap_or_default()
    }

    // === Spin lifecycle ===

    /// Draw an outcome and compute where the wheel should stop
    pub fn begin_spin(&mut self, current_rotation_deg: f64) -> Result<PendingSpin, SpinError> {
        if self.is_spinning() {
            log::debug!("Spin requested while another is in progress");
            return Err(SpinError::InProgress);
        }

        let reset_deg = current_rotation_deg % FULL_TURN_DEG;
        let partition = self.partition()?;
        let determined = select(&partition, &mut self.rng).clone();
        let arcs = partition.arcs();

        // The drawn key always has an arc
        let Some(arc) = arcs.iter().find(|a| a.key == determined) else {
            return Err(SpinError::NoValidEntries(self.current.clone()));
        };
        let target = compute_target(arc, &self.settings.target_params(), &mut self.rng);

        let handle = SpinHandle(self.next_handle);
        self.next_handle += 1;

        log::info!(
            "Spin {} on \"{}\": {} (stop at {:.2}°, jitter {:+.2}°)",
            handle.0,
            self.current,
            determined,
            target.final_cw_deg,
            target.jitter_deg
        );

        self.phase = SpinPhase::Spinning {
            handle,
            determined: determined.clone(),
            arcs,
        };

        Ok(PendingSpin {
            handle,
            reset_deg,
            target,
            duration_ms: self.settings.spin_duration_ms,
            timeout_ms: self.settings.completion_timeout_ms(),
            determined,
        })
    }

    /// Reconcile the stop and record the drawn result
    pub fn complete_spin(
        &mut self,
        handle: SpinHandle,
        actual_rotation_deg: f64,
        timestamp_ms: f64,
    ) -> Result<SpinOutcome, SpinError> {
        match &self.phase {
            SpinPhase::Idle => return Err(SpinError::NotSpinning),
            SpinPhase::Spinning { handle: active, .. } if *active != handle => {
                return Err(SpinError::StaleHandle {
                    active: active.0,
                    got: handle.0,
                });
            }
            SpinPhase::Spinning { .. } => {}
        }

        let SpinPhase::Spinning { determined, arcs, .. } =
            std::mem::replace(&mut self.phase, SpinPhase::Idle)
        else {
            return Err(SpinError::NotSpinning);
        };

        let result = reconcile(&determined, actual_rotation_deg, &arcs, self.settings.marker_deg);

        self.totals.increment(&result.determined_key);
        self.history
            .prepend(HistoryEntry::spin(timestamp_ms, result.determined_key.clone()));

        let persist_error = self.save_records().err();
        if let Some(e) = &persist_error {
            log::error!("Failed to save spin result: {}", e);
        }

        Ok(SpinOutcome {
            result,
            persist_error,
        })
    }

    /// Run a whole spin against the headless renderer
    pub fn spin_simulated(
        &mut self,
        renderer: &mut SimulatedRenderer,
        timestamp_ms: f64,
    ) -> Result<(SpinOutcome, CompletionCause), SpinError> {
        let pending = self.begin_spin(renderer.rotation_deg())?;
        renderer.snap_to(pending.reset_deg);
        renderer.animate_to(pending.target_deg(), pending.duration_ms);

        let mut latch = CompletionLatch::new();
        if let Some(cause) = renderer.poll_animation_end() {
            latch.fire(cause);
        }
        latch.fire(CompletionCause::Timeout);
        let cause = latch.fired().unwrap_or(CompletionCause::Timeout);

        let outcome = self.complete_spin(pending.handle, renderer.rotation_deg(), timestamp_ms)?;
        Ok((outcome, cause))
    }

    // === Configuration management ===

    pub fn select_roulette(&mut self, name: &str) -> Result<(), SessionError> {
        if !self.roulettes.contains(name) {
            return Err(ConfigError::UnknownRoulette(name.to_string()).into());
        }
        self.current = name.to_string();
        log::debug!("Selected roulette \"{}\"", name);
        Ok(())
    }

    /// Create an empty roulette and select it. Returns the trimmed name.
    pub fn add_roulette(&mut self, name: &str) -> Result<String, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::EmptyName.into());
        }
        if self.roulettes.contains(name) {
            return Err(ConfigError::NameTaken(name.to_string()).into());
        }

        self.roulettes.put(name, Configuration::new());
        self.current = name.to_string();
        log::info!("Added roulette \"{}\"", name);

        self.roulettes.save(&mut self.store)?;
        Ok(name.to_string())
    }

    /// Delete the selected roulette; selection falls back to the default
    pub fn delete_current_roulette(&mut self) -> Result<String, SessionError> {
        let name = self.current.clone();
        self.roulettes.remove(&name)?;
        self.current = initial_selection(&self.roulettes);
        log::info!("Deleted roulette \"{}\"", name);

        self.roulettes.save(&mut self.store)?;
        Ok(name)
    }

    /// Validate the buffer and store it as the selected roulette.
    ///
    /// On rejection nothing changes, the buffer included. On success the
    /// buffer holds the normalized rows.
    pub fn commit_edit(&mut self, buffer: &mut EditBuffer) -> Result<Option<Adjustment>, SessionError> {
        let normalized = buffer.normalized()?;
        if let Some(adj) = &normalized.adjustment {
            log::info!("Adjusted ratios: {}", adj);
        }

        let config = Configuration::from_entries(normalized.entries.iter().cloned());
        self.roulettes.put(&self.current, config);
        buffer.replace(normalized.entries);

        self.roulettes.save(&mut self.store)?;
        Ok(normalized.adjustment)
    }

    // === Records ===

    /// Clear totals, leaving a note in history
    pub fn reset_totals(&mut self, timestamp_ms: f64) -> Result<(), SessionError> {
        self.history.prepend(HistoryEntry::totals_reset(timestamp_ms));
        self.totals.reset();
        log::info!("Totals reset");
        self.save_records()?;
        Ok(())
    }

    /// Mark a history entry deleted and take its spin back out of the totals.
    ///
    /// Spins older than the last totals reset are already out of the totals.
    pub fn delete_history_entry(&mut self, index: usize) -> Result<Option<OutcomeKey>, SessionError> {
        let removed = self.history.mark_deleted(index)?;
        if let Some(key) = &removed {
            self.totals.decrement(key);
            log::info!("Deleted history entry {} ({})", index, key);
        }
        self.save_records()?;
        Ok(removed)
    }

    /// Wipe storage and start over with an empty default roulette.
    ///
    /// The import flag goes with it, so the next bootstrap re-imports.
    pub fn full_reset(&mut self) -> Result<(), SessionError> {
        self.phase = SpinPhase::Idle;
        self.roulettes = Roulettes::with_empty_default();
        self.current = DEFAULT_ROULETTE_NAME.to_string();
        self.totals.reset();
        self.history.clear();
        self.settings = WheelSettings::default();
        self.history.set_limit(self.settings.history_limit);
        log::warn!("Full reset");

        self.store.clear()?;
        Ok(())
    }

    fn save_records(&mut self) -> Result<(), StoreError> {
        // Attempt both even if the first fails
        let totals = self.totals.save(&mut self.store);
        let history = self.history.save(&mut self.store);
        totals.and(history)
    }
}

fn initial_selection(roulettes: &Roulettes) -> String {
    if roulettes.contains(DEFAULT_ROULETTE_NAME) {
        DEFAULT_ROULETTE_NAME.to_string()
    } else {
        roulettes
            .first_name()
            .unwrap_or(DEFAULT_ROULETTE_NAME)
            .to_string()
    }
}
