//! Debounce guard.
//!
//! Suppresses repeat triggers for the same breed inside a fixed cooldown.
//! The window is anchored at the sighting that opened it: a denied check
//! leaves `last_detection` untouched, so a continuous stream of detections
//! cannot keep pushing the expiry back. A passing check (first sighting or
//! cooldown elapsed) opens a new window at `now`.
//!
//! Store failures fail closed with a reason distinct from `DEBOUNCED`.

use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, warn};

use crate::app::ports::ConfigStore;

use super::{ceil_secs, Denial, GateOutcome};

/// Fixed cooldown between two acted-upon sightings of one breed.
pub const DEBOUNCE_COOLDOWN_SECS: i64 = 10;

pub struct DebounceGuard {
    cooldown: TimeDelta,
}

impl Default for DebounceGuard {
    fn default() -> Self {
        Self::new(DEBOUNCE_COOLDOWN_SECS)
    }
}

impl DebounceGuard {
    pub fn new(cooldown_secs: i64) -> Self {
        Self {
            cooldown: TimeDelta::seconds(cooldown_secs),
        }
    }

    /// Evaluate the guard for `breed` at `now`.
    pub fn check(
        &self,
        store: &mut impl ConfigStore,
        breed: &str,
        now: NaiveDateTime,
    ) -> GateOutcome {
        let last = match store.last_detection(breed) {
            Ok(last) => last,
            Err(e) => {
                warn!("debounce: cannot read last detection for '{}': {}", breed, e);
                return GateOutcome::Fault(e);
            }
        };

        if let Some(last) = last {
            let elapsed = now - last;
            if elapsed < self.cooldown {
                let remaining_secs = ceil_secs(self.cooldown - elapsed);
                debug!("debounce: '{}' denied, {}s remaining", breed, remaining_secs);
                return GateOutcome::Deny(Denial::Debounced { remaining_secs });
            }
        }

        match store.set_last_detection(breed, now) {
            Ok(()) => GateOutcome::Pass(()),
            Err(e) => {
                warn!("debounce: cannot open window for '{}': {}", breed, e);
                GateOutcome::Fault(e)
            }
        }
    }

    /// Boolean form: store failures count as denial.
    pub fn allow_on_debounce(
        &self,
        store: &mut impl ConfigStore,
        breed: &str,
        now: NaiveDateTime,
    ) -> bool {
        self.check(store, breed, now).is_pass()
    }
}
