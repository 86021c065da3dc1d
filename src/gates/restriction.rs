//! Time-of-day restriction.
//!
//! Each user may configure one forbidden window. Without one the default
//! 21:00-04:00 night window applies. Windows may wrap midnight. A store
//! failure is treated as restricted: a skipped meal can be corrected, an
//! extra one cannot.

use chrono::NaiveDateTime;
use log::warn;

use crate::app::ports::ConfigStore;
use crate::model::{RestrictionWindow, UserId};

use super::{Denial, GateOutcome};

pub const DEFAULT_RESTRICTION_START_HOUR: u32 = 21;
pub const DEFAULT_RESTRICTION_END_HOUR: u32 = 4;

/// The night window applied to users without their own setting.
pub fn default_restriction() -> RestrictionWindow {
    RestrictionWindow::from_hours(DEFAULT_RESTRICTION_START_HOUR, DEFAULT_RESTRICTION_END_HOUR)
        .unwrap_or_else(|| unreachable!("default restriction hours are valid"))
}

pub struct TimeRestrictionChecker {
    default_window: RestrictionWindow,
}

impl Default for TimeRestrictionChecker {
    fn default() -> Self {
        Self::new(default_restriction())
    }
}

impl TimeRestrictionChecker {
    pub fn new(default_window: RestrictionWindow) -> Self {
        Self { default_window }
    }

    /// Window in force for `user`.
    pub fn window_for(
        &self,
        store: &impl ConfigStore,
        user: UserId,
    ) -> Result<RestrictionWindow, crate::app::ports::StoreError> {
        Ok(store.time_restriction(user)?.unwrap_or(self.default_window))
    }

    /// `Pass` when feeding is permitted at `now`.
    pub fn check(&self, store: &impl ConfigStore, user: UserId, now: NaiveDateTime) -> GateOutcome {
        let window = match self.window_for(store, user) {
            Ok(window) => window,
            Err(e) => {
                warn!("restriction: cannot read window for user {}: {}", user, e);
                return GateOutcome::Fault(e);
            }
        };

        if window.contains(now.time()) {
            GateOutcome::Deny(Denial::TimeRestricted { window })
        } else {
            GateOutcome::Pass(())
        }
    }

    /// Whether feeding is forbidden at `now`. Store failures count as restricted.
    pub fn is_restricted(&self, store: &impl ConfigStore, user: UserId, now: NaiveDateTime) -> bool {
        !self.check(store, user, now).is_pass()
    }
}
