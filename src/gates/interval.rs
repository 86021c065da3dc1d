//! Interval throttle.
//!
//! Enforces a per-user minimum spacing between successful feeds,
//! independent of breed. `last_feeding_time` is owned by the orchestrator
//! in process memory and is lost on restart.

use chrono::{NaiveDateTime, TimeDelta};
use log::warn;

use crate::app::ports::ConfigStore;
use crate::model::UserId;

use super::{ceil_secs, Denial, GateOutcome};

/// Interval applied when the user has no `feed_interval` row.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 1;

pub struct IntervalThrottle {
    default_minutes: u32,
}

impl Default for IntervalThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_MINUTES)
    }
}

impl IntervalThrottle {
    pub fn new(default_minutes: u32) -> Self {
        Self { default_minutes }
    }

    /// Configured interval for `user`, falling back to the default.
    pub fn interval_for(
        &self,
        store: &impl ConfigStore,
        user: UserId,
    ) -> Result<TimeDelta, crate::app::ports::StoreError> {
        let minutes = store.feed_interval(user)?.unwrap_or(self.default_minutes);
        Ok(TimeDelta::minutes(i64::from(minutes)))
    }

    pub fn check(
        &self,
        store: &impl ConfigStore,
        user: UserId,
        now: NaiveDateTime,
        last_feeding_time: NaiveDateTime,
    ) -> GateOutcome {
        let interval = match self.interval_for(store, user) {
            Ok(interval) => interval,
            Err(e) => {
                warn!("interval: cannot read interval for user {}: {}", user, e);
                return GateOutcome::Fault(e);
            }
        };

        let elapsed = now - last_feeding_time;
        if elapsed >= interval {
            GateOutcome::Pass(())
        } else {
            GateOutcome::Deny(Denial::IntervalNotElapsed {
                remaining_secs: ceil_secs(interval - elapsed),
            })
        }
    }

    pub fn allow_on_interval(
        &self,
        store: &impl ConfigStore,
        user: UserId,
        now: NaiveDateTime,
        last_feeding_time: NaiveDateTime,
    ) -> bool {
        self.check(store, user, now, last_feeding_time).is_pass()
    }
}
