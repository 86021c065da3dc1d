//! Persisted record shapes shared by the gates and the store adapters.

use core::fmt;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Dashboard user owning interval and restriction settings.
pub type UserId = i64;

/// Dispense parameter sent to the motor controller (milliseconds of motor
/// run time or a discrete dose count, depending on the breed table).
pub type DoseAmount = u32;

/// Forbidden time-of-day window, inclusive at both ends.
///
/// `start > end` means the window wraps midnight (e.g. 22:00–03:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl RestrictionWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Build a window from whole hours. Out-of-range hours yield `None`.
    pub fn from_hours(start_hour: u32, end_hour: u32) -> Option<Self> {
        Some(Self {
            start: NaiveTime::from_hms_opt(start_hour, 0, 0)?,
            end: NaiveTime::from_hms_opt(end_hour, 0, 0)?,
        })
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Whether `time` falls inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.wraps_midnight() {
            time >= self.start || time <= self.end
        } else {
            time >= self.start && time <= self.end
        }
    }
}

impl fmt::Display for RestrictionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start.hour(),
            self.start.minute(),
            self.end.hour(),
            self.end.minute()
        )
    }
}

/// One `detection_log` row: a feed that actually happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionLogEntry {
    pub breed: String,
    pub time: NaiveDateTime,
}

/// One `petbreed` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedDose {
    pub breed: String,
    pub default_amount: DoseAmount,
}
