//! Port traits — the hexagonal boundary between the gating engine and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GatingService (domain)
//! ```
//!
//! Driven adapters (SQLite store, HTTP motor client, wall clock, log sink)
//! implement these traits. The [`GatingService`](super::service::GatingService)
//! receives them at call sites, so the decision pipeline never touches the
//! network or the database directly and is fully testable with mocks.
//!
//! ## Store contract
//!
//! - **ConfigStore** implementations MUST validate before persisting
//!   (see [`validate_interval_minutes`] and [`validate_dose`]).
//! - `record_detection` MUST be atomic: the log append and the
//!   last-detection upsert both land or neither does.
//! - Upserts are keyed on `user_id` or `breed`; at most one row per key.

use chrono::NaiveDateTime;

use crate::error::ActuatorError;
use crate::model::{BreedDose, DetectionLogEntry, DoseAmount, RestrictionWindow, UserId};

use super::events::FeedEvent;

// ───────────────────────────────────────────────────────────────
// Configuration store port (domain ↔ persisted configuration/logs)
// ───────────────────────────────────────────────────────────────

/// Read/write access to per-user settings, per-breed doses, and detection
/// bookkeeping. The dashboard may write concurrently; callers read whatever
/// is current at the time of each check.
pub trait ConfigStore {
    /// `feed_interval.interval_minutes` for `user`, `None` when unset.
    fn feed_interval(&self, user: UserId) -> Result<Option<u32>, StoreError>;

    /// Upsert the feeding interval for `user`.
    fn set_feed_interval(&mut self, user: UserId, minutes: u32) -> Result<(), StoreError>;

    /// The forbidden window for `user`, `None` when unset.
    fn time_restriction(&self, user: UserId) -> Result<Option<RestrictionWindow>, StoreError>;

    /// Upsert the forbidden window for `user`.
    fn set_time_restriction(
        &mut self,
        user: UserId,
        window: RestrictionWindow,
    ) -> Result<(), StoreError>;

    /// `petbreed.default_feed_amount` for `breed`, `None` when unknown.
    fn breed_dose(&self, breed: &str) -> Result<Option<DoseAmount>, StoreError>;

    /// Upsert the dose for `breed`.
    fn set_breed_dose(&mut self, breed: &str, amount: DoseAmount) -> Result<(), StoreError>;

    /// All configured breeds, ordered by name.
    fn breeds(&self) -> Result<Vec<BreedDose>, StoreError>;

    /// When `breed` last opened a debounce window.
    fn last_detection(&self, breed: &str) -> Result<Option<NaiveDateTime>, StoreError>;

    /// Upsert the last-detection timestamp for `breed`.
    fn set_last_detection(&mut self, breed: &str, at: NaiveDateTime) -> Result<(), StoreError>;

    /// Append a `detection_log` row and upsert `last_detection` atomically.
    fn record_detection(&mut self, breed: &str, at: NaiveDateTime) -> Result<(), StoreError>;

    /// Detection log rows in time order. An empty filter returns every breed.
    fn detection_history(&self, breeds: &[String]) -> Result<Vec<DetectionLogEntry>, StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → motor controller)
// ───────────────────────────────────────────────────────────────

/// Confirmation that the motor controller accepted a dispense command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispenseAck {
    /// HTTP status returned by the controller (2xx).
    pub status: u16,
    /// Number of requests issued (2 when a connection retry was needed).
    pub attempts: u8,
}

/// Write-side port: the single shared feeding motor.
pub trait Actuator {
    /// Issue one dispense command. Never retries a rejected command.
    fn dispense(&mut self, amount: DoseAmount) -> Result<DispenseAck, ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Local wall-clock time. Restriction windows are time-of-day in local time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → operational log)
// ───────────────────────────────────────────────────────────────

/// The domain emits a [`FeedEvent`] for every line it acts on, suppresses,
/// or rejects. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &FeedEvent);
}

// ───────────────────────────────────────────────────────────────
// Validation shared by store adapters
// ───────────────────────────────────────────────────────────────

/// Longest permitted feeding interval (one day).
pub const MAX_INTERVAL_MINUTES: u32 = 24 * 60;

/// Longest permitted dose (one minute of motor run time).
pub const MAX_DOSE_AMOUNT: DoseAmount = 60_000;

pub fn validate_interval_minutes(minutes: u32) -> Result<(), StoreError> {
    if !(1..=MAX_INTERVAL_MINUTES).contains(&minutes) {
        return Err(StoreError::ValidationFailed(
            "interval_minutes must be 1-1440",
        ));
    }
    Ok(())
}

pub fn validate_dose(breed: &str, amount: DoseAmount) -> Result<(), StoreError> {
    if breed.trim().is_empty() {
        return Err(StoreError::ValidationFailed("breed must not be empty"));
    }
    if amount > MAX_DOSE_AMOUNT {
        return Err(StoreError::ValidationFailed(
            "default_feed_amount must be 0-60000",
        ));
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or the query failed.
    Unavailable(String),
    /// A value failed range validation; nothing was written.
    ValidationFailed(&'static str),
    /// A stored row could not be decoded.
    Corrupted(String),
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Corrupted(msg) => write!(f, "stored row corrupted: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
