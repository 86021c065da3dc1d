//! Mock ports for integration tests.
//!
//! Records every dispense so tests can assert on the full command history
//! without a motor controller, and wraps the in-memory store with
//! per-operation fault switches.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use petfeeder::adapters::memory::MemoryStore;
use petfeeder::app::events::FeedEvent;
use petfeeder::app::ports::{Actuator, ConfigStore, DispenseAck, EventSink, StoreError};
use petfeeder::error::ActuatorError;
use petfeeder::model::{BreedDose, DetectionLogEntry, DoseAmount, RestrictionWindow, UserId};

// ── MockMotor ─────────────────────────────────────────────────

/// Returns scripted results in order, then succeeds.
pub struct MockMotor {
    pub dispensed: Vec<DoseAmount>,
    script: VecDeque<Result<DispenseAck, ActuatorError>>,
}

#[allow(dead_code)]
impl MockMotor {
    pub fn new() -> Self {
        Self {
            dispensed: Vec::new(),
            script: VecDeque::new(),
        }
    }

    pub fn then_fail(mut self, err: ActuatorError) -> Self {
        self.script.push_back(Err(err));
        self
    }
}

impl Default for MockMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl Actuator for MockMotor {
    fn dispense(&mut self, amount: DoseAmount) -> Result<DispenseAck, ActuatorError> {
        self.dispensed.push(amount);
        self.script.pop_front().unwrap_or(Ok(DispenseAck {
            status: 200,
            attempts: 1,
        }))
    }
}

// ── FlakyStore ────────────────────────────────────────────────

/// [`MemoryStore`] with the detection-log write switchable to fail.
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_record: bool,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_record: false,
        }
    }
}

impl ConfigStore for FlakyStore {
    fn feed_interval(&self, user: UserId) -> Result<Option<u32>, StoreError> {
        self.inner.feed_interval(user)
    }

    fn set_feed_interval(&mut self, user: UserId, minutes: u32) -> Result<(), StoreError> {
        self.inner.set_feed_interval(user, minutes)
    }

    fn time_restriction(&self, user: UserId) -> Result<Option<RestrictionWindow>, StoreError> {
        self.inner.time_restriction(user)
    }

    fn set_time_restriction(
        &mut self,
        user: UserId,
        window: RestrictionWindow,
    ) -> Result<(), StoreError> {
        self.inner.set_time_restriction(user, window)
    }

    fn breed_dose(&self, breed: &str) -> Result<Option<DoseAmount>, StoreError> {
        self.inner.breed_dose(breed)
    }

    fn set_breed_dose(&mut self, breed: &str, amount: DoseAmount) -> Result<(), StoreError> {
        self.inner.set_breed_dose(breed, amount)
    }

    fn breeds(&self) -> Result<Vec<BreedDose>, StoreError> {
        self.inner.breeds()
    }

    fn last_detection(&self, breed: &str) -> Result<Option<NaiveDateTime>, StoreError> {
        self.inner.last_detection(breed)
    }

    fn set_last_detection(&mut self, breed: &str, at: NaiveDateTime) -> Result<(), StoreError> {
        self.inner.set_last_detection(breed, at)
    }

    fn record_detection(&mut self, breed: &str, at: NaiveDateTime) -> Result<(), StoreError> {
        if self.fail_record {
            return Err(StoreError::Unavailable("disk full".into()));
        }
        self.inner.record_detection(breed, at)
    }

    fn detection_history(&self, breeds: &[String]) -> Result<Vec<DetectionLogEntry>, StoreError> {
        self.inner.detection_history(breeds)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<FeedEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&FeedEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &FeedEvent) {
        self.events.push(event.clone());
    }
}
