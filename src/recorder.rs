//! Detection logger.
//!
//! Records a feed that actually happened: one `detection_log` row plus the
//! `last_detection` upsert, in one store transaction. Runs only after the
//! motor confirmed the dispense, so a failure here cannot undo the feed; it
//! is reported and the loop carries on.

use chrono::NaiveDateTime;
use log::{debug, error};

use crate::app::ports::{ConfigStore, StoreError};

#[derive(Default)]
pub struct DetectionRecorder {
    recorded: u64,
    failed: u64,
}

impl DetectionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        store: &mut impl ConfigStore,
        breed: &str,
        time: NaiveDateTime,
    ) -> Result<(), StoreError> {
        match store.record_detection(breed, time) {
            Ok(()) => {
                self.recorded += 1;
                debug!("recorder: logged '{}' at {}", breed, time);
                Ok(())
            }
            Err(e) => {
                self.failed += 1;
                error!("recorder: feed for '{}' at {} not logged: {}", breed, time, e);
                Err(e)
            }
        }
    }

    /// Rows written since startup.
    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    /// Confirmed feeds whose log write failed.
    pub fn failed(&self) -> u64 {
        self.failed
    }
}
