//! In-memory configuration store.
//!
//! Implements [`ConfigStore`] with plain maps. Used for dry runs and as
//! the store behind unit tests; `set_offline` simulates an unreachable
//! database so fail-closed paths can be exercised.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::app::ports::{validate_dose, validate_interval_minutes, ConfigStore, StoreError};
use crate::model::{BreedDose, DetectionLogEntry, DoseAmount, RestrictionWindow, UserId};

#[derive(Debug, Default)]
pub struct MemoryStore {
    intervals: HashMap<UserId, u32>,
    restrictions: HashMap<UserId, RestrictionWindow>,
    doses: HashMap<String, DoseAmount>,
    last_detection: HashMap<String, NaiveDateTime>,
    log: Vec<DetectionLogEntry>,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn online(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Unavailable("memory store offline".into()))
        } else {
            Ok(())
        }
    }
}

impl ConfigStore for MemoryStore {
    fn feed_interval(&self, user: UserId) -> Result<Option<u32>, StoreError> {
        self.online()?;
        Ok(self.intervals.get(&user).copied())
    }

    fn set_feed_interval(&mut self, user: UserId, minutes: u32) -> Result<(), StoreError> {
        self.online()?;
        validate_interval_minutes(minutes)?;
        self.intervals.insert(user, minutes);
        Ok(())
    }

    fn time_restriction(&self, user: UserId) -> Result<Option<RestrictionWindow>, StoreError> {
        self.online()?;
        Ok(self.restrictions.get(&user).copied())
    }

    fn set_time_restriction(
        &mut self,
        user: UserId,
        window: RestrictionWindow,
    ) -> Result<(), StoreError> {
        self.online()?;
        self.restrictions.insert(user, window);
        Ok(())
    }

    fn breed_dose(&self, breed: &str) -> Result<Option<DoseAmount>, StoreError> {
        self.online()?;
        Ok(self.doses.get(breed).copied())
    }

    fn set_breed_dose(&mut self, breed: &str, amount: DoseAmount) -> Result<(), StoreError> {
        self.online()?;
        validate_dose(breed, amount)?;
        self.doses.insert(breed.to_owned(), amount);
        Ok(())
    }

    fn breeds(&self) -> Result<Vec<BreedDose>, StoreError> {
        self.online()?;
        let mut breeds: Vec<BreedDose> = self
            .doses
            .iter()
            .map(|(breed, amount)| BreedDose {
                breed: breed.clone(),
                default_amount: *amount,
            })
            .collect();
        breeds.sort_by(|a, b| a.breed.cmp(&b.breed));
        Ok(breeds)
    }

    fn last_detection(&self, breed: &str) -> Result<Option<NaiveDateTime>, StoreError> {
        self.online()?;
        Ok(self.last_detection.get(breed).copied())
    }

    fn set_last_detection(&mut self, breed: &str, at: NaiveDateTime) -> Result<(), StoreError> {
        self.online()?;
        self.last_detection.insert(breed.to_owned(), at);
        Ok(())
    }

    fn record_detection(&mut self, breed: &str, at: NaiveDateTime) -> Result<(), StoreError> {
        self.online()?;
        self.log.push(DetectionLogEntry {
            breed: breed.to_owned(),
            time: at,
        });
        self.last_detection.insert(breed.to_owned(), at);
        Ok(())
    }

    fn detection_history(&self, breeds: &[String]) -> Result<Vec<DetectionLogEntry>, StoreError> {
        self.online()?;
        let mut rows: Vec<DetectionLogEntry> = self
            .log
            .iter()
            .filter(|row| breeds.is_empty() || breeds.contains(&row.breed))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.time);
        Ok(rows)
    }
}
