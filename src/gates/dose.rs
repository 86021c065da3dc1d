//! Breed → dose lookup. There is no fallback amount: an unknown breed, or
//! one configured with a zero dose, is never fed.

use log::warn;

use crate::app::ports::ConfigStore;
use crate::model::DoseAmount;

use super::{Denial, GateOutcome};

#[derive(Default)]
pub struct DoseResolver;

impl DoseResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve_dose(&self, store: &impl ConfigStore, breed: &str) -> GateOutcome<DoseAmount> {
        match store.breed_dose(breed) {
            Ok(Some(amount)) if amount > 0 => GateOutcome::Pass(amount),
            Ok(_) => GateOutcome::Deny(Denial::NoDoseConfigured),
            Err(e) => {
                warn!("dose: cannot read dose for '{}': {}", breed, e);
                GateOutcome::Fault(e)
            }
        }
    }
}
