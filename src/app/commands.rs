//! Inbound administrative commands.
//!
//! These are the operator actions the dashboard used to expose over HTTP.
//! The binary maps its subcommands onto them and the
//! [`GatingService`](super::service::GatingService) executes them against
//! the store and actuator ports.

use crate::model::{DoseAmount, RestrictionWindow, UserId};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Upsert a user's minimum feeding interval.
    SetInterval { user_id: UserId, minutes: u32 },

    /// Upsert a user's forbidden time-of-day window.
    SetRestriction {
        user_id: UserId,
        window: RestrictionWindow,
    },

    /// Upsert a breed's dose.
    SetDose { breed: String, amount: DoseAmount },

    /// List the detection log, optionally only for some breeds.
    History { breeds: Vec<String> },

    /// List configured breeds and doses.
    Breeds,

    /// Dispense now. Refused inside the restriction window unless forced.
    Feed { amount: DoseAmount, force: bool },
}
