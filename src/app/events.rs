//! Outbound application events.
//!
//! The [`GatingService`](super::service::GatingService) emits these through
//! the [`EventSink`](super::ports::EventSink) port, one per handled line.
//! Adapters on the other side decide what to do with them: the daemon
//! writes them to the operational log.

use chrono::NaiveDateTime;

use crate::model::{DoseAmount, UserId};

use super::decision::Reason;
use super::service::RunStats;

/// Structured events emitted by the gating engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// The service is ready; carries the seeded last-feeding time.
    Started {
        user_id: UserId,
        last_feeding_time: NaiveDateTime,
    },

    /// The motor confirmed a dispense.
    Fed {
        breed: String,
        amount: DoseAmount,
        at: NaiveDateTime,
        attempts: u8,
    },

    /// A gate refused the detection.
    Suppressed {
        breed: String,
        reason: Reason,
        detail: String,
    },

    /// A collaborator failed (unparseable line, motor not confirmed).
    Failed {
        breed: Option<String>,
        reason: Reason,
        detail: String,
    },

    /// A scored detection under the confidence threshold.
    BelowThreshold { breed: String, confidence: f32 },

    /// The feed happened but could not be written to the detection log.
    LogFailed { breed: String, detail: String },

    /// An operator-requested dispense outside the detection pipeline.
    ManualFeed { amount: DoseAmount, forced: bool },

    /// The detection stream ended.
    Finished(RunStats),
}
