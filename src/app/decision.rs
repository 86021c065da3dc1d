//! The gating engine's output for one detection.

use core::fmt;

use serde::Serialize;

use crate::model::DoseAmount;

/// Why a detection did or did not result in a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    Ok,
    Debounced,
    IntervalNotElapsed,
    TimeRestricted,
    NoDoseConfigured,
    /// A gate could not read its configuration; the gate failed closed.
    StoreUnavailable,
    ActuationFailed,
    Parse,
}

impl Reason {
    /// Errors are faults in a collaborator; everything else is policy.
    pub fn is_error(self) -> bool {
        matches!(self, Self::ActuationFailed | Self::Parse)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Debounced => "DEBOUNCED",
            Self::IntervalNotElapsed => "INTERVAL_NOT_ELAPSED",
            Self::TimeRestricted => "TIME_RESTRICTED",
            Self::NoDoseConfigured => "NO_DOSE_CONFIGURED",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::ActuationFailed => "ACTUATION_FAILED",
            Self::Parse => "PARSE",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of the per-event state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Fed,
    Suppressed(Reason),
    Error(Reason),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fed => f.write_str("FED"),
            Self::Suppressed(r) => write!(f, "SUPPRESSED({r})"),
            Self::Error(r) => write!(f, "ERROR({r})"),
        }
    }
}

/// Not persisted; returned to the caller and mirrored into the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedDecision {
    pub allow: bool,
    pub reason: Reason,
    pub amount: Option<DoseAmount>,
}

impl FeedDecision {
    pub fn fed(amount: DoseAmount) -> Self {
        Self {
            allow: true,
            reason: Reason::Ok,
            amount: Some(amount),
        }
    }

    pub fn denied(reason: Reason) -> Self {
        Self {
            allow: false,
            reason,
            amount: None,
        }
    }

    /// A dispense was attempted with `amount` but not confirmed.
    pub fn failed(reason: Reason, amount: Option<DoseAmount>) -> Self {
        Self {
            allow: false,
            reason,
            amount,
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.allow {
            Outcome::Fed
        } else if self.reason.is_error() {
            Outcome::Error(self.reason)
        } else {
            Outcome::Suppressed(self.reason)
        }
    }
}
