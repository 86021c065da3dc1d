//! Feed gates.
//!
//! Each gate is a single pass/deny check. They run in a fixed order,
//! cheapest first, and the first gate that does not pass decides the
//! outcome:
//!
//! ```text
//! DetectionEvent
//!   └─▶ DebounceGuard ─▶ IntervalThrottle ─▶ TimeRestrictionChecker ─▶ DoseResolver ─▶ amount
//! ```
//!
//! A gate never returns `Err`. A store failure becomes
//! [`GateOutcome::Fault`], which the orchestrator treats as a denial.

pub mod debounce;
pub mod dose;
pub mod interval;
pub mod restriction;

use core::fmt;

use crate::app::decision::Reason;
use crate::app::ports::StoreError;
use crate::model::RestrictionWindow;

pub use debounce::DebounceGuard;
pub use dose::DoseResolver;
pub use interval::IntervalThrottle;
pub use restriction::TimeRestrictionChecker;

/// Result of evaluating one gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome<T = ()> {
    Pass(T),
    Deny(Denial),
    /// The gate's store read failed; the gate failed closed.
    Fault(StoreError),
}

impl<T> GateOutcome<T> {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }

    /// Reason to report when the gate did not pass.
    pub fn reason(&self) -> Reason {
        match self {
            Self::Pass(_) => Reason::Ok,
            Self::Deny(denial) => denial.reason(),
            Self::Fault(_) => Reason::StoreUnavailable,
        }
    }
}

/// Why a gate refused an event, with detail for the operational log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Debounced { remaining_secs: i64 },
    IntervalNotElapsed { remaining_secs: i64 },
    TimeRestricted { window: RestrictionWindow },
    NoDoseConfigured,
}

impl Denial {
    pub fn reason(&self) -> Reason {
        match self {
            Self::Debounced { .. } => Reason::Debounced,
            Self::IntervalNotElapsed { .. } => Reason::IntervalNotElapsed,
            Self::TimeRestricted { .. } => Reason::TimeRestricted,
            Self::NoDoseConfigured => Reason::NoDoseConfigured,
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debounced { remaining_secs } => {
                write!(f, "same breed seen recently, {remaining_secs}s of cooldown left")
            }
            Self::IntervalNotElapsed { remaining_secs } => {
                write!(f, "fed recently, next feed allowed in {remaining_secs}s")
            }
            Self::TimeRestricted { window } => write!(f, "feeding forbidden during {window}"),
            Self::NoDoseConfigured => write!(f, "no dose configured for this breed"),
        }
    }
}

/// Round a positive remainder up to whole seconds for display.
pub(crate) fn ceil_secs(remaining: chrono::TimeDelta) -> i64 {
    let millis = remaining.num_milliseconds();
    (millis + 999).div_euclid(1000)
}
