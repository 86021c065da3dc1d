//! Unified error types for the feeder controller.
//!
//! A single `Error` enum for the operations that can fail outright: store
//! access from admin commands, the detection stream, and command validation. Inside the gating loop none of these are
//! propagated: gate and actuator failures are folded into a
//! [`FeedDecision`](crate::app::decision::FeedDecision) instead.

use core::fmt;

use crate::app::ports::StoreError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The configuration store failed.
    Store(StoreError),
    /// The detection stream could not be started or read.
    Detector(String),
    /// An administrative command carried an out-of-range value.
    InvalidCommand(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Detector(msg) => write!(f, "detector: {msg}"),
            Self::InvalidCommand(msg) => write!(f, "invalid command: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

/// Failure classes for a single dispense command.
///
/// Only `Unreachable` caused by a refused/failed connection may be retried,
/// and at most once. A `Rejected` command reached the motor controller, so
/// repeating it could dispense twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// The motor controller could not be reached.
    Unreachable(String),
    /// No response within the request timeout.
    Timeout,
    /// The motor controller answered with a non-2xx status.
    Rejected { status: u16 },
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(detail) => write!(f, "actuator unreachable ({detail})"),
            Self::Timeout => write!(f, "actuator timed out"),
            Self::Rejected { status } => write!(f, "actuator rejected command (HTTP {status})"),
        }
    }
}

impl std::error::Error for ActuatorError {}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// A detection line carried the detection marker but was unusable.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Structured line that did not decode.
    Malformed(String),
    /// Marker present, breed missing.
    EmptyBreed,
    /// Breed label exceeds [`BREED_NAME_CAPACITY`](crate::detection::BREED_NAME_CAPACITY).
    BreedTooLong(usize),
    /// Confidence outside `0.0..=1.0` or not a number.
    InvalidConfidence(f32),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed detection line: {msg}"),
            Self::EmptyBreed => write!(f, "detection line has no breed"),
            Self::BreedTooLong(len) => write!(f, "breed label too long ({len} bytes)"),
            Self::InvalidConfidence(c) => write!(f, "confidence {c} outside 0..=1"),
        }
    }
}

impl std::error::Error for ParseError {}
