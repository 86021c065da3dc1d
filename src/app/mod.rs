//! Application core — the feed-gating decision engine, zero direct I/O.
//!
//! This module contains the business rules of the feeder: gate ordering,
//! fail-closed handling, actuation, and bookkeeping. All interaction with
//! the database, the motor controller, and the clock happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without a network or a database.

pub mod commands;
pub mod decision;
pub mod events;
pub mod ports;
pub mod service;
