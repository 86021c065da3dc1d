//! PetFeeder controller library.
//!
//! Turns breed detections from the vision process into feed decisions:
//! per-breed debounce, per-user feeding interval, per-user time-of-day
//! restriction, and per-breed dose lookup, followed by the motor command
//! and detection bookkeeping. Exposes the pure-logic modules for
//! integration testing; the daemon lives in `main.rs`.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod detection;
pub mod error;
pub mod gates;
pub mod model;
pub mod recorder;
