//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against real adapters (SQLite on disk, an HTTP mock motor controller)
//! or the shared mocks. Everything runs on the host with no feeder
//! hardware required.

mod http_actuator_tests;
mod mock_ports;
mod recorder_tests;
mod sqlite_store_tests;
