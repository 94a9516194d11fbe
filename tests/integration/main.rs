//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  Everything runs on the host with scripted
//! platform behaviour; no real positioning or radio hardware involved.

mod app_service_tests;
mod permission_flow_tests;
mod send_flow_tests;
