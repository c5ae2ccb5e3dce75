//! tftboard Integration Tests
//!
//! These tests drive the power core through the mock HAL the same way the
//! init binary wires it up.

mod config_tests;
mod power_save_tests;
mod power_tests;
