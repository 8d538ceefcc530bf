//! Test fixtures for eco-route-planner.
//!
//! Provides:
//! - Real Turkish city coordinates (from OpenStreetMap)
//! - In-memory collaborators with builders
//! - A stub HTTP server for the backend adapter
//! - OSRM dataset preparation for the container tests

#![allow(dead_code)]

pub mod fakes;
pub mod osrm_dataset;
pub mod stub_server;

pub use turkish_cities::*;

/// Routes library logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
