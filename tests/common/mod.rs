//! Common test utilities for nas-magnet integration tests

#[allow(dead_code)]
pub mod appliance;
#[allow(dead_code)]
pub mod config;

#[allow(unused_imports)]
pub use appliance::*;
#[allow(unused_imports)]
pub use config::*;
