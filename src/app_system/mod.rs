//! System startup, wiring, and shutdown.

pub mod marketplace_system;
pub mod telemetry;

pub use marketplace_system::*;
pub use telemetry::*;
