//! Telemetry initialization for the heroes loader.

pub mod tracing;
