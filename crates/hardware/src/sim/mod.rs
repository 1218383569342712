//! Simulation driver.
//!
//! Wraps the pipeline with a tick counter, statistics, and tracing.

/// Tick-driving simulator owning the pipeline and its statistics.
pub mod simulator;
