//! Tick-accurate streaming pipeline simulator library.
//!
//! This crate models a chain of fixed-latency computation stages that accepts
//! one record per tick, with the following:
//! 1. **Pipeline:** Stage graph scheduling, operand alignment delay lines, and the stage sequencer.
//! 2. **Flow Control:** Credit-based admission and an order-preserving drain buffer.
//! 3. **Units:** Fixed-latency floating-point units behind a stage trait.
//! 4. **Simulation:** Configuration, a tick-driving simulator, and statistics collection.

/// Common types (records, lanes, error types).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Pipeline core (graph, delay lines, sequencer, admission, drain, units).
pub mod core;
/// Tick-driving simulator.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or load from JSON.
pub use crate::config::Config;
/// The assembled pipeline; construct with `Pipeline::new`.
pub use crate::core::Pipeline;
/// Top-level simulator: pipeline plus statistics.
pub use crate::sim::simulator::Simulator;
