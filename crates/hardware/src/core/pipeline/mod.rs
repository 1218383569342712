//! Streaming pipeline implementation.
//!
//! This module contains the components between producer and consumer:
//! 1. **Graph:** Stage declarations, validation, and the static latency schedule.
//! 2. **Delay Lines:** Fixed-length shift registers for operand alignment.
//! 3. **Sequencer:** Drives every unit and delay line once per tick.
//! 4. **Admission:** The in-flight credit counter and its policies.
//! 5. **Drain:** The FIFO of completed results awaiting the consumer.
//! 6. **Engine:** The tick protocol tying them together.
//! 7. **Traits:** The functional stage boundary.

/// Admission controller and in-flight credit accounting.
pub mod admission;

/// Fixed-length shift registers.
pub mod delay_line;

/// Drain buffer for completed results.
pub mod drain;

/// The assembled pipeline and its tick protocol.
pub mod engine;

/// Stage dependency graph and static schedule.
pub mod graph;

/// Stage sequencer wiring units and delay lines.
pub mod sequencer;

/// Functional stage interface.
pub mod traits;
