//! Pipeline core.
//!
//! This module contains the streaming pipeline itself: the stage graph and its
//! schedule, alignment delay lines, the stage sequencer, admission control,
//! the drain buffer, and the arithmetic units the stages are built from.

/// Pipeline structure and flow control (graph, delay lines, sequencer, admission, drain).
pub mod pipeline;

/// Fixed-latency execution units.
pub mod units;

pub use self::pipeline::engine::Pipeline;
