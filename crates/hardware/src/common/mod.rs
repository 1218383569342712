//! Common types shared across the simulator.
//!
//! This module provides the building blocks used by every other component:
//! 1. **Records:** Input and output records plus the tagged lane carried between stages.
//! 2. **Error Handling:** Graph, configuration, and tick-commit error types.

/// Error types for graph construction, configuration, and tick commits.
pub mod error;

/// Record and lane definitions.
pub mod record;

pub use error::{ConfigError, GraphError, PipelineError};
pub use record::{InputRecord, Lane, OutputRecord, RECORD_OPERANDS};
