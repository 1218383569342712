//! Error definitions for graph construction, configuration, and tick commits.
//!
//! This module defines the three error families of the simulator. It provides:
//! 1. **Graph Errors:** Structural defects in a declared stage dependency graph.
//! 2. **Config Errors:** Parse, I/O, and sizing failures while loading a configuration.
//! 3. **Pipeline Errors:** Invariant violations detected while committing a tick.
//!
//! Admission denial is flow control and never appears here. Every `PipelineError`
//! indicates a construction defect (wrong capacity, wrong delay-line length) and
//! is fatal to the run that produced it.

use thiserror::Error;

/// Structural defects in a stage dependency graph.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The graph declares no stages.
    #[error("stage graph is empty")]
    Empty,

    /// A stage references an input operand index that records do not carry.
    #[error("stage `{stage}` reads input operand {index}, but records carry {available}")]
    InputOutOfRange {
        /// Name of the offending stage.
        stage: String,
        /// Requested operand index.
        index: usize,
        /// Number of operands per record.
        available: usize,
    },

    /// A stage references itself or a stage declared after it.
    ///
    /// Stages must be declared in topological order, which rules out cycles.
    #[error("stage `{stage}` references stage {target}, which is not declared before it")]
    ForwardReference {
        /// Name of the offending stage.
        stage: String,
        /// Index of the referenced stage.
        target: usize,
    },

    /// The operand list length does not match the operation's arity.
    #[error("stage `{stage}` takes {expected} operand(s), got {got}")]
    ArityMismatch {
        /// Name of the offending stage.
        stage: String,
        /// Arity of the operation.
        expected: usize,
        /// Number of operands supplied.
        got: usize,
    },

    /// A functional stage was declared with zero latency.
    #[error("stage `{stage}` has zero latency")]
    ZeroLatency {
        /// Name of the offending stage.
        stage: String,
    },

    /// The output designator does not name a declared stage.
    #[error("output stage {0} is not declared")]
    UnknownOutput(usize),

    /// A stage never contributes to the graph output.
    #[error("stage `{stage}` does not contribute to the output")]
    UnusedStage {
        /// Name of the dead stage.
        stage: String,
    },
}

/// Failures while loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration text is not valid JSON for [`Config`](crate::config::Config).
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The in-flight capacity is zero; nothing could ever be admitted.
    #[error("in-flight capacity must be non-zero")]
    ZeroCapacity,

    /// The in-flight capacity cannot cover the pipeline depth.
    #[error("in-flight capacity {capacity} is below the pipeline depth {depth}")]
    CapacityBelowDepth {
        /// Configured capacity.
        capacity: usize,
        /// Longest-path latency of the stage graph.
        depth: usize,
    },

    /// The configured stage table does not form a valid graph.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Invariant violations detected while committing a tick.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PipelineError {
    /// A completed result arrived while the drain buffer was full.
    #[error("drain buffer overflow: write attempted at capacity {capacity}")]
    DrainOverflow {
        /// Drain buffer capacity.
        capacity: usize,
    },

    /// A retrieval was committed against an empty drain buffer.
    #[error("drain buffer underflow: read attempted while empty")]
    DrainUnderflow,

    /// A retirement would drive the in-flight count below zero.
    #[error("in-flight counter underflow")]
    CreditUnderflow,

    /// An admission would drive the in-flight count above capacity.
    #[error("in-flight counter {in_flight} exceeds capacity {capacity}")]
    CreditOverflow {
        /// Counter value after the commit.
        in_flight: usize,
        /// Configured capacity.
        capacity: usize,
    },

    /// The credit counters and the stages disagree on whether records are inside.
    #[error("{in_pipeline} record(s) counted inside the stages, but the stages hold {held} value(s)")]
    CreditMismatch {
        /// Records admitted and not yet emitted, per the counters.
        in_pipeline: usize,
        /// Values actually held by the units and delay lines.
        held: usize,
    },

    /// The output stage emitted a record other than the next one admitted.
    ///
    /// A later tag means records were lost inside the stages; an earlier one
    /// means a record was emitted twice.
    #[error("output stage emitted record {got}, expected record {expected}")]
    OutOfSequence {
        /// Sequence number of the oldest record not yet emitted.
        expected: u64,
        /// Sequence number actually emitted.
        got: u64,
    },

    /// Two operands from different records met at a binary stage.
    #[error("stage `{stage}` combined record {lhs} with record {rhs}")]
    Misaligned {
        /// Name of the consuming stage.
        stage: String,
        /// Sequence tag of the left operand.
        lhs: u64,
        /// Sequence tag of the right operand.
        rhs: u64,
    },

    /// Exactly one operand of a binary stage carried a record.
    #[error("stage `{stage}` received a record on one operand and a bubble on the other")]
    OperandMissing {
        /// Name of the consuming stage.
        stage: String,
    },
}
