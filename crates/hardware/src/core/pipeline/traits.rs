//! Functional Stage Interface.
//!
//! This module defines the collaborator boundary between the stage sequencer
//! and the computation units it wires together. It provides:
//! 1. **Operand Bundle:** The aligned operands presented to a unit on one tick.
//! 2. **Functional Stage Interface:** The fixed-latency, never-refusing unit contract.

use std::fmt::Debug;

use crate::common::record::Lane;

/// Operands presented to a functional stage on one tick.
///
/// Unary stages ignore `rhs`. Both operands always belong to the record
/// identified by `seq`; the sequencer checks tags before building this.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Operands {
    /// Admission sequence number of the record being computed.
    pub seq: u64,
    /// First operand.
    pub lhs: f64,
    /// Second operand (binary stages only).
    pub rhs: f64,
}

/// A fully pipelined, fixed-latency computation unit.
///
/// Implementors accept one input every tick without exception and emit the
/// result exactly [`latency`](Self::latency) ticks later. There is no busy or
/// refusal signal; the stage sequencer relies on this to drive every unit
/// unconditionally once a record has been admitted.
pub trait FunctionalStage: Debug {
    /// Ticks between issue and result.
    fn latency(&self) -> usize;

    /// Executes one tick.
    ///
    /// # Arguments
    ///
    /// * `input` - Operands issued this tick, or `None` for a bubble.
    ///
    /// # Returns
    ///
    /// The result of the operands issued `latency()` ticks ago, or `None` if a
    /// bubble was issued then.
    fn issue(&mut self, input: Option<Operands>) -> Option<Lane>;

    /// The lane the next [`issue`](Self::issue) call will return.
    fn pending_output(&self) -> Option<Lane>;

    /// Number of records currently inside the unit.
    fn occupancy(&self) -> usize;

    /// Discards every in-flight result.
    fn flush(&mut self);
}
