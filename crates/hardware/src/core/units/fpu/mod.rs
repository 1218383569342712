//! Floating-Point Units.
//!
//! This module implements the fixed-latency arithmetic units wired together by
//! the stage sequencer. Each unit computes its operation on issue and holds the
//! result in an output register chain of exactly `latency` slots, so results
//! leave in issue order.
//!
//! Special values (NaN, infinities) are not inspected; they propagate by the
//! usual IEEE 754 rules.

use crate::common::record::Lane;
use crate::core::pipeline::delay_line::DelayLine;
use crate::core::pipeline::traits::{FunctionalStage, Operands};

/// Arithmetic operation performed by a functional unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StageOp {
    /// `x * x`.
    Square,
    /// `k * x` for a constant `k`.
    Scale(f64),
    /// `x * y`.
    Multiply,
    /// `x + y`.
    Add,
    /// `x - y`.
    Subtract,
}

impl StageOp {
    /// Number of operands the operation consumes.
    pub const fn arity(self) -> usize {
        match self {
            Self::Square | Self::Scale(_) => 1,
            Self::Multiply | Self::Add | Self::Subtract => 2,
        }
    }

    /// Evaluates the operation. Unary operations ignore `rhs`.
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Square => lhs * lhs,
            Self::Scale(k) => k * lhs,
            Self::Multiply => lhs * rhs,
            Self::Add => lhs + rhs,
            Self::Subtract => lhs - rhs,
        }
    }
}

/// A pipelined floating-point unit with a fixed latency.
#[derive(Clone, Debug)]
pub struct FunctionalUnit {
    op: StageOp,
    pipe: DelayLine<Lane>,
}

impl FunctionalUnit {
    /// Creates a unit performing `op` with `latency` ticks of pipelining.
    ///
    /// Callers validate `latency >= 1`; a zero-latency unit would be
    /// combinational and is rejected at graph construction.
    pub fn new(op: StageOp, latency: usize) -> Self {
        Self {
            op,
            pipe: DelayLine::new(latency),
        }
    }
}

impl FunctionalStage for FunctionalUnit {
    fn latency(&self) -> usize {
        self.pipe.len()
    }

    fn issue(&mut self, input: Option<Operands>) -> Option<Lane> {
        let op = self.op;
        self.pipe.shift(input.map(|ops| Lane {
            seq: ops.seq,
            value: op.apply(ops.lhs, ops.rhs),
        }))
    }

    fn pending_output(&self) -> Option<Lane> {
        self.pipe.peek_out().copied()
    }

    fn occupancy(&self) -> usize {
        self.pipe.occupancy()
    }

    fn flush(&mut self) {
        self.pipe.flush();
    }
}
