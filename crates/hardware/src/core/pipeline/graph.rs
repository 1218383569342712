//! Stage dependency graph and static schedule.
//!
//! This module describes which functional stages exist, what they compute,
//! how long they take, and which values feed them. It provides:
//! 1. **Graph Declaration:** A builder that accepts stages in topological order.
//! 2. **Validation:** Arity, latency, reference, and reachability checks.
//! 3. **Scheduling:** Issue and ready ticks for every stage, the delay every
//!    operand edge needs, and the overall pipeline depth.
//!
//! Delay-line lengths are always derived here from the latency table. A
//! bypass that is off by one tick pairs operands from different records.

use crate::common::error::GraphError;
use crate::common::record::RECORD_OPERANDS;
use crate::config::StageConfig;
use crate::core::units::fpu::StageOp;

/// Index of a stage within its graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageId(pub usize);

/// Source of a stage operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Operand `i` of the admitted input record, available on the admission tick.
    Input(usize),
    /// Result of an earlier stage.
    Stage(StageId),
}

/// One declared functional stage.
#[derive(Clone, Debug, PartialEq)]
pub struct StageSpec {
    /// Stage identifier used in diagnostics.
    pub name: String,
    /// Operation performed.
    pub op: StageOp,
    /// Ticks from issue to result.
    pub latency: usize,
    /// Operand sources, `op.arity()` of them.
    pub operands: Vec<Operand>,
}

/// Incremental graph declaration.
///
/// # Examples
///
/// ```
/// use streampipe_core::core::pipeline::graph::{GraphBuilder, Operand};
/// use streampipe_core::core::units::fpu::StageOp;
///
/// let mut g = GraphBuilder::new();
/// let sq = g.stage("square", StageOp::Square, 3, &[Operand::Input(0)]);
/// let sum = g.stage("add", StageOp::Add, 1, &[Operand::Stage(sq), Operand::Input(1)]);
/// let graph = g.build(sum).unwrap();
///
/// assert_eq!(graph.schedule().depth(), 4);
/// assert_eq!(graph.schedule().operand_delay(sum, 1), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    stages: Vec<StageSpec>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a stage and returns its identifier.
    ///
    /// Validation is deferred to [`build`](Self::build).
    pub fn stage(
        &mut self,
        name: impl Into<String>,
        op: StageOp,
        latency: usize,
        operands: &[Operand],
    ) -> StageId {
        let id = StageId(self.stages.len());
        self.stages.push(StageSpec {
            name: name.into(),
            op,
            latency,
            operands: operands.to_vec(),
        });
        id
    }

    /// Validates the declaration and computes its schedule.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] describing the first structural defect found.
    pub fn build(self, output: StageId) -> Result<StageGraph, GraphError> {
        if self.stages.is_empty() {
            return Err(GraphError::Empty);
        }
        if output.0 >= self.stages.len() {
            return Err(GraphError::UnknownOutput(output.0));
        }

        for (index, stage) in self.stages.iter().enumerate() {
            if stage.latency == 0 {
                return Err(GraphError::ZeroLatency {
                    stage: stage.name.clone(),
                });
            }
            if stage.operands.len() != stage.op.arity() {
                return Err(GraphError::ArityMismatch {
                    stage: stage.name.clone(),
                    expected: stage.op.arity(),
                    got: stage.operands.len(),
                });
            }
            for operand in &stage.operands {
                match *operand {
                    Operand::Input(i) if i >= RECORD_OPERANDS => {
                        return Err(GraphError::InputOutOfRange {
                            stage: stage.name.clone(),
                            index: i,
                            available: RECORD_OPERANDS,
                        });
                    }
                    Operand::Stage(StageId(target)) if target >= index => {
                        return Err(GraphError::ForwardReference {
                            stage: stage.name.clone(),
                            target,
                        });
                    }
                    _ => {}
                }
            }
        }

        // Walk backwards from the output; topological order means one pass suffices.
        let mut live = vec![false; self.stages.len()];
        live[output.0] = true;
        for index in (0..self.stages.len()).rev() {
            if !live[index] {
                continue;
            }
            for operand in &self.stages[index].operands {
                if let Operand::Stage(StageId(src)) = *operand {
                    live[src] = true;
                }
            }
        }
        if let Some(dead) = live.iter().position(|&is_live| !is_live) {
            return Err(GraphError::UnusedStage {
                stage: self.stages[dead].name.clone(),
            });
        }

        let schedule = Schedule::compute(&self.stages, output);
        Ok(StageGraph {
            stages: self.stages,
            output,
            schedule,
        })
    }
}

/// A validated, acyclic stage graph with its static schedule.
#[derive(Clone, Debug, PartialEq)]
pub struct StageGraph {
    stages: Vec<StageSpec>,
    output: StageId,
    schedule: Schedule,
}

impl StageGraph {
    /// Builds the `a^5 + k*b - c` graph from a latency table.
    ///
    /// Stage group 1 squares `a` and scales `b` in parallel; the square is
    /// squared again, multiplied by a delayed `a`, summed with the delayed
    /// `k*b`, and finally the delayed `c` is subtracted.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ZeroLatency`] if any configured latency is zero.
    pub fn quintic(cfg: &StageConfig) -> Result<Self, GraphError> {
        let mut g = GraphBuilder::new();
        let square = g.stage(
            "square",
            StageOp::Square,
            cfg.square_latency,
            &[Operand::Input(0)],
        );
        let scale = g.stage(
            "scale",
            StageOp::Scale(cfg.scale_factor),
            cfg.scale_latency,
            &[Operand::Input(1)],
        );
        let fourth = g.stage(
            "fourth_power",
            StageOp::Multiply,
            cfg.fourth_power_latency,
            &[Operand::Stage(square), Operand::Stage(square)],
        );
        let fifth = g.stage(
            "fifth_power",
            StageOp::Multiply,
            cfg.fifth_power_latency,
            &[Operand::Stage(fourth), Operand::Input(0)],
        );
        let sum = g.stage(
            "add",
            StageOp::Add,
            cfg.add_latency,
            &[Operand::Stage(fifth), Operand::Stage(scale)],
        );
        let diff = g.stage(
            "subtract",
            StageOp::Subtract,
            cfg.subtract_latency,
            &[Operand::Stage(sum), Operand::Input(2)],
        );
        g.build(diff)
    }

    /// Declared stages in topological order.
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Stage whose result is the pipeline output.
    pub const fn output(&self) -> StageId {
        self.output
    }

    /// Static timing derived from the latency table.
    pub const fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Returns the stage with the given name.
    pub fn find(&self, name: &str) -> Option<StageId> {
        self.stages
            .iter()
            .position(|stage| stage.name == name)
            .map(StageId)
    }

    /// Evaluates the graph directly on one set of operands, with no timing.
    ///
    /// Useful as a reference for what the pipelined evaluation must produce.
    pub fn evaluate(&self, inputs: &[f64; RECORD_OPERANDS]) -> f64 {
        let mut results = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let fetch = |operand: &Operand| match *operand {
                Operand::Input(i) => inputs[i],
                Operand::Stage(StageId(src)) => results[src],
            };
            let lhs = stage.operands.first().map_or(0.0, fetch);
            let rhs = stage.operands.get(1).map_or(0.0, fetch);
            results.push(stage.op.apply(lhs, rhs));
        }
        results[self.output.0]
    }
}

/// A bypass: an operand edge that needs a non-zero alignment delay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bypass {
    /// Consuming stage.
    pub stage: StageId,
    /// Operand position at the consuming stage.
    pub operand: usize,
    /// Value source.
    pub source: Operand,
    /// Delay in ticks: the latency sum of the stages bypassed.
    pub delay: usize,
}

/// Issue and ready ticks relative to admission, for every stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    issue: Vec<usize>,
    ready: Vec<usize>,
    delays: Vec<Vec<usize>>,
    depth: usize,
}

impl Schedule {
    fn compute(stages: &[StageSpec], output: StageId) -> Self {
        let mut issue = Vec::with_capacity(stages.len());
        let mut ready: Vec<usize> = Vec::with_capacity(stages.len());
        let mut delays = Vec::with_capacity(stages.len());

        for stage in stages {
            let available = |operand: &Operand| match *operand {
                Operand::Input(_) => 0,
                Operand::Stage(StageId(src)) => ready[src],
            };
            let at = stage.operands.iter().map(available).max().unwrap_or(0);
            delays.push(
                stage
                    .operands
                    .iter()
                    .map(|operand| at - available(operand))
                    .collect(),
            );
            issue.push(at);
            ready.push(at + stage.latency);
        }

        let depth = ready[output.0];
        Self {
            issue,
            ready,
            delays,
            depth,
        }
    }

    /// Total pipeline depth: ticks from admission until the output stage's result.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Tick, relative to admission, on which a stage receives its operands.
    pub fn issue_tick(&self, stage: StageId) -> usize {
        self.issue[stage.0]
    }

    /// Tick, relative to admission, on which a stage's result is available.
    pub fn ready_tick(&self, stage: StageId) -> usize {
        self.ready[stage.0]
    }

    /// Alignment delay on operand `operand` of `stage`.
    pub fn operand_delay(&self, stage: StageId, operand: usize) -> usize {
        self.delays[stage.0][operand]
    }

    /// Delays for every operand of `stage`, in operand order.
    pub fn operand_delays(&self, stage: StageId) -> &[usize] {
        &self.delays[stage.0]
    }

    /// Every operand edge that needs a non-zero alignment delay.
    pub fn bypasses(&self, stages: &[StageSpec]) -> Vec<Bypass> {
        let mut out = Vec::new();
        for (index, stage) in stages.iter().enumerate() {
            for (operand, (&source, &delay)) in
                stage.operands.iter().zip(&self.delays[index]).enumerate()
            {
                if delay > 0 {
                    out.push(Bypass {
                        stage: StageId(index),
                        operand,
                        source,
                        delay,
                    });
                }
            }
        }
        out
    }
}
