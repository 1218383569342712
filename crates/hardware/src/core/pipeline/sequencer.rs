//! Stage Sequencer.
//!
//! Wires functional units and alignment delay lines into the declared stage
//! graph and advances all of them exactly once per tick. The sequencer owns no
//! state of its own beyond the units, the lines, and a per-stage scratch slot
//! reused every tick.
//!
//! Every operand edge gets a delay line whose length comes from the graph's
//! schedule; edges fed by the immediately preceding stage get a zero-length
//! (pass-through) line.

use crate::common::error::PipelineError;
use crate::common::record::{InputRecord, Lane, OutputRecord};
use crate::core::pipeline::delay_line::DelayLine;
use crate::core::pipeline::graph::{Operand, StageGraph, StageId};
use crate::core::pipeline::traits::{FunctionalStage, Operands};
use crate::core::units::fpu::FunctionalUnit;

/// Runtime state of one stage: its unit plus one alignment line per operand.
#[derive(Debug)]
struct StageSlot {
    name: String,
    sources: Vec<Operand>,
    aligners: Vec<DelayLine<Lane>>,
    unit: Box<dyn FunctionalStage + Send>,
}

/// Drives the stage graph one tick at a time.
#[derive(Debug)]
pub struct StageSequencer {
    slots: Vec<StageSlot>,
    /// Unit outputs produced during the current tick, indexed by stage.
    scratch: Vec<Option<Lane>>,
    output: StageId,
    depth: usize,
}

impl StageSequencer {
    /// Builds units and delay lines for a validated graph.
    pub fn new(graph: &StageGraph) -> Self {
        let schedule = graph.schedule();
        let slots: Vec<StageSlot> = graph
            .stages()
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let id = StageId(index);
                tracing::debug!(
                    stage = %spec.name,
                    issue = schedule.issue_tick(id),
                    ready = schedule.ready_tick(id),
                    delays = ?schedule.operand_delays(id),
                    "stage scheduled"
                );
                StageSlot {
                    name: spec.name.clone(),
                    sources: spec.operands.clone(),
                    aligners: schedule
                        .operand_delays(id)
                        .iter()
                        .map(|&delay| DelayLine::new(delay))
                        .collect(),
                    unit: Box::new(FunctionalUnit::new(spec.op, spec.latency)),
                }
            })
            .collect();
        let scratch = vec![None; slots.len()];
        Self {
            slots,
            scratch,
            output: graph.output(),
            depth: schedule.depth(),
        }
    }

    /// Replaces the unit of one stage with a custom implementation.
    ///
    /// The replacement must have the same latency as the declared stage, or
    /// the precomputed alignment delays no longer hold. Swaps are only taken
    /// while every unit and delay line is empty.
    ///
    /// # Returns
    ///
    /// `false` (and leaves the stage untouched) if the stage does not exist,
    /// the latencies differ, or any value is still in flight.
    pub fn replace_unit(&mut self, stage: StageId, unit: Box<dyn FunctionalStage + Send>) -> bool {
        if !self.is_idle() {
            return false;
        }
        match self.slots.get_mut(stage.0) {
            Some(slot) if slot.unit.latency() == unit.latency() => {
                slot.unit = unit;
                true
            }
            _ => false,
        }
    }

    /// Total pipeline depth in ticks.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Lengths of every stage's operand delay lines, in graph order.
    pub fn aligner_lengths(&self) -> Vec<Vec<usize>> {
        self.slots
            .iter()
            .map(|slot| slot.aligners.iter().map(DelayLine::len).collect())
            .collect()
    }

    /// Values held by every unit and delay line.
    ///
    /// A record whose operands bypass stages is counted once per lane, so
    /// this bounds the number of records from above, not exactly.
    pub fn occupancy(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| {
                slot.unit.occupancy()
                    + slot.aligners.iter().map(DelayLine::occupancy).sum::<usize>()
            })
            .sum()
    }

    /// Returns true if no unit or delay line holds a value.
    pub fn is_idle(&self) -> bool {
        self.occupancy() == 0
    }

    /// Returns true if a result will leave the output stage on the next tick.
    pub fn emitting(&self) -> bool {
        self.slots
            .get(self.output.0)
            .is_some_and(|slot| slot.unit.pending_output().is_some())
    }

    /// Advances every stage and delay line by one tick.
    ///
    /// # Arguments
    ///
    /// * `input` - The record admitted this tick with its sequence number, or `None`.
    ///
    /// # Returns
    ///
    /// The record completing this tick, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Misaligned`] or [`PipelineError::OperandMissing`]
    /// if the operands meeting at a binary stage do not belong to the same record.
    pub fn step(
        &mut self,
        input: Option<(u64, InputRecord)>,
    ) -> Result<Option<OutputRecord>, PipelineError> {
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            let mut aligned = [None; 2];
            for (k, (source, aligner)) in slot.sources.iter().zip(&mut slot.aligners).enumerate() {
                let value = match *source {
                    Operand::Input(i) => input.and_then(|(seq, record)| {
                        record.operand(i).map(|value| Lane { seq, value })
                    }),
                    Operand::Stage(StageId(src)) => self.scratch[src],
                };
                aligned[k] = aligner.shift(value);
            }

            let issued = match (slot.sources.len(), aligned[0], aligned[1]) {
                (1, Some(lhs), _) => Some(Operands {
                    seq: lhs.seq,
                    lhs: lhs.value,
                    rhs: 0.0,
                }),
                (_, None, None) | (1, None, _) => None,
                (_, Some(lhs), Some(rhs)) if lhs.seq == rhs.seq => Some(Operands {
                    seq: lhs.seq,
                    lhs: lhs.value,
                    rhs: rhs.value,
                }),
                (_, Some(lhs), Some(rhs)) => {
                    return Err(PipelineError::Misaligned {
                        stage: slot.name.clone(),
                        lhs: lhs.seq,
                        rhs: rhs.seq,
                    });
                }
                _ => {
                    return Err(PipelineError::OperandMissing {
                        stage: slot.name.clone(),
                    });
                }
            };
            self.scratch[index] = slot.unit.issue(issued);
        }
        Ok(self.scratch[self.output.0].map(OutputRecord::from))
    }

    /// Discards every in-flight value in every unit and delay line.
    pub fn flush(&mut self) {
        for slot in &mut self.slots {
            slot.unit.flush();
            for aligner in &mut slot.aligners {
                aligner.flush();
            }
        }
        self.scratch.fill(None);
    }
}
