//! Pipeline engine: admission, stages, and drain wired together.
//!
//! This module defines the tick protocol seen by producer and consumer:
//! 1. **During a tick:** at most one `offer` and one `consume`, both decided
//!    from the state at the start of the tick.
//! 2. **At the tick boundary:** `tick` commits everything atomically. The
//!    stages advance, a retrieved head is popped, the final stage's output is
//!    appended, and the staged credit changes are applied together.
//!
//! A record admitted on tick `n` spends `depth` ticks in the stages and is
//! retrievable from tick `n + depth + 1`.

use crate::common::error::{ConfigError, PipelineError};
use crate::common::record::{InputRecord, OutputRecord};
use crate::config::{Config, CreditPolicy};
use crate::core::pipeline::admission::{AdmissionController, CreditView};
use crate::core::pipeline::drain::DrainBuffer;
use crate::core::pipeline::graph::StageGraph;
use crate::core::pipeline::sequencer::StageSequencer;
use crate::core::pipeline::traits::FunctionalStage;

/// What one committed tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// A record entered the stages.
    pub admitted: bool,
    /// A result left the final stage and entered the drain buffer.
    pub emitted: bool,
    /// The consumer retrieved a result.
    pub retired: bool,
}

/// The full streaming pipeline.
#[derive(Debug)]
pub struct Pipeline {
    graph: StageGraph,
    admission: AdmissionController,
    sequencer: StageSequencer,
    drain: DrainBuffer,
    /// Record admitted during the current tick, with its sequence number.
    staged_input: Option<(u64, InputRecord)>,
    /// The consumer took the drain head during the current tick.
    staged_retrieval: bool,
    emitted_total: u64,
}

impl Pipeline {
    /// Builds the `a^5 + k*b - c` pipeline described by `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration is invalid or the
    /// capacity cannot cover the pipeline depth.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let graph = StageGraph::quintic(&config.stages)?;
        Self::with_graph(graph, config.pipeline.capacity, config.pipeline.credit_policy)
    }

    /// Builds a pipeline around an arbitrary validated stage graph.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] or
    /// [`ConfigError::CapacityBelowDepth`].
    pub fn with_graph(
        graph: StageGraph,
        capacity: usize,
        policy: CreditPolicy,
    ) -> Result<Self, ConfigError> {
        let depth = graph.schedule().depth();
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if capacity < depth {
            return Err(ConfigError::CapacityBelowDepth { capacity, depth });
        }
        if capacity < depth + 2 {
            tracing::warn!(
                capacity,
                depth,
                "capacity below depth + 2; back-to-back streaming will see bubbles"
            );
        }

        let sequencer = StageSequencer::new(&graph);
        tracing::debug!(
            depth,
            capacity,
            ?policy,
            bypasses = ?graph.schedule().bypasses(graph.stages()),
            "pipeline constructed"
        );

        Ok(Self {
            admission: AdmissionController::new(capacity, depth, policy),
            sequencer,
            drain: DrainBuffer::new(capacity),
            graph,
            staged_input: None,
            staged_retrieval: false,
            emitted_total: 0,
        })
    }

    /// The stage graph this pipeline evaluates.
    pub const fn graph(&self) -> &StageGraph {
        &self.graph
    }

    /// Ticks from admission until the final stage's result.
    pub const fn depth(&self) -> usize {
        self.sequencer.depth()
    }

    /// Maximum records in flight.
    pub const fn capacity(&self) -> usize {
        self.admission.capacity()
    }

    /// Records admitted and not yet retrieved, as of the last commit.
    pub const fn in_flight(&self) -> usize {
        self.admission.in_flight()
    }

    /// Results waiting in the drain buffer.
    pub const fn buffered(&self) -> usize {
        self.drain.len()
    }

    /// Records inside the stages, as of the last commit.
    pub const fn in_pipeline(&self) -> usize {
        (self.admission.admitted_total() - self.emitted_total) as usize
    }

    /// The admission controller (read-only).
    pub const fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    /// The stage sequencer (read-only).
    pub const fn sequencer(&self) -> &StageSequencer {
        &self.sequencer
    }

    fn credit_view(&self) -> CreditView {
        CreditView {
            buffered: self.drain.len(),
            emitting: self.sequencer.emitting(),
        }
    }

    /// Ready signal: true if an offer made now would be accepted.
    pub fn can_accept(&self) -> bool {
        self.admission.can_accept(self.credit_view())
    }

    /// Offers a record for this tick.
    ///
    /// # Returns
    ///
    /// `true` if the record was admitted. A denied record is not retained; the
    /// producer re-offers it on a later tick.
    pub fn offer(&mut self, record: InputRecord) -> bool {
        match self.admission.admit(self.credit_view()) {
            Some(seq) => {
                self.staged_input = Some((seq, record));
                true
            }
            None => false,
        }
    }

    /// Result-available signal.
    ///
    /// Stays asserted from the tick the head result arrives until the tick the
    /// consumer retrieves it.
    pub fn available(&self) -> bool {
        !self.staged_retrieval && !self.drain.is_empty()
    }

    /// Retrieves the oldest completed result.
    ///
    /// # Returns
    ///
    /// `None` if [`available`](Self::available) is false.
    pub fn consume(&mut self) -> Option<OutputRecord> {
        if !self.available() {
            return None;
        }
        self.staged_retrieval = true;
        self.drain.front().copied()
    }

    /// Commits the current tick.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] if any invariant is violated. The pipeline
    /// state is unspecified afterwards; call [`reset`](Self::reset) before reuse.
    pub fn tick(&mut self) -> Result<TickOutcome, PipelineError> {
        self.commit().inspect_err(|e| {
            tracing::error!(
                error = %e,
                in_flight = self.admission.in_flight(),
                buffered = self.drain.len(),
                "pipeline invariant violated"
            );
        })
    }

    fn commit(&mut self) -> Result<TickOutcome, PipelineError> {
        let emitted = self.sequencer.step(self.staged_input.take())?;

        if std::mem::take(&mut self.staged_retrieval) {
            let _ = self.drain.pop(&mut self.admission)?;
        }
        if let Some(record) = emitted {
            if record.seq != self.emitted_total {
                return Err(PipelineError::OutOfSequence {
                    expected: self.emitted_total,
                    got: record.seq,
                });
            }
            self.drain.push(record)?;
            self.emitted_total += 1;
        }

        let delta = self.admission.commit()?;

        // Counters and stage contents must agree on emptiness.
        let in_pipeline = self.in_pipeline();
        let held = self.sequencer.occupancy();
        if (in_pipeline == 0) != (held == 0) {
            return Err(PipelineError::CreditMismatch { in_pipeline, held });
        }

        Ok(TickOutcome {
            admitted: delta.admitted,
            emitted: emitted.is_some(),
            retired: delta.retired,
        })
    }

    /// Replaces the functional unit of a named stage.
    ///
    /// Only allowed while the stages are empty and nothing has been admitted
    /// this tick; a swap would otherwise discard the records inside the old
    /// unit without releasing their credits.
    ///
    /// # Returns
    ///
    /// `false` (and leaves the stage untouched) if no stage has that name, the
    /// replacement's latency differs, or records are still inside the stages.
    pub fn replace_unit(&mut self, stage: &str, unit: Box<dyn FunctionalStage + Send>) -> bool {
        if self.staged_input.is_some() || self.in_pipeline() > 0 {
            tracing::warn!(
                stage,
                in_pipeline = self.in_pipeline(),
                "unit replacement refused while records are in the stages"
            );
            return false;
        }
        match self.graph.find(stage) {
            Some(id) => self.sequencer.replace_unit(id, unit),
            None => false,
        }
    }

    /// Discards every in-flight record and returns to the initial empty state.
    pub fn reset(&mut self) {
        self.sequencer.flush();
        self.drain.flush_all();
        self.admission.reset();
        self.staged_input = None;
        self.staged_retrieval = false;
        self.emitted_total = 0;
    }
}
