//! Admission Controller.
//!
//! The controller owns the in-flight counter shared by the producer and the
//! consumer side of the pipeline. It provides:
//! 1. **Admission:** Accept or deny a record from the state at the start of the tick.
//! 2. **Retirement:** Release one credit when the drain buffer hands a result to the consumer.
//! 3. **Commit:** Apply the tick's staged admission and retirement together.
//!
//! Denial is flow control, not an error. Only a commit that would leave the
//! counter outside `[0, capacity]` is reported as a failure.

use crate::common::error::PipelineError;
use crate::config::CreditPolicy;

/// Occupancy information the split policy consults when admitting.
///
/// Both fields describe the state at the start of the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CreditView {
    /// Results held by the drain buffer.
    pub buffered: usize,
    /// Whether a result leaves the final stage at the end of this tick.
    pub emitting: bool,
}

/// Net effect of one committed tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CreditDelta {
    /// A record was admitted this tick.
    pub admitted: bool,
    /// A result was retired this tick.
    pub retired: bool,
}

/// Gates new records against a fixed in-flight capacity.
#[derive(Clone, Debug)]
pub struct AdmissionController {
    capacity: usize,
    depth: usize,
    policy: CreditPolicy,
    in_flight: usize,
    admitted_total: u64,
    retired_total: u64,
    /// Admission staged during the current tick.
    staged_admit: bool,
    /// Retirement staged during the current tick.
    staged_retire: bool,
}

impl AdmissionController {
    /// Creates a controller with an empty counter.
    ///
    /// `depth` is only consulted by [`CreditPolicy::Split`].
    pub const fn new(capacity: usize, depth: usize, policy: CreditPolicy) -> Self {
        Self {
            capacity,
            depth,
            policy,
            in_flight: 0,
            admitted_total: 0,
            retired_total: 0,
            staged_admit: false,
            staged_retire: false,
        }
    }

    /// Maximum number of records in flight.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records admitted and not yet retired, as of the last commit.
    #[inline]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Total records admitted since construction or reset.
    #[inline]
    pub const fn admitted_total(&self) -> u64 {
        self.admitted_total
    }

    /// Total records retired since construction or reset.
    #[inline]
    pub const fn retired_total(&self) -> u64 {
        self.retired_total
    }

    /// Active credit policy.
    #[inline]
    pub const fn policy(&self) -> CreditPolicy {
        self.policy
    }

    /// Returns true if an offer made now would be accepted.
    ///
    /// Independent of whether a result is waiting for the consumer.
    pub const fn can_accept(&self, view: CreditView) -> bool {
        if self.staged_admit || self.in_flight >= self.capacity {
            return false;
        }
        match self.policy {
            CreditPolicy::Combined => true,
            CreditPolicy::Split => {
                // Pipeline reservation: records still in the stages after this
                // tick's emission must leave room for one more.
                let in_pipeline = self.in_flight.saturating_sub(view.buffered);
                let leaving = if view.emitting { 1 } else { 0 };
                in_pipeline.saturating_sub(leaving) < self.depth
            }
        }
    }

    /// Attempts to admit one record this tick.
    ///
    /// # Returns
    ///
    /// The record's arrival-order sequence number if accepted.
    pub fn admit(&mut self, view: CreditView) -> Option<u64> {
        if !self.can_accept(view) {
            return None;
        }
        self.staged_admit = true;
        Some(self.admitted_total)
    }

    /// Stages the release of one credit for a result handed to the consumer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::CreditUnderflow`] if nothing is in flight or a
    /// retirement is already staged for this tick.
    pub fn retire(&mut self) -> Result<(), PipelineError> {
        if self.staged_retire || self.in_flight == 0 {
            return Err(PipelineError::CreditUnderflow);
        }
        self.staged_retire = true;
        Ok(())
    }

    /// Applies the tick's staged admission and retirement at the tick boundary.
    ///
    /// A simultaneous admission and retirement leaves the counter unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::CreditOverflow`] if the counter would exceed capacity.
    pub fn commit(&mut self) -> Result<CreditDelta, PipelineError> {
        let delta = CreditDelta {
            admitted: std::mem::take(&mut self.staged_admit),
            retired: std::mem::take(&mut self.staged_retire),
        };
        let next = self.in_flight + usize::from(delta.admitted) - usize::from(delta.retired);
        if next > self.capacity {
            return Err(PipelineError::CreditOverflow {
                in_flight: next,
                capacity: self.capacity,
            });
        }
        self.in_flight = next;
        self.admitted_total += u64::from(delta.admitted);
        self.retired_total += u64::from(delta.retired);
        Ok(delta)
    }

    /// Returns the counter to zero and discards anything staged.
    pub fn reset(&mut self) {
        self.in_flight = 0;
        self.admitted_total = 0;
        self.retired_total = 0;
        self.staged_admit = false;
        self.staged_retire = false;
    }
}
