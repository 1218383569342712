//! # Record Integrity Tests
//!
//! Every admitted record leaves the stages exactly once. Unit swaps are held
//! off while records are inside, and a unit that loses a record fails the tick.

use pretty_assertions::assert_eq;
use streampipe_core::common::{Lane, PipelineError};
use streampipe_core::core::pipeline::traits::{FunctionalStage, Operands};
use streampipe_core::core::units::fpu::{FunctionalUnit, StageOp};

use crate::common::{TestContext, synthetic};

/// Delegates to a real unit but never hands back one record's result.
#[derive(Debug)]
struct DroppingUnit {
    inner: FunctionalUnit,
    lost: u64,
}

impl DroppingUnit {
    fn new(op: StageOp, latency: usize, lost: u64) -> Self {
        Self {
            inner: FunctionalUnit::new(op, latency),
            lost,
        }
    }
}

impl FunctionalStage for DroppingUnit {
    fn latency(&self) -> usize {
        self.inner.latency()
    }

    fn issue(&mut self, input: Option<Operands>) -> Option<Lane> {
        let lost = self.lost;
        self.inner.issue(input).filter(|lane| lane.seq != lost)
    }

    fn pending_output(&self) -> Option<Lane> {
        self.inner.pending_output().filter(|lane| lane.seq != self.lost)
    }

    fn occupancy(&self) -> usize {
        self.inner.occupancy()
    }

    fn flush(&mut self) {
        self.inner.flush();
    }
}

/// Runs one-per-tick traffic until a tick fails or `ticks` have passed.
fn stream_until_error(ctx: &mut TestContext, records: u64, ticks: u64) -> Option<PipelineError> {
    for n in 0..ticks {
        if n < records {
            let _ = ctx.pipeline.offer(synthetic(n));
        }
        let _ = ctx.pipeline.consume();
        if let Err(e) = ctx.pipeline.tick() {
            return Some(e);
        }
    }
    None
}

#[test]
fn test_unit_swap_refused_mid_stream() {
    let mut ctx = TestContext::new();
    for _ in 0..20 {
        let _ = ctx.step(true, true);
    }
    let in_flight = ctx.pipeline.in_flight();
    assert!(ctx.pipeline.in_pipeline() > 0);
    assert!(!ctx.pipeline.replace_unit(
        "subtract",
        Box::new(FunctionalUnit::new(StageOp::Subtract, 2))
    ));
    assert_eq!(ctx.pipeline.in_flight(), in_flight);

    let _ = ctx.drain(100);
    assert_eq!(ctx.retrieved.len(), ctx.admitted.len());
    assert_eq!(ctx.pipeline.in_flight(), 0);
    ctx.check_results(3.0);

    // Empty again, so the swap is taken and traffic resumes.
    assert!(ctx.pipeline.replace_unit(
        "subtract",
        Box::new(FunctionalUnit::new(StageOp::Subtract, 2))
    ));
    for _ in 0..20 {
        let _ = ctx.step(true, true);
    }
    let _ = ctx.drain(100);
    assert_eq!(ctx.retrieved.len(), 40);
    ctx.check_results(3.0);
}

#[test]
fn test_unit_swap_refused_after_offer_this_tick() {
    let mut ctx = TestContext::new();
    assert!(ctx.pipeline.offer(synthetic(0)));
    assert!(!ctx.pipeline.replace_unit(
        "square",
        Box::new(FunctionalUnit::new(StageOp::Square, 4))
    ));
    assert!(ctx.pipeline.tick().is_ok());
    assert_eq!(ctx.pipeline.in_pipeline(), 1);
}

#[test]
fn test_lost_record_breaks_output_sequence() {
    let mut ctx = TestContext::new();
    let unit = DroppingUnit::new(StageOp::Subtract, 2, 3);
    assert!(ctx.pipeline.replace_unit("subtract", Box::new(unit)));

    assert_eq!(
        stream_until_error(&mut ctx, 40, 100),
        Some(PipelineError::OutOfSequence {
            expected: 3,
            got: 4
        })
    );
}

#[test]
fn test_lost_final_record_is_a_credit_mismatch() {
    let mut ctx = TestContext::new();
    let unit = DroppingUnit::new(StageOp::Subtract, 2, 0);
    assert!(ctx.pipeline.replace_unit("subtract", Box::new(unit)));

    assert_eq!(
        stream_until_error(&mut ctx, 1, 100),
        Some(PipelineError::CreditMismatch {
            in_pipeline: 1,
            held: 0
        })
    );

    ctx.pipeline.reset();
    assert_eq!(ctx.pipeline.in_flight(), 0);
    assert_eq!(ctx.pipeline.in_pipeline(), 0);
}

#[test]
fn test_faithful_stages_never_mismatch() {
    let mut ctx = TestContext::new();
    assert_eq!(stream_until_error(&mut ctx, 64, 200), None);
    assert_eq!(ctx.pipeline.in_flight(), 0);
    assert!(ctx.pipeline.sequencer().is_idle());
}
