//! # Credit Policy Equivalence
//!
//! Runs the combined and split credit policies side by side over every
//! offer/poll pattern of a bounded horizon, for small geometries with capacity
//! from the pipeline depth up to the zero-bubble streaming bound. Both policies must make
//! the same decision on every tick, and every admitted record must drain.

use streampipe_core::Pipeline;
use streampipe_core::config::CreditPolicy;
use streampipe_core::core::pipeline::graph::{GraphBuilder, Operand, StageGraph};
use streampipe_core::core::units::fpu::StageOp;

use crate::common::TestContext;

/// Ticks enumerated per pattern; each tick chooses offer and poll independently.
const HORIZON: u32 = 7;

/// A graph of the given depth with one bypass when depth allows it.
fn graph_of_depth(depth: usize) -> StageGraph {
    let mut g = GraphBuilder::new();
    let out = if depth == 1 {
        g.stage("scale", StageOp::Scale(2.0), 1, &[Operand::Input(0)])
    } else {
        let sq = g.stage("square", StageOp::Square, depth - 1, &[Operand::Input(0)]);
        g.stage("add", StageOp::Add, 1, &[Operand::Stage(sq), Operand::Input(1)])
    };
    g.build(out).unwrap()
}

fn context(graph: &StageGraph, capacity: usize, policy: CreditPolicy) -> TestContext {
    crate::common::init_tracing();
    TestContext::with_pipeline(Pipeline::with_graph(graph.clone(), capacity, policy).unwrap())
}

fn compare_policies(depth: usize, capacity: usize) {
    let graph = graph_of_depth(depth);
    assert_eq!(graph.schedule().depth(), depth);
    let mut combined = context(&graph, capacity, CreditPolicy::Combined);
    let mut split = context(&graph, capacity, CreditPolicy::Split);

    for pattern in 0_u32..(1 << (2 * HORIZON)) {
        combined.reset();
        split.reset();
        for tick in 0..HORIZON {
            let offer = pattern >> (2 * tick) & 1 == 1;
            let consume = pattern >> (2 * tick + 1) & 1 == 1;
            let a = combined.step(offer, consume);
            let b = split.step(offer, consume);
            assert_eq!(
                a, b,
                "depth {depth}, capacity {capacity}, pattern {pattern:#b}, tick {tick}"
            );
        }
        let drained = combined.drain(64);
        assert_eq!(split.drain(64), drained);
        assert_eq!(combined.retrieved, split.retrieved);
    }
}

#[test]
fn test_policies_agree_depth_1() {
    for capacity in 1..=3 {
        compare_policies(1, capacity);
    }
}

#[test]
fn test_policies_agree_depth_2() {
    for capacity in 2..=4 {
        compare_policies(2, capacity);
    }
}

#[test]
fn test_policies_agree_depth_3() {
    for capacity in 3..=5 {
        compare_policies(3, capacity);
    }
}

#[test]
fn test_policies_agree_default_geometry_under_saturation() {
    let graph = StageGraph::quintic(&Default::default()).unwrap();
    let mut combined = context(&graph, 16, CreditPolicy::Combined);
    let mut split = context(&graph, 16, CreditPolicy::Split);
    // Fill, stall the consumer, then alternate bursts of retrieval and offers.
    for tick in 0_u64..400 {
        let offer = tick % 7 != 3;
        let consume = (tick / 40) % 2 == 1 || tick % 5 == 0;
        assert_eq!(combined.step(offer, consume), split.step(offer, consume), "tick {tick}");
    }
}
