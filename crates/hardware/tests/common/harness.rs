use streampipe_core::Pipeline;
use streampipe_core::common::{InputRecord, OutputRecord};
use streampipe_core::config::{Config, CreditPolicy, StageConfig};
use streampipe_core::core::pipeline::engine::TickOutcome;
use streampipe_core::core::pipeline::graph::StageGraph;
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once per process; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `a^5 + k*b - c`, computed in the same association order as the stages.
pub fn reference(record: &InputRecord, k: f64) -> f64 {
    let [a, b, c] = record.operands;
    let square = a * a;
    (square * square) * a + k * b - c
}

/// Deterministic, distinct operands for record `n`.
pub fn synthetic(n: u64) -> InputRecord {
    let x = n as f64;
    InputRecord::new(1.0 + (n % 5) as f64 * 0.5, x * 0.25, x + 0.125)
}

/// What happened on one tick driven through [`TestContext::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Step {
    /// The offered record was admitted.
    pub accepted: bool,
    /// The result the consumer retrieved, if any.
    pub retrieved: Option<OutputRecord>,
    /// The committed tick's outcome.
    pub outcome: TickOutcome,
}

/// Drives a pipeline tick by tick and checks every flow invariant on the way.
#[derive(Debug)]
pub struct TestContext {
    pub pipeline: Pipeline,
    pub now: u64,
    /// Admitted records, indexed by sequence number.
    pub admitted: Vec<InputRecord>,
    /// Retrieved results, in retrieval order.
    pub retrieved: Vec<OutputRecord>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Default configuration: depth 16, capacity 32.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        init_tracing();
        let pipeline = Pipeline::new(config).expect("valid test configuration");
        Self::with_pipeline(pipeline)
    }

    /// Default stage table with the given capacity and policy.
    pub fn with_capacity(capacity: usize, policy: CreditPolicy) -> Self {
        let mut config = Config::default();
        config.pipeline.capacity = capacity;
        config.pipeline.credit_policy = policy;
        Self::with_config(&config)
    }

    /// Custom stage table with the given capacity.
    pub fn with_stages(stages: StageConfig, capacity: usize) -> Self {
        let mut config = Config::default();
        config.stages = stages;
        config.pipeline.capacity = capacity;
        Self::with_config(&config)
    }

    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            now: 0,
            admitted: Vec::new(),
            retrieved: Vec::new(),
        }
    }

    pub fn graph(&self) -> &StageGraph {
        self.pipeline.graph()
    }

    pub fn depth(&self) -> usize {
        self.pipeline.depth()
    }

    /// Runs one tick: optionally offers the next synthetic record and
    /// optionally polls for a result.
    pub fn step(&mut self, offer: bool, consume: bool) -> Step {
        let record = offer.then(|| synthetic(self.admitted.len() as u64));
        self.step_with(record, consume)
    }

    /// Runs one tick with an explicit record.
    pub fn step_with(&mut self, record: Option<InputRecord>, consume: bool) -> Step {
        let ready = self.pipeline.can_accept();
        let available = self.pipeline.available();

        let accepted = record.is_some_and(|r| self.pipeline.offer(r));
        assert_eq!(
            accepted,
            ready && record.is_some(),
            "tick {}: admission disagrees with the ready signal",
            self.now
        );
        if let Some(r) = record.filter(|_| accepted) {
            self.admitted.push(r);
        }

        let retrieved = if consume {
            self.pipeline.consume()
        } else {
            None
        };
        assert_eq!(
            retrieved.is_some(),
            consume && available,
            "tick {}: retrieval disagrees with the available signal",
            self.now
        );

        let outcome = self
            .pipeline
            .tick()
            .unwrap_or_else(|e| panic!("tick {} failed: {e}", self.now));

        if let Some(result) = retrieved {
            assert_eq!(
                result.seq,
                self.retrieved.len() as u64,
                "tick {}: result retrieved out of order",
                self.now
            );
            self.retrieved.push(result);
        }
        self.now += 1;
        self.check_invariants();

        Step {
            accepted,
            retrieved,
            outcome,
        }
    }

    /// Resets the pipeline and forgets every record seen so far.
    pub fn reset(&mut self) {
        self.pipeline.reset();
        self.now = 0;
        self.admitted.clear();
        self.retrieved.clear();
        self.check_invariants();
    }

    /// Counter, capacity, and buffer bounds after a commit.
    pub fn check_invariants(&self) {
        let p = &self.pipeline;
        assert_eq!(
            p.in_flight(),
            self.admitted.len() - self.retrieved.len(),
            "tick {}: in_flight != admitted - retrieved",
            self.now
        );
        assert!(p.in_flight() <= p.capacity(), "tick {}: over capacity", self.now);
        assert!(p.buffered() <= p.capacity(), "tick {}: buffer overfull", self.now);
        assert_eq!(p.in_flight(), p.in_pipeline() + p.buffered());
    }

    /// Stops offering and retrieves every tick until nothing is in flight.
    ///
    /// Returns the number of ticks taken.
    pub fn drain(&mut self, max_ticks: u64) -> u64 {
        let mut ticks = 0;
        while self.pipeline.in_flight() > 0 {
            assert!(ticks < max_ticks, "pipeline did not drain in {max_ticks} ticks");
            let _ = self.step(false, true);
            ticks += 1;
        }
        ticks
    }

    /// Every retrieved result matches its input under both the graph's own
    /// evaluation and the closed-form reference.
    pub fn check_results(&self, k: f64) {
        for result in &self.retrieved {
            let input = &self.admitted[result.seq as usize];
            let expected = self.graph().evaluate(&input.operands);
            assert_eq!(
                result.value.to_bits(),
                expected.to_bits(),
                "seq {}: pipelined value differs from direct evaluation",
                result.seq
            );
            let closed_form = reference(input, k);
            assert!(
                (result.value - closed_form).abs() <= closed_form.abs().max(1.0) * 1e-12,
                "seq {}: {} != {}",
                result.seq,
                result.value,
                closed_form
            );
        }
    }
}
