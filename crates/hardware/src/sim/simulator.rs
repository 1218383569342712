//! Simulator: owns the pipeline and its statistics side-by-side.
//!
//! The simulator forwards the producer/consumer protocol to the pipeline,
//! counting every offer, poll, and committed tick on the way through.

use crate::common::error::{ConfigError, PipelineError};
use crate::common::record::{InputRecord, OutputRecord};
use crate::config::Config;
use crate::core::Pipeline;
use crate::core::pipeline::engine::TickOutcome;
use crate::stats::SimStats;

/// Top-level simulator: pipeline plus statistics.
#[derive(Debug)]
pub struct Simulator {
    /// The streaming pipeline.
    pipeline: Pipeline,
    /// Flow statistics since construction or the last reset.
    stats: SimStats,
    /// Emit a `trace` event for every committed tick.
    trace: bool,
    /// Index of the tick currently in progress.
    now: u64,
}

impl Simulator {
    /// Creates a simulator for the pipeline described by `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the pipeline cannot be built.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let pipeline = Pipeline::new(config)?;
        Ok(Self::with_pipeline(pipeline, config.general.trace_ticks))
    }

    /// Wraps an already constructed pipeline.
    pub fn with_pipeline(pipeline: Pipeline, trace: bool) -> Self {
        Self {
            pipeline,
            stats: SimStats::default(),
            trace,
            now: 0,
        }
    }

    /// Index of the tick currently in progress.
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// The wrapped pipeline.
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// The wrapped pipeline, mutably. Calls made through it bypass statistics.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    /// Statistics gathered so far.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Records admitted and not yet retrieved.
    pub const fn in_flight(&self) -> usize {
        self.pipeline.in_flight()
    }

    /// Ready signal for the producer.
    pub fn can_accept(&self) -> bool {
        self.pipeline.can_accept()
    }

    /// Result-available signal for the consumer.
    pub fn available(&self) -> bool {
        self.pipeline.available()
    }

    /// Offers a record for the current tick.
    pub fn offer(&mut self, record: InputRecord) -> bool {
        self.stats.offers += 1;
        let accepted = self.pipeline.offer(record);
        if accepted {
            self.stats.admitted += 1;
        } else {
            self.stats.denied += 1;
        }
        accepted
    }

    /// Polls for the oldest completed result during the current tick.
    pub fn consume(&mut self) -> Option<OutputRecord> {
        let result = self.pipeline.consume();
        if result.is_none() {
            self.stats.empty_polls += 1;
        }
        result
    }

    /// Commits the current tick and advances the clock.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] from the pipeline. The tick counter is
    /// not advanced on failure.
    pub fn tick(&mut self) -> Result<TickOutcome, PipelineError> {
        let outcome = self.pipeline.tick()?;

        self.stats.ticks += 1;
        if !outcome.admitted {
            self.stats.idle_admission_ticks += 1;
        }
        self.stats.emitted += u64::from(outcome.emitted);
        self.stats.retired += u64::from(outcome.retired);
        self.stats.peak_in_flight = self.stats.peak_in_flight.max(self.pipeline.in_flight());
        self.stats.peak_buffered = self.stats.peak_buffered.max(self.pipeline.buffered());

        if self.trace {
            tracing::trace!(
                tick = self.now,
                admitted = outcome.admitted,
                emitted = outcome.emitted,
                retired = outcome.retired,
                in_flight = self.pipeline.in_flight(),
                buffered = self.pipeline.buffered(),
                "tick"
            );
        }

        self.now += 1;
        Ok(outcome)
    }

    /// Stops offering and retrieves every remaining result, one per tick.
    ///
    /// Gives up after `max_ticks` ticks; results retrieved so far are returned
    /// either way.
    ///
    /// # Errors
    ///
    /// Propagates any [`PipelineError`] raised while ticking.
    pub fn drain(&mut self, max_ticks: u64) -> Result<Vec<OutputRecord>, PipelineError> {
        let mut results = Vec::with_capacity(self.pipeline.in_flight());
        let mut spent = 0;
        while self.pipeline.in_flight() > 0 && spent < max_ticks {
            if let Some(result) = self.consume() {
                results.push(result);
            }
            let _ = self.tick()?;
            spent += 1;
        }
        if self.pipeline.in_flight() > 0 {
            tracing::warn!(
                remaining = self.pipeline.in_flight(),
                max_ticks,
                "drain stopped before the pipeline emptied"
            );
        }
        Ok(results)
    }

    /// Discards all in-flight work, zeroes the statistics, and rewinds the clock.
    pub fn reset(&mut self) {
        self.pipeline.reset();
        self.stats = SimStats::default();
        self.now = 0;
    }
}
