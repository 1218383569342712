//! Configuration system for the pipeline simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline stage latencies, capacity, and scale factor.
//! 2. **Structures:** Hierarchical config for general, pipeline, and stage settings.
//! 3. **Enums:** Credit accounting policy.
//!
//! Configuration is supplied as JSON (`Config::from_json` / `Config::from_file`)
//! or built with `Config::default()`. Every field is optional in JSON.

use std::path::Path;

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
///
/// With these latencies the longest path (square → fourth power → fifth power
/// → add → subtract) is 16 ticks deep, and the default capacity leaves 16
/// records of consumer-side headroom above it.
mod defaults {
    /// Latency of the squaring multiplier.
    pub const SQUARE_LATENCY: usize = 4;

    /// Latency of the constant-scaling multiplier.
    pub const SCALE_LATENCY: usize = 4;

    /// Latency of the fourth-power multiplier.
    pub const FOURTH_POWER_LATENCY: usize = 4;

    /// Latency of the fifth-power multiplier.
    pub const FIFTH_POWER_LATENCY: usize = 4;

    /// Latency of the additive combine.
    pub const ADD_LATENCY: usize = 2;

    /// Latency of the subtractive combine.
    pub const SUBTRACT_LATENCY: usize = 2;

    /// Constant applied by the scaling stage.
    pub const SCALE_FACTOR: f64 = 3.0;

    /// Total in-flight records (stages plus drain buffer).
    pub const CAPACITY: usize = 32;
}

/// In-flight credit accounting policies.
///
/// Both policies bound the total of in-stage plus buffered records by the
/// pipeline capacity; they differ in whether pipeline occupancy is reserved
/// separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CreditPolicy {
    /// One counter covers records in the stages and records awaiting retrieval.
    #[default]
    Combined,
    /// Two reservations: pipeline occupancy bounded by depth, and a buffer
    /// reservation bounded by the drain capacity.
    Split,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use streampipe_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.pipeline.capacity, 32);
/// assert_eq!(config.stages.square_latency, 4);
/// ```
///
/// Deserializing from JSON, with omitted fields taking their defaults:
///
/// ```
/// use streampipe_core::config::{Config, CreditPolicy};
///
/// let json = r#"{
///     "general": { "trace_ticks": true },
///     "pipeline": { "capacity": 20, "credit_policy": "Split" },
///     "stages": { "add_latency": 3, "scale_factor": 2.5 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert!(config.general.trace_ticks);
/// assert_eq!(config.pipeline.credit_policy, CreditPolicy::Split);
/// assert_eq!(config.stages.add_latency, 3);
/// assert_eq!(config.stages.subtract_latency, 2);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Admission and drain sizing
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Stage latency table and formula constants
    #[serde(default)]
    pub stages: StageConfig,
}

impl Config {
    /// Parses and validates a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or any error raised by
    /// [`Config::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks settings that can be judged without building the stage graph.
    ///
    /// Capacity against depth is checked when the pipeline is built, since
    /// depth depends on the graph.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] or a wrapped
    /// [`GraphError::ZeroLatency`](crate::common::GraphError::ZeroLatency).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.stages.validate()
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    /// Emit a `trace` event for every committed tick.
    #[serde(default)]
    pub trace_ticks: bool,
}

/// Admission controller and drain buffer sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum records in flight (inside stages plus awaiting retrieval).
    /// Also the drain buffer capacity.
    #[serde(default = "PipelineConfig::default_capacity")]
    pub capacity: usize,

    /// Credit accounting policy.
    #[serde(default)]
    pub credit_policy: CreditPolicy,
}

impl PipelineConfig {
    /// Returns the default in-flight capacity.
    fn default_capacity() -> usize {
        defaults::CAPACITY
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::CAPACITY,
            credit_policy: CreditPolicy::default(),
        }
    }
}

/// Stage latency table for the built-in `a^5 + k*b - c` graph.
#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    /// Ticks taken by `a * a`.
    #[serde(default = "StageConfig::default_square")]
    pub square_latency: usize,
    /// Ticks taken by `k * b`.
    #[serde(default = "StageConfig::default_scale")]
    pub scale_latency: usize,
    /// Ticks taken by `a^2 * a^2`.
    #[serde(default = "StageConfig::default_fourth_power")]
    pub fourth_power_latency: usize,
    /// Ticks taken by `a^4 * a`.
    #[serde(default = "StageConfig::default_fifth_power")]
    pub fifth_power_latency: usize,
    /// Ticks taken by `a^5 + k*b`.
    #[serde(default = "StageConfig::default_add")]
    pub add_latency: usize,
    /// Ticks taken by `(a^5 + k*b) - c`.
    #[serde(default = "StageConfig::default_subtract")]
    pub subtract_latency: usize,
    /// The constant `k`.
    #[serde(default = "StageConfig::default_scale_factor")]
    pub scale_factor: f64,
}

impl StageConfig {
    fn default_square() -> usize {
        defaults::SQUARE_LATENCY
    }

    fn default_scale() -> usize {
        defaults::SCALE_LATENCY
    }

    fn default_fourth_power() -> usize {
        defaults::FOURTH_POWER_LATENCY
    }

    fn default_fifth_power() -> usize {
        defaults::FIFTH_POWER_LATENCY
    }

    fn default_add() -> usize {
        defaults::ADD_LATENCY
    }

    fn default_subtract() -> usize {
        defaults::SUBTRACT_LATENCY
    }

    fn default_scale_factor() -> f64 {
        defaults::SCALE_FACTOR
    }

    /// Returns the latency table as `(stage name, latency)` pairs in graph order.
    pub fn latencies(&self) -> [(&'static str, usize); 6] {
        [
            ("square", self.square_latency),
            ("scale", self.scale_latency),
            ("fourth_power", self.fourth_power_latency),
            ("fifth_power", self.fifth_power_latency),
            ("add", self.add_latency),
            ("subtract", self.subtract_latency),
        ]
    }

    /// Rejects zero latencies; every functional stage registers its output at least once.
    ///
    /// # Errors
    ///
    /// Returns a wrapped [`GraphError::ZeroLatency`](crate::common::GraphError::ZeroLatency)
    /// naming the first offending stage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.latencies().iter().find(|(_, latency)| *latency == 0) {
            Some((stage, _)) => Err(crate::common::GraphError::ZeroLatency {
                stage: (*stage).to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl Default for StageConfig {
    /// Returns the 16-tick default latency table.
    fn default() -> Self {
        Self {
            square_latency: defaults::SQUARE_LATENCY,
            scale_latency: defaults::SCALE_LATENCY,
            fourth_power_latency: defaults::FOURTH_POWER_LATENCY,
            fifth_power_latency: defaults::FIFTH_POWER_LATENCY,
            add_latency: defaults::ADD_LATENCY,
            subtract_latency: defaults::SUBTRACT_LATENCY,
            scale_factor: defaults::SCALE_FACTOR,
        }
    }
}
