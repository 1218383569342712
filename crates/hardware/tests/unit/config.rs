//! # Configuration Tests
//!
//! Tests for configuration structures, deserialization, defaults, and validation.

use std::io::Write;

use pretty_assertions::assert_eq;
use streampipe_core::Pipeline;
use streampipe_core::common::{ConfigError, GraphError};
use streampipe_core::config::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(!config.general.trace_ticks);
    assert_eq!(config.pipeline.capacity, 32);
    assert_eq!(config.pipeline.credit_policy, CreditPolicy::Combined);
}

#[test]
fn test_stage_config_defaults() {
    let stages = StageConfig::default();
    assert_eq!(
        stages.latencies(),
        [
            ("square", 4),
            ("scale", 4),
            ("fourth_power", 4),
            ("fifth_power", 4),
            ("add", 2),
            ("subtract", 2),
        ]
    );
    assert_eq!(stages.scale_factor, 3.0);
}

#[test]
fn test_default_pipeline_geometry() {
    let pipeline = Pipeline::new(&Config::default()).unwrap();
    assert_eq!(pipeline.depth(), 16);
    assert_eq!(pipeline.capacity(), 32);
    assert_eq!(pipeline.in_flight(), 0);
}

#[test]
fn test_empty_json_uses_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.pipeline.capacity, 32);
    assert_eq!(config.stages.add_latency, 2);
}

#[test]
fn test_partial_json() {
    let json = r#"{
        "pipeline": { "credit_policy": "Split" },
        "stages": { "square_latency": 6, "scale_factor": -1.5 }
    }"#;
    let config = Config::from_json(json).unwrap();
    assert_eq!(config.pipeline.capacity, 32);
    assert_eq!(config.pipeline.credit_policy, CreditPolicy::Split);
    assert_eq!(config.stages.square_latency, 6);
    assert_eq!(config.stages.scale_latency, 4);
    assert_eq!(config.stages.scale_factor, -1.5);
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        Config::from_json("{ \"pipeline\": "),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        Config::from_json(r#"{ "pipeline": { "credit_policy": "Shared" } }"#),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_zero_capacity_rejected() {
    let result = Config::from_json(r#"{ "pipeline": { "capacity": 0 } }"#);
    assert!(matches!(result, Err(ConfigError::ZeroCapacity)));
}

#[test]
fn test_zero_latency_rejected() {
    let result = Config::from_json(r#"{ "stages": { "add_latency": 0 } }"#);
    match result {
        Err(ConfigError::Graph(GraphError::ZeroLatency { stage })) => assert_eq!(stage, "add"),
        other => panic!("expected zero-latency error, got {other:?}"),
    }
}

#[test]
fn test_capacity_below_depth_rejected() {
    let mut config = Config::default();
    config.pipeline.capacity = 15;
    match Pipeline::new(&config) {
        Err(ConfigError::CapacityBelowDepth { capacity, depth }) => {
            assert_eq!((capacity, depth), (15, 16));
        }
        other => panic!("expected capacity error, got {other:?}"),
    }
}

#[test]
fn test_capacity_equal_to_depth_accepted() {
    let mut config = Config::default();
    config.pipeline.capacity = 16;
    assert!(Pipeline::new(&config).is_ok());
}

#[test]
fn test_capacity_checked_against_configured_depth() {
    let mut config = Config::default();
    config.stages.subtract_latency = 10;
    config.pipeline.capacity = 23;
    assert!(matches!(
        Pipeline::new(&config),
        Err(ConfigError::CapacityBelowDepth {
            capacity: 23,
            depth: 24
        })
    ));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "general": {{ "trace_ticks": true }}, "pipeline": {{ "capacity": 20 }} }}"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert!(config.general.trace_ticks);
    assert_eq!(config.pipeline.capacity, 20);
}

#[test]
fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::from_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_error_messages() {
    let err = ConfigError::CapacityBelowDepth {
        capacity: 8,
        depth: 16,
    };
    assert_eq!(
        err.to_string(),
        "in-flight capacity 8 is below the pipeline depth 16"
    );
    let err: ConfigError = GraphError::UnusedStage {
        stage: "scale".into(),
    }
    .into();
    assert_eq!(err.to_string(), "stage `scale` does not contribute to the output");
}
