//! Configuration Tests.
//!
//! Verifies the defaults and the JSON deserialization surface the external
//! harness depends on.

use a64sim_core::config::{Config, Engine, EvictionPolicy, WritePolicy};
use pretty_assertions::assert_eq;

/// The documented defaults: 8-wide, fusion and elimination on, caches off,
/// weakly-taken counters, minimum divide latency.
#[test]
fn default_configuration() {
    let config = Config::default();
    assert_eq!(config.general.engine, Engine::Pipelined);
    assert_eq!(config.pipeline.issue_width, 8);
    assert_eq!(config.pipeline.mispredict_penalty_cycles, 12);
    assert!(config.pipeline.enable_cmp_bcond_fusion);
    assert!(config.pipeline.enable_branch_elimination);
    assert!(!config.pipeline.stores_stall_on_miss);
    assert_eq!(config.pipeline.latency.divide, 10, "calibration minimum");
    assert_eq!(config.pipeline.latency.multiply, 3);
    assert_eq!(config.branch_predictor.initial_counter_value, 2);
    assert_eq!(config.branch_predictor.btb_associativity, 4);
    assert!(!config.cache.l1_i.enabled);
    assert!(!config.cache.l1_d.enabled);
    assert_eq!(config.general.max_cycles, None);
}

/// Memory ports scale with the issue width.
#[test]
fn memory_ports_by_width() {
    let mut config = Config::default();
    for (width, ports) in [(1, 1), (2, 1), (4, 2), (8, 2)] {
        config.pipeline.issue_width = width;
        assert_eq!(config.pipeline.memory_ports(), ports, "width {width}");
    }
}

/// A full JSON document deserializes into every section.
#[test]
fn json_round_trip() {
    let json = r#"{
        "general": {
            "trace_instructions": false,
            "engine": "Functional",
            "max_cycles": 5000,
            "max_instructions": 1000
        },
        "pipeline": {
            "issue_width": 4,
            "mispredict_penalty_cycles": 8,
            "enable_cmp_bcond_fusion": false,
            "latency": { "divide": 15, "load": 3 }
        },
        "branch_predictor": {
            "bimodal_bits": 10,
            "gshare_history_length": 8,
            "btb_size": 128,
            "initial_counter_value": 1
        },
        "cache": {
            "l1_i": { "enabled": true, "size_bytes": 131072 },
            "l1_d": {
                "enabled": true,
                "ways": 4,
                "write_policy": "WriteThrough",
                "eviction": "RANDOM",
                "miss_latency": 20
            }
        }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.general.engine, Engine::Functional);
    assert_eq!(config.general.max_cycles, Some(5000));
    assert_eq!(config.pipeline.issue_width, 4);
    assert!(!config.pipeline.enable_cmp_bcond_fusion);
    assert_eq!(config.pipeline.latency.divide, 15);
    assert_eq!(config.pipeline.latency.load, 3);
    assert_eq!(config.pipeline.latency.alu, 1, "omitted fields keep defaults");
    assert_eq!(config.branch_predictor.bimodal_bits, 10);
    assert_eq!(config.branch_predictor.initial_counter_value, 1);
    assert!(config.cache.l1_i.enabled);
    assert_eq!(config.cache.l1_i.size_bytes, 131072);
    assert_eq!(config.cache.l1_d.write_policy, WritePolicy::WriteThrough);
    assert_eq!(config.cache.l1_d.eviction, EvictionPolicy::Random);
    assert_eq!(config.cache.l1_d.miss_latency, 20);
}

/// An empty document is a valid configuration (all defaults).
#[test]
fn empty_json_is_default() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.pipeline.issue_width, Config::default().pipeline.issue_width);
}

/// The lowercase eviction alias is accepted.
#[test]
fn eviction_alias() {
    let json = r#"{ "cache": { "l1_d": { "eviction": "Lru" } } }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.cache.l1_d.eviction, EvictionPolicy::Lru);
}
