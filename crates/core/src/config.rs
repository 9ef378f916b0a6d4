//! Configuration system for the AArch64 simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (pipeline, caches, branch predictor, latencies).
//! 2. **Structures:** Hierarchical config for general, pipeline, predictor, and cache settings.
//! 3. **Enums:** Execution engine, cache write policy, and eviction policy types.
//!
//! Configuration is supplied as JSON (`serde_json`) by the external harness,
//! or use `Config::default()` for embedding.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in the supplied JSON.
mod defaults {
    /// Default superscalar issue width (instructions per cycle).
    ///
    /// Models the 8-wide decode/issue of an Apple-M2-class core.
    pub const ISSUE_WIDTH: usize = 8;

    /// Default branch misprediction penalty in cycles.
    ///
    /// Approximates the M2 front-end refill cost after a redirect.
    pub const MISPREDICT_PENALTY: u64 = 12;

    /// Default ALU operation latency in cycles.
    pub const LAT_ALU: u64 = 1;

    /// Default branch resolution latency in cycles.
    pub const LAT_BRANCH: u64 = 1;

    /// Default integer multiply latency in cycles.
    pub const LAT_MULTIPLY: u64 = 3;

    /// Default integer divide latency in cycles.
    ///
    /// Hardware dividers are data-dependent (10-15 cycles on M2-class
    /// cores); the minimum is used as the calibration baseline.
    pub const LAT_DIVIDE: u64 = 10;

    /// Default load latency in cycles when the data cache is disabled.
    pub const LAT_LOAD: u64 = 4;

    /// Default store latency in cycles.
    pub const LAT_STORE: u64 = 1;

    /// Default integer SIMD operation latency in cycles.
    pub const LAT_SIMD_INT: u64 = 2;

    /// Default floating-point SIMD operation latency in cycles.
    pub const LAT_SIMD_FP: u64 = 3;

    /// Default bimodal table size (log2, 4096 counters).
    pub const BIMODAL_BITS: usize = 12;

    /// Default gshare global history length in bits.
    pub const GSHARE_HISTORY_LENGTH: usize = 12;

    /// Default gshare table size (log2, 4096 counters).
    pub const GSHARE_BITS: usize = 12;

    /// Default chooser table size (log2, 4096 counters).
    pub const CHOOSER_BITS: usize = 12;

    /// Default Branch Target Buffer entry count.
    pub const BTB_SIZE: usize = 512;

    /// Default Branch Target Buffer associativity (ways per set).
    pub const BTB_ASSOCIATIVITY: usize = 4;

    /// Default initial value of every 2-bit direction counter.
    ///
    /// 2 (weakly taken) makes a first-seen backward loop branch predict
    /// taken, which is the common case.
    pub const INITIAL_COUNTER: u8 = 2;

    /// Default cache size in bytes (64 KiB).
    pub const CACHE_SIZE: usize = 64 * 1024;

    /// Default cache line size in bytes.
    ///
    /// Matches the 64-byte line the `DCZID_EL0` register advertises.
    pub const CACHE_LINE: usize = 64;

    /// Default cache associativity (8 ways).
    pub const CACHE_WAYS: usize = 8;

    /// Default cache hit latency in cycles.
    pub const CACHE_HIT_LATENCY: u64 = 1;

    /// Default cache miss latency in cycles.
    pub const CACHE_MISS_LATENCY: u64 = 10;
}

/// Execution engine selection.
///
/// The functional engine executes one instruction per tick with no timing
/// model; the pipelined engine models the superscalar in-order pipeline and
/// produces cycle counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Engine {
    /// Architectural execution only; one instruction per tick.
    Functional,
    /// Cycle-level execution through the superscalar pipeline.
    #[default]
    Pipelined,
}

/// Cache write policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum WritePolicy {
    /// Writes update the line and propagate to the next level immediately.
    WriteThrough,
    /// Writes dirty the line; the next level is updated on eviction.
    #[default]
    WriteBack,
}

/// Cache eviction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvictionPolicy {
    /// Least Recently Used replacement.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Pseudo-random replacement with a deterministic seeded generator.
    #[serde(alias = "Random")]
    Random,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use a64sim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.pipeline.issue_width, 8);
/// assert!(!config.cache.l1_d.enabled);
/// ```
///
/// Deserializing from JSON (typical harness usage):
///
/// ```
/// use a64sim_core::config::{Config, Engine, EvictionPolicy};
///
/// let json = r#"{
///     "general": { "trace_instructions": false, "engine": "Pipelined" },
///     "pipeline": { "issue_width": 4, "mispredict_penalty_cycles": 10 },
///     "branch_predictor": { "bimodal_bits": 10, "btb_size": 256 },
///     "cache": {
///         "l1_i": { "enabled": true, "size_bytes": 131072, "ways": 8 },
///         "l1_d": { "enabled": true, "size_bytes": 65536, "eviction": "RANDOM" }
///     }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.pipeline.issue_width, 4);
/// assert_eq!(config.branch_predictor.btb_size, 256);
/// assert_eq!(config.cache.l1_d.eviction, EvictionPolicy::Random);
/// assert_eq!(config.general.engine, Engine::Pipelined);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Pipeline shape, fusion, and latency settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Branch predictor table sizes
    #[serde(default)]
    pub branch_predictor: BranchPredictorConfig,
    /// L1 instruction and data cache settings
    #[serde(default)]
    pub cache: CacheHierarchyConfig,
}

/// General simulation settings and limits.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Enable per-instruction stage tracing to stderr
    #[serde(default)]
    pub trace_instructions: bool,

    /// Execution engine (functional emulator or timing pipeline)
    #[serde(default)]
    pub engine: Engine,

    /// Halt with exit code −2 once this many cycles have elapsed
    #[serde(default)]
    pub max_cycles: Option<u64>,

    /// Halt once this many instructions have retired
    #[serde(default)]
    pub max_instructions: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_instructions: false,
            engine: Engine::default(),
            max_cycles: None,
            max_instructions: None,
        }
    }
}

/// Per-opcode-class execute latencies in cycles.
#[derive(Debug, Clone, Deserialize)]
pub struct LatencyTable {
    /// Integer ALU operations (add, logic, shifts, moves, bitfields)
    #[serde(default = "LatencyTable::default_alu")]
    pub alu: u64,

    /// Branch resolution
    #[serde(default = "LatencyTable::default_branch")]
    pub branch: u64,

    /// Integer multiply (`MADD`/`MSUB`)
    #[serde(default = "LatencyTable::default_multiply")]
    pub multiply: u64,

    /// Integer divide (`UDIV`/`SDIV`)
    #[serde(default = "LatencyTable::default_divide")]
    pub divide: u64,

    /// Loads when no data cache gates the memory stage
    #[serde(default = "LatencyTable::default_load")]
    pub load: u64,

    /// Stores
    #[serde(default = "LatencyTable::default_store")]
    pub store: u64,

    /// Integer SIMD three-same operations
    #[serde(default = "LatencyTable::default_simd_int")]
    pub simd_int: u64,

    /// Floating-point SIMD three-same operations
    #[serde(default = "LatencyTable::default_simd_fp")]
    pub simd_fp: u64,
}

impl LatencyTable {
    /// Returns the default ALU latency.
    fn default_alu() -> u64 {
        defaults::LAT_ALU
    }

    /// Returns the default branch latency.
    fn default_branch() -> u64 {
        defaults::LAT_BRANCH
    }

    /// Returns the default multiply latency.
    fn default_multiply() -> u64 {
        defaults::LAT_MULTIPLY
    }

    /// Returns the default divide latency.
    fn default_divide() -> u64 {
        defaults::LAT_DIVIDE
    }

    /// Returns the default uncached load latency.
    fn default_load() -> u64 {
        defaults::LAT_LOAD
    }

    /// Returns the default store latency.
    fn default_store() -> u64 {
        defaults::LAT_STORE
    }

    /// Returns the default integer SIMD latency.
    fn default_simd_int() -> u64 {
        defaults::LAT_SIMD_INT
    }

    /// Returns the default floating-point SIMD latency.
    fn default_simd_fp() -> u64 {
        defaults::LAT_SIMD_FP
    }
}

impl Default for LatencyTable {
    /// Creates the default M2-estimate latency table.
    fn default() -> Self {
        Self {
            alu: defaults::LAT_ALU,
            branch: defaults::LAT_BRANCH,
            multiply: defaults::LAT_MULTIPLY,
            divide: defaults::LAT_DIVIDE,
            load: defaults::LAT_LOAD,
            store: defaults::LAT_STORE,
            simd_int: defaults::LAT_SIMD_INT,
            simd_fp: defaults::LAT_SIMD_FP,
        }
    }
}

/// Pipeline shape and behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Superscalar issue width; meaningful values are 1, 2, 4, and 8
    #[serde(default = "PipelineConfig::default_width")]
    pub issue_width: usize,

    /// Cycles charged to the front end after a branch misprediction
    #[serde(default = "PipelineConfig::default_mispredict_penalty")]
    pub mispredict_penalty_cycles: u64,

    /// Fuse a flag-setting compare with an adjacent `B.cond` into one slot
    #[serde(default = "PipelineConfig::default_fusion")]
    pub enable_cmp_bcond_fusion: bool,

    /// Resolve unconditional `B` at fetch without consuming a slot
    #[serde(default = "PipelineConfig::default_elimination")]
    pub enable_branch_elimination: bool,

    /// Stall stores on data-cache misses instead of completing in one cycle
    #[serde(default)]
    pub stores_stall_on_miss: bool,

    /// Per-opcode-class execute latencies
    #[serde(default)]
    pub latency: LatencyTable,
}

impl PipelineConfig {
    /// Returns the default issue width.
    fn default_width() -> usize {
        defaults::ISSUE_WIDTH
    }

    /// Returns the default misprediction penalty in cycles.
    fn default_mispredict_penalty() -> u64 {
        defaults::MISPREDICT_PENALTY
    }

    /// Compare/branch fusion is on by default; M2-class cores fuse.
    fn default_fusion() -> bool {
        true
    }

    /// Unconditional-branch elimination is on by default.
    fn default_elimination() -> bool {
        true
    }

    /// Number of memory ports at this issue width.
    ///
    /// Single and dual issue model one load/store port; quad and octuple
    /// issue model two.
    pub fn memory_ports(&self) -> usize {
        if self.issue_width >= 4 { 2 } else { 1 }
    }
}

impl Default for PipelineConfig {
    /// Creates the default 8-wide pipeline configuration.
    fn default() -> Self {
        Self {
            issue_width: defaults::ISSUE_WIDTH,
            mispredict_penalty_cycles: defaults::MISPREDICT_PENALTY,
            enable_cmp_bcond_fusion: true,
            enable_branch_elimination: true,
            stores_stall_on_miss: false,
            latency: LatencyTable::default(),
        }
    }
}

/// Tournament branch predictor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchPredictorConfig {
    /// Bimodal table size (log2)
    #[serde(default = "BranchPredictorConfig::default_bimodal_bits")]
    pub bimodal_bits: usize,

    /// Global history register length in bits
    #[serde(default = "BranchPredictorConfig::default_gshare_history")]
    pub gshare_history_length: usize,

    /// Gshare table size (log2)
    #[serde(default = "BranchPredictorConfig::default_gshare_bits")]
    pub gshare_bits: usize,

    /// Chooser table size (log2)
    #[serde(default = "BranchPredictorConfig::default_chooser_bits")]
    pub chooser_bits: usize,

    /// Branch Target Buffer entry count
    #[serde(default = "BranchPredictorConfig::default_btb_size")]
    pub btb_size: usize,

    /// Branch Target Buffer ways per set
    #[serde(default = "BranchPredictorConfig::default_btb_associativity")]
    pub btb_associativity: usize,

    /// Initial value of every 2-bit direction counter (0-3)
    #[serde(default = "BranchPredictorConfig::default_initial_counter")]
    pub initial_counter_value: u8,
}

impl BranchPredictorConfig {
    /// Returns the default bimodal table size (log2).
    fn default_bimodal_bits() -> usize {
        defaults::BIMODAL_BITS
    }

    /// Returns the default global history length in bits.
    fn default_gshare_history() -> usize {
        defaults::GSHARE_HISTORY_LENGTH
    }

    /// Returns the default gshare table size (log2).
    fn default_gshare_bits() -> usize {
        defaults::GSHARE_BITS
    }

    /// Returns the default chooser table size (log2).
    fn default_chooser_bits() -> usize {
        defaults::CHOOSER_BITS
    }

    /// Returns the default BTB entry count.
    fn default_btb_size() -> usize {
        defaults::BTB_SIZE
    }

    /// Returns the default BTB associativity.
    fn default_btb_associativity() -> usize {
        defaults::BTB_ASSOCIATIVITY
    }

    /// Returns the default initial counter value.
    fn default_initial_counter() -> u8 {
        defaults::INITIAL_COUNTER
    }
}

impl Default for BranchPredictorConfig {
    /// Creates the default tournament predictor configuration.
    fn default() -> Self {
        Self {
            bimodal_bits: defaults::BIMODAL_BITS,
            gshare_history_length: defaults::GSHARE_HISTORY_LENGTH,
            gshare_bits: defaults::GSHARE_BITS,
            chooser_bits: defaults::CHOOSER_BITS,
            btb_size: defaults::BTB_SIZE,
            btb_associativity: defaults::BTB_ASSOCIATIVITY,
            initial_counter_value: defaults::INITIAL_COUNTER,
        }
    }
}

/// L1 cache pair configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheHierarchyConfig {
    /// L1 instruction cache
    #[serde(default)]
    pub l1_i: CacheConfig,
    /// L1 data cache
    #[serde(default)]
    pub l1_d: CacheConfig,
}

/// Individual cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Enable this cache; when disabled the pipeline uses fixed latencies
    #[serde(default)]
    pub enabled: bool,

    /// Total cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes; must be a power of two
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Write policy
    #[serde(default)]
    pub write_policy: WritePolicy,

    /// Eviction policy
    #[serde(default)]
    pub eviction: EvictionPolicy,

    /// Latency of a hit in cycles
    #[serde(default = "CacheConfig::default_hit_latency")]
    pub hit_latency: u64,

    /// Latency of a miss (fill from backing memory) in cycles
    #[serde(default = "CacheConfig::default_miss_latency")]
    pub miss_latency: u64,
}

impl CacheConfig {
    /// Returns the default cache size in bytes.
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default cache line size in bytes.
    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default cache associativity.
    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Returns the default hit latency in cycles.
    fn default_hit_latency() -> u64 {
        defaults::CACHE_HIT_LATENCY
    }

    /// Returns the default miss latency in cycles.
    fn default_miss_latency() -> u64 {
        defaults::CACHE_MISS_LATENCY
    }
}

impl Default for CacheConfig {
    /// Creates a default (disabled) cache configuration.
    fn default() -> Self {
        Self {
            enabled: false,
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            write_policy: WritePolicy::default(),
            eviction: EvictionPolicy::default(),
            hit_latency: defaults::CACHE_HIT_LATENCY,
            miss_latency: defaults::CACHE_MISS_LATENCY,
        }
    }
}
