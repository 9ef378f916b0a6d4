//! AArch64 user-space CPU simulator library.
//!
//! This crate implements a user-mode ARM64 simulator with the following:
//! 1. **ISA:** A pure decoder for the supported A64 instruction classes,
//!    including bitmask-immediate expansion and alias resolution.
//! 2. **Core:** Register files, PSTATE, sparse byte-addressable memory, and
//!    a pure per-instruction execute unit.
//! 3. **Engines:** A functional emulator, and an 8-wide in-order
//!    superscalar timing pipeline with operand forwarding, tournament
//!    branch prediction, macro-op fusion, and optional L1 caches.
//! 4. **Simulation:** `Simulator` (owns CPU + engine), program loading,
//!    the syscall seam, configuration, and statistics.
//!
//! Runs are fully deterministic: the same program and configuration always
//! produce the same architectural state and the same statistics.

/// Common types and constants (fault taxonomy, register aliases).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// CPU core (registers, memory, emulator, pipeline, functional units).
pub mod core;
/// Instruction set (decode, instruction record, opcodes, bitmask immediates).
pub mod isa;
/// Simulation: `Simulator`, program loader, and syscall seam.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main CPU state type; holds registers, memory, and stats.
pub use crate::core::Cpu;
/// Top-level simulator; owns the CPU and the execution engine.
pub use crate::sim::Simulator;
/// Per-run statistics block.
pub use crate::stats::SimStats;
