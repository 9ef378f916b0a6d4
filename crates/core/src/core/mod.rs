//! CPU core: architectural state, functional execution, and the pipeline.
//!
//! This module contains the simulated core:
//! 1. **Arch:** Register files and PSTATE.
//! 2. **Memory:** The sparse byte-addressable address space.
//! 3. **CPU:** The state hub the engines mutate.
//! 4. **Emulator:** The functional fetch-decode-execute loop.
//! 5. **Pipeline:** The superscalar in-order timing model.
//! 6. **Units:** ALU, execute, branch prediction, and cache.

/// Architectural register state.
pub mod arch;

/// The CPU state hub.
pub mod cpu;

/// The functional execution engine.
pub mod emulator;

/// Sparse guest memory.
pub mod memory;

/// The superscalar timing pipeline.
pub mod pipeline;

/// Functional units.
pub mod units;

pub use cpu::Cpu;
