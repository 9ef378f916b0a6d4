//! Simulation: simulator, program loading, and the syscall seam.
//!
//! This module composes the core into a runnable whole:
//! 1. **Simulator:** Owns the CPU and the configured execution engine.
//! 2. **Loader:** Segment placement and ELF parsing.
//! 3. **Syscalls:** The handler trait and the built-in hosted handler.

/// Program loading.
pub mod loader;

/// The top-level simulator.
pub mod simulator;

/// The supervisor-call seam.
pub mod syscall;

pub use loader::{Program, Segment};
pub use simulator::Simulator;
pub use syscall::{HostedSyscalls, SyscallHandler, SyscallOutcome};
