//! Common utilities and types used throughout the AArch64 simulator.
//!
//! This module provides fundamental building blocks that are shared across all
//! components of the simulator. It includes:
//! 1. **Constants:** System-wide constants for instructions, pages, and register aliases.
//! 2. **Error Handling:** The fault taxonomy and program-load error types.

/// Common constants used throughout the simulator.
pub mod constants;

/// Fault and load-error definitions.
pub mod error;

pub use constants::{INSTRUCTION_SIZE, PAGE_SHIFT, PAGE_SIZE};
pub use error::{Fault, LoadError};
