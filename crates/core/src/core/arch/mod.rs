//! Architectural register state.
//!
//! This module implements the AArch64 user-visible register state. It provides:
//! 1. **General Purpose:** 31 64-bit registers plus the dedicated stack pointer.
//! 2. **Flags:** The NZCV condition bundle and condition-code evaluation.
//! 3. **Vectors:** The 32-entry 128-bit SIMD register file.

/// General-purpose register file with SP.
pub mod gpr;

/// NZCV condition flags.
pub mod pstate;

/// SIMD vector register file.
pub mod vreg;

pub use gpr::Gpr;
pub use pstate::Pstate;
pub use vreg::VregFile;
