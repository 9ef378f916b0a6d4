//! Functional units shared by the emulator and the timing pipeline.
//!
//! This module groups the pure and stateful units of the core:
//! 1. **ALU:** Width-aware arithmetic, logic, and shift helpers.
//! 2. **Execute:** Per-instruction semantics over forwarded operand values.
//! 3. **BRU:** The tournament branch predictor and branch target buffer.
//! 4. **Cache:** The set-associative cache timing model.

/// Integer ALU helpers.
pub mod alu;

/// Branch prediction unit.
pub mod bru;

/// Set-associative cache model.
pub mod cache;

/// The per-instruction execute unit.
pub mod exec;
