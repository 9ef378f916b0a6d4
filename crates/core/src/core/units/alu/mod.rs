//! Integer ALU helpers.
//!
//! Pure arithmetic used by the execute unit. Split by concern:
//! 1. **Arithmetic:** Add-with-carry and the NZCV rules for add/subtract.
//! 2. **Logic:** Bitwise operations and their NZ flag rule.
//! 3. **Shifts:** The four A64 shift kinds and operand extension.
//!
//! Everything here is width-aware: W-forms compute in 32 bits and
//! zero-extend, X-forms in 64.

/// Add/subtract with NZCV computation.
pub mod arithmetic;

/// Bitwise operations and their flag rule.
pub mod logic;

/// Register shifts and operand extension.
pub mod shifts;

pub use arithmetic::add_with_carry;
pub use logic::logical_flags;
pub use shifts::{extend_reg, shift_reg};
