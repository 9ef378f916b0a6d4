//! Bitwise operation flag rule.
//!
//! A64 logical operations that set flags (`ANDS`, `BICS`, and the `TST`
//! alias) compute N and Z from the result and clear C and V.

use crate::core::arch::Pstate;

/// Computes the NZCV bundle a flag-setting logical operation produces.
///
/// # Arguments
///
/// * `result` - The (already width-reduced) operation result.
/// * `is_64bit` - Width selector for the sign bit.
pub fn logical_flags(result: u64, is_64bit: bool) -> Pstate {
    let n = if is_64bit {
        (result as i64) < 0
    } else {
        (result as i32) < 0
    };
    Pstate {
        n,
        z: if is_64bit {
            result == 0
        } else {
            result as u32 == 0
        },
        c: false,
        v: false,
    }
}
