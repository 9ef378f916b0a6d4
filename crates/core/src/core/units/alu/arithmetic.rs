//! Add-with-carry and the add/subtract flag rules.
//!
//! A64 defines both `ADDS` and `SUBS` in terms of one primitive:
//! `AddWithCarry(a, b, carry_in)`, where subtraction passes the complemented
//! second operand and a carry-in of one. C is therefore the outgoing carry
//! for adds and the borrow-complement for subtracts, and V is the signed
//! overflow of the operation.

use crate::core::arch::Pstate;

/// Computes `a + b + carry_in` with NZCV, at the given register width.
///
/// # Arguments
///
/// * `a` - First operand.
/// * `b` - Second operand (pass `!b` with `carry_in = true` to subtract).
/// * `carry_in` - Incoming carry.
/// * `is_64bit` - Width selector; 32-bit results are zero-extended.
///
/// # Returns
///
/// The result (zero-extended for W-forms) and the four flags.
pub fn add_with_carry(a: u64, b: u64, carry_in: bool, is_64bit: bool) -> (u64, Pstate) {
    if is_64bit {
        let wide = u128::from(a) + u128::from(b) + u128::from(carry_in as u8);
        let result = wide as u64;
        let flags = Pstate {
            n: (result as i64) < 0,
            z: result == 0,
            c: (wide >> 64) != 0,
            v: ((a ^ result) & (b ^ result)) >> 63 != 0,
        };
        (result, flags)
    } else {
        let a32 = a as u32;
        let b32 = b as u32;
        let wide = u64::from(a32) + u64::from(b32) + u64::from(carry_in as u8);
        let result = wide as u32;
        let flags = Pstate {
            n: (result as i32) < 0,
            z: result == 0,
            c: (wide >> 32) != 0,
            v: ((a32 ^ result) & (b32 ^ result)) >> 31 != 0,
        };
        (u64::from(result), flags)
    }
}
