//! Register shifts and operand extension.
//!
//! Implements the four A64 shift kinds applied to register operands and the
//! extend-and-shift used by extended-register add/subtract and register-offset
//! addressing. Shift amounts are masked to the register width (low 6 bits for
//! X-forms, low 5 for W-forms), which also gives the variable-shift
//! instructions their wrap-around semantics.

use crate::isa::opcode::ShiftKind;

/// Applies a shift to a register operand at the given width.
///
/// # Arguments
///
/// * `value` - The operand (W-forms use its low 32 bits).
/// * `kind` - Shift kind.
/// * `amount` - Shift amount; masked to 0-63 (X) or 0-31 (W).
/// * `is_64bit` - Width selector; W results are zero-extended.
pub fn shift_reg(value: u64, kind: ShiftKind, amount: u32, is_64bit: bool) -> u64 {
    if is_64bit {
        let amount = amount & 0x3F;
        match kind {
            ShiftKind::Lsl => value.wrapping_shl(amount),
            ShiftKind::Lsr => value.wrapping_shr(amount),
            ShiftKind::Asr => ((value as i64).wrapping_shr(amount)) as u64,
            ShiftKind::Ror => value.rotate_right(amount),
        }
    } else {
        let amount = amount & 0x1F;
        let value = value as u32;
        let result = match kind {
            ShiftKind::Lsl => value.wrapping_shl(amount),
            ShiftKind::Lsr => value.wrapping_shr(amount),
            ShiftKind::Asr => ((value as i32).wrapping_shr(amount)) as u32,
            ShiftKind::Ror => value.rotate_right(amount),
        };
        u64::from(result)
    }
}

/// Applies an extend-then-shift to a register operand.
///
/// Used by extended-register add/subtract and by register-offset addressing.
/// The three-bit `option` selects the extension source width and signedness;
/// `shift` is the left shift applied afterwards (0-4).
///
/// # Arguments
///
/// * `value` - The operand register value.
/// * `option` - Extend option: 0-3 unsigned (byte/half/word/none), 4-7 signed.
/// * `shift` - Left-shift amount applied after extension.
pub fn extend_reg(value: u64, option: u32, shift: u32) -> u64 {
    let extended = match option & 0b111 {
        0b000 => u64::from(value as u8),
        0b001 => u64::from(value as u16),
        0b010 => u64::from(value as u32),
        0b011 => value,
        0b100 => (i64::from(value as u8 as i8)) as u64,
        0b101 => (i64::from(value as u16 as i16)) as u64,
        0b110 => (i64::from(value as u32 as i32)) as u64,
        _ => value,
    };
    extended.wrapping_shl(shift)
}
