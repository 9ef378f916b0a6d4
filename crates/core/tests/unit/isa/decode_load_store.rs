//! Load/Store Decode Tests.
//!
//! Verifies immediate scaling, addressing modes, pair forms, literals, and
//! the SP interpretation of the base register across the load/store classes.

use a64sim_core::isa::decode;
use a64sim_core::isa::opcode::{Format, IndexMode, Opcode};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder;

// ══════════════════════════════════════════════════════════
// 1. Unsigned immediate
// ══════════════════════════════════════════════════════════

/// `ldr x1, [x0, #8]` — golden encoding; the imm12 scales by 8.
#[test]
fn ldr64_imm_golden() {
    let inst = decode(0xF940_0401);
    assert_eq!(inst.opcode, Opcode::Ldr);
    assert_eq!(inst.format, Format::LoadStoreUnsignedImm);
    assert!(inst.is_64bit);
    assert_eq!((inst.rd, inst.rn), (1, 0));
    assert_eq!(inst.imm, 8);
    assert!(inst.rn_is_sp, "memory base reads SP at index 31");
}

/// `str x1, [x0]` — golden encoding.
#[test]
fn str64_imm_golden() {
    let inst = decode(0xF900_0001);
    assert_eq!(inst.opcode, Opcode::Str);
    assert_eq!(inst.imm, 0);
}

/// Offset scaling follows the access size per opcode.
#[rstest]
#[case(builder::ldrb_imm(0, 1, 17), Opcode::Ldrb, 17)]
#[case(builder::ldr32_imm(0, 1, 44), Opcode::Ldr, 44)]
#[case(builder::ldr64_imm(0, 1, 48), Opcode::Ldr, 48)]
#[case(builder::ldrsb_imm(0, 1, 5), Opcode::Ldrsb, 5)]
fn unsigned_imm_scaling(#[case] word: u32, #[case] opcode: Opcode, #[case] imm: i64) {
    let inst = decode(word);
    assert_eq!(inst.opcode, opcode);
    assert_eq!(inst.imm, imm);
}

/// The maximum scaled positive offset of a 64-bit load: 4095 * 8 bytes.
#[test]
fn ldr64_max_scaled_offset() {
    let inst = decode(builder::ldr64_imm(0, 1, 4095 * 8));
    assert_eq!(inst.imm, 4095 * 8);
}

/// LDRSB with opc=10 targets a 64-bit register, opc=11 a 32-bit one.
#[test]
fn ldrsb_width_variants() {
    let x_form = decode(builder::ldrsb_imm(0, 1, 0));
    assert!(x_form.is_64bit);
    assert!(x_form.is_signed_load());
    // Flip opc to 11 for the W form.
    let w_form = decode(builder::ldrsb_imm(0, 1, 0) | (0b01 << 22));
    assert_eq!(w_form.opcode, Opcode::Ldrsb);
    assert!(!w_form.is_64bit);
}

// ══════════════════════════════════════════════════════════
// 2. Register offset
// ══════════════════════════════════════════════════════════

/// `ldr x0, [x1, x2]` carries both the base and the offset register.
#[test]
fn ldr_reg_offset() {
    let inst = decode(builder::ldr64_reg(0, 1, 2));
    assert_eq!(inst.opcode, Opcode::Ldr);
    assert_eq!(inst.format, Format::LoadStoreRegOffset);
    assert_eq!((inst.rd, inst.rn, inst.rm), (0, 1, 2));
}

// ══════════════════════════════════════════════════════════
// 3. Pre/post-indexed
// ══════════════════════════════════════════════════════════

/// Pre-indexed loads carry the writeback mode and the unscaled imm9.
#[test]
fn ldr_pre_indexed() {
    let inst = decode(builder::ldr64_pre(2, 3, -16));
    assert_eq!(inst.opcode, Opcode::Ldr);
    assert_eq!(inst.format, Format::LoadStoreIndexed);
    assert_eq!(inst.index_mode, IndexMode::Pre);
    assert_eq!(inst.imm, -16);
    assert!(inst.writes_base());
}

/// Post-indexed stores keep the original base as the access address.
#[test]
fn str_post_indexed() {
    let inst = decode(builder::str64_post(2, 3, 8));
    assert_eq!(inst.opcode, Opcode::Str);
    assert_eq!(inst.index_mode, IndexMode::Post);
    assert_eq!(inst.imm, 8);
}

// ══════════════════════════════════════════════════════════
// 4. Pairs
// ══════════════════════════════════════════════════════════

/// `stp x0, x1, [sp, #-16]!` — golden encoding.
#[test]
fn stp_pre_golden() {
    let inst = decode(0xA9BF_07E0);
    assert_eq!(inst.opcode, Opcode::Stp);
    assert_eq!(inst.format, Format::LoadStorePair);
    assert_eq!(inst.index_mode, IndexMode::Pre);
    assert_eq!((inst.rd, inst.ra, inst.rn), (0, 1, 31));
    assert!(inst.rn_is_sp);
    assert_eq!(inst.imm, -16, "imm7 scales by 8 for the X form");
}

/// `ldp x0, x1, [sp], #16` — golden encoding.
#[test]
fn ldp_post_golden() {
    let inst = decode(0xA8C1_07E0);
    assert_eq!(inst.opcode, Opcode::Ldp);
    assert_eq!(inst.index_mode, IndexMode::Post);
    assert_eq!(inst.imm, 16);
    assert!(inst.writes_ra(), "pair loads write a second register");
}

/// 32-bit pairs scale the imm7 by 4.
#[test]
fn ldp32_scaling() {
    // opc=00 LDP W: clear bits 31:30 of the 64-bit builder output.
    let word = builder::ldp64(0, 1, 2, 0) & !(0b11 << 30) | (0b10 << 15);
    let inst = decode(word);
    assert_eq!(inst.opcode, Opcode::Ldp);
    assert!(!inst.is_64bit);
    assert_eq!(inst.imm, 8, "imm7=2 scales by 4 for the W form");
}

// ══════════════════════════════════════════════════════════
// 5. Literals
// ══════════════════════════════════════════════════════════

/// Load-literal offsets are word-scaled and PC-relative.
#[test]
fn ldr_literal_offsets() {
    let fwd = decode(builder::ldr_literal(0, 4));
    assert_eq!(fwd.opcode, Opcode::LdrLiteral);
    assert_eq!(fwd.format, Format::LoadLiteral);
    assert_eq!(fwd.offset, 16);

    let bwd = decode(builder::ldr_literal(0, -4));
    assert_eq!(bwd.offset, -16);
}
