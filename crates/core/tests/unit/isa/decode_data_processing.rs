//! Data-Processing Decode Tests.
//!
//! Verifies the decoder over the immediate and register data-processing
//! classes: arithmetic, logical, move-wide, PC-relative, bitfield, extract,
//! multi-source, and conditional forms. Golden words were produced by a
//! reference assembler; the rest come from the test builder.

use a64sim_core::isa::opcode::{Cond, Format, Opcode, ShiftKind};
use a64sim_core::isa::{Instruction, decode};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder;

// ══════════════════════════════════════════════════════════
// 1. Add/subtract immediate
// ══════════════════════════════════════════════════════════

/// `add x0, x0, #1` — golden encoding.
#[test]
fn add_imm_golden() {
    let inst = decode(0x9100_0400);
    assert_eq!(inst.opcode, Opcode::Add);
    assert_eq!(inst.format, Format::AddSubImm);
    assert!(inst.is_64bit);
    assert!(!inst.sets_flags);
    assert_eq!(inst.rd, 0);
    assert_eq!(inst.rn, 0);
    assert_eq!(inst.imm, 1);
}

/// `subs x0, x0, #1` — golden encoding; the S bit must be picked up.
#[test]
fn subs_imm_golden() {
    let inst = decode(0xF100_0400);
    assert_eq!(inst.opcode, Opcode::Subs);
    assert!(inst.sets_flags);
    assert_eq!(inst.imm, 1);
}

/// Register 31 in the Rn field of immediate add/sub names SP, and in the
/// Rd field names SP only for the non-flag-setting form.
#[test]
fn add_imm_sp_interpretation() {
    let plain = decode(builder::add_imm(31, 31, 0));
    assert!(plain.rn_is_sp, "Rn=31 is SP for ADD immediate");
    assert!(plain.rd_is_sp, "Rd=31 is SP for ADD immediate");

    let flags = decode(builder::subs_imm(31, 31, 0));
    assert!(flags.rn_is_sp, "Rn=31 is still SP for SUBS immediate");
    assert!(!flags.rd_is_sp, "Rd=31 is ZR for the flag-setting form");
}

/// Maximum 12-bit immediate, with and without the LSL #12 shift.
#[rstest]
#[case(false, 4095)]
#[case(true, 4095 << 12)]
fn add_imm_boundary(#[case] shifted: bool, #[case] expected: i64) {
    let word = builder::addsub_imm(true, false, false, 0, 1, 4095, shifted);
    let inst = decode(word);
    assert_eq!(inst.opcode, Opcode::Add);
    assert_eq!(inst.imm, expected);
}

// ══════════════════════════════════════════════════════════
// 2. Add/subtract and logical register
// ══════════════════════════════════════════════════════════

/// `add x0, x0, x1` — golden encoding.
#[test]
fn add_reg_golden() {
    let inst = decode(0x8B01_0000);
    assert_eq!(inst.opcode, Opcode::Add);
    assert_eq!(inst.format, Format::AddSubShifted);
    assert_eq!((inst.rd, inst.rn, inst.rm), (0, 0, 1));
    assert_eq!(inst.shift, ShiftKind::Lsl);
    assert_eq!(inst.shift_amount, 0);
}

/// Shifted-register operands carry the shift kind and amount.
#[test]
fn add_reg_shifted() {
    let inst = decode(builder::addsub_reg(true, false, false, 2, 3, 4, 2, 12));
    assert_eq!(inst.opcode, Opcode::Add);
    assert_eq!(inst.shift, ShiftKind::Asr);
    assert_eq!(inst.shift_amount, 12);
}

/// The N bit routes logical-register forms to their complemented variants.
#[rstest]
#[case(0, false, Opcode::And)]
#[case(0, true, Opcode::Bic)]
#[case(1, false, Opcode::Orr)]
#[case(1, true, Opcode::Orn)]
#[case(2, false, Opcode::Eor)]
#[case(2, true, Opcode::Eon)]
#[case(3, false, Opcode::Ands)]
#[case(3, true, Opcode::Bics)]
fn logical_reg_n_bit_routing(#[case] opc: u32, #[case] invert: bool, #[case] expected: Opcode) {
    let inst = decode(builder::logical_reg(true, opc, invert, 0, 1, 2, 0, 0));
    assert_eq!(inst.opcode, expected);
    assert_eq!(inst.sets_flags, matches!(expected, Opcode::Ands | Opcode::Bics));
}

/// A W-form shift amount of 32 or more is an unallocated encoding.
#[test]
fn logical_reg_w_shift_out_of_range() {
    let inst = decode(builder::logical_reg(false, 1, false, 0, 1, 2, 0, 33));
    assert_eq!(inst.opcode, Opcode::Unknown);
}

// ══════════════════════════════════════════════════════════
// 3. Move wide
// ══════════════════════════════════════════════════════════

/// `mov x8, #93` (`MOVZ`) — golden encoding.
#[test]
fn movz_golden() {
    let inst = decode(0xD280_0BA8);
    assert_eq!(inst.opcode, Opcode::Movz);
    assert_eq!(inst.rd, 8);
    assert_eq!(inst.imm, 93);
    assert_eq!(inst.shift_amount, 0);
}

/// MOVK keeps the other bits, so the decoder aliases Rn to the old Rd for
/// the forwarding network.
#[test]
fn movk_aliases_rn_to_rd() {
    let inst = decode(builder::movk(5, 0xBEEF, 1));
    assert_eq!(inst.opcode, Opcode::Movk);
    assert_eq!(inst.rd, 5);
    assert_eq!(inst.rn, 5, "MOVK reads its own destination");
    assert_eq!(inst.shift_amount, 16);
}

/// A 32-bit move-wide with hw > 1 is unallocated.
#[test]
fn movz_w_high_hw_invalid() {
    let inst = decode(builder::move_wide(false, 2, 0, 1, 2));
    assert_eq!(inst.opcode, Opcode::Unknown);
}

// ══════════════════════════════════════════════════════════
// 4. PC-relative
// ══════════════════════════════════════════════════════════

/// `adr x0, #8` — golden encoding.
#[test]
fn adr_golden() {
    let inst = decode(0x1000_0040);
    assert_eq!(inst.opcode, Opcode::Adr);
    assert_eq!(inst.imm, 8);
}

/// ADRP scales its immediate by 4 KiB.
#[test]
fn adrp_scales_to_pages() {
    // adrp x0, #+1 page.
    let inst = decode(0xB000_0000);
    assert_eq!(inst.opcode, Opcode::Adrp);
    assert_eq!(inst.imm, 0x1000);
}

/// Negative ADR displacements sign-extend.
#[test]
fn adr_negative_offset() {
    let inst = decode(builder::adr(3, -8));
    assert_eq!(inst.opcode, Opcode::Adr);
    assert_eq!(inst.imm, -8);
    assert_eq!(inst.rd, 3);
}

// ══════════════════════════════════════════════════════════
// 5. Bitfield and extract
// ══════════════════════════════════════════════════════════

/// `lsl x0, x1, #4` decodes as UBFM with the alias field values.
#[test]
fn lsl_alias_golden() {
    let inst = decode(0xD37C_EC20);
    assert_eq!(inst.opcode, Opcode::Ubfm);
    assert_eq!(inst.imm, 60, "immr = -shift mod 64");
    assert_eq!(inst.imm2, 59, "imms = 63 - shift");
}

/// BFM aliases Rm to the old destination for the forwarding network.
#[test]
fn bfm_aliases_rm_to_rd() {
    let inst = decode(builder::bitfield(true, 1, 7, 2, 0, 15));
    assert_eq!(inst.opcode, Opcode::Bfm);
    assert_eq!(inst.rm, 7, "BFM reads its own destination");
}

/// A bitfield whose N bit disagrees with sf is unallocated.
#[test]
fn bitfield_n_sf_mismatch_invalid() {
    // 32-bit SBFM with N=1.
    let word = 0x1300_0000 | (1 << 22) | (1 << 5);
    assert_eq!(decode(word).opcode, Opcode::Unknown);
}

/// `extr x0, x1, x2, #8` — golden encoding.
#[test]
fn extr_golden() {
    let inst = decode(0x93C2_2020);
    assert_eq!(inst.opcode, Opcode::Extr);
    assert_eq!((inst.rd, inst.rn, inst.rm), (0, 1, 2));
    assert_eq!(inst.imm, 8);
}

// ══════════════════════════════════════════════════════════
// 6. Two- and three-source
// ══════════════════════════════════════════════════════════

/// `udiv x0, x1, x2` — golden encoding.
#[test]
fn udiv_golden() {
    let inst = decode(0x9AC2_0820);
    assert_eq!(inst.opcode, Opcode::Udiv);
    assert_eq!((inst.rd, inst.rn, inst.rm), (0, 1, 2));
}

/// The two-source opcode field selects the four variable shifts.
#[rstest]
#[case(8, Opcode::Lslv)]
#[case(9, Opcode::Lsrv)]
#[case(10, Opcode::Asrv)]
#[case(11, Opcode::Rorv)]
fn variable_shift_selectors(#[case] selector: u32, #[case] expected: Opcode) {
    let inst = decode(builder::data_proc_2src(true, 0, 1, 2, selector));
    assert_eq!(inst.opcode, expected);
}

/// `mul x0, x1, x3` is MADD with Ra = ZR.
#[test]
fn mul_alias_golden() {
    let inst = decode(0x9B03_7C20);
    assert_eq!(inst.opcode, Opcode::Madd);
    assert_eq!(inst.ra, 31);
}

/// MSUB is selected by the o0 bit.
#[test]
fn msub_decodes() {
    let inst = decode(builder::msub(0, 1, 2, 3));
    assert_eq!(inst.opcode, Opcode::Msub);
    assert_eq!(inst.ra, 3);
}

// ══════════════════════════════════════════════════════════
// 7. Conditional compare and select
// ══════════════════════════════════════════════════════════

/// `ccmp x1, #5, #0, eq` — golden immediate form.
#[test]
fn ccmp_imm_golden() {
    let inst = decode(0xFA45_0820);
    assert_eq!(inst.opcode, Opcode::Ccmp);
    assert_eq!(inst.format, Format::CondCompareImm);
    assert_eq!(inst.rn, 1);
    assert_eq!(inst.imm, 5);
    assert_eq!(inst.imm2, 0, "nzcv field");
    assert_eq!(inst.cond, Cond::Eq);
    assert!(inst.sets_flags);
}

/// `csel x0, x1, x2, eq` — golden encoding.
#[test]
fn csel_golden() {
    let inst = decode(0x9A82_0020);
    assert_eq!(inst.opcode, Opcode::Csel);
    assert_eq!((inst.rd, inst.rn, inst.rm), (0, 1, 2));
    assert_eq!(inst.cond, Cond::Eq);
}

/// The op/op2 bits select the four conditional-select variants.
#[rstest]
#[case(false, 0, Opcode::Csel)]
#[case(false, 1, Opcode::Csinc)]
#[case(true, 0, Opcode::Csinv)]
#[case(true, 1, Opcode::Csneg)]
fn cond_select_variants(#[case] op: bool, #[case] op2: u32, #[case] expected: Opcode) {
    let inst = decode(builder::cond_select(true, op, op2, 0, 1, 2, 0));
    assert_eq!(inst.opcode, expected);
}

// ══════════════════════════════════════════════════════════
// 8. Round-trip through the builder
// ══════════════════════════════════════════════════════════

/// Builder-encoded data-processing forms decode back to their fields.
#[test]
fn builder_round_trip() {
    let cases: [(u32, Opcode); 6] = [
        (builder::add_imm(1, 2, 100), Opcode::Add),
        (builder::sub_imm(3, 4, 7), Opcode::Sub),
        (builder::mov_reg(5, 6), Opcode::Orr),
        (builder::movz(7, 0x1234), Opcode::Movz),
        (builder::madd(8, 9, 10, 11), Opcode::Madd),
        (builder::extr(12, 13, 14, 3), Opcode::Extr),
    ];
    for (word, opcode) in cases {
        let inst: Instruction = decode(word);
        assert_eq!(inst.opcode, opcode, "word {word:#010x}");
    }
}
