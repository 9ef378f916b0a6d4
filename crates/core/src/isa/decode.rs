//! The A64 instruction decoder.
//!
//! This module turns a 32-bit instruction word into the flat
//! [`Instruction`] record. Decoding is a layered dispatch: `decode` tests
//! bit patterns in a fixed priority order and routes the word to one of the
//! format sub-decoders below. The order matters because several top-level
//! patterns overlap (load/store pair versus data-processing register, for
//! example); it must not be rearranged.
//!
//! Every sub-decoder is total: a word that matches a class pattern but an
//! unallocated variant inside it decodes to `Opcode::Unknown`, and the
//! caller decides the severity.

use crate::common::constants::NOP_WORD;
use crate::isa::bitmask::decode_bit_masks;
use crate::isa::instruction::{Instruction, InstructionBits};
use crate::isa::opcode::{Arrangement, Cond, Format, IndexMode, Opcode, ShiftKind};

/// Sign-extends the low `bits` bits of `val` to a 64-bit signed integer.
fn sign_extend(val: u64, bits: u32) -> i64 {
    let shift = 64 - bits;
    ((val << shift) as i64) >> shift
}

/// Decodes a 32-bit A64 word into an [`Instruction`].
///
/// Pure and deterministic: the same word always produces the same record,
/// and no word panics. Undecodable words yield `Opcode::Unknown`.
///
/// # Arguments
///
/// * `word` - The 32-bit instruction encoding.
pub fn decode(word: u32) -> Instruction {
    // SIMD classes first: their fixed bits overlap the scalar load/store
    // and data-processing spaces.
    if (word & 0xFFC0_0000) == 0x3DC0_0000 || (word & 0xFFC0_0000) == 0x3D80_0000 {
        return decode_simd_load_store(word);
    }
    if (word & 0xBF20_0400) == 0x0E20_0400 {
        return decode_simd_three_same(word);
    }
    if (word & 0xBFE0_FC00) == 0x0E00_0C00 {
        return decode_simd_copy(word);
    }
    // Loads and stores before the data-processing register classes.
    if (word & 0x3C00_0000) == 0x2800_0000 {
        return decode_load_store_pair(word);
    }
    if (word & 0x3F00_0000) == 0x1800_0000 {
        return decode_load_literal(word);
    }
    if (word & 0x3F20_0C00) == 0x3820_0800 {
        return decode_load_store_reg_offset(word);
    }
    if (word & 0x3F20_0400) == 0x3800_0400 {
        return decode_load_store_indexed(word);
    }
    if (word & 0x3F00_0000) == 0x3900_0000 {
        return decode_load_store_unsigned_imm(word);
    }
    // Data-processing immediate.
    if (word & 0x1F00_0000) == 0x1000_0000 {
        return decode_pc_rel(word);
    }
    if (word & 0x1F80_0000) == 0x1280_0000 {
        return decode_move_wide(word);
    }
    // Data-processing register: conditional and multi-source classes carry
    // more fixed bits than the arithmetic classes, so they test first.
    if (word & 0x3FE0_0410) == 0x3A40_0000 {
        return decode_cond_compare(word);
    }
    if (word & 0x3FE0_0800) == 0x1A80_0000 {
        return decode_cond_select(word);
    }
    if (word & 0x7FE0_0000) == 0x1AC0_0000 {
        return decode_data_proc_2src(word);
    }
    if (word & 0x1F00_0000) == 0x1B00_0000 {
        return decode_data_proc_3src(word);
    }
    if (word & 0x1F80_0000) == 0x1200_0000 {
        return decode_logical_imm(word);
    }
    if (word & 0x1F80_0000) == 0x1380_0000 {
        return decode_extract(word);
    }
    if (word & 0x1F80_0000) == 0x1300_0000 {
        return decode_bitfield(word);
    }
    if (word & 0x1F00_0000) == 0x1100_0000 {
        return decode_add_sub_imm(word);
    }
    if (word & 0x1F20_0000) == 0x0B00_0000 {
        return decode_add_sub_shifted(word);
    }
    if (word & 0x1FE0_0000) == 0x0B20_0000 {
        return decode_add_sub_extended(word);
    }
    if (word & 0x1F00_0000) == 0x0A00_0000 {
        return decode_logical_shifted(word);
    }
    // Branches.
    if (word & 0x7E00_0000) == 0x3600_0000 {
        return decode_test_branch(word);
    }
    if (word & 0x7E00_0000) == 0x3400_0000 {
        return decode_compare_branch(word);
    }
    if (word & 0x7C00_0000) == 0x1400_0000 {
        return decode_branch_imm(word);
    }
    if (word & 0xFF00_0010) == 0x5400_0000 {
        return decode_branch_cond(word);
    }
    if (word & 0xFE00_0000) == 0xD600_0000 {
        return decode_branch_reg(word);
    }
    // System, exception, hint.
    if word == NOP_WORD {
        return Instruction {
            opcode: Opcode::Nop,
            format: Format::Hint,
            ..Instruction::default()
        };
    }
    if (word & 0xFF00_0000) == 0xD400_0000 {
        return decode_exception(word);
    }
    if (word & 0xFFF0_0000) == 0xD530_0000 {
        return decode_mrs(word);
    }

    Instruction::unknown()
}

/// Decodes 128-bit SIMD register load/store (unsigned immediate offset).
fn decode_simd_load_store(word: u32) -> Instruction {
    let is_load = word.bit(22);
    let imm12 = u64::from(word.field(10, 12));
    Instruction {
        opcode: if is_load { Opcode::LdrQ } else { Opcode::StrQ },
        format: Format::SimdLoadStore,
        is_64bit: true,
        rd: word.rd(),
        rn: word.rn(),
        rn_is_sp: true,
        imm: (imm12 * 16) as i64,
        ..Instruction::default()
    }
}

/// Decodes the SIMD three-same arithmetic class.
///
/// Supported forms: integer `ADD`/`SUB`/`MUL` and floating-point
/// `FADD`/`FSUB`/`FMUL` over any arrangement. Other three-same opcodes
/// decode to `Unknown`.
fn decode_simd_three_same(word: u32) -> Instruction {
    let q = word.bit(30);
    let u = word.bit(29);
    let size = word.field(22, 2);
    let opc = word.field(11, 5);

    let int_arrangement = match (size, q) {
        (0b00, false) => Some(Arrangement::B8),
        (0b00, true) => Some(Arrangement::B16),
        (0b01, false) => Some(Arrangement::H4),
        (0b01, true) => Some(Arrangement::H8),
        (0b10, false) => Some(Arrangement::S2),
        (0b10, true) => Some(Arrangement::S4),
        (0b11, true) => Some(Arrangement::D2),
        _ => None,
    };
    // FP forms encode lane size in bit 22 alone; bit 23 selects FADD/FSUB.
    let fp_arrangement = match (word.bit(22), q) {
        (false, false) => Some(Arrangement::S2),
        (false, true) => Some(Arrangement::S4),
        (true, true) => Some(Arrangement::D2),
        (true, false) => None,
    };

    let (opcode, arrangement, is_float) = match (u, opc) {
        (false, 0b10000) => (Opcode::Vadd, int_arrangement, false),
        (true, 0b10000) => (Opcode::Vsub, int_arrangement, false),
        (false, 0b10011) => (Opcode::Vmul, int_arrangement, false),
        (false, 0b11010) => (
            if word.bit(23) { Opcode::Vfsub } else { Opcode::Vfadd },
            fp_arrangement,
            true,
        ),
        (true, 0b11011) if !word.bit(23) => (Opcode::Vfmul, fp_arrangement, true),
        _ => return Instruction::unknown(),
    };
    let Some(arrangement) = arrangement else {
        return Instruction::unknown();
    };

    Instruction {
        opcode,
        format: Format::SimdThreeSame,
        is_64bit: true,
        rd: word.rd(),
        rn: word.rn(),
        rm: word.rm(),
        arrangement,
        is_float,
        ..Instruction::default()
    }
}

/// Decodes `DUP Vd.T, Rn` (general register to all vector lanes).
fn decode_simd_copy(word: u32) -> Instruction {
    let q = word.bit(30);
    let imm5 = word.field(16, 5);
    let arrangement = if imm5 & 1 != 0 {
        if q { Arrangement::B16 } else { Arrangement::B8 }
    } else if imm5 & 2 != 0 {
        if q { Arrangement::H8 } else { Arrangement::H4 }
    } else if imm5 & 4 != 0 {
        if q { Arrangement::S4 } else { Arrangement::S2 }
    } else if imm5 & 8 != 0 && q {
        Arrangement::D2
    } else {
        return Instruction::unknown();
    };

    Instruction {
        opcode: Opcode::Dup,
        format: Format::SimdCopy,
        is_64bit: true,
        rd: word.rd(),
        rn: word.rn(),
        arrangement,
        ..Instruction::default()
    }
}

/// Decodes `LDP`/`STP` with signed-offset, pre-, or post-indexed addressing.
fn decode_load_store_pair(word: u32) -> Instruction {
    let opc = word.field(30, 2);
    let is_64bit = match opc {
        0b00 => false,
        0b10 => true,
        _ => return Instruction::unknown(),
    };
    let index_mode = match word.field(23, 3) {
        0b001 => IndexMode::Post,
        0b011 => IndexMode::Pre,
        0b010 => IndexMode::None,
        _ => return Instruction::unknown(),
    };
    let scale: i64 = if is_64bit { 8 } else { 4 };
    let imm7 = sign_extend(u64::from(word.field(15, 7)), 7);

    Instruction {
        opcode: if word.bit(22) { Opcode::Ldp } else { Opcode::Stp },
        format: Format::LoadStorePair,
        is_64bit,
        rd: word.rd(),
        rn: word.rn(),
        ra: word.ra(),
        rn_is_sp: true,
        imm: imm7 * scale,
        index_mode,
        ..Instruction::default()
    }
}

/// Decodes PC-relative loads from a literal pool.
fn decode_load_literal(word: u32) -> Instruction {
    let (opcode, is_64bit) = match word.field(30, 2) {
        0b00 => (Opcode::LdrLiteral, false),
        0b01 => (Opcode::LdrLiteral, true),
        0b10 => (Opcode::Ldrsw, true),
        _ => return Instruction::unknown(),
    };
    let offset = sign_extend(u64::from(word.field(5, 19)), 19) * 4;

    Instruction {
        opcode,
        format: Format::LoadLiteral,
        is_64bit,
        rd: word.rd(),
        offset,
        ..Instruction::default()
    }
}

/// Maps the load/store `size`/`opc` fields to an opcode and register width.
///
/// Returns `None` for unallocated combinations (prefetch hints and the
/// unsupported SIMD variants of the scalar encodings).
fn load_store_opcode(size: u32, opc: u32) -> Option<(Opcode, bool)> {
    match (size, opc) {
        (0b00, 0b00) => Some((Opcode::Strb, false)),
        (0b00, 0b01) => Some((Opcode::Ldrb, false)),
        (0b00, 0b10) => Some((Opcode::Ldrsb, true)),
        (0b00, 0b11) => Some((Opcode::Ldrsb, false)),
        (0b01, 0b00) => Some((Opcode::Strh, false)),
        (0b01, 0b01) => Some((Opcode::Ldrh, false)),
        (0b01, 0b10) => Some((Opcode::Ldrsh, true)),
        (0b01, 0b11) => Some((Opcode::Ldrsh, false)),
        (0b10, 0b00) => Some((Opcode::Str, false)),
        (0b10, 0b01) => Some((Opcode::Ldr, false)),
        (0b10, 0b10) => Some((Opcode::Ldrsw, true)),
        (0b11, 0b00) => Some((Opcode::Str, true)),
        (0b11, 0b01) => Some((Opcode::Ldr, true)),
        _ => None,
    }
}

/// Decodes loads/stores with a register offset (`[Xn, Xm{, ext #s}]`).
fn decode_load_store_reg_offset(word: u32) -> Instruction {
    let size = word.field(30, 2);
    let Some((opcode, is_64bit)) = load_store_opcode(size, word.field(22, 2)) else {
        return Instruction::unknown();
    };
    let option = word.field(13, 3);
    // Option field: 010 UXTW, 011 LSL, 110 SXTW, 111 SXTX; others reserved.
    if !matches!(option, 0b010 | 0b011 | 0b110 | 0b111) {
        return Instruction::unknown();
    }
    let shift_amount = if word.bit(12) { size as u8 } else { 0 };

    Instruction {
        opcode,
        format: Format::LoadStoreRegOffset,
        is_64bit,
        rd: word.rd(),
        rn: word.rn(),
        rm: word.rm(),
        rn_is_sp: true,
        imm2: option,
        shift_amount,
        ..Instruction::default()
    }
}

/// Decodes pre/post-indexed loads/stores with a signed 9-bit offset.
fn decode_load_store_indexed(word: u32) -> Instruction {
    let size = word.field(30, 2);
    let Some((opcode, is_64bit)) = load_store_opcode(size, word.field(22, 2)) else {
        return Instruction::unknown();
    };
    let index_mode = if word.bit(11) { IndexMode::Pre } else { IndexMode::Post };
    let imm9 = sign_extend(u64::from(word.field(12, 9)), 9);

    Instruction {
        opcode,
        format: Format::LoadStoreIndexed,
        is_64bit,
        rd: word.rd(),
        rn: word.rn(),
        rn_is_sp: true,
        imm: imm9,
        index_mode,
        ..Instruction::default()
    }
}

/// Decodes loads/stores with a scaled unsigned 12-bit immediate offset.
fn decode_load_store_unsigned_imm(word: u32) -> Instruction {
    let size = word.field(30, 2);
    let Some((opcode, is_64bit)) = load_store_opcode(size, word.field(22, 2)) else {
        return Instruction::unknown();
    };
    let imm12 = u64::from(word.field(10, 12));

    let mut inst = Instruction {
        opcode,
        format: Format::LoadStoreUnsignedImm,
        is_64bit,
        rd: word.rd(),
        rn: word.rn(),
        rn_is_sp: true,
        ..Instruction::default()
    };
    // The offset scales by the access size, which depends on the opcode.
    inst.imm = (imm12 * inst.mem_bytes()) as i64;
    inst
}

/// Decodes `ADR` and `ADRP`.
fn decode_pc_rel(word: u32) -> Instruction {
    let immlo = u64::from(word.field(29, 2));
    let immhi = u64::from(word.field(5, 19));
    let imm21 = sign_extend((immhi << 2) | immlo, 21);
    let (opcode, imm) = if word.bit(31) {
        (Opcode::Adrp, imm21 << 12)
    } else {
        (Opcode::Adr, imm21)
    };

    Instruction {
        opcode,
        format: Format::PcRel,
        is_64bit: true,
        rd: word.rd(),
        imm,
        ..Instruction::default()
    }
}

/// Decodes `MOVN`/`MOVZ`/`MOVK`.
fn decode_move_wide(word: u32) -> Instruction {
    let sf = word.sf();
    let opcode = match word.field(29, 2) {
        0b00 => Opcode::Movn,
        0b10 => Opcode::Movz,
        0b11 => Opcode::Movk,
        _ => return Instruction::unknown(),
    };
    let hw = word.field(21, 2);
    if !sf && hw > 1 {
        return Instruction::unknown();
    }

    let mut inst = Instruction {
        opcode,
        format: Format::MoveWide,
        is_64bit: sf,
        rd: word.rd(),
        imm: i64::from(word.field(5, 16)),
        shift_amount: (hw * 16) as u8,
        ..Instruction::default()
    };
    // MOVK reads the old destination; alias it onto rn so forwarding and
    // hazard checks see the read-modify-write dependency.
    if opcode == Opcode::Movk {
        inst.rn = inst.rd;
    }
    inst
}

/// Decodes `CCMP`/`CCMN` (register and immediate forms).
fn decode_cond_compare(word: u32) -> Instruction {
    let opcode = if word.bit(30) { Opcode::Ccmp } else { Opcode::Ccmn };
    let is_imm = word.bit(11);

    let mut inst = Instruction {
        opcode,
        format: if is_imm { Format::CondCompareImm } else { Format::CondCompareReg },
        is_64bit: word.sf(),
        sets_flags: true,
        rn: word.rn(),
        cond: Cond::from_bits(word.field(12, 4)),
        imm2: word.field(0, 4),
        ..Instruction::default()
    };
    if is_imm {
        inst.imm = i64::from(word.rm());
    } else {
        inst.rm = word.rm();
    }
    inst
}

/// Decodes `CSEL`/`CSINC`/`CSINV`/`CSNEG`.
fn decode_cond_select(word: u32) -> Instruction {
    let opcode = match (word.bit(30), word.bit(10)) {
        (false, false) => Opcode::Csel,
        (false, true) => Opcode::Csinc,
        (true, false) => Opcode::Csinv,
        (true, true) => Opcode::Csneg,
    };

    Instruction {
        opcode,
        format: Format::CondSelect,
        is_64bit: word.sf(),
        rd: word.rd(),
        rn: word.rn(),
        rm: word.rm(),
        cond: Cond::from_bits(word.field(12, 4)),
        ..Instruction::default()
    }
}

/// Decodes the two-source class: divides and variable shifts.
fn decode_data_proc_2src(word: u32) -> Instruction {
    let opcode = match word.field(10, 6) {
        0b000010 => Opcode::Udiv,
        0b000011 => Opcode::Sdiv,
        0b001000 => Opcode::Lslv,
        0b001001 => Opcode::Lsrv,
        0b001010 => Opcode::Asrv,
        0b001011 => Opcode::Rorv,
        _ => return Instruction::unknown(),
    };

    Instruction {
        opcode,
        format: Format::DataProc2Src,
        is_64bit: word.sf(),
        rd: word.rd(),
        rn: word.rn(),
        rm: word.rm(),
        ..Instruction::default()
    }
}

/// Decodes the three-source class: `MADD`/`MSUB`.
fn decode_data_proc_3src(word: u32) -> Instruction {
    if word.field(21, 3) != 0b000 || word.field(29, 2) != 0b00 {
        return Instruction::unknown();
    }
    let opcode = if word.bit(15) { Opcode::Msub } else { Opcode::Madd };

    Instruction {
        opcode,
        format: Format::DataProc3Src,
        is_64bit: word.sf(),
        rd: word.rd(),
        rn: word.rn(),
        rm: word.rm(),
        ra: word.ra(),
        ..Instruction::default()
    }
}

/// Decodes logical operations with a bitmask immediate.
fn decode_logical_imm(word: u32) -> Instruction {
    let sf = word.sf();
    let n = u32::from(word.bit(22));
    if !sf && n != 0 {
        return Instruction::unknown();
    }
    let Some(mask) = decode_bit_masks(n, word.field(16, 6), word.field(10, 6), sf) else {
        return Instruction::unknown();
    };
    let (opcode, sets_flags) = match word.field(29, 2) {
        0b00 => (Opcode::And, false),
        0b01 => (Opcode::Orr, false),
        0b10 => (Opcode::Eor, false),
        _ => (Opcode::Ands, true),
    };

    Instruction {
        opcode,
        format: Format::LogicalImm,
        is_64bit: sf,
        sets_flags,
        rd: word.rd(),
        rn: word.rn(),
        imm: mask as i64,
        // Rd of the non-flag-setting forms names SP, allowing stack masking.
        rd_is_sp: !sets_flags,
        ..Instruction::default()
    }
}

/// Decodes `EXTR` (and its `ROR #imm` alias).
fn decode_extract(word: u32) -> Instruction {
    let sf = word.sf();
    let n = word.bit(22);
    let imms = word.field(10, 6);
    // N must mirror sf, o0 is fixed zero, and a W-form shift must fit.
    if n != sf || word.bit(21) || (!sf && imms >= 32) {
        return Instruction::unknown();
    }

    Instruction {
        opcode: Opcode::Extr,
        format: Format::Extract,
        is_64bit: sf,
        rd: word.rd(),
        rn: word.rn(),
        rm: word.rm(),
        imm: i64::from(imms),
        ..Instruction::default()
    }
}

/// Decodes the bitfield class: `SBFM`/`BFM`/`UBFM`.
fn decode_bitfield(word: u32) -> Instruction {
    let sf = word.sf();
    let n = word.bit(22);
    if n != sf {
        return Instruction::unknown();
    }
    let opcode = match word.field(29, 2) {
        0b00 => Opcode::Sbfm,
        0b01 => Opcode::Bfm,
        0b10 => Opcode::Ubfm,
        _ => return Instruction::unknown(),
    };
    let immr = word.field(16, 6);
    let imms = word.field(10, 6);
    if !sf && (immr >= 32 || imms >= 32) {
        return Instruction::unknown();
    }

    let mut inst = Instruction {
        opcode,
        format: Format::Bitfield,
        is_64bit: sf,
        rd: word.rd(),
        rn: word.rn(),
        imm: i64::from(immr),
        imm2: imms,
        ..Instruction::default()
    };
    // BFM inserts into the old destination; alias it onto rm so forwarding
    // and hazard checks see the read-modify-write dependency.
    if opcode == Opcode::Bfm {
        inst.rm = inst.rd;
    }
    inst
}

/// Decodes add/subtract with a 12-bit immediate.
fn decode_add_sub_imm(word: u32) -> Instruction {
    let shift = word.field(22, 2);
    if shift > 1 {
        return Instruction::unknown();
    }
    let sets_flags = word.bit(29);
    let opcode = match (word.bit(30), sets_flags) {
        (false, false) => Opcode::Add,
        (false, true) => Opcode::Adds,
        (true, false) => Opcode::Sub,
        (true, true) => Opcode::Subs,
    };
    let imm12 = i64::from(word.field(10, 12));

    Instruction {
        opcode,
        format: Format::AddSubImm,
        is_64bit: word.sf(),
        sets_flags,
        rd: word.rd(),
        rn: word.rn(),
        imm: imm12 << (shift * 12),
        // Index 31 names SP on both sides of immediate add/sub (the MOV
        // to/from SP idiom), except that flag-setting forms write ZR.
        rd_is_sp: !sets_flags,
        rn_is_sp: true,
        ..Instruction::default()
    }
}

/// Decodes add/subtract with a shifted register operand.
fn decode_add_sub_shifted(word: u32) -> Instruction {
    let shift = word.field(22, 2);
    let imm6 = word.field(10, 6);
    // ROR is reserved for add/sub, and W-forms cap the amount at 31.
    if shift == 0b11 || (!word.sf() && imm6 >= 32) {
        return Instruction::unknown();
    }
    let sets_flags = word.bit(29);
    let opcode = match (word.bit(30), sets_flags) {
        (false, false) => Opcode::Add,
        (false, true) => Opcode::Adds,
        (true, false) => Opcode::Sub,
        (true, true) => Opcode::Subs,
    };

    Instruction {
        opcode,
        format: Format::AddSubShifted,
        is_64bit: word.sf(),
        sets_flags,
        rd: word.rd(),
        rn: word.rn(),
        rm: word.rm(),
        shift: ShiftKind::from_bits(shift),
        shift_amount: imm6 as u8,
        ..Instruction::default()
    }
}

/// Decodes add/subtract with an extended register operand.
fn decode_add_sub_extended(word: u32) -> Instruction {
    let imm3 = word.field(10, 3);
    if imm3 > 4 || word.field(22, 2) != 0b00 {
        return Instruction::unknown();
    }
    let sets_flags = word.bit(29);
    let opcode = match (word.bit(30), sets_flags) {
        (false, false) => Opcode::Add,
        (false, true) => Opcode::Adds,
        (true, false) => Opcode::Sub,
        (true, true) => Opcode::Subs,
    };

    Instruction {
        opcode,
        format: Format::AddSubExtended,
        is_64bit: word.sf(),
        sets_flags,
        rd: word.rd(),
        rn: word.rn(),
        rm: word.rm(),
        imm2: word.field(13, 3),
        shift_amount: imm3 as u8,
        rd_is_sp: !sets_flags,
        rn_is_sp: true,
        ..Instruction::default()
    }
}

/// Decodes logical operations with a shifted register operand, including
/// the N-bit complemented variants.
fn decode_logical_shifted(word: u32) -> Instruction {
    let imm6 = word.field(10, 6);
    if !word.sf() && imm6 >= 32 {
        return Instruction::unknown();
    }
    let n = word.bit(21);
    let (opcode, sets_flags) = match (word.field(29, 2), n) {
        (0b00, false) => (Opcode::And, false),
        (0b00, true) => (Opcode::Bic, false),
        (0b01, false) => (Opcode::Orr, false),
        (0b01, true) => (Opcode::Orn, false),
        (0b10, false) => (Opcode::Eor, false),
        (0b10, true) => (Opcode::Eon, false),
        (0b11, false) => (Opcode::Ands, true),
        (0b11, true) => (Opcode::Bics, true),
        _ => return Instruction::unknown(),
    };

    Instruction {
        opcode,
        format: Format::LogicalShifted,
        is_64bit: word.sf(),
        sets_flags,
        rd: word.rd(),
        rn: word.rn(),
        rm: word.rm(),
        shift: ShiftKind::from_bits(word.field(22, 2)),
        shift_amount: imm6 as u8,
        ..Instruction::default()
    }
}

/// Decodes `TBZ`/`TBNZ`.
fn decode_test_branch(word: u32) -> Instruction {
    let bit_number = word.field(19, 5) | (u32::from(word.bit(31)) << 5);
    let offset = sign_extend(u64::from(word.field(5, 14)), 14) * 4;

    Instruction {
        opcode: if word.bit(24) { Opcode::Tbnz } else { Opcode::Tbz },
        format: Format::TestBranch,
        is_64bit: word.bit(31),
        rn: word.rd(),
        imm2: bit_number,
        offset,
        ..Instruction::default()
    }
}

/// Decodes `CBZ`/`CBNZ`.
fn decode_compare_branch(word: u32) -> Instruction {
    let offset = sign_extend(u64::from(word.field(5, 19)), 19) * 4;

    Instruction {
        opcode: if word.bit(24) { Opcode::Cbnz } else { Opcode::Cbz },
        format: Format::CompareBranch,
        is_64bit: word.sf(),
        rn: word.rd(),
        offset,
        ..Instruction::default()
    }
}

/// Decodes `B` and `BL`.
fn decode_branch_imm(word: u32) -> Instruction {
    let offset = sign_extend(u64::from(word.field(0, 26)), 26) * 4;
    let is_link = word.bit(31);

    Instruction {
        opcode: if is_link { Opcode::Bl } else { Opcode::B },
        format: Format::BranchImm,
        is_64bit: true,
        // BL writes the return address to the link register.
        rd: if is_link { 30 } else { 0 },
        offset,
        ..Instruction::default()
    }
}

/// Decodes `B.cond`.
fn decode_branch_cond(word: u32) -> Instruction {
    let offset = sign_extend(u64::from(word.field(5, 19)), 19) * 4;

    Instruction {
        opcode: Opcode::Bcond,
        format: Format::BranchCond,
        is_64bit: true,
        cond: Cond::from_bits(word.field(0, 4)),
        offset,
        ..Instruction::default()
    }
}

/// Decodes `BR`/`BLR`/`RET`.
fn decode_branch_reg(word: u32) -> Instruction {
    let opcode = match word & 0xFFFF_FC1F {
        0xD61F_0000 => Opcode::Br,
        0xD63F_0000 => Opcode::Blr,
        0xD65F_0000 => Opcode::Ret,
        _ => return Instruction::unknown(),
    };

    Instruction {
        opcode,
        format: Format::BranchReg,
        is_64bit: true,
        rd: if opcode == Opcode::Blr { 30 } else { 0 },
        rn: word.rn(),
        ..Instruction::default()
    }
}

/// Decodes the exception-generation class: `SVC` and `BRK`.
fn decode_exception(word: u32) -> Instruction {
    let imm16 = i64::from(word.field(5, 16));
    let opcode = match word & 0xFFE0_001F {
        0xD400_0001 => Opcode::Svc,
        0xD420_0000 => Opcode::Brk,
        _ => return Instruction::unknown(),
    };

    Instruction {
        opcode,
        format: Format::Exception,
        is_64bit: true,
        imm: imm16,
        ..Instruction::default()
    }
}

/// Decodes `MRS`.
fn decode_mrs(word: u32) -> Instruction {
    Instruction {
        opcode: Opcode::Mrs,
        format: Format::System,
        is_64bit: true,
        rd: word.rd(),
        sysreg: word.field(5, 15),
        ..Instruction::default()
    }
}
