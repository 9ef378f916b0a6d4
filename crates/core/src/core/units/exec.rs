//! The per-instruction execute unit.
//!
//! A pure function over a decoded instruction and already-forwarded operand
//! values. The execute unit never reads the register file and never touches
//! memory: loads and stores only compute their effective address here, and
//! the memory stage (or the emulator loop) performs the access. This strict
//! separation is what makes the pipeline's forwarding network correct.

use crate::common::constants::{DCZID_EL0_VALUE, INSTRUCTION_SIZE, SYSREG_DCZID_EL0};
use crate::core::arch::Pstate;
use crate::core::units::alu::{add_with_carry, extend_reg, logical_flags, shift_reg};
use crate::isa::instruction::Instruction;
use crate::isa::opcode::{Format, IndexMode, Opcode, ShiftKind};

/// Forwarded operand values feeding one instruction's execution.
///
/// The pipeline's forwarding network (or the emulator's register read)
/// resolves these before calling [`execute`]; `rt` is the store-data
/// register (`Rt`), which stores read in addition to their address operands.
#[derive(Debug, Clone, Copy, Default)]
pub struct Operands {
    /// Value of `Rn` (old `Rd` for `MOVK`, tested register for CBZ/TBZ).
    pub rn: u64,
    /// Value of `Rm` (old `Rd` for `BFM`).
    pub rm: u64,
    /// Value of `Ra` (`Rt2` for store pairs, addend for multiply-add).
    pub ra: u64,
    /// Value of `Rt` for stores (the data register).
    pub rt: u64,
    /// Current or forwarded NZCV flags.
    pub pstate: Pstate,
}

/// Everything one instruction's execution produces.
///
/// `alu_result` doubles as the effective address for memory operations;
/// `base_result` is the updated base register for pre/post-indexed forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOutput {
    /// Primary result, or the effective address for loads/stores.
    pub alu_result: u64,
    /// Updated base register value for indexed addressing.
    pub base_result: u64,
    /// Data to store (first register of a pair).
    pub store_value: u64,
    /// Second data register of a store pair.
    pub store_value2: u64,
    /// Branch direction; false for non-branches.
    pub branch_taken: bool,
    /// Branch target when taken.
    pub branch_target: u64,
    /// True when `nzcv` must be committed to PSTATE.
    pub sets_flags: bool,
    /// Newly computed flags (valid when `sets_flags`).
    pub nzcv: Pstate,
}

/// Zero-extends a W-form result into the full register.
#[inline]
fn narrow(value: u64, is_64bit: bool) -> u64 {
    if is_64bit { value } else { u64::from(value as u32) }
}

/// A run of `width` ones in the low bits (width 1-64).
#[inline]
fn ones(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1 << width) - 1 }
}

/// Resolves the second operand of an add/subtract or logical operation.
fn operand2(inst: &Instruction, ops: &Operands) -> u64 {
    match inst.format {
        Format::AddSubImm | Format::LogicalImm | Format::CondCompareImm => inst.imm as u64,
        Format::AddSubShifted | Format::LogicalShifted => shift_reg(
            ops.rm,
            inst.shift,
            u32::from(inst.shift_amount),
            inst.is_64bit,
        ),
        Format::AddSubExtended => {
            extend_reg(ops.rm, inst.imm2, u32::from(inst.shift_amount))
        }
        _ => ops.rm,
    }
}

/// Computes the effective address (and any base writeback) of a memory form.
fn effective_address(inst: &Instruction, pc: u64, ops: &Operands) -> (u64, u64) {
    match inst.format {
        Format::LoadLiteral => (pc.wrapping_add(inst.offset as u64), 0),
        Format::LoadStoreRegOffset => {
            let offset = extend_reg(ops.rm, inst.imm2, u32::from(inst.shift_amount));
            (ops.rn.wrapping_add(offset), 0)
        }
        Format::LoadStoreIndexed | Format::LoadStorePair => {
            let updated = ops.rn.wrapping_add(inst.imm as u64);
            match inst.index_mode {
                IndexMode::Pre => (updated, updated),
                IndexMode::Post => (ops.rn, updated),
                IndexMode::None => (updated, 0),
            }
        }
        // Unsigned-immediate and SIMD forms: plain base + scaled offset.
        _ => (ops.rn.wrapping_add(inst.imm as u64), 0),
    }
}

/// Executes one decoded instruction over forwarded operands.
///
/// Pure: equal inputs produce equal outputs, and nothing outside the returned
/// [`ExecOutput`] is touched. Vector arithmetic is the one exception to the
/// single-entry-point rule and lives in [`execute_vector`].
///
/// # Arguments
///
/// * `inst` - The decoded instruction.
/// * `pc` - The instruction's own PC (for PC-relative forms and link writes).
/// * `ops` - Forwarded operand values.
pub fn execute(inst: &Instruction, pc: u64, ops: &Operands) -> ExecOutput {
    let mut out = ExecOutput::default();
    let is64 = inst.is_64bit;

    match inst.opcode {
        Opcode::Unknown | Opcode::Nop | Opcode::Svc | Opcode::Brk => {}

        Opcode::Add | Opcode::Adds => {
            let op2 = operand2(inst, ops);
            let (result, flags) = add_with_carry(ops.rn, op2, false, is64);
            out.alu_result = result;
            out.sets_flags = inst.sets_flags;
            out.nzcv = flags;
        }
        Opcode::Sub | Opcode::Subs => {
            let op2 = operand2(inst, ops);
            let (result, flags) = add_with_carry(ops.rn, !op2, true, is64);
            out.alu_result = result;
            out.sets_flags = inst.sets_flags;
            out.nzcv = flags;
        }

        Opcode::And | Opcode::Ands | Opcode::Bic | Opcode::Bics => {
            let mut op2 = operand2(inst, ops);
            if matches!(inst.opcode, Opcode::Bic | Opcode::Bics) {
                op2 = !op2;
            }
            let result = narrow(ops.rn & op2, is64);
            out.alu_result = result;
            out.sets_flags = inst.sets_flags;
            out.nzcv = logical_flags(result, is64);
        }
        Opcode::Orr | Opcode::Orn => {
            let mut op2 = operand2(inst, ops);
            if inst.opcode == Opcode::Orn {
                op2 = !op2;
            }
            out.alu_result = narrow(ops.rn | op2, is64);
        }
        Opcode::Eor | Opcode::Eon => {
            let mut op2 = operand2(inst, ops);
            if inst.opcode == Opcode::Eon {
                op2 = !op2;
            }
            out.alu_result = narrow(ops.rn ^ op2, is64);
        }

        Opcode::Movz => {
            out.alu_result = narrow((inst.imm as u64) << inst.shift_amount, is64);
        }
        Opcode::Movn => {
            out.alu_result = narrow(!((inst.imm as u64) << inst.shift_amount), is64);
        }
        Opcode::Movk => {
            // ops.rn carries the old destination (aliased at decode).
            let shift = u32::from(inst.shift_amount);
            let cleared = ops.rn & !(0xFFFF_u64 << shift);
            out.alu_result = narrow(cleared | ((inst.imm as u64) << shift), is64);
        }

        Opcode::Adr => {
            out.alu_result = pc.wrapping_add(inst.imm as u64);
        }
        Opcode::Adrp => {
            out.alu_result = (pc & !0xFFF).wrapping_add(inst.imm as u64);
        }

        Opcode::Sbfm | Opcode::Ubfm | Opcode::Bfm => {
            out.alu_result = execute_bitfield(inst, ops);
        }
        Opcode::Extr => {
            let lsb = inst.imm as u32;
            let result = if is64 {
                if lsb == 0 {
                    ops.rm
                } else {
                    (ops.rm >> lsb) | (ops.rn << (64 - lsb))
                }
            } else {
                let lo = ops.rm as u32;
                let hi = ops.rn as u32;
                u64::from(if lsb == 0 {
                    lo
                } else {
                    (lo >> lsb) | (hi << (32 - lsb))
                })
            };
            out.alu_result = result;
        }

        Opcode::Lslv => {
            out.alu_result = shift_reg(ops.rn, ShiftKind::Lsl, ops.rm as u32, is64);
        }
        Opcode::Lsrv => {
            out.alu_result = shift_reg(ops.rn, ShiftKind::Lsr, ops.rm as u32, is64);
        }
        Opcode::Asrv => {
            out.alu_result = shift_reg(ops.rn, ShiftKind::Asr, ops.rm as u32, is64);
        }
        Opcode::Rorv => {
            out.alu_result = shift_reg(ops.rn, ShiftKind::Ror, ops.rm as u32, is64);
        }

        Opcode::Madd => {
            let product = if is64 {
                ops.rn.wrapping_mul(ops.rm)
            } else {
                u64::from((ops.rn as u32).wrapping_mul(ops.rm as u32))
            };
            out.alu_result = narrow(ops.ra.wrapping_add(product), is64);
        }
        Opcode::Msub => {
            let product = if is64 {
                ops.rn.wrapping_mul(ops.rm)
            } else {
                u64::from((ops.rn as u32).wrapping_mul(ops.rm as u32))
            };
            out.alu_result = narrow(ops.ra.wrapping_sub(product), is64);
        }
        Opcode::Udiv => {
            out.alu_result = if is64 {
                if ops.rm == 0 { 0 } else { ops.rn / ops.rm }
            } else {
                let d = ops.rm as u32;
                u64::from(if d == 0 { 0 } else { (ops.rn as u32) / d })
            };
        }
        Opcode::Sdiv => {
            out.alu_result = if is64 {
                let n = ops.rn as i64;
                let d = ops.rm as i64;
                // Division by zero yields zero; i64::MIN / -1 wraps.
                if d == 0 {
                    0
                } else {
                    n.wrapping_div(d) as u64
                }
            } else {
                let n = ops.rn as i32;
                let d = ops.rm as i32;
                u64::from(if d == 0 { 0 } else { n.wrapping_div(d) as u32 })
            };
        }

        Opcode::Ccmp | Opcode::Ccmn => {
            let flags = if ops.pstate.condition_holds(inst.cond) {
                let op2 = operand2(inst, ops);
                let (_, flags) = if inst.opcode == Opcode::Ccmp {
                    add_with_carry(ops.rn, !op2, true, is64)
                } else {
                    add_with_carry(ops.rn, op2, false, is64)
                };
                flags
            } else {
                Pstate::from_nzcv(inst.imm2)
            };
            out.sets_flags = true;
            out.nzcv = flags;
        }

        Opcode::Csel | Opcode::Csinc | Opcode::Csinv | Opcode::Csneg => {
            let result = if ops.pstate.condition_holds(inst.cond) {
                ops.rn
            } else {
                match inst.opcode {
                    Opcode::Csinc => ops.rm.wrapping_add(1),
                    Opcode::Csinv => !ops.rm,
                    Opcode::Csneg => ops.rm.wrapping_neg(),
                    _ => ops.rm,
                }
            };
            out.alu_result = narrow(result, is64);
        }

        Opcode::B => {
            out.branch_taken = true;
            out.branch_target = pc.wrapping_add(inst.offset as u64);
        }
        Opcode::Bl => {
            out.branch_taken = true;
            out.branch_target = pc.wrapping_add(inst.offset as u64);
            out.alu_result = pc.wrapping_add(INSTRUCTION_SIZE);
        }
        Opcode::Bcond => {
            out.branch_taken = ops.pstate.condition_holds(inst.cond);
            out.branch_target = pc.wrapping_add(inst.offset as u64);
        }
        Opcode::Br | Opcode::Ret => {
            out.branch_taken = true;
            out.branch_target = ops.rn;
        }
        Opcode::Blr => {
            out.branch_taken = true;
            out.branch_target = ops.rn;
            out.alu_result = pc.wrapping_add(INSTRUCTION_SIZE);
        }
        Opcode::Cbz | Opcode::Cbnz => {
            let value = narrow(ops.rn, is64);
            out.branch_taken = (value == 0) == (inst.opcode == Opcode::Cbz);
            out.branch_target = pc.wrapping_add(inst.offset as u64);
        }
        Opcode::Tbz | Opcode::Tbnz => {
            let bit = (ops.rn >> inst.imm2) & 1;
            out.branch_taken = (bit == 0) == (inst.opcode == Opcode::Tbz);
            out.branch_target = pc.wrapping_add(inst.offset as u64);
        }

        // Memory forms: compute the effective address (and base writeback);
        // the memory stage performs the access.
        Opcode::Ldr
        | Opcode::Ldrb
        | Opcode::Ldrsb
        | Opcode::Ldrh
        | Opcode::Ldrsh
        | Opcode::Ldrsw
        | Opcode::LdrLiteral
        | Opcode::Str
        | Opcode::Strb
        | Opcode::Strh
        | Opcode::Ldp
        | Opcode::Stp
        | Opcode::LdrQ
        | Opcode::StrQ => {
            let (addr, base) = effective_address(inst, pc, ops);
            out.alu_result = addr;
            out.base_result = base;
            if inst.is_store() {
                out.store_value = ops.rt;
                out.store_value2 = ops.ra;
            }
        }

        // Vector arithmetic produces its result via `execute_vector`.
        Opcode::Vadd
        | Opcode::Vsub
        | Opcode::Vmul
        | Opcode::Vfadd
        | Opcode::Vfsub
        | Opcode::Vfmul
        | Opcode::Dup => {}

        Opcode::Mrs => {
            out.alu_result = if inst.sysreg == SYSREG_DCZID_EL0 {
                DCZID_EL0_VALUE
            } else {
                0
            };
        }
    }

    out
}

/// Executes the bitfield class (`SBFM`/`UBFM`/`BFM`).
///
/// `inst.imm` carries `immr`, `inst.imm2` carries `imms`. For `BFM`, the old
/// destination arrives in `ops.rm` (aliased at decode).
fn execute_bitfield(inst: &Instruction, ops: &Operands) -> u64 {
    let regsize: u32 = if inst.is_64bit { 64 } else { 32 };
    let r = inst.imm as u32;
    let s = inst.imm2;
    let src = narrow(ops.rn, inst.is_64bit);

    let result = if s >= r {
        // Extract src[s:r] into the low bits.
        let width = s - r + 1;
        let field = (src >> r) & ones(width);
        match inst.opcode {
            Opcode::Ubfm => field,
            Opcode::Sbfm => {
                let sign = (field >> (width - 1)) & 1;
                if sign != 0 { field | !ones(width) } else { field }
            }
            _ => (ops.rm & !ones(width)) | field,
        }
    } else {
        // Place src[s:0] at bit position regsize - r.
        let width = s + 1;
        let shift = regsize - r;
        let field = src & ones(width);
        match inst.opcode {
            Opcode::Ubfm => field << shift,
            Opcode::Sbfm => {
                let sign = (field >> (width - 1)) & 1;
                let extended = if sign != 0 { field | !ones(width) } else { field };
                extended << shift
            }
            _ => (ops.rm & !(ones(width) << shift)) | (field << shift),
        }
    };

    narrow(result, inst.is_64bit)
}

/// Executes a SIMD three-same or `DUP` instruction over 128-bit values.
///
/// Pure, like [`execute`]. The caller resolves the vector operands (and for
/// `DUP` the general-register source) and writes the result back to the
/// vector register file.
///
/// # Arguments
///
/// * `inst` - The decoded SIMD instruction.
/// * `vn` - Value of `Vn`.
/// * `vm` - Value of `Vm`.
/// * `rn_gp` - General-register source for `DUP`.
pub fn execute_vector(inst: &Instruction, vn: u128, vm: u128, rn_gp: u64) -> u128 {
    let arr = inst.arrangement;
    let lane_bytes = arr.lane_bytes();
    if lane_bytes == 0 {
        return 0;
    }

    let na = vn.to_le_bytes();
    let ma = vm.to_le_bytes();
    let mut out = [0u8; 16];

    for lane in 0..arr.lanes() {
        let lo = lane * lane_bytes;
        let hi = lo + lane_bytes;
        let a = lane_value(&na[lo..hi]);
        let b = lane_value(&ma[lo..hi]);

        let result: u64 = match inst.opcode {
            Opcode::Dup => rn_gp,
            Opcode::Vadd => a.wrapping_add(b),
            Opcode::Vsub => a.wrapping_sub(b),
            Opcode::Vmul => a.wrapping_mul(b),
            Opcode::Vfadd | Opcode::Vfsub | Opcode::Vfmul => fp_lane(inst.opcode, a, b, lane_bytes),
            _ => 0,
        };

        let bytes = result.to_le_bytes();
        out[lo..hi].copy_from_slice(&bytes[..lane_bytes]);
    }

    // The 64-bit arrangements leave the upper half zero.
    u128::from_le_bytes(out)
}

/// Applies a load's extension semantics to the raw bytes read from memory.
///
/// Zero-extending loads return the raw value unchanged (memory reads arrive
/// zero-extended); sign-extending loads (`LDRSB`/`LDRSH`/`LDRSW`) extend to
/// the destination width, with W-form destinations zero-extended into the
/// full register afterwards.
///
/// # Arguments
///
/// * `inst` - The load instruction.
/// * `raw` - The zero-extended value read from memory.
pub fn extend_load_value(inst: &Instruction, raw: u64) -> u64 {
    if !inst.is_signed_load() {
        return raw;
    }
    let extended = match inst.mem_bytes() {
        1 => i64::from(raw as u8 as i8),
        2 => i64::from(raw as u16 as i16),
        4 => i64::from(raw as u32 as i32),
        _ => raw as i64,
    };
    narrow(extended as u64, inst.is_64bit)
}

/// Reads one little-endian lane as a zero-extended 64-bit value.
fn lane_value(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// One floating-point lane operation at 32- or 64-bit lane width.
fn fp_lane(opcode: Opcode, a: u64, b: u64, lane_bytes: usize) -> u64 {
    if lane_bytes == 8 {
        let x = f64::from_bits(a);
        let y = f64::from_bits(b);
        let r = match opcode {
            Opcode::Vfadd => x + y,
            Opcode::Vfsub => x - y,
            _ => x * y,
        };
        r.to_bits()
    } else {
        let x = f32::from_bits(a as u32);
        let y = f32::from_bits(b as u32);
        let r = match opcode {
            Opcode::Vfadd => x + y,
            Opcode::Vfsub => x - y,
            _ => x * y,
        };
        u64::from(r.to_bits())
    }
}
