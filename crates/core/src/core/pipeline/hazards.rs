//! Data Hazard Detection and Operand Forwarding.
//!
//! This module implements the logic that keeps the wide in-order pipeline
//! consistent in the presence of data dependencies. It provides:
//! 1. **Register Identity:** A uniform naming of GP registers, SP, and
//!    vector registers so hazard checks compare the right architectural state.
//! 2. **Source/Destination Extraction:** Which registers an instruction
//!    actually reads and writes, per opcode.
//! 3. **Operand Forwarding:** Resolution of source values from the youngest
//!    in-flight producer (same-cycle results, then EX/MEM, then MEM/WB, then
//!    the register file), for both registers and NZCV.
//! 4. **Load-Use Detection:** The one-cycle stall when a load's consumer
//!    tries to issue immediately behind it.

use crate::core::Cpu;
use crate::core::pipeline::latches::{ExMemSlot, IfIdSlot, MemWbSlot};
use crate::core::units::exec::Operands;
use crate::isa::instruction::Instruction;
use crate::isa::opcode::{Format, Opcode};

/// Identity of a register for hazard and forwarding comparisons.
///
/// GP registers use their index; index 31 maps to [`RegId::SP`] when the
/// opcode interprets it as the stack pointer and to [`RegId::NONE`] when it
/// is the zero register (the zero register never participates in hazards).
/// Vector registers live in their own namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegId(u8);

impl RegId {
    /// No dependency (the zero register or an unused field).
    pub const NONE: Self = Self(u8::MAX);
    /// The stack pointer.
    pub const SP: Self = Self(32);

    /// Identity of a GP register field under the given SP interpretation.
    pub fn gp(idx: u8, is_sp: bool) -> Self {
        if idx == 31 {
            if is_sp { Self::SP } else { Self::NONE }
        } else {
            Self(idx)
        }
    }

    /// Identity of a vector register.
    pub fn vec(idx: u8) -> Self {
        Self(64 + idx)
    }

    /// True when this identity can participate in a hazard.
    pub fn is_real(self) -> bool {
        self != Self::NONE
    }

    /// True when two identities name the same architectural register.
    pub fn conflicts(self, other: Self) -> bool {
        self.is_real() && self == other
    }
}

/// The registers an instruction reads, as hazard identities.
///
/// Unused fields report [`RegId::NONE`]. The store-data register (`Rt`) and
/// the base of a register-writeback addressing mode count as sources.
pub fn source_ids(inst: &Instruction) -> [RegId; 4] {
    let mut sources = [RegId::NONE; 4];

    let reads_rn = match inst.format {
        Format::PcRel
        | Format::BranchImm
        | Format::BranchCond
        | Format::LoadLiteral
        | Format::Exception
        | Format::Hint
        | Format::System
        | Format::SimdThreeSame
        | Format::Unknown => false,
        // MOVN/MOVZ read nothing; MOVK reads the aliased old destination.
        Format::MoveWide => inst.opcode == Opcode::Movk,
        _ => true,
    };
    if reads_rn {
        sources[0] = RegId::gp(inst.rn, inst.rn_is_sp);
    }

    let reads_rm = matches!(
        inst.format,
        Format::AddSubShifted
            | Format::AddSubExtended
            | Format::LogicalShifted
            | Format::DataProc2Src
            | Format::DataProc3Src
            | Format::CondCompareReg
            | Format::CondSelect
            | Format::Extract
            | Format::LoadStoreRegOffset
    ) || inst.opcode == Opcode::Bfm;
    if reads_rm {
        sources[1] = RegId::gp(inst.rm, false);
    }

    let reads_ra = inst.format == Format::DataProc3Src || inst.opcode == Opcode::Stp;
    if reads_ra {
        sources[2] = RegId::gp(inst.ra, false);
    }

    // Scalar stores read their data register through the rd field; SIMD
    // three-same operations read two vector sources.
    if inst.is_store() && inst.opcode != Opcode::StrQ {
        sources[3] = RegId::gp(inst.rd, false);
    } else if inst.format == Format::SimdThreeSame {
        sources[0] = RegId::vec(inst.rn);
        sources[1] = RegId::vec(inst.rm);
    } else if inst.opcode == Opcode::StrQ {
        sources[3] = RegId::vec(inst.rd);
    } else if inst.opcode == Opcode::Dup {
        sources[0] = RegId::gp(inst.rn, false);
    }

    sources
}

/// The registers an instruction writes, as hazard identities.
pub fn dest_ids(inst: &Instruction) -> [RegId; 3] {
    let mut dests = [RegId::NONE; 3];
    if inst.writes_gpr() {
        dests[0] = RegId::gp(inst.rd, inst.rd_is_sp);
    } else if matches!(
        inst.opcode,
        Opcode::LdrQ
            | Opcode::Dup
            | Opcode::Vadd
            | Opcode::Vsub
            | Opcode::Vmul
            | Opcode::Vfadd
            | Opcode::Vfsub
            | Opcode::Vfmul
    ) {
        dests[0] = RegId::vec(inst.rd);
    }
    if inst.writes_ra() {
        dests[1] = RegId::gp(inst.ra, false);
    }
    if inst.writes_base() {
        dests[2] = RegId::gp(inst.rn, inst.rn_is_sp);
    }
    dests
}

/// True when any source of `consumer` matches any destination of `producer`.
pub fn raw_conflict(producer: &Instruction, consumer: &Instruction) -> bool {
    let dests = dest_ids(producer);
    let sources = source_ids(consumer);
    dests
        .iter()
        .any(|d| sources.iter().any(|s| d.conflicts(*s)))
}

/// True when both instructions write a common destination.
pub fn waw_conflict(a: &Instruction, b: &Instruction) -> bool {
    let da = dest_ids(a);
    let db = dest_ids(b);
    da.iter().any(|x| db.iter().any(|y| x.conflicts(*y)))
}

/// Checks for a load-use hazard between just-executed loads and a candidate.
///
/// A load whose data is produced in the memory stage cannot feed an
/// instruction entering execute in the next cycle; the consumer must wait
/// one extra cycle. `ex_slots` holds the instructions that executed this
/// cycle (they occupy the memory stage next cycle). Vector producers stall
/// their consumers the same way: vector results bypass the forwarding
/// network entirely and are only visible after retirement.
pub fn load_use_hazard(ex_slots: &[ExMemSlot], candidate: &IfIdSlot) -> bool {
    ex_slots.iter().any(|slot| {
        (slot.inst.is_load() || slot.inst.is_simd()) && raw_conflict(&slot.inst, &candidate.inst)
    })
}

/// Value a producer slot in the EX/MEM latch supplies for a destination.
///
/// Loads have no value at this level; callers must not forward them (the
/// load-use stall guarantees no consumer is close enough to ask).
fn ex_level_value(slot: &ExMemSlot, dest: RegId) -> Option<u64> {
    let dests = dest_ids(&slot.inst);
    if dests[0].conflicts(dest) && !slot.inst.is_load() {
        Some(slot.alu_result)
    } else if dests[2].conflicts(dest) {
        Some(slot.base_result)
    } else {
        None
    }
}

/// Value a producer slot in the MEM/WB latch supplies for a destination.
fn wb_level_value(slot: &MemWbSlot, dest: RegId) -> Option<u64> {
    let dests = dest_ids(&slot.inst);
    if dests[0].conflicts(dest) {
        Some(slot.value)
    } else if dests[1].conflicts(dest) {
        Some(slot.value2)
    } else if dests[2].conflicts(dest) {
        Some(slot.base_value)
    } else {
        None
    }
}

/// Resolves an instruction's operand values through the forwarding network.
///
/// Priority, youngest producer wins: results computed earlier in the same
/// execute cycle, then the EX/MEM latch, then the MEM/WB latch, then the
/// architectural register file (writeback has already run this cycle, so
/// the file is current for everything older). NZCV follows the same search.
///
/// # Arguments
///
/// * `cpu` - Architectural state for the register-file fallback.
/// * `inst` - The consuming instruction.
/// * `same_cycle` - Results of earlier slots in the current execute group.
/// * `ex_mem` - The EX/MEM latch.
/// * `mem_wb` - The MEM/WB latch.
pub fn resolve_operands(
    cpu: &Cpu,
    inst: &Instruction,
    same_cycle: &[ExMemSlot],
    ex_mem: &[ExMemSlot],
    mem_wb: &[MemWbSlot],
) -> Operands {
    let mut ops = cpu.operands(inst);

    let mut forward = |dest_of: &mut dyn FnMut(RegId) -> Option<u64>| {
        let rn_id = RegId::gp(inst.rn, inst.rn_is_sp);
        let rm_id = RegId::gp(inst.rm, false);
        let ra_id = RegId::gp(inst.ra, false);
        let rt_id = RegId::gp(inst.rd, false);
        if let Some(v) = dest_of(rn_id) {
            ops.rn = v;
        }
        if let Some(v) = dest_of(rm_id) {
            ops.rm = v;
        }
        if let Some(v) = dest_of(ra_id) {
            ops.ra = v;
        }
        if let Some(v) = dest_of(rt_id) {
            ops.rt = v;
        }
    };

    // Oldest level first so younger producers override older ones.
    forward(&mut |dest| {
        mem_wb
            .iter()
            .rev()
            .find_map(|slot| wb_level_value(slot, dest))
    });
    forward(&mut |dest| {
        ex_mem
            .iter()
            .rev()
            .find_map(|slot| ex_level_value(slot, dest))
    });
    forward(&mut |dest| {
        same_cycle
            .iter()
            .rev()
            .find_map(|slot| ex_level_value(slot, dest))
    });

    // NZCV: youngest in-flight producer, else the committed PSTATE.
    if inst.reads_pstate() {
        let forwarded = same_cycle
            .iter()
            .rev()
            .chain(ex_mem.iter().rev())
            .find(|slot| slot.sets_flags)
            .map(|slot| slot.nzcv)
            .or_else(|| {
                mem_wb
                    .iter()
                    .rev()
                    .find(|slot| slot.sets_flags)
                    .map(|slot| slot.nzcv)
            });
        if let Some(flags) = forwarded {
            ops.pstate = flags;
        }
    }

    ops
}
