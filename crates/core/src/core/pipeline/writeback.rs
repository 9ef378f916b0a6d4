//! Writeback (WB) Stage.
//!
//! The final stage: commits results to the register files and PSTATE,
//! counts retirement, and enforces the instruction limit. Slots retire in
//! program order (slot 0 first); a fused compare+branch slot retires as two
//! instructions.

use crate::common::error::Fault;
use crate::core::Cpu;
use crate::core::pipeline::Pipeline;
use crate::core::pipeline::latches::MemWbSlot;
use crate::isa::opcode::Opcode;

impl Pipeline {
    /// Retires every slot in the MEM/WB latch.
    pub(super) fn writeback_stage(&mut self, cpu: &mut Cpu) {
        let slots = std::mem::take(&mut self.mem_wb);
        for slot in &slots {
            self.retire_slot(cpu, slot);
            if cpu.halted {
                return;
            }
        }
    }

    /// Commits one slot's results and counts its retirement.
    ///
    /// Also used by the drain path, which retires in-flight work before a
    /// syscall dispatch or a halt.
    pub(super) fn retire_slot(&mut self, cpu: &mut Cpu, slot: &MemWbSlot) {
        let inst = &slot.inst;
        if cpu.trace {
            eprintln!("WB  pc={:#x} {}", slot.pc, inst.opcode.mnemonic());
        }

        if inst.writes_gpr() {
            cpu.write_rd(inst, slot.value);
        }
        if inst.writes_ra() {
            cpu.regs.write(inst.ra, slot.value2);
        }
        if inst.writes_base() {
            cpu.write_base(inst, slot.base_value);
        }
        if matches!(
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
            cpu.vregs.write(inst.rd, slot.vec_value);
        }
        if slot.sets_flags {
            cpu.pstate = slot.nzcv;
        }

        cpu.stats.record_retired(inst);
        if slot.fused {
            // The fused B.cond retires with its compare.
            cpu.stats.instructions_retired += 1;
            cpu.stats.inst_branch += 1;
        }

        if let Some(limit) = self.max_instructions {
            if cpu.stats.instructions_retired >= limit && !cpu.halted {
                cpu.halt(Fault::InstructionLimit(limit));
            }
        }
    }
}
