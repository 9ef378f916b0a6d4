//! Memory Access (MEM) Stage.
//!
//! Performs the data-side memory traffic for loads and stores: the
//! functional access against the sparse memory, and the timing access
//! against the optional D-cache. A cache miss freezes the memory stage (and
//! everything upstream) for the miss latency; stores complete in a single
//! cycle unless `stores_stall_on_miss` makes them synchronous.

use crate::core::Cpu;
use crate::core::pipeline::Pipeline;
use crate::core::pipeline::latches::{ExMemSlot, MemWbSlot};
use crate::core::units::exec;
use crate::isa::opcode::Opcode;

impl Pipeline {
    /// Moves the EX/MEM group through the memory stage.
    ///
    /// While a previous miss is outstanding the stage only burns a stall
    /// cycle; the latch contents are preserved for the next attempt.
    pub(super) fn memory_stage(&mut self, cpu: &mut Cpu) {
        if self.mem_stall > 0 {
            self.mem_stall -= 1;
            cpu.stats.stalls_mem += 1;
            return;
        }

        let mut store_line_this_cycle = None;
        let slots = std::mem::take(&mut self.ex_mem);
        for slot in slots {
            if slot.inst.is_store() {
                if let Some(cache) = &self.dcache {
                    store_line_this_cycle =
                        Some(slot.alu_result / cache.line_bytes() as u64);
                }
            }
            let wb = self.access_memory(cpu, slot);
            self.mem_wb.push(wb);
        }
        self.last_store_line = store_line_this_cycle;
    }

    /// Performs one slot's memory access and produces its MEM/WB record.
    ///
    /// Non-memory slots pass through with their ALU result. Also used by
    /// the drain path, where the timing side effects are harmless.
    pub(super) fn access_memory(&mut self, cpu: &mut Cpu, slot: ExMemSlot) -> MemWbSlot {
        let inst = slot.inst;
        let mut wb = MemWbSlot {
            pc: slot.pc,
            inst,
            value: slot.alu_result,
            value2: 0,
            base_value: slot.base_result,
            vec_value: slot.vec_result,
            sets_flags: slot.sets_flags,
            nzcv: slot.nzcv,
            fused: slot.fused,
        };
        if !inst.is_mem() {
            return wb;
        }

        let addr = slot.alu_result;
        if cpu.trace {
            eprintln!(
                "MEM pc={:#x} {} addr={:#x}",
                slot.pc,
                inst.opcode.mnemonic(),
                addr
            );
        }

        // Timing: consult the D-cache and charge miss stalls.
        if let Some(cache) = &mut self.dcache {
            let line = addr / cache.line_bytes() as u64;
            if inst.is_load() && self.last_store_line == Some(line) {
                // A just-stored line is still completing; the load waits.
                self.mem_stall += 1;
            }
            let result = cache.access(addr, inst.is_store());
            if result.hit {
                cpu.stats.dcache_hits += 1;
            } else {
                cpu.stats.dcache_misses += 1;
                if inst.is_load() || self.stores_stall_on_miss {
                    self.mem_stall += result.latency;
                }
            }
        }

        // Function: the access itself.
        let bytes = inst.mem_bytes();
        match inst.opcode {
            Opcode::LdrQ => {
                let value = cpu.memory.read_u128(addr);
                wb.vec_value = value;
            }
            Opcode::StrQ => {
                cpu.memory.write_u64(addr, slot.store_value);
                cpu.memory.write_u64(addr.wrapping_add(8), slot.store_value2);
            }
            Opcode::Ldp => {
                wb.value = cpu.memory.read_sized(addr, bytes);
                wb.value2 = cpu.memory.read_sized(addr.wrapping_add(bytes), bytes);
            }
            Opcode::Stp => {
                cpu.memory.write_sized(addr, slot.store_value, bytes);
                cpu.memory
                    .write_sized(addr.wrapping_add(bytes), slot.store_value2, bytes);
            }
            _ if inst.is_load() => {
                let raw = cpu.memory.read_sized(addr, bytes);
                wb.value = exec::extend_load_value(&inst, raw);
            }
            _ => {
                cpu.memory.write_sized(addr, slot.store_value, bytes);
            }
        }

        wb
    }
}
