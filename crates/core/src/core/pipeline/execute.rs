//! Execute (EX) Stage.
//!
//! Drains the ID/EX group through the execute unit once every slot's
//! latency counter reaches zero. This stage:
//! 1. **Resolves operands** through the forwarding network (same-cycle
//!    earlier slots, EX/MEM, MEM/WB, register file), for registers and NZCV.
//! 2. **Verifies branches** in every valid slot that holds one (including
//!    fused pairs), training the predictor and flushing on a wrong path.
//! 3. **Dispatches system instructions**: `SVC` drains older work and calls
//!    the syscall handler; `BRK` and undecodable words halt the run.

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::Fault;
use crate::core::Cpu;
use crate::core::pipeline::latches::ExMemSlot;
use crate::core::pipeline::{Pipeline, hazards};
use crate::core::units::bru::BranchKind;
use crate::core::units::exec;
use crate::isa::instruction::Instruction;
use crate::isa::opcode::{Format, Opcode};
use crate::sim::syscall::SyscallHandler;

/// One branch's resolution, shared by plain and fused verification.
struct BranchOutcome {
    pc: u64,
    taken: bool,
    target: u64,
    pred_taken: bool,
    pred_target: u64,
    pred_target_known: bool,
    kind: BranchKind,
}

impl Pipeline {
    /// Executes the current ID/EX group.
    pub(super) fn execute_stage(&mut self, cpu: &mut Cpu, syscalls: &mut dyn SyscallHandler) {
        // Hold while the memory stage still owns the EX/MEM latch.
        if !self.ex_mem.is_empty() || self.id_ex.is_empty() {
            return;
        }

        // Multi-cycle operations: the group advances when every slot's
        // counter reaches zero.
        for slot in &mut self.id_ex {
            if slot.latency_left > 0 {
                slot.latency_left -= 1;
            }
        }
        if self.id_ex.iter().any(|slot| slot.latency_left > 0) {
            return;
        }

        let slots = std::mem::take(&mut self.id_ex);
        let mut results: Vec<ExMemSlot> = Vec::with_capacity(slots.len());

        for slot in slots {
            let inst = slot.inst;
            if cpu.trace {
                eprintln!("EX  pc={:#x} {}", slot.pc, inst.opcode.mnemonic());
            }

            match inst.opcode {
                Opcode::Unknown => {
                    self.drain_inflight(cpu, &mut results);
                    let word = cpu.memory.read_u32(slot.pc);
                    cpu.halt(Fault::UnknownInstruction { pc: slot.pc, word });
                    return;
                }
                Opcode::Svc => {
                    // Issue rules put system instructions alone in slot 0;
                    // the handler must observe fully committed state.
                    self.drain_inflight(cpu, &mut results);
                    let outcome = syscalls.handle(cpu);
                    cpu.stats.record_retired(&inst);
                    if outcome.exited {
                        cpu.halt(Fault::GuestExit(outcome.exit_code));
                        return;
                    }
                    // The handler may have written registers or memory the
                    // fetched-ahead path depends on; refetch past the SVC.
                    self.flush_frontend(cpu, slot.pc.wrapping_add(INSTRUCTION_SIZE));
                    return;
                }
                Opcode::Brk => {
                    self.drain_inflight(cpu, &mut results);
                    cpu.stats.record_retired(&inst);
                    cpu.halt(Fault::Breakpoint(inst.imm as u16));
                    return;
                }
                _ => {}
            }

            let ops = hazards::resolve_operands(cpu, &inst, &results, &self.ex_mem, &self.mem_wb);
            let out = exec::execute(&inst, slot.pc, &ops);

            let mut ex = ExMemSlot {
                pc: slot.pc,
                inst,
                alu_result: out.alu_result,
                base_result: out.base_result,
                store_value: out.store_value,
                store_value2: out.store_value2,
                vec_result: 0,
                sets_flags: out.sets_flags,
                nzcv: out.nzcv,
                fused: false,
            };

            // SIMD operands bypass the forwarding network: vector results
            // are only visible after retirement, which the issue rules
            // guarantee has happened (vector producers stall consumers).
            match inst.format {
                Format::SimdThreeSame => {
                    let vn = cpu.vregs.read(inst.rn);
                    let vm = cpu.vregs.read(inst.rm);
                    ex.vec_result = exec::execute_vector(&inst, vn, vm, 0);
                }
                Format::SimdCopy => {
                    ex.vec_result = exec::execute_vector(&inst, 0, 0, ops.rn);
                }
                Format::SimdLoadStore if inst.opcode == Opcode::StrQ => {
                    let value = cpu.vregs.read(inst.rd);
                    ex.store_value = value as u64;
                    ex.store_value2 = (value >> 64) as u64;
                }
                _ => {}
            }

            let mut flushed = false;
            if inst.is_branch() && !slot.early_resolved {
                let outcome = BranchOutcome {
                    pc: slot.pc,
                    taken: out.branch_taken,
                    target: out.branch_target,
                    pred_taken: slot.pred_taken,
                    pred_target: slot.pred_target,
                    pred_target_known: slot.pred_target_known,
                    kind: if inst.is_indirect_branch() {
                        BranchKind::Indirect
                    } else {
                        BranchKind::Conditional
                    },
                };
                flushed = self.verify_branch(cpu, &outcome);
            }

            if let Some(fused) = slot.fused {
                ex.fused = true;
                let taken = out.nzcv.condition_holds(fused.cond);
                let outcome = BranchOutcome {
                    pc: fused.pc,
                    taken,
                    target: fused.pc.wrapping_add(fused.offset as u64),
                    pred_taken: fused.pred_taken,
                    pred_target: fused.pred_target,
                    pred_target_known: fused.pred_target_known,
                    kind: BranchKind::Conditional,
                };
                flushed = self.verify_branch(cpu, &outcome) || flushed;
            }

            results.push(ex);

            if flushed {
                // Everything younger in this group was wrong-path.
                break;
            }
        }

        self.ex_mem = results;
    }

    /// Verifies one resolved branch against its prediction.
    ///
    /// Counts the prediction, trains the predictor and BTB, and flushes the
    /// front end when the fetched path disagrees with the actual one.
    ///
    /// # Returns
    ///
    /// `true` when the pipeline flushed (younger work must be squashed).
    fn verify_branch(&mut self, cpu: &mut Cpu, outcome: &BranchOutcome) -> bool {
        let fall_through = outcome.pc.wrapping_add(INSTRUCTION_SIZE);
        let fetched_next = if outcome.pred_taken && outcome.pred_target_known {
            outcome.pred_target
        } else {
            fall_through
        };
        let actual_next = if outcome.taken {
            outcome.target
        } else {
            fall_through
        };

        // A redirected prediction is judged on direction and target; a
        // taken prediction the BTB could not serve is judged on direction
        // alone (the flush it causes is control cost, not predictor error).
        let redirected_wrong = outcome.taken
            && outcome.pred_taken
            && outcome.pred_target_known
            && outcome.pred_target != outcome.target;
        let mispredicted = outcome.pred_taken != outcome.taken || redirected_wrong;

        cpu.stats.branch_predictions += 1;
        if mispredicted {
            cpu.stats.branch_mispredictions += 1;
        } else {
            cpu.stats.branch_correct += 1;
        }

        self.predictor
            .update(outcome.pc, outcome.taken, outcome.target, outcome.kind);

        if actual_next == fetched_next {
            return false;
        }
        if cpu.trace {
            eprintln!(
                "EX  pc={:#x} redirect -> {:#x} (mispredicted: {})",
                outcome.pc, actual_next, mispredicted
            );
        }
        self.flush_frontend(cpu, actual_next);
        true
    }
}

/// True when an instruction may serve as the flag-setting half of a fused
/// compare+branch pair: `ADDS`/`SUBS` (the `CMN`/`CMP` aliases) discarding
/// their result into the zero register.
pub(super) fn is_fusible_compare(inst: &Instruction) -> bool {
    matches!(inst.opcode, Opcode::Adds | Opcode::Subs) && inst.rd == 31 && !inst.rd_is_sp
}
