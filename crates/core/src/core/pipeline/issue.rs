//! Issue (ID) Stage.
//!
//! Forms the next execute group from the fetch buffer. Slots issue
//! prefix-contiguously: the moment a candidate fails a check, the group is
//! closed and the candidate (and everything behind it) waits for the next
//! cycle. The checks, per the in-order design:
//!
//! - **Load-use / vector producers:** a just-executed load (or SIMD
//!   producer) whose destination a candidate reads blocks issue one cycle.
//! - **RAW:** no earlier group slot's destination may be a candidate source
//!   (same-cycle forwarding cannot supply a not-yet-executed producer).
//! - **WAW:** no two group slots write the same destination.
//! - **Memory ports:** at most one memory operation per group at narrow
//!   widths, two at quad/octuple issue, and a load never issues behind a
//!   store in the same group.
//! - **Branches:** one per group, in slot 0 — except a `B.cond` that fuses
//!   with the flag-setting compare directly ahead of it.
//! - **System:** `SVC`/`BRK`/`MRS` and undecodable words issue alone.

use crate::core::Cpu;
use crate::core::pipeline::execute::is_fusible_compare;
use crate::core::pipeline::latches::{FusedBranch, IdExSlot};
use crate::core::pipeline::{Pipeline, hazards};
use crate::isa::opcode::Opcode;

impl Pipeline {
    /// Dispatches from the fetch buffer into the ID/EX latch.
    pub(super) fn issue_stage(&mut self, cpu: &mut Cpu) {
        // The previous group is still executing, or nothing is fetched.
        if !self.id_ex.is_empty() || self.fetch_buffer.is_empty() {
            return;
        }

        let mut group: Vec<IdExSlot> = Vec::with_capacity(self.width);
        let mut has_branch = false;
        let mut mem_ops = 0;
        let mut has_store = false;

        while group.len() < self.width {
            let Some(front) = self.fetch_buffer.front() else {
                break;
            };
            let inst = front.inst;

            // Producers whose results are invisible to the forwarding
            // network next cycle: just-executed loads and SIMD writers.
            if hazards::load_use_hazard(&self.ex_mem, front) {
                if group.is_empty() {
                    cpu.stats.stalls_data += 1;
                }
                break;
            }

            // System instructions and undecodable words issue alone.
            if inst.is_system() || inst.opcode == Opcode::Unknown {
                if group.is_empty() {
                    if let Some(slot) = self.pop_decoded() {
                        group.push(slot);
                    }
                }
                break;
            }

            if inst.is_branch() {
                let fusible = self.fusion_enabled
                    && !has_branch
                    && inst.opcode == Opcode::Bcond
                    && group
                        .last()
                        .is_some_and(|g| g.fused.is_none() && is_fusible_compare(&g.inst));
                if fusible {
                    let fused = FusedBranch {
                        pc: front.pc,
                        cond: inst.cond,
                        offset: inst.offset,
                        pred_taken: front.pred_taken,
                        pred_target: front.pred_target,
                        pred_target_known: front.pred_target_known,
                    };
                    let _ = self.fetch_buffer.pop_front();
                    if let Some(last) = group.last_mut() {
                        last.fused = Some(fused);
                    }
                    cpu.stats.fused_pairs += 1;
                    break;
                }
                if !group.is_empty() || has_branch {
                    break;
                }
            }

            // Intra-group dependences.
            let conflict = group.iter().any(|g| {
                hazards::raw_conflict(&g.inst, &inst) || hazards::waw_conflict(&g.inst, &inst)
            });
            if conflict {
                break;
            }

            // Memory port limits and store-then-load serialization.
            if inst.is_mem() {
                if mem_ops >= self.memory_ports || (has_store && inst.is_load()) {
                    break;
                }
            }

            let Some(slot) = self.pop_decoded() else {
                break;
            };
            has_branch |= inst.is_branch();
            if inst.is_mem() {
                mem_ops += 1;
                has_store |= inst.is_store();
            }
            group.push(slot);
        }

        if cpu.trace {
            for slot in &group {
                eprintln!("ID  pc={:#x} {}", slot.pc, slot.inst.opcode.mnemonic());
            }
        }
        self.id_ex = group;
    }

    /// Pops the head of the fetch buffer as an ID/EX slot with its latency.
    fn pop_decoded(&mut self) -> Option<IdExSlot> {
        let front = self.fetch_buffer.pop_front()?;
        let inst = front.inst;
        Some(IdExSlot {
            pc: front.pc,
            inst,
            pred_taken: front.pred_taken,
            pred_target: front.pred_target,
            pred_target_known: front.pred_target_known,
            early_resolved: front.early_resolved,
            latency_left: self.latency_for(
                inst.opcode,
                inst.is_load(),
                inst.is_store(),
                inst.is_branch(),
            ),
            fused: None,
        })
    }
}
