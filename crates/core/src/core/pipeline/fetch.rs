//! Instruction Fetch (IF) Stage.
//!
//! Fills the fetch buffer from the current fetch PC, up to `issue_width`
//! words per cycle. The stage pre-decodes every word to steer control flow:
//!
//! - **Branch elimination:** an unconditional `B` is resolved by
//!   substituting the target PC; the branch never enters the pipeline and
//!   consumes no slot.
//! - **Early resolution:** `B` (when elimination is off) and `BL` redirect
//!   fetch from the encoded offset without consulting the predictor.
//! - **Prediction:** conditional branches consult the tournament predictor;
//!   a taken prediction with a known target redirects fetch and ends the
//!   fetch group. A taken prediction without a BTB target does not redirect.
//! - **Indirect branches** take their predicted target from the BTB and
//!   always end the fetch group.
//!
//! The optional instruction cache gates fetch: a miss freezes the front end
//! for the miss latency.

use crate::common::constants::INSTRUCTION_SIZE;
use crate::core::Cpu;
use crate::core::pipeline::Pipeline;
use crate::core::pipeline::latches::IfIdSlot;
use crate::isa;
use crate::isa::opcode::Opcode;

impl Pipeline {
    /// Fetches up to one group of instructions into the fetch buffer.
    pub(super) fn fetch_stage(&mut self, cpu: &mut Cpu) {
        if self.redirect_stall > 0 {
            self.redirect_stall -= 1;
            cpu.stats.stalls_control += 1;
            return;
        }
        if self.fetch_icache_stall > 0 {
            self.fetch_icache_stall -= 1;
            cpu.stats.stalls_mem += 1;
            return;
        }

        let capacity = 2 * self.width;
        let mut fetched = 0;
        let mut current_line = None;

        while fetched < self.width && self.fetch_buffer.len() < capacity {
            let pc = self.fetch_pc;

            if let Some(cache) = &mut self.icache {
                let line = pc / cache.line_bytes() as u64;
                if current_line != Some(line) {
                    current_line = Some(line);
                    let result = cache.access(pc, false);
                    if result.hit {
                        cpu.stats.icache_hits += 1;
                    } else {
                        cpu.stats.icache_misses += 1;
                        self.fetch_icache_stall = result.latency;
                        break;
                    }
                }
            }

            let word = cpu.memory.read_u32(pc);
            let inst = isa::decode(word);
            fetched += 1;
            if cpu.trace {
                eprintln!("IF  pc={:#x} inst={:#010x}", pc, word);
            }

            // Branch elimination: the target PC is substituted and the
            // branch never occupies a slot. Fetch bandwidth still bounds
            // the number of eliminations per cycle, so a branch-to-self
            // cannot wedge the fetch loop.
            if inst.opcode == Opcode::B && self.elimination_enabled {
                self.fetch_pc = pc.wrapping_add(inst.offset as u64);
                cpu.stats.eliminated_branches += 1;
                continue;
            }

            let mut slot = IfIdSlot {
                pc,
                word,
                inst,
                ..IfIdSlot::default()
            };
            let mut redirect = None;
            let mut end_group = false;

            if inst.is_uncond_direct() {
                // Resolved at fetch from the encoded offset; bypasses the
                // predictor entirely.
                let target = pc.wrapping_add(inst.offset as u64);
                slot.early_resolved = true;
                slot.pred_taken = true;
                slot.pred_target = target;
                slot.pred_target_known = true;
                redirect = Some(target);
                end_group = true;
            } else if inst.is_cond_branch() {
                let prediction = self.predictor.predict(pc);
                slot.pred_taken = prediction.taken;
                slot.pred_target = prediction.target;
                slot.pred_target_known = prediction.target_known;
                if prediction.taken && prediction.target_known {
                    redirect = Some(prediction.target);
                    end_group = true;
                }
            } else if inst.is_indirect_branch() {
                if let Some(target) = self.predictor.predict_target(pc) {
                    slot.pred_taken = true;
                    slot.pred_target = target;
                    slot.pred_target_known = true;
                    redirect = Some(target);
                }
                end_group = true;
            }

            self.fetch_buffer.push_back(slot);
            self.fetch_pc = redirect.unwrap_or_else(|| pc.wrapping_add(INSTRUCTION_SIZE));
            if end_group {
                break;
            }
        }
    }
}
