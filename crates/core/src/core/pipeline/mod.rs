//! The superscalar in-order timing pipeline.
//!
//! This module implements the cycle-level execution engine: an 8-wide
//! (configurable) in-order pipeline with the classic five stages. It
//! contains:
//! 1. **Latches:** Per-slot records between stages (IF/ID, ID/EX, EX/MEM, MEM/WB).
//! 2. **Hazards:** Operand forwarding and load-use/RAW/WAW detection.
//! 3. **Stages:** Fetch (with branch prediction and elimination), issue,
//!    execute (with latency counters and branch verification), memory (with
//!    the optional data cache), and writeback (in-order retirement).
//!
//! Stages are evaluated in reverse order (WB, MEM, EX, ID, IF) within a
//! cycle so every stage observes the previous cycle's latch contents before
//! they are overwritten — the two-generation latching the design requires.

/// Data hazard detection and operand forwarding.
pub mod hazards;

/// Inter-stage latch records.
pub mod latches;

mod execute;
mod fetch;
mod issue;
mod memory;
mod writeback;

use std::collections::VecDeque;

use crate::common::error::Fault;
use crate::config::{Config, LatencyTable};
use crate::core::Cpu;
use crate::core::pipeline::latches::{ExMemSlot, IdExSlot, IfIdSlot, MemWbSlot};
use crate::core::units::bru::TournamentPredictor;
use crate::core::units::cache::Cache;
use crate::isa::opcode::Opcode;
use crate::sim::syscall::SyscallHandler;

/// The timing pipeline.
///
/// Owns all micro-architectural state: the fetch buffer, the three
/// downstream latches, the branch predictor, and the optional L1 caches.
/// Architectural state stays in [`Cpu`]; with caches disabled, a program run
/// through the pipeline leaves the same architectural state behind as the
/// functional emulator.
#[derive(Debug)]
pub struct Pipeline {
    width: usize,
    memory_ports: usize,
    latency: LatencyTable,
    mispredict_penalty: u64,
    fusion_enabled: bool,
    elimination_enabled: bool,
    stores_stall_on_miss: bool,
    max_cycles: Option<u64>,
    max_instructions: Option<u64>,

    /// IF/ID: fetched but not yet issued instructions, oldest first.
    fetch_buffer: VecDeque<IfIdSlot>,
    /// ID/EX: the group currently executing.
    id_ex: Vec<IdExSlot>,
    /// EX/MEM: the group in the memory stage.
    ex_mem: Vec<ExMemSlot>,
    /// MEM/WB: the group awaiting retirement.
    mem_wb: Vec<MemWbSlot>,

    predictor: TournamentPredictor,
    icache: Option<Cache>,
    dcache: Option<Cache>,

    /// Next fetch address.
    fetch_pc: u64,
    /// Remaining front-end idle cycles after a redirect.
    redirect_stall: u64,
    /// Remaining fetch stall cycles from an instruction-cache miss.
    fetch_icache_stall: u64,
    /// Remaining whole-pipeline stall cycles from the memory stage.
    mem_stall: u64,
    /// Cache line written by a store in the previous memory cycle, for the
    /// store-to-load ordering check (active only with the D-cache enabled).
    last_store_line: Option<u64>,
}

impl Pipeline {
    /// Creates a pipeline from the configuration.
    pub fn new(config: &Config) -> Self {
        let width = match config.pipeline.issue_width {
            w @ (1 | 2 | 4 | 8) => w,
            // Out-of-range widths snap to the nearest supported shape.
            0 => 1,
            w if w < 4 => 2,
            w if w < 8 => 4,
            _ => 8,
        };

        Self {
            width,
            memory_ports: config.pipeline.memory_ports(),
            latency: config.pipeline.latency.clone(),
            mispredict_penalty: config.pipeline.mispredict_penalty_cycles,
            fusion_enabled: config.pipeline.enable_cmp_bcond_fusion,
            elimination_enabled: config.pipeline.enable_branch_elimination,
            stores_stall_on_miss: config.pipeline.stores_stall_on_miss,
            max_cycles: config.general.max_cycles,
            max_instructions: config.general.max_instructions,
            fetch_buffer: VecDeque::with_capacity(2 * width),
            id_ex: Vec::with_capacity(width),
            ex_mem: Vec::with_capacity(width),
            mem_wb: Vec::with_capacity(width),
            predictor: TournamentPredictor::new(&config.branch_predictor),
            icache: config
                .cache
                .l1_i
                .enabled
                .then(|| Cache::new(&config.cache.l1_i)),
            dcache: config
                .cache
                .l1_d
                .enabled
                .then(|| Cache::new(&config.cache.l1_d)),
            fetch_pc: 0,
            redirect_stall: 0,
            fetch_icache_stall: 0,
            mem_stall: 0,
            last_store_line: None,
        }
    }

    /// Points the front end at the program entry.
    ///
    /// Called once after loading, before the first tick.
    pub fn set_entry(&mut self, pc: u64) {
        self.fetch_pc = pc;
    }

    /// Configured issue width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Advances the pipeline by one cycle.
    ///
    /// Stages run in reverse order so each consumes the previous cycle's
    /// latches. A halted CPU makes this a no-op.
    ///
    /// # Arguments
    ///
    /// * `cpu` - Architectural state.
    /// * `syscalls` - Handler dispatched when an `SVC` reaches execute.
    pub fn tick(&mut self, cpu: &mut Cpu, syscalls: &mut dyn SyscallHandler) {
        if cpu.halted {
            return;
        }
        if let Some(max) = self.max_cycles {
            if cpu.stats.cycles >= max {
                cpu.halt(Fault::CycleLimit(max));
                return;
            }
        }
        cpu.stats.cycles += 1;

        self.writeback_stage(cpu);
        if cpu.halted {
            return;
        }
        self.memory_stage(cpu);
        self.execute_stage(cpu, syscalls);
        if cpu.halted {
            return;
        }
        self.issue_stage(cpu);
        self.fetch_stage(cpu);
    }

    /// Drains every in-flight older instruction to architectural state.
    ///
    /// Used before dispatching a supervisor call (the handler must observe
    /// committed state) and before halting on a fault, so the pipeline never
    /// leaves completed work unretired. `same_cycle` holds the already
    /// executed earlier slots of the current execute group.
    fn drain_inflight(&mut self, cpu: &mut Cpu, same_cycle: &mut Vec<ExMemSlot>) {
        let retiring = std::mem::take(&mut self.mem_wb);
        for slot in &retiring {
            self.retire_slot(cpu, slot);
        }
        let in_mem = std::mem::take(&mut self.ex_mem);
        for slot in in_mem {
            let wb = self.access_memory(cpu, slot);
            self.retire_slot(cpu, &wb);
        }
        for slot in std::mem::take(same_cycle) {
            let wb = self.access_memory(cpu, slot);
            self.retire_slot(cpu, &wb);
        }
    }

    /// Squashes the front end and refetches from `new_pc`.
    ///
    /// Clears the fetch buffer and the ID/EX latch (everything younger than
    /// the redirecting instruction) and charges the redirect penalty.
    fn flush_frontend(&mut self, cpu: &mut Cpu, new_pc: u64) {
        self.fetch_buffer.clear();
        self.id_ex.clear();
        self.fetch_pc = new_pc;
        self.redirect_stall = self.mispredict_penalty;
        cpu.stats.pipeline_flushes += 1;
    }

    /// Execute latency for one instruction, in cycles.
    ///
    /// Loads take a single execute cycle when the D-cache gates the memory
    /// stage, and the full uncached latency otherwise.
    fn latency_for(&self, opcode: Opcode, is_load: bool, is_store: bool, is_branch: bool) -> u64 {
        if is_load {
            return if self.dcache.is_some() { 1 } else { self.latency.load };
        }
        if is_store {
            return self.latency.store;
        }
        if is_branch {
            return self.latency.branch;
        }
        match opcode {
            Opcode::Madd | Opcode::Msub => self.latency.multiply,
            Opcode::Udiv | Opcode::Sdiv => self.latency.divide,
            Opcode::Vadd | Opcode::Vsub | Opcode::Vmul | Opcode::Dup => self.latency.simd_int,
            Opcode::Vfadd | Opcode::Vfsub | Opcode::Vfmul => self.latency.simd_fp,
            _ => self.latency.alu,
        }
    }
}
