//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the AArch64 simulator. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived metrics (CPI, MIPS).
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch, system, SIMD).
//! 3. **Branch prediction:** Predictions, correct predictions, mispredictions, and flushes.
//! 4. **Stalls:** Memory, control, and data hazard stall counts.
//! 5. **Caches:** Hit/miss counts for the L1 instruction and data caches.

use std::time::Instant;

use crate::isa::instruction::Instruction;

/// Simulation statistics structure tracking all performance metrics.
///
/// Collects detailed statistics about instruction execution, cache behavior,
/// branch prediction, stalls, and execution time for performance analysis.
/// The architectural counters (everything except the host start time) are
/// fully deterministic: two runs of identical inputs produce identical
/// values, which [`SimStats::snapshot`] exposes for byte-for-byte comparison.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions retired.
    pub instructions_retired: u64,

    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of branch instructions retired.
    pub inst_branch: u64,
    /// Count of ALU (non-load/store/branch/system) instructions retired.
    pub inst_alu: u64,
    /// Count of system (`SVC`, `BRK`, `MRS`, `NOP`) instructions retired.
    pub inst_system: u64,
    /// Count of SIMD instructions retired.
    pub inst_simd: u64,

    /// Number of conditional-branch predictions made.
    pub branch_predictions: u64,
    /// Number of predictions whose direction (and redirect target, when one
    /// was used) matched the actual outcome.
    pub branch_correct: u64,
    /// Number of predictions that disagreed with the actual outcome.
    pub branch_mispredictions: u64,
    /// Number of pipeline flushes (mispredictions plus unknown-target
    /// redirects and syscall barriers).
    pub pipeline_flushes: u64,
    /// Number of unconditional branches removed at fetch without consuming
    /// a pipeline slot.
    pub eliminated_branches: u64,
    /// Number of compare+branch pairs fused into a single slot.
    pub fused_pairs: u64,

    /// Stall cycles waiting on the memory hierarchy.
    pub stalls_mem: u64,
    /// Stall cycles from control hazards (redirect refill).
    pub stalls_control: u64,
    /// Stall cycles from data hazards (load-use, issue-group RAW/WAW).
    pub stalls_data: u64,

    /// L1 instruction cache hit count.
    pub icache_hits: u64,
    /// L1 instruction cache miss count.
    pub icache_misses: u64,
    /// L1 data cache hit count.
    pub dcache_hits: u64,
    /// L1 data cache miss count.
    pub dcache_misses: u64,
}

impl Default for SimStats {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_alu: 0,
            inst_system: 0,
            inst_simd: 0,
            branch_predictions: 0,
            branch_correct: 0,
            branch_mispredictions: 0,
            pipeline_flushes: 0,
            eliminated_branches: 0,
            fused_pairs: 0,
            stalls_mem: 0,
            stalls_control: 0,
            stalls_data: 0,
            icache_hits: 0,
            icache_misses: 0,
            dcache_hits: 0,
            dcache_misses: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"instruction_mix"`, `"branch"`,
/// `"stalls"`, `"memory"`. Pass an empty slice to `print_sections` to print
/// all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "branch", "stalls", "memory"];

/// Deterministic view of the architectural counters.
///
/// Excludes the host start time so two replayed runs compare equal.
pub type StatsSnapshot = [u64; 21];

impl SimStats {
    /// Returns every architectural counter as a fixed-order array.
    ///
    /// Two runs over identical inputs must produce identical snapshots; the
    /// deterministic-replay tests compare these byte-for-byte.
    pub fn snapshot(&self) -> StatsSnapshot {
        [
            self.cycles,
            self.instructions_retired,
            self.inst_load,
            self.inst_store,
            self.inst_branch,
            self.inst_alu,
            self.inst_system,
            self.inst_simd,
            self.branch_predictions,
            self.branch_correct,
            self.branch_mispredictions,
            self.pipeline_flushes,
            self.eliminated_branches,
            self.fused_pairs,
            self.stalls_mem,
            self.stalls_control,
            self.stalls_data,
            self.icache_hits,
            self.icache_misses,
            self.dcache_hits,
            self.dcache_misses,
        ]
    }

    /// Counts one retired instruction and its mix category.
    ///
    /// Shared by the emulator and the pipeline writeback stage so both
    /// engines classify identically.
    pub fn record_retired(&mut self, inst: &Instruction) {
        self.instructions_retired += 1;
        if inst.is_simd() {
            self.inst_simd += 1;
        } else if inst.is_load() {
            self.inst_load += 1;
        } else if inst.is_store() {
            self.inst_store += 1;
        } else if inst.is_branch() {
            self.inst_branch += 1;
        } else if inst.is_system() || inst.opcode == crate::isa::opcode::Opcode::Nop {
            self.inst_system += 1;
        } else {
            self.inst_alu += 1;
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of `"summary"`,
    /// `"instruction_mix"`, `"branch"`, `"stalls"`, or `"memory"`. Pass an
    /// empty slice to print all sections (same as `print()`).
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    ///
    /// # Panics
    ///
    /// This function will not panic: `cyc` and `instr` are clamped to at
    /// least 1 before any division.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let instr = if self.instructions_retired == 0 {
            1
        } else {
            self.instructions_retired
        };

        if want("summary") {
            let ipc = self.instructions_retired as f64 / cyc as f64;
            let cpi = cyc as f64 / instr as f64;
            let mips = (self.instructions_retired as f64 / seconds) / 1_000_000.0;
            println!("\n==========================================================");
            println!("AARCH64 CORE SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {:.4} s", seconds);
            println!("sim_cycles               {}", self.cycles);
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_ipc                  {:.4}", ipc);
            println!("sim_cpi                  {:.4}", cpi);
            println!("sim_mips                 {:.2}", mips);
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            let total_inst = instr as f64;
            let line = |name: &str, count: u64| {
                println!(
                    "  op.{:<20} {} ({:.2}%)",
                    name,
                    count,
                    (count as f64 / total_inst) * 100.0
                );
            };
            println!("INSTRUCTION MIX");
            line("alu", self.inst_alu);
            line("load", self.inst_load);
            line("store", self.inst_store);
            line("branch", self.inst_branch);
            line("system", self.inst_system);
            line("simd", self.inst_simd);
            println!("----------------------------------------------------------");
        }
        if want("branch") {
            let bp_total = self.branch_predictions;
            let bp_acc = if bp_total > 0 {
                100.0 * (self.branch_correct as f64 / bp_total as f64)
            } else {
                0.0
            };
            println!("BRANCH PREDICTION");
            println!("  bp.lookups             {}", bp_total);
            println!("  bp.mispredicts         {}", self.branch_mispredictions);
            println!("  bp.accuracy            {:.2}%", bp_acc);
            println!("  pipeline.flushes       {}", self.pipeline_flushes);
            println!("  branches.eliminated    {}", self.eliminated_branches);
            println!("  branches.fused         {}", self.fused_pairs);
            println!("----------------------------------------------------------");
        }
        if want("stalls") {
            let line = |name: &str, count: u64| {
                println!(
                    "  stalls.{:<15} {} ({:.2}%)",
                    name,
                    count,
                    (count as f64 / cyc as f64) * 100.0
                );
            };
            println!("STALL BREAKDOWN");
            line("memory", self.stalls_mem);
            line("control", self.stalls_control);
            line("data", self.stalls_data);
            println!("----------------------------------------------------------");
        }
        if want("memory") {
            let print_cache = |name: &str, hits: u64, misses: u64| {
                let total = hits + misses;
                let rate = if total > 0 {
                    (hits as f64 / total as f64) * 100.0
                } else {
                    0.0
                };
                println!(
                    "  {:<6} accesses: {:<10} | hits: {:<10} | miss_rate: {:.2}%",
                    name,
                    total,
                    hits,
                    100.0 - rate
                );
            };
            println!("MEMORY HIERARCHY");
            print_cache("L1-I", self.icache_hits, self.icache_misses);
            print_cache("L1-D", self.dcache_hits, self.dcache_misses);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
