//! Timing Behavior Tests.
//!
//! Verifies cache integration, execute latencies, issue-width scaling, and
//! the structural invariants every pipeline run must satisfy.

use pretty_assertions::assert_eq;

use crate::common::builder::{self, exit_sequence};
use crate::common::harness;

/// A simple straight-line program used across the timing comparisons.
fn straightline() -> Vec<u32> {
    let mut words = vec![
        builder::movz(1, 0x3000),
        builder::movz(2, 1),
        builder::str64_imm(2, 1, 0),
        builder::ldr64_imm(3, 1, 0),
        builder::add_imm(0, 3, 9),
    ];
    words.extend_from_slice(&exit_sequence());
    words
}

/// Structural invariant: cycles can never undercut retired work divided by
/// the issue width, at any width.
#[test]
fn cycles_lower_bound_by_width() {
    for width in [1usize, 2, 4, 8] {
        let mut config = harness::pipeline_config();
        config.pipeline.issue_width = width;
        let sim = harness::run_with_config(&config, &straightline());
        let stats = sim.statistics();
        assert_eq!(sim.cpu.exit_code, 10, "width {width}");
        assert!(
            stats.cycles >= stats.instructions_retired / width as u64,
            "width {width}: {} cycles for {} instructions",
            stats.cycles,
            stats.instructions_retired
        );
        assert!(
            stats.instructions_retired <= stats.cycles * width as u64,
            "retired work cannot exceed cycles x width"
        );
    }
}

/// Narrower pipelines never finish faster than wider ones.
#[test]
fn width_scaling_monotonic() {
    let mut cycles = Vec::new();
    for width in [1usize, 8] {
        let mut config = harness::pipeline_config();
        config.pipeline.issue_width = width;
        let sim = harness::run_with_config(&config, &straightline());
        cycles.push(sim.statistics().cycles);
    }
    assert!(
        cycles[0] >= cycles[1],
        "single issue ({}) must not beat 8-wide ({})",
        cycles[0],
        cycles[1]
    );
}

/// Enabling the data cache records hits and misses and preserves results.
#[test]
fn dcache_counts_and_correctness() {
    let mut config = harness::pipeline_config();
    config.cache.l1_d.enabled = true;
    let sim = harness::run_with_config(&config, &straightline());
    let stats = sim.statistics();

    assert_eq!(sim.cpu.exit_code, 10);
    assert_eq!(
        stats.dcache_hits + stats.dcache_misses,
        2,
        "one store and one load"
    );
    assert!(stats.dcache_misses >= 1, "the first touch must miss");
}

/// A load hitting the line a store just filled is a hit.
#[test]
fn dcache_store_then_load_hits() {
    let mut config = harness::pipeline_config();
    config.cache.l1_d.enabled = true;
    let sim = harness::run_with_config(&config, &straightline());
    let stats = sim.statistics();
    assert_eq!(stats.dcache_misses, 1, "only the store's cold miss");
    assert_eq!(stats.dcache_hits, 1, "the load hits the filled line");
}

/// Enabling the instruction cache records fetch-side traffic; misses stall
/// the front end but never change results.
#[test]
fn icache_counts_and_correctness() {
    let mut config = harness::pipeline_config();
    config.cache.l1_i.enabled = true;
    let baseline = harness::run_with_config(&harness::pipeline_config(), &straightline());
    let cached = harness::run_with_config(&config, &straightline());

    assert_eq!(cached.cpu.exit_code, baseline.cpu.exit_code);
    let stats = cached.statistics();
    assert!(stats.icache_hits + stats.icache_misses >= 1);
    assert!(stats.icache_misses >= 1, "cold code must miss at least once");
    assert!(
        stats.cycles >= baseline.statistics().cycles,
        "icache misses cannot make the run faster"
    );
}

/// Multi-cycle operations slow the pipeline: a divide-heavy program takes
/// more cycles than the same program with single-cycle ALU operations.
#[test]
fn divide_latency_observable() {
    let divides = {
        let mut words = vec![
            builder::movz(1, 100),
            builder::movz(2, 7),
            builder::data_proc_2src(true, 0, 1, 2, 2), // udiv
            builder::data_proc_2src(true, 0, 1, 2, 2),
            builder::data_proc_2src(true, 0, 1, 2, 2),
        ];
        words.extend_from_slice(&exit_sequence());
        words
    };
    let adds = {
        let mut words = vec![
            builder::movz(1, 100),
            builder::movz(2, 7),
            builder::add_imm(0, 1, 0),
            builder::add_imm(0, 1, 0),
            builder::add_imm(0, 1, 0),
        ];
        words.extend_from_slice(&exit_sequence());
        words
    };

    let slow = harness::run_pipeline(&divides);
    let fast = harness::run_pipeline(&adds);
    assert_eq!(slow.cpu.exit_code, 14, "100 / 7");
    assert!(
        slow.statistics().cycles > fast.statistics().cycles,
        "10-cycle divides must be visible in the cycle count"
    );
}

/// The latency table is configurable: doubling the divide latency slows
/// the same program further.
#[test]
fn latency_table_is_tunable() {
    let mut words = vec![
        builder::movz(1, 100),
        builder::movz(2, 7),
        builder::data_proc_2src(true, 0, 1, 2, 2),
    ];
    words.extend_from_slice(&exit_sequence());

    let baseline = harness::run_pipeline(&words);

    let mut config = harness::pipeline_config();
    config.pipeline.latency.divide = 30;
    let slowed = harness::run_with_config(&config, &words);

    assert_eq!(baseline.cpu.exit_code, slowed.cpu.exit_code);
    assert!(slowed.statistics().cycles > baseline.statistics().cycles);
}

/// The instruction limit halts a run that would otherwise keep going.
#[test]
fn instruction_limit_halts() {
    let mut config = harness::pipeline_config();
    config.general.max_instructions = Some(10);
    let sim = harness::run_with_config(
        &config,
        &[
            builder::movz(0, 1),
            builder::add_imm(0, 0, 1),
            builder::b(-1), // infinite add loop
        ],
    );
    assert!(sim.cpu.halted);
    assert_eq!(sim.cpu.exit_code, -1, "instruction limit reports -1");
    assert!(sim.statistics().instructions_retired >= 10);
}

/// An undecodable word reaching execute halts with the fault code, after
/// retiring everything older.
#[test]
fn unknown_opcode_halts_with_fault() {
    let sim = harness::run_pipeline(&[
        builder::movz(3, 77),
        0xFFFF_FFFF, // undecodable
        builder::movz(8, 93),
        builder::svc(0),
    ]);
    assert!(sim.cpu.halted);
    assert_eq!(sim.cpu.exit_code, -1);
    assert_eq!(sim.cpu.regs.read(3), 77, "older work retires before the halt");
}

/// `BRK` halts with its trap code.
#[test]
fn brk_halts_with_trap_code() {
    let sim = harness::run_pipeline(&[builder::movz(0, 5), builder::brk(42)]);
    assert!(sim.cpu.halted);
    assert_eq!(sim.cpu.exit_code, 42);
}
