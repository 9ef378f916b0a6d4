//! Engine Equivalence and Determinism.
//!
//! With caches disabled, the pipeline and the functional emulator must
//! leave identical architectural state behind for the same program; and
//! any run repeated with identical inputs must reproduce its statistics
//! byte-for-byte.

use a64sim_core::Simulator;
use a64sim_core::isa::opcode::Cond;
use pretty_assertions::assert_eq;

use crate::common::builder::{self, exit_sequence};
use crate::common::harness;

/// Compares every piece of architectural state two runs left behind.
fn assert_same_arch_state(a: &Simulator, b: &Simulator) {
    for idx in 0..31 {
        assert_eq!(a.cpu.regs.read(idx), b.cpu.regs.read(idx), "x{idx}");
    }
    assert_eq!(a.cpu.regs.sp(), b.cpu.regs.sp(), "sp");
    assert_eq!(a.cpu.pstate, b.cpu.pstate, "pstate");
    assert_eq!(a.cpu.exit_code, b.cpu.exit_code, "exit code");
}

/// A mixed program exercising arithmetic, memory, branches, bitfields,
/// conditional selects, and pairs.
fn mixed_program() -> Vec<u32> {
    let mut words = vec![
        builder::movz(1, 0x4000),
        builder::movz(2, 0x1234),
        builder::movk(2, 0x5678, 1),
        builder::str64_imm(2, 1, 0),
        builder::ldr64_imm(3, 1, 0),
        builder::add_reg(4, 3, 2),
        builder::subs_imm(5, 4, 1),
        builder::cond_select(true, false, 1, 6, 4, 5, Cond::Eq.bits() as u32),
        builder::bitfield(true, 2, 7, 2, 8, 63), // lsr x7, x2, #8
        builder::stp64_pre(4, 7, 1, -16),
        builder::ldp64_post(9, 10, 1, 16),
        builder::cmp_imm(9, 0),
        builder::b_cond(Cond::Ne.bits() as u32, 2),
        builder::brk(5),
        builder::add_reg(0, 9, 10),
    ];
    words.extend_from_slice(&exit_sequence());
    words
}

/// Pipeline and emulator agree on the final architectural state.
#[test]
fn engines_agree_on_mixed_program() {
    let piped = harness::run_pipeline(&mixed_program());
    let functional = harness::run_functional(&mixed_program());
    assert!(piped.cpu.halted && functional.cpu.halted);
    assert_same_arch_state(&piped, &functional);
}

/// The agreement holds for the loop scenario as well.
#[test]
fn engines_agree_on_loop() {
    let words = [
        builder::add_imm(0, 31, 5),
        builder::subs_imm(0, 0, 1),
        builder::b_cond(Cond::Ne.bits() as u32, -1),
        builder::movz(8, 93),
        builder::svc(0),
    ];
    let piped = harness::run_pipeline(&words);
    let functional = harness::run_functional(&words);
    assert_same_arch_state(&piped, &functional);
    assert_eq!(
        piped.statistics().instructions_retired,
        functional.statistics().instructions_retired,
        "both engines retire the same dynamic instruction count"
    );
}

/// Deterministic replay: identical inputs produce identical statistics.
#[test]
fn replay_is_deterministic() {
    let first = harness::run_pipeline(&mixed_program());
    let second = harness::run_pipeline(&mixed_program());
    assert_eq!(
        first.statistics().snapshot(),
        second.statistics().snapshot(),
        "statistics must replay byte-for-byte"
    );
}

/// Replay determinism holds with both caches enabled (including the
/// seeded random replacement policy).
#[test]
fn replay_with_caches_is_deterministic() {
    let mut config = harness::pipeline_config();
    config.cache.l1_i.enabled = true;
    config.cache.l1_d.enabled = true;
    config.cache.l1_d.eviction = a64sim_core::config::EvictionPolicy::Random;

    let first = harness::run_with_config(&config, &mixed_program());
    let second = harness::run_with_config(&config, &mixed_program());
    assert_eq!(first.statistics().snapshot(), second.statistics().snapshot());
    assert_eq!(first.cpu.exit_code, second.cpu.exit_code);
}

/// Caches change timing but never architectural results.
#[test]
fn caches_do_not_change_results() {
    let baseline = harness::run_pipeline(&mixed_program());

    let mut config = harness::pipeline_config();
    config.cache.l1_i.enabled = true;
    config.cache.l1_d.enabled = true;
    let cached = harness::run_with_config(&config, &mixed_program());

    assert_same_arch_state(&baseline, &cached);
}

/// The scenario-1 statistics replay identically (spec determinism check).
#[test]
fn scenario_one_replays() {
    let words = [
        builder::add_imm(8, 31, 93),
        builder::add_imm(0, 31, 42),
        builder::svc(0),
    ];
    let a = harness::run_pipeline(&words);
    let b = harness::run_pipeline(&words);
    assert_eq!(a.statistics().snapshot(), b.statistics().snapshot());
}
