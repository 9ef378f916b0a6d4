//! Run helpers over both execution engines.
//!
//! Programs are word slices assembled with the builder, placed at
//! [`CODE_BASE`], and run to completion under a cycle limit so a wedged
//! pipeline fails the test instead of hanging it.

use a64sim_core::config::{Config, Engine};
use a64sim_core::sim::loader::{Program, Segment};
use a64sim_core::sim::simulator::Simulator;

/// Where test programs are placed.
pub const CODE_BASE: u64 = 0x1_0000;

/// Safety net for runaway programs.
pub const CYCLE_LIMIT: u64 = 200_000;

/// Default pipelined configuration: 8-wide, caches off, limits set.
pub fn pipeline_config() -> Config {
    let mut config = Config::default();
    config.general.engine = Engine::Pipelined;
    config.general.max_cycles = Some(CYCLE_LIMIT);
    config
}

/// Functional-engine configuration with the same limits.
pub fn functional_config() -> Config {
    let mut config = pipeline_config();
    config.general.engine = Engine::Functional;
    config
}

/// Builds a simulator with `words` loaded at [`CODE_BASE`], not yet run.
pub fn prepare(config: &Config, words: &[u32]) -> Simulator {
    let mut sim = Simulator::new(config);
    sim.load(&Program::from_words(CODE_BASE, words));
    sim
}

/// Runs `words` under the given configuration to completion.
pub fn run_with_config(config: &Config, words: &[u32]) -> Simulator {
    let mut sim = prepare(config, words);
    let _ = sim.run();
    sim
}

/// Runs `words` under the default 8-wide pipeline.
pub fn run_pipeline(words: &[u32]) -> Simulator {
    run_with_config(&pipeline_config(), words)
}

/// Runs `words` under the functional emulator.
pub fn run_functional(words: &[u32]) -> Simulator {
    run_with_config(&functional_config(), words)
}

/// Runs a program with an extra data segment alongside the code.
pub fn run_pipeline_with_data(words: &[u32], data_addr: u64, data: &[u8]) -> Simulator {
    let mut program = Program::from_words(CODE_BASE, words);
    program.segments.push(Segment {
        virt_addr: data_addr,
        bytes: data.to_vec(),
        mem_size: data.len() as u64,
    });
    let mut sim = Simulator::new(&pipeline_config());
    sim.load(&program);
    let _ = sim.run();
    sim
}
