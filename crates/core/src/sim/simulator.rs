//! Simulator: owns the CPU and the execution engine side-by-side.
//!
//! The [`Simulator`] composes the architectural state, the configured
//! engine (functional emulator or timing pipeline), and the syscall
//! handler, and drives them one tick at a time. Identical inputs always
//! produce identical statistics and architectural state.

use crate::config::{Config, Engine};
use crate::core::Cpu;
use crate::core::emulator::Emulator;
use crate::core::pipeline::Pipeline;
use crate::sim::loader::Program;
use crate::sim::syscall::{HostedSyscalls, SyscallHandler};
use crate::stats::SimStats;

/// Static dispatch over the two execution engines.
///
/// An enum rather than a trait object keeps the per-tick dispatch free of
/// vtable lookups in the hot loop.
#[derive(Debug)]
enum EngineDispatch {
    /// Architectural execution, one instruction per tick.
    Functional(Emulator),
    /// Cycle-level execution through the superscalar pipeline.
    Pipelined(Box<Pipeline>),
}

/// The syscall handler attached to a simulator.
enum SyscallDispatch {
    /// The built-in minimal handler (exit/exit_group/write).
    Hosted(HostedSyscalls),
    /// An externally supplied OS-service layer.
    External(Box<dyn SyscallHandler>),
}

impl std::fmt::Debug for SyscallDispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hosted(_) => f.write_str("SyscallDispatch::Hosted"),
            Self::External(_) => f.write_str("SyscallDispatch::External"),
        }
    }
}

/// Top-level simulator: CPU architectural state + execution engine.
#[derive(Debug)]
pub struct Simulator {
    /// CPU architectural state (registers, memory, PSTATE, statistics).
    pub cpu: Cpu,
    engine: EngineDispatch,
    syscalls: SyscallDispatch,
}

impl Simulator {
    /// Creates a simulator with the built-in hosted syscall handler.
    pub fn new(config: &Config) -> Self {
        Self::build(config, SyscallDispatch::Hosted(HostedSyscalls::new()))
    }

    /// Creates a simulator with an external syscall handler.
    pub fn with_syscalls(config: &Config, handler: Box<dyn SyscallHandler>) -> Self {
        Self::build(config, SyscallDispatch::External(handler))
    }

    fn build(config: &Config, syscalls: SyscallDispatch) -> Self {
        let mut cpu = Cpu::new();
        cpu.trace = config.general.trace_instructions;
        let engine = match config.general.engine {
            Engine::Functional => EngineDispatch::Functional(Emulator::new(config)),
            Engine::Pipelined => EngineDispatch::Pipelined(Box::new(Pipeline::new(config))),
        };
        Self {
            cpu,
            engine,
            syscalls,
        }
    }

    /// Places a program in memory and initializes PC and SP.
    ///
    /// # Arguments
    ///
    /// * `program` - Entry point, initial stack pointer, and segments.
    pub fn load(&mut self, program: &Program) {
        for segment in &program.segments {
            self.cpu
                .memory
                .load_segment(segment.virt_addr, &segment.bytes, segment.mem_size);
        }
        self.cpu.pc = program.entry_point;
        self.cpu.regs.set_sp(program.initial_sp);
        if let EngineDispatch::Pipelined(pipeline) = &mut self.engine {
            pipeline.set_entry(program.entry_point);
        }
    }

    /// Advances the simulation by one tick.
    ///
    /// One tick is one retired instruction under the functional engine and
    /// one cycle under the pipeline. No-op once halted.
    pub fn tick(&mut self) {
        let handler: &mut dyn SyscallHandler = match &mut self.syscalls {
            SyscallDispatch::Hosted(hosted) => hosted,
            SyscallDispatch::External(external) => external.as_mut(),
        };
        match &mut self.engine {
            EngineDispatch::Functional(emulator) => emulator.step(&mut self.cpu, handler),
            EngineDispatch::Pipelined(pipeline) => pipeline.tick(&mut self.cpu, handler),
        }
    }

    /// Runs until the simulation halts.
    ///
    /// Termination is guaranteed only when the program exits or a
    /// cycle/instruction limit is configured.
    ///
    /// # Returns
    ///
    /// The exit code of the run.
    pub fn run(&mut self) -> i64 {
        tracing::debug!(entry = format_args!("{:#x}", self.cpu.pc), "run starting");
        while !self.cpu.halted {
            self.tick();
        }
        tracing::debug!(
            exit_code = self.cpu.exit_code,
            cycles = self.cpu.stats.cycles,
            instructions = self.cpu.stats.instructions_retired,
            "run finished"
        );
        self.cpu.exit_code
    }

    /// True once the run has terminated.
    pub fn halted(&self) -> bool {
        self.cpu.halted
    }

    /// The exit code, if the run has terminated.
    pub fn take_exit(&self) -> Option<i64> {
        self.cpu.halted.then_some(self.cpu.exit_code)
    }

    /// All measurable outputs of the run.
    pub fn statistics(&self) -> &SimStats {
        &self.cpu.stats
    }

    /// Output captured by the hosted syscall handler, when it is attached.
    pub fn hosted_output(&self) -> Option<&[u8]> {
        match &self.syscalls {
            SyscallDispatch::Hosted(hosted) => Some(&hosted.output),
            SyscallDispatch::External(_) => None,
        }
    }
}
