//! The functional execution engine.
//!
//! One instruction per step: fetch the word at PC, decode, resolve operands,
//! execute, perform the memory access, write back, update PSTATE, and
//! advance the PC. Supervisor calls dispatch through the syscall handler.
//! There is no timing model here; the pipeline replaces this engine for
//! cycle prediction and must leave identical architectural state behind when
//! its caches are disabled.

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::Fault;
use crate::config::Config;
use crate::core::Cpu;
use crate::core::units::exec::{self, ExecOutput};
use crate::isa;
use crate::isa::instruction::Instruction;
use crate::isa::opcode::Opcode;
use crate::sim::syscall::SyscallHandler;

/// The functional engine. Stateless apart from the run limits.
#[derive(Debug, Default)]
pub struct Emulator {
    /// Instruction budget, when a limit is configured.
    max_instructions: Option<u64>,
    /// Cycle budget; functionally each instruction is one cycle.
    max_cycles: Option<u64>,
}

impl Emulator {
    /// Creates a functional engine with the configured run limits.
    pub fn new(config: &Config) -> Self {
        Self {
            max_instructions: config.general.max_instructions,
            max_cycles: config.general.max_cycles,
        }
    }

    /// Executes a single instruction.
    ///
    /// No-op once the CPU has halted. Each step retires exactly one
    /// instruction (counted as one cycle) or halts the run.
    ///
    /// # Arguments
    ///
    /// * `cpu` - The architectural state.
    /// * `syscalls` - Handler invoked for `SVC`.
    pub fn step(&mut self, cpu: &mut Cpu, syscalls: &mut dyn SyscallHandler) {
        if cpu.halted {
            return;
        }
        if let Some(limit) = self.max_instructions {
            if cpu.stats.instructions_retired >= limit {
                cpu.halt(Fault::InstructionLimit(limit));
                return;
            }
        }
        if let Some(limit) = self.max_cycles {
            if cpu.stats.cycles >= limit {
                cpu.halt(Fault::CycleLimit(limit));
                return;
            }
        }
        cpu.stats.cycles += 1;

        let pc = cpu.pc;
        let word = cpu.memory.read_u32(pc);
        let inst = isa::decode(word);

        if inst.opcode == Opcode::Unknown {
            cpu.halt(Fault::UnknownInstruction { pc, word });
            return;
        }
        if cpu.trace {
            eprintln!("EMU pc={:#x} inst={:#010x} {}", pc, word, inst.opcode.mnemonic());
        }

        match inst.opcode {
            Opcode::Svc => {
                let outcome = syscalls.handle(cpu);
                cpu.stats.record_retired(&inst);
                if outcome.exited {
                    cpu.halt(Fault::GuestExit(outcome.exit_code));
                } else {
                    cpu.pc = pc.wrapping_add(INSTRUCTION_SIZE);
                }
                return;
            }
            Opcode::Brk => {
                cpu.stats.record_retired(&inst);
                cpu.halt(Fault::Breakpoint(inst.imm as u16));
                return;
            }
            _ => {}
        }

        if inst.is_simd() {
            self.step_simd(cpu, &inst, pc);
        } else {
            self.step_scalar(cpu, &inst, pc);
        }
        cpu.stats.record_retired(&inst);
    }

    /// Executes one scalar instruction: ALU, branch, or integer load/store.
    fn step_scalar(&mut self, cpu: &mut Cpu, inst: &Instruction, pc: u64) {
        let ops = cpu.operands(inst);
        let out = exec::execute(inst, pc, &ops);

        if inst.is_load() {
            self.do_load(cpu, inst, &out);
        } else if inst.is_store() {
            self.do_store(cpu, inst, &out);
        } else if inst.writes_gpr() {
            cpu.write_rd(inst, out.alu_result);
        }

        if inst.writes_base() {
            cpu.write_base(inst, out.base_result);
        }
        if out.sets_flags {
            cpu.pstate = out.nzcv;
        }

        cpu.pc = if out.branch_taken {
            out.branch_target
        } else {
            pc.wrapping_add(INSTRUCTION_SIZE)
        };
    }

    /// Performs a load's memory access and register writeback.
    fn do_load(&mut self, cpu: &mut Cpu, inst: &Instruction, out: &ExecOutput) {
        let bytes = inst.mem_bytes();
        let raw = cpu.memory.read_sized(out.alu_result, bytes);
        cpu.regs.write(inst.rd, exec::extend_load_value(inst, raw));
        if inst.writes_ra() {
            let second = cpu.memory.read_sized(out.alu_result.wrapping_add(bytes), bytes);
            cpu.regs.write(inst.ra, second);
        }
    }

    /// Performs a store's memory access.
    fn do_store(&mut self, cpu: &mut Cpu, inst: &Instruction, out: &ExecOutput) {
        let bytes = inst.mem_bytes();
        cpu.memory.write_sized(out.alu_result, out.store_value, bytes);
        if inst.opcode == Opcode::Stp {
            cpu.memory
                .write_sized(out.alu_result.wrapping_add(bytes), out.store_value2, bytes);
        }
    }

    /// Executes one SIMD instruction (vector ALU, `DUP`, or Q load/store).
    fn step_simd(&mut self, cpu: &mut Cpu, inst: &Instruction, pc: u64) {
        match inst.opcode {
            Opcode::LdrQ | Opcode::StrQ => {
                let ops = cpu.operands(inst);
                let out = exec::execute(inst, pc, &ops);
                if inst.opcode == Opcode::LdrQ {
                    let value = cpu.memory.read_u128(out.alu_result);
                    cpu.vregs.write(inst.rd, value);
                } else {
                    cpu.memory.write_u128(out.alu_result, cpu.vregs.read(inst.rd));
                }
            }
            Opcode::Dup => {
                let rn_gp = cpu.regs.read(inst.rn);
                let result = exec::execute_vector(inst, 0, 0, rn_gp);
                cpu.vregs.write(inst.rd, result);
            }
            _ => {
                let vn = cpu.vregs.read(inst.rn);
                let vm = cpu.vregs.read(inst.rm);
                let result = exec::execute_vector(inst, vn, vm, 0);
                cpu.vregs.write(inst.rd, result);
            }
        }
        cpu.pc = pc.wrapping_add(INSTRUCTION_SIZE);
    }
}
