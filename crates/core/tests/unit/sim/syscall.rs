//! Syscall Seam Tests.
//!
//! Verifies the hosted handler's contract (number in X8, arguments in
//! X0-X5, return in X0) and the external-handler seam.

use a64sim_core::core::Cpu;
use a64sim_core::sim::simulator::Simulator;
use a64sim_core::sim::syscall::{HostedSyscalls, SyscallHandler, SyscallOutcome};
use pretty_assertions::assert_eq;

use crate::common::builder;
use crate::common::harness;

/// `exit` reports the code from X0.
#[test]
fn hosted_exit() {
    let mut cpu = Cpu::new();
    cpu.regs.write(8, 93);
    cpu.regs.write(0, 7);
    let outcome = HostedSyscalls::new().handle(&mut cpu);
    assert_eq!(outcome, SyscallOutcome { exited: true, exit_code: 7 });
}

/// `exit_group` behaves like `exit`.
#[test]
fn hosted_exit_group() {
    let mut cpu = Cpu::new();
    cpu.regs.write(8, 94);
    cpu.regs.write(0, 3);
    assert!(HostedSyscalls::new().handle(&mut cpu).exited);
}

/// `write` to stdout captures the bytes and returns the length in X0.
#[test]
fn hosted_write_captures() {
    let mut cpu = Cpu::new();
    cpu.memory.write_bytes(0x1000, b"abc");
    cpu.regs.write(8, 64);
    cpu.regs.write(0, 1);
    cpu.regs.write(1, 0x1000);
    cpu.regs.write(2, 3);

    let mut handler = HostedSyscalls::new();
    let outcome = handler.handle(&mut cpu);
    assert!(!outcome.exited);
    assert_eq!(handler.output, b"abc");
    assert_eq!(cpu.regs.read(0), 3, "write returns the byte count");
}

/// Writes to other descriptors return the length without capturing.
#[test]
fn hosted_write_other_fd_ignored() {
    let mut cpu = Cpu::new();
    cpu.regs.write(8, 64);
    cpu.regs.write(0, 5);
    cpu.regs.write(2, 4);
    let mut handler = HostedSyscalls::new();
    let _ = handler.handle(&mut cpu);
    assert!(handler.output.is_empty());
}

/// Unimplemented syscalls return -ENOSYS and keep running.
#[test]
fn hosted_unknown_returns_enosys() {
    let mut cpu = Cpu::new();
    cpu.regs.write(8, 222); // mmap: not hosted
    let outcome = HostedSyscalls::new().handle(&mut cpu);
    assert!(!outcome.exited);
    assert_eq!(cpu.regs.read(0) as i64, -38);
}

/// An external handler plugs into the seam: it sees committed register
/// state and controls termination.
#[test]
fn external_handler_seam() {
    struct Recording {
        seen_x0: Vec<u64>,
    }
    impl SyscallHandler for Recording {
        fn handle(&mut self, cpu: &mut Cpu) -> SyscallOutcome {
            self.seen_x0.push(cpu.regs.read(0));
            let exited = self.seen_x0.len() == 2;
            SyscallOutcome { exited, exit_code: 55 }
        }
    }

    let mut sim = Simulator::with_syscalls(
        &harness::pipeline_config(),
        Box::new(Recording { seen_x0: Vec::new() }),
    );
    sim.load(&a64sim_core::sim::loader::Program::from_words(
        harness::CODE_BASE,
        &[
            builder::movz(0, 11),
            builder::svc(0),
            builder::movz(0, 22),
            builder::svc(0),
        ],
    ));
    assert_eq!(sim.run(), 55);
    assert_eq!(
        sim.statistics().instructions_retired, 4,
        "both SVCs and their moves retired"
    );
    assert!(sim.hosted_output().is_none(), "external handler attached");
}
