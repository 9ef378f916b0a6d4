//! The supervisor-call seam.
//!
//! The core does not implement an operating system: when the guest executes
//! `SVC`, the engines call out through [`SyscallHandler`], which an external
//! OS-service layer provides. The AArch64 Linux convention applies: the
//! syscall number travels in `X8`, arguments in `X0`-`X5`, and the return
//! value in `X0` (the handler writes it).
//!
//! [`HostedSyscalls`] is a minimal in-crate handler (`exit`, `exit_group`,
//! and `write` with captured output) so programs and tests run without the
//! external layer.

use crate::common::constants::{REG_SYSCALL_ARG0, REG_SYSCALL_NR};
use crate::core::Cpu;

/// What a supervisor call did to the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyscallOutcome {
    /// True when the guest requested termination.
    pub exited: bool,
    /// Exit code; meaningful only when `exited`.
    pub exit_code: i64,
}

/// The contract between the core and the OS-service layer.
pub trait SyscallHandler {
    /// Handles one `SVC`.
    ///
    /// The handler reads its arguments from the CPU's registers and memory,
    /// performs the service, writes the return value into `X0`, and reports
    /// whether the guest exited.
    ///
    /// # Arguments
    ///
    /// * `cpu` - Architectural state at the supervisor call, with all older
    ///   instructions' results committed.
    fn handle(&mut self, cpu: &mut Cpu) -> SyscallOutcome;
}

/// AArch64 Linux syscall number for `write`.
const NR_WRITE: u64 = 64;

/// AArch64 Linux syscall number for `exit`.
const NR_EXIT: u64 = 93;

/// AArch64 Linux syscall number for `exit_group`.
const NR_EXIT_GROUP: u64 = 94;

/// Error returned for syscalls the hosted handler does not implement.
const ENOSYS: i64 = 38;

/// Minimal hosted syscall handler.
///
/// Implements `exit`/`exit_group` and `write` (capturing fd 1 and 2 output
/// into an inspectable buffer). Everything else returns `-ENOSYS`, which is
/// enough for the self-contained programs the test suite runs.
#[derive(Debug, Default)]
pub struct HostedSyscalls {
    /// Bytes the guest wrote to stdout or stderr.
    pub output: Vec<u8>,
}

impl HostedSyscalls {
    /// Creates a handler with an empty capture buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured stdout/stderr bytes as a string, lossily decoded.
    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl SyscallHandler for HostedSyscalls {
    fn handle(&mut self, cpu: &mut Cpu) -> SyscallOutcome {
        let nr = cpu.regs.read(REG_SYSCALL_NR);
        let arg = |i: u8| cpu.regs.read(REG_SYSCALL_ARG0 + i);

        match nr {
            NR_EXIT | NR_EXIT_GROUP => SyscallOutcome {
                exited: true,
                exit_code: arg(0) as i64,
            },
            NR_WRITE => {
                let fd = arg(0);
                let addr = arg(1);
                let len = arg(2);
                if fd == 1 || fd == 2 {
                    let mut buf = vec![0u8; len as usize];
                    cpu.memory.read_bytes(addr, &mut buf);
                    self.output.extend_from_slice(&buf);
                }
                cpu.regs.write(REG_SYSCALL_ARG0, len);
                SyscallOutcome::default()
            }
            _ => {
                cpu.regs.write(REG_SYSCALL_ARG0, (-ENOSYS) as u64);
                SyscallOutcome::default()
            }
        }
    }
}
