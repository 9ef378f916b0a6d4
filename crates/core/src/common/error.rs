//! Fault and load-error definitions.
//!
//! This module defines the error handling surface of the simulator. It provides:
//! 1. **Fault Representation:** Every condition that halts a simulation run.
//! 2. **Exit-Code Mapping:** The sentinel exit code each fault reports.
//! 3. **Load Errors:** Failures while parsing or placing a guest program.
//!
//! Faults never unwind through the core: the emulator and pipeline record the
//! fault, set the halted flag, and expose the mapped exit code.

use crate::common::constants::{EXIT_CODE_CYCLE_LIMIT, EXIT_CODE_FAULT};

/// A condition that terminates a simulation run.
///
/// Faults cover both guest-originated termination (the exit syscall, `BRK`)
/// and simulator-originated termination (undecodable instructions, run
/// limits). Each fault maps to a well-known exit code via [`Fault::exit_code`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    /// The word at the given PC did not decode to any supported instruction.
    #[error("unknown instruction {word:#010x} at pc={pc:#x}")]
    UnknownInstruction {
        /// Program counter of the undecodable word.
        pc: u64,
        /// The raw 32-bit instruction word.
        word: u32,
    },

    /// A `BRK #imm16` instruction was executed.
    #[error("breakpoint trap #{0}")]
    Breakpoint(u16),

    /// The configured cycle limit was reached before the guest exited.
    #[error("cycle limit of {0} exceeded")]
    CycleLimit(u64),

    /// The configured instruction limit was reached before the guest exited.
    #[error("instruction limit of {0} exceeded")]
    InstructionLimit(u64),

    /// The guest requested termination through the exit syscall.
    #[error("guest exit with code {0}")]
    GuestExit(i64),
}

impl Fault {
    /// Maps the fault to the exit code a halted simulation reports.
    ///
    /// # Returns
    ///
    /// The guest-provided code for [`Fault::GuestExit`], the trap code for
    /// [`Fault::Breakpoint`], and the spec sentinels otherwise: −1 for
    /// unknown instructions and instruction limits, −2 for cycle limits.
    pub fn exit_code(&self) -> i64 {
        match self {
            Self::UnknownInstruction { .. } | Self::InstructionLimit(_) => EXIT_CODE_FAULT,
            Self::Breakpoint(code) => i64::from(*code),
            Self::CycleLimit(_) => EXIT_CODE_CYCLE_LIMIT,
            Self::GuestExit(code) => *code,
        }
    }
}

/// An error raised while parsing or placing a guest program image.
///
/// Unlike [`Fault`], load errors occur before simulation starts and propagate
/// to the caller as ordinary `Result` errors.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The image could not be parsed as an object file.
    #[error("malformed object file: {0}")]
    Object(#[from] object::Error),

    /// The image is a valid object file but not an AArch64 executable.
    #[error("not an AArch64 executable (architecture {0:?})")]
    WrongArchitecture(object::Architecture),

    /// A segment declares a file size larger than its memory size.
    #[error("segment at {vaddr:#x} has file size {file_size} > memory size {mem_size}")]
    OversizedSegment {
        /// Virtual address of the offending segment.
        vaddr: u64,
        /// Bytes of initialized data in the image.
        file_size: u64,
        /// Bytes of address space the segment occupies.
        mem_size: u64,
    },
}
