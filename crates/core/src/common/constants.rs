//! Common constants used throughout the simulator.
//!
//! This module centralizes architectural constants shared by the decoder,
//! emulator, and pipeline. It covers:
//! 1. **Instruction geometry:** Fixed 4-byte A64 instruction size.
//! 2. **Memory geometry:** Page size and shift for the sparse page map.
//! 3. **Register aliases:** Well-known AArch64 register indices.

/// Size of every A64 instruction in bytes.
///
/// AArch64 has a fixed-width 32-bit encoding; the PC always advances in
/// multiples of this value.
pub const INSTRUCTION_SIZE: u64 = 4;

/// Shift from a byte address to a page index (4 KiB pages).
pub const PAGE_SHIFT: u64 = 12;

/// Size of a sparse-memory page in bytes.
pub const PAGE_SIZE: usize = 1 << PAGE_SHIFT;

/// Number of general-purpose registers addressable by a 5-bit field.
pub const NUM_GPRS: usize = 32;

/// Number of 128-bit SIMD vector registers.
pub const NUM_VREGS: usize = 32;

/// Register index that encodes the zero register (XZR/WZR) or, for a small
/// set of opcodes, the stack pointer.
pub const REG_ZR: u8 = 31;

/// Link register written by `BL`/`BLR` with the return address.
pub const REG_LR: u8 = 30;

/// Register carrying the syscall number in the AArch64 Linux convention.
pub const REG_SYSCALL_NR: u8 = 8;

/// First of the six registers (`X0`-`X5`) carrying syscall arguments; `X0`
/// also receives the syscall return value.
pub const REG_SYSCALL_ARG0: u8 = 0;

/// Exact encoding of the `NOP` hint instruction (hint #0).
pub const NOP_WORD: u32 = 0xD503_201F;

/// Value returned by `MRS Xt, DCZID_EL0`: `DC ZVA` block size of 2^(4+`BS`)
/// bytes with `BS` = 4, i.e. a 64-byte cache line, and zeroing permitted.
pub const DCZID_EL0_VALUE: u64 = 0x4;

/// System-register encoding (`o0:op1:CRn:CRm:op2`) of `DCZID_EL0`
/// (`S3_3_C0_C0_7`, the 15-bit field of the `MRS` encoding).
pub const SYSREG_DCZID_EL0: u32 = 0b1_011_0000_0000_111;

/// Sentinel exit code for a halt caused by an undecodable instruction or an
/// exceeded instruction limit.
pub const EXIT_CODE_FAULT: i64 = -1;

/// Sentinel exit code for a halt caused by an exceeded cycle limit.
pub const EXIT_CODE_CYCLE_LIMIT: i64 = -2;
