//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the per-slot records that flow between the five
//! pipeline stages. Each latch is a vector of up to `issue_width` slots;
//! slot 0 is the oldest instruction of its group. An absent slot is an
//! invalid slot: only present slots ever reach the register file.

use crate::core::arch::Pstate;
use crate::isa::instruction::Instruction;
use crate::isa::opcode::Cond;

/// Entry in the IF/ID latch (fetch buffer).
///
/// Carries the raw word, its decode (the fetch stage pre-decodes to steer
/// branch prediction), and the prediction made for it.
#[derive(Debug, Clone, Default)]
pub struct IfIdSlot {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Raw 32-bit instruction word.
    pub word: u32,
    /// Decoded form of `word`.
    pub inst: Instruction,
    /// Whether the predictor called this instruction taken.
    pub pred_taken: bool,
    /// Predicted target; meaningful only when `pred_target_known`.
    pub pred_target: u64,
    /// Whether the BTB supplied a target (and fetch redirected).
    pub pred_target_known: bool,
    /// Unconditional direct branch resolved at fetch; never verified.
    pub early_resolved: bool,
}

/// Entry in the ID/EX latch.
#[derive(Debug, Clone, Default)]
pub struct IdExSlot {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Decoded instruction.
    pub inst: Instruction,
    /// Direction prediction carried from fetch.
    pub pred_taken: bool,
    /// Predicted target carried from fetch.
    pub pred_target: u64,
    /// Whether fetch redirected to `pred_target`.
    pub pred_target_known: bool,
    /// Unconditional direct branch resolved at fetch.
    pub early_resolved: bool,
    /// Remaining execute latency; the group leaves EX when all slots hit 0.
    pub latency_left: u64,
    /// A conditional branch fused into this slot.
    pub fused: Option<FusedBranch>,
}

/// A `B.cond` macro-fused into the preceding flag-setting compare.
#[derive(Debug, Clone, Copy, Default)]
pub struct FusedBranch {
    /// PC of the fused branch (the compare's PC + 4).
    pub pc: u64,
    /// Branch condition.
    pub cond: Cond,
    /// Signed branch displacement in bytes.
    pub offset: i64,
    /// Direction prediction made for the branch at fetch.
    pub pred_taken: bool,
    /// Predicted target carried from fetch.
    pub pred_target: u64,
    /// Whether fetch redirected to `pred_target`.
    pub pred_target_known: bool,
}

/// Entry in the EX/MEM latch.
#[derive(Debug, Clone, Default)]
pub struct ExMemSlot {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Decoded instruction.
    pub inst: Instruction,
    /// ALU result, or the effective address for memory operations.
    pub alu_result: u64,
    /// Updated base register for indexed addressing.
    pub base_result: u64,
    /// Store data (first register).
    pub store_value: u64,
    /// Store data (second register of a pair, or high half of a Q store).
    pub store_value2: u64,
    /// Vector result of a SIMD arithmetic operation.
    pub vec_result: u128,
    /// Whether NZCV must be committed at retirement.
    pub sets_flags: bool,
    /// Flags computed at execute.
    pub nzcv: Pstate,
    /// This slot carries a fused compare+branch pair.
    pub fused: bool,
}

/// Entry in the MEM/WB latch.
#[derive(Debug, Clone, Default)]
pub struct MemWbSlot {
    /// Program counter of the instruction.
    pub pc: u64,
    /// Decoded instruction.
    pub inst: Instruction,
    /// Value for the primary destination (load data or ALU result).
    pub value: u64,
    /// Value for the second destination of a pair load.
    pub value2: u64,
    /// Updated base register for indexed addressing.
    pub base_value: u64,
    /// Vector value for a SIMD destination.
    pub vec_value: u128,
    /// Whether NZCV must be committed at retirement.
    pub sets_flags: bool,
    /// Flags computed at execute.
    pub nzcv: Pstate,
    /// This slot retires as two instructions (fused pair).
    pub fused: bool,
}
