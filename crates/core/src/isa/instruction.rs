//! The decoded instruction record.
//!
//! This module defines the flat tagged record every A64 word decodes into,
//! plus the bit-extraction helpers shared by the format sub-decoders. The
//! record is deliberately not a type hierarchy: the opcode set is closed and
//! the execute unit matches on it exhaustively.

use crate::isa::opcode::{Arrangement, Cond, Format, IndexMode, Opcode, ShiftKind};

/// Bit mask for a 5-bit register field.
pub const REG_MASK: u32 = 0x1F;

/// Trait for extracting common instruction fields from an encoded word.
///
/// A64 places register fields at fixed positions across most formats; the
/// sub-decoders use these accessors instead of repeating shift/mask pairs.
pub trait InstructionBits {
    /// Extracts the destination register field `Rd`/`Rt` (bits 0-4).
    fn rd(&self) -> u8;

    /// Extracts the first source register field `Rn` (bits 5-9).
    fn rn(&self) -> u8;

    /// Extracts the second source register field `Rm` (bits 16-20).
    fn rm(&self) -> u8;

    /// Extracts the third register field `Ra`/`Rt2` (bits 10-14).
    fn ra(&self) -> u8;

    /// Extracts the width bit `sf` (bit 31).
    fn sf(&self) -> bool;

    /// Extracts an arbitrary bit as a boolean.
    fn bit(&self, n: u32) -> bool;

    /// Extracts a bit field of `len` bits starting at bit `lo`.
    fn field(&self, lo: u32, len: u32) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn rd(&self) -> u8 {
        (self & REG_MASK) as u8
    }

    #[inline(always)]
    fn rn(&self) -> u8 {
        ((self >> 5) & REG_MASK) as u8
    }

    #[inline(always)]
    fn rm(&self) -> u8 {
        ((self >> 16) & REG_MASK) as u8
    }

    #[inline(always)]
    fn ra(&self) -> u8 {
        ((self >> 10) & REG_MASK) as u8
    }

    #[inline(always)]
    fn sf(&self) -> bool {
        (self >> 31) != 0
    }

    #[inline(always)]
    fn bit(&self, n: u32) -> bool {
        (self >> n) & 1 != 0
    }

    #[inline(always)]
    fn field(&self, lo: u32, len: u32) -> u32 {
        (self >> lo) & ((1 << len) - 1)
    }
}

/// A fully decoded A64 instruction.
///
/// One flat record covers every supported format; [`Instruction::format`]
/// says which fields are meaningful. The decoder resolves everything that can
/// be resolved statically: bitmask immediates are expanded, load/store
/// immediates are scaled to bytes, branch offsets are sign-extended byte
/// offsets, and the per-opcode interpretation of register index 31
/// (SP versus ZR) is captured in [`Instruction::rd_is_sp`] and
/// [`Instruction::rn_is_sp`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Instruction {
    /// Operation; `Opcode::Unknown` marks an undecodable word.
    pub opcode: Opcode,
    /// Encoding format, disambiguating the field layout.
    pub format: Format,
    /// True for X-register (64-bit) forms; false for W-register forms.
    pub is_64bit: bool,
    /// True when the instruction updates NZCV.
    pub sets_flags: bool,
    /// Destination register (`Rt` for loads/stores, X30 for `BL`/`BLR`).
    pub rd: u8,
    /// First source register (base register for memory forms, tested
    /// register for compare/test branches).
    pub rn: u8,
    /// Second source register.
    pub rm: u8,
    /// Third register: `Ra` for multiply-add, `Rt2` for pair forms.
    pub ra: u8,
    /// Primary immediate. Bitmask immediates arrive fully expanded;
    /// load/store offsets are in bytes; bitfield forms carry `immr`.
    pub imm: i64,
    /// Secondary immediate: `imms` for bitfields, the tested bit number for
    /// `TBZ`/`TBNZ`, the NZCV field for conditional compares, and the raw
    /// extend option for register-offset and extended-register forms.
    pub imm2: u32,
    /// Shift kind for shifted-register operands and move-wide.
    pub shift: ShiftKind,
    /// Shift amount in bits (hword shift for move-wide, scale for extends).
    pub shift_amount: u8,
    /// Signed branch displacement in bytes, PC-relative.
    pub offset: i64,
    /// Condition code for conditional forms.
    pub cond: Cond,
    /// Base-register writeback mode for indexed loads/stores.
    pub index_mode: IndexMode,
    /// Vector arrangement for SIMD forms.
    pub arrangement: Arrangement,
    /// True for the floating-point SIMD three-same forms.
    pub is_float: bool,
    /// System-register encoding (`o0:op1:CRn:CRm:op2`) for `MRS`.
    pub sysreg: u32,
    /// Register index 31 in `rd` names SP rather than ZR for this opcode.
    pub rd_is_sp: bool,
    /// Register index 31 in `rn` names SP rather than ZR for this opcode.
    pub rn_is_sp: bool,
}

impl Instruction {
    /// Returns an undecodable-instruction record.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// True when the opcode reads memory into a register.
    pub fn is_load(&self) -> bool {
        matches!(
            self.opcode,
            Opcode::Ldr
                | Opcode::Ldrb
                | Opcode::Ldrsb
                | Opcode::Ldrh
                | Opcode::Ldrsh
                | Opcode::Ldrsw
                | Opcode::LdrLiteral
                | Opcode::Ldp
                | Opcode::LdrQ
        )
    }

    /// True when the opcode writes a register to memory.
    pub fn is_store(&self) -> bool {
        matches!(
            self.opcode,
            Opcode::Str | Opcode::Strb | Opcode::Strh | Opcode::Stp | Opcode::StrQ
        )
    }

    /// True when the opcode accesses memory.
    pub fn is_mem(&self) -> bool {
        self.is_load() || self.is_store()
    }

    /// True for every control-transfer opcode.
    pub fn is_branch(&self) -> bool {
        matches!(
            self.opcode,
            Opcode::B
                | Opcode::Bl
                | Opcode::Bcond
                | Opcode::Br
                | Opcode::Blr
                | Opcode::Ret
                | Opcode::Cbz
                | Opcode::Cbnz
                | Opcode::Tbz
                | Opcode::Tbnz
        )
    }

    /// True for branches whose direction depends on register or flag state.
    pub fn is_cond_branch(&self) -> bool {
        matches!(
            self.opcode,
            Opcode::Bcond | Opcode::Cbz | Opcode::Cbnz | Opcode::Tbz | Opcode::Tbnz
        )
    }

    /// True for direct unconditional branches resolved entirely at fetch.
    pub fn is_uncond_direct(&self) -> bool {
        matches!(self.opcode, Opcode::B | Opcode::Bl)
    }

    /// True for indirect branches whose target comes from a register.
    pub fn is_indirect_branch(&self) -> bool {
        matches!(self.opcode, Opcode::Br | Opcode::Blr | Opcode::Ret)
    }

    /// True for system-class instructions that issue alone in the pipeline.
    pub fn is_system(&self) -> bool {
        matches!(self.opcode, Opcode::Svc | Opcode::Brk | Opcode::Mrs)
    }

    /// True for SIMD opcodes (vector arithmetic, `DUP`, and Q loads/stores).
    pub fn is_simd(&self) -> bool {
        matches!(
            self.opcode,
            Opcode::Vadd
                | Opcode::Vsub
                | Opcode::Vmul
                | Opcode::Vfadd
                | Opcode::Vfsub
                | Opcode::Vfmul
                | Opcode::Dup
                | Opcode::LdrQ
                | Opcode::StrQ
        )
    }

    /// True when the instruction writes a general-purpose destination.
    ///
    /// Pair loads additionally write `ra`, and indexed addressing
    /// additionally writes the base register; see [`Self::writes_ra`] and
    /// [`Self::writes_base`].
    pub fn writes_gpr(&self) -> bool {
        match self.opcode {
            // Stores, compare/test branches, plain branches, conditional
            // compares (their low bits are the nzcv field, not a register),
            // and system ops produce no GP result.
            Opcode::Unknown
            | Opcode::Str
            | Opcode::Strb
            | Opcode::Strh
            | Opcode::Stp
            | Opcode::StrQ
            | Opcode::B
            | Opcode::Bcond
            | Opcode::Br
            | Opcode::Ret
            | Opcode::Cbz
            | Opcode::Cbnz
            | Opcode::Tbz
            | Opcode::Tbnz
            | Opcode::Ccmp
            | Opcode::Ccmn
            | Opcode::Svc
            | Opcode::Brk
            | Opcode::Nop => false,
            // Vector-register destinations.
            Opcode::LdrQ
            | Opcode::Vadd
            | Opcode::Vsub
            | Opcode::Vmul
            | Opcode::Vfadd
            | Opcode::Vfsub
            | Opcode::Vfmul
            | Opcode::Dup => false,
            _ => true,
        }
    }

    /// True when the instruction writes a second general register (`Rt2`).
    pub fn writes_ra(&self) -> bool {
        self.opcode == Opcode::Ldp
    }

    /// True when the addressing mode writes the updated base back to `rn`.
    pub fn writes_base(&self) -> bool {
        self.index_mode != IndexMode::None
    }

    /// True when execution reads the NZCV flags.
    pub fn reads_pstate(&self) -> bool {
        matches!(
            self.opcode,
            Opcode::Bcond
                | Opcode::Ccmp
                | Opcode::Ccmn
                | Opcode::Csel
                | Opcode::Csinc
                | Opcode::Csinv
                | Opcode::Csneg
        )
    }

    /// Memory access size in bytes for load/store opcodes, zero otherwise.
    ///
    /// Pair forms report the size of one element; the memory stage issues
    /// two accesses.
    pub fn mem_bytes(&self) -> u64 {
        match self.opcode {
            Opcode::Ldrb | Opcode::Ldrsb | Opcode::Strb => 1,
            Opcode::Ldrh | Opcode::Ldrsh | Opcode::Strh => 2,
            Opcode::Ldrsw => 4,
            Opcode::Ldr | Opcode::Str | Opcode::LdrLiteral | Opcode::Ldp | Opcode::Stp => {
                if self.is_64bit { 8 } else { 4 }
            }
            Opcode::LdrQ | Opcode::StrQ => 16,
            _ => 0,
        }
    }

    /// True for loads whose result is sign-extended to the register width.
    pub fn is_signed_load(&self) -> bool {
        matches!(self.opcode, Opcode::Ldrsb | Opcode::Ldrsh | Opcode::Ldrsw)
    }
}
