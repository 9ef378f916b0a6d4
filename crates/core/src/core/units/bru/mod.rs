//! Branch prediction unit (BRU).
//!
//! This module contains the tournament direction predictor (bimodal + gshare
//! with a chooser) and the set-associative Branch Target Buffer the fetch
//! stage consults for targets.

/// Branch Target Buffer storing predicted branch targets.
pub mod btb;

/// Tournament direction predictor.
pub mod tournament;

pub use btb::{Btb, BtbEntry};
pub use tournament::TournamentPredictor;

/// Classification of a branch recorded in the BTB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchKind {
    /// Direction depends on register or flag state (`B.cond`, `CBZ`, `TBZ`...).
    #[default]
    Conditional,
    /// Always taken with a PC-relative target (`B`, `BL`).
    Unconditional,
    /// Always taken with a register target (`BR`, `BLR`, `RET`).
    Indirect,
}

/// The outcome of consulting the predictor at fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prediction {
    /// Predicted direction.
    pub taken: bool,
    /// Predicted target; meaningful only when `target_known`.
    pub target: u64,
    /// True when the BTB supplied a target. A taken prediction without a
    /// known target must not redirect fetch speculatively.
    pub target_known: bool,
}
