//! Tournament Branch Predictor.
//!
//! A hybrid predictor that employs a chooser table to select between a
//! bimodal predictor (indexed by PC) and a gshare predictor (indexed by PC
//! XOR global history). Unconditional direct branches never reach the
//! predictor; the fetch stage resolves them early from the encoded offset.

use super::btb::Btb;
use super::{BranchKind, Prediction};
use crate::config::BranchPredictorConfig;

/// Saturates a 2-bit counter one step toward `taken`.
fn train(counter: &mut u8, taken: bool) {
    if taken {
        if *counter < 3 {
            *counter += 1;
        }
    } else if *counter > 0 {
        *counter -= 1;
    }
}

/// Tournament predictor: bimodal + gshare + chooser, with a BTB for targets.
#[derive(Debug)]
pub struct TournamentPredictor {
    /// Branch Target Buffer.
    btb: Btb,
    /// Bimodal table of 2-bit counters, indexed by PC.
    bimodal: Vec<u8>,
    bimodal_mask: usize,
    /// Gshare table of 2-bit counters, indexed by PC XOR global history.
    gshare: Vec<u8>,
    gshare_mask: usize,
    /// Chooser table of 2-bit counters; >= 2 selects gshare.
    chooser: Vec<u8>,
    chooser_mask: usize,
    /// Global history shift register, newest outcome in the LSB.
    history: u64,
    history_mask: u64,
}

impl TournamentPredictor {
    /// Creates a predictor from the configuration.
    ///
    /// All direction counters start at `initial_counter_value`; the default
    /// of 2 (weakly taken) makes a first-seen loop branch predict taken.
    pub fn new(config: &BranchPredictorConfig) -> Self {
        let bimodal_size = 1 << config.bimodal_bits;
        let gshare_size = 1 << config.gshare_bits;
        let chooser_size = 1 << config.chooser_bits;
        let init = config.initial_counter_value.min(3);

        Self {
            btb: Btb::new(config.btb_size, config.btb_associativity),
            bimodal: vec![init; bimodal_size],
            bimodal_mask: bimodal_size - 1,
            gshare: vec![init; gshare_size],
            gshare_mask: gshare_size - 1,
            chooser: vec![init; chooser_size],
            chooser_mask: chooser_size - 1,
            history: 0,
            history_mask: if config.gshare_history_length >= 64 {
                u64::MAX
            } else {
                (1u64 << config.gshare_history_length) - 1
            },
        }
    }

    /// Bimodal table index for a PC.
    fn bimodal_index(&self, pc: u64) -> usize {
        ((pc >> 2) as usize) & self.bimodal_mask
    }

    /// Gshare table index for a PC under the current global history.
    fn gshare_index(&self, pc: u64) -> usize {
        (((pc >> 2) ^ self.history) as usize) & self.gshare_mask
    }

    /// Chooser table index for a PC.
    fn chooser_index(&self, pc: u64) -> usize {
        ((pc >> 2) as usize) & self.chooser_mask
    }

    /// Direction the tournament currently predicts for a PC.
    fn direction(&self, pc: u64) -> bool {
        let bimodal_taken = self.bimodal[self.bimodal_index(pc)] >= 2;
        let gshare_taken = self.gshare[self.gshare_index(pc)] >= 2;
        if self.chooser[self.chooser_index(pc)] >= 2 {
            gshare_taken
        } else {
            bimodal_taken
        }
    }

    /// Predicts direction and target for a conditional or indirect branch.
    ///
    /// The BTB supplies the target. A taken prediction with a BTB miss
    /// reports `target_known = false`, which suppresses any speculative
    /// redirect at fetch.
    ///
    /// # Arguments
    ///
    /// * `pc` - The branch instruction's PC.
    pub fn predict(&self, pc: u64) -> Prediction {
        let taken = self.direction(pc);
        match self.btb.lookup(pc) {
            Some(entry) => Prediction {
                taken,
                target: entry.target,
                target_known: true,
            },
            None => Prediction {
                taken,
                target: 0,
                target_known: false,
            },
        }
    }

    /// Looks up the BTB alone (for indirect branches, which are always
    /// taken and only need a target).
    pub fn predict_target(&self, pc: u64) -> Option<u64> {
        self.btb.lookup(pc).map(|e| e.target)
    }

    /// Trains the predictor with a resolved branch outcome.
    ///
    /// Both component tables saturate toward the actual direction; the
    /// chooser moves toward whichever component was right when they
    /// disagree; the global history shifts the outcome in; and the BTB entry
    /// is installed or refreshed with the resolved target.
    ///
    /// # Arguments
    ///
    /// * `pc` - The branch instruction's PC.
    /// * `taken` - The resolved direction.
    /// * `target` - The resolved target address.
    /// * `kind` - The branch classification for the BTB.
    pub fn update(&mut self, pc: u64, taken: bool, target: u64, kind: BranchKind) {
        let bimodal_idx = self.bimodal_index(pc);
        let gshare_idx = self.gshare_index(pc);
        let chooser_idx = self.chooser_index(pc);

        let bimodal_was_right = (self.bimodal[bimodal_idx] >= 2) == taken;
        let gshare_was_right = (self.gshare[gshare_idx] >= 2) == taken;
        if bimodal_was_right != gshare_was_right {
            // Chooser trains toward the component that was right:
            // gshare maps to "taken" (counter up), bimodal to "not taken".
            train(&mut self.chooser[chooser_idx], gshare_was_right);
        }

        train(&mut self.bimodal[bimodal_idx], taken);
        train(&mut self.gshare[gshare_idx], taken);

        self.history = ((self.history << 1) | u64::from(taken)) & self.history_mask;
        self.btb.update(pc, target, taken, kind);
    }
}
