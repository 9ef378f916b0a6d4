//! Branch Target Buffer (BTB).
//!
//! The BTB is a set-associative cache that stores the last known target (and
//! direction and kind) of control-flow instructions, keyed by their PC. It
//! lets the fetch stage redirect to a predicted-taken branch's target before
//! the instruction has even been decoded.

use super::BranchKind;

/// An entry in the Branch Target Buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BtbEntry {
    /// The full PC used to verify the entry matches the requested address.
    tag: u64,
    /// The last resolved target address.
    pub target: u64,
    /// The last resolved direction.
    pub last_taken: bool,
    /// Classification of the branch at this PC.
    pub kind: BranchKind,
    /// Indicates the entry contains valid data.
    valid: bool,
    /// Recency stamp for LRU victim selection within the set.
    lru: u64,
}

/// Set-associative Branch Target Buffer.
#[derive(Debug, Clone)]
pub struct Btb {
    entries: Vec<BtbEntry>,
    num_sets: usize,
    ways: usize,
    tick: u64,
}

impl Btb {
    /// Creates a BTB with the given total entry count and associativity.
    ///
    /// # Arguments
    ///
    /// * `size` - Total number of entries; rounded up to hold at least one set.
    /// * `ways` - Entries per set; clamped to at least 1.
    pub fn new(size: usize, ways: usize) -> Self {
        let ways = ways.max(1);
        let num_sets = (size / ways).max(1);
        Self {
            entries: vec![BtbEntry::default(); num_sets * ways],
            num_sets,
            ways,
            tick: 0,
        }
    }

    /// Set index for a PC. Bits 2 and up, since instructions are 4-aligned.
    fn set_index(&self, pc: u64) -> usize {
        ((pc >> 2) as usize) % self.num_sets
    }

    /// Looks up the entry for a branch PC.
    ///
    /// # Returns
    ///
    /// The matching entry, or `None` when the PC has no valid entry. The
    /// lookup is read-only; recency is only updated by [`Btb::update`].
    pub fn lookup(&self, pc: u64) -> Option<BtbEntry> {
        let base = self.set_index(pc) * self.ways;
        self.entries[base..base + self.ways]
            .iter()
            .find(|e| e.valid && e.tag == pc)
            .copied()
    }

    /// Installs or refreshes the entry for a branch PC.
    ///
    /// An existing entry for the PC is overwritten in place; otherwise the
    /// least recently updated way of the set is the victim.
    ///
    /// # Arguments
    ///
    /// * `pc` - The branch instruction's PC.
    /// * `target` - The resolved target address.
    /// * `taken` - The resolved direction.
    /// * `kind` - The branch classification.
    pub fn update(&mut self, pc: u64, target: u64, taken: bool, kind: BranchKind) {
        self.tick += 1;
        let base = self.set_index(pc) * self.ways;
        let set = &mut self.entries[base..base + self.ways];

        let way = set
            .iter()
            .position(|e| e.valid && e.tag == pc)
            .or_else(|| set.iter().position(|e| !e.valid))
            .unwrap_or_else(|| {
                set.iter()
                    .enumerate()
                    .min_by_key(|(_, e)| e.lru)
                    .map_or(0, |(i, _)| i)
            });

        set[way] = BtbEntry {
            tag: pc,
            target,
            last_taken: taken,
            kind,
            valid: true,
            lru: self.tick,
        };
    }
}
