//! Set-Associative Cache Model.
//!
//! This module implements a configurable set-associative cache used to gate
//! the fetch and memory stage latencies. It models hits, misses, and
//! write-back traffic; the actual data lives in the backing [`Memory`] — the
//! cache tracks tags and state only.
//!
//! [`Memory`]: crate::core::memory::Memory

/// Cache replacement policy implementations (LRU, Random).
pub mod policies;

use self::policies::{LruPolicy, RandomPolicy, ReplacementPolicy};
use crate::config::{CacheConfig, EvictionPolicy, WritePolicy};

/// Cache line state: tag, validity, and dirtiness.
#[derive(Debug, Clone, Default)]
struct CacheLine {
    tag: u64,
    valid: bool,
    dirty: bool,
}

/// Result of one cache access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessResult {
    /// True when the line was present.
    pub hit: bool,
    /// Total latency of the access in cycles, including any write-back.
    pub latency: u64,
    /// Base address of a dirty line evicted by this access, if any.
    pub writeback: Option<u64>,
}

/// Set-associative cache with configurable write and eviction policies.
///
/// Fills are line-granular. Under write-back, stores dirty their line and
/// evictions of dirty lines cost an extra next-level transfer, reported
/// through [`AccessResult::writeback`]. Under write-through, stores propagate
/// immediately and lines are never dirty.
#[derive(Debug)]
pub struct Cache {
    lines: Vec<CacheLine>,
    num_sets: usize,
    ways: usize,
    line_bytes: usize,
    write_policy: WritePolicy,
    hit_latency: u64,
    miss_latency: u64,
    policy: Box<dyn ReplacementPolicy>,
}

impl Cache {
    /// Creates a cache from its configuration.
    ///
    /// Degenerate parameters are sanitized rather than rejected: zero sizes
    /// fall back to one line, and the line size is rounded up to a power of
    /// two.
    ///
    /// # Arguments
    ///
    /// * `config` - Size, geometry, policies, and latencies.
    pub fn new(config: &CacheConfig) -> Self {
        let line_bytes = config.line_bytes.max(1).next_power_of_two();
        let ways = config.ways.max(1);
        let num_lines = (config.size_bytes / line_bytes).max(ways);
        let num_sets = (num_lines / ways).max(1);

        let policy: Box<dyn ReplacementPolicy> = match config.eviction {
            EvictionPolicy::Lru => Box::new(LruPolicy::new(num_sets, ways)),
            EvictionPolicy::Random => Box::new(RandomPolicy::new(num_sets, ways)),
        };

        Self {
            lines: vec![CacheLine::default(); num_sets * ways],
            num_sets,
            ways,
            line_bytes,
            write_policy: config.write_policy,
            hit_latency: config.hit_latency,
            miss_latency: config.miss_latency,
            policy,
        }
    }

    /// Line size in bytes (always a power of two).
    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Set index and tag for an address.
    fn locate(&self, addr: u64) -> (usize, u64) {
        let line = (addr as usize) / self.line_bytes;
        (line % self.num_sets, addr / (self.line_bytes * self.num_sets) as u64)
    }

    /// Returns whether the address is currently resident.
    pub fn contains(&self, addr: u64) -> bool {
        let (set, tag) = self.locate(addr);
        let base = set * self.ways;
        self.lines[base..base + self.ways]
            .iter()
            .any(|l| l.valid && l.tag == tag)
    }

    /// Accesses the cache, installing the line on a miss.
    ///
    /// # Arguments
    ///
    /// * `addr` - The accessed byte address.
    /// * `is_write` - True for stores.
    ///
    /// # Returns
    ///
    /// Hit status, total latency (hit latency on a hit; miss latency plus a
    /// second next-level transfer when a dirty victim is written back), and
    /// the evicted dirty line's base address if one was displaced.
    pub fn access(&mut self, addr: u64, is_write: bool) -> AccessResult {
        let (set, tag) = self.locate(addr);
        let base = set * self.ways;
        let write_back = self.write_policy == WritePolicy::WriteBack;

        for way in 0..self.ways {
            let line = &mut self.lines[base + way];
            if line.valid && line.tag == tag {
                if is_write && write_back {
                    line.dirty = true;
                }
                self.policy.update(set, way);
                return AccessResult {
                    hit: true,
                    latency: self.hit_latency,
                    writeback: None,
                };
            }
        }

        // Miss: select a victim and install the line.
        let victim_way = self.policy.get_victim(set);
        let victim = &self.lines[base + victim_way];
        let writeback = if victim.valid && victim.dirty {
            // Reconstruct the victim line's base address from its tag.
            Some(
                (victim.tag * (self.line_bytes * self.num_sets) as u64)
                    + (set * self.line_bytes) as u64,
            )
        } else {
            None
        };

        self.lines[base + victim_way] = CacheLine {
            tag,
            valid: true,
            dirty: is_write && write_back,
        };
        self.policy.update(set, victim_way);

        let latency = self.miss_latency + if writeback.is_some() { self.miss_latency } else { 0 };
        AccessResult {
            hit: false,
            latency,
            writeback,
        }
    }

    /// Invalidates every line, dropping dirty state.
    pub fn flush(&mut self) {
        for line in &mut self.lines {
            line.valid = false;
            line.dirty = false;
        }
    }
}
