//! Program Loading.
//!
//! This module prepares guest programs for simulation. It performs:
//! 1. **Segment placement:** Copies `(virt_addr, bytes, mem_size)` segments
//!    into memory with BSS zero fill, and sets PC and SP.
//! 2. **ELF reading:** Parses AArch64 ELF images into the segment form with
//!    the `object` crate.
//! 3. **File loading:** Reads program images from disk.
//!
//! An external harness may bypass all of this and construct [`Program`]
//! values directly; the simulator only consumes the segment contract.

use std::fs;
use std::io;
use std::path::Path;

use object::{Object, ObjectSegment};

use crate::common::error::LoadError;

/// Default initial stack pointer when the image does not dictate one.
///
/// High in the user half of the address space, 16-byte aligned; the sparse
/// memory maps stack pages on first write.
pub const DEFAULT_STACK_TOP: u64 = 0x7FFF_FFF0_0000;

/// One loadable program segment.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Base virtual address of the segment.
    pub virt_addr: u64,
    /// Initialized bytes from the image.
    pub bytes: Vec<u8>,
    /// Total in-memory size; any excess over `bytes.len()` is zero-filled
    /// BSS.
    pub mem_size: u64,
}

/// A loadable guest program.
#[derive(Debug, Clone)]
pub struct Program {
    /// Initial program counter.
    pub entry_point: u64,
    /// Initial stack pointer.
    pub initial_sp: u64,
    /// Segments to place in memory.
    pub segments: Vec<Segment>,
}

impl Program {
    /// Builds a program from raw segments (the external-loader contract).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::OversizedSegment`] when a segment's initialized
    /// bytes exceed its declared memory size.
    pub fn from_segments(
        entry_point: u64,
        initial_sp: u64,
        segments: Vec<Segment>,
    ) -> Result<Self, LoadError> {
        for segment in &segments {
            if segment.bytes.len() as u64 > segment.mem_size {
                return Err(LoadError::OversizedSegment {
                    vaddr: segment.virt_addr,
                    file_size: segment.bytes.len() as u64,
                    mem_size: segment.mem_size,
                });
            }
        }
        Ok(Self {
            entry_point,
            initial_sp,
            segments,
        })
    }

    /// Parses an AArch64 ELF image into a program.
    ///
    /// Loadable segments, the entry point, and [`DEFAULT_STACK_TOP`] form
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] for malformed images or other architectures.
    pub fn from_elf(data: &[u8]) -> Result<Self, LoadError> {
        let file = object::File::parse(data)?;
        if file.architecture() != object::Architecture::Aarch64 {
            return Err(LoadError::WrongArchitecture(file.architecture()));
        }

        let mut segments = Vec::new();
        for segment in file.segments() {
            let bytes = segment.data()?.to_vec();
            let mem_size = segment.size().max(bytes.len() as u64);
            segments.push(Segment {
                virt_addr: segment.address(),
                bytes,
                mem_size,
            });
        }

        Ok(Self {
            entry_point: file.entry(),
            initial_sp: DEFAULT_STACK_TOP,
            segments,
        })
    }

    /// Convenience constructor for a flat code image at one address.
    ///
    /// Used heavily by tests: the instruction words become a single segment,
    /// the entry point is its base, and the stack pointer starts at zero.
    pub fn from_words(base: u64, words: &[u32]) -> Self {
        let mut bytes = Vec::with_capacity(words.len() * 4);
        for word in words {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        let mem_size = bytes.len() as u64;
        Self {
            entry_point: base,
            initial_sp: 0,
            segments: vec![Segment {
                virt_addr: base,
                bytes,
                mem_size,
            }],
        }
    }
}

/// Reads a program image from disk.
///
/// # Errors
///
/// Propagates the underlying I/O error.
pub fn load_binary(path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
    fs::read(path)
}
