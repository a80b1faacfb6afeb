//! Chunk planning
//!
//! Splits a source buffer into frame-sized pieces. The plan is a lazy
//! iterator over `(offset, len)` views; nothing is copied.
//!
//! An empty buffer plans to zero chunks.

use core::ops::Range;

/// One frame's worth of the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Chunk {
    /// Position in the chunk sequence
    pub index: usize,
    /// Byte offset into the source buffer
    pub offset: usize,
    /// Length in bytes (never zero)
    pub len: usize,
}

impl Chunk {
    /// Byte range inside the source buffer
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Borrow this chunk's bytes from `source`
    ///
    /// Returns `None` if `source` is shorter than the planned range.
    pub fn bytes<'a>(&self, source: &'a [u8]) -> Option<&'a [u8]> {
        source.get(self.range())
    }
}

/// Chunk planning errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanError {
    /// Frames hold no payload
    ZeroFrameData,
}

/// Ordered, gapless sequence of chunks covering a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChunkPlan {
    total_len: usize,
    framedata: usize,
    next: usize,
}

impl ChunkPlan {
    /// Plan chunks for a buffer of `total_len` bytes
    pub const fn new(total_len: usize, framedata: usize) -> Result<Self, PlanError> {
        if framedata == 0 {
            return Err(PlanError::ZeroFrameData);
        }
        Ok(Self {
            total_len,
            framedata,
            next: 0,
        })
    }

    /// Total number of chunks
    pub const fn chunk_count(&self) -> usize {
        self.total_len.div_ceil(self.framedata)
    }

    /// Chunk at `index`, if the plan has one
    pub const fn get(&self, index: usize) -> Option<Chunk> {
        if index >= self.chunk_count() {
            return None;
        }
        let offset = index * self.framedata;
        let remaining = self.total_len - offset;
        let len = if remaining > self.framedata {
            self.framedata
        } else {
            remaining
        };
        Some(Chunk { index, offset, len })
    }
}

impl Iterator for ChunkPlan {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let chunk = self.get(self.next)?;
        self.next += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.chunk_count().saturating_sub(self.next);
        (left, Some(left))
    }

    fn nth(&mut self, n: usize) -> Option<Chunk> {
        self.next = self.next.saturating_add(n);
        self.next()
    }
}

impl ExactSizeIterator for ChunkPlan {}

/// Plan chunks covering `buffer`
pub fn plan(buffer: &[u8], framedata: usize) -> Result<ChunkPlan, PlanError> {
    ChunkPlan::new(buffer.len(), framedata)
}
