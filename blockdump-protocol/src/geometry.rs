//! Frame geometry
//!
//! Derives the bordered frame, its interior and the byte capacity from a
//! border origin, a maximum extent and the block size. The frame edge is
//! snapped down to a whole number of blocks so the interior is always
//! block-aligned.
//!
//! All validation happens here, at configuration time. Once a
//! [`FrameGeometry`] exists, every chunk that fits `framedata_bytes()` can
//! be drawn without further checks.

use crate::layout::{Cursor, Interior};

/// Length prefix size in bytes
pub const LENGTH_FIELD_BYTES: usize = 2;

/// Checksum field size in bytes
pub const CHECKSUM_FIELD_BYTES: usize = 4;

/// Bytes of each frame not available for payload
pub const RESERVED_BYTES: usize = LENGTH_FIELD_BYTES + CHECKSUM_FIELD_BYTES;

/// Largest chunk the 16-bit length field can describe
pub const MAX_CHUNK_LEN: usize = u16::MAX as usize;

/// Blocks occupied by the checksum field (one row segment)
pub const CHECKSUM_FIELD_BLOCKS: u16 = (CHECKSUM_FIELD_BYTES * 8) as u16;

/// Geometry configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeometryError {
    /// Block size is zero
    ZeroBlockSize,
    /// Extent leaves no interior block inside the border
    FrameTooSmall,
    /// Interior holds fewer than 32 columns, so the checksum anchor falls outside it
    ChecksumRowTooNarrow,
    /// Interior block count is not a multiple of 8
    CapacityNotByteAligned { bits: u32 },
    /// Capacity does not exceed the 6 reserved bytes
    NoRoomForPayload { capacity_bytes: u32 },
    /// Payload capacity does not fit the 16-bit length field
    ChunkLengthOverflow { framedata_bytes: u32 },
    /// Frame extends past the visible screen
    OffScreen,
}

/// Validated geometry of one frame
///
/// Coordinates are in display pixels. `end` is exclusive; the interior is
/// the frame inset by exactly one block on every side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameGeometry {
    start_x: u16,
    start_y: u16,
    end_x: u16,
    end_y: u16,
    block: u16,
}

impl FrameGeometry {
    /// Compute and validate a geometry
    ///
    /// # Arguments
    /// * `start_x`, `start_y` - Top-left corner of the border
    /// * `max_end_x`, `max_end_y` - Furthest the frame may extend (exclusive)
    /// * `block` - Block size in pixels
    pub const fn new(
        start_x: u16,
        start_y: u16,
        max_end_x: u16,
        max_end_y: u16,
        block: u16,
    ) -> Result<Self, GeometryError> {
        if block == 0 {
            return Err(GeometryError::ZeroBlockSize);
        }
        if max_end_x <= start_x || max_end_y <= start_y {
            return Err(GeometryError::FrameTooSmall);
        }

        let end_x = start_x + ((max_end_x - start_x) / block) * block;
        let end_y = start_y + ((max_end_y - start_y) / block) * block;

        // Border on both sides plus at least one interior block
        let blocks_x = (end_x - start_x) / block;
        let blocks_y = (end_y - start_y) / block;
        if blocks_x < 3 || blocks_y < 3 {
            return Err(GeometryError::FrameTooSmall);
        }

        let geometry = Self {
            start_x,
            start_y,
            end_x,
            end_y,
            block,
        };

        if geometry.columns() < CHECKSUM_FIELD_BLOCKS {
            return Err(GeometryError::ChecksumRowTooNarrow);
        }

        let bits = geometry.capacity_bits();
        if bits % 8 != 0 {
            return Err(GeometryError::CapacityNotByteAligned { bits });
        }

        let capacity_bytes = bits / 8;
        if capacity_bytes <= RESERVED_BYTES as u32 {
            return Err(GeometryError::NoRoomForPayload { capacity_bytes });
        }

        let framedata_bytes = capacity_bytes - RESERVED_BYTES as u32;
        if framedata_bytes > MAX_CHUNK_LEN as u32 {
            return Err(GeometryError::ChunkLengthOverflow { framedata_bytes });
        }

        Ok(geometry)
    }

    /// Check the frame fits on a `width`×`height` screen
    pub const fn on_screen(self, width: u16, height: u16) -> Result<Self, GeometryError> {
        if self.end_x > width || self.end_y > height {
            return Err(GeometryError::OffScreen);
        }
        Ok(self)
    }

    /// Block size in pixels
    pub const fn block(&self) -> u16 {
        self.block
    }

    /// Top-left corner of the border
    pub const fn start(&self) -> (u16, u16) {
        (self.start_x, self.start_y)
    }

    /// Bottom-right corner of the border (exclusive)
    pub const fn end(&self) -> (u16, u16) {
        (self.end_x, self.end_y)
    }

    /// Full frame width including border
    pub const fn width(&self) -> u16 {
        self.end_x - self.start_x
    }

    /// Full frame height including border
    pub const fn height(&self) -> u16 {
        self.end_y - self.start_y
    }

    /// Top-left corner of the interior (`ustart`)
    pub const fn interior_start(&self) -> (u16, u16) {
        (self.start_x + self.block, self.start_y + self.block)
    }

    /// Bottom-right corner of the interior, exclusive (`uend`)
    pub const fn interior_end(&self) -> (u16, u16) {
        (self.end_x - self.block, self.end_y - self.block)
    }

    /// Interior bounds for cursor movement
    pub const fn interior(&self) -> Interior {
        let (left, top) = self.interior_start();
        let (right, bottom) = self.interior_end();
        Interior {
            left,
            top,
            right,
            bottom,
            block: self.block,
        }
    }

    /// Interior width in blocks
    pub const fn columns(&self) -> u16 {
        (self.end_x - self.start_x) / self.block - 2
    }

    /// Interior height in blocks
    pub const fn rows(&self) -> u16 {
        (self.end_y - self.start_y) / self.block - 2
    }

    /// Number of bits one frame holds
    pub const fn capacity_bits(&self) -> u32 {
        self.columns() as u32 * self.rows() as u32
    }

    /// Number of bytes one frame holds, including the reserved fields
    pub const fn capacity_bytes(&self) -> u32 {
        self.capacity_bits() / 8
    }

    /// Payload bytes per frame (`framedata`)
    pub const fn framedata_bytes(&self) -> usize {
        self.capacity_bytes() as usize - RESERVED_BYTES
    }

    /// Cursor position where the length field begins
    pub const fn length_origin(&self) -> Cursor {
        let (x, y) = self.interior_start();
        Cursor::at(x, y)
    }

    /// Fixed anchor of the checksum field: last 32 blocks of the last row
    pub const fn checksum_origin(&self) -> Cursor {
        let (right, bottom) = self.interior_end();
        Cursor::at(
            right - CHECKSUM_FIELD_BLOCKS * self.block,
            bottom - self.block,
        )
    }
}
