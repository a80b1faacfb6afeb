//! Block cursor and row-wrap rule
//!
//! The encoder and the decoder walk the interior with the same cursor, so
//! the bit-to-block mapping is defined exactly once.

/// Drawable bounds inside the border
///
/// `right` and `bottom` are exclusive. The bounds are not validated; a
/// [`crate::FrameGeometry`] always produces consistent ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interior {
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub block: u16,
}

/// Top-left pixel of the block the next bit goes into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
}

impl Cursor {
    pub const fn at(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Step one block to the right, wrapping to the next row at the edge
    ///
    /// There is no check against the bottom edge; the caller bounds the
    /// number of bits per field.
    pub fn advance(&mut self, interior: &Interior) {
        self.x = self.x.saturating_add(interior.block);
        if self.x >= interior.right {
            self.x = interior.left;
            self.y = self.y.saturating_add(interior.block);
        }
    }

    /// Centre pixel of the current block, where a decoder samples
    pub const fn centre(&self, block: u16) -> (u32, u32) {
        let half = (block / 2) as u32;
        (self.x as u32 + half, self.y as u32 + half)
    }
}

/// Bits of `value`, least significant first
pub fn bits_lsb_first(value: u8) -> impl Iterator<Item = bool> {
    (0..8).map(move |bit| (value >> bit) & 1 == 1)
}
