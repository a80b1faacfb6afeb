//! Frame rendering
//!
//! Lays out one chunk inside the bordered region:
//!
//! 1. Clear the background (optional) and draw the one-block border
//! 2. Length field (2 bytes LE) from the interior origin
//! 3. Payload, continuing from where the length field ended
//! 4. CRC-32 (4 bytes LE) from the fixed anchor on the last row

use blockdump_hal::{Color, DisplayDevice, DisplayError, Rect};
use blockdump_protocol::FrameGeometry;

use crate::serializer::{emit_byte, emit_bytes};

/// Rendering errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError {
    /// Chunk does not fit the frame's payload capacity
    ChunkTooLarge { len: usize, max: usize },
    /// Display rejected a draw call
    Display(DisplayError),
}

impl From<DisplayError> for RenderError {
    fn from(e: DisplayError) -> Self {
        RenderError::Display(e)
    }
}

/// Draws frames for one validated geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameRenderer {
    geometry: FrameGeometry,
    background: Option<Rect>,
}

impl FrameRenderer {
    /// Create a renderer
    ///
    /// - `background`: cleared to white before every frame, if set
    pub const fn new(geometry: FrameGeometry, background: Option<Rect>) -> Self {
        Self {
            geometry,
            background,
        }
    }

    pub const fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Render one chunk with its checksum
    ///
    /// The chunk length is checked before anything is drawn. The display
    /// cache is flushed once the frame is complete.
    pub fn render_frame<D: DisplayDevice + ?Sized>(
        &self,
        display: &mut D,
        chunk: &[u8],
        checksum: u32,
    ) -> Result<(), RenderError> {
        let max = self.geometry.framedata_bytes();
        if chunk.len() > max {
            return Err(RenderError::ChunkTooLarge {
                len: chunk.len(),
                max,
            });
        }
        // framedata never exceeds u16::MAX, so this cannot truncate
        let length = chunk.len() as u16;

        if let Some(background) = self.background {
            display.fill_rect(background, Color::WHITE)?;
        }
        self.draw_border(display)?;

        let interior = self.geometry.interior();

        let mut cursor = self.geometry.length_origin();
        for byte in length.to_le_bytes() {
            emit_byte(display, byte, &mut cursor, &interior)?;
        }
        emit_bytes(display, chunk, &mut cursor, &interior)?;

        let mut cursor = self.geometry.checksum_origin();
        emit_bytes(display, &checksum.to_le_bytes(), &mut cursor, &interior)?;

        display.flush_cache()?;
        Ok(())
    }

    /// Top/bottom bars span the full width, sides the full height
    fn draw_border<D: DisplayDevice + ?Sized>(&self, display: &mut D) -> Result<(), DisplayError> {
        let g = &self.geometry;
        let block = g.block();
        let (sx, sy) = g.start();
        let (ux, uy) = g.interior_end();

        display.fill_rect(Rect::new(sx, sy, g.width(), block), Color::BLACK)?;
        display.fill_rect(Rect::new(sx, uy, g.width(), block), Color::BLACK)?;
        display.fill_rect(Rect::new(sx, sy, block, g.height()), Color::BLACK)?;
        display.fill_rect(Rect::new(ux, sy, block, g.height()), Color::BLACK)?;
        Ok(())
    }
}
