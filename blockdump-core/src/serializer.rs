//! Bit serializer
//!
//! Draws bytes as runs of solid blocks, least-significant bit first:
//! black for 1, white for 0. The cursor wraps to the start of the next
//! row when it reaches the interior's right edge. Nothing checks the
//! bottom edge; callers never emit more bits than the frame holds.

use blockdump_hal::{Color, DisplayDevice, DisplayError};
use blockdump_protocol::layout::bits_lsb_first;
use blockdump_protocol::{Cursor, Interior};

/// Draw one byte as eight blocks starting at `cursor`
pub fn emit_byte<D: DisplayDevice + ?Sized>(
    display: &mut D,
    value: u8,
    cursor: &mut Cursor,
    interior: &Interior,
) -> Result<(), DisplayError> {
    for bit in bits_lsb_first(value) {
        display.draw_block(cursor.x, cursor.y, interior.block, Color::for_bit(bit))?;
        cursor.advance(interior);
    }
    Ok(())
}

/// Draw a run of bytes in order
pub fn emit_bytes<D: DisplayDevice + ?Sized>(
    display: &mut D,
    bytes: &[u8],
    cursor: &mut Cursor,
    interior: &Interior,
) -> Result<(), DisplayError> {
    for &byte in bytes {
        emit_byte(display, byte, cursor, interior)?;
    }
    Ok(())
}
