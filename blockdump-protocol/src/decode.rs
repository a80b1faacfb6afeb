//! Frame decoding
//!
//! Inverts the on-screen encoding from a captured image:
//!
//! 1. Locate the border by measuring its dark runs
//! 2. Read the 16-bit length N from the interior origin
//! 3. Read N payload bytes, applying the same row-wrap as the encoder
//! 4. Read the CRC-32 from its fixed anchor
//! 5. Reject the frame if the CRC over the N recovered bytes differs
//!
//! A rejected frame must be discarded and re-captured. The decoder never
//! hands out partially recovered bytes.

use crate::crc::crc32;
use crate::geometry::{FrameGeometry, GeometryError, CHECKSUM_FIELD_BYTES};
use crate::layout::{Cursor, Interior};

/// Captured image the decoder samples
pub trait PixelSource {
    /// Image width in pixels
    fn width(&self) -> u32;

    /// Image height in pixels
    fn height(&self) -> u32;

    /// Whether the pixel at (x, y) reads as a 1 bit
    ///
    /// Coordinates outside the image must read as light.
    fn is_dark(&self, x: u32, y: u32) -> bool;
}

/// Errors that reject a captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// No border found in the image
    BorderNotFound,
    /// Border dimensions are not whole blocks of the expected size
    BlockSizeMismatch,
    /// Measured border does not form a valid frame
    Geometry(GeometryError),
    /// Length field exceeds the frame's payload capacity
    LengthOutOfRange { length: u16, max: u16 },
    /// Output buffer cannot hold the payload
    BufferTooSmall,
    /// Recomputed CRC differs from the checksum field
    ChecksumMismatch { expected: u32, actual: u32 },
}

impl From<GeometryError> for DecodeError {
    fn from(e: GeometryError) -> Self {
        DecodeError::Geometry(e)
    }
}

/// Result of a successful decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedFrame {
    /// Payload length N; the payload is the first N bytes of the output buffer
    pub len: usize,
    /// Verified CRC-32 of the payload
    pub checksum: u32,
}

/// Locate the frame border in `image`
///
/// The first dark pixel in row-major order is taken as the top-left
/// corner of the border; the image must be light everywhere above and to
/// the left of the frame. Width and height come from the dark runs along
/// the top and left bars. Every block of all four bars is then verified.
///
/// `block` is the pinned block size of the protocol.
pub fn locate_frame<P: PixelSource>(image: &P, block: u16) -> Result<FrameGeometry, DecodeError> {
    if block == 0 {
        return Err(DecodeError::Geometry(GeometryError::ZeroBlockSize));
    }

    let (x0, y0) = first_dark(image).ok_or(DecodeError::BorderNotFound)?;

    let mut x1 = x0;
    while x1 < image.width() && image.is_dark(x1, y0) {
        x1 += 1;
    }
    let mut y1 = y0;
    while y1 < image.height() && image.is_dark(x0, y1) {
        y1 += 1;
    }

    let block32 = block as u32;
    if (x1 - x0) % block32 != 0 || (y1 - y0) % block32 != 0 {
        return Err(DecodeError::BlockSizeMismatch);
    }

    let to_u16 = |v: u32| u16::try_from(v).map_err(|_| DecodeError::BorderNotFound);
    let geometry = FrameGeometry::new(to_u16(x0)?, to_u16(y0)?, to_u16(x1)?, to_u16(y1)?, block)?;

    verify_border(image, &geometry)?;
    Ok(geometry)
}

fn first_dark<P: PixelSource>(image: &P) -> Option<(u32, u32)> {
    (0..image.height())
        .flat_map(|y| (0..image.width()).map(move |x| (x, y)))
        .find(|&(x, y)| image.is_dark(x, y))
}

/// Check every border block reads dark
fn verify_border<P: PixelSource>(image: &P, geometry: &FrameGeometry) -> Result<(), DecodeError> {
    let block = geometry.block();
    let (sx, sy) = geometry.start();
    let (ux, uy) = geometry.interior_end();
    let cols = geometry.columns() + 2;
    let rows = geometry.rows() + 2;

    let horizontal = (0..cols).flat_map(|i| {
        let x = sx + i * block;
        [Cursor::at(x, sy), Cursor::at(x, uy)]
    });
    let vertical = (0..rows).flat_map(|i| {
        let y = sy + i * block;
        [Cursor::at(sx, y), Cursor::at(ux, y)]
    });

    for cell in horizontal.chain(vertical) {
        let (cx, cy) = cell.centre(block);
        if !image.is_dark(cx, cy) {
            return Err(DecodeError::BorderNotFound);
        }
    }
    Ok(())
}

/// Read one byte, LSB first, advancing the cursor
fn read_byte<P: PixelSource>(image: &P, cursor: &mut Cursor, interior: &Interior) -> u8 {
    let mut value = 0u8;
    for bit in 0..8 {
        let (x, y) = cursor.centre(interior.block);
        if image.is_dark(x, y) {
            value |= 1 << bit;
        }
        cursor.advance(interior);
    }
    value
}

/// Read the 16-bit length field
///
/// Also returns the cursor just past the field, where the payload starts.
pub fn read_length<P: PixelSource>(image: &P, geometry: &FrameGeometry) -> (u16, Cursor) {
    let interior = geometry.interior();
    let mut cursor = geometry.length_origin();
    let lo = read_byte(image, &mut cursor, &interior);
    let hi = read_byte(image, &mut cursor, &interior);
    (u16::from_le_bytes([lo, hi]), cursor)
}

/// Read the checksum field from its fixed anchor
pub fn read_checksum<P: PixelSource>(image: &P, geometry: &FrameGeometry) -> u32 {
    let interior = geometry.interior();
    let mut cursor = geometry.checksum_origin();
    let mut bytes = [0u8; CHECKSUM_FIELD_BYTES];
    for byte in bytes.iter_mut() {
        *byte = read_byte(image, &mut cursor, &interior);
    }
    u32::from_le_bytes(bytes)
}

/// Decode one frame into `out`
///
/// On success the payload occupies `out[..frame.len]`. On any error the
/// contents of `out` are unspecified and must be discarded.
pub fn decode_frame<P: PixelSource>(
    image: &P,
    geometry: &FrameGeometry,
    out: &mut [u8],
) -> Result<DecodedFrame, DecodeError> {
    let interior = geometry.interior();
    let (length, mut cursor) = read_length(image, geometry);

    let max = geometry.framedata_bytes();
    if length as usize > max {
        return Err(DecodeError::LengthOutOfRange {
            length,
            max: max as u16,
        });
    }

    let payload = out
        .get_mut(..length as usize)
        .ok_or(DecodeError::BufferTooSmall)?;

    // Payload continues from the length field's cursor
    for byte in payload.iter_mut() {
        *byte = read_byte(image, &mut cursor, &interior);
    }

    let expected = read_checksum(image, geometry);
    let actual = crc32(payload);
    if expected != actual {
        return Err(DecodeError::ChecksumMismatch { expected, actual });
    }

    Ok(DecodedFrame {
        len: length as usize,
        checksum: actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::bits_lsb_first;
    use proptest::prelude::*;

    const W: usize = 320;
    const H: usize = 240;

    /// 1-bit test image painted block by block
    struct Bitmap {
        dark: [[bool; W]; H],
    }

    impl Bitmap {
        fn new() -> Self {
            Self {
                dark: [[false; W]; H],
            }
        }

        fn fill(&mut self, x: u16, y: u16, w: u16, h: u16, dark: bool) {
            for row in &mut self.dark[y as usize..(y + h) as usize] {
                for px in &mut row[x as usize..(x + w) as usize] {
                    *px = dark;
                }
            }
        }

        fn write_byte(&mut self, value: u8, cursor: &mut Cursor, interior: &Interior) {
            for bit in bits_lsb_first(value) {
                self.fill(cursor.x, cursor.y, interior.block, interior.block, bit);
                cursor.advance(interior);
            }
        }

        /// Paint a frame the way the renderer does
        fn paint(&mut self, g: &FrameGeometry, payload: &[u8], checksum: u32) {
            let (sx, sy) = g.start();
            let (ux, uy) = g.interior_end();
            let b = g.block();
            self.fill(sx, sy, g.width(), b, true);
            self.fill(sx, uy, g.width(), b, true);
            self.fill(sx, sy, b, g.height(), true);
            self.fill(ux, sy, b, g.height(), true);

            let interior = g.interior();
            let mut cursor = g.length_origin();
            for byte in (payload.len() as u16).to_le_bytes() {
                self.write_byte(byte, &mut cursor, &interior);
            }
            for &byte in payload {
                self.write_byte(byte, &mut cursor, &interior);
            }
            let mut cursor = g.checksum_origin();
            for byte in checksum.to_le_bytes() {
                self.write_byte(byte, &mut cursor, &interior);
            }
        }
    }

    impl PixelSource for Bitmap {
        fn width(&self) -> u32 {
            W as u32
        }

        fn height(&self) -> u32 {
            H as u32
        }

        fn is_dark(&self, x: u32, y: u32) -> bool {
            self.dark
                .get(y as usize)
                .and_then(|row| row.get(x as usize))
                .copied()
                .unwrap_or(false)
        }
    }

    /// 36×20 interior blocks of 4 px: 90 bytes, 84 payload
    fn geometry() -> FrameGeometry {
        FrameGeometry::new(12, 20, 12 + 38 * 4, 20 + 22 * 4, 4).unwrap()
    }

    #[test]
    fn test_locate_frame() {
        let g = geometry();
        let mut image = Bitmap::new();
        image.paint(&g, &[0x41, 0x00], crc32(&[0x41, 0x00]));

        assert_eq!(locate_frame(&image, 4), Ok(g));
    }

    #[test]
    fn test_locate_blank_image() {
        let image = Bitmap::new();
        assert_eq!(locate_frame(&image, 4), Err(DecodeError::BorderNotFound));
    }

    #[test]
    fn test_locate_wrong_block_size() {
        let g = geometry();
        let mut image = Bitmap::new();
        image.paint(&g, &[], crc32(&[]));

        // 152 px wide is not a multiple of 5
        assert_eq!(locate_frame(&image, 5), Err(DecodeError::BlockSizeMismatch));
    }

    #[test]
    fn test_broken_border_rejected() {
        let g = geometry();
        let mut image = Bitmap::new();
        image.paint(&g, &[], crc32(&[]));
        let (ux, _) = g.interior_end();
        image.fill(ux, 60, 4, 4, false);

        assert_eq!(locate_frame(&image, 4), Err(DecodeError::BorderNotFound));
    }

    #[test]
    fn test_decode_two_bytes() {
        let g = geometry();
        let mut image = Bitmap::new();
        image.paint(&g, &[0x41, 0x00], 0xA8BB_6CBB);

        let mut out = [0u8; 128];
        let frame = decode_frame(&image, &g, &mut out).unwrap();
        assert_eq!(frame.len, 2);
        assert_eq!(frame.checksum, 0xA8BB_6CBB);
        assert_eq!(&out[..2], &[0x41, 0x00]);
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let g = geometry();
        let mut image = Bitmap::new();
        image.paint(&g, b"hello", 0xDEAD_BEEF);

        let mut out = [0u8; 128];
        assert_eq!(
            decode_frame(&image, &g, &mut out),
            Err(DecodeError::ChecksumMismatch {
                expected: 0xDEAD_BEEF,
                actual: crc32(b"hello"),
            })
        );
    }

    #[test]
    fn test_garbage_past_length_ignored() {
        let g = geometry();
        let mut image = Bitmap::new();
        image.paint(&g, &[1, 2, 3], crc32(&[1, 2, 3]));

        // Dark blocks on the third row, well past the 40 bits in use
        let (lx, ly) = g.interior_start();
        image.fill(lx, ly + 2 * 4, 20 * 4, 4, true);

        let mut out = [0u8; 128];
        let frame = decode_frame(&image, &g, &mut out).unwrap();
        assert_eq!(&out[..frame.len], &[1, 2, 3]);
    }

    #[test]
    fn test_length_out_of_range() {
        let g = geometry();
        let mut image = Bitmap::new();
        image.paint(&g, &[], 0);
        // Length 0xFFFF: the whole first 16 blocks dark
        let (lx, ly) = g.interior_start();
        image.fill(lx, ly, 16 * 4, 4, true);

        let mut out = [0u8; 128];
        assert_eq!(
            decode_frame(&image, &g, &mut out),
            Err(DecodeError::LengthOutOfRange {
                length: 0xFFFF,
                max: 84
            })
        );
    }

    #[test]
    fn test_output_buffer_too_small() {
        let g = geometry();
        let mut image = Bitmap::new();
        image.paint(&g, &[7; 10], crc32(&[7; 10]));

        let mut out = [0u8; 4];
        assert_eq!(
            decode_frame(&image, &g, &mut out),
            Err(DecodeError::BufferTooSmall)
        );
    }

    #[test]
    fn test_read_fields_directly() {
        let g = geometry();
        let mut image = Bitmap::new();
        image.paint(&g, &[9; 33], 0x0102_0304);

        let (length, cursor) = read_length(&image, &g);
        assert_eq!(length, 33);
        let mut expected = g.length_origin();
        for _ in 0..16 {
            expected.advance(&g.interior());
        }
        assert_eq!(cursor, expected);
        assert_eq!(read_checksum(&image, &g), 0x0102_0304);
    }

    proptest! {
        #[test]
        fn painted_frames_decode(payload in proptest::collection::vec(any::<u8>(), 0..=84)) {
            let g = geometry();
            let mut image = Bitmap::new();
            image.paint(&g, &payload, crc32(&payload));

            let located = locate_frame(&image, 4).unwrap();
            let mut out = [0u8; 84];
            let frame = decode_frame(&image, &located, &mut out).unwrap();
            prop_assert_eq!(&out[..frame.len], payload.as_slice());
        }
    }
}
