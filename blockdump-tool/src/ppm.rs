//! Binary PPM (P6) images
//!
//! Frames leave the emulator as PPM files, and captured frames come back
//! the same way. Only 8-bit channels are supported.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};

use blockdump_display::canvas::is_dark_color;
use blockdump_hal::Color;
use blockdump_protocol::PixelSource;

/// Decoded image, `0xRRGGBB` row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl PixelSource for Image {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_dark(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.pixels
            .get(index)
            .is_some_and(|&p| is_dark_color(Color(p)))
    }
}

/// Encode `width`×`height` pixels as P6
pub fn encode(width: u32, height: u32, pixels: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(20 + pixels.len() * 3);
    // Writing to a Vec cannot fail
    let _ = write!(out, "P6\n{} {}\n255\n", width, height);
    for &p in pixels.iter().take(width as usize * height as usize) {
        let c = Color(p);
        out.extend_from_slice(&[c.r(), c.g(), c.b()]);
    }
    out
}

/// Parse a P6 image
pub fn decode(bytes: &[u8]) -> Result<Image> {
    let mut pos = 0;
    let magic = token(bytes, &mut pos).context("missing magic")?;
    ensure!(magic == b"P6", "not a binary PPM (magic {:?})", String::from_utf8_lossy(magic));

    let width = number(bytes, &mut pos).context("width")?;
    let height = number(bytes, &mut pos).context("height")?;
    let maxval = number(bytes, &mut pos).context("maxval")?;
    if maxval != 255 {
        bail!("unsupported maxval {}", maxval);
    }
    // Exactly one whitespace byte separates the header from the raster
    pos += 1;

    let raster_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .with_context(|| format!("image size {}x{} overflows", width, height))?;
    let end = pos
        .checked_add(raster_len)
        .with_context(|| format!("image size {}x{} overflows", width, height))?;
    let raster = bytes
        .get(pos..end)
        .with_context(|| format!("raster truncated: need {} bytes", raster_len))?;
    let pixels = raster
        .chunks_exact(3)
        .map(|rgb| (rgb[0] as u32) << 16 | (rgb[1] as u32) << 8 | rgb[2] as u32)
        .collect();

    Ok(Image {
        width,
        height,
        pixels,
    })
}

/// Read a P6 image from `path`
pub fn read(path: &Path) -> Result<Image> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    decode(&bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Next whitespace-separated header token, skipping `#` comments
fn token<'b>(bytes: &'b [u8], pos: &mut usize) -> Option<&'b [u8]> {
    loop {
        while bytes.get(*pos)?.is_ascii_whitespace() {
            *pos += 1;
        }
        if bytes[*pos] == b'#' {
            while *bytes.get(*pos)? != b'\n' {
                *pos += 1;
            }
            continue;
        }
        break;
    }
    let start = *pos;
    while bytes.get(*pos).is_some_and(|b| !b.is_ascii_whitespace()) {
        *pos += 1;
    }
    Some(&bytes[start..*pos])
}

fn number(bytes: &[u8], pos: &mut usize) -> Result<u32> {
    let tok = token(bytes, pos).context("header ends early")?;
    std::str::from_utf8(tok)
        .ok()
        .and_then(|s| s.parse().ok())
        .with_context(|| format!("bad header number {:?}", String::from_utf8_lossy(tok)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockdump_display::Canvas;

    #[test]
    fn test_header_with_comment() {
        let mut bytes = b"P6\n# made by hand\n2 1\n255\n".to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
        let image = decode(&bytes).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.pixels, [0x000000, 0xFFFFFF]);
        assert!(image.is_dark(0, 0));
        assert!(!image.is_dark(1, 0));
    }

    #[test]
    fn test_encode_decode_keeps_darkness() {
        let pixels = [0x000000, 0xFFFFFF, 0x202020, 0xE0E0E0, 0x00FF00, 0x0000FF];
        let image = decode(&encode(3, 2, &pixels)).unwrap();
        assert_eq!(image.pixels, pixels);

        let mut copy = pixels;
        let canvas = Canvas::new(&mut copy, 3, 2).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(image.is_dark(x, y), canvas.is_dark(x, y), "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_truncated_raster() {
        let bytes = b"P6 4 4 255\n\x00\x00\x00".to_vec();
        let err = decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("raster truncated"));
    }

    #[test]
    fn test_huge_header_rejected() {
        let err = decode(b"P6 4294967295 4294967295 255\n\0\0\0").unwrap_err();
        let msg = err.to_string();
        assert!(
            msg.contains("overflows") || msg.contains("raster truncated"),
            "{}",
            msg
        );
    }

    #[test]
    fn test_ascii_ppm_rejected() {
        assert!(decode(b"P3\n1 1\n255\n0 0 0\n").is_err());
    }
}
