//! In-memory framebuffer
//!
//! Pixels are `0xRRGGBB`, row-major, `width` pixels per row.

use blockdump_hal::{Color, DisplayDevice, DisplayError, Rect};
use blockdump_protocol::PixelSource;

/// Luma below this reads as a dark pixel
pub const DARK_THRESHOLD: u32 = 128;

/// Whether `color` reads as a 1 bit
pub fn is_dark_color(color: Color) -> bool {
    let luma = (299 * color.r() as u32 + 587 * color.g() as u32 + 114 * color.b() as u32) / 1000;
    luma < DARK_THRESHOLD
}

/// Framebuffer over a borrowed pixel slice
pub struct Canvas<'a> {
    pixels: &'a mut [u32],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    /// Wrap `pixels` as a `width`×`height` image
    ///
    /// Fails if the slice holds fewer than `width * height` pixels.
    pub fn new(pixels: &'a mut [u32], width: u32, height: u32) -> Result<Self, DisplayError> {
        let needed = (width as usize)
            .checked_mul(height as usize)
            .ok_or(DisplayError::InvalidCoordinates)?;
        if pixels.len() < needed {
            return Err(DisplayError::InvalidCoordinates);
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Image size as (width, height)
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Color at (x, y); outside the image reads white
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.index(x, y)
            .map(|i| Color(self.pixels[i]))
            .unwrap_or(Color::WHITE)
    }

    /// Row-major pixel data
    pub fn pixels(&self) -> &[u32] {
        &self.pixels[..self.width as usize * self.height as usize]
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }
}

impl DisplayDevice for Canvas<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), DisplayError> {
        if rect.right() > self.width || rect.bottom() > self.height {
            return Err(DisplayError::InvalidCoordinates);
        }
        let value = color.0 & 0x00FF_FFFF;
        let width = self.width as usize;
        let (x0, x1) = (rect.pos.x as usize, rect.right() as usize);
        for y in rect.pos.y as usize..rect.bottom() as usize {
            self.pixels[y * width + x0..y * width + x1].fill(value);
        }
        Ok(())
    }
}

impl PixelSource for Canvas<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_dark(&self, x: u32, y: u32) -> bool {
        is_dark_color(self.pixel(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_bounds() {
        let mut pixels = vec![0xFFFFFF; 16 * 8];
        let mut canvas = Canvas::new(&mut pixels, 16, 8).unwrap();

        canvas.fill_rect(Rect::new(2, 1, 4, 3), Color::BLACK).unwrap();
        assert_eq!(canvas.pixel(2, 1), Color::BLACK);
        assert_eq!(canvas.pixel(5, 3), Color::BLACK);
        assert_eq!(canvas.pixel(6, 3), Color::WHITE);
        assert_eq!(canvas.pixel(5, 4), Color::WHITE);

        // Touching the edge is fine, crossing it is not
        assert!(canvas.fill_rect(Rect::new(12, 4, 4, 4), Color::BLACK).is_ok());
        assert_eq!(
            canvas.fill_rect(Rect::new(13, 4, 4, 4), Color::BLACK),
            Err(DisplayError::InvalidCoordinates)
        );
    }

    #[test]
    fn test_short_slice_rejected() {
        let mut pixels = vec![0; 10];
        assert!(Canvas::new(&mut pixels, 4, 3).is_err());
    }

    #[test]
    fn test_darkness_threshold() {
        let mut pixels = vec![0x000000, 0xFFFFFF, 0x303030, 0xC0C0C0];
        let canvas = Canvas::new(&mut pixels, 4, 1).unwrap();

        assert!(canvas.is_dark(0, 0));
        assert!(!canvas.is_dark(1, 0));
        assert!(canvas.is_dark(2, 0));
        assert!(!canvas.is_dark(3, 0));
        // Outside reads light
        assert!(!canvas.is_dark(4, 0));
        assert!(!canvas.is_dark(0, 1));
    }

    #[test]
    fn test_textured_rect_unsupported() {
        let mut pixels = vec![0; 4];
        let mut canvas = Canvas::new(&mut pixels, 2, 2).unwrap();
        assert_eq!(
            canvas.draw_textured_rect(Default::default()),
            Err(DisplayError::Unsupported)
        );
    }
}
