//! Display device abstractions
//!
//! The dump protocol only ever needs solid rectangles in pure black or
//! pure white. Textured rectangles and cache flushes are part of the
//! capability because the text console shares the same GPU.

/// A pixel coordinate in display space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub pos: Point,
    pub size: Size,
}

impl Rect {
    /// Create a rectangle from origin and size
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            pos: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Square of side `size` at (x, y)
    pub const fn square(x: u16, y: u16, size: u16) -> Self {
        Self::new(x, y, size, size)
    }

    /// Exclusive right edge
    pub const fn right(&self) -> u32 {
        self.pos.x as u32 + self.size.width as u32
    }

    /// Exclusive bottom edge
    pub const fn bottom(&self) -> u32 {
        self.pos.y as u32 + self.size.height as u32
    }
}

/// 24-bit RGB color (0xRRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    /// Block color for a single data bit: 1 is black, 0 is white
    pub const fn for_bit(set: bool) -> Self {
        if set {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }
}

/// A rectangle textured from VRAM through a color lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TexturedRect {
    /// Destination on screen
    pub dest: Rect,
    /// Source coordinate inside the current texture page
    pub texcoord: Point,
    /// Location of the CLUT in VRAM
    pub clut: Point,
}

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Rectangle lies (partly) outside the display
    InvalidCoordinates,
    /// GPU did not accept the command
    Communication,
    /// Primitive not available on this display
    Unsupported,
}

/// Display device trait
///
/// Implementations draw into whatever the device scans out. All calls are
/// synchronous; the core draws one frame and then returns control.
pub trait DisplayDevice {
    /// Fill a rectangle with a solid color
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), DisplayError>;

    /// Draw a textured rectangle (used by the text console for glyphs)
    fn draw_textured_rect(&mut self, _rect: TexturedRect) -> Result<(), DisplayError> {
        Err(DisplayError::Unsupported)
    }

    /// Flush the GPU texture cache
    fn flush_cache(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Draw one `size`×`size` solid block with its top-left corner at (x, y)
    fn draw_block(&mut self, x: u16, y: u16, size: u16, color: Color) -> Result<(), DisplayError> {
        self.fill_rect(Rect::square(x, y, size), color)
    }
}

impl<T: DisplayDevice + ?Sized> DisplayDevice for &mut T {
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), DisplayError> {
        (**self).fill_rect(rect, color)
    }

    fn draw_textured_rect(&mut self, rect: TexturedRect) -> Result<(), DisplayError> {
        (**self).draw_textured_rect(rect)
    }

    fn flush_cache(&mut self) -> Result<(), DisplayError> {
        (**self).flush_cache()
    }

    fn draw_block(&mut self, x: u16, y: u16, size: u16, color: Color) -> Result<(), DisplayError> {
        (**self).draw_block(x, y, size, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Device with a native block primitive
    #[derive(Default)]
    struct BlockDevice {
        blocks: usize,
        rects: usize,
    }

    impl DisplayDevice for BlockDevice {
        fn fill_rect(&mut self, _rect: Rect, _color: Color) -> Result<(), DisplayError> {
            self.rects += 1;
            Ok(())
        }

        fn draw_block(
            &mut self,
            _x: u16,
            _y: u16,
            _size: u16,
            _color: Color,
        ) -> Result<(), DisplayError> {
            self.blocks += 1;
            Ok(())
        }
    }

    fn draw_two<D: DisplayDevice>(mut display: D) {
        display.draw_block(0, 0, 8, Color::BLACK).unwrap();
        display.draw_block(8, 0, 8, Color::WHITE).unwrap();
    }

    #[test]
    fn test_borrowed_device_keeps_block_override() {
        let mut device = BlockDevice::default();
        draw_two(&mut device);
        assert_eq!(device.blocks, 2);
        assert_eq!(device.rects, 0);
    }

    #[test]
    fn test_default_block_is_square_fill() {
        struct Rects(Vec<Rect>);
        impl DisplayDevice for Rects {
            fn fill_rect(&mut self, rect: Rect, _color: Color) -> Result<(), DisplayError> {
                self.0.push(rect);
                Ok(())
            }
        }

        let mut device = Rects(Vec::new());
        draw_two(&mut device);
        assert_eq!(device.0, [Rect::square(0, 0, 8), Rect::square(8, 0, 8)]);
    }

    #[test]
    fn test_for_bit() {
        assert_eq!(Color::for_bit(true), Color::BLACK);
        assert_eq!(Color::for_bit(false), Color::WHITE);
    }
}
