//! Configuration type definitions

use heapless::String;
use serde::{Deserialize, Serialize};

use blockdump_hal::Rect;
use blockdump_protocol::{FrameGeometry, GeometryError};

/// Maximum storage path length
pub const MAX_PATH_LEN: usize = 64;

/// Frame placement on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct GeometryConfig {
    /// Border origin X (STARTX)
    pub start_x: u16,
    /// Border origin Y (STARTY)
    pub start_y: u16,
    /// Furthest X the frame may reach (MAXENDX)
    pub max_end_x: u16,
    /// Furthest Y the frame may reach (MAXENDY)
    pub max_end_y: u16,
    /// Block size in pixels
    pub block_size: u16,
    /// Visible screen width
    pub screen_width: u16,
    /// Visible screen height
    pub screen_height: u16,
}

/// Default placement: 512×408 interior on a 640×480 screen
pub const DEFAULT_GEOMETRY: GeometryConfig = GeometryConfig {
    start_x: 56,
    start_y: 52,
    max_end_x: 584,
    max_end_y: 476,
    block_size: 8,
    screen_width: 640,
    screen_height: 480,
};

// The compiled-in geometry must be usable without any runtime check
const _: () = assert!(DEFAULT_GEOMETRY.frame_geometry().is_ok());

impl Default for GeometryConfig {
    fn default() -> Self {
        DEFAULT_GEOMETRY
    }
}

impl GeometryConfig {
    /// Validate and derive the frame geometry
    pub const fn frame_geometry(&self) -> Result<FrameGeometry, GeometryError> {
        match FrameGeometry::new(
            self.start_x,
            self.start_y,
            self.max_end_x,
            self.max_end_y,
            self.block_size,
        ) {
            Ok(geometry) => geometry.on_screen(self.screen_width, self.screen_height),
            Err(e) => Err(e),
        }
    }

    /// The whole visible screen
    pub const fn screen(&self) -> Rect {
        Rect::new(0, 0, self.screen_width, self.screen_height)
    }
}

/// Region cleared to white before each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BackgroundConfig {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl From<BackgroundConfig> for Rect {
    fn from(bg: BackgroundConfig) -> Self {
        Rect::new(bg.x, bg.y, bg.width, bg.height)
    }
}

/// How the dump moves from one chunk to the next
///
/// The device cannot tell when a frame has been captured, so advancing is
/// always driven from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// Render the first chunk and halt; later chunks are never shown
    FirstChunkOnly,
    /// Render one chunk per boot, remembering the next index in storage
    #[default]
    PerBoot,
    /// Host calls `advance()` after each presented frame
    Continuous,
}

/// Dump configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct DumpConfig {
    /// File to dump
    pub source_path: String<MAX_PATH_LEN>,
    /// Exact number of bytes to read from it
    pub source_len: u32,
    /// Frame placement
    pub geometry: GeometryConfig,
    /// Area cleared before drawing (None leaves the screen as is)
    pub background: Option<BackgroundConfig>,
    /// Pacing between frames
    pub advance: AdvancePolicy,
    /// Where `PerBoot` keeps its progress record
    pub progress_path: String<MAX_PATH_LEN>,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            source_path: path("cdrom:\\DUMP.BIN;1"),
            source_len: 0,
            geometry: DEFAULT_GEOMETRY,
            background: Some(BackgroundConfig {
                x: 0,
                y: 0,
                width: DEFAULT_GEOMETRY.screen_width,
                height: DEFAULT_GEOMETRY.screen_height,
            }),
            advance: AdvancePolicy::PerBoot,
            progress_path: path("bu00:BLOCKDMP"),
        }
    }
}

impl DumpConfig {
    /// Background rectangle, if any
    pub fn background_rect(&self) -> Option<Rect> {
        self.background.map(Rect::from)
    }
}

/// Build a path from a literal known to fit
fn path(s: &str) -> String<MAX_PATH_LEN> {
    let mut out = String::new();
    let _ = out.push_str(s);
    out
}
