//! Dump driver
//!
//! Runs the dump state machine against the injected collaborators:
//!
//! ```text
//! Idle ──► Reading ──► Planning ──► Compute ──► Render ──► Present
//!   │         │           │                       │          │ advance
//!   ▼         ▼           ▼                       ▼          ▼
//! Failed    Failed      Done                    Failed    Compute / Done
//! ```
//!
//! The driver never spins. [`DumpDriver::run`] works until the state
//! machine reaches a halting state and returns it as a [`Halt`]; the host
//! decides what halting means (park the CPU, wait for a button, exit).

use core::fmt::{self, Write};

use heapless::String;

use blockdump_hal::console::MAX_LINE_LEN;
use blockdump_hal::{DisplayDevice, DisplayError, StorageDevice, StorageError, TextConsole};
use blockdump_protocol::{crc32, ChunkPlan, GeometryError, PlanError};

use crate::config::{AdvancePolicy, DumpConfig};
use crate::progress::DumpProgress;
use crate::renderer::{FrameRenderer, RenderError};
use crate::state::{ChunkPos, DumpState, ErrorKind, Event};

/// Why the driver stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Halt {
    /// A frame is on screen; `chunk` is zero-based
    Present { chunk: u32, count: u32 },
    /// Nothing left to show
    Done,
    /// Error already reported on the console
    Failed(ErrorKind),
}

/// Errors raised while running a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DumpError {
    /// Geometry configuration rejected
    Config(GeometryError),
    /// Source buffer cannot hold the configured length
    BufferTooSmall { needed: usize, available: usize },
    /// Source file could not be opened
    StorageOpen { code: i32 },
    /// Read ended before the configured length
    ShortRead { expected: usize, got: usize },
    /// Device reported a read error
    StorageRead { code: i32 },
    /// Chunk planning failed
    Plan(PlanError),
    /// Frame could not be drawn
    Render(RenderError),
    /// A chunk was requested before planning
    NotPlanned,
}

impl From<GeometryError> for DumpError {
    fn from(e: GeometryError) -> Self {
        DumpError::Config(e)
    }
}

impl From<PlanError> for DumpError {
    fn from(e: PlanError) -> Self {
        DumpError::Plan(e)
    }
}

impl From<RenderError> for DumpError {
    fn from(e: RenderError) -> Self {
        DumpError::Render(e)
    }
}

impl From<DisplayError> for DumpError {
    fn from(e: DisplayError) -> Self {
        DumpError::Render(RenderError::Display(e))
    }
}

impl DumpError {
    /// Terminal error class for the state machine
    pub fn kind(&self) -> ErrorKind {
        match self {
            DumpError::Config(_)
            | DumpError::BufferTooSmall { .. }
            | DumpError::Plan(_)
            | DumpError::NotPlanned => ErrorKind::ConfigurationInvalid,
            DumpError::StorageOpen { .. } => ErrorKind::StorageOpenFailed,
            DumpError::ShortRead { .. } | DumpError::StorageRead { .. } => {
                ErrorKind::StorageShortRead
            }
            DumpError::Render(RenderError::ChunkTooLarge { .. }) => {
                ErrorKind::ConfigurationInvalid
            }
            DumpError::Render(RenderError::Display(_)) => ErrorKind::DisplayFault,
        }
    }
}

/// Runs one dump from storage to screen
pub struct DumpDriver<'a, D, S, C> {
    config: DumpConfig,
    display: D,
    storage: S,
    console: C,
    buffer: &'a mut [u8],
    state: DumpState,
    renderer: Option<FrameRenderer>,
    plan: Option<ChunkPlan>,
    source_len: usize,
    source_crc: u32,
    checksum: u32,
}

impl<'a, D, S, C> DumpDriver<'a, D, S, C>
where
    D: DisplayDevice,
    S: StorageDevice,
    C: TextConsole,
{
    /// Create a driver in `Idle`
    ///
    /// `buffer` receives the source file and must hold at least
    /// `config.source_len` bytes.
    pub fn new(
        config: DumpConfig,
        display: D,
        storage: S,
        console: C,
        buffer: &'a mut [u8],
    ) -> Self {
        Self {
            config,
            display,
            storage,
            console,
            buffer,
            state: DumpState::Idle,
            renderer: None,
            plan: None,
            source_len: 0,
            source_crc: 0,
            checksum: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> DumpState {
        self.state
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Bytes read from storage (empty until `Reading` has completed)
    pub fn source(&self) -> &[u8] {
        &self.buffer[..self.source_len]
    }

    /// Release the collaborators
    pub fn into_parts(self) -> (D, S, C) {
        (self.display, self.storage, self.console)
    }

    /// Run until the state machine halts
    pub fn run(&mut self) -> Halt {
        while !self.state.is_halted() {
            let event = self.step();
            self.apply(event);
        }
        self.halt()
    }

    /// Show the next chunk
    ///
    /// Only honored under [`AdvancePolicy::Continuous`] while a frame is
    /// presented; otherwise the current halt is returned unchanged.
    pub fn advance(&mut self) -> Halt {
        if self.config.advance == AdvancePolicy::Continuous
            && matches!(self.state, DumpState::Present(_))
        {
            self.apply(Event::Advance);
        }
        self.run()
    }

    fn halt(&self) -> Halt {
        match self.state {
            DumpState::Present(pos) => Halt::Present {
                chunk: pos.index,
                count: pos.count,
            },
            DumpState::Failed(kind) => Halt::Failed(kind),
            _ => Halt::Done,
        }
    }

    fn apply(&mut self, event: Event) {
        let next = self.state.transition(event);
        #[cfg(feature = "defmt")]
        defmt::debug!("{} --{}--> {}", self.state, event, next);
        if next == DumpState::Done && self.state != DumpState::Done {
            say(&mut self.console, format_args!("dump complete"));
        }
        self.state = next;
    }

    /// Perform the work of the current state and report its outcome
    fn step(&mut self) -> Event {
        let result = match self.state {
            DumpState::Idle => self.check_config(),
            DumpState::Reading => self.read_source(),
            DumpState::Planning => self.plan_chunks(),
            DumpState::Compute(pos) => self.compute(pos),
            DumpState::Render(pos) => self.render(pos),
            // Halting states are never stepped
            DumpState::Present(_) | DumpState::Done | DumpState::Failed(_) => return Event::Start,
        };
        match result {
            Ok(event) => event,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("dump failed: {}", e);
                say(&mut self.console, format_args!("error: {:?}", e));
                Event::Fault(e.kind())
            }
        }
    }

    fn check_config(&mut self) -> Result<Event, DumpError> {
        let geometry = self.config.geometry.frame_geometry()?;
        let needed = self.config.source_len as usize;
        if needed > self.buffer.len() {
            return Err(DumpError::BufferTooSmall {
                needed,
                available: self.buffer.len(),
            });
        }
        self.renderer = Some(FrameRenderer::new(geometry, self.config.background_rect()));
        say(
            &mut self.console,
            format_args!(
                "reading {} ({} bytes)",
                self.config.source_path.as_str(),
                needed
            ),
        );
        Ok(Event::Start)
    }

    fn read_source(&mut self) -> Result<Event, DumpError> {
        let expected = self.config.source_len as usize;
        let target = &mut self.buffer[..expected];
        let got = match self.storage.read_file(self.config.source_path.as_str(), target) {
            Ok(got) => got,
            Err(StorageError::Open) => {
                return Err(DumpError::StorageOpen {
                    code: self.storage.last_error(),
                })
            }
            Err(_) => {
                return Err(DumpError::StorageRead {
                    code: self.storage.last_error(),
                })
            }
        };
        if got != expected {
            return Err(DumpError::ShortRead { expected, got });
        }
        self.source_len = got;
        Ok(Event::SourceLoaded)
    }

    fn plan_chunks(&mut self) -> Result<Event, DumpError> {
        let framedata = self
            .renderer
            .as_ref()
            .ok_or(DumpError::NotPlanned)?
            .geometry()
            .framedata_bytes();
        let plan = ChunkPlan::new(self.source_len, framedata)?;
        // source_len came from a u32, so the count fits too
        let count = plan.chunk_count() as u32;
        self.plan = Some(plan);

        let start = match self.config.advance {
            AdvancePolicy::PerBoot => self.resume_index(framedata as u32),
            AdvancePolicy::FirstChunkOnly | AdvancePolicy::Continuous => 0,
        };
        say(
            &mut self.console,
            format_args!("{} chunk(s) of up to {} bytes", count, framedata),
        );
        Ok(Event::Planned { start, count })
    }

    /// Chunk index stored by the previous boot, or 0
    ///
    /// Indices only line up with the plan that produced them, so a record
    /// for another source or frame size starts over.
    fn resume_index(&mut self, framedata: u32) -> u32 {
        self.source_crc = crc32(self.source());
        let len = self.source_len as u32;
        match DumpProgress::load(&mut self.storage, self.config.progress_path.as_str()) {
            Ok(Some(record)) if record.matches(len, self.source_crc, framedata) => {
                record.next_chunk
            }
            Ok(Some(_)) => {
                say(
                    &mut self.console,
                    format_args!("progress belongs to other data or geometry, restarting"),
                );
                0
            }
            Ok(None) => 0,
            Err(e) => {
                say(
                    &mut self.console,
                    format_args!("progress unreadable ({:?}), restarting", e),
                );
                0
            }
        }
    }

    fn compute(&mut self, pos: ChunkPos) -> Result<Event, DumpError> {
        let chunk = chunk_of(self.plan.as_ref(), &self.buffer[..self.source_len], pos)?;
        self.checksum = crc32(chunk);
        // The console shares the screen with the frame, so it goes first
        say(
            &mut self.console,
            format_args!(
                "chunk {}/{}: {} bytes, crc 0x{:08X}",
                pos.index + 1,
                pos.count,
                chunk.len(),
                self.checksum
            ),
        );
        Ok(Event::ChecksumComputed)
    }

    fn render(&mut self, pos: ChunkPos) -> Result<Event, DumpError> {
        let renderer = self.renderer.ok_or(DumpError::NotPlanned)?;
        let chunk = chunk_of(self.plan.as_ref(), &self.buffer[..self.source_len], pos)?;
        renderer.render_frame(&mut self.display, chunk, self.checksum)?;

        if self.config.advance == AdvancePolicy::PerBoot {
            let framedata = renderer.geometry().framedata_bytes() as u32;
            let record = DumpProgress::new(
                self.source_len as u32,
                self.source_crc,
                framedata,
                pos.index + 1,
            );
            if let Err(e) = record.store(&mut self.storage, self.config.progress_path.as_str()) {
                #[cfg(feature = "defmt")]
                defmt::warn!("progress not saved: {}", e);
                say(&mut self.console, format_args!("progress not saved ({:?})", e));
            }
        }
        Ok(Event::FrameRendered)
    }
}

/// Bytes of the chunk at `pos`
fn chunk_of<'b>(
    plan: Option<&ChunkPlan>,
    source: &'b [u8],
    pos: ChunkPos,
) -> Result<&'b [u8], DumpError> {
    plan.and_then(|plan| plan.get(pos.index as usize))
        .and_then(|chunk| chunk.bytes(source))
        .ok_or(DumpError::NotPlanned)
}

/// Write one status line, truncated to the console width
fn say<C: TextConsole>(console: &mut C, args: fmt::Arguments<'_>) {
    let mut line: String<MAX_LINE_LEN> = String::new();
    let _ = line.write_fmt(args);
    console.write_line(line.as_str());
}
