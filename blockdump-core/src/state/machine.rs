//! State machine definition

use super::events::Event;

/// Position within the chunk sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChunkPos {
    /// Zero-based chunk index
    pub index: u32,
    /// Total chunks in the plan
    pub count: u32,
}

impl ChunkPos {
    /// The following position, or `None` after the last chunk
    pub const fn next(self) -> Option<Self> {
        if self.index + 1 < self.count {
            Some(Self {
                index: self.index + 1,
                count: self.count,
            })
        } else {
            None
        }
    }
}

/// Dump states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DumpState {
    /// Nothing done yet; configuration is checked here
    Idle,
    /// Reading the source file into the buffer
    Reading,
    /// Splitting the buffer into chunks
    Planning,
    /// Computing the CRC of a chunk
    Compute(ChunkPos),
    /// Drawing a chunk
    Render(ChunkPos),
    /// Frame is static on screen, waiting for an external advance
    Present(ChunkPos),
    /// Every chunk has been shown (or there were none)
    Done,
    /// Error reported on the console; the device halts
    Failed(ErrorKind),
}

/// Terminal error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Source file could not be opened
    StorageOpenFailed,
    /// Fewer bytes than configured were read
    StorageShortRead,
    /// Geometry or buffer size unusable
    ConfigurationInvalid,
    /// A draw primitive failed
    DisplayFault,
}

impl DumpState {
    /// Check if no further event can leave this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, DumpState::Done | DumpState::Failed(_))
    }

    /// Check if the driver must stop and hand control back to its host
    pub fn is_halted(&self) -> bool {
        self.is_terminal() || matches!(self, DumpState::Present(_))
    }

    /// Process an event and return the next state
    ///
    /// Pairs not listed leave the state unchanged.
    pub fn transition(self, event: Event) -> Self {
        use DumpState::*;
        use Event::*;

        match (self, event) {
            // Idle transitions
            (Idle, Start) => Reading,
            (Idle, Fault(kind)) => Failed(kind),

            // Reading transitions
            (Reading, SourceLoaded) => Planning,
            (Reading, Fault(kind)) => Failed(kind),

            // Planning transitions
            (Planning, Planned { start, count }) => {
                if start < count {
                    Compute(ChunkPos {
                        index: start,
                        count,
                    })
                } else {
                    Done
                }
            }
            (Planning, Fault(kind)) => Failed(kind),

            // Per-chunk transitions
            (Compute(pos), ChecksumComputed) => Render(pos),
            (Compute(_), Fault(kind)) => Failed(kind),
            (Render(pos), FrameRendered) => Present(pos),
            (Render(_), Fault(kind)) => Failed(kind),
            (Present(pos), Advance) => match pos.next() {
                Some(next) => Compute(next),
                None => Done,
            },

            // Default: stay in current state
            _ => self,
        }
    }
}
