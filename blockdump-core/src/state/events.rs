//! Events that trigger state transitions

use super::machine::ErrorKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Lifecycle
    /// Configuration validated, begin reading
    Start,
    /// Source buffer holds exactly the expected bytes
    SourceLoaded,

    // Planning
    /// Chunks planned; rendering starts at `start` of `count`
    Planned { start: u32, count: u32 },

    // Per-chunk
    /// CRC of the current chunk is ready
    ChecksumComputed,
    /// Current chunk is on screen
    FrameRendered,
    /// External request to move to the next chunk
    Advance,

    // Faults
    /// Unrecoverable error
    Fault(ErrorKind),
}
