//! Dump state machine
//!
//! The dump is a short, explicit, deterministic sequence of states. The
//! driver performs the work of each state and feeds the outcome back as
//! an event.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{ChunkPos, DumpState, ErrorKind};
