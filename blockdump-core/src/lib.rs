//! Board-agnostic core logic for the block dumper
//!
//! This crate contains everything between "bytes in a buffer" and "blocks
//! on the screen" that does not depend on a specific device:
//!
//! - Bit serializer (one byte → eight blocks, with row wrap)
//! - Frame renderer (border, length, payload, checksum)
//! - Dump state machine and the driver that runs it
//! - Persisted progress for advancing one chunk per boot
//! - Configuration type definitions
//!
//! Devices are reached only through the `blockdump-hal` traits.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod driver;
pub mod progress;
pub mod renderer;
pub mod serializer;
pub mod state;

pub use config::{AdvancePolicy, DumpConfig, GeometryConfig};
pub use driver::{DumpDriver, DumpError, Halt};
pub use renderer::{FrameRenderer, RenderError};
pub use progress::{DumpProgress, ProgressError};
pub use state::{ChunkPos, DumpState, ErrorKind, Event};
