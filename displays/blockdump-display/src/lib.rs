//! Host-side display components for Blockdump
//!
//! This crate provides:
//! - `Canvas`, a 24-bit framebuffer over a caller-owned pixel slice that
//!   implements both `DisplayDevice` (for drawing) and `PixelSource` (for
//!   decoding what was drawn)
//! - `LogConsole`, a fixed-height scrolling log implementing `TextConsole`
//!
//! # Architecture
//!
//! The core crate only knows the hal traits. On a device those are backed
//! by the GPU and BIOS; on a host they are backed by this crate, so the
//! same driver can render into memory and the decoder can read the result
//! back without a camera.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod canvas;
pub mod console;

// Re-export key types
pub use canvas::Canvas;
pub use console::{LogConsole, CONSOLE_LINES};
