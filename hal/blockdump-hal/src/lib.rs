//! Blockdump Hardware Abstraction Layer
//!
//! This crate defines the capabilities the dump core consumes from the
//! device it runs on. The core never touches raw addresses or GPU command
//! words; a platform crate (or the host emulator) implements these traits
//! and injects them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  blockdump-core (driver, renderer)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  blockdump-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ device GPU /  │       │ blockdump-    │
//! │ BIOS file I/O │       │ display (host)│
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`display::DisplayDevice`] - Solid/textured rectangles, cache flush
//! - [`storage::StorageDevice`] - Named file open/read/write/close
//! - [`console::TextConsole`] - Line-oriented status log

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod console;
pub mod display;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use console::TextConsole;
pub use display::{Color, DisplayDevice, DisplayError, Point, Rect, Size, TexturedRect};
pub use storage::{OpenMode, StorageDevice, StorageError};
