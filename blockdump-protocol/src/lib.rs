//! Blockdump Frame Protocol
//!
//! This crate defines how a chunk of bytes is laid out as a grid of
//! black/white blocks inside a one-block-thick border, and how an external
//! tool recovers the bytes from a captured image. There is no return
//! channel: every frame carries its own length and checksum.
//!
//! # Frame Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────┐  border, 1 block thick
//! │ LENGTH (16 bits) │ PAYLOAD (N bytes) ...     │
//! │ ... payload wraps at the right edge ...      │
//! │                                              │
//! │                      │ CRC-32 (32 bits)      │  fixed anchor, last row
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Every byte is drawn least-significant bit first, one block per bit,
//! black for 1 and white for 0. Multi-byte fields are little-endian.
//! The checksum field starts at `(uend_x - 32·B, uend_y - B)` no matter
//! how long the payload is, so a decoder can find it without reading N.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod chunk;
pub mod crc;
pub mod decode;
pub mod geometry;
pub mod layout;

pub use chunk::{plan, Chunk, ChunkPlan, PlanError};
pub use crc::{crc32, Crc32};
pub use decode::{decode_frame, locate_frame, DecodeError, DecodedFrame, PixelSource};
pub use geometry::{
    FrameGeometry, GeometryError, CHECKSUM_FIELD_BYTES, LENGTH_FIELD_BYTES, MAX_CHUNK_LEN,
    RESERVED_BYTES,
};
pub use layout::{Cursor, Interior};
