//! Blockdump host tool
//!
//! Runs the device-side dump against in-memory collaborators and writes
//! every presented frame as a PPM image, and decodes captured images back
//! into the original bytes.

pub mod commands;
pub mod config;
pub mod console;
pub mod ppm;
pub mod storage;

pub use commands::{decode, emulate, plan, EmulateReport, PlanSummary};
pub use config::ToolConfig;
