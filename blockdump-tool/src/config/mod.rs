//! Configuration loading
//!
//! The tool starts from the `dump.toml` compiled into the binary and
//! replaces it wholesale when `--config` names another file.

pub mod loader;

pub use loader::{load, parse, CaptureConfig, ToolConfig, EMBEDDED_CONFIG};
