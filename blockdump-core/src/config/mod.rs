//! Configuration types
//!
//! Dump configuration, serializable so hosts can load it from TOML and
//! devices can keep it as compiled-in constants.

pub mod types;

pub use types::*;
