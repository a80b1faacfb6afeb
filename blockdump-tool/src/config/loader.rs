//! TOML configuration loader

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use blockdump_core::config::DumpConfig;
use blockdump_protocol::FrameGeometry;

/// Embedded default configuration
/// Edit dump.toml and rebuild to customize
pub const EMBEDDED_CONFIG: &str = include_str!("../../dump.toml");

/// Frame image output settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// File name prefix for emulated frames
    pub prefix: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            prefix: "frame".into(),
        }
    }
}

/// Everything the tool reads from TOML
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub dump: DumpConfig,
    pub capture: CaptureConfig,
}

impl ToolConfig {
    /// Validated frame geometry
    pub fn geometry(&self) -> Result<FrameGeometry> {
        self.dump
            .geometry
            .frame_geometry()
            .map_err(|e| anyhow::anyhow!("invalid geometry: {:?}", e))
    }
}

/// Parse and validate a TOML document
pub fn parse(text: &str) -> Result<ToolConfig> {
    let config: ToolConfig = toml::from_str(text).context("parsing configuration")?;
    config.geometry()?;
    Ok(config)
}

/// Load `path`, or the embedded defaults when no path is given
pub fn load(path: Option<&Path>) -> Result<ToolConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config = parse(&text).with_context(|| format!("loading {}", path.display()))?;
            tracing::info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => {
            tracing::debug!("Using embedded configuration");
            parse(EMBEDDED_CONFIG).context("embedded dump.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockdump_core::config::{AdvancePolicy, DEFAULT_GEOMETRY};

    #[test]
    fn test_embedded_matches_defaults() {
        let config = parse(EMBEDDED_CONFIG).unwrap();
        assert_eq!(config.dump.geometry, DEFAULT_GEOMETRY);
        assert_eq!(config.dump.advance, AdvancePolicy::PerBoot);
        assert_eq!(config.dump.source_path.as_str(), "cdrom:\\DUMP.BIN;1");
        assert_eq!(config.capture.prefix, "frame");
        assert_eq!(config.geometry().unwrap().framedata_bytes(), 402);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse(
            r#"
            [dump]
            advance = "continuous"

            [dump.geometry]
            block_size = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.dump.advance, AdvancePolicy::Continuous);
        assert_eq!(config.dump.geometry.block_size, 4);
        assert_eq!(config.dump.geometry.start_x, DEFAULT_GEOMETRY.start_x);
    }

    #[test]
    fn test_bad_geometry_rejected() {
        let err = parse(
            r#"
            [dump.geometry]
            start_x = 10
            max_end_x = 630
            max_end_y = 460
            "#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("CapacityNotByteAligned"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(parse("[dump]\nadvance = \"sometimes\"\n").is_err());
    }
}
