//! Build script for blockdump-tool
//!
//! Validates dump.toml at compile time: TOML syntax first, then the
//! frame geometry arithmetic using the same types the tool loads at
//! runtime.

use std::fs;
use std::path::Path;

use blockdump_core::config::DumpConfig;

#[derive(serde::Deserialize)]
struct EmbeddedConfig {
    #[serde(default)]
    dump: DumpConfig,
}

fn main() {
    println!("cargo:rerun-if-changed=dump.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("dump.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Failed to read dump.toml                                 ║\n\
            ║                                                                  ║\n\
            ║  Error: {:<56} ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            e
        ),
    };

    let config: EmbeddedConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid dump.toml                                        ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&e.to_string())
        ),
    };

    let geometry = match config.dump.geometry.frame_geometry() {
        Ok(geometry) => geometry,
        Err(e) => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Unusable frame geometry in dump.toml                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&format!("{:?}", e))
        ),
    };

    if let Some(bg) = config.dump.background {
        let g = &config.dump.geometry;
        if u32::from(bg.x) + u32::from(bg.width) > u32::from(g.screen_width)
            || u32::from(bg.y) + u32::from(bg.height) > u32::from(g.screen_height)
        {
            panic!("dump.toml: [dump.background] extends past the screen");
        }
    }

    println!(
        "cargo:warning=dump.toml validated: {}x{} blocks, {} payload bytes per frame",
        geometry.columns(),
        geometry.rows(),
        geometry.framedata_bytes()
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
