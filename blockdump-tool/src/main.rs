//! blockdump - render a file as block frames, or decode captured frames
//!
//! `emulate` runs the same driver a device runs, against the host file
//! system and an in-memory screen, writing each presented frame as a PPM.
//! `decode` turns captured PPM frames back into bytes. `plan` shows how a
//! file would be split.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use blockdump_core::AdvancePolicy;
use blockdump_tool::{commands, config};

/// Framebuffer data exfiltration tool
#[derive(Parser)]
#[command(name = "blockdump", version, about)]
struct CliArgs {
    /// Configuration file (default: the embedded dump.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render INPUT as frames into an output directory
    Emulate {
        /// File standing in for the device's source file
        input: PathBuf,

        /// Directory for frame images and the progress record
        #[arg(short, long, default_value = "frames")]
        out_dir: PathBuf,

        /// Override the configured advance policy
        #[arg(long)]
        advance: Option<Policy>,
    },

    /// Decode captured frames, in order, into one file
    Decode {
        /// Frame images (binary PPM)
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Block size in pixels (default: from the configuration)
        #[arg(long)]
        block: Option<u16>,
    },

    /// Show the frame geometry and chunk layout for a file
    Plan {
        /// File to plan for
        #[arg(conflicts_with = "len", required_unless_present = "len")]
        input: Option<PathBuf>,

        /// Plan for a length instead of a file
        #[arg(long)]
        len: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    FirstChunkOnly,
    PerBoot,
    Continuous,
}

impl From<Policy> for AdvancePolicy {
    fn from(p: Policy) -> Self {
        match p {
            Policy::FirstChunkOnly => AdvancePolicy::FirstChunkOnly,
            Policy::PerBoot => AdvancePolicy::PerBoot,
            Policy::Continuous => AdvancePolicy::Continuous,
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let mut config = config::load(args.config.as_deref())?;

    match args.command {
        Command::Emulate {
            input,
            out_dir,
            advance,
        } => {
            if let Some(policy) = advance {
                config.dump.advance = policy.into();
            }
            let report = commands::emulate(&config, &input, &out_dir)?;
            tracing::info!(
                "{} frame(s) in {} boot(s), halted with {:?}",
                report.frames.len(),
                report.boots,
                report.halt
            );
            for frame in &report.frames {
                println!("{}", frame.display());
            }
        }

        Command::Decode {
            images,
            output,
            block,
        } => {
            let block = block.unwrap_or(config.dump.geometry.block_size);
            let data = commands::decode(&images, block)?;
            fs::write(&output, &data).with_context(|| format!("writing {}", output.display()))?;
            tracing::info!("Recovered {} bytes into {}", data.len(), output.display());
        }

        Command::Plan { input, len } => {
            let len = match (input, len) {
                (_, Some(len)) => len,
                (Some(path), None) => fs::metadata(&path)
                    .with_context(|| format!("reading {}", path.display()))?
                    .len() as usize,
                (None, None) => 0,
            };
            let summary = commands::plan(&config, len)?;
            let g = &summary.geometry;
            let (sx, sy) = g.start();
            let (ex, ey) = g.end();
            println!(
                "frame ({}, {})..({}, {}), block {} px, {}x{} blocks",
                sx,
                sy,
                ex,
                ey,
                g.block(),
                g.columns(),
                g.rows()
            );
            println!(
                "{} bytes per frame, {} payload",
                g.capacity_bytes(),
                g.framedata_bytes()
            );
            println!("{} bytes -> {} chunk(s)", len, summary.chunks.len());
            for chunk in &summary.chunks {
                println!(
                    "  #{:<4} offset {:>8}  len {:>5}",
                    chunk.index, chunk.offset, chunk.len
                );
            }
        }
    }

    Ok(())
}
