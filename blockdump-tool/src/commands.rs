//! Subcommand implementations

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use blockdump_core::{AdvancePolicy, DumpConfig, DumpDriver, Halt};
use blockdump_display::Canvas;
use blockdump_hal::Color;
use blockdump_protocol::{decode_frame, locate_frame, Chunk, ChunkPlan, FrameGeometry};

use crate::config::ToolConfig;
use crate::console::TracingConsole;
use crate::ppm;
use crate::storage::FileStorage;

/// Host file name of the per-boot progress record inside the output directory
pub const PROGRESS_FILE: &str = "progress.bin";

/// Outcome of an emulated dump
#[derive(Debug)]
pub struct EmulateReport {
    /// Frame images in chunk order
    pub frames: Vec<PathBuf>,
    /// Final halt of the last run
    pub halt: Halt,
    /// Number of driver runs (one per boot under `per_boot`)
    pub boots: usize,
}

/// Run the dump of `input` and write each presented frame into `out_dir`
pub fn emulate(config: &ToolConfig, input: &Path, out_dir: &Path) -> Result<EmulateReport> {
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut dump = config.dump.clone();
    if dump.source_len == 0 {
        let len = fs::metadata(input)
            .with_context(|| format!("reading {}", input.display()))?
            .len();
        dump.source_len = u32::try_from(len).context("input larger than 4 GiB")?;
    }
    let geometry = config.geometry()?;
    tracing::info!(
        "Dumping {} ({} bytes) as {}x{} blocks, {} bytes per frame, policy {:?}",
        input.display(),
        dump.source_len,
        geometry.columns(),
        geometry.rows(),
        geometry.framedata_bytes(),
        dump.advance
    );

    let mut storage = FileStorage::new();
    storage
        .map(dump.source_path.as_str(), input)
        .map(dump.progress_path.as_str(), out_dir.join(PROGRESS_FILE));

    let mut session = Session {
        dump,
        out_dir,
        prefix: &config.capture.prefix,
        storage,
        console: TracingConsole::new(),
        frames: Vec::new(),
        boots: 0,
    };
    let halt = match session.dump.advance {
        AdvancePolicy::PerBoot => session.run_boots()?,
        AdvancePolicy::FirstChunkOnly | AdvancePolicy::Continuous => session.run_once()?,
    };

    if let Halt::Failed(kind) = halt {
        let detail = session.console.lines().next_back().unwrap_or("no console output");
        bail!("dump failed: {:?} ({})", kind, detail);
    }
    Ok(EmulateReport {
        frames: session.frames,
        halt,
        boots: session.boots,
    })
}

/// Collaborators shared across emulated boots
struct Session<'p> {
    dump: DumpConfig,
    out_dir: &'p Path,
    prefix: &'p str,
    storage: FileStorage,
    console: TracingConsole,
    frames: Vec<PathBuf>,
    boots: usize,
}

impl Session<'_> {
    fn screen(&self) -> Vec<u32> {
        let g = &self.dump.geometry;
        vec![Color::WHITE.0; g.screen_width as usize * g.screen_height as usize]
    }

    fn canvas<'b>(&self, pixels: &'b mut [u32]) -> Result<Canvas<'b>> {
        let g = &self.dump.geometry;
        Canvas::new(pixels, g.screen_width as u32, g.screen_height as u32)
            .map_err(|e| anyhow!("screen buffer: {:?}", e))
    }

    fn save(&mut self, image: Vec<u8>, chunk: u32, count: u32) -> Result<()> {
        let path = self
            .out_dir
            .join(format!("{}_{:04}.ppm", self.prefix, chunk));
        fs::write(&path, image).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Frame {}/{} -> {}", chunk + 1, count, path.display());
        self.frames.push(path);
        Ok(())
    }

    /// One driver; `continuous` advances in-process
    fn run_once(&mut self) -> Result<Halt> {
        let mut pixels = self.screen();
        let canvas = self.canvas(&mut pixels)?;
        let mut buffer = vec![0u8; self.dump.source_len as usize];
        let continuous = self.dump.advance == AdvancePolicy::Continuous;

        let mut frames = Vec::new();
        let mut driver = DumpDriver::new(
            self.dump.clone(),
            canvas,
            &mut self.storage,
            &mut self.console,
            &mut buffer,
        );
        self.boots += 1;
        let mut halt = driver.run();
        while let Halt::Present { chunk, count } = halt {
            let (w, h) = driver.display().size();
            frames.push((chunk, count, ppm::encode(w, h, driver.display().pixels())));
            if !continuous {
                break;
            }
            halt = driver.advance();
        }
        drop(driver);

        for (chunk, count, image) in frames {
            self.save(image, chunk, count)?;
        }
        Ok(halt)
    }

    /// A fresh driver per boot until the dump reports `Done`
    fn run_boots(&mut self) -> Result<Halt> {
        let mut last_chunk: Option<u32> = None;
        loop {
            let mut pixels = self.screen();
            let canvas = self.canvas(&mut pixels)?;
            let mut buffer = vec![0u8; self.dump.source_len as usize];

            self.boots += 1;
            tracing::debug!("Boot {}", self.boots);
            let mut driver = DumpDriver::new(
                self.dump.clone(),
                canvas,
                &mut self.storage,
                &mut self.console,
                &mut buffer,
            );
            let halt = driver.run();
            let (canvas, _, _) = driver.into_parts();

            match halt {
                Halt::Present { chunk, count } => {
                    if last_chunk.is_some_and(|last| chunk <= last) {
                        bail!("progress record did not advance past chunk {}", chunk);
                    }
                    last_chunk = Some(chunk);
                    let (w, h) = canvas.size();
                    let image = ppm::encode(w, h, canvas.pixels());
                    self.save(image, chunk, count)?;
                }
                other => return Ok(other),
            }
        }
    }
}

/// Decode captured frames in order and concatenate their payloads
///
/// Any rejected frame aborts the decode; it has to be captured again.
pub fn decode(images: &[PathBuf], block: u16) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut frame_buf = Vec::new();
    for path in images {
        let image = ppm::read(path)?;
        let geometry = locate_frame(&image, block)
            .map_err(|e| anyhow!("{}: no frame found: {:?}", path.display(), e))?;
        frame_buf.resize(geometry.framedata_bytes(), 0);
        let frame = decode_frame(&image, &geometry, &mut frame_buf)
            .map_err(|e| anyhow!("{}: frame rejected: {:?}", path.display(), e))?;
        tracing::info!(
            "{}: {} bytes, crc 0x{:08X}",
            path.display(),
            frame.len,
            frame.checksum
        );
        out.extend_from_slice(&frame_buf[..frame.len]);
    }
    Ok(out)
}

/// Geometry and chunk layout for a source of `len` bytes
#[derive(Debug)]
pub struct PlanSummary {
    pub geometry: FrameGeometry,
    pub chunks: Vec<Chunk>,
}

/// Plan the chunks a dump of `len` bytes would show
pub fn plan(config: &ToolConfig, len: usize) -> Result<PlanSummary> {
    let geometry = config.geometry()?;
    let chunks = ChunkPlan::new(len, geometry.framedata_bytes())
        .map_err(|e| anyhow!("planning failed: {:?}", e))?
        .collect();
    Ok(PlanSummary { geometry, chunks })
}
