//! Host file storage
//!
//! Maps device path names (`cdrom:\DUMP.BIN;1`, `bu00:BLOCKDMP`) onto
//! host files. Unmapped names fail to open, as a missing file would on
//! the device.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use blockdump_hal::{OpenMode, StorageDevice, StorageError};

/// Error code reported for names with no mapping
pub const ENOENT: i32 = 2;

/// `StorageDevice` over the host file system
#[derive(Default)]
pub struct FileStorage {
    paths: HashMap<String, PathBuf>,
    handles: Vec<Option<File>>,
    last_error: i32,
}

impl FileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `device_path` from `host_path`
    pub fn map(&mut self, device_path: &str, host_path: impl Into<PathBuf>) -> &mut Self {
        self.paths.insert(device_path.to_owned(), host_path.into());
        self
    }

    fn record(&mut self, e: &io::Error) {
        self.last_error = e.raw_os_error().unwrap_or(-1);
    }

    fn file(&mut self, handle: usize) -> Option<&mut File> {
        self.handles.get_mut(handle).and_then(Option::as_mut)
    }
}

impl StorageDevice for FileStorage {
    type Handle = usize;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<usize, StorageError> {
        let Some(host) = self.paths.get(path).cloned() else {
            tracing::debug!("open {}: not mapped", path);
            self.last_error = ENOENT;
            return Err(StorageError::Open);
        };
        let result = match mode {
            OpenMode::Read => File::open(&host),
            OpenMode::Write => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&host),
        };
        match result {
            Ok(file) => {
                tracing::debug!("open {} -> {} ({:?})", path, host.display(), mode);
                let slot = self.handles.iter().position(Option::is_none);
                Ok(match slot {
                    Some(slot) => {
                        self.handles[slot] = Some(file);
                        slot
                    }
                    None => {
                        self.handles.push(Some(file));
                        self.handles.len() - 1
                    }
                })
            }
            Err(e) => {
                tracing::debug!("open {} ({}): {}", path, host.display(), e);
                self.record(&e);
                Err(StorageError::Open)
            }
        }
    }

    fn read(&mut self, handle: usize, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let file = self.file(handle).ok_or(StorageError::Read)?;
        match file.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) => {
                self.record(&e);
                Err(StorageError::Read)
            }
        }
    }

    fn write(&mut self, handle: usize, data: &[u8]) -> Result<usize, StorageError> {
        let file = self.file(handle).ok_or(StorageError::Write)?;
        match file.write(data) {
            Ok(n) => Ok(n),
            Err(e) => {
                self.record(&e);
                Err(StorageError::Write)
            }
        }
    }

    fn close(&mut self, handle: usize) {
        if let Some(slot) = self.handles.get_mut(handle) {
            *slot = None;
        }
    }

    fn last_error(&self) -> i32 {
        self.last_error
    }
}
