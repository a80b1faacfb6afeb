//! Storage abstractions
//!
//! Mirrors the BIOS-style file API the device exposes: open a named file,
//! read or write through a handle, close it, and query a numeric error code
//! for diagnostics.

/// File open mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenMode {
    Read,
    /// Create or truncate
    Write,
}

/// Errors from storage operations
///
/// The variants identify the failed call; the device-specific code is
/// available from [`StorageDevice::last_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// File could not be opened
    Open,
    /// Read failed
    Read,
    /// Write failed
    Write,
    /// Operation not supported by this device
    Unsupported,
}

/// Named-file storage trait
pub trait StorageDevice {
    /// Open file handle
    type Handle: Copy;

    /// Open `path` in the given mode
    fn open(&mut self, path: &str, mode: OpenMode) -> Result<Self::Handle, StorageError>;

    /// Read up to `buffer.len()` bytes
    ///
    /// # Returns
    /// The number of bytes read, which may be short at end of file.
    fn read(&mut self, handle: Self::Handle, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Write `data`, returning the number of bytes written
    fn write(&mut self, _handle: Self::Handle, _data: &[u8]) -> Result<usize, StorageError> {
        Err(StorageError::Unsupported)
    }

    /// Close a handle. Errors on close are not actionable and are ignored.
    fn close(&mut self, handle: Self::Handle);

    /// Device-specific code of the last failed operation
    fn last_error(&self) -> i32;

    /// Read exactly `buffer.len()` bytes from `path`
    ///
    /// Opens, reads and closes. The handle is closed on every path.
    ///
    /// # Returns
    /// The number of bytes actually read. Callers treat any count other
    /// than `buffer.len()` as a short read.
    fn read_file(&mut self, path: &str, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let handle = self.open(path, OpenMode::Read)?;
        let mut filled = 0;
        let result = loop {
            if filled == buffer.len() {
                break Ok(filled);
            }
            match self.read(handle, &mut buffer[filled..]) {
                Ok(0) => break Ok(filled),
                Ok(n) => filled += n,
                Err(e) => break Err(e),
            }
        };
        self.close(handle);
        result
    }

    /// Replace the contents of `path` with `data`
    fn write_file(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let handle = self.open(path, OpenMode::Write)?;
        let mut written = 0;
        let result = loop {
            if written == data.len() {
                break Ok(());
            }
            match self.write(handle, &data[written..]) {
                Ok(0) => break Err(StorageError::Write),
                Ok(n) => written += n,
                Err(e) => break Err(e),
            }
        };
        self.close(handle);
        result
    }
}

impl<T: StorageDevice + ?Sized> StorageDevice for &mut T {
    type Handle = T::Handle;

    fn open(&mut self, path: &str, mode: OpenMode) -> Result<Self::Handle, StorageError> {
        (**self).open(path, mode)
    }

    fn read(&mut self, handle: Self::Handle, buffer: &mut [u8]) -> Result<usize, StorageError> {
        (**self).read(handle, buffer)
    }

    fn write(&mut self, handle: Self::Handle, data: &[u8]) -> Result<usize, StorageError> {
        (**self).write(handle, data)
    }

    fn close(&mut self, handle: Self::Handle) {
        (**self).close(handle)
    }

    fn last_error(&self) -> i32 {
        (**self).last_error()
    }

    fn read_file(&mut self, path: &str, buffer: &mut [u8]) -> Result<usize, StorageError> {
        (**self).read_file(path, buffer)
    }

    fn write_file(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        (**self).write_file(path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves `data` in reads of at most `chunk` bytes
    struct SliceStorage<'a> {
        data: &'a [u8],
        pos: usize,
        chunk: usize,
        open_handles: u8,
        fail_open: bool,
    }

    impl<'a> SliceStorage<'a> {
        fn new(data: &'a [u8], chunk: usize) -> Self {
            Self {
                data,
                pos: 0,
                chunk,
                open_handles: 0,
                fail_open: false,
            }
        }
    }

    impl StorageDevice for SliceStorage<'_> {
        type Handle = u8;

        fn open(&mut self, _path: &str, _mode: OpenMode) -> Result<u8, StorageError> {
            if self.fail_open {
                return Err(StorageError::Open);
            }
            self.open_handles += 1;
            Ok(3)
        }

        fn read(&mut self, _handle: u8, buffer: &mut [u8]) -> Result<usize, StorageError> {
            let n = buffer.len().min(self.chunk).min(self.data.len() - self.pos);
            buffer[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }

        fn close(&mut self, _handle: u8) {
            self.open_handles -= 1;
        }

        fn last_error(&self) -> i32 {
            if self.fail_open {
                -2
            } else {
                0
            }
        }
    }

    #[test]
    fn test_read_file_collects_partial_reads() {
        let data = [1u8, 2, 3, 4, 5, 6, 7];
        let mut storage = SliceStorage::new(&data, 3);
        let mut buf = [0u8; 7];

        assert_eq!(storage.read_file("cdrom:\\DATA.BIN", &mut buf), Ok(7));
        assert_eq!(buf, data);
        assert_eq!(storage.open_handles, 0);
    }

    #[test]
    fn test_read_file_reports_short_count() {
        let data = [9u8; 4];
        let mut storage = SliceStorage::new(&data, 16);
        let mut buf = [0u8; 10];

        assert_eq!(storage.read_file("short", &mut buf), Ok(4));
        assert_eq!(storage.open_handles, 0);
    }

    #[test]
    fn test_open_failure_propagates() {
        let mut storage = SliceStorage::new(&[], 1);
        storage.fail_open = true;
        let mut buf = [0u8; 1];

        assert_eq!(storage.read_file("missing", &mut buf), Err(StorageError::Open));
        assert_eq!(storage.last_error(), -2);
    }

    #[test]
    fn test_write_unsupported_by_default() {
        let mut storage = SliceStorage::new(&[], 1);
        assert_eq!(
            storage.write_file("out", &[1, 2, 3]),
            Err(StorageError::Unsupported)
        );
        assert_eq!(storage.open_handles, 0);
    }

    #[test]
    fn test_borrowed_storage_keeps_whole_file_override() {
        /// Reads whole files in one call and has no handle API
        struct WholeFile;

        impl StorageDevice for WholeFile {
            type Handle = ();

            fn open(&mut self, _path: &str, _mode: OpenMode) -> Result<(), StorageError> {
                Err(StorageError::Unsupported)
            }

            fn read(&mut self, _handle: (), _buffer: &mut [u8]) -> Result<usize, StorageError> {
                Err(StorageError::Unsupported)
            }

            fn close(&mut self, _handle: ()) {}

            fn last_error(&self) -> i32 {
                0
            }

            fn read_file(&mut self, _path: &str, buffer: &mut [u8]) -> Result<usize, StorageError> {
                buffer.fill(0x5A);
                Ok(buffer.len())
            }
        }

        fn read_via<S: StorageDevice>(
            mut storage: S,
            buf: &mut [u8],
        ) -> Result<usize, StorageError> {
            storage.read_file("any", buf)
        }

        let mut device = WholeFile;
        let mut buf = [0u8; 3];
        assert_eq!(read_via(&mut device, &mut buf), Ok(3));
        assert_eq!(buf, [0x5A; 3]);
    }
}
