use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Destination for formatted lines.
///
/// Each line is written and flushed under one lock, so entries from
/// concurrent callers never interleave.
pub struct Output {
    inner: Mutex<Box<dyn Write + Send>>,
}

impl Output {
    /// The default destination.
    pub fn stderr() -> Self {
        Self::from_writer(io::stderr())
    }

    /// Open `path` for appending, creating it if absent.
    pub fn file(path: &Path) -> io::Result<Self> {
        Ok(Self::from_writer(open_append(path)?))
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(Box::new(writer)),
        }
    }

    /// Write one formatted line.
    pub fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut writer = self.lock();
        writer.write_all(line)?;
        writer.flush()
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output").finish_non_exhaustive()
    }
}

/// Open a log file write-only in append mode, creating it if necessary.
pub fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }
    options.open(path)
}

/// In-memory sink, cloneable so a test can keep a handle while the
/// logger owns another.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
