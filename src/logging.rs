//! Run-scoped logging
//!
//! A [`RunLogger`] is an explicitly passed handle to a shared log sink. Every
//! run constructs its own logger (file-backed when results are saved, stderr
//! otherwise), so two runs in the same process never fight over global
//! handler state. Cloning is cheap and clones share the sink.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;

use crate::error::Result;

/// Shared handle to a run's log sink.
///
/// Lines are written as `YYYY-MM-DD HH:MM:SS - message`.
#[derive(Clone)]
pub struct RunLogger {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl RunLogger {
    /// Logger writing to standard error.
    #[must_use]
    pub fn to_stderr() -> Self {
        Self::from_sink(Box::new(io::stderr()))
    }

    /// Logger writing to a fresh file, truncating any existing content.
    pub fn to_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::from_sink(Box::new(file)))
    }

    /// Logger writing into an in-memory buffer, returned alongside the
    /// handle so callers can inspect what was logged.
    #[must_use]
    pub fn in_memory() -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        (Self::from_sink(Box::new(buffer.clone())), buffer)
    }

    fn from_sink(sink: Box<dyn Write + Send>) -> Self {
        Self { sink: Arc::new(Mutex::new(sink)) }
    }

    /// Write one timestamped line. Sink failures are swallowed: logging
    /// must never abort a training run.
    pub fn info(&self, message: impl AsRef<str>) {
        let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(sink, "{stamp} - {}", message.as_ref());
        let _ = sink.flush();
    }
}

impl std::fmt::Debug for RunLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLogger").finish_non_exhaustive()
    }
}

/// Growable in-memory log sink for tests and capture.
#[derive(Clone, Default)]
pub struct LogBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    /// Everything logged so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
