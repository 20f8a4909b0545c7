//! In-memory log capture.
//!
//! [`LogSink`] is handed to the tracing subscriber as a writer and read back
//! later, e.g. to email everything a run logged.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

/// Shared, append-only in-memory log buffer.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything captured so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // A poisoned buffer still holds valid bytes
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Writer handle returned by [`LogSink::make_writer`].
pub struct LogSinkWriter {
    sink: LogSink,
}

impl io::Write for LogSinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogSinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogSinkWriter { sink: self.clone() }
    }
}
