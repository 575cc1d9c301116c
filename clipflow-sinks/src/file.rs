//! Appends results to a file and undoes appends by truncation.
//!
//! Every append records where it started and how many bytes it wrote, so a
//! revert truncates exactly that append without re-reading the file.

use clipflow_core::{BufferError, BufferResult, Sink};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Byte range written by one append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AppendRecord {
    offset: u64,
    len: u64,
}

impl AppendRecord {
    fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// A sink that persists results to a file, one result per line by default.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    terminator: String,
    /// Guards the file as well as the undo stack.
    undo: Mutex<Vec<AppendRecord>>,
}

impl FileSink {
    /// Creates a sink writing to `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            terminator: "\n".to_string(),
            undo: Mutex::new(Vec::new()),
        }
    }

    /// Sets the text written after every result (a newline by default).
    pub fn with_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AppendRecord>> {
        self.undo.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for FileSink {
    fn append(&self, text: &str) -> BufferResult<()> {
        let mut undo = self.lock();
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let offset = file.metadata()?.len();

        let mut bytes = Vec::with_capacity(text.len() + self.terminator.len());
        bytes.extend_from_slice(text.as_bytes());
        bytes.extend_from_slice(self.terminator.as_bytes());

        if let Err(e) = file.write_all(&bytes).and_then(|()| file.flush()) {
            // Roll back a partial write so the file matches the undo stack.
            if let Err(rollback) = file.set_len(offset) {
                warn!(path = %self.path.display(), error = %rollback, "Partial append left behind");
            }
            return Err(e.into());
        }

        let record = AppendRecord {
            offset,
            len: bytes.len() as u64,
        };
        debug!(path = %self.path.display(), offset, len = record.len, "File sink appended");
        undo.push(record);
        Ok(())
    }

    /// Truncates the file back to where the most recent append started.
    ///
    /// Fails with [`BufferError::UndoMismatch`] (keeping the undo entry) if
    /// the file no longer ends where that append ended, for instance because
    /// something else wrote to it.
    fn revert(&self) -> BufferResult<()> {
        let mut undo = self.lock();
        let record = *undo.last().ok_or(BufferError::NothingToRevert)?;

        let file = OpenOptions::new().write(true).open(&self.path)?;
        let actual = file.metadata()?.len();
        if actual != record.end() {
            return Err(BufferError::UndoMismatch {
                expected: record.end(),
                actual,
            });
        }

        file.set_len(record.offset)?;
        undo.pop();
        debug!(path = %self.path.display(), offset = record.offset, "File sink reverted");
        Ok(())
    }

    fn undo_depth(&self) -> usize {
        self.lock().len()
    }
}
