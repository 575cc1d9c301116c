//! Prints results to a terminal (or any writer).

use clipflow_core::{BufferError, BufferResult, Sink};
use std::io::{self, Stdout, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Prefix of the line printed when an output is withdrawn.
pub const REVERT_NOTICE: &str = "Revert last output";

struct ScreenState<W> {
    out: W,
    shown: Vec<String>,
}

/// Writes every result on its own line.
///
/// Printed text cannot be erased, so a revert prints a notice naming the
/// withdrawn result instead.
pub struct ScreenSink<W = Stdout> {
    state: Mutex<ScreenState<W>>,
}

impl ScreenSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ScreenSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(ScreenState {
                out,
                shown: Vec::new(),
            }),
        }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .out
    }

    fn lock(&self) -> MutexGuard<'_, ScreenState<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Sink for ScreenSink<W> {
    fn append(&self, text: &str) -> BufferResult<()> {
        let mut state = self.lock();
        writeln!(state.out, "{text}")?;
        state.out.flush()?;
        state.shown.push(text.to_string());
        debug!("Sink data");
        Ok(())
    }

    fn revert(&self) -> BufferResult<()> {
        let mut state = self.lock();
        let withdrawn = state.shown.last().cloned().ok_or(BufferError::NothingToRevert)?;
        writeln!(state.out, "{REVERT_NOTICE}: {withdrawn}")?;
        state.out.flush()?;
        // Only a notice that reached the writer withdraws the entry.
        state.shown.pop();
        debug!("Revert data");
        Ok(())
    }

    fn undo_depth(&self) -> usize {
        self.lock().shown.len()
    }
}

impl<W> std::fmt::Debug for ScreenSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenSink").finish_non_exhaustive()
    }
}
