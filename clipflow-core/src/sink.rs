//! Output sink abstraction.
//!
//! Sinks record delivered results and can undo their most recent record.
//! Every sink keeps its own LIFO undo stack; reverting one sink never
//! touches another.
//!
//! Sinks are shared with background delivery tasks, so both operations take
//! `&self`. Implementations guard their medium and their undo stack with a
//! single lock, making each append (write + undo record) and each revert
//! (pop + reverse) atomic per sink.

use crate::error::BufferResult;

/// An append/undo output target.
pub trait Sink: Send + Sync {
    /// Records `text` and pushes an undo entry that reverses exactly this append.
    fn append(&self, text: &str) -> BufferResult<()>;

    /// Reverses the most recent append.
    ///
    /// Returns [`BufferError::NothingToRevert`](crate::BufferError::NothingToRevert)
    /// when the undo stack is empty.
    fn revert(&self) -> BufferResult<()>;

    /// Number of appends that can still be reverted.
    fn undo_depth(&self) -> usize;
}

/// An in-memory sink.
pub mod memory {
    use super::*;
    use crate::error::BufferError;
    use std::sync::{Mutex, PoisonError};

    #[derive(Debug, Default)]
    struct MemoryState {
        entries: Vec<String>,
        appended: usize,
        reverted: usize,
    }

    /// Keeps every delivered result in memory; reverting drops the newest.
    #[derive(Debug, Default)]
    pub struct MemorySink {
        state: Mutex<MemoryState>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Current (non-reverted) entries, oldest first.
        pub fn entries(&self) -> Vec<String> {
            self.lock().entries.clone()
        }

        /// The most recent non-reverted entry.
        pub fn last(&self) -> Option<String> {
            self.lock().entries.last().cloned()
        }

        /// Total appends received, including reverted ones.
        pub fn append_count(&self) -> usize {
            self.lock().appended
        }

        /// Total successful reverts.
        pub fn revert_count(&self) -> usize {
            self.lock().reverted
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl Sink for MemorySink {
        fn append(&self, text: &str) -> BufferResult<()> {
            let mut state = self.lock();
            state.entries.push(text.to_string());
            state.appended += 1;
            Ok(())
        }

        fn revert(&self) -> BufferResult<()> {
            let mut state = self.lock();
            state.entries.pop().ok_or(BufferError::NothingToRevert)?;
            state.reverted += 1;
            Ok(())
        }

        fn undo_depth(&self) -> usize {
            self.lock().entries.len()
        }
    }
}
