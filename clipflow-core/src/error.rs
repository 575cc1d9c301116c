//! Error types for the buffer engine.

use thiserror::Error;

/// Result type for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur while filtering, dispatching or reverting.
#[derive(Debug, Error)]
pub enum BufferError {
    /// A filter with this name is already registered.
    #[error("duplicate filter name: {0}")]
    DuplicateFilterName(String),

    /// A filter already occupies this priority slot.
    #[error("duplicate filter priority: {0}")]
    DuplicateFilterPriority(i32),

    #[error("filter not found: {0}")]
    FilterNotFound(String),

    /// A filter rejected its input during ingestion.
    #[error("filter '{name}' rejected input: {message}")]
    Filter { name: String, message: String },

    #[error("duplicate sink name: {0}")]
    DuplicateSink(String),

    #[error("sink not found: {0}")]
    SinkNotFound(String),

    #[error("duplicate commit handler name: {0}")]
    DuplicateCommitHandler(String),

    #[error("commit handler not found: {0}")]
    CommitHandlerNotFound(String),

    #[error("duplicate callback name: {0}")]
    DuplicateCallback(String),

    #[error("callback not found: {0}")]
    CallbackNotFound(String),

    /// A commit handler failed to start dispatching.
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    /// The external provider failed to process committed text.
    #[error("processing error: {0}")]
    Processing(String),

    /// A sink was asked to revert with an empty undo stack.
    #[error("nothing to revert")]
    NothingToRevert,

    /// The sink medium no longer ends with the append being undone.
    #[error("undo mismatch: expected medium length {expected}, found {actual}")]
    UndoMismatch { expected: u64, actual: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown signal: {0}")]
    UnknownSignal(String),

    /// One or more targets of a fan-out failed; the others completed.
    #[error("{} of {total} targets failed", .failures.len())]
    Partial {
        total: usize,
        failures: Vec<(String, BufferError)>,
    },
}

impl BufferError {
    /// Whether this error is a configuration (registration) error.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateFilterName(_)
                | Self::DuplicateFilterPriority(_)
                | Self::FilterNotFound(_)
                | Self::DuplicateSink(_)
                | Self::SinkNotFound(_)
                | Self::DuplicateCommitHandler(_)
                | Self::CommitHandlerNotFound(_)
                | Self::DuplicateCallback(_)
                | Self::CallbackNotFound(_)
        )
    }

    /// Whether every failure is an empty undo stack. Such reverts are
    /// expected when nothing was committed since the last revert.
    pub fn is_nothing_to_revert(&self) -> bool {
        match self {
            Self::NothingToRevert => true,
            Self::Partial { failures, .. } => {
                failures.iter().all(|(_, e)| e.is_nothing_to_revert())
            }
            _ => false,
        }
    }

    /// Names of the failed targets of a [`BufferError::Partial`]; empty for
    /// every other variant.
    pub fn failed_targets(&self) -> Vec<&str> {
        match self {
            Self::Partial { failures, .. } => {
                failures.iter().map(|(name, _)| name.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Folds per-target failures of a fan-out into a single result.
    pub(crate) fn collect(total: usize, failures: Vec<(String, BufferError)>) -> BufferResult<()> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Self::Partial { total, failures })
        }
    }
}
