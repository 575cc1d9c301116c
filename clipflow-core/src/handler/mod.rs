//! Commit handler abstraction.
//!
//! A commit handler accepts the flattened buffer, eventually produces a
//! result and hands that result to every callback registered on it. The
//! working buffer bridges handlers to sinks by registering one standing
//! callback per handler.
//!
//! Two shapes ship with the crate:
//! - [`PassThroughHandler`] delivers the text unchanged before `commit`
//!   returns.
//! - [`AsyncProcessingHandler`] spawns one background task per commit that
//!   runs the text through a [`Provider`] and delivers whatever it returns.

mod passthrough;
mod processing;

pub use passthrough::PassThroughHandler;
pub use processing::{AsyncProcessingHandler, ProcessingFailure, Provider};

use crate::callback::{Callback, CallbackRegistry};
use crate::error::BufferResult;
use crate::ids::CommitId;

/// Turns committed text into a result and notifies callbacks.
pub trait CommitHandler: Send + Sync {
    /// Starts dispatch of `text`.
    ///
    /// An `Err` means dispatch could not be started; results that fail
    /// later (asynchronously) are never reported through this return value.
    fn commit(&self, id: CommitId, text: &str) -> BufferResult<()>;

    /// The handler's callback registry.
    fn callbacks(&self) -> &CallbackRegistry;

    /// Registers a callback. Duplicate names are a configuration error.
    fn register_callback(&self, name: &str, callback: Callback) -> BufferResult<()> {
        self.callbacks().register(name, callback)
    }

    fn deregister_callback(&self, name: &str) -> BufferResult<()> {
        self.callbacks().deregister(name)
    }
}
