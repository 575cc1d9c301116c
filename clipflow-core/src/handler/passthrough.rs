use super::CommitHandler;
use crate::callback::CallbackRegistry;
use crate::error::BufferResult;
use crate::ids::CommitId;
use tracing::debug;

/// Delivers committed text unchanged, synchronously.
///
/// Every callback has run by the time [`CommitHandler::commit`] returns.
#[derive(Debug, Default)]
pub struct PassThroughHandler {
    callbacks: CallbackRegistry,
}

impl PassThroughHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommitHandler for PassThroughHandler {
    fn commit(&self, id: CommitId, text: &str) -> BufferResult<()> {
        let delivered = self.callbacks.broadcast(text);
        debug!(commit_id = %id, delivered, "Pass-through commit delivered");
        Ok(())
    }

    fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }
}
