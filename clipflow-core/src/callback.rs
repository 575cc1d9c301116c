//! Named result callbacks and isolated fan-out.

use crate::error::{BufferError, BufferResult};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, warn};

/// Receives the result of a commit.
pub type Callback = Arc<dyn Fn(&str) -> BufferResult<()> + Send + Sync>;

/// A handler's set of named callbacks.
///
/// Clones share the same registry, so a background task can broadcast to
/// the callbacks registered at the moment its result is ready.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: Arc<RwLock<BTreeMap<String, Callback>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` under `name`. Duplicate names are rejected.
    pub fn register(&self, name: impl Into<String>, callback: Callback) -> BufferResult<()> {
        let name = name.into();
        let mut callbacks = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
        if callbacks.contains_key(&name) {
            return Err(BufferError::DuplicateCallback(name));
        }
        callbacks.insert(name, callback);
        Ok(())
    }

    pub fn deregister(&self, name: &str) -> BufferResult<()> {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| BufferError::CallbackNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Invokes every registered callback exactly once with `result`.
    ///
    /// Each invocation is isolated: an error or a panic in one callback is
    /// logged and the remaining callbacks still run. Returns the number of
    /// callbacks that completed successfully.
    pub fn broadcast(&self, result: &str) -> usize {
        // Snapshot so callbacks can (de)register without deadlocking.
        let snapshot: Vec<(String, Callback)> = self
            .read()
            .iter()
            .map(|(name, cb)| (name.clone(), Arc::clone(cb)))
            .collect();

        let mut delivered = 0;
        for (name, callback) in snapshot {
            debug!(callback = %name, "Callback invoked");
            match panic::catch_unwind(AssertUnwindSafe(|| callback(result))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => warn!(callback = %name, error = %e, "Callback failed"),
                Err(_) => error!(callback = %name, "Callback panicked"),
            }
        }
        delivered
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Callback>> {
        self.callbacks.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("names", &self.names())
            .finish()
    }
}
