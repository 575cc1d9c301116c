use super::CommitHandler;
use crate::callback::CallbackRegistry;
use crate::error::{BufferError, BufferResult};
use crate::ids::CommitId;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info_span, Instrument};

const FAILURE_CHANNEL_CAPACITY: usize = 64;

/// External text transformation (translation, for instance) performed on
/// behalf of an [`AsyncProcessingHandler`].
///
/// The handler may call `process` concurrently for overlapping commits. A
/// provider that cannot serve concurrent requests must serialize internally.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short name used in logs and failure reports.
    fn name(&self) -> &str;

    /// Transforms `text`. Retrying and rate limiting are up to the provider.
    async fn process(&self, text: &str) -> BufferResult<String>;
}

/// Report of a commit whose result was discarded because the provider failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingFailure {
    pub commit_id: CommitId,
    pub provider: String,
    pub error: String,
}

/// Runs every commit through a [`Provider`] on a background task.
///
/// - One task is spawned per `commit`; `commit` returns as soon as it is
///   spawned.
/// - Outstanding commits run concurrently. Nothing orders or serializes them,
///   so a later commit's result may be delivered first.
/// - There is no cancellation: once spawned, a task delivers its result to
///   whatever callbacks are registered when it finishes.
/// - A provider error or panic suppresses delivery. The failure is logged
///   and published to [`subscribe_failures`](Self::subscribe_failures)
///   receivers.
pub struct AsyncProcessingHandler {
    provider: Arc<dyn Provider>,
    callbacks: CallbackRegistry,
    runtime: Handle,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    failures: broadcast::Sender<ProcessingFailure>,
}

impl AsyncProcessingHandler {
    /// Creates a handler that spawns its tasks on `runtime`.
    pub fn new(provider: Arc<dyn Provider>, runtime: Handle) -> Self {
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        Self {
            provider,
            callbacks: CallbackRegistry::new(),
            runtime,
            tasks: Mutex::new(Vec::new()),
            failures,
        }
    }

    /// Creates a handler bound to the runtime of the calling context.
    pub fn on_current_runtime(provider: Arc<dyn Provider>) -> BufferResult<Self> {
        let runtime = Handle::try_current().map_err(|e| BufferError::Dispatch(e.to_string()))?;
        Ok(Self::new(provider, runtime))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Subscribes to failures of commits dispatched after this call.
    pub fn subscribe_failures(&self) -> broadcast::Receiver<ProcessingFailure> {
        self.failures.subscribe()
    }

    /// Number of spawned tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.lock_tasks().iter().filter(|t| !t.is_finished()).count()
    }

    /// Waits for every task spawned so far, including tasks spawned while
    /// waiting. Does not cancel anything.
    pub async fn flush(&self) {
        loop {
            let pending = std::mem::take(&mut *self.lock_tasks());
            if pending.is_empty() {
                break;
            }
            for task in pending {
                if let Err(e) = task.await {
                    error!(provider = %self.provider.name(), error = %e, "Processing task lost");
                }
            }
        }
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CommitHandler for AsyncProcessingHandler {
    fn commit(&self, id: CommitId, text: &str) -> BufferResult<()> {
        let provider = Arc::clone(&self.provider);
        let callbacks = self.callbacks.clone();
        let failures = self.failures.clone();
        let text = text.to_string();
        let span = info_span!("process", commit_id = %id, provider = %provider.name());

        debug!(commit_id = %id, provider = %provider.name(), "Async processing dispatched");
        let work = self.runtime.spawn(
            async move {
                match provider.process(&text).await {
                    Ok(result) => {
                        let delivered = callbacks.broadcast(&result);
                        debug!(delivered, "Processed result delivered");
                    }
                    Err(e) => {
                        error!(error = %e, "Provider failed, result discarded");
                        // Errs only when nobody subscribed.
                        let _ = failures.send(ProcessingFailure {
                            commit_id: id,
                            provider: provider.name().to_string(),
                            error: e.to_string(),
                        });
                    }
                }
            }
            .instrument(span),
        );

        // Reports a panicking provider the same way as a failing one.
        let provider_name = self.provider.name().to_string();
        let failures = self.failures.clone();
        let task = self.runtime.spawn(async move {
            if let Err(e) = work.await
                && e.is_panic()
            {
                error!(
                    commit_id = %id,
                    provider = %provider_name,
                    "Provider panicked, result discarded"
                );
                let _ = failures.send(ProcessingFailure {
                    commit_id: id,
                    provider: provider_name,
                    error: "provider panicked".to_string(),
                });
            }
        });

        let mut tasks = self.lock_tasks();
        tasks.retain(|t| !t.is_finished());
        tasks.push(task);
        Ok(())
    }

    fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }
}

impl fmt::Debug for AsyncProcessingHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncProcessingHandler")
            .field("provider", &self.provider.name())
            .field("callbacks", &self.callbacks)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
