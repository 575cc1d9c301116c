//! The working buffer: ingestion, commit dispatch and revert.
//!
//! The buffer is driven from a single foreground path (`&mut self`).
//! Committing hands the flattened text to every registered commit handler
//! and clears the buffer straight away; results come back whenever each
//! handler produces them, through the standing [`RESULT_DELIVERY_CALLBACK`]
//! the buffer installs on every handler, and are appended to every sink.

use crate::callback::Callback;
use crate::error::{BufferError, BufferResult};
use crate::filter::{FilterChain, TextFilter};
use crate::handler::CommitHandler;
use crate::ids::CommitId;
use crate::language::Language;
use crate::signal::Signal;
use crate::sink::Sink;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::{debug, info, info_span, warn};

/// Callback name reserved on every registered commit handler.
pub const RESULT_DELIVERY_CALLBACK: &str = "result-delivery";

type SinkMap = BTreeMap<String, Arc<dyn Sink>>;

/// Whether the buffer holds any fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Empty,
    Accumulating,
}

/// Accumulates filtered fragments and fans committed text out to sinks.
pub struct WorkingBuffer {
    filters: FilterChain,
    fragments: Vec<String>,
    handlers: BTreeMap<String, Arc<dyn CommitHandler>>,
    /// Shared (weakly) with the delivery callbacks.
    sinks: Arc<RwLock<SinkMap>>,
}

impl WorkingBuffer {
    /// Creates a buffer with an empty filter chain.
    pub fn new() -> Self {
        Self::with_filters(FilterChain::new())
    }

    pub fn with_filters(filters: FilterChain) -> Self {
        Self {
            filters,
            fragments: Vec::new(),
            handlers: BTreeMap::new(),
            sinks: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Creates a buffer using the default filter preset for `source`.
    pub fn for_source(source: &Language) -> Self {
        Self::with_filters(FilterChain::for_source(source))
    }

    // ── Filters ──────────────────────────────────────────────────

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    pub fn register_filter(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        filter: impl TextFilter + 'static,
    ) -> BufferResult<()> {
        self.filters.register(name, priority, filter)
    }

    pub fn deregister_filter(&mut self, name: &str) -> BufferResult<()> {
        self.filters.deregister(name)
    }

    // ── Sinks ────────────────────────────────────────────────────

    /// Registers a sink. Results delivered from now on are appended to it.
    pub fn register_sink(
        &mut self,
        name: impl Into<String>,
        sink: Arc<dyn Sink>,
    ) -> BufferResult<()> {
        let name = name.into();
        let mut sinks = self.sinks.write().unwrap_or_else(PoisonError::into_inner);
        if sinks.contains_key(&name) {
            return Err(BufferError::DuplicateSink(name));
        }
        info!(sink = %name, "Sink registered");
        sinks.insert(name, sink);
        Ok(())
    }

    /// Removes a sink and hands it back to the caller.
    pub fn deregister_sink(&mut self, name: &str) -> BufferResult<Arc<dyn Sink>> {
        let sink = self
            .sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .ok_or_else(|| BufferError::SinkNotFound(name.to_string()))?;
        info!(sink = %name, "Sink deregistered");
        Ok(sink)
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    // ── Commit handlers ──────────────────────────────────────────

    /// Registers a commit handler and installs the result-delivery callback
    /// on it.
    ///
    /// Fails if the name is taken, or if the handler already carries a
    /// callback under [`RESULT_DELIVERY_CALLBACK`].
    pub fn register_commit_handler(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn CommitHandler>,
    ) -> BufferResult<()> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(BufferError::DuplicateCommitHandler(name));
        }
        handler.register_callback(RESULT_DELIVERY_CALLBACK, self.delivery_callback(&name))?;
        info!(handler = %name, "Commit handler registered");
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Removes a commit handler and its result-delivery callback.
    ///
    /// Results of commits still in flight on that handler are dropped
    /// instead of reaching the sinks.
    pub fn deregister_commit_handler(
        &mut self,
        name: &str,
    ) -> BufferResult<Arc<dyn CommitHandler>> {
        let handler = self
            .handlers
            .remove(name)
            .ok_or_else(|| BufferError::CommitHandlerNotFound(name.to_string()))?;
        if let Err(e) = handler.deregister_callback(RESULT_DELIVERY_CALLBACK) {
            warn!(handler = %name, error = %e, "Result-delivery callback already gone");
        }
        info!(handler = %name, "Commit handler deregistered");
        Ok(handler)
    }

    pub fn commit_handler_names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    // ── Buffer lifecycle ─────────────────────────────────────────

    /// Filters `raw` and appends it as a new fragment.
    ///
    /// A filter error leaves the buffer untouched.
    pub fn push(&mut self, raw: &str) -> BufferResult<()> {
        let fragment = self.filters.apply(raw)?;
        debug!(len = fragment.len(), "Fragment pushed");
        self.fragments.push(fragment);
        Ok(())
    }

    /// Removes and returns the most recent fragment. No-op when empty.
    pub fn pop(&mut self) -> Option<String> {
        let popped = self.fragments.pop();
        if popped.is_some() {
            debug!(remaining = self.fragments.len(), "Fragment popped");
        }
        popped
    }

    /// Flattens the buffer and dispatches it to every commit handler.
    ///
    /// Returns `Ok(None)` without dispatching when the buffer is empty.
    /// Otherwise the buffer is cleared whatever the outcome, every handler
    /// is dispatched even if another fails, and failed dispatches are
    /// gathered into [`BufferError::Partial`]. Does not wait for
    /// asynchronous handlers.
    pub fn commit(&mut self) -> BufferResult<Option<CommitId>> {
        if self.fragments.is_empty() {
            debug!("Commit on empty buffer ignored");
            return Ok(None);
        }

        let text = std::mem::take(&mut self.fragments).concat();
        let id = CommitId::new();
        let span = info_span!("commit", commit_id = %id);
        let _guard = span.enter();

        let mut failures = Vec::new();
        for (name, handler) in &self.handlers {
            debug!(handler = %name, "Commit handler called");
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.commit(id, &text)))
                .unwrap_or_else(|_| Err(BufferError::Dispatch("commit handler panicked".into())));
            if let Err(e) = outcome {
                warn!(handler = %name, error = %e, "Commit dispatch failed");
                failures.push((name.clone(), e));
            }
        }

        BufferError::collect(self.handlers.len(), failures)?;
        Ok(Some(id))
    }

    /// Undoes the most recent append on every sink.
    ///
    /// Sinks are reverted independently; failures (an empty undo stack
    /// included) are gathered into [`BufferError::Partial`]. The buffer and
    /// in-flight commits are not affected.
    pub fn revert(&self) -> BufferResult<()> {
        let sinks = snapshot(&self.sinks);
        let mut failures = Vec::new();
        for (name, sink) in &sinks {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.revert()))
                .unwrap_or_else(|_| Err(BufferError::Dispatch("sink panicked".into())));
            match outcome {
                Ok(()) => debug!(sink = %name, "Sink reverted"),
                Err(BufferError::NothingToRevert) => {
                    info!(sink = %name, "Nothing to revert");
                    failures.push((name.clone(), BufferError::NothingToRevert));
                }
                Err(e) => {
                    warn!(sink = %name, error = %e, "Sink revert failed");
                    failures.push((name.clone(), e));
                }
            }
        }
        BufferError::collect(sinks.len(), failures)
    }

    /// Runs the action named by `signal`.
    pub fn signal(&mut self, signal: Signal) -> BufferResult<()> {
        debug!(signal = signal.name(), "Signal triggered");
        match signal {
            Signal::Push(text) => self.push(&text),
            Signal::Pop => {
                self.pop();
                Ok(())
            }
            Signal::Commit => self.commit().map(|_| ()),
            Signal::Revert => self.revert(),
        }
    }

    // ── Introspection ────────────────────────────────────────────

    pub fn state(&self) -> BufferState {
        if self.fragments.is_empty() {
            BufferState::Empty
        } else {
            BufferState::Accumulating
        }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Filtered fragments, in push order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// The text a commit would dispatch right now.
    pub fn preview(&self) -> String {
        self.fragments.concat()
    }

    fn delivery_callback(&self, handler: &str) -> Callback {
        let sinks = Arc::downgrade(&self.sinks);
        let handler = handler.to_string();
        Arc::new(move |result: &str| deliver(&sinks, &handler, result))
    }
}

impl Default for WorkingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WorkingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkingBuffer")
            .field("filters", &self.filters)
            .field("fragments", &self.fragments)
            .field("handlers", &self.commit_handler_names())
            .field("sinks", &self.sink_names())
            .finish()
    }
}

fn snapshot(sinks: &RwLock<SinkMap>) -> Vec<(String, Arc<dyn Sink>)> {
    sinks
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .map(|(name, sink)| (name.clone(), Arc::clone(sink)))
        .collect()
}

/// Appends one handler result to every sink registered right now.
fn deliver(sinks: &Weak<RwLock<SinkMap>>, handler: &str, result: &str) -> BufferResult<()> {
    let Some(sinks) = sinks.upgrade() else {
        debug!(handler, "Working buffer dropped, result discarded");
        return Ok(());
    };
    let sinks = snapshot(&sinks);

    let mut failures = Vec::new();
    for (name, sink) in &sinks {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.append(result)))
            .unwrap_or_else(|_| Err(BufferError::Dispatch("sink panicked".into())));
        match outcome {
            Ok(()) => debug!(handler, sink = %name, "Returned data appended"),
            Err(e) => {
                warn!(handler, sink = %name, error = %e, "Sink append failed");
                failures.push((name.clone(), e));
            }
        }
    }
    BufferError::collect(sinks.len(), failures)
}
