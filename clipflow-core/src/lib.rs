//! Buffer, commit and revert engine for clipflow.
//!
//! Text captured by a trigger source is pushed through an ordered filter
//! chain into a working buffer. Committing flattens the buffer and hands it
//! to every registered commit handler; each handler's result, whenever it is
//! ready, is appended to every registered sink. Reverting undoes the most
//! recent append on every sink.
//!
//! ## Components
//!
//! - **Filter chain**: [`FilterChain`], priority-ordered [`TextFilter`]s
//! - **Working buffer**: [`WorkingBuffer`], the orchestrator
//! - **Commit handlers**: [`CommitHandler`], with [`PassThroughHandler`] and
//!   [`AsyncProcessingHandler`] (backed by a [`Provider`])
//! - **Sinks**: [`Sink`], with an in-memory [`MemorySink`]
//!
//! # Example
//!
//! ```
//! use clipflow_core::{MemorySink, PassThroughHandler, WorkingBuffer};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemorySink::new());
//! let mut buffer = WorkingBuffer::new();
//! buffer.register_sink("memory", sink.clone()).unwrap();
//! buffer
//!     .register_commit_handler("identity", Arc::new(PassThroughHandler::new()))
//!     .unwrap();
//!
//! buffer.push("Hello, ").unwrap();
//! buffer.push("world").unwrap();
//! buffer.commit().unwrap();
//!
//! assert_eq!(sink.entries(), vec!["Hello, world"]);
//! ```

mod buffer;
mod callback;
mod error;
mod filter;
pub mod handler;
mod ids;
mod language;
pub mod presets;
mod signal;
pub mod sink;

pub use buffer::{BufferState, WorkingBuffer, RESULT_DELIVERY_CALLBACK};
pub use callback::{Callback, CallbackRegistry};
pub use error::{BufferError, BufferResult};
pub use filter::{FilterChain, TextFilter};
pub use handler::{
    AsyncProcessingHandler, CommitHandler, PassThroughHandler, ProcessingFailure, Provider,
};
pub use ids::CommitId;
pub use language::Language;
pub use presets::{AppendSpaceFilter, LineBreakFilter, WhitespaceFilter};
pub use signal::Signal;
pub use sink::memory::MemorySink;
pub use sink::Sink;
