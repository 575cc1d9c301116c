//! Output sinks for clipflow.
//!
//! - [`ScreenSink`] prints each result; reverting prints a withdrawal notice
//! - [`FileSink`] appends each result to a file; reverting truncates exactly
//!   the bytes of the most recent append
//!
//! Both lock their medium together with their undo stack, so concurrent
//! deliveries to one sink are serialized and never interleave undo records.

mod file;
mod screen;

pub use file::FileSink;
pub use screen::{ScreenSink, REVERT_NOTICE};
