//! Library side of the `clipflow` binary: configuration, trigger parsing and
//! the stdin-driven app loop.

mod app;
mod config;
mod error;
mod triggers;

pub use app::{App, FILE_SINK, SCREEN_SINK};
pub use config::{AppConfig, Args, PASSTHROUGH_PROVIDER};
pub use error::{CliError, CliResult};
pub use triggers::{decode_escapes, Triggers};
