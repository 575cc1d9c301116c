//! Setup and trigger-loop errors.

use clipflow_core::BufferError;
use clipflow_providers::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("key binding for unknown signal: {0}")]
    UnknownBinding(String),

    #[error("trigger token {0:?} is bound to more than one signal")]
    DuplicateToken(String),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
