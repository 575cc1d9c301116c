//! Wires a configured working buffer to its sinks and handler, and runs the
//! trigger loop.

use crate::config::{AppConfig, PASSTHROUGH_PROVIDER};
use crate::error::CliResult;
use crate::triggers::Triggers;
use clipflow_core::{
    AsyncProcessingHandler, BufferError, BufferResult, CommitHandler, PassThroughHandler, Signal,
    WorkingBuffer,
};
use clipflow_providers::{HttpTranslator, ProviderKind};
use clipflow_sinks::{FileSink, ScreenSink};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

pub const SCREEN_SINK: &str = "screen";
pub const FILE_SINK: &str = "file";

pub struct App {
    buffer: WorkingBuffer,
    triggers: Triggers,
    /// Kept to flush outstanding commits on shutdown.
    processing: Option<Arc<AsyncProcessingHandler>>,
}

impl App {
    /// Builds the app printing results to stdout.
    ///
    /// Must be called inside a tokio runtime unless the pass-through
    /// provider is configured.
    pub fn build(config: &AppConfig) -> CliResult<Self> {
        Self::build_with_screen(config, io::stdout())
    }

    /// Builds the app printing results to `screen`.
    pub fn build_with_screen<W: Write + Send + 'static>(
        config: &AppConfig,
        screen: W,
    ) -> CliResult<Self> {
        let triggers = Triggers::from_bindings(&config.key_bindings)?;
        let mut buffer = WorkingBuffer::for_source(&config.source_language);

        if !config.no_result_to_screen {
            buffer.register_sink(SCREEN_SINK, Arc::new(ScreenSink::new(screen)))?;
        }
        if let Some(path) = &config.output_file {
            buffer.register_sink(FILE_SINK, Arc::new(FileSink::new(path)))?;
        }

        let provider = config.translation_provider.as_str();
        let (handler, processing): (Arc<dyn CommitHandler>, Option<Arc<AsyncProcessingHandler>>) =
            if provider == PASSTHROUGH_PROVIDER {
                (Arc::new(PassThroughHandler::new()) as Arc<dyn CommitHandler>, None)
            } else {
                let kind: ProviderKind = provider.parse()?;
                let translator = HttpTranslator::new(
                    kind,
                    config.source_language.clone(),
                    config.target_language.clone(),
                    config.translator.clone(),
                )?;
                let translator = Arc::new(translator);
                let handler = Arc::new(AsyncProcessingHandler::on_current_runtime(translator)?);
                (handler.clone() as Arc<dyn CommitHandler>, Some(handler))
            };
        buffer.register_commit_handler(provider, handler)?;

        info!(
            source = %config.source_language,
            target = %config.target_language,
            provider,
            sinks = ?buffer.sink_names(),
            "clipflow ready"
        );
        Ok(Self {
            buffer,
            triggers,
            processing,
        })
    }

    pub fn buffer(&self) -> &WorkingBuffer {
        &self.buffer
    }

    pub fn triggers(&self) -> &Triggers {
        &self.triggers
    }

    /// Resolves and runs one input line.
    pub fn handle_line(&mut self, line: &str) -> BufferResult<()> {
        match self.triggers.resolve(line)? {
            Some(signal) => self.buffer.signal(signal),
            None => Ok(()),
        }
    }

    /// Feeds every line of `input` to the buffer, then waits for
    /// outstanding commits once the input ends.
    ///
    /// Rejected lines are logged and skipped.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> CliResult<()> {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match self.handle_line(&line) {
                Ok(()) => {}
                Err(e) if e.is_nothing_to_revert() => info!("Nothing to revert"),
                Err(BufferError::UnknownSignal(name)) => {
                    warn!(signal = %name, "No matching signal, expected one of {:?}", Signal::NAMES)
                }
                Err(e) => warn!(error = %e, "Signal failed"),
            }
        }
        debug!("Input closed");
        self.shutdown().await;
        Ok(())
    }

    /// Waits for every commit still being processed.
    pub async fn shutdown(&self) {
        if let Some(handler) = &self.processing {
            let pending = handler.in_flight();
            if pending > 0 {
                info!(pending, "Waiting for outstanding commits");
            }
            handler.flush().await;
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("buffer", &self.buffer)
            .field("triggers", &self.triggers)
            .finish_non_exhaustive()
    }
}
