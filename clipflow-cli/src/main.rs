//! clipflow: buffer text fragments, commit them for translation, revert
//! outputs.
//!
//! Reads one trigger per line from stdin:
//!
//! ```text
//! push_to_buffer Some text\nspanning lines
//! pop_buffer
//! commit
//! revert
//! ```
//!
//! Usage:
//!   clipflow -s en -t zh -p google --endpoint http://localhost:5000 -o results.txt

use anyhow::{Context, Result};
use clap::Parser;
use clipflow_cli::{App, AppConfig, Args};
use clipflow_core::Signal;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = AppConfig::load_or_default(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    args.apply(&mut config);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log level {:?}", config.log_level))?;
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    info!("clipflow starting...");
    let mut app = App::build(&config).context("failed to set up the working buffer")?;

    eprintln!("clipflow: one signal per line ({})", Signal::NAMES.join(", "));
    for (token, signal) in app.triggers().bindings() {
        eprintln!("  {token:<8} {signal}");
    }

    app.run(BufReader::new(tokio::io::stdin())).await?;
    info!("clipflow stopped");
    Ok(())
}
