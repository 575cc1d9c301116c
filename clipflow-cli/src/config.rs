//! Application configuration: JSON file first, command-line flags on top.

use crate::error::{CliError, CliResult};
use clap::Parser;
use clipflow_core::Language;
use clipflow_providers::TranslatorConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Provider name selecting the pass-through handler instead of a translator.
pub const PASSTHROUGH_PROVIDER: &str = "passthrough";

/// Contents of `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AppConfig {
    /// Suppress printing results to stdout.
    pub no_result_to_screen: bool,
    /// Log level or `EnvFilter` directive (`RUST_LOG` takes precedence).
    pub log_level: String,
    pub source_language: Language,
    pub target_language: Language,
    /// `google`, `bing`, `baidu`, `tencent` or `passthrough`.
    pub translation_provider: String,
    pub output_file: Option<PathBuf>,
    pub translator: TranslatorConfig,
    /// Signal name to trigger token.
    pub key_bindings: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            no_result_to_screen: false,
            log_level: "warn".to_string(),
            source_language: Language::English,
            target_language: Language::Chinese,
            translation_provider: "google".to_string(),
            output_file: None,
            translator: TranslatorConfig::default(),
            key_bindings: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&raw).map_err(|source| CliError::ParseConfig {
                path: path.to_path_buf(),
                source,
            })?;
        config.translation_provider = config.translation_provider.trim().to_ascii_lowercase();
        Ok(config)
    }

    /// Like [`AppConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> CliResult<Self> {
        match Self::load(path) {
            Err(CliError::ReadConfig { source, .. }) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "clipflow")]
#[command(about = "Buffer text fragments, commit them for translation, revert outputs")]
pub struct Args {
    /// Do not print results to stdout
    #[arg(long)]
    pub no_result_to_stdout: bool,

    /// Log level [default: warn]
    #[arg(short = 'L', long)]
    pub log_level: Option<String>,

    /// Source language [default: en]
    #[arg(short, long)]
    pub source_language: Option<String>,

    /// Target language [default: zh]
    #[arg(short, long)]
    pub target_language: Option<String>,

    /// google, bing, baidu, tencent or passthrough [default: google]
    #[arg(short = 'p', long)]
    pub translation_provider: Option<String>,

    /// Also append results to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON config file, ignored if missing
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Base URL of the translation service
    #[arg(long)]
    pub endpoint: Option<String>,
}

impl Args {
    /// Overrides `config` with every flag given on the command line.
    pub fn apply(&self, config: &mut AppConfig) {
        if self.no_result_to_stdout {
            config.no_result_to_screen = true;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(source) = &self.source_language {
            config.source_language = Language::from(source.as_str());
        }
        if let Some(target) = &self.target_language {
            config.target_language = Language::from(target.as_str());
        }
        if let Some(provider) = &self.translation_provider {
            config.translation_provider = provider.to_ascii_lowercase();
        }
        if let Some(output) = &self.output {
            config.output_file = Some(output.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.translator.endpoint = endpoint.clone();
        }
    }
}
