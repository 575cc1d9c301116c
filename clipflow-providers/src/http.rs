//! Translation over a LibreTranslate-compatible HTTP API.
//!
//! `POST <endpoint>/translate` with `{"q", "source", "target", "format"}`,
//! answered by `{"translatedText"}`.

use crate::error::{ProviderError, ProviderResult};
use crate::kind::ProviderKind;
use async_trait::async_trait;
use clipflow_core::{BufferResult, Language, Provider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Connection settings for [`HttpTranslator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TranslatorConfig {
    /// Base URL of the service (e.g. `http://localhost:5000`).
    pub endpoint: String,
    /// Sent as `api_key` when set.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// A [`Provider`] translating committed text through an HTTP service.
///
/// Requests are independent, so concurrent commits translate concurrently.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: Client,
    config: TranslatorConfig,
    kind: ProviderKind,
    source: Language,
    target: Language,
}

impl HttpTranslator {
    pub fn new(
        kind: ProviderKind,
        source: Language,
        target: Language,
        config: TranslatorConfig,
    ) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            kind,
            source,
            target,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Target code sent with every request.
    pub fn target_code(&self) -> &'static str {
        self.kind.target_code(&self.target)
    }

    fn url(&self) -> String {
        format!("{}/translate", self.config.endpoint.trim_end_matches('/'))
    }

    /// Translates `text` with one request.
    pub async fn translate(&self, text: &str) -> ProviderResult<String> {
        let request = TranslateRequest {
            q: text,
            source: self.source.code(),
            target: self.target_code(),
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };
        debug!(
            provider = %self.kind,
            len = text.len(),
            target = request.target,
            "Sending translation request"
        );

        let response = self.client.post(self.url()).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        debug!(provider = %self.kind, len = parsed.translated_text.len(), "Translation received");
        Ok(parsed.translated_text)
    }
}

#[async_trait]
impl Provider for HttpTranslator {
    fn name(&self) -> &str {
        self.kind.name()
    }

    async fn process(&self, text: &str) -> BufferResult<String> {
        Ok(self.translate(text).await?)
    }
}
