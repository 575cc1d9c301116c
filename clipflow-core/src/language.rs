//! Language codes used to pick filter presets and provider targets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A source or target language, identified by its short code.
///
/// Only Chinese gets special treatment (no word spacing on ingestion,
/// provider-specific script codes); every other code is carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    Chinese,
    #[default]
    English,
    Other(String),
}

impl Language {
    /// Returns the short code (`zh`, `en`, ...).
    pub fn code(&self) -> &str {
        match self {
            Self::Chinese => "zh",
            Self::English => "en",
            Self::Other(code) => code,
        }
    }

    pub fn is_chinese(&self) -> bool {
        matches!(self, Self::Chinese)
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        let code = code.trim().to_ascii_lowercase();
        match code.as_str() {
            "zh" | "zh-cn" | "zh-hans" | "chinese" => Self::Chinese,
            "en" | "english" => Self::English,
            _ => Self::Other(code),
        }
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Self::from(code.as_str())
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
