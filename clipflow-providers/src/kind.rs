//! Translation services and their language code tables.

use crate::error::ProviderError;
use clipflow_core::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A translation service. Each spells Chinese differently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Google,
    Bing,
    Baidu,
    Tencent,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [Self::Google, Self::Bing, Self::Baidu, Self::Tencent];

    pub fn name(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::Baidu => "baidu",
            Self::Tencent => "tencent",
        }
    }

    /// Target language code this service expects.
    ///
    /// Only Chinese and English targets are supported; anything that is not
    /// Chinese is translated to English.
    pub fn target_code(self, target: &Language) -> &'static str {
        if !target.is_chinese() {
            return "en";
        }
        match self {
            Self::Google => "zh-CN",
            Self::Bing => "zh-Hans",
            Self::Baidu | Self::Tencent => "zh",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or(ProviderError::UnknownProvider(name))
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
