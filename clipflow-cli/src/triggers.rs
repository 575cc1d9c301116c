//! Turns input lines into signals.
//!
//! A line is `<token> [text]`. The token is either a configured key binding
//! or a signal name; the text, only used by a push, may spell line breaks
//! and tabs as `\n` and `\t`.

use crate::error::{CliError, CliResult};
use clipflow_core::{BufferResult, Signal};
use std::collections::BTreeMap;

/// Trigger token to signal name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Triggers {
    tokens: BTreeMap<String, &'static str>,
}

impl Triggers {
    /// Builds the token table from `key-bindings` (signal name to token).
    pub fn from_bindings(bindings: &BTreeMap<String, String>) -> CliResult<Self> {
        let mut tokens = BTreeMap::new();
        for (signal, token) in bindings {
            let name = Signal::NAMES
                .into_iter()
                .find(|name| name == signal)
                .ok_or_else(|| CliError::UnknownBinding(signal.clone()))?;
            if tokens.insert(token.clone(), name).is_some() {
                return Err(CliError::DuplicateToken(token.clone()));
            }
        }
        Ok(Self { tokens })
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// `(token, signal name)` pairs, ordered by token.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.tokens.iter().map(|(token, name)| (token.as_str(), *name))
    }

    /// Resolves one input line. Blank lines resolve to `None`.
    pub fn resolve(&self, line: &str) -> BufferResult<Option<Signal>> {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();
        if line.trim().is_empty() {
            return Ok(None);
        }
        let (token, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let name = self.tokens.get(token).copied().unwrap_or(token);
        Signal::from_parts(name, &decode_escapes(rest)).map(Some)
    }
}

/// Decodes `\n`, `\t` and `\\`. Other backslashes are kept as typed.
pub fn decode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
