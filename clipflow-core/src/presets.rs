//! Built-in ingestion filters.

use crate::filter::TextFilter;
use regex_lite::Regex;
use std::sync::LazyLock;

static HYPHENATED_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\r?\n").expect("valid regex"));
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").expect("valid regex"));

/// Deletes every whitespace character.
///
/// Meant for scripts without word spacing, where line wrapping in the
/// source document inserts spurious gaps.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceFilter;

impl WhitespaceFilter {
    pub const NAME: &'static str = "remove_white_space";
}

impl TextFilter for WhitespaceFilter {
    fn apply(&self, input: &str) -> Result<String, String> {
        Ok(input.chars().filter(|c| !c.is_whitespace()).collect())
    }
}

/// Rejoins words hyphenated across a line break, then turns the remaining
/// line breaks into single spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineBreakFilter;

impl LineBreakFilter {
    pub const NAME: &'static str = "remove_line_break";
}

impl TextFilter for LineBreakFilter {
    fn apply(&self, input: &str) -> Result<String, String> {
        let joined = HYPHENATED_BREAK.replace_all(input, "");
        Ok(LINE_BREAK.replace_all(&joined, " ").into_owned())
    }
}

/// Normalizes the spacing after every period to exactly one space, so
/// consecutive fragments do not run sentences together.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendSpaceFilter;

impl AppendSpaceFilter {
    pub const NAME: &'static str = "append_space";
}

impl TextFilter for AppendSpaceFilter {
    fn apply(&self, input: &str) -> Result<String, String> {
        // Unicode whitespace, so no-break and ideographic spaces count too.
        let mut out = String::with_capacity(input.len() + 1);
        let mut chars = input.chars().peekable();
        while let Some(c) = chars.next() {
            out.push(c);
            if c == '.' {
                while chars.next_if(|c| c.is_whitespace()).is_some() {}
                out.push(' ');
            }
        }
        Ok(out)
    }
}
