//! Ordered ingestion filters.
//!
//! A [`FilterChain`] maps strictly unique priorities to named [`TextFilter`]s
//! and runs them in ascending priority order, each consuming the previous
//! filter's output. Names are unique too; both dimensions are checked on
//! insert so a failed registration leaves the chain untouched.

use crate::error::{BufferError, BufferResult};
use crate::language::Language;
use crate::presets::{AppendSpaceFilter, LineBreakFilter, WhitespaceFilter};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// A pure text transform applied to every pushed fragment.
///
/// Implemented for any `Fn(&str) -> String` closure. Implement it by hand
/// when the filter needs to reject malformed input.
pub trait TextFilter: Send + Sync {
    /// Transforms `input`, or returns a message explaining why it was rejected.
    fn apply(&self, input: &str) -> Result<String, String>;
}

impl<F> TextFilter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn apply(&self, input: &str) -> Result<String, String> {
        Ok(self(input))
    }
}

struct FilterEntry {
    name: String,
    filter: Box<dyn TextFilter>,
}

/// Filters keyed by priority.
#[derive(Default)]
pub struct FilterChain {
    entries: BTreeMap<i32, FilterEntry>,
}

impl FilterChain {
    /// Creates an empty chain. An empty chain returns its input unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the default chain for text captured in `source`.
    ///
    /// Chinese text has whitespace stripped before line breaks are joined;
    /// everything else has line breaks joined and sentences re-spaced.
    pub fn for_source(source: &Language) -> Self {
        let mut chain = Self::new();
        if source.is_chinese() {
            chain.insert(0, WhitespaceFilter::NAME, WhitespaceFilter);
            chain.insert(1, LineBreakFilter::NAME, LineBreakFilter);
        } else {
            chain.insert(0, LineBreakFilter::NAME, LineBreakFilter);
            chain.insert(1, AppendSpaceFilter::NAME, AppendSpaceFilter);
        }
        chain
    }

    /// Registers `filter` under `name` at `priority`.
    ///
    /// Fails without modifying the chain if either the name or the
    /// priority is already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        filter: impl TextFilter + 'static,
    ) -> BufferResult<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(BufferError::DuplicateFilterName(name));
        }
        if self.entries.contains_key(&priority) {
            return Err(BufferError::DuplicateFilterPriority(priority));
        }
        info!(filter = %name, priority, "Filter registered");
        self.insert(priority, name, filter);
        Ok(())
    }

    /// Removes the filter registered under `name`, freeing its priority.
    pub fn deregister(&mut self, name: &str) -> BufferResult<()> {
        let priority = self
            .priority_of(name)
            .ok_or_else(|| BufferError::FilterNotFound(name.to_string()))?;
        self.entries.remove(&priority);
        info!(filter = %name, priority, "Filter deregistered");
        Ok(())
    }

    /// Runs `text` through every filter in ascending priority order.
    pub fn apply(&self, text: &str) -> BufferResult<String> {
        let mut value = text.to_string();
        for (priority, entry) in &self.entries {
            debug!(filter = %entry.name, priority, "Pushed data filtered");
            value = entry.filter.apply(&value).map_err(|message| BufferError::Filter {
                name: entry.name.clone(),
                message,
            })?;
        }
        Ok(value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.priority_of(name).is_some()
    }

    /// Returns the priority `name` is registered at.
    pub fn priority_of(&self, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.name == name)
            .map(|(priority, _)| *priority)
    }

    /// Filter names in application order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.values().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(
        &mut self,
        priority: i32,
        name: impl Into<String>,
        filter: impl TextFilter + 'static,
    ) {
        self.entries.insert(
            priority,
            FilterEntry {
                name: name.into(),
                filter: Box::new(filter),
            },
        );
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(p, e)| (p, &e.name)))
            .finish()
    }
}
