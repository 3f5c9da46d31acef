//! Common types for searching.

use serde::{Deserialize, Serialize};

use crate::highlight::HighlightStyle;

/// Search engine tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Fuzzy edit distance (0 disables fuzzy matching).
    #[serde(default = "default_fuzzy_distance")]
    pub fuzzy_distance: u8,

    /// Maximum fragment length used when highlighting, in characters.
    #[serde(default = "default_snippet_length")]
    pub snippet_length: usize,

    /// Number of ranked hits fetched per page while streaming results.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_fuzzy_distance() -> u8 {
    1
}

fn default_snippet_length() -> usize {
    256
}

fn default_page_size() -> usize {
    100
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_distance: default_fuzzy_distance(),
            snippet_length: default_snippet_length(),
            page_size: default_page_size(),
        }
    }
}

/// Options for a single search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Keep only results containing the query literally.
    pub exact: bool,
    /// Treat the query as a regular expression.
    pub regex: bool,
    /// Produce highlighted variants in this style.
    pub highlight: Option<HighlightStyle>,
    /// Engine tunables.
    pub config: SearchConfig,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn regex(mut self, regex: bool) -> Self {
        self.regex = regex;
        self
    }

    pub fn highlight(mut self, style: HighlightStyle) -> Self {
        self.highlight = Some(style);
        self
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
