//! Match highlighting.
//!
//! Spans come from tantivy's snippet generator when the query reports terms
//! for a field. Regex, substring and fuzzy clauses report no terms, so for
//! those fields the query pattern itself is matched against the text.

use std::ops::Range;

use nix_search_core::{Package, SearchedPackage};
use regex::{Regex, RegexBuilder};
use tantivy::Searcher;
use tantivy::query::Query;
use tantivy::snippet::SnippetGenerator;

use crate::schema::SearchSchema;

/// Escape used by [`HighlightStyle::Ansi`] when none is configured.
pub const DEFAULT_ANSI_ESCAPE: &str = "\x1b[1;33m";

/// Resets all ANSI attributes.
pub const ANSI_RESET: &str = "\x1b[0m";

const DEFAULT_HTML_TAG: &str = "mark";

/// How matches are marked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightStyle {
    /// Terminal escape sequences.
    Ansi {
        /// Escape that starts a match. Defaults to [`DEFAULT_ANSI_ESCAPE`].
        escape: Option<String>,
    },
    /// HTML elements. Text outside the tags is escaped.
    Html {
        tag: String,
        attributes: Vec<(String, String)>,
    },
}

impl HighlightStyle {
    /// ANSI highlighting with the default color.
    pub fn ansi() -> Self {
        HighlightStyle::Ansi { escape: None }
    }

    /// ANSI highlighting with a custom start escape.
    pub fn ansi_with_escape(escape: impl Into<String>) -> Self {
        HighlightStyle::Ansi {
            escape: Some(escape.into()),
        }
    }

    /// HTML highlighting with `<mark>`.
    pub fn html() -> Self {
        HighlightStyle::Html {
            tag: DEFAULT_HTML_TAG.to_string(),
            attributes: Vec::new(),
        }
    }

    /// HTML highlighting with a custom element.
    pub fn html_tag(tag: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        HighlightStyle::Html {
            tag: tag.into(),
            attributes,
        }
    }

    /// The ANSI start escape, falling back to the default.
    pub fn ansi_escape_with_default(&self) -> &str {
        match self {
            HighlightStyle::Ansi {
                escape: Some(escape),
            } => escape,
            _ => DEFAULT_ANSI_ESCAPE,
        }
    }

    /// Markup inserted before a match.
    pub fn open_tag(&self) -> String {
        match self {
            HighlightStyle::Ansi { .. } => self.ansi_escape_with_default().to_string(),
            HighlightStyle::Html { tag, attributes } => {
                let mut open = format!("<{tag}");
                for (key, value) in attributes {
                    open.push_str(&format!(" {key}=\"{}\"", escape_html(value)));
                }
                open.push('>');
                open
            }
        }
    }

    /// Markup inserted after a match.
    pub fn close_tag(&self) -> String {
        match self {
            HighlightStyle::Ansi { .. } => ANSI_RESET.to_string(),
            HighlightStyle::Html { tag, .. } => format!("</{tag}>"),
        }
    }

    /// Mark up `spans` of `text`.
    ///
    /// Spans are byte ranges; overlapping spans are merged and spans that do
    /// not fall on character boundaries are ignored.
    pub fn apply(&self, text: &str, spans: &[Range<usize>]) -> String {
        let spans = normalize(text, spans);
        let html = matches!(self, HighlightStyle::Html { .. });
        let push = |out: &mut String, s: &str| {
            if html {
                out.push_str(&escape_html(s));
            } else {
                out.push_str(s);
            }
        };

        let (open, close) = (self.open_tag(), self.close_tag());
        let mut out = String::with_capacity(text.len() + spans.len() * (open.len() + close.len()));
        let mut last = 0;
        for span in spans {
            push(&mut out, &text[last..span.start]);
            out.push_str(&open);
            push(&mut out, &text[span.clone()]);
            out.push_str(&close);
            last = span.end;
        }
        push(&mut out, &text[last..]);
        out
    }
}

fn normalize(text: &str, spans: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut spans: Vec<Range<usize>> = spans
        .iter()
        .filter(|s| {
            s.start < s.end
                && s.end <= text.len()
                && text.is_char_boundary(s.start)
                && text.is_char_boundary(s.end)
        })
        .cloned()
        .collect();
    spans.sort_by_key(|s| s.start);

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(prev) = merged.last_mut()
            && span.start <= prev.end
        {
            prev.end = prev.end.max(span.end);
            continue;
        }
        merged.push(span);
    }
    merged
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Case-insensitive pattern matching `query` literally.
pub fn literal_pattern(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Case-insensitive version of a user regex, if it compiles.
pub fn regex_pattern(query: &str) -> Option<Regex> {
    RegexBuilder::new(query).case_insensitive(true).build().ok()
}

/// Non-empty matches of `pattern` in `text`.
pub fn pattern_spans(text: &str, pattern: &Regex) -> Vec<Range<usize>> {
    pattern
        .find_iter(text)
        .filter(|m| !m.is_empty())
        .map(|m| m.range())
        .collect()
}

/// Highlights the text fields of search results for one query.
pub(crate) struct Highlighter {
    style: HighlightStyle,
    /// Generators for path, name and description, in that order.
    generators: [Option<SnippetGenerator>; 3],
    fallback: Option<Regex>,
    snippet_length: usize,
}

impl Highlighter {
    pub(crate) fn new(
        searcher: &Searcher,
        query: &dyn Query,
        schema: &SearchSchema,
        style: HighlightStyle,
        fallback: Option<Regex>,
        snippet_length: usize,
    ) -> Self {
        let generators = schema.text_fields().map(|field| {
            match SnippetGenerator::create(searcher, query, field) {
                Ok(generator) => Some(generator),
                Err(e) => {
                    log::warn!("cannot create snippet generator: {e}");
                    None
                }
            }
        });
        Self {
            style,
            generators,
            fallback,
            snippet_length,
        }
    }

    fn engine_spans(&mut self, field: usize, text: &str) -> Vec<Range<usize>> {
        let Some(generator) = self.generators.get_mut(field).and_then(Option::as_mut) else {
            return Vec::new();
        };
        generator.set_max_num_chars(text.len().max(self.snippet_length));
        let snippet = generator.snippet(text);
        let fragment = snippet.fragment();
        if fragment.is_empty() || snippet.highlighted().is_empty() {
            return Vec::new();
        }
        let Some(base) = text.find(fragment) else {
            return Vec::new();
        };
        snippet
            .highlighted()
            .iter()
            .map(|r| r.start + base..r.end + base)
            .collect()
    }

    fn spans(&mut self, field: usize, text: &str) -> Vec<Range<usize>> {
        let spans = self.engine_spans(field, text);
        if !spans.is_empty() {
            return spans;
        }
        match &self.fallback {
            Some(pattern) => pattern_spans(text, pattern),
            None => Vec::new(),
        }
    }

    /// Build the highlighted variant of `result`.
    ///
    /// `exact` names a field (0 path, 1 name, 2 description) and the span of
    /// the literal query in it; that span replaces the field's highlights.
    pub(crate) fn highlight(
        &mut self,
        result: &SearchedPackage,
        exact: Option<(usize, Range<usize>)>,
    ) -> SearchedPackage {
        let texts = [
            result.path.as_str(),
            result.package.name.as_str(),
            result.package.description.as_str(),
        ];
        let mut marked: [String; 3] = Default::default();
        for (i, text) in texts.iter().enumerate() {
            let spans = match &exact {
                Some((field, span)) if *field == i => vec![span.clone()],
                _ => self.spans(i, text),
            };
            marked[i] = self.style.apply(text, &spans);
        }
        let [path, name, description] = marked;

        SearchedPackage {
            path,
            package: Package {
                name,
                description,
                ..result.package.clone()
            },
            highlighted: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
