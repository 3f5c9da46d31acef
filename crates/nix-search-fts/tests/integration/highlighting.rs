//! Highlighted result variants.

use nix_search_core::CancellationToken;
use nix_search_fts::highlight::{ANSI_RESET, DEFAULT_ANSI_ESCAPE};
use nix_search_fts::{HighlightStyle, PackageSearcher, SearchOptions};

use crate::common::{TestStore, catalog};

fn first(
    searcher: &PackageSearcher,
    query: &str,
    opts: &SearchOptions,
) -> nix_search_core::SearchedPackage {
    searcher
        .search(query, opts, &CancellationToken::new())
        .unwrap()
        .next()
        .expect("query should match")
}

#[test]
fn test_html_highlights_term_matches() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());
    let opts = SearchOptions::new().highlight(HighlightStyle::html());

    let result = first(&searcher, "firefox", &opts);
    assert_eq!(result.path, "nixpkgs.firefox");
    let highlighted = result.highlighted.expect("highlighted variant");
    assert_eq!(highlighted.path, "nixpkgs.<mark>firefox</mark>");
    assert_eq!(highlighted.package.name, "<mark>firefox</mark>");
    assert!(highlighted.package.description.starts_with("<mark>Firefox</mark> is a free"));
}

#[test]
fn test_substring_match_highlighted_by_fallback() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());
    let opts = SearchOptions::new().highlight(HighlightStyle::html());

    let result = first(&searcher, "fire", &opts);
    let highlighted = result.highlighted.expect("highlighted variant");
    assert_eq!(highlighted.package.name, "<mark>fire</mark>fox");
}

#[test]
fn test_ansi_style() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());
    let opts = SearchOptions::new().highlight(HighlightStyle::ansi());

    let result = first(&searcher, "bluge", &opts);
    let highlighted = result.highlighted.expect("highlighted variant");
    assert_eq!(
        highlighted.package.name,
        format!("{DEFAULT_ANSI_ESCAPE}bluge{ANSI_RESET}")
    );
}

#[test]
fn test_exact_mode_highlights_literal_span() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());
    let opts = SearchOptions::new()
        .exact(true)
        .highlight(HighlightStyle::html_tag("b", Vec::new()));

    let result = first(&searcher, "Mozilla Foundation", &opts);
    let highlighted = result.highlighted.expect("highlighted variant");
    assert!(
        highlighted
            .package
            .description
            .contains("by the <b>Mozilla Foundation</b> and"),
        "{}",
        highlighted.package.description
    );
}

#[test]
fn test_no_highlight_without_style() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());
    let result = first(&searcher, "firefox", &SearchOptions::new());
    assert!(result.highlighted.is_none());
}

#[test]
fn test_original_record_untouched() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());
    let opts = SearchOptions::new().highlight(HighlightStyle::html());
    let result = first(&searcher, "firefox", &opts);
    assert_eq!(result.package.name, "firefox");
    assert_eq!(result.display().package.name, "<mark>firefox</mark>");
}
