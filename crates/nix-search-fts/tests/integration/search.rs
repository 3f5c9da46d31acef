//! Ranking, filtering and streaming.

use nix_search_core::CancellationToken;
use nix_search_fts::SearchOptions;

use crate::common::{TestStore, catalog, scenario_tree, search_paths};

#[test]
fn test_expected_matches() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());

    let cases: &[(&str, &[&str])] = &[
        ("nix-search", &["nixpkgs.nix-search"]),
        ("fire", &["nixpkgs.firefox"]),
        ("go", &["nixpkgs.goPackages.staticcheck", "nixpkgs.goPackages.bluge"]),
    ];
    for (query, wanted) in cases {
        let results = search_paths(&searcher, query, &SearchOptions::new());
        for want in *wanted {
            assert!(
                results.iter().any(|r| r == want),
                "{query}: {want} not in {results:?}"
            );
        }
    }
}

#[test]
fn test_whole_name_ranks_first() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());
    let results = search_paths(&searcher, "nix-search", &SearchOptions::new());
    assert_eq!(results.first().map(String::as_str), Some("nixpkgs.nix-search"));
}

#[test]
fn test_gibberish_matches_nothing() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());
    assert!(search_paths(&searcher, "asldjkoasdjasjdasd", &SearchOptions::new()).is_empty());
}

#[tokio::test]
async fn test_scenario_queries() {
    let store = TestStore::new();
    let searcher = store.commit(&scenario_tree().await);

    let mut all = search_paths(&searcher, "tool", &SearchOptions::new());
    all.sort();
    assert_eq!(all, vec!["nixpkgs.a", "nixpkgs.b.c"]);

    let exact = search_paths(&searcher, "B C tool", &SearchOptions::new().exact(true));
    assert_eq!(exact, vec!["nixpkgs.b.c"]);
}

#[test]
fn test_exact_results_are_subset() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());

    for query in ["go", "Nixpkgs", "fire", "search", "Go.", "index"] {
        let loose = search_paths(&searcher, query, &SearchOptions::new());
        let exact = search_paths(&searcher, query, &SearchOptions::new().exact(true));
        for path in &exact {
            assert!(loose.contains(path), "{query}: {path} only in exact results");
        }
    }
}

#[test]
fn test_exact_is_case_sensitive() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());

    let upper = search_paths(&searcher, "Mozilla", &SearchOptions::new().exact(true));
    assert_eq!(upper, vec!["nixpkgs.firefox"]);
    let lower = search_paths(&searcher, "mozilla", &SearchOptions::new().exact(true));
    assert!(lower.is_empty());
}

#[test]
fn test_regex_search() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());

    let results = search_paths(&searcher, "static.*", &SearchOptions::new().regex(true));
    assert_eq!(results, vec!["nixpkgs.goPackages.staticcheck"]);
}

#[test]
fn test_invalid_regex_is_query_error() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());
    let err = searcher
        .search("[", &SearchOptions::new().regex(true), &CancellationToken::new())
        .err()
        .expect("invalid pattern should fail");
    assert!(matches!(err, nix_search_core::Error::Query { .. }));
}

#[test]
fn test_iterator_stops_when_dropped_early() {
    let store = TestStore::new();
    let searcher = store.commit(&catalog());
    let first: Vec<String> = searcher
        .search("nixpkgs", &SearchOptions::new(), &CancellationToken::new())
        .unwrap()
        .take(1)
        .map(|r| r.path)
        .collect();
    assert_eq!(first.len(), 1);
}
