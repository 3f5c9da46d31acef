//! Common test utilities for storage and search integration tests.

use std::sync::Arc;

use nix_search_core::{
    CancellationToken, Derivation, IndexOptions, MockEvaluator, Package, PackageSet,
    TopLevelPackages, index_packages,
};
use nix_search_fts::{IndexStore, PackageSearcher, SearchOptions};
use serde_json::json;
use tempfile::TempDir;

/// A store in a temporary directory, removed on drop.
pub struct TestStore {
    pub dir: TempDir,
    pub store: IndexStore,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("cannot create temporary directory");
        let store = IndexStore::new(dir.path().join("nix-search"));
        Self { dir, store }
    }

    /// Commit `tree` and open a searcher on the result.
    pub fn commit(&self, tree: &TopLevelPackages) -> PackageSearcher {
        self.store.commit(tree).expect("commit should succeed");
        PackageSearcher::open(&self.store).expect("index should open")
    }
}

/// Index a small two-level tree through the concurrent indexer.
pub async fn scenario_tree() -> TopLevelPackages {
    let evaluator = Arc::new(MockEvaluator::from_tree(json!({
        "a": {"description": "A tool", "version": "1.0"},
        "b": {
            "c": {"description": "B C tool", "version": "2.0"},
        },
    })));
    index_packages(
        &IndexOptions::default().with_parallelism(2),
        evaluator,
        &CancellationToken::new(),
    )
    .await
    .expect("indexing should succeed")
}

fn leaf(name: &str, description: &str) -> Derivation {
    Derivation::Package(Package::new(name).with_description(description))
}

/// Hand-built catalog with a nested package set.
pub fn catalog() -> TopLevelPackages {
    let mut go = PackageSet::new();
    go.insert(
        "staticcheck",
        leaf(
            "staticcheck",
            "staticcheck is a go vet on steroids, applying a ton of static analysis checks you might be used to from tools like ReSharper for C#.",
        ),
    );
    go.insert(
        "bluge",
        leaf(
            "bluge",
            "Bluge is a high-performance, high-level full-text search engine library written in Go.",
        ),
    );

    let mut tree = TopLevelPackages::new("nixpkgs", false);
    tree.packages
        .insert("nix-search", leaf("nix-search", "Search for packages in Nixpkgs."));
    tree.packages
        .insert("nix-index", leaf("nix-index", "Index Nixpkgs."));
    tree.packages.insert(
        "firefox",
        leaf(
            "firefox",
            "Firefox is a free and open-source web browser developed by the Mozilla Foundation and its subsidiary, the Mozilla Corporation.",
        ),
    );
    tree.packages.insert("goPackages", Derivation::Set(go));
    tree
}

/// Run a search to completion, returning result paths in rank order.
pub fn search_paths(searcher: &PackageSearcher, query: &str, opts: &SearchOptions) -> Vec<String> {
    searcher
        .search(query, opts, &CancellationToken::new())
        .expect("search should start")
        .map(|r| r.path)
        .collect()
}
