//! Shared fixtures for command tests.

use std::sync::Arc;

use nix_search_cli::commands::{self, SearchRequest};
use nix_search_core::{CancellationToken, IndexOptions, MockEvaluator};
use nix_search_fts::IndexStore;
use serde_json::json;
use tempfile::TempDir;

pub fn evaluator() -> Arc<MockEvaluator> {
    Arc::new(MockEvaluator::from_tree(json!({
        "hello": {"description": "A program that produces a familiar, friendly greeting", "version": "2.12"},
        "hello-wayland": {"description": "Hello world Wayland client", "version": "0.1"},
        "firefox": {"description": "A web browser built from Firefox source tree", "version": "120.0"},
        "python3Packages": {
            "requests": {"description": "HTTP library for Python", "version": "2.31"},
        },
    })))
}

/// An index built from [`evaluator`] in a temporary directory.
pub async fn indexed_store() -> (TempDir, IndexStore) {
    let dir = tempfile::tempdir().expect("cannot create temporary directory");
    let store = IndexStore::new(dir.path().join("index"));
    commands::rebuild_index(
        &store,
        &IndexOptions::default().with_parallelism(2),
        evaluator(),
        &CancellationToken::new(),
    )
    .await
    .expect("indexing should succeed");
    (dir, store)
}

pub fn request(query: &str) -> SearchRequest {
    SearchRequest {
        query: query.to_string(),
        exact: true,
        ..Default::default()
    }
}

pub fn run(store: &IndexStore, request: &SearchRequest) -> String {
    let mut out = Vec::new();
    commands::search(store, request, &CancellationToken::new(), &mut out)
        .expect("search should succeed");
    String::from_utf8(out).expect("output should be UTF-8")
}
