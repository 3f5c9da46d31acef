//! `nix-search` behavior.

use nix_search_cli::commands;
use nix_search_core::CancellationToken;
use nix_search_fts::IndexStore;

use crate::common::{indexed_store, request, run};

#[tokio::test]
async fn test_rebuild_reports_document_count() {
    let (_dir, store) = indexed_store().await;
    let metadata = store.metadata().unwrap().unwrap();
    assert_eq!(metadata.document_count, 4);
    assert_eq!(metadata.channel, "nixpkgs");
}

#[tokio::test]
async fn test_exact_name_listed_first() {
    let (_dir, store) = indexed_store().await;
    let text = run(&store, &request("hello"));

    assert!(text.starts_with("* Exact matches:\n\n- nixpkgs.hello (2.12)\n"));
    let other = text.find("* Other matches:").unwrap();
    let wayland = text.find("- nixpkgs.hello-wayland (0.1)").unwrap();
    assert!(other < wayland);
}

#[tokio::test]
async fn test_nested_package_path() {
    let (_dir, store) = indexed_store().await;
    let text = run(&store, &request("requests"));
    assert!(text.contains("- nixpkgs.python3Packages.requests (2.31)\n  HTTP library for Python\n"));
}

#[tokio::test]
async fn test_plain_output_has_no_escapes() {
    let (_dir, store) = indexed_store().await;
    let text = run(&store, &request("firefox"));
    assert!(!text.contains('\x1b'));
}

#[tokio::test]
async fn test_color_output_highlights() {
    let (_dir, store) = indexed_store().await;
    let mut req = request("firefox");
    req.color = true;
    let text = run(&store, &req);
    assert!(text.contains('\x1b'));
}

#[tokio::test]
async fn test_json_output() {
    let (_dir, store) = indexed_store().await;
    let mut req = request("python");
    req.json = true;
    req.color = true;
    let text = run(&store, &req);

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let results = value.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["path"], "nixpkgs.python3Packages.requests");
    // JSON output is never highlighted.
    assert!(results[0]["unhighlighted"].is_null());
}

#[tokio::test]
async fn test_no_results_prints_nothing() {
    let (_dir, store) = indexed_store().await;
    assert!(run(&store, &request("asldjkoasdjasjdasd")).is_empty());
}

#[tokio::test]
async fn test_missing_index_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = IndexStore::new(dir.path().join("absent"));
    let mut out = Vec::new();
    let err = commands::search(&store, &request("x"), &CancellationToken::new(), &mut out)
        .unwrap_err();
    assert!(err.to_string().contains("--index"));
}

#[tokio::test]
async fn test_cancelled_search_fails() {
    let (_dir, store) = indexed_store().await;
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut out = Vec::new();
    let err = commands::search(&store, &request("hello"), &cancel, &mut out).unwrap_err();
    let cancelled = err
        .downcast_ref::<nix_search_core::Error>()
        .is_some_and(|e| e.is_cancelled());
    assert!(cancelled);
    assert!(out.is_empty());
}
