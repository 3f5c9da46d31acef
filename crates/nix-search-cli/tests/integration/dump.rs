//! `nix-dump-index` behavior.

use nix_search_cli::commands;
use nix_search_core::{CancellationToken, IndexOptions, TopLevelPackages};

use crate::common::evaluator;

#[tokio::test]
async fn test_dump_reloads() {
    let tree = commands::build_tree(
        &IndexOptions::default().with_parallelism(3),
        evaluator(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let mut out = Vec::new();
    commands::dump(&tree, false, &mut out).unwrap();
    assert_eq!(out.last(), Some(&b'\n'));

    let reloaded: TopLevelPackages = serde_json::from_slice(&out).unwrap();
    assert_eq!(reloaded, tree);
    assert_eq!(reloaded.count(), 4);
}

#[tokio::test]
async fn test_dump_pretty() {
    let tree = commands::build_tree(
        &IndexOptions::default(),
        evaluator(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let mut out = Vec::new();
    commands::dump(&tree, true, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("\n  \"channel\": \"nixpkgs\""));
    assert!(text.contains("\"_type\": \"packageSet\""));
}
