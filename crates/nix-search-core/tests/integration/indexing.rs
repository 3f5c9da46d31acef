//! Full indexing passes against mock trees.

use std::ops::ControlFlow;
use std::sync::Arc;

use nix_search_core::{CancellationToken, IndexOptions, MockEvaluator, index_packages};

use crate::common::{index_with, scenario_tree, wide_tree};

fn leaf_paths(tree: &nix_search_core::TopLevelPackages) -> Vec<String> {
    let mut paths = Vec::new();
    let _: ControlFlow<()> = tree.walk(|path, _| {
        paths.push(path.to_string());
        ControlFlow::Continue(())
    });
    paths.sort();
    paths
}

#[tokio::test]
async fn test_scenario_tree_leaves() {
    let tree = index_with(Arc::new(MockEvaluator::from_tree(scenario_tree())), 2)
        .await
        .expect("indexing should succeed");

    assert_eq!(leaf_paths(&tree), vec!["nixpkgs.a", "nixpkgs.b.c"]);
}

#[tokio::test]
async fn test_count_matches_evaluator_leaves() {
    let evaluator = Arc::new(MockEvaluator::from_tree(wide_tree()));
    let expected = evaluator.leaf_count();
    let tree = index_with(evaluator, 4).await.unwrap();

    assert_eq!(tree.count(), expected);
    assert_eq!(expected, 5 * (4 * (3 + 1) + 1) + 1);
}

#[tokio::test]
async fn test_parallelism_does_not_change_tree() {
    let serial = index_with(Arc::new(MockEvaluator::from_tree(wide_tree())), 1)
        .await
        .unwrap();

    for parallelism in [2, 3, 8, 32] {
        let parallel = index_with(Arc::new(MockEvaluator::from_tree(wide_tree())), parallelism)
            .await
            .unwrap();
        assert_eq!(parallel, serial, "parallelism {parallelism} produced a different tree");
        assert_eq!(
            serde_json::to_string(&parallel).unwrap(),
            serde_json::to_string(&serial).unwrap()
        );
    }
}

#[tokio::test]
async fn test_each_set_evaluated_once() {
    let evaluator = Arc::new(MockEvaluator::from_tree(scenario_tree()));
    index_with(evaluator.clone(), 4).await.unwrap();
    assert_eq!(evaluator.calls(), 2);
}

#[tokio::test]
async fn test_leaf_names_are_attribute_names() {
    let tree = index_with(Arc::new(MockEvaluator::from_tree(scenario_tree())), 1)
        .await
        .unwrap();
    let _: ControlFlow<()> = tree.walk(|path, pkg| {
        assert_eq!(path.last(), Some(pkg.name.as_str()));
        ControlFlow::Continue(())
    });
}

#[tokio::test]
async fn test_flake_root() {
    let opts = IndexOptions::default()
        .with_flake("github:NixOS/nixpkgs")
        .with_parallelism(2);
    let evaluator = Arc::new(MockEvaluator::from_tree(scenario_tree()));
    let tree = index_packages(&opts, evaluator, &CancellationToken::new())
        .await
        .unwrap();

    assert!(tree.flake);
    assert_eq!(
        leaf_paths(&tree),
        vec!["github:NixOS/nixpkgs#a", "github:NixOS/nixpkgs#b.c"]
    );
}

#[tokio::test]
async fn test_dump_reloads_identically() {
    let tree = index_with(Arc::new(MockEvaluator::from_tree(wide_tree())), 4)
        .await
        .unwrap();
    let json = serde_json::to_string_pretty(&tree).unwrap();
    let back: nix_search_core::TopLevelPackages = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tree);
}
