//! Partial and fatal evaluation failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nix_search_core::{
    CancellationToken, Derivation, Error, EvalEntry, EvalOutput, Evaluator, IndexOptions,
    MockEvaluator, PackageSet, Result, index_packages,
};
use serde_json::json;

use crate::common::{index_with, wide_tree};

#[tokio::test]
async fn test_root_failure_aborts() {
    let evaluator = Arc::new(MockEvaluator::from_tree(wide_tree()).with_failure(&[], "boom"));
    let err = index_with(evaluator.clone(), 4).await.unwrap_err();

    assert!(matches!(err, Error::Evaluation { .. }));
    assert_eq!(evaluator.calls(), 1);
}

#[tokio::test]
async fn test_deep_failure_leaves_subtree_empty() {
    let evaluator = Arc::new(
        MockEvaluator::from_tree(wide_tree()).with_failure(&["set1", "group2", "deep"], "boom"),
    );
    let expected = evaluator.leaf_count();
    let tree = index_with(evaluator, 4)
        .await
        .expect("a non-root failure should not abort indexing");

    assert_eq!(tree.count(), expected);

    let Some(Derivation::Set(set1)) = tree.packages.get("set1") else {
        panic!("set1 missing");
    };
    let Some(Derivation::Set(group2)) = set1.get("group2") else {
        panic!("group2 missing");
    };
    assert_eq!(group2.get("deep"), Some(&Derivation::Set(PackageSet::new())));
    assert_eq!(group2.count(), 3);

    let Some(Derivation::Set(group1)) = set1.get("group1") else {
        panic!("group1 missing");
    };
    assert_eq!(group1.count(), 4);
}

#[tokio::test]
async fn test_mid_level_failure_skips_children() {
    let evaluator = Arc::new(
        MockEvaluator::from_tree(wide_tree()).with_failure(&["set0"], "infinite recursion"),
    );
    let tree = index_with(evaluator, 2).await.unwrap();

    assert_eq!(
        tree.packages.get("set0"),
        Some(&Derivation::Set(PackageSet::new()))
    );
    assert_eq!(tree.count(), 4 * (4 * (3 + 1) + 1) + 1);
}

#[tokio::test]
async fn test_undecodable_leaf_dropped() {
    let evaluator = Arc::new(MockEvaluator::from_tree(json!({
        "good": {"description": "fine", "version": "1"},
        "bad": {"description": "fine", "version": ["not", "a", "string"]},
    })));
    let tree = index_with(evaluator, 1).await.unwrap();

    assert_eq!(tree.count(), 1);
    assert!(tree.packages.get("bad").is_none());
}

/// Evaluator that panics when asked for one attribute path.
struct PanickingEvaluator {
    panic_at: Vec<String>,
}

#[async_trait]
impl Evaluator for PanickingEvaluator {
    async fn evaluate(&self, attrs: &[String]) -> Result<EvalOutput> {
        if attrs == self.panic_at.as_slice() {
            panic!("evaluator crashed at {attrs:?}");
        }
        match attrs {
            [] => Ok(EvalOutput::from([
                (
                    "ok".to_string(),
                    EvalEntry::Meta(json!({"description": "fine", "version": "1"})),
                ),
                ("boom".to_string(), EvalEntry::HasMore),
            ])),
            _ => Ok(EvalOutput::new()),
        }
    }
}

async fn index_panicking(panic_at: &[&str]) -> Result<nix_search_core::TopLevelPackages> {
    let evaluator = Arc::new(PanickingEvaluator {
        panic_at: panic_at.iter().map(|s| s.to_string()).collect(),
    });
    let opts = IndexOptions::default().with_parallelism(2);
    tokio::time::timeout(
        Duration::from_secs(10),
        index_packages(&opts, evaluator, &CancellationToken::new()),
    )
    .await
    .expect("indexing should not hang after a panic")
}

#[tokio::test]
async fn test_panicking_job_leaves_set_empty() {
    let tree = index_panicking(&["boom"]).await.unwrap();

    assert_eq!(tree.count(), 1);
    assert!(matches!(tree.packages.get("ok"), Some(Derivation::Package(_))));
    assert_eq!(
        tree.packages.get("boom"),
        Some(&Derivation::Set(PackageSet::new()))
    );
}

#[tokio::test]
async fn test_panicking_root_aborts() {
    let err = index_panicking(&[]).await.unwrap_err();
    assert!(matches!(err, Error::Evaluation { .. }));
    assert!(err.to_string().contains("evaluation task failed"));
}
