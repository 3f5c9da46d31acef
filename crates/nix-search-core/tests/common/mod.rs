//! Common test utilities for indexer integration tests.

use std::sync::Arc;

use nix_search_core::{
    CancellationToken, IndexOptions, MockEvaluator, Result, TopLevelPackages, index_packages,
};
use serde_json::{Value, json};

/// Small tree with one top-level leaf and one nested set.
pub fn scenario_tree() -> Value {
    json!({
        "a": {"description": "A tool", "version": "1.0"},
        "b": {
            "c": {"description": "B C tool", "version": "2.0"},
        },
    })
}

/// Wider and deeper tree, three levels of nested sets.
pub fn wide_tree() -> Value {
    let mut root = serde_json::Map::new();
    for i in 0..5 {
        let mut level1 = serde_json::Map::new();
        for j in 0..4 {
            let mut level2 = serde_json::Map::new();
            for k in 0..3 {
                level2.insert(
                    format!("pkg{k}"),
                    json!({"description": format!("package {i}.{j}.{k}"), "version": "1.0"}),
                );
            }
            level2.insert(
                "deep".into(),
                json!({"leaf": {"description": format!("deep leaf {i}.{j}")}}),
            );
            level1.insert(format!("group{j}"), Value::Object(level2));
        }
        level1.insert(
            format!("tool{i}"),
            json!({"description": format!("tool number {i}"), "version": format!("{i}.0")}),
        );
        root.insert(format!("set{i}"), Value::Object(level1));
    }
    root.insert("hello".into(), json!({"description": "greeting", "version": "2.12"}));
    Value::Object(root)
}

/// Index `evaluator` with the given number of workers.
pub async fn index_with(
    evaluator: Arc<MockEvaluator>,
    parallelism: usize,
) -> Result<TopLevelPackages> {
    let opts = IndexOptions::default().with_parallelism(parallelism);
    index_packages(&opts, evaluator, &CancellationToken::new()).await
}
