//! In-memory evaluator for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{EvalEntry, EvalOutput, Evaluator};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
enum Response {
    Output(EvalOutput),
    Fail(String),
}

/// Evaluator serving a fixed tree.
///
/// Responses are registered per attribute path. Any path without a response
/// fails with an evaluation error.
///
/// ```
/// use nix_search_core::evaluator::MockEvaluator;
/// use serde_json::json;
///
/// let evaluator = MockEvaluator::from_tree(json!({
///     "a": {"description": "A tool", "version": "1.0"},
///     "b": {"c": {"description": "B C tool", "version": "2.0"}},
/// }));
/// assert_eq!(evaluator.leaf_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockEvaluator {
    responses: HashMap<Vec<String>, Response>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an evaluator from a nested JSON object.
    ///
    /// Objects with a `description` key are leaves; every other object is
    /// a set that reports `hasMore` to its parent.
    pub fn from_tree(tree: serde_json::Value) -> Self {
        let mut evaluator = Self::new();
        evaluator.register(Vec::new(), &tree);
        evaluator
    }

    fn register(&mut self, attrs: Vec<String>, node: &serde_json::Value) {
        let mut output = EvalOutput::new();
        if let Some(children) = node.as_object() {
            for (name, child) in children {
                if is_leaf(child) {
                    output.insert(name.clone(), EvalEntry::Meta(child.clone()));
                } else {
                    output.insert(name.clone(), EvalEntry::HasMore);
                    let mut child_attrs = attrs.clone();
                    child_attrs.push(name.clone());
                    self.register(child_attrs, child);
                }
            }
        }
        self.responses.insert(attrs, Response::Output(output));
    }

    /// Set the response for one attribute path.
    pub fn with_output(mut self, attrs: &[&str], output: EvalOutput) -> Self {
        self.responses.insert(owned(attrs), Response::Output(output));
        self
    }

    /// Make evaluation of one attribute path fail.
    pub fn with_failure(mut self, attrs: &[&str], message: impl Into<String>) -> Self {
        self.responses
            .insert(owned(attrs), Response::Fail(message.into()));
        self
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `evaluate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of leaves reachable through registered responses.
    pub fn leaf_count(&self) -> usize {
        self.count_from(&[])
    }

    fn count_from(&self, attrs: &[String]) -> usize {
        let Some(Response::Output(output)) = self.responses.get(attrs) else {
            return 0;
        };
        output
            .iter()
            .map(|(name, entry)| match entry {
                EvalEntry::Meta(_) => 1,
                EvalEntry::HasMore => {
                    let mut child = attrs.to_vec();
                    child.push(name.clone());
                    self.count_from(&child)
                }
            })
            .sum()
    }
}

fn is_leaf(node: &serde_json::Value) -> bool {
    node.get("description").is_some() || !node.is_object()
}

fn owned(attrs: &[&str]) -> Vec<String> {
    attrs.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl Evaluator for MockEvaluator {
    async fn evaluate(&self, attrs: &[String]) -> Result<EvalOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.responses.get(attrs) {
            Some(Response::Output(output)) => Ok(output.clone()),
            Some(Response::Fail(message)) => Err(Error::evaluation_with_stderr(
                attrs,
                message.clone(),
                format!("error: {message}"),
            )),
            None => Err(Error::evaluation(attrs, "attribute not found")),
        }
    }
}
