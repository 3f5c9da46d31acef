//! Evaluator client.
//!
//! The catalog can only be explored through an external evaluator. Given an
//! attribute path, the evaluator reports the immediate children of that
//! node: either a leaf's metadata, or a marker that the child is a set with
//! more to explore.
//!
//! # Implementations
//!
//! - [`NixEvaluator`]: runs `nix-instantiate` with an embedded expression
//! - [`MockEvaluator`]: in-memory tree for tests

mod mock;
mod nix;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::error::Result;

pub use mock::MockEvaluator;
pub use nix::{NixEvaluator, resolve_flake_path};

/// One child reported by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalEntry {
    /// The child is a set that needs its own evaluation.
    HasMore,
    /// Raw metadata of a leaf, decoded into a package by the indexer.
    Meta(serde_json::Value),
}

impl EvalEntry {
    /// Convenience constructor for leaf metadata.
    pub fn meta(value: serde_json::Value) -> Self {
        EvalEntry::Meta(value)
    }
}

impl<'de> Deserialize<'de> for EvalEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let has_more = value
            .get("hasMore")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        Ok(if has_more {
            EvalEntry::HasMore
        } else {
            EvalEntry::Meta(value)
        })
    }
}

/// Children of one evaluated node, keyed by attribute name.
pub type EvalOutput = BTreeMap<String, EvalEntry>;

/// Source of catalog data.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Evaluate the node at `attrs` (relative to the catalog root) and
    /// return its immediate children.
    async fn evaluate(&self, attrs: &[String]) -> Result<EvalOutput>;
}
