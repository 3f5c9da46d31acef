//! nix-search core: package tree model, evaluator client and the concurrent
//! indexer.
//!
//! This crate has no full-text dependencies. It produces a
//! [`TopLevelPackages`] tree that `nix-search-fts` persists and searches.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`path`]: Attribute paths
//! - [`package`]: Package tree and search result records
//! - [`evaluator`]: The `Evaluator` trait with Nix and mock implementations
//! - [`indexer`]: Concurrent tree crawler

#![doc = include_str!("../README.md")]

pub mod error;
pub mod evaluator;
pub mod indexer;
pub mod package;
pub mod path;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use evaluator::{EvalEntry, EvalOutput, Evaluator, MockEvaluator, NixEvaluator};
pub use indexer::{IndexOptions, index_packages};
pub use package::{Derivation, Package, PackageSet, SearchedPackage, TopLevelPackages};
pub use path::AttrPath;

// Cancellation is part of the public API.
pub use tokio_util::sync::CancellationToken;
