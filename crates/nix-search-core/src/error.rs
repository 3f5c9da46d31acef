//! Error types for nix-search.
//!
//! A single error enum is shared by the library crates. The variants follow
//! the failure classes of the indexing and search pipeline:
//!
//! | Variant | Raised by | Policy |
//! |---------|-----------|--------|
//! | [`Error::Evaluation`] | evaluator client | fatal for the root job, subtree skipped otherwise |
//! | [`Error::Decode`] | indexer workers | the offending leaf is dropped |
//! | [`Error::Io`] / [`Error::Storage`] | commit protocol, searcher | the commit is aborted, the previous index stays intact |
//! | [`Error::Query`] | search engine | fatal to that request only |
//! | [`Error::Cancelled`] | everything | terminal, never reported as a failure |

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for nix-search operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while indexing or searching packages.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The external evaluator failed or produced unusable output.
    #[error("evaluation of {attrs:?} failed: {message}")]
    Evaluation {
        /// Dotted attribute path that was being evaluated.
        attrs: String,
        /// What went wrong.
        message: String,
        /// Diagnostic output captured from the evaluator.
        stderr: String,
    },

    /// A leaf's metadata could not be decoded into a package.
    #[error("cannot decode package {attr:?}: {source}")]
    Decode {
        /// Attribute name of the leaf.
        attr: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem error with the offending path.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The full-text engine rejected a storage operation.
    #[error("storage error: {message}")]
    Storage {
        /// What went wrong.
        message: String,
    },

    /// A search request could not be started.
    #[error("query error: {message}")]
    Query {
        /// What went wrong.
        message: String,
    },

    /// Something expected to exist does not.
    #[error("{what} not found: {name}")]
    NotFound {
        /// Kind of resource.
        what: &'static str,
        /// Name or path of the resource.
        name: String,
    },

    /// Configuration is invalid.
    #[error("configuration error: {message}")]
    Config {
        /// What is wrong with the configuration.
        message: String,
    },

    /// JSON serialization/deserialization error outside of leaf decoding.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Creates an evaluation error for the given attribute path.
    pub fn evaluation(attrs: &[String], message: impl Into<String>) -> Self {
        Error::Evaluation {
            attrs: attrs.join("."),
            message: message.into(),
            stderr: String::new(),
        }
    }

    /// Creates an evaluation error carrying captured stderr.
    pub fn evaluation_with_stderr(
        attrs: &[String],
        message: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Error::Evaluation {
            attrs: attrs.join("."),
            message: message.into(),
            stderr: stderr.into(),
        }
    }

    /// Creates a decode error for a leaf attribute.
    pub fn decode(attr: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Decode {
            attr: attr.into(),
            source,
        }
    }

    /// Wraps an I/O error with the path it happened at.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }

    /// Creates a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Error::Query {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(name: impl Into<String>, what: &'static str) -> Self {
        Error::NotFound {
            what,
            name: name.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns whether this error is a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Captured evaluator diagnostics, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Error::Evaluation { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}
