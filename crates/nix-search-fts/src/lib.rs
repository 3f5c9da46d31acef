//! Full-text index and search for nix-search.
//!
//! This crate persists a [`nix_search_core::TopLevelPackages`] tree as a
//! versioned tantivy index and answers ranked, highlighted queries over it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      nix-search-fts                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IndexStore (versioned directories, atomic commit)          │
//! │  ├── Indexer (tantivy writer, one document per package)     │
//! │  ├── swap (renameat2 exchange)                              │
//! │  └── IndexMetadata (what a generation was built from)       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PackageSearcher                                            │
//! │  ├── QueryBuilder (term, words, substring, fuzzy, regex)    │
//! │  ├── Highlighter (snippets with pattern fallback)           │
//! │  └── SearchIter (lazy, paged, cancelable)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use nix_search_fts::{IndexStore, PackageSearcher, SearchOptions, HighlightStyle};
//!
//! let store = IndexStore::open_default()?;
//! store.commit(&tree)?;
//!
//! let searcher = PackageSearcher::open(&store)?;
//! let opts = SearchOptions::new().exact(true).highlight(HighlightStyle::ansi());
//! for result in searcher.search("firefox", &opts, &cancel)? {
//!     println!("{}", result.display().path);
//! }
//! ```

pub mod document;
pub mod highlight;
pub mod indexer;
pub mod metadata;
pub mod query;
pub mod schema;
pub mod searcher;
pub mod store;
pub mod swap;
pub mod types;

// Re-exports
pub use document::PackageDocument;
pub use highlight::HighlightStyle;
pub use indexer::Indexer;
pub use metadata::IndexMetadata;
pub use query::QueryBuilder;
pub use schema::{SCHEMA_VERSION, SearchSchema};
pub use searcher::{PackageSearcher, SearchIter};
pub use store::{INDEX_VERSIONS, IndexStore, default_base_dir};
pub use types::{SearchConfig, SearchOptions};
