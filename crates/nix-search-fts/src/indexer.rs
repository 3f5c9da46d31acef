//! Tantivy index writer wrapper.
//!
//! This module provides `Indexer`, a wrapper around Tantivy's `IndexWriter`
//! that converts package trees into documents.
//!
//! # Usage
//!
//! ```rust,ignore
//! use nix_search_fts::{Indexer, SearchSchema};
//!
//! let schema = SearchSchema::build();
//! let mut indexer = Indexer::create(&dir, &schema)?;
//! let count = indexer.add_tree(&tree)?;
//! indexer.finish()?;
//! ```

use std::ops::ControlFlow;
use std::path::Path;

use nix_search_core::{AttrPath, Error, Package, Result, TopLevelPackages};
use tantivy::{Index, IndexWriter, Term};

use crate::document::PackageDocument;
use crate::schema::SearchSchema;

/// Index writer buffer size (50MB).
const WRITER_BUFFER_SIZE: usize = 50_000_000;

/// Tantivy index writer wrapper.
pub struct Indexer {
    index: Index,
    writer: IndexWriter,
    schema: SearchSchema,
}

impl Indexer {
    /// Create a new, empty index in `dir`.
    ///
    /// The directory is created if needed; it must not already hold an
    /// index.
    pub fn create(dir: &Path, schema: &SearchSchema) -> Result<Self> {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| Error::io_with_path(e, dir))?;
        }

        let index = Index::create_in_dir(dir, schema.schema().clone())
            .map_err(|e| Error::storage(format!("Failed to create index: {e}")))?;
        Self::with_index(index, schema)
    }

    /// Create an in-memory index (for testing).
    pub fn new_in_memory(schema: &SearchSchema) -> Result<Self> {
        Self::with_index(Index::create_in_ram(schema.schema().clone()), schema)
    }

    fn with_index(index: Index, schema: &SearchSchema) -> Result<Self> {
        SearchSchema::register_tokenizers(&index)?;

        let writer = index
            .writer(WRITER_BUFFER_SIZE)
            .map_err(|e| Error::storage(format!("Failed to create index writer: {e}")))?;

        Ok(Self {
            index,
            writer,
            schema: schema.clone(),
        })
    }

    /// Stage one package.
    ///
    /// A document with the same path is replaced.
    pub fn add_package(&mut self, path: &AttrPath, pkg: &Package) -> Result<()> {
        let doc = PackageDocument::new(path, pkg)?;
        self.writer
            .delete_term(Term::from_field_text(self.schema.id, &doc.id));
        self.writer
            .add_document(doc.to_tantivy(&self.schema))
            .map_err(|e| Error::storage(format!("Failed to add document: {e}")))?;
        Ok(())
    }

    /// Stage every leaf of `tree`, returning how many were staged.
    pub fn add_tree(&mut self, tree: &TopLevelPackages) -> Result<usize> {
        let mut count = 0usize;
        let flow = tree.walk(|path, pkg| match self.add_package(path, pkg) {
            Ok(()) => {
                count += 1;
                ControlFlow::Continue(())
            }
            Err(err) => ControlFlow::Break(err),
        });
        if let ControlFlow::Break(err) = flow {
            return Err(err);
        }
        log::debug!("staged {count} documents");
        Ok(count)
    }

    /// Commit staged changes to make them searchable.
    pub fn commit(&mut self) -> Result<()> {
        self.writer
            .commit()
            .map_err(|e| Error::storage(format!("Failed to commit index: {e}")))?;
        Ok(())
    }

    /// Commit and wait for background merges, consuming the writer.
    pub fn finish(mut self) -> Result<Index> {
        self.commit()?;
        self.writer
            .wait_merging_threads()
            .map_err(|e| Error::storage(format!("Failed to merge index segments: {e}")))?;
        Ok(self.index)
    }
}

// ============================================================================
// Tests
// ============================================================================
