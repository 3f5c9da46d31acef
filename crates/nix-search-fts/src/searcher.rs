//! Search execution.
//!
//! [`PackageSearcher::search`] returns a [`SearchIter`] that yields results
//! in descending score order. Hits are fetched a page at a time from one
//! searcher snapshot, so a commit that lands while iterating is never seen
//! by the running search.

use std::collections::VecDeque;
use std::ops::Range;
use std::path::Path;

use nix_search_core::{CancellationToken, Error, Result, SearchedPackage};
use tantivy::collector::TopDocs;
use tantivy::query::Query;
use tantivy::{DocAddress, Index, IndexReader, ReloadPolicy, Searcher, TantivyDocument};

use crate::document::PackageDocument;
use crate::highlight::{Highlighter, literal_pattern, regex_pattern};
use crate::query::QueryBuilder;
use crate::schema::{SCHEMA_VERSION, SearchSchema};
use crate::store::IndexStore;
use crate::types::SearchOptions;

/// Read handle on a committed index.
pub struct PackageSearcher {
    index: Index,
    reader: IndexReader,
    schema: SearchSchema,
}

impl PackageSearcher {
    /// Open the current generation of `store`.
    pub fn open(store: &IndexStore) -> Result<Self> {
        if !store.exists() {
            return Err(Error::not_found(
                store.current_dir().display().to_string(),
                "index",
            ));
        }
        match store.metadata() {
            Ok(Some(metadata)) if !metadata.is_current_schema() => log::warn!(
                "index schema version {} differs from {SCHEMA_VERSION}, rebuild with --index",
                metadata.schema_version
            ),
            Ok(_) => {}
            Err(e) => log::warn!("cannot read index metadata: {e}"),
        }
        Self::open_dir(&store.current_dir())
    }

    /// Open an index directory directly.
    pub fn open_dir(dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(dir).map_err(|e| {
            Error::storage(format!("Failed to open index at {}: {e}", dir.display()))
        })?;
        Self::from_index(index)
    }

    /// Wrap an already opened index.
    pub fn from_index(index: Index) -> Result<Self> {
        SearchSchema::register_tokenizers(&index)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| Error::storage(format!("Failed to create index reader: {e}")))?;
        Ok(Self {
            index,
            reader,
            schema: SearchSchema::build(),
        })
    }

    /// Number of indexed packages.
    pub fn count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Start a search.
    ///
    /// Fails only if the query cannot be built. Iteration stops early once
    /// `cancel` fires.
    pub fn search(
        &self,
        query: &str,
        opts: &SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<SearchIter> {
        log::debug!(
            "searching query={query:?} exact={} regex={}",
            opts.exact,
            opts.regex
        );

        let built = QueryBuilder::new(&self.index, &self.schema, &opts.config)
            .build(query, opts.regex)?;
        let searcher = self.reader.searcher();

        let highlighter = opts.highlight.clone().map(|style| {
            let fallback = if opts.regex {
                regex_pattern(query)
            } else {
                literal_pattern(query)
            };
            Highlighter::new(
                &searcher,
                built.as_ref(),
                &self.schema,
                style,
                fallback,
                opts.config.snippet_length,
            )
        });

        Ok(SearchIter {
            searcher,
            query: built,
            schema: self.schema.clone(),
            literal: opts.exact.then(|| query.to_string()),
            highlighter,
            page: VecDeque::new(),
            offset: 0,
            page_size: opts.config.page_size.max(1),
            exhausted: false,
            cancel: cancel.clone(),
        })
    }
}

/// Lazy, rank-ordered stream of search results.
pub struct SearchIter {
    searcher: Searcher,
    query: Box<dyn Query>,
    schema: SearchSchema,
    /// Literal the results must contain, in exact mode.
    literal: Option<String>,
    highlighter: Option<Highlighter>,
    page: VecDeque<DocAddress>,
    offset: usize,
    page_size: usize,
    exhausted: bool,
    cancel: CancellationToken,
}

impl SearchIter {
    fn next_address(&mut self) -> Option<DocAddress> {
        if self.page.is_empty() && !self.exhausted {
            self.fetch_page();
        }
        self.page.pop_front()
    }

    fn fetch_page(&mut self) {
        let collector = TopDocs::with_limit(self.page_size).and_offset(self.offset).order_by_score();
        match self.searcher.search(self.query.as_ref(), &collector) {
            Ok(hits) => {
                log::trace!("fetched {} hits at offset {}", hits.len(), self.offset);
                if hits.len() < self.page_size {
                    self.exhausted = true;
                }
                self.offset += hits.len();
                self.page.extend(hits.into_iter().map(|(_, address)| address));
            }
            Err(e) => {
                log::error!("search failed: {e}");
                self.exhausted = true;
            }
        }
    }
}

impl Iterator for SearchIter {
    type Item = SearchedPackage;

    fn next(&mut self) -> Option<SearchedPackage> {
        loop {
            if self.cancel.is_cancelled() {
                log::debug!("search cancelled");
                return None;
            }

            let address = self.next_address()?;
            let doc: TantivyDocument = match self.searcher.doc(address) {
                Ok(doc) => doc,
                Err(e) => {
                    log::error!("cannot load document: {e}");
                    continue;
                }
            };

            let mut result = match PackageDocument::from_tantivy(&doc, &self.schema).to_searched() {
                Ok(result) => result,
                Err(e) => {
                    log::error!("{e}");
                    continue;
                }
            };

            let exact = match &self.literal {
                Some(literal) => match find_literal(&result, literal) {
                    Some(found) => Some(found),
                    None => continue,
                },
                None => None,
            };

            if let Some(highlighter) = &mut self.highlighter {
                result.highlighted = Some(Box::new(highlighter.highlight(&result, exact)));
            }
            return Some(result);
        }
    }
}

/// First of path, name and description containing `literal`, with the span.
fn find_literal(result: &SearchedPackage, literal: &str) -> Option<(usize, Range<usize>)> {
    [
        result.path.as_str(),
        result.package.name.as_str(),
        result.package.description.as_str(),
    ]
    .iter()
    .enumerate()
    .find_map(|(field, text)| {
        text.find(literal)
            .map(|start| (field, start..start + literal.len()))
    })
}

// ============================================================================
// Tests
// ============================================================================
