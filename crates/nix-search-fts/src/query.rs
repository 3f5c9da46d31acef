//! Query building.
//!
//! A plain query is a disjunction of several strategies over the path, name
//! and description fields, each weighted so that closer matches rank
//! higher:
//!
//! | Strategy | path | name | description |
//! |----------|------|------|-------------|
//! | whole term | 16 | 8 | |
//! | analyzed words | 6 | 4 | 2 |
//! | substring | 4 | 2 | 1 |
//! | fuzzy | 4 | 2 | 1 |
//!
//! A regex query matches terms of the name (weight 2) and description
//! fields.

use nix_search_core::{Error, Result};
use tantivy::query::{
    AllQuery, BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, RegexQuery, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, Term};

use crate::schema::SearchSchema;
use crate::types::SearchConfig;

/// Largest edit distance tantivy builds automata for.
const MAX_FUZZY_DISTANCE: u8 = 2;

type Clause = (Occur, Box<dyn Query>);

fn should(query: impl Query + 'static, boost: f32) -> Clause {
    if boost == 1.0 {
        (Occur::Should, Box::new(query))
    } else {
        (Occur::Should, Box::new(BoostQuery::new(Box::new(query), boost)))
    }
}

/// Builder for package search queries.
pub struct QueryBuilder<'a> {
    index: &'a Index,
    schema: &'a SearchSchema,
    fuzzy_distance: u8,
}

impl<'a> QueryBuilder<'a> {
    /// Create a new query builder.
    pub fn new(index: &'a Index, schema: &'a SearchSchema, config: &SearchConfig) -> Self {
        Self {
            index,
            schema,
            fuzzy_distance: config.fuzzy_distance.min(MAX_FUZZY_DISTANCE),
        }
    }

    /// Build a query from the search string.
    ///
    /// An empty query matches every document.
    pub fn build(&self, query: &str, regex: bool) -> Result<Box<dyn Query>> {
        if query.trim().is_empty() {
            return Ok(Box::new(AllQuery));
        }
        if regex {
            self.build_regex(query)
        } else {
            self.build_text(query)
        }
    }

    fn build_regex(&self, query: &str) -> Result<Box<dyn Query>> {
        let regex = |field| {
            RegexQuery::from_pattern(query, field)
                .map_err(|e| Error::query(format!("invalid regular expression {query:?}: {e}")))
        };
        let clauses = vec![
            should(regex(self.schema.name)?, 2.0),
            should(regex(self.schema.description)?, 1.0),
        ];
        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    fn build_text(&self, query: &str) -> Result<Box<dyn Query>> {
        let s = self.schema;
        let lower = query.to_lowercase();
        let mut clauses: Vec<Clause> = Vec::new();

        // Whole term.
        for (field, boost) in [(s.path, 16.0), (s.name, 8.0)] {
            clauses.push(should(
                TermQuery::new(
                    Term::from_field_text(field, &lower),
                    IndexRecordOption::WithFreqsAndPositions,
                ),
                boost,
            ));
        }

        // Analyzed words.
        for (field, boost) in [(s.path, 6.0), (s.name, 4.0), (s.description, 2.0)] {
            if let Some(query) = self.analyzed(field, query)? {
                clauses.push(should(query, boost));
            }
        }

        // Substring.
        let pattern = format!(".*{}.*", regex::escape(&lower));
        for (field, boost) in [(s.path, 4.0), (s.name, 2.0), (s.description, 1.0)] {
            match RegexQuery::from_pattern(&pattern, field) {
                Ok(query) => clauses.push(should(query, boost)),
                Err(e) => log::debug!("skipping substring clause for {query:?}: {e}"),
            }
        }

        // Fuzzy.
        if self.fuzzy_distance > 0 {
            for (field, boost) in [(s.path, 4.0), (s.name, 2.0), (s.description, 1.0)] {
                clauses.push(should(
                    FuzzyTermQuery::new(
                        Term::from_field_text(field, &lower),
                        self.fuzzy_distance,
                        true,
                    ),
                    boost,
                ));
            }
        }

        log::trace!("built {} clauses for {query:?}", clauses.len());
        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    /// Run `text` through the field's analyzer and OR the resulting terms.
    fn analyzed(&self, field: Field, text: &str) -> Result<Option<BooleanQuery>> {
        let mut analyzer = self
            .index
            .tokenizer_for_field(field)
            .map_err(|e| Error::query(format!("no tokenizer for field: {e}")))?;

        let mut terms: Vec<Term> = Vec::new();
        let mut stream = analyzer.token_stream(text);
        while stream.advance() {
            let term = Term::from_field_text(field, &stream.token().text);
            if !terms.contains(&term) {
                terms.push(term);
            }
        }

        if terms.is_empty() {
            return Ok(None);
        }
        let clauses = terms
            .into_iter()
            .map(|term| -> Clause {
                (
                    Occur::Should,
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs)),
                )
            })
            .collect();
        Ok(Some(BooleanQuery::new(clauses)))
    }
}

// ============================================================================
// Tests
// ============================================================================
