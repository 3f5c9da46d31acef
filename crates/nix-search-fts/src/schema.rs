//! Tantivy schema for package documents.
//!
//! One document per leaf package:
//!
//! | Field | Options | Tokenizer |
//! |-------|---------|-----------|
//! | `id` | STRING, STORED | raw rendered path |
//! | `path` | TEXT, STORED | `attr_path`: split on `.`, `#` and whitespace, lowercased |
//! | `name` | TEXT, STORED | `default`: split on non-alphanumerics, lowercased |
//! | `description` | TEXT, STORED | `en_stem`: simple tokenizer, lowercased, English stemmer |
//! | `json` | STORED | the full package record |

use nix_search_core::{Error, Result};
use tantivy::Index;
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, SchemaBuilder, TextFieldIndexing,
    TextOptions,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RegexTokenizer, SimpleTokenizer, Stemmer, TextAnalyzer,
};

/// Schema version for cache invalidation.
///
/// Increment this when schema fields change to force index rebuilds.
pub const SCHEMA_VERSION: u32 = 1;

/// Tokenizer for attribute paths.
pub const PATH_TOKENIZER: &str = "attr_path";

/// Tokenizer for package names.
pub const NAME_TOKENIZER: &str = "default";

/// Tokenizer for descriptions.
pub const DESCRIPTION_TOKENIZER: &str = "en_stem";

const PATH_TOKEN_PATTERN: &str = r"[^.#\s]+";

/// Field handles for the package schema.
#[derive(Clone)]
pub struct SearchSchema {
    schema: Schema,

    /// Rendered attribute path, untokenized. Unique per document.
    pub id: Field,
    /// Rendered attribute path, tokenized by path segment.
    pub path: Field,
    /// Package name.
    pub name: Field,
    /// One-line description.
    pub description: Field,
    /// Serialized [`nix_search_core::Package`].
    pub json: Field,
}

impl SearchSchema {
    /// Build the package schema.
    pub fn build() -> Self {
        let mut builder = SchemaBuilder::new();

        let text = |tokenizer: &str| {
            TextOptions::default()
                .set_indexing_options(
                    TextFieldIndexing::default()
                        .set_tokenizer(tokenizer)
                        .set_index_option(IndexRecordOption::WithFreqsAndPositions),
                )
                .set_stored()
        };

        let id = builder.add_text_field("id", STRING | STORED);
        let path = builder.add_text_field("path", text(PATH_TOKENIZER));
        let name = builder.add_text_field("name", text(NAME_TOKENIZER));
        let description = builder.add_text_field("description", text(DESCRIPTION_TOKENIZER));
        let json = builder.add_text_field("json", STORED);

        Self {
            schema: builder.build(),
            id,
            path,
            name,
            description,
            json,
        }
    }

    /// Get the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Register the custom tokenizers with an index.
    ///
    /// Must be called after creating or opening an index.
    pub fn register_tokenizers(index: &Index) -> Result<()> {
        let path = TextAnalyzer::builder(
            RegexTokenizer::new(PATH_TOKEN_PATTERN)
                .map_err(|e| Error::storage(format!("invalid path tokenizer: {e}")))?,
        )
        .filter(LowerCaser)
        .build();

        let en_stem = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .filter(Stemmer::new(Language::English))
            .build();

        index.tokenizers().register(PATH_TOKENIZER, path);
        index.tokenizers().register(DESCRIPTION_TOKENIZER, en_stem);
        Ok(())
    }

    /// Searchable fields in highlighting priority order.
    pub fn text_fields(&self) -> [Field; 3] {
        [self.path, self.name, self.description]
    }
}

impl Default for SearchSchema {
    fn default() -> Self {
        Self::build()
    }
}

// ============================================================================
// Tests
// ============================================================================
