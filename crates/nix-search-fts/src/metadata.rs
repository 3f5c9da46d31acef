//! Index metadata.
//!
//! Every committed generation carries a small JSON file describing what it
//! was built from. It is written into the generation directory before the
//! directory is swapped in, so it always describes the index next to it.

use std::path::Path;

use chrono::{DateTime, Utc};
use nix_search_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::schema::SCHEMA_VERSION;

/// Metadata filename stored in the index directory.
pub const METADATA_FILE: &str = "nix-search-metadata.json";

/// Metadata about a committed index generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Root name of the indexed catalog.
    pub channel: String,

    /// Whether the catalog is a flake.
    #[serde(default)]
    pub flake: bool,

    /// When the index was built.
    pub indexed_at: DateTime<Utc>,

    /// Number of documents in the index.
    pub document_count: usize,

    /// Schema version used for this index.
    pub schema_version: u32,
}

impl IndexMetadata {
    /// Create metadata stamped with the current time.
    pub fn new(channel: impl Into<String>, flake: bool, document_count: usize) -> Self {
        Self {
            channel: channel.into(),
            flake,
            indexed_at: Utc::now(),
            document_count,
            schema_version: SCHEMA_VERSION,
        }
    }

    /// Load metadata from the index directory.
    ///
    /// Returns `Ok(None)` if the metadata file doesn't exist.
    /// Returns `Err` if the file exists but cannot be parsed.
    pub fn load(index_path: &Path) -> Result<Option<Self>> {
        let metadata_path = index_path.join(METADATA_FILE);

        if !metadata_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&metadata_path)
            .map_err(|e| Error::io_with_path(e, &metadata_path))?;

        let metadata: Self = serde_json::from_str(&content)
            .map_err(|e| Error::storage(format!("Invalid metadata JSON: {e}")))?;

        Ok(Some(metadata))
    }

    /// Save metadata to the index directory.
    pub fn save(&self, index_path: &Path) -> Result<()> {
        let metadata_path = index_path.join(METADATA_FILE);
        let content = serde_json::to_string_pretty(self)?;

        std::fs::write(&metadata_path, content)
            .map_err(|e| Error::io_with_path(e, &metadata_path))?;

        Ok(())
    }

    /// Whether the index was built with the current schema.
    pub fn is_current_schema(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }
}
