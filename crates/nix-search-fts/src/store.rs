//! Versioned index storage.
//!
//! Layout under the base directory:
//!
//! ```text
//! <base>/
//! ├── .lock               advisory lock held while committing
//! ├── index-v1/           current generation (last of INDEX_VERSIONS)
//! │   ├── meta.json       tantivy
//! │   ├── ...             tantivy segments
//! │   └── nix-search-metadata.json
//! └── .tmp-index-XXXXXX/  generation being built (transient)
//! ```
//!
//! A commit builds the new generation in a temporary directory next to the
//! current one, then exchanges the two directories (see [`crate::swap`]). A
//! reader that opened the old generation keeps reading it; readers opened
//! after the exchange see the new one. Anything failing before the exchange
//! leaves the current generation untouched.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use nix_search_core::{Error, Result, TopLevelPackages};

use crate::indexer::Indexer;
use crate::metadata::IndexMetadata;
use crate::schema::SearchSchema;
use crate::swap;

/// Known index directory names, oldest first. The last one is current.
pub const INDEX_VERSIONS: &[&str] = &["index", "index-v1"];

const LOCK_FILE: &str = ".lock";
const TEMP_PREFIX: &str = ".tmp-index-";
const APP_DIR: &str = "nix-search";

/// Handle to the index storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStore {
    base: PathBuf,
}

impl IndexStore {
    /// Use `base` as the storage directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Use the default storage directory, `$XDG_CACHE_HOME/nix-search`.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(default_base_dir()?))
    }

    /// The storage directory.
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Directory of the current generation.
    pub fn current_dir(&self) -> PathBuf {
        self.base.join(current_version())
    }

    /// Whether a current generation has been committed.
    pub fn exists(&self) -> bool {
        self.current_dir().join("meta.json").is_file()
    }

    /// Metadata of the current generation.
    pub fn metadata(&self) -> Result<Option<IndexMetadata>> {
        IndexMetadata::load(&self.current_dir())
    }

    /// Replace the current generation with an index of `tree`.
    pub fn commit(&self, tree: &TopLevelPackages) -> Result<IndexMetadata> {
        std::fs::create_dir_all(&self.base).map_err(|e| Error::io_with_path(e, &self.base))?;
        let _lock = self.lock()?;
        self.remove_abandoned_builds();

        let temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir_in(&self.base)
            .map_err(|e| Error::io_with_path(e, &self.base))?;
        log::debug!("building index in {}", temp.path().display());

        let schema = SearchSchema::build();
        let mut indexer = Indexer::create(temp.path(), &schema)?;
        let count = indexer.add_tree(tree)?;
        drop(indexer.finish()?);

        let metadata = IndexMetadata::new(tree.channel.clone(), tree.flake, count);
        metadata.save(temp.path())?;

        let current = self.current_dir();
        if !current.exists() {
            std::fs::create_dir_all(&current).map_err(|e| Error::io_with_path(e, &current))?;
        }
        swap::require_dir(&current)?;
        swap::exchange(temp.path(), &current)?;

        // The temporary directory now holds the previous generation.
        let previous = temp.path().to_path_buf();
        if let Err(e) = temp.close() {
            log::error!(
                "cannot remove previous index generation {}: {e}",
                previous.display()
            );
        }
        self.remove_stale_versions();

        log::info!(
            "committed index of {count} packages from {} to {}",
            tree.channel,
            current.display()
        );
        Ok(metadata)
    }

    fn lock(&self) -> Result<File> {
        let path = self.base.join(LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::io_with_path(e, &path))?;
        file.lock_exclusive()
            .map_err(|e| Error::io_with_path(e, &path))?;
        Ok(file)
    }

    fn remove_stale_versions(&self) {
        let Some((_, stale)) = INDEX_VERSIONS.split_last() else {
            return;
        };
        for version in stale {
            let dir = self.base.join(version);
            if dir.exists() {
                log::debug!("removing stale index {}", dir.display());
                if let Err(e) = std::fs::remove_dir_all(&dir) {
                    log::warn!("cannot remove stale index {}: {e}", dir.display());
                }
            }
        }
    }

    /// Remove temporary directories left by interrupted commits. Only called
    /// while holding the commit lock.
    fn remove_abandoned_builds(&self) {
        let Ok(entries) = std::fs::read_dir(&self.base) else {
            return;
        };
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
                let path = entry.path();
                log::debug!("removing abandoned index build {}", path.display());
                if let Err(e) = std::fs::remove_dir_all(&path) {
                    log::warn!("cannot remove {}: {e}", path.display());
                }
            }
        }
    }
}

/// Name of the current index directory.
pub fn current_version() -> &'static str {
    INDEX_VERSIONS.last().copied().unwrap_or("index")
}

/// Default storage directory.
pub fn default_base_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| Error::config("cannot determine the user cache directory"))
}

// ============================================================================
// Tests
// ============================================================================
