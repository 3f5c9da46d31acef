//! Configuration file.
//!
//! ```toml
//! index_path = "~/.cache/nix-search"
//! channel = "<nixpkgs>"      # or: flake = "nixpkgs"
//! parallelism = 8
//! exact = true
//!
//! [search]
//! fuzzy_distance = 1
//! snippet_length = 256
//! page_size = 100
//! ```
//!
//! An explicit path (`--config` or `NIX_SEARCH_CONFIG`) must exist. The
//! default location, `$XDG_CONFIG_HOME/nix-search/config.toml`, is optional.

use std::path::{Path, PathBuf};

use nix_search_core::{Error, Result};
use nix_search_fts::SearchConfig;
use serde::{Deserialize, Serialize};

const CONFIG_DIR: &str = "nix-search";
const CONFIG_FILE: &str = "config.toml";

/// Settings loaded from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Index storage directory.
    pub index_path: Option<PathBuf>,
    /// Channel to index, e.g. `<nixpkgs>`.
    pub channel: Option<String>,
    /// Flake to index instead of a channel.
    pub flake: Option<String>,
    /// Concurrent evaluations while indexing.
    pub parallelism: Option<usize>,
    /// Only show results containing the query literally.
    pub exact: Option<bool>,
    /// Search engine tunables.
    pub search: SearchConfig,
}

impl Config {
    /// Load from `explicit`, or from the default location if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        tracing::debug!("loaded configuration from {}", path.display());
        Self::from_toml(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parse configuration text.
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}

/// Default configuration file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

// ============================================================================
// Tests
// ============================================================================
