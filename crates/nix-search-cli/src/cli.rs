//! Argument parsing.

use std::path::{Path, PathBuf};

use clap::{Args, Parser};
use nix_search_core::IndexOptions;
use nix_search_fts::IndexStore;

use crate::config::Config;

/// Flags shared by every binary.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Verbosity level; 0 is least verbose (warn), 3 is most verbose
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(long, env = "NIX_SEARCH_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Flags selecting what to index.
#[derive(Debug, Clone, Default, Args)]
pub struct IndexArgs {
    /// Channel path to index, e.g. `<nixpkgs>`
    #[arg(short, long, value_parser = parse_channel, conflicts_with = "flake")]
    pub channel: Option<String>,

    /// Flake to index instead of a channel
    #[arg(long)]
    pub flake: Option<String>,

    /// Max parallel evaluations
    #[arg(short = 'j', long)]
    pub max_jobs: Option<usize>,
}

impl IndexArgs {
    /// Merge flags over file settings.
    ///
    /// A channel or flake given on the command line replaces both file
    /// values.
    pub fn options(&self, config: &Config) -> anyhow::Result<IndexOptions> {
        let (channel, flake) = if self.channel.is_some() || self.flake.is_some() {
            (self.channel.clone(), self.flake.clone())
        } else {
            (config.channel.clone(), config.flake.clone())
        };

        let mut opts = IndexOptions::default();
        match (channel, flake) {
            (Some(_), Some(_)) => {
                anyhow::bail!("cannot set both a channel and a flake");
            }
            (Some(channel), None) => {
                opts = opts.with_nixpkgs(parse_channel(&channel).map_err(anyhow::Error::msg)?);
            }
            (None, Some(flake)) => opts = opts.with_flake(flake),
            (None, None) => {}
        }
        if let Some(jobs) = self.max_jobs.or(config.parallelism) {
            opts = opts.with_parallelism(jobs);
        }
        Ok(opts)
    }
}

/// Search for packages in the Nix package index.
#[derive(Debug, Parser)]
#[command(name = "nix-search", author, version, about, long_about = None)]
pub struct SearchArgs {
    /// Search query
    pub query: Option<String>,

    /// Update the index before searching
    #[arg(short, long)]
    pub index: bool,

    /// Only show results containing the query literally (`--exact=false` to disable)
    #[arg(
        short,
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub exact: Option<bool>,

    /// Treat the query as a regular expression
    #[arg(short, long)]
    pub regex: bool,

    /// Output results as JSON, implies --no-color
    #[arg(long)]
    pub json: bool,

    /// Do not use color in output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Path to the index directory, defaults to a directory in $XDG_CACHE_HOME
    #[arg(long, env = "NIX_SEARCH_INDEX_PATH")]
    pub index_path: Option<PathBuf>,

    #[command(flatten)]
    pub index_args: IndexArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl SearchArgs {
    /// Effective exact-match setting.
    pub fn exact(&self, config: &Config) -> bool {
        self.exact.or(config.exact).unwrap_or(true)
    }

    /// Index storage selected by flags, then file, then the default.
    pub fn store(&self, config: &Config) -> anyhow::Result<IndexStore> {
        match self.index_path.as_deref().or(config.index_path.as_deref()) {
            Some(path) => Ok(IndexStore::new(expand_home(path))),
            None => Ok(IndexStore::open_default()?),
        }
    }
}

/// Dump a new index of packages to stdout.
#[derive(Debug, Parser)]
#[command(name = "nix-dump-index", author, version, about, long_about = None)]
pub struct DumpArgs {
    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub index_args: IndexArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Accept only `<name>` channel expressions.
pub fn parse_channel(value: &str) -> Result<String, String> {
    if value.len() > 2 && value.starts_with('<') && value.ends_with('>') {
        Ok(value.to_string())
    } else {
        Err(format!("invalid channel {value:?}, expected <name>"))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

// ============================================================================
// Tests
// ============================================================================
