//! # nix-search-cli
//!
//! Command-line front ends for nix-search:
//!
//! - `nix-search [options] [query]` searches the package index, building it
//!   first when none exists or `--index` is given
//! - `nix-dump-index` evaluates the package tree and prints it as JSON
//!
//! ## Configuration
//!
//! Settings are read from a TOML file (see [`config`]) and overridden by
//! command-line flags and their environment variables:
//!
//! - `NIX_SEARCH_CONFIG` - Configuration file path
//! - `NIX_SEARCH_INDEX_PATH` - Index storage directory
//! - `NO_COLOR` - Disable colored output
//! - `RUST_LOG` - Log filter, overrides `-v`

#![forbid(unsafe_code)]
#![warn(clippy::all)]
// CLI output goes to stdout by design of the tool
#![allow(clippy::print_stdout)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod output;

pub use cli::{CommonArgs, DumpArgs, IndexArgs, SearchArgs};
pub use config::Config;
