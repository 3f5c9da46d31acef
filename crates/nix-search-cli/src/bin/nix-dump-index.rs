//! nix-dump-index
//!
//! Evaluate the package tree and write it to stdout as JSON.

#![forbid(unsafe_code)]

use std::io::BufWriter;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use nix_search_cli::commands;
use nix_search_cli::{Config, DumpArgs, logging};
use nix_search_core::{CancellationToken, NixEvaluator};

#[tokio::main]
async fn main() -> Result<()> {
    let args = DumpArgs::parse();
    logging::init(args.common.verbose);

    let config = Config::load(args.common.config.as_deref())?;
    let opts = args.index_args.options(&config)?;

    let cancel = CancellationToken::new();
    commands::cancel_on_interrupt(cancel.clone());

    let evaluator = Arc::new(NixEvaluator::for_options(&opts).await?);
    let tree = commands::build_tree(&opts, evaluator, &cancel).await?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    commands::dump(&tree, args.pretty, &mut out)
}
