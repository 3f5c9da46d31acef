//! nix-search
//!
//! Search for packages in the Nix package index.

#![forbid(unsafe_code)]

use std::io::{BufWriter, IsTerminal};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use nix_search_cli::commands::{self, SearchRequest};
use nix_search_cli::{Config, SearchArgs, logging};
use nix_search_core::{CancellationToken, NixEvaluator};

#[tokio::main]
async fn main() -> Result<()> {
    let args = SearchArgs::parse();
    logging::init(args.common.verbose);

    let config = Config::load(args.common.config.as_deref())?;
    let store = args.store(&config)?;

    let cancel = CancellationToken::new();
    commands::cancel_on_interrupt(cancel.clone());

    let mut rebuild = args.index;
    if !store.exists() {
        tracing::info!("first run or outdated index detected, will index packages");
        rebuild = true;
    }

    if rebuild {
        let opts = args.index_args.options(&config)?;
        let evaluator = Arc::new(NixEvaluator::for_options(&opts).await?);
        commands::rebuild_index(&store, &opts, evaluator, &cancel).await?;
    }

    let Some(query) = args.query.clone() else {
        return Ok(());
    };

    let stdout = std::io::stdout();
    let color = !args.no_color && stdout.is_terminal();
    let request = SearchRequest {
        query,
        exact: args.exact(&config),
        regex: args.regex,
        json: args.json,
        color,
        config: config.search.clone(),
    };

    let mut out = BufWriter::new(stdout.lock());
    commands::search(&store, &request, &cancel, &mut out)
}
