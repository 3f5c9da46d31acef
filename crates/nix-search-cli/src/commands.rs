//! Binary entry points, independent of process setup.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use nix_search_core::{
    CancellationToken, Error, Evaluator, IndexOptions, TopLevelPackages, index_packages,
};
use nix_search_fts::{
    HighlightStyle, IndexMetadata, IndexStore, PackageSearcher, SearchConfig, SearchOptions,
};

use crate::output::{self, Styler};

/// How `search` presents its results.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub exact: bool,
    pub regex: bool,
    pub json: bool,
    pub color: bool,
    pub config: SearchConfig,
}

/// Cancel `token` on Ctrl-C.
pub fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            token.cancel();
        }
    });
}

/// Evaluate the package tree.
pub async fn build_tree<E>(
    opts: &IndexOptions,
    evaluator: Arc<E>,
    cancel: &CancellationToken,
) -> Result<TopLevelPackages>
where
    E: Evaluator + ?Sized + 'static,
{
    tracing::info!("indexing packages from {}", opts.root_name());
    let tree = index_packages(opts, evaluator, cancel)
        .await
        .context("failed to get package index")?;
    tracing::info!("evaluated {} packages", tree.count());
    Ok(tree)
}

/// Evaluate the package tree and commit it to `store`.
pub async fn rebuild_index<E>(
    store: &IndexStore,
    opts: &IndexOptions,
    evaluator: Arc<E>,
    cancel: &CancellationToken,
) -> Result<IndexMetadata>
where
    E: Evaluator + ?Sized + 'static,
{
    let tree = build_tree(opts, evaluator, cancel).await?;
    let store = store.clone();
    tokio::task::spawn_blocking(move || store.commit(&tree))
        .await
        .context("index commit task failed")?
        .context("failed to store indexed packages")
}

/// Search `store` and write the results to `out`.
pub fn search<W: Write>(
    store: &IndexStore,
    request: &SearchRequest,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<()> {
    let searcher = PackageSearcher::open(store)
        .context("failed to open the index (try running with --index)")?;

    let color = request.color && !request.json;
    let mut opts = SearchOptions::new()
        .exact(request.exact)
        .regex(request.regex)
        .config(request.config.clone());
    if color {
        opts = opts.highlight(HighlightStyle::ansi());
    }

    let results: Vec<_> = searcher
        .search(&request.query, &opts, cancel)
        .context("failed to search packages")?
        .collect();
    if cancel.is_cancelled() {
        return Err(Error::Cancelled.into());
    }
    tracing::debug!("{} results for {:?}", results.len(), request.query);

    if request.json {
        output::write_json(out, &results)?;
    } else {
        output::write_text(out, Styler::new(color), &request.query, results)?;
    }
    out.flush()?;
    Ok(())
}

/// Write `tree` as JSON.
pub fn dump<W: Write>(tree: &TopLevelPackages, pretty: bool, out: &mut W) -> Result<()> {
    let encoded = if pretty {
        serde_json::to_writer_pretty(&mut *out, tree)
    } else {
        serde_json::to_writer(&mut *out, tree)
    };
    encoded.context("failed to encode packages into JSON")?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
