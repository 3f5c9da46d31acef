//! `nix-instantiate` adapter.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use super::{EvalOutput, Evaluator};
use crate::error::{Error, Result};
use crate::indexer::IndexOptions;

/// Nix expression listing the immediate children of one attribute set.
const DUMP_PACKAGES_EXPR: &str = include_str!("../../nix/dump_packages.nix");

const NIX_INSTANTIATE: &str = "nix-instantiate";
const NIX: &str = "nix";

/// Evaluator backed by `nix-instantiate --eval`.
#[derive(Debug, Clone)]
pub struct NixEvaluator {
    nixpkgs: String,
    program: String,
}

impl NixEvaluator {
    /// Create an evaluator for a channel expression such as `<nixpkgs>` or a
    /// store path.
    pub fn new(nixpkgs: impl Into<String>) -> Self {
        Self {
            nixpkgs: nixpkgs.into(),
            program: NIX_INSTANTIATE.to_string(),
        }
    }

    /// Create an evaluator for indexing options, resolving the flake first
    /// when one is set.
    pub async fn for_options(opts: &IndexOptions) -> Result<Self> {
        match &opts.flake {
            Some(flake) => Ok(Self::new(resolve_flake_path(flake).await?)),
            None => Ok(Self::new(opts.nixpkgs.clone())),
        }
    }

    /// Use a different `nix-instantiate` binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// The channel expression passed to the evaluator.
    pub fn nixpkgs(&self) -> &str {
        &self.nixpkgs
    }
}

#[async_trait]
impl Evaluator for NixEvaluator {
    async fn evaluate(&self, attrs: &[String]) -> Result<EvalOutput> {
        let attrs_arg = to_nix_list(attrs);
        log::trace!(
            "executing {} channel={} attrs={}",
            self.program,
            self.nixpkgs,
            attrs_arg
        );

        let started = Instant::now();
        let output = Command::new(&self.program)
            .args(["--eval", "--json", "--strict", "-E", DUMP_PACKAGES_EXPR])
            .args(["--arg", "channel", &self.nixpkgs])
            .args(["--arg", "attrs", &attrs_arg])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::evaluation(attrs, format!("failed to run {}: {e}", self.program)))?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            log::debug!(target: "nix_search::nix", "{line}");
        }
        log::trace!(
            "{} finished attrs={} duration={:?}",
            self.program,
            attrs_arg,
            started.elapsed()
        );

        if !output.status.success() {
            return Err(Error::evaluation_with_stderr(
                attrs,
                format!("{} exited with {}", self.program, output.status),
                stderr,
            ));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            Error::evaluation_with_stderr(attrs, format!("malformed evaluator output: {e}"), stderr)
        })
    }
}

#[derive(Deserialize)]
struct FlakeMetadata {
    path: String,
}

/// Resolve a flake reference to the store path of its source.
pub async fn resolve_flake_path(flake: &str) -> Result<String> {
    log::debug!("resolving flake {flake}");
    let output = Command::new(NIX)
        .args(["--extra-experimental-features", "nix-command flakes"])
        .args(["flake", "metadata", "--json", flake])
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| Error::evaluation(&[flake.to_string()], format!("failed to run nix: {e}")))?;

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !output.status.success() {
        return Err(Error::evaluation_with_stderr(
            &[flake.to_string()],
            format!("failed to resolve flake: nix exited with {}", output.status),
            stderr,
        ));
    }

    let metadata: FlakeMetadata = serde_json::from_slice(&output.stdout).map_err(|e| {
        Error::evaluation_with_stderr(
            &[flake.to_string()],
            format!("malformed flake metadata: {e}"),
            stderr,
        )
    })?;
    log::debug!("flake {flake} resolved to {}", metadata.path);
    Ok(metadata.path)
}

/// Render a list of strings as a Nix list literal.
fn to_nix_list(items: &[String]) -> String {
    let mut out = String::from("[");
    for item in items {
        out.push(' ');
        out.push('"');
        let mut chars = item.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\r' => out.push_str("\\r"),
                '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
                c => out.push(c),
            }
        }
        out.push('"');
    }
    out.push_str(" ]");
    out
}
