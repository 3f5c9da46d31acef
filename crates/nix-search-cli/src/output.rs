//! Result rendering.

use std::io::{self, Write};

use nix_search_core::SearchedPackage;
use nix_search_fts::highlight::{ANSI_RESET, DEFAULT_ANSI_ESCAPE};

const DEFAULT_FOREGROUND: &str = "\x1b[39m";
const INDENT: &str = "  ";

/// ANSI text attributes, or nothing when color is off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Styler {
    enabled: bool,
}

impl Styler {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn bold(&self, text: &str) -> String {
        self.block(text, "\x1b[1m", "\x1b[22m")
    }

    pub fn dim(&self, text: &str) -> String {
        self.block(text, "\x1b[2m", "\x1b[22m")
    }

    pub fn strikethrough(&self, text: &str) -> String {
        self.block(text, "\x1b[9m", "\x1b[29m")
    }

    /// Wrap `text` in a prefix and suffix.
    pub fn style(&self, text: &str, prefix: &str, suffix: &str) -> String {
        if self.enabled {
            format!("{prefix}{text}{suffix}")
        } else {
            text.to_string()
        }
    }

    /// Style each line separately so attributes survive line breaks.
    fn block(&self, text: &str, prefix: &str, suffix: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        text.split('\n')
            .map(|line| format!("{prefix}{line}{suffix}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Write results as a pretty-printed JSON array.
pub fn write_json<W: Write>(out: &mut W, results: &[SearchedPackage]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)
}

/// Split off results whose attribute name is the query itself.
///
/// Highlighted paths of those results are restyled so the whole name is
/// marked.
pub fn partition_exact(
    results: Vec<SearchedPackage>,
    query: &str,
    styler: Styler,
) -> (Vec<SearchedPackage>, Vec<SearchedPackage>) {
    let suffix = format!(".{query}");
    let (mut exact, others): (Vec<_>, Vec<_>) = results
        .into_iter()
        .partition(|r| !query.is_empty() && r.path.ends_with(&suffix));

    for result in &mut exact {
        let Some(ix) = result.path.rfind(&suffix) else {
            continue;
        };
        let restyled = format!(
            "{}.{}",
            &result.path[..ix],
            styler.style(query, DEFAULT_ANSI_ESCAPE, ANSI_RESET)
        );
        if let Some(highlighted) = result.highlighted.as_mut() {
            highlighted.path = restyled;
        }
    }
    (exact, others)
}

/// Write results as text, exact name matches first.
pub fn write_text<W: Write>(
    out: &mut W,
    styler: Styler,
    query: &str,
    results: Vec<SearchedPackage>,
) -> io::Result<()> {
    let (exact, others) = partition_exact(results, query, styler);

    if !exact.is_empty() {
        writeln!(out, "{}", styler.bold("* Exact matches:"))?;
        writeln!(out)?;
        for result in &exact {
            write_package(out, styler, result)?;
        }
        writeln!(out, "{}", styler.bold("* Other matches:"))?;
        writeln!(out)?;
    }
    for result in &others {
        write_package(out, styler, result)?;
    }
    Ok(())
}

/// Write one result, using its highlighted variant when present.
pub fn write_package<W: Write>(
    out: &mut W,
    styler: Styler,
    result: &SearchedPackage,
) -> io::Result<()> {
    let shown = result.display();
    let pkg = &shown.package;

    // A full reset would also clear the strikethrough.
    let mut path = shown.path.replace(ANSI_RESET, DEFAULT_FOREGROUND);
    if pkg.broken || pkg.unsupported_platform {
        path = styler.strikethrough(&path);
    }

    write!(out, "- {path} {}", styler.dim(&format!("({})", pkg.version)))?;
    if pkg.unfree {
        write!(out, "{}", styler.dim(" (unfree)"))?;
    }
    if pkg.broken {
        write!(out, "{}", styler.dim(" (broken)"))?;
    }
    if pkg.unsupported_platform {
        write!(out, "{}", styler.dim(" (unsupported)"))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", indent(&pkg.description))?;

    if let Some(long) = pkg.long_description.as_deref()
        && !long.trim().is_empty()
        && long.trim() != pkg.description.trim()
    {
        writeln!(out, "{}", styler.dim(&indent(long.trim_end())))?;
    }
    writeln!(out)
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Tests
// ============================================================================
