//! Attribute paths.
//!
//! An [`AttrPath`] locates a node in the package catalog. The first part is
//! always the catalog's root name (`nixpkgs`, or a flake reference). Channel
//! paths render as `nixpkgs.python3Packages.numpy`; flake paths render as
//! `github:NixOS/nixpkgs#python3Packages.numpy`.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Path to a package or package set, starting with the catalog name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrPath {
    parts: Vec<String>,
    flake: bool,
}

impl AttrPath {
    /// Create a path from its parts.
    pub fn new(parts: Vec<String>, flake: bool) -> Self {
        Self { parts, flake }
    }

    /// Create a path containing only the catalog root.
    pub fn root(name: impl Into<String>, flake: bool) -> Self {
        Self {
            parts: vec![name.into()],
            flake,
        }
    }

    /// Parse a rendered path.
    ///
    /// Everything before the first `#` is taken as a flake reference;
    /// without a `#` the whole string is split on dots.
    pub fn from_dot_path(path: &str) -> Self {
        match path.split_once('#') {
            Some((flake, rest)) => {
                let mut parts = Vec::with_capacity(rest.matches('.').count() + 2);
                parts.push(flake.to_string());
                parts.extend(rest.split('.').map(str::to_string));
                Self { parts, flake: true }
            }
            None => Self {
                parts: path.split('.').map(str::to_string).collect(),
                flake: false,
            },
        }
    }

    /// The parts of this path, i.e. the components between separators.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Attribute names below the catalog root.
    pub fn attrs(&self) -> &[String] {
        self.parts.get(1..).unwrap_or(&[])
    }

    /// Whether the root part is a flake reference.
    pub fn is_flake(&self) -> bool {
        self.flake
    }

    /// Number of parts, including the root.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the path has no parts at all.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The last attribute name.
    pub fn last(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }

    /// Return a new path with `names` appended.
    ///
    /// The returned path owns fresh storage; it never aliases `self`.
    pub fn push<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = self.parts.clone();
        parts.extend(names.into_iter().map(Into::into));
        Self {
            parts,
            flake: self.flake,
        }
    }

    /// Return a new path with a single name appended.
    pub fn join(&self, name: impl Into<String>) -> Self {
        self.push([name])
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.parts.split_first() else {
            return Ok(());
        };
        if self.flake {
            write!(f, "{first}#{}", rest.join("."))
        } else {
            f.write_str(first)?;
            for part in rest {
                write!(f, ".{part}")?;
            }
            Ok(())
        }
    }
}

impl FromStr for AttrPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_dot_path(s))
    }
}

impl Serialize for AttrPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AttrPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_dot_path(&s))
    }
}

// ============================================================================
// Tests
// ============================================================================
