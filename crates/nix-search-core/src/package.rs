//! Package tree model.
//!
//! The catalog is a tree: inner nodes are [`PackageSet`]s, leaves are
//! [`Package`]s. A node is represented by [`Derivation`], which serializes
//! with an explicit `_type` tag so the tree can be dumped and reloaded as
//! JSON.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::path::AttrPath;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Metadata of a single package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Attribute name of the package.
    #[serde(default)]
    pub name: String,

    /// Package version, possibly empty.
    #[serde(default)]
    pub version: String,

    /// One-line description.
    #[serde(default)]
    pub description: String,

    /// Longer free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,

    /// License identifiers (SPDX ids where known).
    #[serde(default, rename = "license", skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<String>,

    /// Name of the main executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_program: Option<String>,

    /// Marked broken.
    #[serde(default, skip_serializing_if = "is_false")]
    pub broken: bool,

    /// Has at least one non-free license.
    #[serde(default, skip_serializing_if = "is_false")]
    pub unfree: bool,

    /// Not available on the platform the index was built on.
    #[serde(default, skip_serializing_if = "is_false")]
    pub unsupported_platform: bool,
}

impl Package {
    /// Create a package with a name and no metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the package broken.
    pub fn with_broken(mut self, broken: bool) -> Self {
        self.broken = broken;
        self
    }
}

/// A node of the package tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum Derivation {
    /// A leaf.
    #[serde(rename = "derivation")]
    Package(Package),

    /// An inner node.
    #[serde(rename = "packageSet")]
    Set(PackageSet),
}

/// Mapping from attribute name to node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageSet(BTreeMap<String, Derivation>);

impl PackageSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, returning the node previously stored under that name.
    pub fn insert(&mut self, name: impl Into<String>, node: Derivation) -> Option<Derivation> {
        self.0.insert(name.into(), node)
    }

    pub fn get(&self, name: &str) -> Option<&Derivation> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Derivation> {
        self.0.get_mut(name)
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over direct children in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Derivation> {
        self.0.iter()
    }

    /// Visit every leaf below this set, depth first.
    ///
    /// Paths are built starting from `root`. The walk stops as soon as `f`
    /// returns [`ControlFlow::Break`].
    pub fn walk<B, F>(&self, root: &AttrPath, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(&AttrPath, &Package) -> ControlFlow<B>,
    {
        let mut stack = vec![(root.clone(), self)];
        while let Some((path, set)) = stack.pop() {
            for (name, node) in set.iter() {
                match node {
                    Derivation::Package(pkg) => f(&path.join(name.as_str()), pkg)?,
                    Derivation::Set(child) => stack.push((path.join(name.as_str()), child)),
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Number of reachable leaves.
    pub fn count(&self) -> usize {
        self.iter()
            .map(|(_, node)| match node {
                Derivation::Package(_) => 1,
                Derivation::Set(child) => child.count(),
            })
            .sum()
    }
}

impl FromIterator<(String, Derivation)> for PackageSet {
    fn from_iter<I: IntoIterator<Item = (String, Derivation)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PackageSet {
    type Item = (String, Derivation);
    type IntoIter = btree_map::IntoIter<String, Derivation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PackageSet {
    type Item = (&'a String, &'a Derivation);
    type IntoIter = btree_map::Iter<'a, String, Derivation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The root of an indexed catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLevelPackages {
    /// Root name: a channel name such as `nixpkgs`, or a flake reference.
    pub channel: String,

    /// Whether `channel` is a flake reference.
    #[serde(default)]
    pub flake: bool,

    /// Root package set.
    #[serde(default)]
    pub packages: PackageSet,
}

impl TopLevelPackages {
    /// Create an empty catalog root.
    pub fn new(channel: impl Into<String>, flake: bool) -> Self {
        Self {
            channel: channel.into(),
            flake,
            packages: PackageSet::new(),
        }
    }

    /// Path of the root node.
    pub fn root_path(&self) -> AttrPath {
        AttrPath::root(self.channel.clone(), self.flake)
    }

    /// Visit every leaf with its full path.
    pub fn walk<B, F>(&self, f: F) -> ControlFlow<B>
    where
        F: FnMut(&AttrPath, &Package) -> ControlFlow<B>,
    {
        self.packages.walk(&self.root_path(), f)
    }

    /// Number of reachable leaves.
    pub fn count(&self) -> usize {
        self.packages.count()
    }
}

/// A search result.
///
/// `highlighted` carries the same record with matches marked up. It is
/// serialized under the `unhighlighted` key and is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchedPackage {
    /// Rendered attribute path.
    pub path: String,

    #[serde(flatten)]
    pub package: Package,

    #[serde(rename = "unhighlighted", default)]
    pub highlighted: Option<Box<SearchedPackage>>,
}

impl SearchedPackage {
    pub fn new(path: impl Into<String>, package: Package) -> Self {
        Self {
            path: path.into(),
            package,
            highlighted: None,
        }
    }

    /// The highlighted record if there is one, otherwise `self`.
    pub fn display(&self) -> &SearchedPackage {
        self.highlighted.as_deref().unwrap_or(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
