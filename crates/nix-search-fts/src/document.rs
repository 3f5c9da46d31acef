//! Package documents.
//!
//! A [`PackageDocument`] is the indexed form of one leaf of the package
//! tree. Inner package sets are never indexed.

use nix_search_core::{AttrPath, Package, Result, SearchedPackage};
use tantivy::TantivyDocument;
use tantivy::schema::Value;

use crate::schema::SearchSchema;

/// Indexed representation of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDocument {
    /// Rendered attribute path.
    pub id: String,
    pub name: String,
    pub description: String,
    /// The full package as JSON.
    pub json: String,
}

impl PackageDocument {
    /// Build the document for the package at `path`.
    pub fn new(path: &AttrPath, pkg: &Package) -> Result<Self> {
        Ok(Self {
            id: path.to_string(),
            name: pkg.name.clone(),
            description: pkg.description.clone(),
            json: serde_json::to_string(pkg)?,
        })
    }

    /// Convert to a tantivy document.
    pub fn to_tantivy(&self, schema: &SearchSchema) -> TantivyDocument {
        let mut doc = TantivyDocument::new();
        doc.add_text(schema.id, &self.id);
        doc.add_text(schema.path, &self.id);
        doc.add_text(schema.name, &self.name);
        doc.add_text(schema.description, &self.description);
        doc.add_text(schema.json, &self.json);
        doc
    }

    /// Read a stored document back.
    ///
    /// Missing fields read as empty strings.
    pub fn from_tantivy(doc: &TantivyDocument, schema: &SearchSchema) -> Self {
        let text = |field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        Self {
            id: text(schema.id),
            name: text(schema.name),
            description: text(schema.description),
            json: text(schema.json),
        }
    }

    /// Decode into a search result.
    pub fn to_searched(&self) -> Result<SearchedPackage> {
        let package: Package = serde_json::from_str(&self.json)
            .map_err(|source| nix_search_core::Error::decode(self.id.clone(), source))?;
        Ok(SearchedPackage::new(self.id.clone(), package))
    }
}
