//! The curated taxonomy catalog: category → subcategory → vulnerability
//! descriptions, loaded once per report generation and read-only during
//! assembly.
//!
//! The catalog is independent of any scan. Lookups are by exact
//! vulnerability name; there is no fuzzy matching and no invented
//! placeholder entries for misses.

#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("read {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw document shape.
#[derive(Debug, Deserialize)]
struct CatalogDoc {
    #[serde(default)]
    vulnerabilities: Vec<CategoryDoc>,
}

#[derive(Debug, Deserialize)]
struct CategoryDoc {
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    subcategories: Vec<SubcategoryDoc>,
    /// Entries sitting directly under the category, with no subcategory.
    #[serde(default)]
    entries: Vec<EntryDoc>,
}

#[derive(Debug, Deserialize)]
struct SubcategoryDoc {
    subcategory: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    entries: Vec<EntryDoc>,
}

#[derive(Debug, Deserialize)]
struct EntryDoc {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    remediation: String,
    #[serde(default)]
    image: Option<String>,
}

/// One curated catalog record for a vulnerability name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub category: String,
    pub subcategory: Option<String>,
    pub description: String,
    pub remediation: String,
    pub image_ref: Option<String>,
}

/// The loaded catalog, indexed for assembly.
#[derive(Clone, Debug, Default)]
pub struct TaxonomyCatalog {
    by_name: BTreeMap<String, TaxonomyEntry>,
    category_descriptions: BTreeMap<String, String>,
    subcategory_descriptions: BTreeMap<(String, String), String>,
}

impl TaxonomyCatalog {
    /// Parse a catalog document. Duplicate vulnerability names keep the
    /// first entry seen.
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDoc = serde_json::from_str(text)?;
        let mut catalog = TaxonomyCatalog::default();

        for category in doc.vulnerabilities {
            catalog
                .category_descriptions
                .insert(category.category.clone(), category.description);

            for entry in category.entries {
                catalog.index_entry(&category.category, None, entry);
            }
            for sub in category.subcategories {
                catalog.subcategory_descriptions.insert(
                    (category.category.clone(), sub.subcategory.clone()),
                    sub.description,
                );
                for entry in sub.entries {
                    catalog.index_entry(&category.category, Some(&sub.subcategory), entry);
                }
            }
        }

        Ok(catalog)
    }

    pub fn load(path: &Utf8Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text)
    }

    fn index_entry(&mut self, category: &str, subcategory: Option<&str>, entry: EntryDoc) {
        if self.by_name.contains_key(&entry.name) {
            debug!(name = %entry.name, "duplicate catalog entry ignored");
            return;
        }
        self.by_name.insert(
            entry.name.clone(),
            TaxonomyEntry {
                category: category.to_string(),
                subcategory: subcategory.map(str::to_string),
                description: entry.description,
                remediation: entry.remediation,
                image_ref: entry.image,
            },
        );
    }

    /// Exact-name lookup.
    pub fn lookup(&self, name: &str) -> Option<&TaxonomyEntry> {
        self.by_name.get(name)
    }

    pub fn category_description(&self, category: &str) -> Option<&str> {
        self.category_descriptions
            .get(category)
            .map(String::as_str)
            .filter(|d| !d.is_empty())
    }

    pub fn subcategory_description(&self, category: &str, subcategory: &str) -> Option<&str> {
        self.subcategory_descriptions
            .get(&(category.to_string(), subcategory.to_string()))
            .map(String::as_str)
            .filter(|d| !d.is_empty())
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
      "vulnerabilities": [
        {
          "category": "Injection",
          "description": "Untrusted data reaching an interpreter.",
          "subcategories": [
            {
              "subcategory": "SQL Injection",
              "description": "Injection into SQL queries.",
              "entries": [
                {
                  "name": "Blind SQL Injection",
                  "description": "Inference-based extraction.",
                  "remediation": "Use parameterized queries.",
                  "image": "assets/sqli.png"
                }
              ]
            }
          ],
          "entries": [
            {
              "name": "Command Injection",
              "description": "Shell command execution.",
              "remediation": "Avoid shelling out."
            }
          ]
        }
      ]
    }"#;

    #[test]
    fn lookup_finds_nested_and_direct_entries() {
        let catalog = TaxonomyCatalog::parse(CATALOG).expect("parse catalog");
        assert_eq!(catalog.len(), 2);

        let sqli = catalog.lookup("Blind SQL Injection").expect("sqli entry");
        assert_eq!(sqli.category, "Injection");
        assert_eq!(sqli.subcategory.as_deref(), Some("SQL Injection"));
        assert_eq!(sqli.image_ref.as_deref(), Some("assets/sqli.png"));

        let cmd = catalog.lookup("Command Injection").expect("cmd entry");
        assert_eq!(cmd.subcategory, None);
        assert_eq!(cmd.image_ref, None);
    }

    #[test]
    fn lookup_is_exact_match_only() {
        let catalog = TaxonomyCatalog::parse(CATALOG).expect("parse catalog");
        assert!(catalog.lookup("blind sql injection").is_none());
        assert!(catalog.lookup("Blind SQL Injection ").is_none());
    }

    #[test]
    fn descriptions_resolve_per_level() {
        let catalog = TaxonomyCatalog::parse(CATALOG).expect("parse catalog");
        assert_eq!(
            catalog.category_description("Injection"),
            Some("Untrusted data reaching an interpreter.")
        );
        assert_eq!(
            catalog.subcategory_description("Injection", "SQL Injection"),
            Some("Injection into SQL queries.")
        );
        assert_eq!(catalog.subcategory_description("Injection", "XSS"), None);
    }

    #[test]
    fn empty_document_is_a_valid_empty_catalog() {
        let catalog = TaxonomyCatalog::parse("{}").expect("parse empty");
        assert!(catalog.is_empty());
    }

    #[test]
    fn first_duplicate_entry_wins() {
        let text = r#"{
          "vulnerabilities": [
            {
              "category": "A",
              "entries": [
                { "name": "Dup", "description": "first" },
                { "name": "Dup", "description": "second" }
              ]
            }
          ]
        }"#;
        let catalog = TaxonomyCatalog::parse(text).expect("parse");
        assert_eq!(catalog.lookup("Dup").map(|e| e.description.as_str()), Some("first"));
    }
}
