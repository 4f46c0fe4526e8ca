//! Grouping and ordering of aggregates into document sections.

use scanforge_aggregate::AggregateMap;
use scanforge_catalog::TaxonomyCatalog;
use scanforge_types::{ids, Diagnostic};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Shown when the catalog carries no descriptive text for a level.
const DESCRIPTION_FALLBACK: &str = "Description not available.";

/// One vulnerability ready for document rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedVulnerability {
    pub name: String,
    pub description: String,
    pub remediation: String,
    pub image_ref: Option<String>,
    /// All affected instances, sorted.
    pub instances: Vec<String>,
    /// The first instances (up to the inline limit), shown in the body.
    pub inline_instances: Vec<String>,
    /// The remainder beyond the inline limit; empty when everything fits.
    pub annex_instances: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSubsection {
    pub subcategory: String,
    pub description: String,
    pub vulnerabilities: Vec<RenderedVulnerability>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSection {
    pub category: String,
    pub description: String,
    pub subsections: Vec<DocumentSubsection>,
}

#[derive(Clone, Debug)]
pub struct AssemblyOptions {
    /// Instances shown in the body before the remainder moves to the annex.
    pub inline_limit: usize,
    /// Category pinned to the end regardless of alphabetical position.
    pub pinned_last_category: String,
    /// Bucket for catalog entries that declare no subcategory.
    pub default_subcategory: String,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        AssemblyOptions {
            inline_limit: 10,
            pinned_last_category: "Other Critical Vulnerabilities and Exploits".to_string(),
            default_subcategory: "Other".to_string(),
        }
    }
}

/// The assembled document content plus everything that did not make it in.
#[derive(Clone, Debug, Default)]
pub struct Assembly {
    pub sections: Vec<DocumentSection>,
    /// Vulnerability names with no catalog entry, sorted.
    pub missing_descriptions: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Join aggregates with the catalog and group them into ordered sections.
///
/// Aggregates without a catalog entry are recorded as missing and excluded;
/// no placeholder entries are invented. Categories sort alphabetically with
/// the pinned catch-all last; subcategories sort alphabetically;
/// vulnerabilities sort by name.
pub fn assemble_sections(
    aggregates: &AggregateMap,
    catalog: &TaxonomyCatalog,
    opts: &AssemblyOptions,
) -> Assembly {
    let mut grouped: BTreeMap<String, BTreeMap<String, Vec<RenderedVulnerability>>> =
        BTreeMap::new();
    let mut missing: BTreeSet<String> = BTreeSet::new();
    let mut diagnostics = Vec::new();

    for aggregate in aggregates.values() {
        let name = aggregate.key.name();
        let Some(entry) = catalog.lookup(name) else {
            if missing.insert(name.to_string()) {
                warn!(vulnerability = name, "no taxonomy entry; excluded from document");
                diagnostics.push(Diagnostic::new(
                    ids::DIAG_NO_TAXONOMY_MATCH,
                    format!("no catalog entry for '{name}'"),
                ));
            }
            continue;
        };

        let subcategory = entry
            .subcategory
            .clone()
            .unwrap_or_else(|| opts.default_subcategory.clone());

        // The instance set iterates sorted, so the inline slice is stable.
        let instances: Vec<String> = aggregate.instances.iter().cloned().collect();
        let (inline_instances, annex_instances) = split_instances(&instances, opts.inline_limit);

        grouped
            .entry(entry.category.clone())
            .or_default()
            .entry(subcategory)
            .or_default()
            .push(RenderedVulnerability {
                name: name.to_string(),
                description: entry.description.clone(),
                remediation: entry.remediation.clone(),
                image_ref: entry.image_ref.clone(),
                instances,
                inline_instances,
                annex_instances,
            });
    }

    let mut categories: Vec<String> = grouped.keys().cloned().collect();
    if let Some(idx) = categories.iter().position(|c| *c == opts.pinned_last_category) {
        let pinned = categories.remove(idx);
        categories.push(pinned);
    }

    let mut sections = Vec::with_capacity(categories.len());
    for category in categories {
        let subcategories = grouped.remove(&category).unwrap_or_default();
        let description = catalog
            .category_description(&category)
            .unwrap_or(DESCRIPTION_FALLBACK)
            .to_string();

        let mut subsections = Vec::with_capacity(subcategories.len());
        for (subcategory, mut vulnerabilities) in subcategories {
            vulnerabilities.sort_by(|a, b| a.name.cmp(&b.name));
            let description = catalog
                .subcategory_description(&category, &subcategory)
                .unwrap_or(DESCRIPTION_FALLBACK)
                .to_string();
            subsections.push(DocumentSubsection {
                subcategory,
                description,
                vulnerabilities,
            });
        }

        sections.push(DocumentSection {
            category,
            description,
            subsections,
        });
    }

    Assembly {
        sections,
        missing_descriptions: missing.into_iter().collect(),
        diagnostics,
    }
}

fn split_instances(instances: &[String], limit: usize) -> (Vec<String>, Vec<String>) {
    if instances.len() > limit {
        (
            instances[..limit].to_vec(),
            instances[limit..].to_vec(),
        )
    } else {
        (instances.to_vec(), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanforge_aggregate::aggregate;
    use scanforge_types::{Finding, ScanMode, Severity};

    fn finding(name: &str, instance: &str) -> Finding {
        Finding {
            name: name.to_string(),
            severity: Severity::High,
            instance: instance.to_string(),
            plugin_id: None,
        }
    }

    fn catalog(entries: &str) -> TaxonomyCatalog {
        TaxonomyCatalog::parse(entries).expect("parse test catalog")
    }

    const SIMPLE_CATALOG: &str = r#"{
      "vulnerabilities": [
        {
          "category": "Injection",
          "description": "Interpreter abuse.",
          "subcategories": [
            {
              "subcategory": "SQL Injection",
              "description": "SQL specifics.",
              "entries": [
                { "name": "Blind SQLi", "description": "d", "remediation": "r" }
              ]
            }
          ]
        }
      ]
    }"#;

    #[test]
    fn twelve_instances_split_ten_inline_two_annex() {
        let findings: Vec<Finding> = (0..12)
            .map(|i| finding("Blind SQLi", &format!("10.0.0.{i:02}")))
            .collect();
        let aggregates = aggregate(findings, ScanMode::Infra);

        let assembly = assemble_sections(
            &aggregates,
            &catalog(SIMPLE_CATALOG),
            &AssemblyOptions::default(),
        );

        let vuln = &assembly.sections[0].subsections[0].vulnerabilities[0];
        assert_eq!(vuln.name, "Blind SQLi");
        assert_eq!(vuln.instances.len(), 12);
        assert_eq!(vuln.inline_instances.len(), 10);
        assert_eq!(vuln.annex_instances.len(), 2);
        // Sorted order means the remainder holds the highest addresses.
        assert_eq!(vuln.annex_instances, vec!["10.0.0.10", "10.0.0.11"]);
    }

    #[test]
    fn at_most_limit_instances_stay_fully_inline() {
        let findings: Vec<Finding> = (0..10)
            .map(|i| finding("Blind SQLi", &format!("10.0.0.{i:02}")))
            .collect();
        let aggregates = aggregate(findings, ScanMode::Infra);

        let assembly = assemble_sections(
            &aggregates,
            &catalog(SIMPLE_CATALOG),
            &AssemblyOptions::default(),
        );

        let vuln = &assembly.sections[0].subsections[0].vulnerabilities[0];
        assert_eq!(vuln.inline_instances.len(), 10);
        assert!(vuln.annex_instances.is_empty());
    }

    #[test]
    fn unmatched_names_are_collected_not_invented() {
        let aggregates = aggregate(
            vec![finding("Not in catalog", "h1"), finding("Blind SQLi", "h2")],
            ScanMode::Infra,
        );

        let assembly = assemble_sections(
            &aggregates,
            &catalog(SIMPLE_CATALOG),
            &AssemblyOptions::default(),
        );

        assert_eq!(assembly.missing_descriptions, vec!["Not in catalog"]);
        assert_eq!(assembly.diagnostics.len(), 1);
        assert_eq!(assembly.diagnostics[0].code, ids::DIAG_NO_TAXONOMY_MATCH);
        // Only the matched vulnerability appears in sections.
        let names: Vec<_> = assembly.sections[0].subsections[0]
            .vulnerabilities
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["Blind SQLi"]);
    }

    #[test]
    fn categories_sort_alphabetically_with_catch_all_pinned_last() {
        let text = r#"{
          "vulnerabilities": [
            { "category": "Zeta", "entries": [ { "name": "Z1" } ] },
            { "category": "Alpha", "entries": [ { "name": "A1" } ] },
            {
              "category": "Other Critical Vulnerabilities and Exploits",
              "entries": [ { "name": "O1" } ]
            }
          ]
        }"#;
        let aggregates = aggregate(
            vec![finding("Z1", "h"), finding("A1", "h"), finding("O1", "h")],
            ScanMode::Infra,
        );

        let assembly =
            assemble_sections(&aggregates, &catalog(text), &AssemblyOptions::default());
        let order: Vec<_> = assembly
            .sections
            .iter()
            .map(|s| s.category.as_str())
            .collect();
        assert_eq!(
            order,
            vec![
                "Alpha",
                "Zeta",
                "Other Critical Vulnerabilities and Exploits"
            ]
        );
    }

    #[test]
    fn entries_without_subcategory_land_in_the_default_bucket() {
        let text = r#"{
          "vulnerabilities": [
            { "category": "Misc", "entries": [ { "name": "Loose" } ] }
          ]
        }"#;
        let aggregates = aggregate(vec![finding("Loose", "h")], ScanMode::Infra);
        let assembly =
            assemble_sections(&aggregates, &catalog(text), &AssemblyOptions::default());
        assert_eq!(assembly.sections[0].subsections[0].subcategory, "Other");
        assert_eq!(
            assembly.sections[0].subsections[0].description,
            DESCRIPTION_FALLBACK
        );
    }

    #[test]
    fn vulnerabilities_sort_by_name_within_a_subsection() {
        let text = r#"{
          "vulnerabilities": [
            {
              "category": "C",
              "entries": [
                { "name": "beta" }, { "name": "alpha" }, { "name": "gamma" }
              ]
            }
          ]
        }"#;
        let aggregates = aggregate(
            vec![finding("gamma", "h"), finding("alpha", "h"), finding("beta", "h")],
            ScanMode::Infra,
        );
        let assembly =
            assemble_sections(&aggregates, &catalog(text), &AssemblyOptions::default());
        let names: Vec<_> = assembly.sections[0].subsections[0]
            .vulnerabilities
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }
}
