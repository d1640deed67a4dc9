//! Datasheet lookup.
//!
//! A small keyed table of common Arduino parts with a PDF link and a few
//! headline specs. Queries are matched by substring: the first entry whose
//! key appears in the lower-cased query wins. Unmatched queries get a web
//! search link instead of an error.

pub mod builtin;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use builtin::{embedded_datasheets, load_datasheets_from_directory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasheetEntry {
    /// Lower-case match key, e.g. `hc-sr04`
    pub key: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    pub pdf_link: String,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
}

/// Answer of a datasheet lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasheetSummary {
    pub component: String,
    pub pdf_link: String,
    pub key_specs_summary: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSearch {
    pub query: String,
    pub results: Vec<DatasheetEntry>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DatasheetLibrary {
    entries: Vec<DatasheetEntry>,
}

impl DatasheetLibrary {
    pub fn builtin() -> Self {
        Self {
            entries: embedded_datasheets(),
        }
    }

    /// Entries from `dir` ahead of the built-ins. Files that fail to load
    /// are logged and skipped.
    pub fn with_directory(dir: &Path) -> Self {
        let (mut entries, errors) = load_datasheets_from_directory(dir);
        if !errors.is_empty() {
            tracing::warn!(count = errors.len(), dir = %dir.display(), "some datasheets failed to load");
        }
        entries.extend(embedded_datasheets());
        Self { entries }
    }

    pub fn entries(&self) -> &[DatasheetEntry] {
        &self.entries
    }

    /// Look up by component name, falling back to the part number.
    pub fn lookup(&self, component_name: Option<&str>, part_number: Option<&str>) -> DatasheetSummary {
        let raw = component_name.or(part_number).unwrap_or("");
        let query = raw.to_lowercase();
        let component = component_name
            .or(part_number)
            .unwrap_or("Generic Search")
            .to_string();

        match self.entries.iter().find(|e| query.contains(e.key.as_str())) {
            Some(entry) => DatasheetSummary {
                component,
                pdf_link: entry.pdf_link.clone(),
                key_specs_summary: entry.specs.clone(),
            },
            None => {
                tracing::debug!(query = %query, "no datasheet match, returning search link");
                let mut specs = BTreeMap::new();
                specs.insert(
                    "note".to_string(),
                    "Generic search result generated. No exact match found in local DB.".to_string(),
                );
                DatasheetSummary {
                    component,
                    pdf_link: format!(
                        "https://www.google.com/search?q={}",
                        urlencoding::encode(&format!("{query} datasheet pdf"))
                    ),
                    key_specs_summary: specs,
                }
            }
        }
    }

    /// Entries whose key, title or part number contains the query
    /// (case-insensitive). An empty query lists everything.
    pub fn search(&self, query: &str) -> ComponentSearch {
        let needle = query.trim().to_lowercase();
        let results: Vec<DatasheetEntry> = self
            .entries
            .iter()
            .filter(|e| {
                e.key.contains(&needle)
                    || e.title.to_lowercase().contains(&needle)
                    || e.part_number
                        .as_deref()
                        .map(|p| p.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .cloned()
            .collect();

        let message = match results.len() {
            0 => format!("No components matching \"{}\" in the local catalog.", query.trim()),
            1 => "Found 1 matching component.".to_string(),
            n => format!("Found {n} matching components."),
        };

        ComponentSearch {
            query: query.to_string(),
            results,
            message,
        }
    }
}

impl Default for DatasheetLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}
