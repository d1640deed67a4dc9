//! Built-in and external datasheet entries.
//!
//! Entries come from:
//! 1. JSON files in a user-supplied directory (one entry per file)
//! 2. JSON files embedded into the binary
//!
//! Lookup order follows that list, so a user file can shadow a built-in
//! entry by reusing its key.

use std::path::Path;

use super::DatasheetEntry;

// Embedded in lookup order; the first key a query contains wins
const EMBEDDED_ARDUINO_UNO: &str = include_str!("../../datasheets/arduino-uno.json");
const EMBEDDED_LM7805: &str = include_str!("../../datasheets/lm7805.json");
const EMBEDDED_HC_SR04: &str = include_str!("../../datasheets/hc-sr04.json");
const EMBEDDED_DHT11: &str = include_str!("../../datasheets/dht11.json");
const EMBEDDED_SG90: &str = include_str!("../../datasheets/sg90.json");

/// Entries compiled into the binary.
pub fn embedded_datasheets() -> Vec<DatasheetEntry> {
    let embedded_jsons = [
        EMBEDDED_ARDUINO_UNO,
        EMBEDDED_LM7805,
        EMBEDDED_HC_SR04,
        EMBEDDED_DHT11,
        EMBEDDED_SG90,
    ];

    let mut datasheets = Vec::new();
    for json_str in embedded_jsons {
        match serde_json::from_str::<DatasheetEntry>(json_str) {
            Ok(ds) => datasheets.push(ds),
            Err(e) => {
                tracing::warn!("Failed to parse embedded datasheet: {}", e);
            }
        }
    }
    datasheets
}

/// Load every `*.json` file in `dir`, sorted by file name.
///
/// Returns the loaded entries and one message per file that failed.
pub fn load_datasheets_from_directory(dir: &Path) -> (Vec<DatasheetEntry>, Vec<String>) {
    let mut datasheets = Vec::new();
    let mut errors = Vec::new();

    if !dir.is_dir() {
        errors.push(format!("Datasheet directory {} does not exist", dir.display()));
        return (datasheets, errors);
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(format!("Failed to read directory {}: {}", dir.display(), e));
            return (datasheets, errors);
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    paths.sort();

    for path in paths {
        match load_datasheet_from_file(&path) {
            Ok(ds) => {
                tracing::debug!(key = %ds.key, file = %path.display(), "loaded datasheet");
                datasheets.push(ds);
            }
            Err(e) => {
                let message = format!("Failed to load {}: {}", path.display(), e);
                tracing::warn!("{}", message);
                errors.push(message);
            }
        }
    }

    (datasheets, errors)
}

fn load_datasheet_from_file(path: &Path) -> Result<DatasheetEntry, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
    let entry: DatasheetEntry =
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse JSON: {}", e))?;
    if entry.key.trim().is_empty() {
        return Err("entry key must not be empty".to_string());
    }
    Ok(entry)
}
