//! Project export bundle.
//!
//! Builds the manifest and text previews of an export; the bundle itself
//! lives behind `bundle_url` and is not produced here.

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::circuit::{resolve_circuit_schema, CircuitSchema, FallbackSpec};
use crate::core::ArduinoMcpError;
use crate::firmware::SKETCH_FILENAME;
use crate::validation::{RulesEngine, ValidationReport};

pub const BUNDLED_FILES: [&str; 5] = [
    SKETCH_FILENAME,
    "circuit_schema.json",
    "bom.csv",
    "validation_report.md",
    "enclosure.stl",
];

const PLACEHOLDER_SKETCH: &str = "// Placeholder sketch\nvoid setup() {}\nvoid loop() {}\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Zip,
    Pdf,
    Github,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Zip => "zip",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Github => "github",
        }
    }

    /// File extension of the bundle; a GitHub export is a text manifest.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Github => "txt",
            other => other.as_str(),
        }
    }
}

fn default_project_id() -> String {
    "project-default".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    #[serde(default = "default_project_id")]
    pub project_id: String,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub circuit_schema: Option<Value>,
    #[serde(default)]
    pub arduino_code: Option<String>,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            format: ExportFormat::default(),
            circuit_schema: None,
            arduino_code: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPreview {
    pub sketch_ino: String,
    pub circuit_schema_json: String,
    pub bom_csv: String,
    pub validation_report_md: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportManifest {
    pub project_id: String,
    pub format: ExportFormat,
    pub bundle_url: String,
    pub bundled_files: Vec<String>,
    pub generated_at: String,
    pub preview: ExportPreview,
}

/// `ref,name,qty,mpn` lines, no header; missing part numbers stay empty.
pub fn bom_csv(schema: &CircuitSchema) -> String {
    schema
        .parts
        .iter()
        .map(|part| {
            format!(
                "{},{},{},{}",
                part.ref_des,
                part.name,
                part.quantity,
                part.mpn.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Markdown rendering of a validation report.
pub fn validation_report_markdown(report: &ValidationReport) -> String {
    let schema = &report.normalized_circuit_schema;
    let mut md = String::new();

    let _ = writeln!(md, "# Validation Report");
    let _ = writeln!(md);
    let _ = writeln!(md, "- Project: {}", schema.project_name);
    let _ = writeln!(md, "- Parts: {}, nets: {}", schema.parts.len(), schema.nets.len());
    let _ = writeln!(md, "- Result: {}", if report.pass { "PASS" } else { "FAIL" });
    let _ = writeln!(md);

    if report.warnings.is_empty() {
        let _ = writeln!(md, "No warnings.");
        return md;
    }

    let _ = writeln!(md, "| Severity | Code | Message | Fix |");
    let _ = writeln!(md, "|----------|------|---------|-----|");
    for warning in &report.warnings {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} |",
            warning.severity,
            warning.code,
            warning.message.replace('|', "\\|"),
            warning.fix.replace('|', "\\|")
        );
    }
    md
}

/// Build an export manifest stamped with `now`.
pub fn export_project_at(
    request: &ExportRequest,
    now: DateTime<Utc>,
) -> Result<ExportManifest, ArduinoMcpError> {
    let schema = resolve_circuit_schema(request.circuit_schema.as_ref(), None, &FallbackSpec::default());
    let circuit_schema_json = schema.to_pretty_json()?;
    let bom = bom_csv(&schema);
    let report = RulesEngine::with_default_rules().validate(schema);

    tracing::debug!(
        project = %request.project_id,
        format = request.format.as_str(),
        pass = report.pass,
        "export manifest built"
    );

    Ok(ExportManifest {
        project_id: request.project_id.clone(),
        format: request.format,
        bundle_url: format!(
            "https://example.local/exports/{}.{}",
            request.project_id,
            request.format.extension()
        ),
        bundled_files: BUNDLED_FILES.iter().map(|f| f.to_string()).collect(),
        generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        preview: ExportPreview {
            sketch_ino: request
                .arduino_code
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_SKETCH.to_string()),
            circuit_schema_json,
            bom_csv: bom,
            validation_report_md: validation_report_markdown(&report),
        },
    })
}

pub fn export_project(request: &ExportRequest) -> Result<ExportManifest, ArduinoMcpError> {
    export_project_at(request, Utc::now())
}
