//! Core API shared by the CLI and the stdio server.
//! No transport or process state lives here.

use std::path::{Path, PathBuf};

use crate::circuit::CircuitSchema;
use crate::config::Settings;
use crate::schematic::{self, Scene};
use crate::validation::{RulesEngine, ValidationReport};

#[derive(Debug, thiserror::Error)]
pub enum ArduinoMcpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
}

/// Result of validating one schema file.
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub file: PathBuf,
    pub report: ValidationReport,
}

impl FileValidation {
    pub fn high_count(&self) -> usize {
        self.report.count(crate::validation::Severity::High)
    }

    pub fn medium_count(&self) -> usize {
        self.report.count(crate::validation::Severity::Medium)
    }

    pub fn low_count(&self) -> usize {
        self.report.count(crate::validation::Severity::Low)
    }
}

/// Entry points over schema files on disk.
pub struct ArduinoMcpCore;

impl ArduinoMcpCore {
    /// Read and strictly parse a circuit schema JSON file.
    ///
    /// Unlike the tool handlers, this does not fall back to a default
    /// circuit: a file that does not hold a schema is an error.
    pub fn load_schema(path: &Path) -> Result<CircuitSchema, ArduinoMcpError> {
        let text = std::fs::read_to_string(path)?;
        let schema = CircuitSchema::from_json_str(&text)?;
        tracing::debug!(
            file = %path.display(),
            parts = schema.parts.len(),
            nets = schema.nets.len(),
            "loaded circuit schema"
        );
        Ok(schema)
    }

    /// Validate a schema file with the default rule set.
    pub fn validate_file(path: &Path) -> Result<FileValidation, ArduinoMcpError> {
        let schema = Self::load_schema(path)?;
        let report = RulesEngine::with_default_rules().validate(schema);
        Ok(FileValidation {
            file: path.to_path_buf(),
            report,
        })
    }

    /// Render a schema file into a scene graph.
    pub fn render_file(
        path: &Path,
        power_info: Option<&str>,
        settings: &Settings,
    ) -> Result<Scene, ArduinoMcpError> {
        let schema = Self::load_schema(path)?;
        let power = power_info
            .map(str::to_string)
            .unwrap_or_else(|| schema.power.summary());
        Ok(schematic::render_scene(
            &schema.parts,
            &schema.nets,
            Some(&power),
            &settings.schematic,
        ))
    }
}
