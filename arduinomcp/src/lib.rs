//! ArduinoMCP - Arduino circuit design tools
//!
//! This library turns circuit descriptions into a normalized circuit schema,
//! checks that schema for wiring mistakes, and renders it as a schematic
//! preview. Every tool is also reachable by name through [`tools::call_tool`],
//! which is what the CLI and the stdio MCP server dispatch to.
//!
//! # Quick Start
//!
//! ```no_run
//! use arduinomcp::{ArduinoMcpCore, Settings};
//! use std::path::Path;
//!
//! let validation = ArduinoMcpCore::validate_file(Path::new("circuit.json")).unwrap();
//! for warning in &validation.report.warnings {
//!     println!("{}: {}", warning.severity, warning.message);
//! }
//!
//! let scene = ArduinoMcpCore::render_file(
//!     Path::new("circuit.json"),
//!     None,
//!     &Settings::default(),
//! ).unwrap();
//! println!("{}", arduinomcp::to_svg(&scene));
//! ```
//!
//! # Features
//!
//! - **Circuit schema**: lenient resolution with a default fallback circuit
//! - **Validation**: voltage domains, LED resistors, floating nets, pin conflicts
//! - **Schematic preview**: deterministic layout, Manhattan routing, SVG output
//! - **Tools**: circuit generation, sketches, datasheets, ordering, export, enclosures

pub mod circuit;
pub mod config;
pub mod core;
pub mod datasheets;
pub mod enclosure;
pub mod export;
pub mod firmware;
pub mod generate;
pub mod improve;
pub mod purchasing;
pub mod schematic;
pub mod tools;
pub mod validation;

// Re-export main types
pub use core::{ArduinoMcpCore, ArduinoMcpError, FileValidation};
pub use circuit::{resolve_circuit_schema, Circuit, CircuitSchema, FallbackSpec, Net, Part, PinRef};
pub use config::{SchematicTheme, Settings, Vendor};
pub use datasheets::DatasheetLibrary;
pub use schematic::{layout, render_scene, route_nets, to_svg, Scene};
pub use tools::{call_tool, tool_definitions, ToolDefinition};
pub use validation::{Rule, RulesEngine, Severity, ValidationReport, Warning};

/// Parse a circuit schema file (convenience wrapper).
pub fn load_schema(path: &std::path::Path) -> Result<CircuitSchema, ArduinoMcpError> {
    ArduinoMcpCore::load_schema(path)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ArduinoMcpCore, ArduinoMcpError, CircuitSchema, RulesEngine, Settings, Severity,
        ValidationReport, Warning,
    };
}
