//! Tool registry.
//!
//! Every tool takes a JSON object of arguments and returns a JSON object.
//! `call_tool` is the single dispatch point shared by the CLI `call`
//! command and the stdio server.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::circuit::{resolve_circuit_schema, FallbackSpec};
use crate::config::Settings;
use crate::core::ArduinoMcpError;
use crate::schematic::{render_scene, to_svg, Scene};
use crate::validation::RulesEngine;
use crate::{enclosure, export, firmware, generate, improve, purchasing};

/// A tool as advertised to MCP clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    fn new(name: &str, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

fn schema_input_property() -> Value {
    json!({
        "description": "Normalized circuit schema, as an object or a JSON string",
        "type": ["object", "string"]
    })
}

pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "generate_circuit",
            "Generate an Arduino circuit from requirements and return a normalized circuit schema with parts, nets, and wiring.",
            json!({
                "type": "object",
                "properties": {
                    "description": {"type": "string", "description": "Natural-language description of what the circuit should do"},
                    "requirements": {"type": "string", "description": "Backward-compatible alias for description"},
                    "power_supply": {"type": "string", "description": "Power input, for example 5V, 12V, or battery voltage"},
                    "constraints": {"type": "array", "items": {"type": "string"}, "default": []},
                    "components": {"type": "array", "items": {"type": "string"}}
                }
            }),
        ),
        ToolDefinition::new(
            "validate_circuit",
            "Validate a normalized circuit schema for electrical and wiring risks.",
            json!({
                "type": "object",
                "properties": {
                    "circuit_schema": schema_input_property(),
                    "schematic_json": {"description": "Backward-compatible schematic object input"}
                }
            }),
        ),
        ToolDefinition::new(
            "write_arduino_code",
            "Generate Arduino .ino code based on circuit requirements.",
            json!({
                "type": "object",
                "properties": {
                    "description": {"type": "string", "description": "What the circuit should do"},
                    "components": {"type": "array", "items": {"type": "string"}},
                    "circuit_schema": schema_input_property()
                },
                "required": ["description"]
            }),
        ),
        ToolDefinition::new(
            "render_schematic",
            "Render a schematic preview (SVG and scene graph) from a circuit schema.",
            json!({
                "type": "object",
                "properties": {
                    "circuit_schema": schema_input_property(),
                    "schematic_json": {"description": "Backward-compatible schematic object input"},
                    "power_info": {"type": "string", "description": "Badge text, defaults to '<input>V / <max>mA'"}
                }
            }),
        ),
        ToolDefinition::new(
            "get_datasheet",
            "Get a component datasheet link and summarize key electrical specs.",
            json!({
                "type": "object",
                "properties": {
                    "component_name": {"type": "string"},
                    "part_number": {"type": "string"}
                }
            }),
        ),
        ToolDefinition::new(
            "search_components",
            "Search the local catalog of Arduino-compatible components, modules, and sensors.",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Component name or category"}
                },
                "required": ["query"]
            }),
        ),
        ToolDefinition::new(
            "order_parts",
            "Create vendor cart links from BOM data or a normalized circuit schema.",
            json!({
                "type": "object",
                "properties": {
                    "bom_list": {
                        "type": "array",
                        "default": [],
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": {"type": "string"},
                                "quantity": {"type": "integer", "minimum": 1},
                                "part_number": {"type": "string"}
                            },
                            "required": ["name", "quantity"]
                        }
                    },
                    "circuit_schema": schema_input_property(),
                    "preferred_vendor": {"type": "string", "enum": ["mouser", "digikey", "either"]}
                }
            }),
        ),
        ToolDefinition::new(
            "export_project",
            "Export project assets, including sketch, circuit schema, BOM, and enclosure files.",
            json!({
                "type": "object",
                "properties": {
                    "project_id": {"type": "string", "default": "project-default"},
                    "format": {"type": "string", "enum": ["zip", "pdf", "github"], "default": "zip"},
                    "circuit_schema": schema_input_property(),
                    "arduino_code": {"type": "string"}
                }
            }),
        ),
        ToolDefinition::new(
            "suggest_improvements",
            "Suggest firmware and hardware improvements for reliability and power efficiency.",
            json!({
                "type": "object",
                "properties": {
                    "circuit_schema": schema_input_property(),
                    "arduino_code": {"type": "string"},
                    "schematic_json": {"description": "Backward-compatible schematic object input"},
                    "code": {"type": "string", "description": "Backward-compatible alias for arduino_code"}
                }
            }),
        ),
        ToolDefinition::new(
            "generate_3d_case",
            "Generate OpenSCAD for an enclosure from a normalized circuit schema.",
            json!({
                "type": "object",
                "properties": {
                    "circuit_schema": schema_input_property(),
                    "board_size": {
                        "type": "object",
                        "properties": {
                            "length_mm": {"type": "number"},
                            "width_mm": {"type": "number"},
                            "height_mm": {"type": "number", "default": 20}
                        },
                        "required": ["length_mm", "width_mm"]
                    },
                    "style": {"type": "string", "enum": ["minimal", "vented", "rugged"], "default": "minimal"}
                }
            }),
        ),
    ]
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SchemaArgs {
    #[serde(default)]
    circuit_schema: Option<Value>,
    #[serde(default)]
    schematic_json: Option<Value>,
    #[serde(default)]
    power_info: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatasheetArgs {
    #[serde(default)]
    component_name: Option<String>,
    #[serde(default)]
    part_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchArgs {
    query: String,
}

/// Output of `render_schematic`.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedSchematic {
    pub width: f64,
    pub height: f64,
    pub svg: String,
    pub scene: Scene,
}

/// Deserialize tool arguments; a missing or `null` argument object reads
/// as `{}`.
fn parse_args<T: DeserializeOwned>(tool: &str, arguments: &Value) -> Result<T, ArduinoMcpError> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments.clone()
    };
    serde_json::from_value(arguments).map_err(|e| ArduinoMcpError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ArduinoMcpError> {
    Ok(serde_json::to_value(value)?)
}

fn render_schematic(args: &SchemaArgs, settings: &Settings) -> RenderedSchematic {
    let schema = resolve_circuit_schema(
        args.circuit_schema.as_ref(),
        args.schematic_json.as_ref(),
        &FallbackSpec::default(),
    );
    let power_info = args
        .power_info
        .clone()
        .unwrap_or_else(|| schema.power.summary());
    let scene = render_scene(&schema.parts, &schema.nets, Some(&power_info), &settings.schematic);

    RenderedSchematic {
        width: scene.width,
        height: scene.height,
        svg: to_svg(&scene),
        scene,
    }
}

/// Run a tool by name.
pub fn call_tool(name: &str, arguments: &Value, settings: &Settings) -> Result<Value, ArduinoMcpError> {
    tracing::debug!(tool = name, "calling tool");

    match name {
        "generate_circuit" => {
            let request: generate::GenerateRequest = parse_args(name, arguments)?;
            to_json(&generate::generate_circuit(&request))
        }
        "validate_circuit" => {
            let args: SchemaArgs = parse_args(name, arguments)?;
            let schema = resolve_circuit_schema(
                args.circuit_schema.as_ref(),
                args.schematic_json.as_ref(),
                &FallbackSpec::default(),
            );
            to_json(&RulesEngine::with_default_rules().validate(schema))
        }
        "write_arduino_code" => {
            let request: firmware::SketchRequest = parse_args(name, arguments)?;
            to_json(&firmware::write_arduino_code(&request, &settings.schematic))
        }
        "render_schematic" => {
            let args: SchemaArgs = parse_args(name, arguments)?;
            to_json(&render_schematic(&args, settings))
        }
        "get_datasheet" => {
            let args: DatasheetArgs = parse_args(name, arguments)?;
            let library = settings.datasheets();
            to_json(&library.lookup(args.component_name.as_deref(), args.part_number.as_deref()))
        }
        "search_components" => {
            let args: SearchArgs = parse_args(name, arguments)?;
            to_json(&settings.datasheets().search(&args.query))
        }
        "order_parts" => {
            let request: purchasing::OrderRequest = parse_args(name, arguments)?;
            to_json(&purchasing::order_parts(&request, settings)?)
        }
        "export_project" => {
            let request: export::ExportRequest = parse_args(name, arguments)?;
            to_json(&export::export_project(&request)?)
        }
        "suggest_improvements" => {
            let request: improve::ImproveRequest = parse_args(name, arguments)?;
            to_json(&improve::suggest_improvements(&request))
        }
        "generate_3d_case" => {
            let request: enclosure::CaseRequest = parse_args(name, arguments)?;
            to_json(&enclosure::generate_case(&request))
        }
        other => Err(ArduinoMcpError::UnknownTool(other.to_string())),
    }
}
