//! Arduino sketch generation and the circuit-builder widget payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::circuit::{resolve_circuit_schema, CircuitSchema, FallbackSpec, Net, Part};
use crate::config::SchematicTheme;
use crate::schematic::{render_scene, to_svg};

pub const SKETCH_FILENAME: &str = "sketch.ino";
const DEFAULT_LED_PIN: u32 = 13;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SketchRequest {
    pub description: String,
    #[serde(default)]
    pub components: Vec<String>,
    /// When present the widget also carries the schematic preview
    #[serde(default)]
    pub circuit_schema: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentItem {
    pub name: String,
    pub qty: u32,
    pub purchase_url: String,
}

impl ComponentItem {
    fn new(name: &str, qty: u32, purchase_url: &str) -> Self {
        Self {
            name: name.to_string(),
            qty,
            purchase_url: purchase_url.to_string(),
        }
    }
}

/// Props of the circuit-builder widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchWidget {
    pub prompt: String,
    pub filename: String,
    pub code: String,
    pub diagram_title: String,
    pub diagram_notes: Vec<String>,
    pub components: Vec<ComponentItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_parts: Option<Vec<Part>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_nets: Option<Vec<Net>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schematic_svg: Option<String>,
}

impl SketchWidget {
    pub fn summary(&self) -> String {
        format!(
            "Generated {} with {} components.",
            self.filename,
            self.components.len()
        )
    }
}

fn default_components() -> Vec<ComponentItem> {
    vec![
        ComponentItem::new("Arduino Uno R3", 1, "https://www.adafruit.com/product/50"),
        ComponentItem::new("Breadboard", 1, "https://www.adafruit.com/product/64"),
        ComponentItem::new("220 Ohm Resistor", 2, "https://www.adafruit.com/product/2780"),
        ComponentItem::new("LED", 1, "https://www.adafruit.com/product/300"),
    ]
}

/// One Adafruit search link per distinct name, first occurrence order.
fn requested_components(names: &[String]) -> Vec<ComponentItem> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .map(|name| ComponentItem {
            name: name.clone(),
            qty: 1,
            purchase_url: format!(
                "https://www.adafruit.com/search?q={}",
                urlencoding::encode(name)
            ),
        })
        .collect()
}

/// Arduino pin number of the status LED: the digits after `:` in
/// `pin_map["LED_STATUS"]`, 13 when absent or unreadable.
pub fn led_pin(schema: Option<&CircuitSchema>) -> u32 {
    schema
        .and_then(|s| s.pin_map.get("LED_STATUS"))
        .and_then(|target| target.split_once(':'))
        .and_then(|(_, pin)| {
            let digits: String = pin.chars().filter(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        })
        .unwrap_or(DEFAULT_LED_PIN)
}

/// Blink sketch for the status LED.
pub fn blink_sketch(description: &str, led_pin: u32) -> String {
    format!(
        "// Auto-generated Arduino code\n\
         // Description: {description}\n\
         \n\
         const int LED_PIN = {led_pin};\n\
         \n\
         void setup() {{\n  pinMode(LED_PIN, OUTPUT);\n}}\n\
         \n\
         void loop() {{\n  digitalWrite(LED_PIN, HIGH);\n  delay(500);\n  digitalWrite(LED_PIN, LOW);\n  delay(500);\n}}"
    )
}

pub fn write_arduino_code(request: &SketchRequest, theme: &SchematicTheme) -> SketchWidget {
    let schema = request.circuit_schema.as_ref().map(|value| {
        resolve_circuit_schema(
            Some(value),
            None,
            &FallbackSpec {
                description: Some(request.description.clone()),
                ..Default::default()
            },
        )
    });

    let components = if request.components.is_empty() {
        default_components()
    } else {
        requested_components(&request.components)
    };

    let mut widget = SketchWidget {
        prompt: request.description.clone(),
        filename: SKETCH_FILENAME.to_string(),
        code: blink_sketch(&request.description, led_pin(schema.as_ref())),
        diagram_title: "Circuit Diagram Preview".to_string(),
        diagram_notes: vec![
            "Connect component grounds to Arduino GND.".to_string(),
            "Use 220 Ohm resistor in series with each LED.".to_string(),
            "Verify pin mapping before uploading firmware.".to_string(),
        ],
        components,
        circuit_parts: None,
        circuit_nets: None,
        power_info: None,
        schematic_svg: None,
    };

    if let Some(schema) = schema {
        let power_info = schema.power.summary();
        let scene = render_scene(&schema.parts, &schema.nets, Some(&power_info), theme);
        widget.schematic_svg = Some(to_svg(&scene));
        widget.power_info = Some(power_info);
        widget.circuit_parts = Some(schema.parts);
        widget.circuit_nets = Some(schema.nets);
    }

    widget
}
