//! Normalized circuit schema types.
//!
//! This is the JSON shape exchanged by every tool handler: parts, nets,
//! power budget, signal-to-pin map and free-form design constraints.
//! Field names follow the wire format (`snake_case`), with `partRef`
//! accepted as an alias so widget payloads deserialize unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::core::ArduinoMcpError;

pub const SCHEMA_VERSION: &str = "1.0";
pub const DEFAULT_PROJECT_NAME: &str = "antigravity-arduino-project";
pub const DEFAULT_DESCRIPTION: &str = "General-purpose Arduino circuit";

fn default_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

fn default_quantity() -> u32 {
    1
}

fn default_voltage() -> f64 {
    5.0
}

fn default_max_current() -> f64 {
    500.0
}

/// A physical part placed in the circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Reference designator, e.g. `U1`, `R1`, `D1`
    #[serde(rename = "ref")]
    pub ref_des: String,

    /// Human-readable part name
    pub name: String,

    /// Manufacturer part number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,

    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Nominal logic voltage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_voltage_v: Option<f64>,

    /// Max recommended current in mA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_current_ma: Option<f64>,
}

impl Part {
    pub fn new(ref_des: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ref_des: ref_des.into(),
            name: name.into(),
            mpn: None,
            quantity: 1,
            logic_voltage_v: None,
            max_current_ma: None,
        }
    }

    pub fn with_mpn(mut self, mpn: impl Into<String>) -> Self {
        self.mpn = Some(mpn.into());
        self
    }

    pub fn with_logic_voltage(mut self, volts: f64) -> Self {
        self.logic_voltage_v = Some(volts);
        self
    }

    pub fn with_max_current(mut self, milliamps: f64) -> Self {
        self.max_current_ma = Some(milliamps);
        self
    }
}

/// One pin of one part attached to a net.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetConnection {
    #[serde(alias = "partRef")]
    pub part_ref: String,
    pub pin: String,
}

impl NetConnection {
    pub fn new(part_ref: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            part_ref: part_ref.into(),
            pin: pin.into(),
        }
    }

    pub fn pin_ref(&self) -> PinRef {
        PinRef::new(&self.part_ref, &self.pin)
    }
}

/// An electrically common group of pins.
///
/// The first connection is the routing anchor when the net is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    pub name: String,
    #[serde(default)]
    pub connections: Vec<NetConnection>,
}

impl Net {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connections: Vec::new(),
        }
    }

    pub fn with_connection(mut self, part_ref: impl Into<String>, pin: impl Into<String>) -> Self {
        self.add_connection(part_ref, pin);
        self
    }

    pub fn add_connection(&mut self, part_ref: impl Into<String>, pin: impl Into<String>) {
        self.connections.push(NetConnection::new(part_ref, pin));
    }
}

/// Composite key identifying one pin of one part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinRef {
    pub part_ref: String,
    pub pin: String,
}

impl PinRef {
    pub fn new(part_ref: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            part_ref: part_ref.into(),
            pin: pin.into(),
        }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.part_ref, self.pin)
    }
}

/// Supply budget of the design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSpec {
    #[serde(default = "default_voltage")]
    pub input_voltage_v: f64,
    #[serde(default = "default_voltage")]
    pub logic_voltage_v: f64,
    #[serde(default = "default_max_current")]
    pub max_current_ma: f64,
}

impl Default for PowerSpec {
    fn default() -> Self {
        Self {
            input_voltage_v: default_voltage(),
            logic_voltage_v: default_voltage(),
            max_current_ma: default_max_current(),
        }
    }
}

impl PowerSpec {
    /// Logic rail follows the input up to 5 V.
    pub fn from_input_voltage(input_voltage_v: f64) -> Self {
        Self {
            input_voltage_v,
            logic_voltage_v: if input_voltage_v <= 5.0 { input_voltage_v } else { 5.0 },
            max_current_ma: default_max_current(),
        }
    }

    /// Badge text shown on schematic previews, e.g. `5V / 500mA`.
    pub fn summary(&self) -> String {
        format!("{}V / {}mA", self.input_voltage_v, self.max_current_ma)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Size,
    Cost,
    Safety,
    Thermal,
    Power,
    #[default]
    General,
}

/// A free-form design constraint carried alongside the circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: String,
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: ConstraintKind,
}

/// The normalized circuit schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitSchema {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_project_name")]
    pub project_name: String,

    #[serde(default = "default_description")]
    pub description: String,

    pub power: PowerSpec,

    #[serde(default)]
    pub parts: Vec<Part>,

    #[serde(default)]
    pub nets: Vec<Net>,

    /// Signal name to pin mapping, e.g. `LED_STATUS -> U1:D13`
    #[serde(default)]
    pub pin_map: BTreeMap<String, String>,

    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl CircuitSchema {
    pub fn new(description: impl Into<String>, power: PowerSpec) -> Self {
        Self {
            version: default_version(),
            project_name: default_project_name(),
            description: description.into(),
            power,
            parts: Vec::new(),
            nets: Vec::new(),
            pin_map: BTreeMap::new(),
            constraints: Vec::new(),
        }
    }

    /// Strictly parse a schema from a JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ArduinoMcpError> {
        let schema: Self = serde_json::from_value(value.clone())?;
        schema.check_shape()?;
        Ok(schema)
    }

    /// Strictly parse a schema from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ArduinoMcpError> {
        let schema: Self = serde_json::from_str(text)?;
        schema.check_shape()?;
        Ok(schema)
    }

    /// Pretty-printed JSON, as bundled into exports.
    pub fn to_pretty_json(&self) -> Result<String, ArduinoMcpError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn part(&self, ref_des: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.ref_des == ref_des)
    }

    pub fn net(&self, name: &str) -> Option<&Net> {
        self.nets.iter().find(|n| n.name == name)
    }

    /// Shape checks serde cannot express.
    fn check_shape(&self) -> Result<(), ArduinoMcpError> {
        if let Some(part) = self.parts.iter().find(|p| p.quantity == 0) {
            return Err(ArduinoMcpError::Schema(format!(
                "part {} must have a positive quantity",
                part.ref_des
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let schema = CircuitSchema::from_value(&json!({ "power": {} })).unwrap();

        assert_eq!(schema.version, "1.0");
        assert_eq!(schema.project_name, DEFAULT_PROJECT_NAME);
        assert_eq!(schema.description, DEFAULT_DESCRIPTION);
        assert_eq!(schema.power, PowerSpec::default());
        assert!(schema.parts.is_empty());
        assert!(schema.pin_map.is_empty());
    }

    #[test]
    fn test_power_is_required() {
        assert!(CircuitSchema::from_value(&json!({ "parts": [] })).is_err());
    }

    #[test]
    fn test_part_ref_alias_and_quantity_default() {
        let schema = CircuitSchema::from_value(&json!({
            "power": {},
            "parts": [{ "ref": "U1", "name": "Arduino Uno R3" }],
            "nets": [{ "name": "VCC", "connections": [{ "partRef": "U1", "pin": "5V" }] }]
        }))
        .unwrap();

        assert_eq!(schema.parts[0].quantity, 1);
        assert_eq!(schema.nets[0].connections[0].part_ref, "U1");
        assert_eq!(schema.nets[0].connections[0].pin_ref().to_string(), "U1:5V");
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = CircuitSchema::from_value(&json!({
            "power": {},
            "parts": [{ "ref": "R1", "name": "Resistor", "quantity": 0 }]
        }));
        assert!(matches!(result, Err(ArduinoMcpError::Schema(_))));
    }

    #[test]
    fn test_constraint_kind_wire_name() {
        let constraint: Constraint =
            serde_json::from_value(json!({ "id": "C1", "description": "small", "type": "size" }))
                .unwrap();
        assert_eq!(constraint.kind, ConstraintKind::Size);

        let constraint: Constraint =
            serde_json::from_value(json!({ "id": "C2", "description": "anything" })).unwrap();
        assert_eq!(constraint.kind, ConstraintKind::General);
    }

    #[test]
    fn test_power_summary() {
        assert_eq!(PowerSpec::default().summary(), "5V / 500mA");
        let power = PowerSpec::from_input_voltage(12.0);
        assert_eq!(power.logic_voltage_v, 5.0);
        assert_eq!(power.summary(), "12V / 500mA");
    }

    #[test]
    fn test_pin_ref_keeps_colons_distinct() {
        let a = PinRef::new("U1:A", "B");
        let b = PinRef::new("U1", "A:B");
        assert_ne!(a, b);
    }
}
