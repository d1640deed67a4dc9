//! Schema resolution for tool inputs.
//!
//! Tools accept a circuit schema as a JSON object, as a JSON-encoded string,
//! or as an older free-form "schematic" object. Anything that cannot be
//! understood resolves to a default Arduino + LED circuit rather than an
//! error, so the agent always gets a usable schema back.

use serde_json::{Map, Value};

use super::schema::*;

/// Fallback inputs used when no usable schema is supplied.
#[derive(Debug, Clone, Default)]
pub struct FallbackSpec {
    pub description: Option<String>,
    pub power_supply: Option<String>,
    pub requested_components: Vec<String>,
}

/// Parse a power supply string like `"12V"` or `"3.3 volts"` into volts.
///
/// Only digits and dots are kept; the leading decimal number wins.
/// Missing, non-finite or non-positive values give 5 V.
pub fn parse_power_supply(power_supply: Option<&str>) -> f64 {
    let Some(raw) = power_supply else {
        return 5.0;
    };

    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut number = String::new();
    let mut seen_dot = false;
    for c in kept.chars() {
        if c == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        number.push(c);
    }

    match number.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 5.0,
    }
}

/// The default circuit: an Arduino Uno with a status LED, or the Uno plus
/// the requested components as generic `X` parts.
pub fn default_circuit_schema(fallback: &FallbackSpec) -> CircuitSchema {
    let input_voltage = parse_power_supply(fallback.power_supply.as_deref());
    let description = fallback
        .description
        .clone()
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let mut schema = CircuitSchema::new(description, PowerSpec::from_input_voltage(input_voltage));

    schema.parts.push(
        Part::new("U1", "Arduino Uno R3")
            .with_mpn("A000066")
            .with_logic_voltage(5.0),
    );
    if fallback.requested_components.is_empty() {
        schema.parts.push(Part::new("R1", "220 Ohm Resistor"));
        schema.parts.push(Part::new("D1", "LED").with_max_current(20.0));
    } else {
        for (index, component) in fallback.requested_components.iter().enumerate() {
            schema
                .parts
                .push(Part::new(format!("X{}", index + 1), component.clone()));
        }
    }

    schema.nets = vec![
        Net::new("VCC")
            .with_connection("U1", "5V")
            .with_connection("D1", "A"),
        Net::new("GND")
            .with_connection("U1", "GND")
            .with_connection("D1", "K")
            .with_connection("R1", "2"),
        Net::new("LED_STATUS")
            .with_connection("U1", "D13")
            .with_connection("R1", "1"),
    ];
    schema
        .pin_map
        .insert("LED_STATUS".to_string(), "U1:D13".to_string());

    schema
}

/// Convert an older `{description, power_supply, requested_components}`
/// object into a default schema.
fn convert_legacy_schematic(raw: &Map<String, Value>) -> CircuitSchema {
    let description = raw
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();
    let power_supply = raw
        .get("power_supply")
        .and_then(Value::as_str)
        .unwrap_or("5V")
        .to_string();
    let requested_components = raw
        .get("requested_components")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    default_circuit_schema(&FallbackSpec {
        description: Some(description),
        power_supply: Some(power_supply),
        requested_components,
    })
}

fn parse_candidate(candidate: &Value) -> Option<CircuitSchema> {
    match CircuitSchema::from_value(candidate) {
        Ok(schema) => Some(schema),
        Err(e) => match candidate.as_object() {
            Some(raw) => {
                tracing::debug!(error = %e, "candidate is not a circuit schema, converting as legacy schematic");
                Some(convert_legacy_schematic(raw))
            }
            None => {
                tracing::warn!(error = %e, "ignoring non-object circuit schema candidate");
                None
            }
        },
    }
}

/// Resolve tool inputs to a circuit schema, never failing.
///
/// `circuit_schema` wins over `schematic_json`. A string `circuit_schema`
/// is JSON-decoded first. JSON `null` counts as absent.
pub fn resolve_circuit_schema(
    circuit_schema: Option<&Value>,
    schematic_json: Option<&Value>,
    fallback: &FallbackSpec,
) -> CircuitSchema {
    let resolved = match (circuit_schema, schematic_json) {
        (Some(Value::String(text)), _) => match serde_json::from_str::<Value>(text) {
            Ok(decoded) => parse_candidate(&decoded),
            Err(e) => {
                tracing::warn!(error = %e, "circuit_schema string is not valid JSON");
                None
            }
        },
        (Some(candidate), _) if !candidate.is_null() => parse_candidate(candidate),
        (_, Some(candidate)) => parse_candidate(candidate),
        _ => None,
    };

    resolved.unwrap_or_else(|| default_circuit_schema(fallback))
}
