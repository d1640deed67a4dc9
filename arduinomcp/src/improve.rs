//! Firmware and hardware improvement suggestions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::circuit::{resolve_circuit_schema, Circuit, FallbackSpec};

const EMPTY_SKETCH: &str = "void setup() {\n}\n\nvoid loop() {\n}\n";

/// Above this many nets, suggest splitting firmware by subsystem.
const LARGE_NET_COUNT: usize = 10;
/// Above this input voltage, linear regulation wastes too much heat.
const BUCK_THRESHOLD_V: f64 = 9.0;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImproveRequest {
    #[serde(default)]
    pub circuit_schema: Option<Value>,
    #[serde(default)]
    pub arduino_code: Option<String>,
    #[serde(default)]
    pub schematic_json: Option<Value>,
    /// Older name for `arduino_code`
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedSchema {
    pub parts: usize,
    pub nets: usize,
    pub input_voltage_v: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestions {
    pub optimization_tips: Vec<String>,
    pub power_efficiency: Vec<String>,
    pub alternative_components: Vec<String>,
    pub analyzed_schema: AnalyzedSchema,
    pub analyzed_code_lines: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn suggest_improvements(request: &ImproveRequest) -> Suggestions {
    let schema = resolve_circuit_schema(
        request.circuit_schema.as_ref(),
        request.schematic_json.as_ref(),
        &FallbackSpec::default(),
    );
    let code = request
        .arduino_code
        .as_deref()
        .or(request.code.as_deref())
        .unwrap_or(EMPTY_SKETCH);

    let mut optimization_tips = strings(&[
        "Debounce digital inputs in software to avoid false triggers.",
        "Group pin initialization into helper functions for maintainability.",
    ]);
    if schema.nets.len() > LARGE_NET_COUNT {
        optimization_tips.push("Split code by subsystem to keep pin handling maintainable.".to_string());
    }

    let unconnected: Vec<String> = Circuit::from_schema(&schema)
        .unconnected_parts()
        .iter()
        .filter(|p| !p.name.to_lowercase().contains("breadboard"))
        .map(|p| p.ref_des.clone())
        .collect();
    if !unconnected.is_empty() {
        optimization_tips.push(format!(
            "Wire or remove unconnected parts: {}.",
            unconnected.join(", ")
        ));
    }

    let mut power_efficiency = strings(&[
        "Use sleep modes between sensor reads.",
        "Disable unused peripherals to reduce idle current draw.",
    ]);
    if schema.power.input_voltage_v > BUCK_THRESHOLD_V {
        power_efficiency
            .push("Use a buck regulator instead of linear regulation for thermal efficiency.".to_string());
    }

    Suggestions {
        optimization_tips,
        power_efficiency,
        alternative_components: strings(&[
            "Swap linear regulator with a buck converter for higher efficiency.",
            "Use low-power LEDs with higher luminous efficacy.",
        ]),
        analyzed_schema: AnalyzedSchema {
            parts: schema.parts.len(),
            nets: schema.nets.len(),
            input_voltage_v: schema.power.input_voltage_v,
        },
        // same count as splitting on '\n', trailing empty segment included
        analyzed_code_lines: code.split('\n').count(),
    }
}
