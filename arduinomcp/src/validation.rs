//! Circuit validation rules.
//!
//! Each rule inspects a schema (and its connectivity graph) and reports
//! warnings. A report passes when no warning is [`Severity::High`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, CircuitSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub fix: String,
}

impl Warning {
    fn new(code: &str, severity: Severity, message: impl Into<String>, fix: &str) -> Self {
        Self {
            code: code.to_string(),
            severity,
            message: message.into(),
            fix: fix.to_string(),
        }
    }
}

/// Output of [`RulesEngine::validate`].
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub pass: bool,
    pub warnings: Vec<Warning>,
    pub normalized_circuit_schema: CircuitSchema,
}

impl ValidationReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.warnings.iter().filter(|w| w.severity == severity).count()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.warnings.iter().map(|w| w.code.as_str()).collect()
    }
}

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn check(&self, schema: &CircuitSchema, circuit: &Circuit) -> Vec<Warning>;
}

pub struct RulesEngine {
    rules: Vec<Arc<dyn Rule>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Arc::new(VoltageDomainRule));
        engine.add_rule(Arc::new(LedResistorRule));
        engine.add_rule(Arc::new(FloatingNetRule));
        engine.add_rule(Arc::new(PinConflictRule));
        engine.add_rule(Arc::new(UnknownPartRefRule));
        engine.add_rule(Arc::new(UnconnectedPartRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn validate(&self, schema: CircuitSchema) -> ValidationReport {
        let circuit = Circuit::from_schema(&schema);
        let mut warnings = Vec::new();
        for rule in &self.rules {
            let found = rule.check(&schema, &circuit);
            if !found.is_empty() {
                tracing::debug!(rule = rule.id(), count = found.len(), "rule reported warnings");
            }
            warnings.extend(found);
        }

        ValidationReport {
            pass: warnings.iter().all(|w| w.severity != Severity::High),
            warnings,
            normalized_circuit_schema: schema,
        }
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// Logic rail above the supply.
pub struct VoltageDomainRule;

impl Rule for VoltageDomainRule {
    fn id(&self) -> &str {
        "VOLTAGE_DOMAIN_MISMATCH"
    }

    fn check(&self, schema: &CircuitSchema, _circuit: &Circuit) -> Vec<Warning> {
        if schema.power.logic_voltage_v > schema.power.input_voltage_v {
            vec![Warning::new(
                self.id(),
                Severity::High,
                "Logic voltage is greater than input voltage.",
                "Lower logic voltage or use a proper regulator/level shifter.",
            )]
        } else {
            Vec::new()
        }
    }
}

/// An LED in the BOM with no resistor anywhere.
pub struct LedResistorRule;

impl Rule for LedResistorRule {
    fn id(&self) -> &str {
        "MISSING_LED_RESISTOR"
    }

    fn check(&self, schema: &CircuitSchema, _circuit: &Circuit) -> Vec<Warning> {
        let names: Vec<String> = schema.parts.iter().map(|p| p.name.to_lowercase()).collect();
        let has_led = names.iter().any(|n| n.contains("led"));
        let has_resistor = names.iter().any(|n| n.contains("resistor"));

        if has_led && !has_resistor {
            vec![Warning::new(
                self.id(),
                Severity::High,
                "LED detected without a series resistor in BOM.",
                "Add 220-1k Ohm resistor in series with each LED.",
            )]
        } else {
            Vec::new()
        }
    }
}

/// One warning per net with fewer than two connections.
pub struct FloatingNetRule;

impl Rule for FloatingNetRule {
    fn id(&self) -> &str {
        "FLOATING_NET"
    }

    fn check(&self, schema: &CircuitSchema, _circuit: &Circuit) -> Vec<Warning> {
        schema
            .nets
            .iter()
            .filter(|net| net.connections.len() < 2)
            .map(|net| {
                Warning::new(
                    self.id(),
                    Severity::Medium,
                    format!("Net {} has fewer than two connections.", net.name),
                    "Ensure every net has valid source and destination pins.",
                )
            })
            .collect()
    }
}

/// A pin listed on more than one net.
///
/// The first net to claim a pin keeps it; every later net naming the same
/// pin produces one warning.
pub struct PinConflictRule;

impl Rule for PinConflictRule {
    fn id(&self) -> &str {
        "POTENTIAL_SHORT"
    }

    fn check(&self, schema: &CircuitSchema, _circuit: &Circuit) -> Vec<Warning> {
        let mut owner: HashMap<_, &str> = HashMap::new();
        let mut warnings = Vec::new();

        for net in &schema.nets {
            for conn in &net.connections {
                let key = conn.pin_ref();
                match owner.get(&key) {
                    Some(existing) if *existing != net.name => {
                        warnings.push(Warning::new(
                            self.id(),
                            Severity::High,
                            format!(
                                "Pin {} is assigned to multiple nets ({}, {}).",
                                key, existing, net.name
                            ),
                            "Move the pin to a single electrical net.",
                        ));
                    }
                    _ => {
                        owner.insert(key, net.name.as_str());
                    }
                }
            }
        }
        warnings
    }
}

/// Connections naming a part the schema does not declare.
pub struct UnknownPartRefRule;

impl Rule for UnknownPartRefRule {
    fn id(&self) -> &str {
        "UNKNOWN_PART_REF"
    }

    fn check(&self, _schema: &CircuitSchema, circuit: &Circuit) -> Vec<Warning> {
        circuit
            .dangling_connections()
            .iter()
            .map(|(net, conn)| {
                Warning::new(
                    self.id(),
                    Severity::Low,
                    format!(
                        "Net {} references {}:{} but no part {} is declared.",
                        net, conn.part_ref, conn.pin, conn.part_ref
                    ),
                    "Add the part to the parts list or fix the reference designator.",
                )
            })
            .collect()
    }
}

/// Parts that no net touches.
pub struct UnconnectedPartRule;

impl Rule for UnconnectedPartRule {
    fn id(&self) -> &str {
        "UNCONNECTED_PART"
    }

    fn check(&self, _schema: &CircuitSchema, circuit: &Circuit) -> Vec<Warning> {
        circuit
            .unconnected_parts()
            .into_iter()
            // breadboards carry no electrical connections of their own
            .filter(|part| !part.name.to_lowercase().contains("breadboard"))
            .map(|part| {
                Warning::new(
                    self.id(),
                    Severity::Low,
                    format!("Part {} ({}) is not connected to any net.", part.ref_des, part.name),
                    "Wire the part into the circuit or remove it from the BOM.",
                )
            })
            .collect()
    }
}
