//! Part archetype classification.
//!
//! The archetype picks the body glyph drawn for a part. Rules are an
//! ordered table, first match wins; reordering changes results (a part
//! `R3` named "LED sensor module" skips the resistor rule because of the
//! word "sensor" and lands on the LED rule).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Microcontroller,
    Resistor,
    Led,
    Capacitor,
    Servo,
    Sensor,
    Generic,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Microcontroller => "microcontroller",
            Archetype::Resistor => "resistor",
            Archetype::Led => "led",
            Archetype::Capacitor => "capacitor",
            Archetype::Servo => "servo",
            Archetype::Sensor => "sensor",
            Archetype::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized view of a part used by the rule predicates.
struct PartKey {
    ref_upper: String,
    name_lower: String,
}

impl PartKey {
    fn ref_starts(&self, prefix: char) -> bool {
        self.ref_upper.starts_with(prefix)
    }

    fn name_has_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.name_lower.contains(n))
    }
}

struct ClassifierRule {
    archetype: Archetype,
    matches: fn(&PartKey) -> bool,
}

const RULES: &[ClassifierRule] = &[
    ClassifierRule {
        archetype: Archetype::Microcontroller,
        matches: |k| k.ref_starts('U') || k.name_has_any(&["arduino", "mcu", "esp"]),
    },
    ClassifierRule {
        archetype: Archetype::Resistor,
        matches: |k| k.ref_starts('R') && !k.name_lower.contains("sensor"),
    },
    ClassifierRule {
        archetype: Archetype::Led,
        matches: |k| k.ref_starts('D') || k.name_has_any(&["led", "diode"]),
    },
    ClassifierRule {
        archetype: Archetype::Capacitor,
        // a value like "100nF" in the name is enough
        matches: |k| {
            k.ref_starts('C')
                && (k.name_lower.contains("cap") || k.name_lower.chars().any(|c| c.is_ascii_digit()))
        },
    },
    ClassifierRule {
        archetype: Archetype::Servo,
        matches: |k| k.name_has_any(&["servo", "motor"]),
    },
    ClassifierRule {
        archetype: Archetype::Sensor,
        matches: |k| k.name_has_any(&["sensor", "dht", "hc-sr", "tmp", "bme", "bmp"]),
    },
];

/// Classify a part by reference designator and name. Total: anything
/// unmatched is [`Archetype::Generic`].
pub fn classify(ref_des: &str, name: &str) -> Archetype {
    let key = PartKey {
        ref_upper: ref_des.to_uppercase(),
        name_lower: name.to_lowercase(),
    };

    RULES
        .iter()
        .find(|rule| (rule.matches)(&key))
        .map(|rule| rule.archetype)
        .unwrap_or(Archetype::Generic)
}
