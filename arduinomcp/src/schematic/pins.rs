//! Pin allocation.
//!
//! A part only shows the pins some net actually uses. The microcontroller
//! splits them semantically (digital pins left, power/analog right); every
//! other part alternates them left/right in discovery order.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::circuit::Net;

/// Pins of one part, split into the two body edges, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidePins {
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl SidePins {
    /// Number of slots the taller edge needs.
    pub fn rows(&self) -> usize {
        self.left.len().max(self.right.len())
    }
}

/// Distinct pin names referenced for `part_ref`, in the order nets list them.
pub fn used_pins(part_ref: &str, nets: &[Net]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut pins = Vec::new();
    for net in nets {
        for conn in &net.connections {
            if conn.part_ref == part_ref && seen.insert(conn.pin.as_str()) {
                pins.push(conn.pin.clone());
            }
        }
    }
    pins
}

/// Number formed by the pin's digits, `0` when it has none.
fn pin_number(pin: &str) -> u64 {
    let digits: String = pin.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

fn is_left_mcu_pin(pin: &str) -> bool {
    let upper = pin.to_uppercase();
    upper.starts_with('D')
        || upper.starts_with('~')
        || (!upper.is_empty() && upper.chars().all(|c| c.is_ascii_digit()))
}

/// Power rails first, ground next, analog and anything else last.
fn right_tier(pin: &str) -> u8 {
    match pin.to_uppercase().as_str() {
        "5V" | "VIN" => 0,
        "3.3V" | "3V3" => 1,
        "GND" => 2,
        _ => 3,
    }
}

fn by_number(a: &String, b: &String) -> Ordering {
    pin_number(a).cmp(&pin_number(b))
}

/// Split a microcontroller's used pins into the two header edges.
pub fn split_microcontroller_pins(pins: &[String]) -> SidePins {
    let (mut left, mut right): (Vec<String>, Vec<String>) =
        pins.iter().cloned().partition(|p| is_left_mcu_pin(p));

    // stable sorts: equal keys keep discovery order
    left.sort_by(by_number);
    right.sort_by(|a, b| right_tier(a).cmp(&right_tier(b)).then_with(|| by_number(a, b)));

    SidePins { left, right }
}

/// Alternate pins left/right by discovery position.
///
/// This is positional, not electrical: reordering the nets of a schema
/// moves pins between the edges of non-microcontroller parts.
pub fn split_by_parity(pins: &[String]) -> SidePins {
    let mut sides = SidePins::default();
    for (idx, pin) in pins.iter().enumerate() {
        if idx % 2 == 0 {
            sides.left.push(pin.clone());
        } else {
            sides.right.push(pin.clone());
        }
    }
    sides
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_used_pins_discovery_order() {
        let nets = vec![
            Net::new("VCC").with_connection("U1", "5V").with_connection("R1", "2"),
            Net::new("SIG").with_connection("R1", "1").with_connection("U1", "D3"),
            Net::new("DUP").with_connection("R1", "2").with_connection("U1", "5V"),
        ];
        assert_eq!(used_pins("R1", &nets), strings(&["2", "1"]));
        assert_eq!(used_pins("U1", &nets), strings(&["5V", "D3"]));
        assert!(used_pins("D1", &nets).is_empty());
    }

    #[test]
    fn test_microcontroller_split_and_order() {
        let pins = strings(&["GND", "D13", "A0", "5V", "~9", "D2", "3V3", "7", "VIN", "A1"]);
        let sides = split_microcontroller_pins(&pins);

        assert_eq!(sides.left, strings(&["D2", "7", "~9", "D13"]));
        // VIN (no digits) sorts before 5V inside the first tier
        assert_eq!(sides.right, strings(&["VIN", "5V", "3V3", "GND", "A0", "A1"]));
    }

    #[test]
    fn test_microcontroller_lowercase_digital_pin() {
        let sides = split_microcontroller_pins(&strings(&["d4", "gnd", "SDA"]));
        assert_eq!(sides.left, strings(&["d4"]));
        // "SDA" has no digits and sorts as 0 inside the last tier
        assert_eq!(sides.right, strings(&["gnd", "SDA"]));
    }

    #[test]
    fn test_parity_split() {
        let sides = split_by_parity(&strings(&["1", "2", "A", "K", "X"]));
        assert_eq!(sides.left, strings(&["1", "A", "X"]));
        assert_eq!(sides.right, strings(&["2", "K"]));
        assert_eq!(sides.rows(), 3);
    }

    #[test]
    fn test_pin_number() {
        assert_eq!(pin_number("D13"), 13);
        assert_eq!(pin_number("3.3V"), 33);
        assert_eq!(pin_number("GND"), 0);
    }
}
