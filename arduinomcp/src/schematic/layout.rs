//! Part placement.
//!
//! The first microcontroller-class part sits in the left column; every
//! other part is stacked in the right column in schema order. Each used
//! pin gets a stub whose outer tip is registered in the [`PinPositions`]
//! map the router draws wires to.

use std::collections::HashMap;

use serde::Serialize;

use super::classify::{classify, Archetype};
use super::pins::{split_by_parity, split_microcontroller_pins, used_pins, SidePins};
use super::*;
use crate::circuit::{Net, Part, PinRef};

/// Pin stub tips keyed by part + pin. Rebuilt on every layout pass.
pub type PinPositions = HashMap<PinRef, Point>;

/// A pin drawn on a part body edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedPin {
    pub name: String,
    /// Outer tip of the pin stub, where wires attach
    pub position: Point,
}

/// A part with its body rectangle and pins, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartPlacement {
    pub ref_des: String,
    pub name: String,
    pub archetype: Archetype,
    pub body: Rect,
    pub left_pins: Vec<PlacedPin>,
    pub right_pins: Vec<PlacedPin>,
}

impl PartPlacement {
    pub fn pins(&self) -> impl Iterator<Item = &PlacedPin> {
        self.left_pins.iter().chain(self.right_pins.iter())
    }
}

/// Output of [`layout`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchematicLayout {
    pub microcontroller: Option<PartPlacement>,
    pub components: Vec<PartPlacement>,
    #[serde(skip)]
    pub pin_positions: PinPositions,
    pub width: f64,
    pub height: f64,
}

impl SchematicLayout {
    pub fn pin_position(&self, part_ref: &str, pin: &str) -> Option<Point> {
        self.pin_positions.get(&PinRef::new(part_ref, pin)).copied()
    }

    pub fn placements(&self) -> impl Iterator<Item = &PartPlacement> {
        self.microcontroller.iter().chain(self.components.iter())
    }
}

/// Place pins down both edges of a body and register their stub tips.
fn place_pins(
    part_ref: &str,
    pins: &[String],
    stub_x: f64,
    first_y: f64,
    gap: f64,
    positions: &mut PinPositions,
) -> Vec<PlacedPin> {
    pins.iter()
        .enumerate()
        .map(|(i, pin)| {
            let position = Point::new(stub_x, first_y + i as f64 * gap);
            positions.insert(PinRef::new(part_ref, pin.as_str()), position);
            PlacedPin {
                name: pin.clone(),
                position,
            }
        })
        .collect()
}

fn place_microcontroller(part: &Part, sides: &SidePins, positions: &mut PinPositions) -> PartPlacement {
    let body = Rect::new(MCU_X, COMP_START_Y, MCU_W, microcontroller_height(sides));
    // pins are centred in their slots
    let first_y = body.y + MCU_PAD + MCU_PIN_GAP / 2.0;

    let left_pins = place_pins(&part.ref_des, &sides.left, MCU_X - PIN_STUB, first_y, MCU_PIN_GAP, positions);
    let right_pins = place_pins(&part.ref_des, &sides.right, body.right() + PIN_STUB, first_y, MCU_PIN_GAP, positions);

    PartPlacement {
        ref_des: part.ref_des.clone(),
        name: part.name.clone(),
        archetype: Archetype::Microcontroller,
        body,
        left_pins,
        right_pins,
    }
}

fn place_component(
    index: usize,
    part: &Part,
    nets: &[Net],
    positions: &mut PinPositions,
) -> PartPlacement {
    let sides = split_by_parity(&used_pins(&part.ref_des, nets));
    let center_y = COMP_START_Y + index as f64 * COMP_GAP + 30.0;
    let height = sides.rows().max(1) as f64 * COMP_PIN_GAP + COMP_PAD;
    let body = Rect::new(COMP_X, center_y - height / 2.0, COMP_W, height);
    let first_y = body.y + COMP_PIN_OFFSET;

    let left_pins = place_pins(&part.ref_des, &sides.left, COMP_X - PIN_STUB, first_y, COMP_PIN_GAP, positions);
    let right_pins = place_pins(&part.ref_des, &sides.right, body.right() + PIN_STUB, first_y, COMP_PIN_GAP, positions);

    PartPlacement {
        ref_des: part.ref_des.clone(),
        name: part.name.clone(),
        archetype: classify(&part.ref_des, &part.name),
        body,
        left_pins,
        right_pins,
    }
}

/// At least two slots so the header box stays usable with 0-1 pins.
fn microcontroller_height(sides: &SidePins) -> f64 {
    sides.rows().max(2) as f64 * MCU_PIN_GAP + MCU_PAD * 2.0
}

/// Compute placements and pin positions for one render.
///
/// Parts whose name mentions a breadboard are wiring aids, not circuit
/// elements, and are left out of the stack.
pub fn layout(parts: &[Part], nets: &[Net]) -> SchematicLayout {
    let mut pin_positions = PinPositions::new();

    let mcu_index = parts
        .iter()
        .position(|p| classify(&p.ref_des, &p.name) == Archetype::Microcontroller);

    let mcu_sides = mcu_index
        .map(|i| split_microcontroller_pins(&used_pins(&parts[i].ref_des, nets)))
        .unwrap_or_default();

    let microcontroller =
        mcu_index.map(|i| place_microcontroller(&parts[i], &mcu_sides, &mut pin_positions));

    let components: Vec<PartPlacement> = parts
        .iter()
        .enumerate()
        .filter(|(i, p)| Some(*i) != mcu_index && !p.name.to_lowercase().contains("breadboard"))
        .map(|(_, p)| p)
        .enumerate()
        .map(|(slot, part)| place_component(slot, part, nets, &mut pin_positions))
        .collect();

    let height = (COMP_START_Y + microcontroller_height(&mcu_sides) + 30.0)
        .max(COMP_START_Y + components.len() as f64 * COMP_GAP + 40.0)
        .max(MIN_CANVAS_HEIGHT);

    tracing::debug!(
        microcontroller = microcontroller.as_ref().map(|p| p.ref_des.as_str()),
        components = components.len(),
        pins = pin_positions.len(),
        height,
        "schematic layout computed"
    );

    SchematicLayout {
        microcontroller,
        components,
        pin_positions,
        width: CANVAS_WIDTH,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn led_circuit() -> (Vec<Part>, Vec<Net>) {
        let parts = vec![
            Part::new("U1", "Arduino Uno R3"),
            Part::new("R1", "220 Ohm Resistor"),
            Part::new("D1", "LED"),
        ];
        let nets = vec![
            Net::new("VCC").with_connection("U1", "5V").with_connection("U1", "D2"),
            Net::new("GND").with_connection("U1", "GND").with_connection("U1", "D13"),
            Net::new("LED_STATUS").with_connection("U1", "D13").with_connection("R1", "1"),
            Net::new("LED_ANODE").with_connection("R1", "2").with_connection("D1", "A"),
        ];
        (parts, nets)
    }

    #[test]
    fn test_microcontroller_column() {
        let (parts, nets) = led_circuit();
        let result = layout(&parts, &nets);

        let mcu = result.microcontroller.as_ref().unwrap();
        assert_eq!(mcu.ref_des, "U1");
        assert_eq!(mcu.body, Rect::new(30.0, 40.0, 130.0, 72.0));

        let left: Vec<&str> = mcu.left_pins.iter().map(|p| p.name.as_str()).collect();
        let right: Vec<&str> = mcu.right_pins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(left, vec!["D2", "D13"]);
        assert_eq!(right, vec!["5V", "GND"]);

        assert_eq!(result.pin_position("U1", "D2"), Some(Point::new(14.0, 66.0)));
        assert_eq!(result.pin_position("U1", "D13"), Some(Point::new(14.0, 86.0)));
        assert_eq!(result.pin_position("U1", "5V"), Some(Point::new(176.0, 66.0)));
        assert_eq!(result.pin_position("U1", "GND"), Some(Point::new(176.0, 86.0)));
    }

    #[test]
    fn test_component_stack_in_schema_order() {
        let (parts, nets) = led_circuit();
        let result = layout(&parts, &nets);

        let refs: Vec<&str> = result.components.iter().map(|p| p.ref_des.as_str()).collect();
        assert_eq!(refs, vec!["R1", "D1"]);

        // R1: pins "1" (left) and "2" (right), one row
        let r1 = &result.components[0];
        assert_eq!(r1.archetype, Archetype::Resistor);
        assert_eq!(r1.body, Rect::new(390.0, 52.0, 130.0, 36.0));
        assert_eq!(result.pin_position("R1", "1"), Some(Point::new(374.0, 64.0)));
        assert_eq!(result.pin_position("R1", "2"), Some(Point::new(536.0, 64.0)));

        // D1: second slot, 72 units lower
        let d1 = &result.components[1];
        assert_eq!(d1.archetype, Archetype::Led);
        assert_eq!(d1.body.y, 124.0);
        assert_eq!(result.pin_position("D1", "A"), Some(Point::new(374.0, 136.0)));
    }

    #[test]
    fn test_canvas_height_floor_and_growth() {
        let result = layout(&[], &[]);
        assert!(result.microcontroller.is_none());
        assert_eq!(result.height, 180.0);
        assert_eq!(result.width, 560.0);

        let parts: Vec<Part> = (1..=5).map(|i| Part::new(format!("X{i}"), "Module")).collect();
        let result = layout(&parts, &[]);
        assert_eq!(result.components.len(), 5);
        assert_eq!(result.height, 40.0 + 5.0 * 72.0 + 40.0);
    }

    #[test]
    fn test_tall_microcontroller_drives_height() {
        let parts = vec![Part::new("U1", "Arduino Nano")];
        let mut net = Net::new("BUS");
        for pin in 2..=13 {
            net.add_connection("U1", format!("D{pin}"));
        }
        let result = layout(&parts, &[net]);
        let mcu = result.microcontroller.unwrap();
        assert_eq!(mcu.body.height, 12.0 * 20.0 + 32.0);
        assert_eq!(result.height, 40.0 + mcu.body.height + 30.0);
    }

    #[test]
    fn test_only_first_microcontroller_goes_left() {
        let parts = vec![
            Part::new("U1", "Arduino Uno R3"),
            Part::new("U2", "ESP32"),
            Part::new("BB1", "Half-size Breadboard"),
        ];
        let result = layout(&parts, &[]);
        assert_eq!(result.microcontroller.as_ref().unwrap().ref_des, "U1");
        assert_eq!(result.components.len(), 1);
        assert_eq!(result.components[0].archetype, Archetype::Microcontroller);
        assert_eq!(result.components[0].body.height, 36.0);
    }

    #[test]
    fn test_pin_slots_unique_per_part() {
        let (parts, nets) = led_circuit();
        let result = layout(&parts, &nets);

        for placement in result.placements() {
            let left: HashSet<i64> = placement.left_pins.iter().map(|p| p.position.y as i64).collect();
            let right: HashSet<i64> = placement.right_pins.iter().map(|p| p.position.y as i64).collect();
            assert_eq!(left.len(), placement.left_pins.len());
            assert_eq!(right.len(), placement.right_pins.len());

            let names: HashSet<&str> = placement.pins().map(|p| p.name.as_str()).collect();
            assert_eq!(names.len(), placement.pins().count());
        }
    }
}
