//! Net routing.
//!
//! Every drawable net gets its own vertical trunk in the corridor between
//! the microcontroller and the part stack. Trunk x is derived from the
//! net's index in the schema, so two nets never share a trunk until the
//! corridor runs out and the clamp kicks in.

use serde::Serialize;

use super::layout::PinPositions;
use super::*;
use crate::circuit::Net;
use crate::config::SchematicTheme;

/// Visual class of a net, decided from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetKind {
    Power,
    Ground,
    Signal,
}

impl NetKind {
    pub fn of(net_name: &str) -> Self {
        let upper = net_name.to_uppercase();
        if upper.contains("VCC") || upper == "5V" || upper == "3V3" {
            NetKind::Power
        } else if upper.contains("GND") {
            NetKind::Ground
        } else {
            NetKind::Signal
        }
    }

    /// Power or ground rail.
    pub fn is_supply(&self) -> bool {
        !matches!(self, NetKind::Signal)
    }
}

/// Wires, junctions and label for one drawn net.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedNet {
    pub name: String,
    /// Position of the net in the schema's net list
    pub net_index: usize,
    pub kind: NetKind,
    pub color: String,
    pub bus_x: f64,
    pub anchor: Point,
    /// One 4-point Manhattan path per non-anchor endpoint
    pub wires: Vec<[Point; 4]>,
    pub junctions: Vec<Point>,
    pub label: Point,
}

/// Trunk x for a net.
pub fn bus_x(net_index: usize) -> f64 {
    let max = COMP_X - PIN_STUB - BUS_CLEARANCE;
    (BUS_X + BUS_STEP * net_index as f64).clamp(BUS_X, max)
}

/// Route every net with at least two placed endpoints.
///
/// Connections whose pin was never placed are dropped silently. Skipped
/// nets consume neither a trunk slot nor a palette color: the trunk comes
/// from the schema index and the palette cursor only moves on drawn
/// signal nets.
pub fn route_nets(nets: &[Net], positions: &PinPositions, theme: &SchematicTheme) -> Vec<RoutedNet> {
    let mut palette_cursor = 0usize;
    let mut routed = Vec::new();

    for (net_index, net) in nets.iter().enumerate() {
        let endpoints: Vec<Point> = net
            .connections
            .iter()
            .filter_map(|conn| positions.get(&conn.pin_ref()).copied())
            .collect();

        if endpoints.len() < 2 {
            tracing::debug!(
                net = %net.name,
                endpoints = endpoints.len(),
                "net skipped, fewer than two placed endpoints"
            );
            continue;
        }

        let kind = NetKind::of(&net.name);
        let color = match kind {
            NetKind::Power => theme.power_color.clone(),
            NetKind::Ground => theme.ground_color.clone(),
            NetKind::Signal => {
                let color = theme.signal_color(palette_cursor);
                palette_cursor += 1;
                color
            }
        };

        let bus = bus_x(net_index);
        let anchor = endpoints[0];
        let wires: Vec<[Point; 4]> = endpoints[1..]
            .iter()
            .map(|target| {
                [
                    anchor,
                    Point::new(bus, anchor.y),
                    Point::new(bus, target.y),
                    *target,
                ]
            })
            .collect();

        let junctions = if endpoints.len() > 2 {
            vec![Point::new(bus, anchor.y); endpoints.len() - 1]
        } else {
            Vec::new()
        };

        routed.push(RoutedNet {
            name: net.name.clone(),
            net_index,
            kind,
            color,
            bus_x: bus,
            anchor,
            wires,
            junctions,
            label: Point::new(bus + 2.0, anchor.y - 5.0),
        });
    }

    routed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::PinRef;

    fn positions(entries: &[(&str, &str, f64, f64)]) -> PinPositions {
        entries
            .iter()
            .map(|(r, p, x, y)| (PinRef::new(*r, *p), Point::new(*x, *y)))
            .collect()
    }

    #[test]
    fn test_net_kind() {
        assert_eq!(NetKind::of("VCC"), NetKind::Power);
        assert_eq!(NetKind::of("vcc_3v3"), NetKind::Power);
        assert_eq!(NetKind::of("5v"), NetKind::Power);
        assert_eq!(NetKind::of("3V3"), NetKind::Power);
        assert_eq!(NetKind::of("AGND"), NetKind::Ground);
        assert_eq!(NetKind::of("5V_RAIL"), NetKind::Signal);
        assert_eq!(NetKind::of("LED_STATUS"), NetKind::Signal);
        assert!(NetKind::Ground.is_supply());
        assert!(!NetKind::Signal.is_supply());
    }

    #[test]
    fn test_bus_x_clamped() {
        assert_eq!(bus_x(0), 220.0);
        assert_eq!(bus_x(3), 256.0);
        assert_eq!(bus_x(11), 352.0);
        assert_eq!(bus_x(12), 354.0);
        assert_eq!(bus_x(40), 354.0);
    }

    #[test]
    fn test_two_endpoint_net_has_no_junction() {
        let pos = positions(&[("U1", "D13", 14.0, 86.0), ("R1", "1", 374.0, 64.0)]);
        let nets = vec![Net::new("LED_STATUS").with_connection("U1", "D13").with_connection("R1", "1")];
        let routed = route_nets(&nets, &pos, &SchematicTheme::default());

        assert_eq!(routed.len(), 1);
        let net = &routed[0];
        assert_eq!(net.color, "#2563eb");
        assert_eq!(
            net.wires,
            vec![[
                Point::new(14.0, 86.0),
                Point::new(220.0, 86.0),
                Point::new(220.0, 64.0),
                Point::new(374.0, 64.0),
            ]]
        );
        assert!(net.junctions.is_empty());
        assert_eq!(net.label, Point::new(222.0, 81.0));
    }

    #[test]
    fn test_ground_fan_out() {
        let pos = positions(&[
            ("U1", "GND", 176.0, 86.0),
            ("D1", "K", 536.0, 136.0),
            ("R1", "2", 536.0, 64.0),
        ]);
        let nets = vec![
            Net::new("VCC"),
            Net::new("GND")
                .with_connection("U1", "GND")
                .with_connection("D1", "K")
                .with_connection("R1", "2"),
        ];
        let routed = route_nets(&nets, &pos, &SchematicTheme::default());

        assert_eq!(routed.len(), 1);
        let gnd = &routed[0];
        assert_eq!(gnd.kind, NetKind::Ground);
        assert_eq!(gnd.color, "#16a34a");
        assert_eq!(gnd.net_index, 1);
        assert_eq!(gnd.bus_x, 232.0);
        assert_eq!(gnd.wires.len(), 2);
        assert_eq!(gnd.junctions, vec![Point::new(232.0, 86.0); 2]);
    }

    #[test]
    fn test_skipped_net_takes_no_palette_slot() {
        let pos = positions(&[
            ("U1", "D2", 14.0, 66.0),
            ("U1", "D3", 14.0, 86.0),
            ("S1", "1", 374.0, 64.0),
            ("S1", "2", 536.0, 64.0),
        ]);
        let nets = vec![
            // D1 never placed, only one endpoint left
            Net::new("DANGLING").with_connection("U1", "D2").with_connection("D1", "A"),
            Net::new("SIG_A").with_connection("U1", "D2").with_connection("S1", "1"),
            Net::new("SIG_B").with_connection("U1", "D3").with_connection("S1", "2"),
        ];
        let routed = route_nets(&nets, &pos, &SchematicTheme::default());

        let names: Vec<&str> = routed.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["SIG_A", "SIG_B"]);
        assert_eq!(routed[0].color, "#2563eb");
        assert_eq!(routed[1].color, "#d97706");
        // trunk still follows the schema index
        assert_eq!(routed[0].bus_x, 232.0);
        assert_eq!(routed[1].bus_x, 244.0);
    }

    #[test]
    fn test_supply_nets_do_not_advance_palette() {
        let pos = positions(&[
            ("U1", "5V", 176.0, 66.0),
            ("U1", "GND", 176.0, 86.0),
            ("U1", "D13", 14.0, 66.0),
            ("R1", "1", 374.0, 64.0),
            ("R1", "2", 536.0, 64.0),
            ("R1", "3", 536.0, 84.0),
        ]);
        let nets = vec![
            Net::new("VCC").with_connection("U1", "5V").with_connection("R1", "2"),
            Net::new("GND").with_connection("U1", "GND").with_connection("R1", "3"),
            Net::new("SIG").with_connection("U1", "D13").with_connection("R1", "1"),
        ];
        let routed = route_nets(&nets, &pos, &SchematicTheme::default());

        let summary: Vec<(&str, &str, f64)> = routed
            .iter()
            .map(|n| (n.name.as_str(), n.color.as_str(), n.bus_x))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("VCC", "#ef4444", 220.0),
                ("GND", "#16a34a", 232.0),
                ("SIG", "#2563eb", 244.0),
            ]
        );
    }

    #[test]
    fn test_palette_wraps() {
        let mut entries = Vec::new();
        let mut nets = Vec::new();
        for i in 0..7 {
            let pin = format!("D{}", i + 2);
            let y = 66.0 + 20.0 * i as f64;
            entries.push(("U1".to_string(), pin.clone(), 14.0, y));
            entries.push(("X1".to_string(), pin.clone(), 374.0, y));
            nets.push(
                Net::new(format!("SIG{i}"))
                    .with_connection("U1", pin.clone())
                    .with_connection("X1", pin),
            );
        }
        let pos: PinPositions = entries
            .into_iter()
            .map(|(r, p, x, y)| (PinRef::new(r, p), Point::new(x, y)))
            .collect();

        let theme = SchematicTheme::default();
        let routed = route_nets(&nets, &pos, &theme);
        assert_eq!(routed.len(), 7);
        assert_eq!(routed[6].color, routed[0].color);
        assert_eq!(routed[5].color, "#4f46e5");
    }
}
