//! Scene composition.
//!
//! A [`Scene`] is a flat list of shape groups in back-to-front order:
//! power badge, microcontroller, stacked parts, then nets. Shapes carry
//! style classes rather than colors except where the color is data (net
//! wires, junctions and labels).

use serde::Serialize;
use std::collections::HashMap;

use super::classify::Archetype;
use super::layout::{layout, PartPlacement, PlacedPin};
use super::routing::{route_nets, RoutedNet};
use super::*;
use crate::circuit::{Net, Part};
use crate::config::SchematicTheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rx: f64,
        class: String,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        class: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fill: Option<String>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        class: String,
    },
    Polyline {
        points: Vec<Point>,
        class: String,
    },
    Polygon {
        points: Vec<Point>,
        class: String,
    },
    Path {
        d: String,
        class: String,
    },
    /// Net wire, stroked in the net color with rounded caps and joins
    Wire {
        points: Vec<Point>,
        color: String,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        anchor: TextAnchor,
        class: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        fill: Option<String>,
    },
}

impl Shape {
    fn rect(body: &Rect, rx: f64, class: &str) -> Self {
        Shape::Rect {
            x: body.x,
            y: body.y,
            width: body.width,
            height: body.height,
            rx,
            class: class.to_string(),
        }
    }

    fn line(from: Point, to: Point, class: &str) -> Self {
        Shape::Line {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            class: class.to_string(),
        }
    }

    fn text(x: f64, y: f64, text: &str, anchor: TextAnchor, class: &str) -> Self {
        Shape::Text {
            x,
            y,
            text: text.to_string(),
            anchor,
            class: class.to_string(),
            fill: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneGroup {
    pub id: String,
    pub shapes: Vec<Shape>,
}

impl SceneGroup {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            shapes: Vec::new(),
        }
    }
}

/// Vector scene of a schematic, back to front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub groups: Vec<SceneGroup>,
}

impl Scene {
    pub fn group(&self, id: &str) -> Option<&SceneGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.groups.iter().flat_map(|g| g.shapes.iter())
    }
}

fn push_pins(group: &mut SceneGroup, body: &Rect, pins: &[PlacedPin], left: bool) {
    for pin in pins {
        let tip = pin.position;
        let edge = Point::new(if left { body.x } else { body.right() }, tip.y);
        let (label_x, anchor) = if left {
            (body.x + 5.0, TextAnchor::Start)
        } else {
            (body.right() - 5.0, TextAnchor::End)
        };

        group.shapes.push(Shape::line(tip, edge, "sch-pin-stub"));
        group.shapes.push(Shape::Circle {
            cx: tip.x,
            cy: tip.y,
            r: 2.5,
            class: Some("sch-pin-dot".to_string()),
            fill: None,
        });
        group.shapes.push(Shape::text(label_x, tip.y + 3.5, &pin.name, anchor, "sch-pin-label"));
    }
}

fn microcontroller_group(mcu: &PartPlacement) -> SceneGroup {
    let body = &mcu.body;
    let mut group = SceneGroup::new(format!("mcu-{}", mcu.ref_des));

    group.shapes.push(Shape::rect(body, 4.0, "sch-mcu-body"));
    group.shapes.push(Shape::Circle {
        cx: body.center_x(),
        cy: body.y,
        r: 6.0,
        class: Some("sch-mcu-notch".to_string()),
        fill: None,
    });
    group.shapes.push(Shape::text(
        body.center_x(),
        body.y + MCU_PAD - 2.0,
        &mcu.ref_des,
        TextAnchor::Middle,
        "sch-part-ref",
    ));
    group.shapes.push(Shape::text(
        body.center_x(),
        body.bottom() - 6.0,
        &mcu.name,
        TextAnchor::Middle,
        "sch-part-name",
    ));

    push_pins(&mut group, body, &mcu.left_pins, true);
    push_pins(&mut group, body, &mcu.right_pins, false);
    group
}

/// Body outline plus the archetype's symbol.
fn body_glyph(archetype: Archetype, body: &Rect) -> Vec<Shape> {
    let cy = body.center_y();
    let cx = body.center_x();

    match archetype {
        Archetype::Resistor => {
            let x0 = body.x + 10.0;
            let x1 = body.right() - 10.0;
            let segments = 6;
            let seg_w = (x1 - x0) / segments as f64;
            let amp = body.height * 0.25;

            let mut points = vec![Point::new(x0, cy)];
            for s in 0..segments {
                let dir = if s % 2 == 0 { -1.0 } else { 1.0 };
                points.push(Point::new(x0 + (s as f64 + 0.5) * seg_w, cy + dir * amp));
            }
            points.push(Point::new(x1, cy));

            vec![
                Shape::rect(body, 2.0, "sch-resistor-body"),
                Shape::Polyline {
                    points,
                    class: "sch-zigzag".to_string(),
                },
            ]
        }
        Archetype::Led => {
            let tri_w = (body.height - 8.0).min(22.0);
            let tx = cx - tri_w / 2.0;
            let top = cy - tri_w / 2.0;
            let tip_x = tx + tri_w;

            vec![
                Shape::rect(body, 3.0, "sch-led-body"),
                Shape::Polygon {
                    points: vec![
                        Point::new(tx, top),
                        Point::new(tx, cy + tri_w / 2.0),
                        Point::new(tip_x, cy),
                    ],
                    class: "sch-led-tri".to_string(),
                },
                Shape::line(Point::new(tip_x, top), Point::new(tip_x, cy + tri_w / 2.0), "sch-led-bar"),
                Shape::line(
                    Point::new(tip_x + 4.0, top + 2.0),
                    Point::new(tip_x + 10.0, top - 4.0),
                    "sch-led-arrow",
                ),
                Shape::line(
                    Point::new(tip_x + 8.0, top + 5.0),
                    Point::new(tip_x + 14.0, top - 1.0),
                    "sch-led-arrow",
                ),
            ]
        }
        Archetype::Servo => vec![
            Shape::rect(body, 3.0, "sch-servo-body"),
            Shape::Circle {
                cx,
                cy,
                r: (body.height * 0.3).min(12.0),
                class: Some("sch-motor-circle".to_string()),
                fill: None,
            },
            Shape::text(cx, cy + 4.0, "M", TextAnchor::Middle, "sch-motor-m"),
        ],
        Archetype::Sensor => {
            let x0 = body.x + 10.0;
            let d = format!(
                "M{},{} Q{},{} {},{} Q{},{} {},{}",
                x0,
                cy,
                x0 + 8.0,
                cy - 6.0,
                x0 + 16.0,
                cy,
                x0 + 24.0,
                cy + 6.0,
                x0 + 32.0,
                cy
            );
            vec![
                Shape::rect(body, 3.0, "sch-sensor-body"),
                Shape::Path {
                    d,
                    class: "sch-sensor-wave".to_string(),
                },
            ]
        }
        // a second microcontroller in the stack is drawn as a plain box
        Archetype::Capacitor | Archetype::Generic | Archetype::Microcontroller => {
            vec![Shape::rect(body, 3.0, "sch-generic-body")]
        }
    }
}

fn component_group(part: &PartPlacement) -> SceneGroup {
    let body = &part.body;
    let mut group = SceneGroup::new(format!("part-{}", part.ref_des));

    group.shapes.extend(body_glyph(part.archetype, body));
    group.shapes.push(Shape::text(
        body.center_x(),
        body.y - 5.0,
        &part.ref_des,
        TextAnchor::Middle,
        "sch-part-ref",
    ));
    group.shapes.push(Shape::text(
        body.center_x(),
        body.bottom() + 12.0,
        &part.name,
        TextAnchor::Middle,
        "sch-part-name",
    ));

    push_pins(&mut group, body, &part.left_pins, true);
    push_pins(&mut group, body, &part.right_pins, false);
    group
}

fn net_group(net: &RoutedNet) -> SceneGroup {
    let mut group = SceneGroup::new(format!("net-{}", net.name));

    for wire in &net.wires {
        group.shapes.push(Shape::Wire {
            points: wire.to_vec(),
            color: net.color.clone(),
        });
    }
    for junction in &net.junctions {
        group.shapes.push(Shape::Circle {
            cx: junction.x,
            cy: junction.y,
            r: 3.0,
            class: None,
            fill: Some(net.color.clone()),
        });
    }
    group.shapes.push(Shape::Text {
        x: net.label.x,
        y: net.label.y,
        text: net.name.clone(),
        anchor: TextAnchor::Start,
        class: "sch-net-label".to_string(),
        fill: Some(net.color.clone()),
    });
    group
}

/// Repeated ids (two nets or parts sharing a name) get a `-2`, `-3`, ...
/// suffix in draw order so every SVG `<g id>` stays unique.
fn dedupe_group_ids(groups: &mut [SceneGroup]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for group in groups.iter_mut() {
        let count = seen.entry(group.id.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            group.id = format!("{}-{}", group.id, count);
        }
    }
}

/// Lay out, route and compose a schematic scene.
///
/// `power_info` is drawn as a badge in the top-right corner when non-empty.
pub fn render_scene(
    parts: &[Part],
    nets: &[Net],
    power_info: Option<&str>,
    theme: &SchematicTheme,
) -> Scene {
    let placed = layout(parts, nets);
    let routed = route_nets(nets, &placed.pin_positions, theme);

    let mut groups = Vec::new();

    if let Some(info) = power_info.filter(|s| !s.is_empty()) {
        let mut badge = SceneGroup::new("power-badge");
        badge.shapes.push(Shape::text(
            placed.width - 8.0,
            14.0,
            info,
            TextAnchor::End,
            "sch-power-badge",
        ));
        groups.push(badge);
    }

    if let Some(mcu) = &placed.microcontroller {
        groups.push(microcontroller_group(mcu));
    }
    groups.extend(placed.components.iter().map(component_group));
    groups.extend(routed.iter().map(net_group));
    dedupe_group_ids(&mut groups);

    tracing::debug!(
        groups = groups.len(),
        nets_drawn = routed.len(),
        nets_total = nets.len(),
        "schematic scene rendered"
    );

    Scene {
        width: placed.width,
        height: placed.height,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn led_circuit() -> (Vec<Part>, Vec<Net>) {
        let parts = vec![
            Part::new("U1", "Arduino Uno R3"),
            Part::new("R1", "220 Ohm Resistor"),
            Part::new("D1", "LED"),
        ];
        let nets = vec![
            Net::new("LED_STATUS").with_connection("U1", "D13").with_connection("R1", "1"),
            Net::new("LED_ANODE").with_connection("R1", "2").with_connection("D1", "A"),
        ];
        (parts, nets)
    }

    fn group_ids(scene: &Scene) -> Vec<&str> {
        scene.groups.iter().map(|g| g.id.as_str()).collect()
    }

    #[test]
    fn test_draw_order() {
        let (parts, nets) = led_circuit();
        let scene = render_scene(&parts, &nets, Some("5V / 500mA"), &SchematicTheme::default());
        assert_eq!(
            group_ids(&scene),
            vec!["power-badge", "mcu-U1", "part-R1", "part-D1", "net-LED_STATUS", "net-LED_ANODE"]
        );
    }

    #[test]
    fn test_empty_power_info_has_no_badge() {
        let (parts, nets) = led_circuit();
        let scene = render_scene(&parts, &nets, Some(""), &SchematicTheme::default());
        assert!(scene.group("power-badge").is_none());
        let scene = render_scene(&parts, &nets, None, &SchematicTheme::default());
        assert!(scene.group("power-badge").is_none());
    }

    #[test]
    fn test_signal_nets_take_palette_in_order() {
        let (parts, nets) = led_circuit();
        let scene = render_scene(&parts, &nets, None, &SchematicTheme::default());

        let wire_color = |id: &str| {
            scene.group(id).and_then(|g| {
                g.shapes.iter().find_map(|s| match s {
                    Shape::Wire { color, .. } => Some(color.clone()),
                    _ => None,
                })
            })
        };
        assert_eq!(wire_color("net-LED_STATUS").as_deref(), Some("#2563eb"));
        assert_eq!(wire_color("net-LED_ANODE").as_deref(), Some("#d97706"));
    }

    #[test]
    fn test_resistor_zigzag() {
        let (parts, nets) = led_circuit();
        let scene = render_scene(&parts, &nets, None, &SchematicTheme::default());
        let group = scene.group("part-R1").unwrap();

        let points = group
            .shapes
            .iter()
            .find_map(|s| match s {
                Shape::Polyline { points, .. } => Some(points.clone()),
                _ => None,
            })
            .unwrap();
        // body 390,52 130x36: cy 70, amplitude 9, segment width 55/3
        assert_eq!(points.len(), 8);
        assert_eq!(points[0], Point::new(400.0, 70.0));
        assert_eq!(points[1].y, 61.0);
        assert_eq!(points[2].y, 79.0);
        assert_eq!(points[7], Point::new(510.0, 70.0));
    }

    #[test]
    fn test_led_glyph() {
        let (parts, nets) = led_circuit();
        let scene = render_scene(&parts, &nets, None, &SchematicTheme::default());
        let group = scene.group("part-D1").unwrap();

        let arrows = group
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Line { class, .. } if class == "sch-led-arrow"))
            .count();
        assert_eq!(arrows, 2);

        // D1 body 390,124 130x36: triangle width 22 centred at x 455
        let triangle = group.shapes.iter().find_map(|s| match s {
            Shape::Polygon { points, .. } => Some(points.clone()),
            _ => None,
        });
        assert_eq!(
            triangle,
            Some(vec![
                Point::new(444.0, 131.0),
                Point::new(444.0, 153.0),
                Point::new(466.0, 142.0),
            ])
        );
    }

    #[test]
    fn test_servo_and_sensor_glyphs() {
        let parts = vec![Part::new("M1", "SG90 Micro Servo"), Part::new("S1", "DHT11")];
        let scene = render_scene(&parts, &[], None, &SchematicTheme::default());

        let servo = scene.group("part-M1").unwrap();
        assert!(servo.shapes.iter().any(|s| matches!(s, Shape::Text { text, .. } if text == "M")));
        assert!(servo
            .shapes
            .iter()
            .any(|s| matches!(s, Shape::Circle { r, .. } if (*r - 10.8).abs() < 1e-9)));

        let sensor = scene.group("part-S1").unwrap();
        let d = sensor.shapes.iter().find_map(|s| match s {
            Shape::Path { d, .. } => Some(d.clone()),
            _ => None,
        });
        assert_eq!(d.as_deref(), Some("M400,142 Q408,136 416,142 Q424,148 432,142"));
    }

    #[test]
    fn test_pin_shapes_and_labels() {
        let (parts, nets) = led_circuit();
        let scene = render_scene(&parts, &nets, None, &SchematicTheme::default());
        let mcu = scene.group("mcu-U1").unwrap();

        assert!(mcu.shapes.contains(&Shape::Line {
            x1: 14.0,
            y1: 66.0,
            x2: 30.0,
            y2: 66.0,
            class: "sch-pin-stub".to_string(),
        }));
        assert!(mcu.shapes.iter().any(|s| matches!(
            s,
            Shape::Text { text, x, anchor: TextAnchor::Start, .. } if text == "D13" && *x == 35.0
        )));
    }

    #[test]
    fn test_duplicate_names_get_unique_group_ids() {
        let parts = vec![
            Part::new("U1", "Arduino Uno R3"),
            Part::new("R1", "220 Ohm Resistor"),
            Part::new("R1", "10k Resistor"),
        ];
        let nets = vec![
            Net::new("SIG").with_connection("U1", "D2").with_connection("R1", "1"),
            Net::new("SIG").with_connection("U1", "D3").with_connection("R1", "2"),
        ];
        let scene = render_scene(&parts, &nets, None, &SchematicTheme::default());

        let ids = group_ids(&scene);
        assert_eq!(ids, vec!["mcu-U1", "part-R1", "part-R1-2", "net-SIG", "net-SIG-2"]);
        let unique: std::collections::HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_deterministic() {
        let (parts, nets) = led_circuit();
        let theme = SchematicTheme::default();
        let a = render_scene(&parts, &nets, Some("9V / 1000mA"), &theme);
        let b = render_scene(&parts, &nets, Some("9V / 1000mA"), &theme);
        assert_eq!(a, b);
    }
}
