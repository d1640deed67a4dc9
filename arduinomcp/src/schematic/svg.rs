//! SVG serialization of a [`Scene`].

use std::fmt::Write;

use super::scene::{Scene, Shape};
use super::Point;

/// Default look for the style classes the scene uses.
const STYLESHEET: &str = "\
.sch-mcu-body{fill:#0f766e;stroke:#134e4a;stroke-width:1.5}\
.sch-mcu-notch{fill:#ffffff;stroke:#134e4a}\
.sch-resistor-body,.sch-led-body,.sch-servo-body,.sch-sensor-body,.sch-generic-body{fill:#f8fafc;stroke:#475569;stroke-width:1.2}\
.sch-zigzag,.sch-sensor-wave{fill:none;stroke:#334155;stroke-width:1.5}\
.sch-led-tri{fill:#fde68a;stroke:#b45309}\
.sch-led-bar,.sch-led-arrow{stroke:#b45309;stroke-width:1.5}\
.sch-motor-circle{fill:none;stroke:#334155;stroke-width:1.5}\
.sch-motor-m{font:bold 11px sans-serif;fill:#334155}\
.sch-pin-stub{stroke:#64748b;stroke-width:1.2}\
.sch-pin-dot{fill:#64748b}\
.sch-pin-label{font:9px monospace;fill:#475569}\
.sch-part-ref{font:bold 11px sans-serif;fill:#0f172a}\
.sch-part-name{font:10px sans-serif;fill:#475569}\
.sch-mcu-body~.sch-part-ref,.sch-mcu-body~.sch-part-name{fill:#ffffff}\
.sch-net-label{font:9px monospace}\
.sch-power-badge{font:bold 11px sans-serif;fill:#b91c1c}";

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn wire_path(points: &[Point]) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            d.push(' ');
        }
        let _ = write!(d, "{}{},{}", cmd, p.x, p.y);
    }
    d
}

fn write_shape(out: &mut String, shape: &Shape) -> std::fmt::Result {
    match shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            rx,
            class,
        } => writeln!(
            out,
            r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" rx="{rx}" class="{}"/>"#,
            escape_xml(class)
        ),
        Shape::Circle {
            cx,
            cy,
            r,
            class,
            fill,
        } => {
            write!(out, r#"<circle cx="{cx}" cy="{cy}" r="{r}""#)?;
            if let Some(class) = class {
                write!(out, r#" class="{}""#, escape_xml(class))?;
            }
            if let Some(fill) = fill {
                write!(out, r#" fill="{}""#, escape_xml(fill))?;
            }
            writeln!(out, "/>")
        }
        Shape::Line {
            x1,
            y1,
            x2,
            y2,
            class,
        } => writeln!(
            out,
            r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" class="{}"/>"#,
            escape_xml(class)
        ),
        Shape::Polyline { points, class } => writeln!(
            out,
            r#"<polyline points="{}" class="{}"/>"#,
            points_attr(points),
            escape_xml(class)
        ),
        Shape::Polygon { points, class } => writeln!(
            out,
            r#"<polygon points="{}" class="{}"/>"#,
            points_attr(points),
            escape_xml(class)
        ),
        Shape::Path { d, class } => writeln!(
            out,
            r#"<path d="{}" class="{}"/>"#,
            escape_xml(d),
            escape_xml(class)
        ),
        Shape::Wire { points, color } => writeln!(
            out,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="1.5" stroke-linecap="round" stroke-linejoin="round"/>"#,
            wire_path(points),
            escape_xml(color)
        ),
        Shape::Text {
            x,
            y,
            text,
            anchor,
            class,
            fill,
        } => {
            write!(out, r#"<text x="{x}" y="{y}""#)?;
            if *anchor != super::scene::TextAnchor::Start {
                write!(out, r#" text-anchor="{}""#, anchor.as_str())?;
            }
            if let Some(fill) = fill {
                write!(out, r#" fill="{}""#, escape_xml(fill))?;
            }
            writeln!(out, r#" class="{}">{}</text>"#, escape_xml(class), escape_xml(text))
        }
    }
}

fn write_scene(out: &mut String, scene: &Scene) -> std::fmt::Result {
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img" aria-label="Circuit schematic" class="sch-svg">"#,
        w = scene.width,
        h = scene.height
    )?;
    writeln!(out, "<style>{STYLESHEET}</style>")?;
    for group in &scene.groups {
        writeln!(out, r#"<g id="{}">"#, escape_xml(&group.id))?;
        for shape in &group.shapes {
            write_shape(out, shape)?;
        }
        writeln!(out, "</g>")?;
    }
    writeln!(out, "</svg>")
}

/// Serialize a scene to a standalone SVG document.
///
/// Output depends only on the scene: groups and shapes are written in
/// scene order and every text node or attribute is XML-escaped.
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    // fmt::Write into a String cannot fail
    let _ = write_scene(&mut out, scene);
    out
}
