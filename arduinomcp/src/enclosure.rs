//! OpenSCAD enclosure generation.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::circuit::{resolve_circuit_schema, FallbackSpec};

/// Arduino Uno footprint used when no board size is given.
pub const UNO_LENGTH_MM: f64 = 68.6;
pub const UNO_WIDTH_MM: f64 = 53.4;

const WALL_MM: f64 = 2.0;
const VENT_SLOTS: u32 = 8;
const VENT_PITCH_MM: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStyle {
    #[default]
    Minimal,
    Vented,
    Rugged,
}

impl CaseStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStyle::Minimal => "minimal",
            CaseStyle::Vented => "vented",
            CaseStyle::Rugged => "rugged",
        }
    }

    /// Clearance added on every side of the board.
    pub fn margin_mm(&self) -> f64 {
        match self {
            CaseStyle::Rugged => 6.0,
            _ => 4.0,
        }
    }

    pub fn vent_slots(&self) -> u32 {
        match self {
            CaseStyle::Vented => VENT_SLOTS,
            _ => 0,
        }
    }
}

fn default_board_height() -> f64 {
    20.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardSize {
    pub length_mm: f64,
    pub width_mm: f64,
    /// Tallest component above the board
    #[serde(default = "default_board_height")]
    pub height_mm: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseRequest {
    #[serde(default)]
    pub circuit_schema: Option<Value>,
    #[serde(default)]
    pub board_size: Option<BoardSize>,
    #[serde(default)]
    pub style: CaseStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedCounts {
    pub part_count: usize,
    pub net_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseDesign {
    pub openscad_code: String,
    pub stl_file: String,
    pub derived_from_schema: DerivedCounts,
}

/// Height guess from part count: 12 mm plus 1.5 mm per part, at least 20 mm.
pub fn estimated_height_mm(part_count: usize) -> f64 {
    (12.0 + part_count as f64 * 1.5).max(20.0)
}

fn openscad_source(style: CaseStyle, part_count: usize, length: f64, width: f64, height: f64) -> String {
    let mut scad = String::new();
    let _ = writeln!(scad, "// Auto-generated case ({})", style.as_str());
    let _ = writeln!(scad, "// Parts: {part_count}");
    let _ = writeln!(scad, "module enclosure() {{");
    let _ = writeln!(scad, "  difference() {{");
    let _ = writeln!(scad, "    cube([{length}, {width}, {height}], center=false);");
    let _ = writeln!(
        scad,
        "    translate([{WALL_MM},{WALL_MM},{WALL_MM}]) cube([{}, {}, {}], center=false);",
        length - 2.0 * WALL_MM,
        width - 2.0 * WALL_MM,
        height - WALL_MM
    );
    if style.vent_slots() > 0 {
        let _ = writeln!(scad, "    // Vents");
        let _ = writeln!(scad, "    for (i = [0:{}]) {{", style.vent_slots() - 1);
        let _ = writeln!(
            scad,
            "      translate([{VENT_PITCH_MM} + i * {VENT_PITCH_MM}, {}, {}]) rotate([90,0,0]) cylinder(h={WALL_MM}, r=1.5);",
            width - WALL_MM,
            height / 2.0
        );
        let _ = writeln!(scad, "    }}");
    }
    let _ = writeln!(scad, "  }}");
    let _ = writeln!(scad, "}}");
    let _ = writeln!(scad, "enclosure();");
    scad
}

pub fn generate_case(request: &CaseRequest) -> CaseDesign {
    let schema = resolve_circuit_schema(request.circuit_schema.as_ref(), None, &FallbackSpec::default());
    let part_count = schema.parts.len();
    let board = request.board_size.unwrap_or(BoardSize {
        length_mm: UNO_LENGTH_MM,
        width_mm: UNO_WIDTH_MM,
        height_mm: estimated_height_mm(part_count),
    });

    let margin = request.style.margin_mm();
    let length = board.length_mm + margin * 2.0;
    let width = board.width_mm + margin * 2.0;
    let height = board.height_mm + margin * 2.0;

    tracing::debug!(style = request.style.as_str(), length, width, height, "enclosure sized");

    CaseDesign {
        openscad_code: openscad_source(request.style, part_count, length, width, height),
        stl_file: format!(
            "generated/case-{}-{}x{}x{}.stl",
            request.style.as_str(),
            length,
            width,
            height
        ),
        derived_from_schema: DerivedCounts {
            part_count,
            net_count: schema.nets.len(),
        },
    }
}
