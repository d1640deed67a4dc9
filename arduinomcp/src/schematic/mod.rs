//! Schematic preview engine.
//!
//! Turns the parts and nets of a circuit schema into a 2D vector scene.
//!
//! # Pipeline
//!
//! ```text
//! parts + nets
//!   → classify   (part archetype from ref + name)
//!   → pins       (used pins, left/right split, slot order)
//!   → layout     (MCU column on the left, part stack on the right,
//!                 PinRef → Point map)
//!   → routing    (bus x per net, Manhattan paths, colors, junctions)
//!   → scene      (bodies, pins, then wires on top)
//!   → svg        (optional serialization)
//! ```
//!
//! Every pass is a pure function of its inputs. Nothing is cached between
//! renders, so identical input always yields an identical scene.

pub mod classify;
pub mod pins;
pub mod layout;
pub mod routing;
pub mod scene;
pub mod svg;

use serde::{Deserialize, Serialize};

pub use classify::{classify, Archetype};
pub use layout::{layout, PartPlacement, PinPositions, PlacedPin, SchematicLayout};
pub use routing::{route_nets, NetKind, RoutedNet};
pub use scene::{render_scene, Scene, SceneGroup, Shape};
pub use svg::to_svg;

/// Fixed canvas width in layout units.
pub const CANVAS_WIDTH: f64 = 560.0;
/// Canvas never shrinks below this height.
pub const MIN_CANVAS_HEIGHT: f64 = 180.0;

pub const MCU_X: f64 = 30.0;
pub const MCU_W: f64 = 130.0;
pub const MCU_PIN_GAP: f64 = 20.0;
pub const MCU_PAD: f64 = 16.0;
pub const PIN_STUB: f64 = 16.0;

pub const COMP_X: f64 = 390.0;
pub const COMP_W: f64 = 130.0;
pub const COMP_GAP: f64 = 72.0;
pub const COMP_START_Y: f64 = 40.0;
pub const COMP_PIN_GAP: f64 = 20.0;
pub const COMP_PAD: f64 = 16.0;
/// Offset of the first pin below a stacked part's top edge.
pub const COMP_PIN_OFFSET: f64 = 12.0;

/// Left edge of the routing corridor.
pub const BUS_X: f64 = 220.0;
/// Horizontal spacing between consecutive net trunks.
pub const BUS_STEP: f64 = 12.0;
/// Gap kept between the last trunk and the stacked parts' pin tips.
pub const BUS_CLEARANCE: f64 = 20.0;

/// Point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}
