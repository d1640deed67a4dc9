//! Render a schematic preview to an SVG file.
//!
//! Without arguments the built-in Arduino + LED circuit is rendered.

use arduinomcp::circuit::{resolve_circuit_schema, FallbackSpec};
use arduinomcp::{render_scene, to_svg, ArduinoMcpCore, ArduinoMcpError, Settings};

fn main() -> Result<(), ArduinoMcpError> {
    let mut args = std::env::args().skip(1);
    let input = args.next();
    let output = args.next().unwrap_or_else(|| "preview.svg".to_string());

    let schema = match input {
        Some(path) => ArduinoMcpCore::load_schema(std::path::Path::new(&path))?,
        None => resolve_circuit_schema(None, None, &FallbackSpec::default()),
    };

    let settings = Settings::default();
    let scene = render_scene(
        &schema.parts,
        &schema.nets,
        Some(&schema.power.summary()),
        &settings.schematic,
    );
    std::fs::write(&output, to_svg(&scene))?;

    println!(
        "Wrote {} ({} x {}, {} groups)",
        output,
        scene.width,
        scene.height,
        scene.groups.len()
    );
    Ok(())
}
