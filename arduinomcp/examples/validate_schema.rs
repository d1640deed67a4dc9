//! Validate a circuit schema file and print the warnings.

use arduinomcp::prelude::*;
use std::path::Path;

fn main() -> Result<(), ArduinoMcpError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/faulty_circuit.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example validate_schema [path/to/circuit.json]");
        std::process::exit(1);
    }

    let validation = ArduinoMcpCore::validate_file(path)?;
    let report = &validation.report;

    println!("Validation results for: {}", validation.file.display());
    println!("Total warnings: {}", report.warnings.len());
    println!();

    for warning in &report.warnings {
        println!("[{}] {}: {}", warning.severity, warning.code, warning.message);
        println!("    Fix: {}", warning.fix);
    }

    if !report.pass {
        println!("\nValidation failed (high severity warnings).");
        std::process::exit(1);
    }

    println!("\nValidation passed.");
    Ok(())
}
