//! Simple validation example: validate a design document and print results.

use boardcheck::prelude::*;
use std::path::Path;

fn main() -> Result<(), BoardCheckError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/missing_ground.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example simple_validation [path/to/design.json]");
        std::process::exit(1);
    }

    let report = BoardCheckCore::validate_file(path, &ValidationOptions::default())?;

    println!(
        "Validation results for: {}",
        report.design.as_deref().unwrap_or("design")
    );
    for error in &report.structure.errors {
        println!("  structure: {}", error);
    }
    println!("Total findings: {}", report.total_findings());
    println!();

    for finding in &report.findings {
        println!("  [{}] {}", finding.severity.as_str(), finding.message);
        if let Some(ref components) = finding.components {
            println!("    Components: {}", components.join(", "));
        }
    }

    if report.has_errors() {
        println!("\nValidation failed (errors found).");
        std::process::exit(1);
    }

    println!("\nValidation passed (no errors).");
    Ok(())
}
