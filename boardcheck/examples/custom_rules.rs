//! Example: running a hand-picked set of checks with relaxed rules,
//! without going through BoardCheckCore.
//! Run with: cargo run --example custom_rules [path/to/design.json]

use boardcheck::drc::DrcInput;
use boardcheck::{load_design, DrcEngine, DrcRules, Severity};
use std::path::Path;

fn main() -> Result<(), boardcheck::BoardCheckError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/tool_call.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example custom_rules [path/to/design.json]");
        std::process::exit(1);
    }

    let (snapshot, _board) = load_design(path)?;
    let rules = DrcRules {
        min_clearance: 0.1,
        max_current_per_trace: 2.0,
        ..DrcRules::default()
    };
    rules.validate()?;

    let engine = DrcEngine::with_selected_checks(["clearance", "power_consumption"].as_slice())?;
    let findings = engine.run(&DrcInput {
        components: &snapshot.components,
        connections: &snapshot.connections,
        power_specs: snapshot.power_specs.as_ref(),
        rules: &rules,
    });

    println!("Custom validation found {} findings for {}", findings.len(), path.display());
    for finding in &findings {
        println!("  [{:?}] {}", finding.severity, finding.message);
    }

    let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();
    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}
