//! Integration tests for the BoardCheck library

use boardcheck::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_validate_valid_design() {
    let result = BoardCheckCore::validate_file(
        &fixture_path("valid_design.json"),
        &ValidationOptions::default(),
    );

    assert!(result.is_ok(), "Valid design should load successfully");

    let report = result.unwrap();
    assert!(report.structure.is_valid, "errors: {:?}", report.structure.errors);
    assert!(
        report.structure.warnings.is_empty(),
        "warnings: {:?}",
        report.structure.warnings
    );
    assert!(report.drc_ran);
    assert_eq!(
        report.total_findings(),
        0,
        "Valid design should have no findings: {:?}",
        report
            .findings
            .iter()
            .map(|f| &f.message)
            .collect::<Vec<_>>()
    );
    assert_eq!(report.design.as_deref(), Some("valid_design"));
}

#[test]
fn test_validate_missing_ground() {
    let report = BoardCheckCore::validate_file(
        &fixture_path("missing_ground.json"),
        &ValidationOptions::default(),
    )
    .expect("Should load successfully");

    let kinds: Vec<(FindingKind, Severity)> =
        report.findings.iter().map(|f| (f.kind, f.severity)).collect();
    assert_eq!(
        kinds,
        vec![
            (FindingKind::Clearance, Severity::Error),
            (FindingKind::Power, Severity::Error),
            (FindingKind::SignalIntegrity, Severity::Warning),
            (FindingKind::Power, Severity::Warning),
            (FindingKind::Thermal, Severity::Info),
        ]
    );
    assert_eq!(report.stats.error, 2);
    assert_eq!(report.stats.warning, 2);
    assert_eq!(report.stats.info, 1);
    assert!(report.has_errors());
}

#[test]
fn test_structural_gate_on_dangling_connection() {
    let report = BoardCheckCore::validate_file(
        &fixture_path("dangling_connection.json"),
        &ValidationOptions::default(),
    )
    .expect("Should load successfully");

    assert!(!report.structure.is_valid);
    assert!(report
        .structure
        .errors
        .iter()
        .any(|e| e.contains("Duplicate reference: U1")));
    assert!(report.structure.errors.iter().any(|e| e.contains("U9")));
    assert!(!report.drc_ran);
    assert!(report.findings.is_empty());
}

#[test]
fn test_lenient_mode_on_dangling_connection() {
    let options = ValidationOptions {
        enforce_structure: false,
        ..ValidationOptions::default()
    };
    let report =
        BoardCheckCore::validate_file(&fixture_path("dangling_connection.json"), &options)
            .expect("Should load successfully");

    assert!(!report.structure.is_valid);
    assert!(report.drc_ran);
    // the duplicated U1 pair sits 10 units apart
    assert_eq!(report.findings[0].kind, FindingKind::Clearance);
}

#[test]
fn test_validate_tool_call_document() {
    let report = BoardCheckCore::validate_file(
        &fixture_path("tool_call.json"),
        &ValidationOptions::default(),
    )
    .expect("Should extract tool call");

    assert_eq!(report.design.as_deref(), Some("Meshtastic Node"));
    assert!(report.structure.is_valid);
    assert!(report.structure.warnings.is_empty(), "{:?}", report.structure.warnings);
    let board = report.board.expect("tool calls carry board specs");
    assert_eq!(board.width_mm, 60.0);
    assert_eq!(board.height_mm, 40.0);

    let kinds: Vec<FindingKind> = report.findings.iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FindingKind::SignalIntegrity,
            FindingKind::Power,
            FindingKind::Thermal
        ]
    );
    assert_eq!(
        report.findings[0].components,
        Some(vec!["U1".to_string(), "U2".to_string()])
    );
}

#[test]
fn test_selected_checks_only() {
    let options = ValidationOptions {
        checks: vec!["power_consumption".to_string()],
        ..ValidationOptions::default()
    };
    let report = BoardCheckCore::validate_file(&fixture_path("missing_ground.json"), &options)
        .expect("Should load successfully");
    assert_eq!(report.findings.len(), 2);
    assert!(report
        .findings
        .iter()
        .all(|f| matches!(f.kind, FindingKind::Power | FindingKind::Thermal)));
}

#[test]
fn test_rules_file_changes_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let rules_path = dir.path().join("rules.json");
    std::fs::write(&rules_path, r#"{"min_clearance": 0.01, "max_current_per_trace": 2.0}"#).unwrap();

    let options = ValidationOptions {
        rules: DrcRules::load_file(&rules_path).unwrap(),
        ..ValidationOptions::default()
    };
    let report = BoardCheckCore::validate_file(&fixture_path("missing_ground.json"), &options)
        .expect("Should load successfully");

    // 10 units apart is fine at 2 units threshold, and 1500mA fits in 2A
    assert!(report.findings.iter().all(|f| f.kind != FindingKind::Clearance));
    assert!(report
        .findings
        .iter()
        .all(|f| !(f.kind == FindingKind::Power && f.severity == Severity::Warning)));
}

#[test]
fn test_report_serializes_to_json() {
    let report = BoardCheckCore::validate_file(
        &fixture_path("missing_ground.json"),
        &ValidationOptions::default(),
    )
    .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["findings"][0]["type"], "clearance");
    assert_eq!(json["stats"]["error"], 2);
    assert!(json["generated_at"].is_string());
}
