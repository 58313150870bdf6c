//! Core validation logic shared by the CLI and library callers.
//!
//! Runs the structural validator first and, unless the snapshot fails it
//! while the structural gate is enforced, the DRC engine second.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::design::DesignSnapshot;
use crate::drc::{DrcEngine, DrcFinding, DrcInput, Severity};
use crate::extract::{parse_design_document, Board};
use crate::rules::DrcRules;
use crate::structure::{validate_structure, StructureReport};

#[derive(Debug, thiserror::Error)]
pub enum BoardCheckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Extraction error: {0}")]
    Extract(String),
    #[error("Invalid rules: {0}")]
    InvalidRules(String),
    #[error("Unknown DRC check: {0}")]
    UnknownCheck(String),
}

/// Options for a validation run.
#[derive(Clone, Debug)]
pub struct ValidationOptions {
    /// Skip DRC when the snapshot is structurally invalid.
    pub enforce_structure: bool,
    pub rules: DrcRules,
    /// Check ids to run; empty runs all of them.
    pub checks: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            enforce_structure: true,
            rules: DrcRules::default(),
            checks: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FindingStats {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl FindingStats {
    pub fn from_findings(findings: &[DrcFinding]) -> Self {
        let mut stats = Self::default();
        for f in findings {
            match f.severity {
                Severity::Error => stats.error += 1,
                Severity::Warning => stats.warning += 1,
                Severity::Info => stats.info += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.error + self.warning + self.info
    }
}

/// Result of validating one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub design: Option<String>,
    pub structure: StructureReport,
    /// False when DRC was skipped (empty or gated design).
    pub drc_ran: bool,
    pub findings: Vec<DrcFinding>,
    pub stats: FindingStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
    pub generated_at: DateTime<Utc>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.stats.error > 0 || !self.structure.is_valid
    }

    pub fn has_warnings_or_errors(&self) -> bool {
        self.has_errors() || self.stats.warning > 0
    }

    pub fn total_findings(&self) -> usize {
        self.stats.total()
    }

    /// True if any finding is at `threshold` or more severe, or the
    /// structure check failed.
    pub fn fails_at(&self, threshold: Severity) -> bool {
        !self.structure.is_valid || self.findings.iter().any(|f| f.severity <= threshold)
    }
}

/// Core validation API.
pub struct BoardCheckCore;

impl BoardCheckCore {
    /// Validate an in-memory snapshot.
    pub fn validate(
        snapshot: &DesignSnapshot,
        options: &ValidationOptions,
    ) -> Result<ValidationReport, BoardCheckError> {
        options.rules.validate()?;
        let engine = DrcEngine::with_selected_checks(options.checks.as_slice())?;

        let structure = validate_structure(&snapshot.components, &snapshot.connections);
        let gated = options.enforce_structure && !structure.is_valid;
        if gated {
            tracing::warn!(
                "Skipping DRC: design failed structural validation with {} errors",
                structure.errors.len()
            );
        }

        let drc_ran = !gated && !snapshot.components.is_empty();
        let findings = if drc_ran {
            engine.run(&DrcInput {
                components: &snapshot.components,
                connections: &snapshot.connections,
                power_specs: snapshot.power_specs.as_ref(),
                rules: &options.rules,
            })
        } else {
            Vec::new()
        };

        let stats = FindingStats::from_findings(&findings);
        tracing::info!(
            "Validated {}: {} errors, {} warnings, {} info",
            snapshot.name.as_deref().unwrap_or("design"),
            stats.error,
            stats.warning,
            stats.info
        );

        Ok(ValidationReport {
            design: snapshot.name.clone(),
            structure,
            drc_ran,
            findings,
            stats,
            board: None,
            generated_at: Utc::now(),
        })
    }

    /// Load a design document from disk and validate it.
    pub fn validate_file(
        path: &Path,
        options: &ValidationOptions,
    ) -> Result<ValidationReport, BoardCheckError> {
        let (mut snapshot, board) = load_design(path)?;
        if snapshot.name.is_none() {
            snapshot.name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string);
        }
        let mut report = Self::validate(&snapshot, options)?;
        report.board = board;
        Ok(report)
    }
}

/// Read a design document (snapshot, tool-call arguments or tool call).
pub fn load_design(path: &Path) -> Result<(DesignSnapshot, Option<Board>), BoardCheckError> {
    let content = std::fs::read_to_string(path)?;
    tracing::debug!("Loaded design document {}", path.display());
    parse_design_document(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{Component, Connection};

    fn dangling_design() -> DesignSnapshot {
        DesignSnapshot::new(
            vec![Component::new("U1", "ESP32").at(0.0, 0.0)],
            vec![Connection::new("U1", "U5", "GND")],
        )
    }

    #[test]
    fn test_structural_gate_skips_drc() {
        let report = BoardCheckCore::validate(&dangling_design(), &ValidationOptions::default()).unwrap();
        assert!(!report.structure.is_valid);
        assert!(!report.drc_ran);
        assert!(report.findings.is_empty());
        assert!(report.has_errors());
    }

    #[test]
    fn test_lenient_mode_runs_drc_anyway() {
        let options = ValidationOptions {
            enforce_structure: false,
            ..ValidationOptions::default()
        };
        let report = BoardCheckCore::validate(&dangling_design(), &options).unwrap();
        assert!(report.drc_ran);
        // U1 touches a GND connection, so nothing power related fires
        assert_eq!(report.stats.total(), 0, "{:?}", report.findings);
    }

    #[test]
    fn test_stats_and_threshold() {
        let snapshot = DesignSnapshot::new(vec![Component::new("U1", "ESP32").at(0.0, 0.0)], vec![]);
        let report = BoardCheckCore::validate(&snapshot, &ValidationOptions::default()).unwrap();
        assert_eq!(report.stats, FindingStats { error: 2, warning: 0, info: 0 });
        assert!(report.fails_at(Severity::Error));
        assert!(report.fails_at(Severity::Info));
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        let options = ValidationOptions {
            rules: DrcRules {
                min_clearance: -1.0,
                ..DrcRules::default()
            },
            ..ValidationOptions::default()
        };
        let err = BoardCheckCore::validate(&dangling_design(), &options).unwrap_err();
        assert!(matches!(err, BoardCheckError::InvalidRules(_)));
    }

    #[test]
    fn test_validate_file_names_design_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensor.json");
        std::fs::write(
            &path,
            r#"{"components": [{"reference": "U1", "name": "ESP32", "x": 0, "y": 0}],
                "connections": [{"from": "U1", "to": "U1", "signal": "GND"}]}"#,
        )
        .unwrap();
        let report = BoardCheckCore::validate_file(&path, &ValidationOptions::default()).unwrap();
        assert_eq!(report.design.as_deref(), Some("sensor"));
        assert!(report.structure.is_valid);
        assert_eq!(report.stats.total(), 0, "{:?}", report.findings);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = BoardCheckCore::validate_file(
            Path::new("does/not/exist.json"),
            &ValidationOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BoardCheckError::Io(_)));
    }
}
