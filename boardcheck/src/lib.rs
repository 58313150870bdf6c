//! BoardCheck - design rule checking for generated PCB designs
//!
//! This library validates the declarative board descriptions produced by a
//! design assistant: a list of components with schematic positions, the
//! connections between them, and optional power figures. It is a heuristic
//! linter, not a geometric DRC: clearances are approximated from component
//! centres and electrical checks work from net naming conventions.
//!
//! # Quick Start
//!
//! ```no_run
//! use boardcheck::{BoardCheckCore, ValidationOptions};
//! use std::path::Path;
//!
//! let options = ValidationOptions::default();
//! let report = BoardCheckCore::validate_file(Path::new("design.json"), &options).unwrap();
//!
//! for finding in &report.findings {
//!     println!("{:?}: {}", finding.severity, finding.message);
//! }
//! ```
//!
//! # Features
//!
//! - **Structural validation**: unique references, resolvable connections
//! - **DRC**: clearance, power/ground connectivity, bus signal integrity,
//!   current capacity, thermal crowding
//! - **Tool-call extraction**: streamed `generate_pcb_project` arguments
//! - **Catalog**: reference parts and battery life estimates
//! - **Export**: block schematic SVG

pub mod catalog;
pub mod core;
pub mod design;
pub mod drc;
pub mod export;
pub mod extract;
pub mod heuristics;
pub mod rules;
pub mod structure;

// Re-export main types
pub use crate::core::{
    load_design, BoardCheckCore, BoardCheckError, FindingStats, ValidationOptions,
    ValidationReport,
};
pub use design::{Component, Connection, DesignSnapshot, Point, PowerSpecs};
pub use drc::{validate_design, validate_snapshot, DrcEngine, DrcFinding, FindingKind, Severity};
pub use rules::{DrcRules, DEFAULT_DRC_RULES};
pub use structure::{
    generate_default_coordinates, test_pcb_generation, validate_structure, SmokeTestReport,
    StructureReport,
};

/// Parse a design document (convenience wrapper).
pub fn parse_design(json: &str) -> Result<DesignSnapshot, BoardCheckError> {
    extract::parse_design_document(json).map(|(snapshot, _)| snapshot)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BoardCheckCore, BoardCheckError, Component, Connection, DesignSnapshot, DrcFinding,
        DrcRules, FindingKind, PowerSpecs, Severity, ValidationOptions, ValidationReport,
    };
}
