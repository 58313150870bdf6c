//! DRC rule set
//!
//! Numeric thresholds the engine compares against. A rule set can be built
//! in code or loaded from a JSON file; fields left out of the file keep their
//! defaults, so a file only needs to name the thresholds it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::BoardCheckError;

/// Thresholds for one validation run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DrcRules {
    /// mm
    pub min_trace_width: f64,
    /// mm
    pub min_clearance: f64,
    /// mm
    pub min_via_diameter: f64,
    /// A
    pub max_current_per_trace: f64,
    /// °C
    pub max_board_temp: f64,
}

/// 6 mil trace and space, 0.3 mm vias, 1 A per trace, 85 °C board.
pub const DEFAULT_DRC_RULES: DrcRules = DrcRules {
    min_trace_width: 0.15,
    min_clearance: 0.15,
    min_via_diameter: 0.3,
    max_current_per_trace: 1.0,
    max_board_temp: 85.0,
};

impl Default for DrcRules {
    fn default() -> Self {
        DEFAULT_DRC_RULES
    }
}

impl DrcRules {
    /// Load rules from a JSON file.
    pub fn load_file(path: &Path) -> Result<Self, BoardCheckError> {
        let content = std::fs::read_to_string(path)?;
        let rules = Self::load_str(&content)?;
        tracing::info!("Loaded DRC rules from {}", path.display());
        Ok(rules)
    }

    /// Load rules from a JSON string.
    pub fn load_str(json: &str) -> Result<Self, BoardCheckError> {
        let rules: DrcRules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Every threshold must be a finite, positive number.
    pub fn validate(&self) -> Result<(), BoardCheckError> {
        let fields = [
            ("min_trace_width", self.min_trace_width),
            ("min_clearance", self.min_clearance),
            ("min_via_diameter", self.min_via_diameter),
            ("max_current_per_trace", self.max_current_per_trace),
            ("max_board_temp", self.max_board_temp),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(BoardCheckError::InvalidRules(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Per-trace current limit in mA.
    pub fn max_current_per_trace_ma(&self) -> f64 {
        self.max_current_per_trace * 1000.0
    }
}
