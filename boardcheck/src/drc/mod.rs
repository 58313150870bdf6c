//! Design Rule Check engine
//!
//! Heuristic electrical and placement checks over a design snapshot. The
//! engine runs its checks in a fixed order and concatenates their findings;
//! that order is what reports and golden tests rely on:
//!
//! 1. clearance between component centres
//! 2. power and ground connectivity
//! 3. signal integrity and net fan-out
//! 4. power consumption against trace capacity
//! 5. thermal concentration around ICs and regulators
//!
//! Findings are not sorted by severity; grouping is left to whoever renders
//! them.

pub mod checks;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::BoardCheckError;
use crate::design::{Component, Connection, DesignSnapshot, Point, PowerSpecs};
use crate::rules::DrcRules;

pub use checks::{
    ClearanceCheck, PowerConnectionCheck, PowerConsumptionCheck, SignalIntegrityCheck,
    ThermalCheck,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Clearance,
    Routing,
    Power,
    Thermal,
    SignalIntegrity,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Clearance => "clearance",
            FindingKind::Routing => "routing",
            FindingKind::Power => "power",
            FindingKind::Thermal => "thermal",
            FindingKind::SignalIntegrity => "signal_integrity",
        }
    }
}

/// `Error` blocks fabrication sign-off, `Warning` is a recommendation,
/// `Info` is advisory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// A single DRC finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrcFinding {
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Point>,
}

impl DrcFinding {
    pub fn new(kind: FindingKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            components: None,
            location: None,
        }
    }

    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = Some(components.into_iter().map(Into::into).collect());
        self
    }

    pub fn at(mut self, location: Option<Point>) -> Self {
        self.location = location;
        self
    }

    pub fn involves(&self, reference: &str) -> bool {
        self.components
            .as_ref()
            .is_some_and(|c| c.iter().any(|r| r == reference))
    }
}

/// Everything a check may look at during one run.
#[derive(Debug, Clone, Copy)]
pub struct DrcInput<'a> {
    pub components: &'a [Component],
    pub connections: &'a [Connection],
    pub power_specs: Option<&'a PowerSpecs>,
    pub rules: &'a DrcRules,
}

pub trait DrcCheck: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn check(&self, input: &DrcInput<'_>) -> Vec<DrcFinding>;
}

/// Ids of the built-in checks, in run order.
pub const DEFAULT_CHECK_IDS: &[&str] = &[
    "clearance",
    "power_connection",
    "signal_integrity",
    "power_consumption",
    "thermal",
];

pub struct DrcEngine {
    checks: Vec<Arc<dyn DrcCheck>>,
}

impl DrcEngine {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    pub fn with_default_checks() -> Self {
        let mut engine = Self::new();
        engine.add_check(Arc::new(ClearanceCheck));
        engine.add_check(Arc::new(PowerConnectionCheck));
        engine.add_check(Arc::new(SignalIntegrityCheck));
        engine.add_check(Arc::new(PowerConsumptionCheck));
        engine.add_check(Arc::new(ThermalCheck));
        engine
    }

    /// Builds an engine with only the named built-in checks. Run order stays
    /// the default order regardless of the order of `ids`; an empty list
    /// selects every check.
    pub fn with_selected_checks<S: AsRef<str>>(ids: &[S]) -> Result<Self, BoardCheckError> {
        let defaults = Self::with_default_checks();
        if ids.is_empty() {
            return Ok(defaults);
        }
        for id in ids {
            if !DEFAULT_CHECK_IDS.contains(&id.as_ref()) {
                return Err(BoardCheckError::UnknownCheck(id.as_ref().to_string()));
            }
        }
        let checks = defaults
            .checks
            .into_iter()
            .filter(|c| ids.iter().any(|id| id.as_ref() == c.id()))
            .collect();
        Ok(Self { checks })
    }

    pub fn add_check(&mut self, check: Arc<dyn DrcCheck>) {
        self.checks.push(check);
    }

    pub fn checks(&self) -> impl Iterator<Item = &dyn DrcCheck> {
        self.checks.iter().map(|c| c.as_ref())
    }

    pub fn run(&self, input: &DrcInput<'_>) -> Vec<DrcFinding> {
        let mut findings = Vec::new();
        for check in &self.checks {
            let produced = check.check(input);
            tracing::debug!("DRC check {} produced {} findings", check.id(), produced.len());
            findings.extend(produced);
        }
        findings
    }
}

impl Default for DrcEngine {
    fn default() -> Self {
        Self::with_default_checks()
    }
}

/// Runs every built-in check over the design. Pure and deterministic: the
/// same input always yields the same findings in the same order.
pub fn validate_design(
    components: &[Component],
    connections: &[Connection],
    power_specs: Option<&PowerSpecs>,
    rules: &DrcRules,
) -> Vec<DrcFinding> {
    let input = DrcInput {
        components,
        connections,
        power_specs,
        rules,
    };
    DrcEngine::with_default_checks().run(&input)
}

/// [`validate_design`] over a whole snapshot.
pub fn validate_snapshot(snapshot: &DesignSnapshot, rules: &DrcRules) -> Vec<DrcFinding> {
    validate_design(
        &snapshot.components,
        &snapshot.connections,
        snapshot.power_specs.as_ref(),
        rules,
    )
}
