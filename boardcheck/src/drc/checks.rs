//! Built-in DRC checks

use std::collections::HashMap;

use super::{DrcCheck, DrcFinding, DrcInput, FindingKind, Severity};
use crate::design::Component;
use crate::heuristics::{
    is_critical_signal, is_ground_signal, is_passive_reference, is_power_component,
    is_power_signal,
};

/// Schematic units per millimetre of clearance. Calibrated separately from
/// the render scale in [`crate::export::RENDER_SCALE`].
pub const CLEARANCE_SCALE: f64 = 200.0;

/// Nominal footprint edge in schematic units. Not part of the comparison,
/// which is centre distance against the scaled clearance alone.
pub const NOMINAL_FOOTPRINT_SIZE: f64 = 60.0;

/// Radius around a power component within which neighbours are counted.
pub const THERMAL_PROXIMITY_RADIUS: f64 = 100.0;

/// Neighbour count above which a power component is flagged.
pub const THERMAL_NEIGHBOR_LIMIT: usize = 3;

/// Active current (mA) above which thermal analysis is recommended.
pub const HIGH_CONSUMPTION_MA: f64 = 500.0;

/// Connections sharing one signal name above which renaming is suggested.
pub const NET_FANOUT_LIMIT: usize = 3;

/// Pairwise centre distance check. Quadratic in component count, which is
/// fine for designs of tens to low hundreds of parts.
pub struct ClearanceCheck;

impl DrcCheck for ClearanceCheck {
    fn id(&self) -> &str {
        "clearance"
    }

    fn name(&self) -> &str {
        "Component Clearance"
    }

    fn description(&self) -> &str {
        "Flags component pairs whose centres are closer than the scaled minimum clearance"
    }

    fn check(&self, input: &DrcInput<'_>) -> Vec<DrcFinding> {
        let mut findings = Vec::new();
        let threshold = input.rules.min_clearance * CLEARANCE_SCALE;
        let components = input.components;

        for (i, first) in components.iter().enumerate() {
            let Some(p1) = first.position() else { continue };
            for second in &components[i + 1..] {
                let Some(p2) = second.position() else { continue };
                let distance = p1.distance(&p2);
                if distance < threshold {
                    findings.push(
                        DrcFinding::new(
                            FindingKind::Clearance,
                            Severity::Error,
                            format!(
                                "Insufficient clearance between {} and {} ({:.1}px, minimum {:.1}px)",
                                first.reference, second.reference, distance, threshold
                            ),
                        )
                        .with_components([first.reference.as_str(), second.reference.as_str()])
                        .at(Some(p1.midpoint(&p2))),
                    );
                }
            }
        }

        findings
    }
}

/// Every active part needs a supply connection, and the design needs a
/// ground somewhere.
pub struct PowerConnectionCheck;

impl DrcCheck for PowerConnectionCheck {
    fn id(&self) -> &str {
        "power_connection"
    }

    fn name(&self) -> &str {
        "Power Connections"
    }

    fn description(&self) -> &str {
        "Requires a VCC/GND/3V3/5V connection on every non-passive component and a GND net in the design"
    }

    fn check(&self, input: &DrcInput<'_>) -> Vec<DrcFinding> {
        let mut findings = Vec::new();
        let power_connections: Vec<_> = input
            .connections
            .iter()
            .filter(|c| is_power_signal(&c.signal))
            .collect();

        for component in input.components {
            if is_passive_reference(&component.reference) {
                continue;
            }
            let powered = power_connections
                .iter()
                .any(|c| c.touches(&component.reference));
            if !powered {
                findings.push(
                    DrcFinding::new(
                        FindingKind::Power,
                        Severity::Error,
                        format!("Component {} has no power connection", component.reference),
                    )
                    .with_components([component.reference.as_str()])
                    .at(component.position()),
                );
            }
        }

        let has_ground = power_connections.iter().any(|c| is_ground_signal(&c.signal));
        if !has_ground && !input.components.is_empty() {
            findings.push(DrcFinding::new(
                FindingKind::Power,
                Severity::Error,
                "No GND connection found in the design",
            ));
        }

        findings
    }
}

/// Bus signals that need routing review, and overloaded net names.
pub struct SignalIntegrityCheck;

impl DrcCheck for SignalIntegrityCheck {
    fn id(&self) -> &str {
        "signal_integrity"
    }

    fn name(&self) -> &str {
        "Signal Integrity"
    }

    fn description(&self) -> &str {
        "Flags SPI/I2C/UART bus connections for impedance review and signal names shared by more than 3 connections"
    }

    fn check(&self, input: &DrcInput<'_>) -> Vec<DrcFinding> {
        let mut findings = Vec::new();

        for conn in input.connections {
            if is_critical_signal(&conn.signal) {
                findings.push(
                    DrcFinding::new(
                        FindingKind::SignalIntegrity,
                        Severity::Warning,
                        format!(
                            "High-speed signal detected ({}): check routing and impedance",
                            conn.signal
                        ),
                    )
                    .with_components([conn.from.as_str(), conn.to.as_str()]),
                );
            }
        }

        // first-appearance order
        let mut counts: Vec<(&str, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for conn in input.connections {
            let signal = conn.signal.as_str();
            match index.get(signal) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    index.insert(signal, counts.len());
                    counts.push((signal, 1));
                }
            }
        }

        for (signal, count) in counts {
            if count > NET_FANOUT_LIMIT {
                findings.push(DrcFinding::new(
                    FindingKind::Routing,
                    Severity::Warning,
                    format!(
                        "Signal {} has multiple connections ({}): consider a unique net name",
                        signal, count
                    ),
                ));
            }
        }

        findings
    }
}

/// Compares the declared active current with trace capacity. Silent when no
/// power figures are given or the active current is not a number.
pub struct PowerConsumptionCheck;

impl DrcCheck for PowerConsumptionCheck {
    fn id(&self) -> &str {
        "power_consumption"
    }

    fn name(&self) -> &str {
        "Power Consumption"
    }

    fn description(&self) -> &str {
        "Compares active current with the per-trace limit and the 500mA thermal review threshold"
    }

    fn check(&self, input: &DrcInput<'_>) -> Vec<DrcFinding> {
        let mut findings = Vec::new();
        let Some(current) = input.power_specs.and_then(|p| p.active_current_ma()) else {
            return findings;
        };

        if current > input.rules.max_current_per_trace_ma() {
            findings.push(DrcFinding::new(
                FindingKind::Power,
                Severity::Warning,
                format!(
                    "Active current too high ({}mA): consider wider traces or copper planes",
                    current
                ),
            ));
        }

        if current > HIGH_CONSUMPTION_MA {
            findings.push(DrcFinding::new(
                FindingKind::Thermal,
                Severity::Info,
                format!(
                    "High power consumption detected ({}mA): consider detailed thermal analysis",
                    current
                ),
            ));
        }

        findings
    }
}

/// Regulators and ICs crowded by other parts.
pub struct ThermalCheck;

impl ThermalCheck {
    fn neighbours(component: &Component, components: &[Component]) -> usize {
        let Some(centre) = component.position() else {
            return 0;
        };
        components
            .iter()
            .filter(|other| other.reference != component.reference)
            .filter_map(Component::position)
            .filter(|p| centre.distance(p) < THERMAL_PROXIMITY_RADIUS)
            .count()
    }
}

impl DrcCheck for ThermalCheck {
    fn id(&self) -> &str {
        "thermal"
    }

    fn name(&self) -> &str {
        "Thermal Concentration"
    }

    fn description(&self) -> &str {
        "Flags ICs and regulators with more than 3 other components within 100 units"
    }

    fn check(&self, input: &DrcInput<'_>) -> Vec<DrcFinding> {
        input
            .components
            .iter()
            .filter(|c| is_power_component(&c.name, &c.reference))
            .filter(|c| Self::neighbours(c, input.components) > THERMAL_NEIGHBOR_LIMIT)
            .map(|c| {
                DrcFinding::new(
                    FindingKind::Thermal,
                    Severity::Warning,
                    format!(
                        "Component {} has many nearby components: may cause heating",
                        c.reference
                    ),
                )
                .with_components([c.reference.as_str()])
                .at(c.position())
            })
            .collect()
    }
}
