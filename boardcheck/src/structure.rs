//! Structural validation of design snapshots
//!
//! Runs before DRC and checks that a snapshot is internally consistent:
//! references are present and unique, connections resolve, required fields
//! are filled in. Also provides default placement for components that came
//! without coordinates, and a four-step smoke test over generated designs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::design::{Component, Connection};
use crate::heuristics::{is_microcontroller_name, is_power_entry};

/// Outcome of [`validate_structure`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructureReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl StructureReport {
    fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
        }
    }

    fn error(&mut self, message: String) {
        self.errors.push(message);
        self.is_valid = false;
    }
}

/// Checks referential integrity and completeness of a snapshot.
///
/// Never mutates its input. `is_valid` is false as soon as any error is
/// recorded; warnings and info lines are advisory.
pub fn validate_structure(components: &[Component], connections: &[Connection]) -> StructureReport {
    let mut report = StructureReport::new();

    if components.is_empty() {
        report.error("No components were generated".to_string());
        return report;
    }

    report.info.push(format!("{} components identified", components.len()));

    let mut references: HashSet<&str> = HashSet::new();
    for component in components {
        if component.reference.is_empty() {
            report.error(format!(
                "Component {} has no reference designator",
                component.name
            ));
        } else if !references.insert(component.reference.as_str()) {
            report.error(format!("Duplicate reference: {}", component.reference));
        }

        if component.name.is_empty() {
            report.error(format!("Component {} has no name", component.reference));
        }
    }

    if connections.is_empty() {
        report.warnings.push("No connections were defined".to_string());
    } else {
        report.info.push(format!("{} connections identified", connections.len()));

        for (idx, conn) in connections.iter().enumerate() {
            let number = idx + 1;
            if conn.from.is_empty() || conn.to.is_empty() {
                report.error(format!(
                    "Connection {} is incomplete (missing source or destination)",
                    number
                ));
            }

            if conn.signal.is_empty() {
                report
                    .warnings
                    .push(format!("Connection {} has no signal name", number));
            }

            for endpoint in [&conn.from, &conn.to] {
                if !endpoint.is_empty() && !references.contains(endpoint.as_str()) {
                    report.error(format!(
                        "Connection references unknown component: {}",
                        endpoint
                    ));
                }
            }
        }
    }

    if !components.iter().any(|c| is_microcontroller_name(&c.name)) {
        report
            .warnings
            .push("No microcontroller identified in the design".to_string());
    }

    if !components
        .iter()
        .any(|c| is_power_entry(&c.name, &c.reference))
    {
        report
            .warnings
            .push("No power supply components identified".to_string());
    }

    if !components.iter().all(Component::has_position) {
        report
            .warnings
            .push("Some components have no coordinates for display".to_string());
    }

    report
}

/// Places components that lack coordinates on a square grid by index.
///
/// With `n` components the grid has `ceil(sqrt(n))` columns; a component at
/// index `i` lands at `(col * 2 - cols, row * 2 - ceil(n / cols))`.
/// Components that already have both coordinates are returned unchanged.
pub fn generate_default_coordinates(components: &[Component]) -> Vec<Component> {
    let n = components.len();
    if n == 0 {
        return Vec::new();
    }
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);

    components
        .iter()
        .enumerate()
        .map(|(idx, component)| {
            if component.has_position() {
                return component.clone();
            }
            let row = idx / cols;
            let col = idx % cols;
            let mut placed = component.clone();
            placed.x = Some((col * 2) as f64 - cols as f64);
            placed.y = Some((row * 2) as f64 - rows as f64);
            placed
        })
        .collect()
}

/// Outcome of [`test_pcb_generation`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SmokeTestReport {
    pub passed: bool,
    pub results: Vec<String>,
}

/// Runs the fixed generation smoke test: components present, references
/// unique, connections resolve (skipped without connections), and required
/// fields filled in. Every evaluated assertion yields one `PASS:`/`FAIL:`
/// line.
pub fn test_pcb_generation(components: &[Component], connections: &[Connection]) -> SmokeTestReport {
    let mut results = Vec::new();
    let mut passed = true;

    if components.is_empty() {
        results.push("FAIL: no components generated".to_string());
        passed = false;
    } else {
        results.push(format!("PASS: {} components generated", components.len()));
    }

    let references: HashSet<&str> = components.iter().map(|c| c.reference.as_str()).collect();
    if references.len() != components.len() {
        results.push("FAIL: duplicate references detected".to_string());
        passed = false;
    } else {
        results.push("PASS: all references are unique".to_string());
    }

    if !connections.is_empty() {
        let all_resolve = connections.iter().all(|conn| {
            references.contains(conn.from.as_str()) && references.contains(conn.to.as_str())
        });
        if all_resolve {
            results.push(format!("PASS: {} connections valid", connections.len()));
        } else {
            results.push("FAIL: connections reference unknown components".to_string());
            passed = false;
        }
    }

    let complete = components
        .iter()
        .all(|c| !c.name.is_empty() && !c.reference.is_empty());
    if complete {
        results.push("PASS: all components have required fields".to_string());
    } else {
        results.push("FAIL: components missing required fields".to_string());
        passed = false;
    }

    SmokeTestReport { passed, results }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn esp32(reference: &str) -> Component {
        Component::new(reference, "ESP32-WROOM-32U").at(0.0, 0.0)
    }

    #[test]
    fn test_empty_design_is_invalid() {
        let report = validate_structure(&[], &[]);
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["No components were generated".to_string()]);
        assert!(report.warnings.is_empty());
        assert!(report.info.is_empty());
    }

    #[test]
    fn test_clean_design() {
        let components = vec![
            esp32("U1"),
            Component::new("J1", "USB-C Connector").at(2.0, 0.0),
        ];
        let connections = vec![Connection::new("U1", "J1", "GND")];
        let report = validate_structure(&components, &connections);
        assert!(report.is_valid, "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
        assert_eq!(
            report.info,
            vec![
                "2 components identified".to_string(),
                "1 connections identified".to_string()
            ]
        );
    }

    #[test]
    fn test_duplicate_and_missing_fields() {
        let components = vec![
            esp32("U1"),
            esp32("U1"),
            Component::new("", "Resistor"),
            Component::new("R2", ""),
        ];
        let report = validate_structure(&components, &[]);
        assert!(!report.is_valid);
        assert!(report.errors.contains(&"Duplicate reference: U1".to_string()));
        assert!(report
            .errors
            .contains(&"Component Resistor has no reference designator".to_string()));
        assert!(report.errors.contains(&"Component R2 has no name".to_string()));
        assert!(report.warnings.contains(&"No connections were defined".to_string()));
        assert!(report
            .warnings
            .contains(&"Some components have no coordinates for display".to_string()));
    }

    #[test]
    fn test_dangling_and_incomplete_connections() {
        let components = vec![esp32("U1")];
        let connections = vec![
            Connection::new("U1", "U9", "TX"),
            Connection::new("U1", "", ""),
        ];
        let report = validate_structure(&components, &connections);
        assert!(!report.is_valid);
        assert!(report
            .errors
            .contains(&"Connection references unknown component: U9".to_string()));
        assert!(report
            .errors
            .contains(&"Connection 2 is incomplete (missing source or destination)".to_string()));
        assert!(report.warnings.contains(&"Connection 2 has no signal name".to_string()));
    }

    #[test]
    fn test_missing_controller_and_power_warnings() {
        let components = vec![Component::new("R1", "Resistor 10kΩ").at(0.0, 0.0)];
        let report = validate_structure(&components, &[]);
        assert!(report.is_valid);
        assert!(report
            .warnings
            .contains(&"No microcontroller identified in the design".to_string()));
        assert!(report
            .warnings
            .contains(&"No power supply components identified".to_string()));
    }

    #[test]
    fn test_validation_does_not_mutate_input() {
        let components = vec![Component::new("U1", "ESP32")];
        let before = components.clone();
        let _ = validate_structure(&components, &[]);
        assert_eq!(components, before);
    }

    #[test]
    fn test_default_coordinates_for_four_components() {
        let components: Vec<Component> = (1..=4)
            .map(|i| Component::new(format!("U{}", i), "Part"))
            .collect();
        let placed = generate_default_coordinates(&components);
        let positions: Vec<(f64, f64)> = placed
            .iter()
            .map(|c| (c.x.unwrap(), c.y.unwrap()))
            .collect();
        assert_eq!(
            positions,
            vec![(-2.0, -2.0), (0.0, -2.0), (-2.0, 0.0), (0.0, 0.0)]
        );
    }

    #[test]
    fn test_default_coordinates_keep_existing_positions() {
        let components = vec![
            Component::new("U1", "Part").at(7.0, 8.0),
            Component::new("U2", "Part"),
            Component::new("U3", "Part"),
        ];
        let placed = generate_default_coordinates(&components);
        assert_eq!(placed[0].position().map(|p| (p.x, p.y)), Some((7.0, 8.0)));
        // n = 3: cols = 2, rows = 2
        assert_eq!(placed[1].position().map(|p| (p.x, p.y)), Some((0.0, -2.0)));
        assert_eq!(placed[2].position().map(|p| (p.x, p.y)), Some((-2.0, 0.0)));
        assert!(components[1].x.is_none());
    }

    #[test]
    fn test_smoke_test_detects_duplicates() {
        let components = vec![esp32("U1"), esp32("U1")];
        let report = test_pcb_generation(&components, &[]);
        assert!(!report.passed);
        assert!(report
            .results
            .contains(&"FAIL: duplicate references detected".to_string()));
    }

    #[test]
    fn test_smoke_test_clean_design() {
        let components = vec![esp32("U1"), Component::new("R1", "Resistor").at(3.0, 0.0)];
        let connections = vec![Connection::new("U1", "R1", "EN")];
        let report = test_pcb_generation(&components, &connections);
        assert!(report.passed);
        assert_eq!(
            report.results,
            vec![
                "PASS: 2 components generated".to_string(),
                "PASS: all references are unique".to_string(),
                "PASS: 1 connections valid".to_string(),
                "PASS: all components have required fields".to_string(),
            ]
        );
    }

    #[test]
    fn test_smoke_test_unresolved_connection() {
        let components = vec![esp32("U1")];
        let connections = vec![Connection::new("U1", "X9", "TX")];
        let report = test_pcb_generation(&components, &connections);
        assert!(!report.passed);
        assert_eq!(
            report.results[2],
            "FAIL: connections reference unknown components"
        );
    }
}
