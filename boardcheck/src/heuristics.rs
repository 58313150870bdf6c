//! Classification heuristics
//!
//! Naming conventions stand in for real part metadata here: signals,
//! references and part names are matched by substring or prefix against the
//! tables below. Each rule is a named predicate so it can be tested and
//! extended on its own.

/// Signal substrings marking a power or ground net. Case-sensitive.
pub const POWER_SIGNAL_PATTERNS: &[&str] = &["VCC", "GND", "3V3", "5V"];

/// Ground marker within power nets. Case-sensitive.
pub const GROUND_SIGNAL_PATTERN: &str = "GND";

/// Bus signals that deserve routing and impedance review. Matched against
/// the upper-cased signal name.
pub const CRITICAL_SIGNAL_PATTERNS: &[&str] =
    &["SPI", "I2C", "UART", "SCL", "SDA", "MOSI", "MISO", "SCK"];

/// Reference prefixes of passives that are not expected to have their own
/// supply connection.
pub const PASSIVE_REFERENCE_PREFIXES: &[char] = &['R', 'C'];

/// Part names that identify a regulator.
pub const REGULATOR_NAME_PATTERNS: &[&str] = &["AMS1117", "VREG"];

/// Reference prefix of integrated circuits.
pub const IC_REFERENCE_PREFIX: char = 'U';

/// Part names that identify a microcontroller.
pub const MICROCONTROLLER_NAME_PATTERNS: &[&str] = &["ESP32", "MCU", "Arduino"];

/// Part names that identify a power entry (supply symbol or USB input).
pub const POWER_ENTRY_NAME_PATTERNS: &[&str] = &["VCC", "GND", "USB"];

/// Reference prefix of connectors.
pub const CONNECTOR_REFERENCE_PREFIX: char = 'J';

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

pub fn is_power_signal(signal: &str) -> bool {
    contains_any(signal, POWER_SIGNAL_PATTERNS)
}

pub fn is_ground_signal(signal: &str) -> bool {
    signal.contains(GROUND_SIGNAL_PATTERN)
}

pub fn is_critical_signal(signal: &str) -> bool {
    contains_any(&signal.to_uppercase(), CRITICAL_SIGNAL_PATTERNS)
}

pub fn is_passive_reference(reference: &str) -> bool {
    reference.starts_with(PASSIVE_REFERENCE_PREFIXES)
}

/// Regulators and ICs, the parts assumed to dissipate heat.
pub fn is_power_component(name: &str, reference: &str) -> bool {
    contains_any(name, REGULATOR_NAME_PATTERNS) || reference.starts_with(IC_REFERENCE_PREFIX)
}

pub fn is_microcontroller_name(name: &str) -> bool {
    contains_any(name, MICROCONTROLLER_NAME_PATTERNS)
}

/// Supply symbols, USB parts and connectors.
pub fn is_power_entry(name: &str, reference: &str) -> bool {
    contains_any(name, POWER_ENTRY_NAME_PATTERNS) || reference.starts_with(CONNECTOR_REFERENCE_PREFIX)
}
