//! Design snapshot data model
//!
//! A snapshot is the declarative description of a board produced upstream
//! (usually extracted from an LLM tool call): component instances, the
//! connections between them, and optional power figures. Every field is
//! deserialized leniently, since missing or malformed values are reported by
//! the structural validator rather than rejected at load time.

use serde::{Deserialize, Deserializer, Serialize};

/// A point in abstract schematic units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// A component instance placed in the design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Component {
    /// Reference designator, e.g. `U1`. Empty when the producer omitted it.
    #[serde(default)]
    pub reference: String,
    /// Catalog identifier or free-text label.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<String>,
    #[serde(default, deserialize_with = "finite_number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "finite_number")]
    pub y: Option<f64>,
}

impl Component {
    pub fn new(reference: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_footprint(mut self, footprint: impl Into<String>) -> Self {
        self.footprint = Some(footprint.into());
        self
    }

    /// Position, if both coordinates are present.
    pub fn position(&self) -> Option<Point> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point { x, y }),
            _ => None,
        }
    }

    pub fn has_position(&self) -> bool {
        self.position().is_some()
    }
}

/// A two-terminal connection carrying a named signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Connection {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub signal: String,
}

impl Connection {
    pub fn new(from: impl Into<String>, to: impl Into<String>, signal: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            signal: signal.into(),
        }
    }

    pub fn touches(&self, reference: &str) -> bool {
        self.from == reference || self.to == reference
    }
}

/// Power figures supplied with a design. Currents are in mA.
///
/// Values are kept as text because upstream producers send either strings or
/// numbers; [`PowerSpecs::active_current_ma`] does the numeric reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PowerSpecs {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub current_active: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub current_sleep: Option<String>,
}

impl PowerSpecs {
    pub fn with_active_current(current_ma: impl Into<String>) -> Self {
        Self {
            current_active: Some(current_ma.into()),
            ..Default::default()
        }
    }

    /// Active current in mA, or `None` when absent or not numeric.
    pub fn active_current_ma(&self) -> Option<f64> {
        self.current_active.as_deref().and_then(parse_leading_number)
    }

    /// Sleep current in mA, or `None` when absent or not numeric.
    pub fn sleep_current_ma(&self) -> Option<f64> {
        self.current_sleep.as_deref().and_then(parse_leading_number)
    }
}

/// Everything one validation pass looks at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DesignSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default, alias = "power_analysis", skip_serializing_if = "Option::is_none")]
    pub power_specs: Option<PowerSpecs>,
}

impl DesignSnapshot {
    pub fn new(components: Vec<Component>, connections: Vec<Connection>) -> Self {
        Self {
            name: None,
            components,
            connections,
            power_specs: None,
        }
    }

    pub fn with_power_specs(mut self, specs: PowerSpecs) -> Self {
        self.power_specs = Some(specs);
        self
    }

    pub fn component(&self, reference: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.reference == reference)
    }
}

/// Reads the numeric prefix of a string the way loosely formatted figures
/// such as `"240mA"` or `" 3.3V"` are written. Returns `None` when there is
/// no leading number or the result is not finite.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;

    let bytes = text.as_bytes();
    while end < bytes.len() {
        let b = bytes[end];
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'+' | b'-' if end == 0 => {}
            b'+' | b'-' if seen_exp && matches!(bytes[end - 1], b'e' | b'E') => {}
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => {
                // only an exponent if a digit follows, optionally after a sign
                let rest = &bytes[end + 1..];
                let digit_follows = match rest.first() {
                    Some(b'+') | Some(b'-') => rest.get(1).is_some_and(u8::is_ascii_digit),
                    Some(d) => d.is_ascii_digit(),
                    None => false,
                };
                if !digit_follows {
                    break;
                }
                seen_exp = true;
            }
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return None;
    }
    text[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn finite_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leading_number() {
        assert_eq!(parse_leading_number("1500"), Some(1500.0));
        assert_eq!(parse_leading_number("240mA"), Some(240.0));
        assert_eq!(parse_leading_number(" 3.3V"), Some(3.3));
        assert_eq!(parse_leading_number("-12"), Some(-12.0));
        assert_eq!(parse_leading_number("1e3"), Some(1000.0));
        assert_eq!(parse_leading_number("2e"), Some(2.0));
        assert_eq!(parse_leading_number("abc"), None);
        assert_eq!(parse_leading_number(""), None);
        assert_eq!(parse_leading_number("."), None);
    }

    #[test]
    fn test_power_specs_accept_numbers_and_strings() {
        let specs: PowerSpecs =
            serde_json::from_str(r#"{"voltage": 3.3, "current_active": "1500", "current_sleep": 0.5}"#)
                .unwrap();
        assert_eq!(specs.voltage.as_deref(), Some("3.3"));
        assert_eq!(specs.active_current_ma(), Some(1500.0));
        assert_eq!(specs.sleep_current_ma(), Some(0.5));
    }

    #[test]
    fn test_component_without_coordinates_has_no_position() {
        let c: Component = serde_json::from_str(r#"{"reference": "U1", "name": "ESP32"}"#).unwrap();
        assert!(c.position().is_none());

        let c: Component =
            serde_json::from_str(r#"{"reference": "U1", "name": "ESP32", "x": 1, "y": "2"}"#).unwrap();
        assert!(c.position().is_none(), "string coordinates are not numeric");
    }

    #[test]
    fn test_snapshot_accepts_power_analysis_alias() {
        let snapshot: DesignSnapshot = serde_json::from_str(
            r#"{"components": [], "connections": [], "power_analysis": {"current_active": 120}}"#,
        )
        .unwrap();
        assert_eq!(
            snapshot.power_specs.and_then(|p| p.active_current_ma()),
            Some(120.0)
        );
    }
}
