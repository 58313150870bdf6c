//! Component catalog
//!
//! Reference data for the parts the design generator is allowed to pick.
//! The table is embedded at compile time as JSON and parsed once on first
//! use; after that it is read-only for the life of the process.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::design::Component;

const EMBEDDED_CATALOG: &str = include_str!("../catalog/components.json");

/// Fraction of time a battery powered design spends in active mode.
pub const ACTIVE_DUTY_CYCLE: f64 = 0.05;

/// Battery capacity assumed when the requirements do not state one.
pub const DEFAULT_BATTERY_CAPACITY_MAH: f64 = 2000.0;

/// Average current (mA) above which the design is considered power hungry.
pub const HIGH_AVERAGE_CURRENT_MA: f64 = 100.0;

/// Battery life (days) below which autonomy is considered short.
pub const SHORT_BATTERY_LIFE_DAYS: f64 = 7.0;

/// Total active current (mA) above which a robust supply is recommended.
pub const HIGH_PEAK_CURRENT_MA: f64 = 500.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    Microcontroller,
    Lora,
    Gps,
    Power,
    Connector,
    Passive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PinType {
    Power,
    Ground,
    Io,
    Analog,
    Digital,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentPin {
    pub number: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub pin_type: PinType,
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentSpec {
    pub id: String,
    pub name: String,
    pub category: ComponentCategory,
    pub description: String,
    /// Supply voltage (or rating, for passives) in volts.
    pub voltage: f64,
    /// mA
    #[serde(default)]
    pub current_active: Option<f64>,
    /// mA
    #[serde(default)]
    pub current_sleep: Option<f64>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    pub footprint: String,
    pub symbol: String,
    pub pins: Vec<ComponentPin>,
    pub price: f64,
    pub supplier: String,
    #[serde(default)]
    pub datasheet: Option<String>,
}

impl ComponentSpec {
    pub fn power_pins(&self) -> impl Iterator<Item = &ComponentPin> {
        self.pins
            .iter()
            .filter(|p| matches!(p.pin_type, PinType::Power | PinType::Ground))
    }
}

/// Summed current draw of a set of catalog parts, in mA.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PowerConsumption {
    pub active_total: f64,
    pub sleep_total: f64,
}

/// Battery runtime projection for a duty cycled design.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BatteryEstimate {
    pub capacity_mah: f64,
    pub average_current_ma: f64,
    pub hours: Option<f64>,
    pub days: Option<f64>,
}

struct Catalog {
    entries: Vec<ComponentSpec>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    fn load() -> Self {
        let entries = match serde_json::from_str::<Vec<ComponentSpec>>(EMBEDDED_CATALOG) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to parse embedded component catalog: {}", e);
                Vec::new()
            }
        };
        let by_id = entries
            .iter()
            .enumerate()
            .map(|(idx, spec)| (spec.id.clone(), idx))
            .collect();
        Self { entries, by_id }
    }
}

lazy_static! {
    static ref CATALOG: Catalog = Catalog::load();
}

/// All catalog entries, in catalog order.
pub fn all_components() -> &'static [ComponentSpec] {
    &CATALOG.entries
}

pub fn component_by_id(id: &str) -> Option<&'static ComponentSpec> {
    CATALOG.by_id.get(id).map(|&idx| &CATALOG.entries[idx])
}

pub fn components_by_category(category: ComponentCategory) -> Vec<&'static ComponentSpec> {
    CATALOG
        .entries
        .iter()
        .filter(|c| c.category == category)
        .collect()
}

/// Finds the catalog entry a design component was generated from. Tries the
/// footprint, name and value as catalog ids, then the display name.
pub fn match_component(component: &Component) -> Option<&'static ComponentSpec> {
    [
        component.footprint.as_deref(),
        Some(component.name.as_str()),
        component.value.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(component_by_id)
    .or_else(|| CATALOG.entries.iter().find(|spec| spec.name == component.name))
}

/// Catalog ids for every design component that matches an entry, in design
/// order. Unmatched components are logged and skipped.
pub fn catalog_ids(components: &[Component]) -> Vec<&'static str> {
    components
        .iter()
        .filter_map(|c| match match_component(c) {
            Some(spec) => Some(spec.id.as_str()),
            None => {
                tracing::debug!("No catalog entry for {} ({})", c.reference, c.name);
                None
            }
        })
        .collect()
}

/// Sums active and sleep current over the given catalog ids. Unknown ids and
/// entries without a figure contribute nothing.
pub fn calculate_power_consumption<S: AsRef<str>>(component_ids: &[S]) -> PowerConsumption {
    let mut total = PowerConsumption::default();
    for id in component_ids {
        if let Some(spec) = component_by_id(id.as_ref()) {
            total.active_total += spec.current_active.unwrap_or(0.0);
            total.sleep_total += spec.current_sleep.unwrap_or(0.0);
        }
    }
    total
}

/// Projects battery life assuming the design is active
/// [`ACTIVE_DUTY_CYCLE`] of the time and asleep otherwise.
pub fn estimate_battery_life(consumption: &PowerConsumption, capacity_mah: f64) -> BatteryEstimate {
    let average = consumption.active_total * ACTIVE_DUTY_CYCLE
        + consumption.sleep_total * (1.0 - ACTIVE_DUTY_CYCLE);
    let hours = if average > 0.0 {
        Some(capacity_mah / average)
    } else {
        None
    };
    BatteryEstimate {
        capacity_mah,
        average_current_ma: average,
        hours,
        days: hours.map(|h| h / 24.0),
    }
}

/// Active and sleep draw of one catalog part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PowerBreakdownEntry {
    pub id: String,
    pub name: String,
    pub active_ma: f64,
    pub sleep_ma: f64,
}

/// Per-part current draw for the given catalog ids, in input order. Unknown
/// ids and parts with no current figure are left out.
pub fn power_breakdown<S: AsRef<str>>(component_ids: &[S]) -> Vec<PowerBreakdownEntry> {
    component_ids
        .iter()
        .filter_map(|id| component_by_id(id.as_ref()))
        .map(|spec| PowerBreakdownEntry {
            id: spec.id.clone(),
            name: spec.name.clone(),
            active_ma: spec.current_active.unwrap_or(0.0),
            sleep_ma: spec.current_sleep.unwrap_or(0.0),
        })
        .filter(|entry| entry.active_ma > 0.0 || entry.sleep_ma > 0.0)
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    High,
    Medium,
    Info,
    Optimal,
}

impl RecommendationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationPriority::High => "high",
            RecommendationPriority::Medium => "medium",
            RecommendationPriority::Info => "info",
            RecommendationPriority::Optimal => "optimal",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PowerRecommendation {
    pub priority: RecommendationPriority,
    pub title: String,
    pub detail: String,
}

impl PowerRecommendation {
    fn new(priority: RecommendationPriority, title: &str, detail: String) -> Self {
        Self {
            priority,
            title: title.to_string(),
            detail,
        }
    }
}

/// Optimisation advice for a power budget. A design with no current draw
/// has unlimited battery life and counts as efficient.
pub fn power_recommendations(
    consumption: &PowerConsumption,
    estimate: &BatteryEstimate,
) -> Vec<PowerRecommendation> {
    let mut recommendations = Vec::new();
    let average = estimate.average_current_ma;
    let short_life_days = estimate.days.filter(|d| *d < SHORT_BATTERY_LIFE_DAYS);

    if average > HIGH_AVERAGE_CURRENT_MA {
        recommendations.push(PowerRecommendation::new(
            RecommendationPriority::High,
            "High power consumption detected",
            "Consider low-power components or more time in sleep mode".to_string(),
        ));
    }

    if let Some(days) = short_life_days {
        recommendations.push(PowerRecommendation::new(
            RecommendationPriority::Medium,
            "Short battery life",
            format!(
                "A {}mAh battery lasts only {:.1} days: consider a larger battery or a lower duty cycle",
                estimate.capacity_mah, days
            ),
        ));
    }

    if consumption.active_total > HIGH_PEAK_CURRENT_MA {
        recommendations.push(PowerRecommendation::new(
            RecommendationPriority::Info,
            "High peak consumption",
            format!(
                "Active current of {}mA may require a robust power supply",
                consumption.active_total
            ),
        ));
    }

    if short_life_days.is_none() && average <= HIGH_AVERAGE_CURRENT_MA {
        recommendations.push(PowerRecommendation::new(
            RecommendationPriority::Optimal,
            "Power consumption optimised",
            "Design is energy efficient".to_string(),
        ));
    }

    recommendations
}
