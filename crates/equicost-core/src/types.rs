//! # Domain Types
//!
//! Value types that flow through one estimation call.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  STATIC (read-only for the process lifetime)                            │
//! │  ┌─────────────────┐   ┌──────────────────┐                             │
//! │  │   RateEntry     │   │ AdjustmentFactor │                             │
//! │  │  key / label    │   │  key / label     │                             │
//! │  │  base_rate      │   │  multiplier > 0  │                             │
//! │  │  fields, meta   │   │  fields          │                             │
//! │  └─────────────────┘   └──────────────────┘                             │
//! │                                                                         │
//! │  PER CALCULATION (created and dropped inside one call)                  │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │  ScenarioInput  │──►│    LineItem     │──►│ ScenarioResult  │        │
//! │  │  selections     │   │  annual_amount  │   │  totals         │        │
//! │  │  inputs (raw)   │   │  kind           │   │  per_unit       │        │
//! │  │  toggles        │   │  optional       │   │  break_even     │        │
//! │  │  overrides      │   └─────────────────┘   │  comparisons    │        │
//! │  └─────────────────┘                         └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything crossing the presentation boundary is camelCase JSON and has a
//! generated TypeScript binding. Everything read from calculator definitions
//! is snake_case TOML.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

// =============================================================================
// Periods
// =============================================================================

/// A billing or usage period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Annual,
}

impl Period {
    /// How many of this period make one year.
    ///
    /// Weeks are counted as exactly 52, matching every calculator's
    /// "weekly × 52" annualisation.
    pub fn per_year(&self) -> f64 {
        match self {
            Period::Daily => 365.0,
            Period::Weekly => 52.0,
            Period::Monthly => 12.0,
            Period::Annual => 1.0,
        }
    }
}

/// How a monthly figure is derived.
///
/// ```text
/// AnnualOverTwelve        monthly = annual / 12           (1404 → 117.00)
/// WeeklyTimesFourPointThreeThree
///                         monthly = (annual / 52) × 4.33  (1404 → 116.91)
/// ```
/// The two differ by about 0.3%. A calculator picks one and the result
/// records which one was used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum MonthConvention {
    #[default]
    #[serde(rename = "annual_over_twelve")]
    AnnualOverTwelve,
    #[serde(rename = "weekly_times_4_33")]
    WeeklyTimesFourPointThreeThree,
}

/// Weeks per month under [`MonthConvention::WeeklyTimesFourPointThreeThree`].
pub const WEEKS_PER_MONTH: f64 = 4.33;

// =============================================================================
// Catalog Types
// =============================================================================

/// Descriptive metadata attached to a catalog entry (pros, cons, notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
}

/// One selectable preset: a bedding type, a dental provider, a field type.
///
/// ## Invariants
/// - `base_rate >= 0`
/// - `key` unique within its catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateEntry {
    pub key: String,
    pub label: String,
    /// Catalog unit price before any adjustment.
    pub base_rate: f64,
    /// What `base_rate` is priced per ("bag", "visit", "acre/year").
    #[serde(default)]
    pub unit: String,
    /// Numeric attributes rules can refer to (`bags_per_week_full`, `callout`).
    #[serde(default)]
    pub fields: BTreeMap<String, f64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl RateEntry {
    /// Numeric field value; an absent field reads as zero.
    pub fn field(&self, name: &str) -> f64 {
        self.fields.get(name).copied().unwrap_or(0.0)
    }
}

/// One key within a factor class (a region, a stable size, an age group).
///
/// ## Invariant
/// `multiplier` is finite and strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdjustmentFactor {
    pub key: String,
    pub label: String,
    pub multiplier: f64,
    /// Numeric attributes besides the multiplier (`checks_per_year`).
    #[serde(default)]
    pub fields: BTreeMap<String, f64>,
}

impl AdjustmentFactor {
    /// Numeric field value; an absent field reads as zero.
    pub fn field(&self, name: &str) -> f64 {
        self.fields.get(name).copied().unwrap_or(0.0)
    }
}

// =============================================================================
// Scenario Input
// =============================================================================

/// A form value as the widget delivers it: a number, or whatever was typed.
///
/// A cleared numeric field arrives as `null` (`parseFloat("")` is NaN, which
/// JSON writes as `null`) and reads as `Missing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Missing => Ok(()),
        }
    }
}

/// Everything the user selected for one calculation.
///
/// Absent entries mean "use the calculator default". Maps are ordered so the
/// same input always iterates, logs and serializes identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    /// Catalog or factor class name → selected key.
    #[serde(default)]
    pub selections: BTreeMap<String, String>,
    /// Numeric form fields, uncoerced.
    #[serde(default)]
    pub inputs: BTreeMap<String, RawValue>,
    #[serde(default)]
    pub toggles: BTreeMap<String, bool>,
    /// Free-form values that supersede a computed rate or quantity.
    #[serde(default)]
    pub overrides: BTreeMap<String, RawValue>,
    /// Primary-catalog keys to compare against; empty = calculator default.
    #[serde(default)]
    pub compare_against: Vec<String>,
}

impl ScenarioInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, selection: &str, key: &str) -> Self {
        self.selections
            .insert(selection.to_string(), key.to_string());
        self
    }

    pub fn input(mut self, name: &str, value: impl Into<RawValue>) -> Self {
        self.inputs.insert(name.to_string(), value.into());
        self
    }

    pub fn toggle(mut self, name: &str, on: bool) -> Self {
        self.toggles.insert(name.to_string(), on);
        self
    }

    pub fn with_override(mut self, name: &str, value: impl Into<RawValue>) -> Self {
        self.overrides.insert(name.to_string(), value.into());
        self
    }

    pub fn compare(mut self, key: &str) -> Self {
        self.compare_against.push(key.to_string());
        self
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// Whether a line repeats every year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    #[default]
    Recurring,
    /// A setup or capital cost, paid once in the first year.
    OneOff,
}

/// One category-tagged cost component.
///
/// ## Invariant
/// `annual_amount >= 0`. For a [`LineKind::OneOff`] line it is the single
/// charge rather than a yearly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub label: String,
    pub category: String,
    pub annual_amount: f64,
    pub kind: LineKind,
    /// Produced by a user toggle.
    pub optional: bool,
    /// The toggle's default state.
    pub included_by_default: bool,
}

impl LineItem {
    pub fn is_recurring(&self) -> bool {
        self.kind == LineKind::Recurring
    }
}

// =============================================================================
// Scenario Result
// =============================================================================

/// Period conversions of the line items.
///
/// ```text
/// annual      = Σ recurring
/// weekly      = annual / 52
/// monthly     = per MonthConvention
/// one_off     = Σ one-off
/// first_year  = annual + one_off
/// five_year   = annual × 5 + one_off      (setup paid once, not ×5)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub weekly: f64,
    pub monthly: f64,
    pub annual: f64,
    pub one_off: f64,
    pub first_year: f64,
    pub five_year: f64,
}

/// Annual cost divided by some count (horses, acres, visits).
///
/// `value` is `None` when the divisor is zero: render as not applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PerUnitMetric {
    pub id: String,
    pub label: String,
    pub divisor: f64,
    pub value: Option<f64>,
}

/// Units needed at `unit_price` to cover `total_cost`.
///
/// `units` is deliberately fractional: 11.3 stables is an occupancy rate,
/// not a head count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BreakEven {
    pub label: String,
    pub total_cost: f64,
    pub unit_price: f64,
    pub units: Option<f64>,
    /// `units / capacity` when the calculator declares a capacity.
    pub occupancy: Option<f64>,
}

/// The same scenario rerun with a different primary selection.
///
/// `delta = annual_amount - primary annual`; positive means the alternative
/// costs more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    pub key: String,
    pub label: String,
    pub annual_amount: f64,
    pub delta: f64,
}

impl ComparisonEntry {
    /// What the user saves by staying with the primary choice, if anything.
    pub fn savings(&self) -> Option<f64> {
        (self.delta > 0.0).then_some(self.delta)
    }
}

/// The complete output of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub calculator: String,
    /// Version of the calculator definition that produced this result.
    pub version: String,
    /// Every selection after defaults and stale-key fallbacks.
    pub selections: BTreeMap<String, String>,
    pub line_items: Vec<LineItem>,
    pub totals: Totals,
    pub month_convention: MonthConvention,
    pub per_unit: Vec<PerUnitMetric>,
    pub break_even: Option<BreakEven>,
    pub comparisons: Vec<ComparisonEntry>,
}

impl ScenarioResult {
    pub fn line_item(&self, id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.id == id)
    }

    /// Per-unit value by id; `None` if absent or not applicable.
    pub fn per_unit_value(&self, id: &str) -> Option<f64> {
        self.per_unit
            .iter()
            .find(|metric| metric.id == id)
            .and_then(|metric| metric.value)
    }

    pub fn comparison(&self, key: &str) -> Option<&ComparisonEntry> {
        self.comparisons.iter().find(|entry| entry.key == key)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
