//! # Calculator Definitions
//!
//! One calculator = one TOML document deserialized into a
//! [`CalculatorConfig`]. Rate tables, multipliers and line-item rules are
//! data; the engine that evaluates them is shared by every calculator.
//!
//! ## Anatomy of a Line Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  [[line_items]]  id = "bedding"                                         │
//! │                                                                         │
//! │   rate      = [ rate ]                         ──► 9.00   (or override) │
//! │   quantity  = [ field(bags_per_week_full),                              │
//! │                 factor(stable_size),                                    │
//! │                 factor(keeping) ]              ──► 3.0    (or override) │
//! │   adjust    = [ per_year(weekly),                                       │
//! │                 factor(region),                                         │
//! │                 toggle_multiplier(bulk, 0.85) ]──► 52.0                 │
//! │                                                                         │
//! │   annual_amount = rate × quantity × adjust     ──► 1404.0               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each of the three groups is a product of [`Term`]s (empty = 1). An
//! override replaces a whole group, so "custom bag price" supersedes the
//! catalog price without touching the quantity or the adjustments.
//!
//! ## Loading
//! [`CalculatorConfig::from_toml`] parses and then validates. A definition
//! that breaks any rule is rejected whole; nothing is partially loaded.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::RateCatalog;
use crate::error::{ConfigError, CoreError, CoreResult};
use crate::factors::FactorClass;
use crate::types::{LineKind, MonthConvention, Period};
use crate::validation::{validate_key, validate_multiplier, validate_non_negative};

// =============================================================================
// Terms and Conditions
// =============================================================================

/// One factor of a line rule's rate, quantity or adjustment product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Term {
    /// A literal (`0.1` of rent for maintenance, `12` months).
    Constant { value: f64 },

    /// `base_rate` of the selected entry; the primary catalog when omitted.
    Rate {
        #[serde(default)]
        catalog: Option<String>,
    },

    /// A numeric field of the selected entry. Absent fields read as 0.
    Field { catalog: String, field: String },

    /// Multiplier of the selected factor.
    Factor { class: String },

    /// A numeric field of the selected factor (`checks_per_year`).
    FactorField { class: String, field: String },

    /// A coerced numeric form input.
    Input { name: String },

    /// How many `period`s make a year.
    PerYear { period: Period },

    /// Occurrences per year of something repeating every `input` periods.
    ///
    /// `ceil(per_year / interval)`: shoeing every 6 weeks is 9 visits, not
    /// 8.67. A zero or negative interval means it never happens.
    IntervalPerYear { input: String, period: Period },

    /// `multiplier` while the toggle is on, otherwise 1.
    ToggleMultiplier { toggle: String, multiplier: f64 },
}

impl Term {
    /// Whether the term reads the selected entry of the `primary` catalog.
    pub fn reads_catalog(&self, primary: &str) -> bool {
        match self {
            Term::Rate { catalog } => catalog.as_deref().unwrap_or(primary) == primary,
            Term::Field { catalog, .. } => catalog == primary,
            _ => false,
        }
    }
}

/// Gate on a line rule; the rule only produces a line when this holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// The selection (catalog or factor class) is one of `keys`.
    SelectionIn { selection: String, keys: Vec<String> },
    /// The selected entry's field is greater than zero.
    FieldPositive { catalog: String, field: String },
    /// The coerced input is greater than zero.
    InputPositive { input: String },
}

// =============================================================================
// Form Fields
// =============================================================================

/// A numeric form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    pub label: String,
    /// Used when the field is empty, unparseable or below `min`.
    pub default: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub unit: String,
}

/// A boolean form field: optional extras and multiplier switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleSpec {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub default: bool,
}

/// A free-form numeric field that replaces a computed value when valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideSpec {
    pub name: String,
    pub label: String,
}

// =============================================================================
// Line Rules
// =============================================================================

/// How one line item's annual amount is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRule {
    pub id: String,
    pub label: String,
    pub category: String,
    #[serde(default)]
    pub kind: LineKind,
    /// Shown as an optional extra; requires `toggle`.
    #[serde(default)]
    pub optional: bool,
    /// Line is produced only while this toggle is on.
    #[serde(default)]
    pub toggle: Option<String>,
    #[serde(default)]
    pub when: Option<Condition>,
    #[serde(default)]
    pub rate: Vec<Term>,
    #[serde(default)]
    pub rate_override: Option<String>,
    #[serde(default)]
    pub quantity: Vec<Term>,
    #[serde(default)]
    pub quantity_override: Option<String>,
    #[serde(default)]
    pub adjust: Vec<Term>,
}

impl LineRule {
    /// Overrides standing in for a group that reads the `primary` catalog.
    ///
    /// `bag_price` replaces the price of the selected bedding; it says
    /// nothing about what straw would cost.
    pub fn overrides_reading<'r>(&'r self, primary: &'r str) -> impl Iterator<Item = &'r str> {
        [
            (&self.rate, &self.rate_override),
            (&self.quantity, &self.quantity_override),
        ]
        .into_iter()
        .filter(move |(terms, _)| terms.iter().any(|term| term.reads_catalog(primary)))
        .filter_map(|(_, name)| name.as_deref())
    }

    fn terms(&self) -> impl Iterator<Item = &Term> {
        self.rate
            .iter()
            .chain(self.quantity.iter())
            .chain(self.adjust.iter())
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Which total a derived metric divides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasis {
    /// Recurring costs only, one-offs excluded.
    #[default]
    RecurringAnnual,
    /// Recurring plus one-off.
    FirstYear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerUnitSpec {
    pub id: String,
    pub label: String,
    pub divisor: Vec<Term>,
    #[serde(default)]
    pub basis: CostBasis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenSpec {
    pub label: String,
    /// Recurring price per unit over the same year as the costs.
    pub unit_price: Vec<Term>,
    #[serde(default)]
    pub basis: CostBasis,
    /// Units available; enables the occupancy figure.
    #[serde(default)]
    pub capacity: Option<Vec<Term>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummarySpec {
    #[serde(default)]
    pub month_convention: MonthConvention,
    #[serde(default)]
    pub per_unit: Vec<PerUnitSpec>,
    #[serde(default)]
    pub break_even: Option<BreakEvenSpec>,
}

// =============================================================================
// Calculator Config
// =============================================================================

/// A complete, versioned calculator definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub name: String,
    pub title: String,
    pub version: String,
    pub effective_from: NaiveDate,
    #[serde(default)]
    pub description: String,
    /// The catalog the comparator substitutes.
    pub primary_catalog: String,
    pub catalogs: Vec<RateCatalog>,
    #[serde(default)]
    pub factor_classes: Vec<FactorClass>,
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    #[serde(default)]
    pub toggles: Vec<ToggleSpec>,
    #[serde(default)]
    pub overrides: Vec<OverrideSpec>,
    pub line_items: Vec<LineRule>,
    #[serde(default)]
    pub summary: SummarySpec,
    /// Primary-catalog keys compared when the scenario names none.
    #[serde(default)]
    pub compare_against: Vec<String>,
}

impl CalculatorConfig {
    /// Parses and validates a TOML definition.
    ///
    /// `origin` names the source (file path or built-in name) in errors.
    pub fn from_toml(origin: &str, text: &str) -> Result<Self, ConfigError> {
        let config: CalculatorConfig =
            toml::from_str(text).map_err(|err| ConfigError::Parse {
                origin: origin.to_string(),
                message: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn catalog(&self, name: &str) -> CoreResult<&RateCatalog> {
        self.catalogs
            .iter()
            .find(|catalog| catalog.name == name)
            .ok_or_else(|| CoreError::CatalogNotFound(name.to_string()))
    }

    pub fn primary(&self) -> CoreResult<&RateCatalog> {
        self.catalog(&self.primary_catalog)
    }

    pub fn factor_class(&self, name: &str) -> CoreResult<&FactorClass> {
        self.factor_classes
            .iter()
            .find(|class| class.name == name)
            .ok_or_else(|| CoreError::FactorClassNotFound(name.to_string()))
    }

    pub fn input(&self, name: &str) -> CoreResult<&InputSpec> {
        self.inputs
            .iter()
            .find(|input| input.name == name)
            .ok_or_else(|| CoreError::UnknownInput(name.to_string()))
    }

    pub fn toggle(&self, name: &str) -> CoreResult<&ToggleSpec> {
        self.toggles
            .iter()
            .find(|toggle| toggle.name == name)
            .ok_or_else(|| CoreError::UnknownToggle(name.to_string()))
    }

    pub fn has_override(&self, name: &str) -> bool {
        self.overrides.iter().any(|spec| spec.name == name)
    }

    /// Keys of either a catalog or a factor class, whichever `selection` names.
    fn selection_keys(&self, selection: &str) -> Option<Vec<&str>> {
        if let Ok(catalog) = self.catalog(selection) {
            return Some(catalog.keys().collect());
        }
        self.factor_class(selection)
            .ok()
            .map(|class| class.keys().collect())
    }

    /// Checks every invariant a definition must satisfy before use.
    ///
    /// ## Rules
    /// - Catalogs and factor classes are individually valid, and their names
    ///   are unique across both (they share the selection namespace)
    /// - Input, toggle, override and line ids are unique and well-formed
    /// - Every reference in a term, condition or summary resolves
    /// - Constants and input bounds are >= 0, toggle multipliers > 0
    /// - `compare_against` keys exist in the primary catalog
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name.as_str();
        let invalid = |reason: String| ConfigError::invalid(name, reason);

        validate_key("calculator name", name).map_err(|e| invalid(e.to_string()))?;
        if self.version.trim().is_empty() {
            return Err(invalid("version is required".to_string()));
        }

        let mut selections = BTreeSet::new();
        for catalog in &self.catalogs {
            catalog.validate().map_err(|e| invalid(e.to_string()))?;
            if !selections.insert(catalog.name.as_str()) {
                return Err(invalid(format!("selection '{}' defined twice", catalog.name)));
            }
        }
        for class in &self.factor_classes {
            class.validate().map_err(|e| invalid(e.to_string()))?;
            if !selections.insert(class.name.as_str()) {
                return Err(invalid(format!("selection '{}' defined twice", class.name)));
            }
        }

        self.primary()
            .map_err(|_| invalid(format!("primary catalog '{}' missing", self.primary_catalog)))?;

        let mut fields = BTreeSet::new();
        for input in &self.inputs {
            validate_key("input name", &input.name).map_err(|e| invalid(e.to_string()))?;
            validate_non_negative(&format!("{}.min", input.name), input.min)
                .map_err(|e| invalid(e.to_string()))?;
            validate_non_negative(&format!("{}.default", input.name), input.default)
                .map_err(|e| invalid(e.to_string()))?;
            if input.default < input.min {
                return Err(invalid(format!("input '{}' default is below min", input.name)));
            }
            if !fields.insert(input.name.as_str()) {
                return Err(invalid(format!("input '{}' defined twice", input.name)));
            }
        }
        for toggle in &self.toggles {
            validate_key("toggle name", &toggle.name).map_err(|e| invalid(e.to_string()))?;
            if !fields.insert(toggle.name.as_str()) {
                return Err(invalid(format!("field '{}' defined twice", toggle.name)));
            }
        }
        for spec in &self.overrides {
            validate_key("override name", &spec.name).map_err(|e| invalid(e.to_string()))?;
            if !fields.insert(spec.name.as_str()) {
                return Err(invalid(format!("field '{}' defined twice", spec.name)));
            }
        }

        if self.line_items.is_empty() {
            return Err(invalid("at least one line item is required".to_string()));
        }
        let mut ids = BTreeSet::new();
        for rule in &self.line_items {
            self.validate_rule(rule).map_err(invalid)?;
            if !ids.insert(rule.id.as_str()) {
                return Err(invalid(format!("line item '{}' defined twice", rule.id)));
            }
        }

        for spec in &self.summary.per_unit {
            validate_key("per-unit id", &spec.id).map_err(|e| invalid(e.to_string()))?;
            self.validate_terms(&spec.divisor)
                .map_err(|reason| invalid(format!("per_unit {}: {}", spec.id, reason)))?;
        }
        if let Some(break_even) = &self.summary.break_even {
            self.validate_terms(&break_even.unit_price)
                .map_err(|reason| invalid(format!("break_even: {}", reason)))?;
            if let Some(capacity) = &break_even.capacity {
                self.validate_terms(capacity)
                    .map_err(|reason| invalid(format!("break_even capacity: {}", reason)))?;
            }
        }

        let primary = self
            .primary()
            .map_err(|_| invalid(format!("primary catalog '{}' missing", self.primary_catalog)))?;
        for key in &self.compare_against {
            if !primary.contains(key) {
                return Err(invalid(format!(
                    "compare_against key '{}' not in catalog {}",
                    key, primary.name
                )));
            }
        }

        Ok(())
    }

    fn validate_rule(&self, rule: &LineRule) -> Result<(), String> {
        validate_key("line item id", &rule.id).map_err(|e| e.to_string())?;

        match &rule.toggle {
            Some(toggle) => {
                self.toggle(toggle)
                    .map_err(|e| format!("line {}: {}", rule.id, e))?;
            }
            None if rule.optional => {
                return Err(format!("line {}: optional lines need a toggle", rule.id));
            }
            None => {}
        }

        if let Some(condition) = &rule.when {
            self.validate_condition(condition)
                .map_err(|reason| format!("line {}: {}", rule.id, reason))?;
        }

        for name in [&rule.rate_override, &rule.quantity_override]
            .into_iter()
            .flatten()
        {
            if !self.has_override(name) {
                return Err(format!("line {}: unknown override '{}'", rule.id, name));
            }
        }

        for term in rule.terms() {
            self.validate_term(term)
                .map_err(|reason| format!("line {}: {}", rule.id, reason))?;
        }

        Ok(())
    }

    fn validate_terms(&self, terms: &[Term]) -> Result<(), String> {
        terms.iter().try_for_each(|term| self.validate_term(term))
    }

    fn validate_term(&self, term: &Term) -> Result<(), String> {
        match term {
            Term::Constant { value } => {
                validate_non_negative("constant", *value).map_err(|e| e.to_string())
            }
            Term::Rate { catalog } => match catalog {
                Some(catalog) => self.catalog(catalog).map(|_| ()).map_err(|e| e.to_string()),
                None => Ok(()),
            },
            Term::Field { catalog, .. } => {
                self.catalog(catalog).map(|_| ()).map_err(|e| e.to_string())
            }
            Term::Factor { class } | Term::FactorField { class, .. } => {
                self.factor_class(class).map(|_| ()).map_err(|e| e.to_string())
            }
            Term::Input { name } | Term::IntervalPerYear { input: name, .. } => {
                self.input(name).map(|_| ()).map_err(|e| e.to_string())
            }
            Term::PerYear { .. } => Ok(()),
            Term::ToggleMultiplier { toggle, multiplier } => {
                self.toggle(toggle).map_err(|e| e.to_string())?;
                validate_multiplier(&format!("{} multiplier", toggle), *multiplier)
                    .map_err(|e| e.to_string())
            }
        }
    }

    fn validate_condition(&self, condition: &Condition) -> Result<(), String> {
        match condition {
            Condition::SelectionIn { selection, keys } => {
                let known = self
                    .selection_keys(selection)
                    .ok_or_else(|| format!("unknown selection '{}'", selection))?;
                match keys.iter().find(|key| !known.contains(&key.as_str())) {
                    Some(key) => Err(format!("'{}' is not a key of {}", key, selection)),
                    None => Ok(()),
                }
            }
            Condition::FieldPositive { catalog, .. } => {
                self.catalog(catalog).map(|_| ()).map_err(|e| e.to_string())
            }
            Condition::InputPositive { input } => {
                self.input(input).map(|_| ()).map_err(|e| e.to_string())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
