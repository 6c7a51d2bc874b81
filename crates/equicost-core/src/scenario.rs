//! # Scenario Resolution
//!
//! Turns a raw [`ScenarioInput`] into a [`ResolvedScenario`]: every catalog
//! and factor class pinned to one entry, every input coerced to a number,
//! every toggle decided, every usable override parsed.
//!
//! ```text
//! ScenarioInput (raw)                    ResolvedScenario
//! ─────────────────────                  ─────────────────────────────
//! selections { bedding: "sawdust" } ──►  bedding     → shavings  (WARN, default)
//!            { }                    ──►  region      → average   (baseline)
//! inputs     { horses: "" }         ──►  horses      = 1.0       (fallback)
//! toggles    { }                    ──►  bulk        = false     (declared default)
//! overrides  { bag_price: "-2" }    ──►  (dropped, DEBUG)
//! ```
//!
//! Resolution is the only place user data is interpreted. The aggregator,
//! summarizer and comparator evaluate [`Term`]s against the resolved view and
//! never see raw values.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::factors::compose;
use crate::rules::{CalculatorConfig, Condition, Term};
use crate::types::{AdjustmentFactor, RateEntry, ScenarioInput};
use crate::validation::{coerce_number, parse_override};

/// A scenario with every selection, input, toggle and override decided.
#[derive(Debug, Clone)]
pub struct ResolvedScenario<'a> {
    config: &'a CalculatorConfig,
    entries: BTreeMap<&'a str, &'a RateEntry>,
    factors: BTreeMap<&'a str, &'a AdjustmentFactor>,
    inputs: BTreeMap<&'a str, f64>,
    toggles: BTreeMap<&'a str, bool>,
    overrides: BTreeMap<&'a str, f64>,
}

impl<'a> ResolvedScenario<'a> {
    /// Resolves `input` against `config`.
    ///
    /// Stale keys fall back to the catalog default or factor baseline; only a
    /// definition whose own default is missing fails.
    pub fn resolve(config: &'a CalculatorConfig, input: &ScenarioInput) -> CoreResult<Self> {
        let mut entries = BTreeMap::new();
        for catalog in &config.catalogs {
            let selected = input.selections.get(&catalog.name).map(String::as_str);
            entries.insert(catalog.name.as_str(), catalog.lookup_or_default(selected)?);
        }

        let mut factors = BTreeMap::new();
        for class in &config.factor_classes {
            let selected = input.selections.get(&class.name).map(String::as_str);
            factors.insert(class.name.as_str(), class.factor_or_baseline(selected)?);
        }

        for name in input.selections.keys() {
            if !entries.contains_key(name.as_str()) && !factors.contains_key(name.as_str()) {
                debug!(calculator = %config.name, selection = %name, "Ignoring undeclared selection");
            }
        }

        let inputs = config
            .inputs
            .iter()
            .map(|spec| {
                let value = coerce_number(input.inputs.get(&spec.name), spec.min, spec.default);
                (spec.name.as_str(), value)
            })
            .collect();

        let toggles = config
            .toggles
            .iter()
            .map(|spec| {
                let on = input.toggles.get(&spec.name).copied().unwrap_or(spec.default);
                (spec.name.as_str(), on)
            })
            .collect();

        let mut overrides = BTreeMap::new();
        for spec in &config.overrides {
            let Some(raw) = input.overrides.get(&spec.name) else {
                continue;
            };
            match parse_override(&spec.name, raw) {
                Ok(value) => {
                    overrides.insert(spec.name.as_str(), value);
                }
                Err(err) => {
                    debug!(calculator = %config.name, error = %err, "Using computed value");
                }
            }
        }

        Ok(Self {
            config,
            entries,
            factors,
            inputs,
            toggles,
            overrides,
        })
    }

    /// A copy with the primary catalog pinned to `key`.
    ///
    /// Strict: an unknown `key` is `EntryNotFound`, since a comparison
    /// against a silently substituted default would be meaningless.
    /// Overrides of groups that read the primary entry belong to the old
    /// entry and are dropped; every other override is kept.
    pub fn with_primary(&self, key: &str) -> CoreResult<Self> {
        let primary = self.config.primary()?;
        let entry = primary.lookup(key)?;
        let mut scenario = self.clone();
        scenario.entries.insert(primary.name.as_str(), entry);

        for rule in &self.config.line_items {
            for name in rule.overrides_reading(&primary.name) {
                if scenario.overrides.remove(name).is_some() {
                    debug!(
                        calculator = %self.config.name,
                        key = %key,
                        override_name = %name,
                        "Override not carried to alternative"
                    );
                }
            }
        }
        Ok(scenario)
    }

    pub fn config(&self) -> &'a CalculatorConfig {
        self.config
    }

    /// The selected entry of `catalog`.
    pub fn entry(&self, catalog: &str) -> CoreResult<&'a RateEntry> {
        self.entries
            .get(catalog)
            .copied()
            .ok_or_else(|| CoreError::CatalogNotFound(catalog.to_string()))
    }

    pub fn primary_entry(&self) -> CoreResult<&'a RateEntry> {
        self.entry(&self.config.primary_catalog)
    }

    /// The selected factor of `class`.
    pub fn factor(&self, class: &str) -> CoreResult<&'a AdjustmentFactor> {
        self.factors
            .get(class)
            .copied()
            .ok_or_else(|| CoreError::FactorClassNotFound(class.to_string()))
    }

    pub fn input(&self, name: &str) -> CoreResult<f64> {
        self.inputs
            .get(name)
            .copied()
            .ok_or_else(|| CoreError::UnknownInput(name.to_string()))
    }

    pub fn toggle(&self, name: &str) -> CoreResult<bool> {
        self.toggles
            .get(name)
            .copied()
            .ok_or_else(|| CoreError::UnknownToggle(name.to_string()))
    }

    /// A valid override value, if `name` is set and one was supplied.
    pub fn override_value(&self, name: Option<&str>) -> Option<f64> {
        name.and_then(|name| self.overrides.get(name).copied())
    }

    /// Evaluates one term.
    pub fn eval(&self, term: &Term) -> CoreResult<f64> {
        let value = match term {
            Term::Constant { value } => *value,
            Term::Rate { catalog } => match catalog {
                Some(catalog) => self.entry(catalog)?.base_rate,
                None => self.primary_entry()?.base_rate,
            },
            Term::Field { catalog, field } => self.entry(catalog)?.field(field),
            Term::Factor { class } => self.factor(class)?.multiplier,
            Term::FactorField { class, field } => self.factor(class)?.field(field),
            Term::Input { name } => self.input(name)?,
            Term::PerYear { period } => period.per_year(),
            Term::IntervalPerYear { input, period } => {
                let interval = self.input(input)?;
                if interval > 0.0 {
                    (period.per_year() / interval).ceil()
                } else {
                    0.0
                }
            }
            Term::ToggleMultiplier { toggle, multiplier } => {
                if self.toggle(toggle)? {
                    *multiplier
                } else {
                    1.0
                }
            }
        };
        Ok(value)
    }

    /// Product of `terms` in canonical order; empty is 1.
    pub fn product(&self, terms: &[Term]) -> CoreResult<f64> {
        let values = terms
            .iter()
            .map(|term| self.eval(term))
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(compose(values))
    }

    pub fn holds(&self, condition: &Condition) -> CoreResult<bool> {
        match condition {
            Condition::SelectionIn { selection, keys } => {
                let selected = match self.entries.get(selection.as_str()) {
                    Some(entry) => entry.key.as_str(),
                    None => self.factor(selection)?.key.as_str(),
                };
                Ok(keys.iter().any(|key| key == selected))
            }
            Condition::FieldPositive { catalog, field } => {
                Ok(self.entry(catalog)?.field(field) > 0.0)
            }
            Condition::InputPositive { input } => Ok(self.input(input)? > 0.0),
        }
    }

    /// Every selection after defaults and fallbacks, catalogs and factor
    /// classes together.
    pub fn selections(&self) -> BTreeMap<String, String> {
        let catalogs = self
            .entries
            .iter()
            .map(|(name, entry)| (name.to_string(), entry.key.clone()));
        let factors = self
            .factors
            .iter()
            .map(|(name, factor)| (name.to_string(), factor.key.clone()));
        catalogs.chain(factors).collect()
    }
}
