//! # Calculator Registry
//!
//! The set of calculators a host can serve, keyed by name.
//!
//! Built-in definitions are compiled into the crate with `include_str!`;
//! hosts may layer replacements on top (an annual price revision shipped as
//! a new TOML file). A registry is immutable once built. Hosts swap a whole
//! new registry in rather than editing one, so no reader ever sees half a
//! price revision.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::engine::Calculator;
use crate::error::{ConfigError, CoreError, CoreResult};
use crate::rules::CalculatorConfig;
use crate::types::{ScenarioInput, ScenarioResult};

/// Built-in calculator definitions as `(origin, toml)` pairs.
pub const BUILTIN_SOURCES: &[(&str, &str)] = &[
    ("builtin:bedding", include_str!("../calculators/bedding.toml")),
    ("builtin:farrier", include_str!("../calculators/farrier.toml")),
    ("builtin:dental", include_str!("../calculators/dental.toml")),
    ("builtin:livery", include_str!("../calculators/livery.toml")),
    ("builtin:field_rent", include_str!("../calculators/field_rent.toml")),
    ("builtin:yard_break_even", include_str!("../calculators/yard_break_even.toml")),
];

#[derive(Debug, Clone, Default)]
pub struct Registry {
    calculators: BTreeMap<String, Calculator>,
}

impl Registry {
    /// The calculators compiled into this crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_sources(BUILTIN_SOURCES.iter().copied())
    }

    /// Parses every source; two definitions with the same name are an error.
    pub fn from_sources<'s>(
        sources: impl IntoIterator<Item = (&'s str, &'s str)>,
    ) -> Result<Self, ConfigError> {
        let mut registry = Self::default();
        for (origin, text) in sources {
            let config = CalculatorConfig::from_toml(origin, text)?;
            if registry.calculators.contains_key(&config.name) {
                return Err(ConfigError::DuplicateCalculator(config.name));
            }
            registry.insert(config);
        }
        Ok(registry)
    }

    /// Adds `configs`, replacing any calculator with the same name.
    pub fn with_replacements(mut self, configs: impl IntoIterator<Item = CalculatorConfig>) -> Self {
        for config in configs {
            if self.calculators.contains_key(&config.name) {
                info!(calculator = %config.name, version = %config.version, "Replacing built-in calculator");
            }
            self.insert(config);
        }
        self
    }

    fn insert(&mut self, config: CalculatorConfig) {
        self.calculators
            .insert(config.name.clone(), Calculator::new(Arc::new(config)));
    }

    pub fn get(&self, name: &str) -> CoreResult<&Calculator> {
        self.calculators
            .get(name)
            .ok_or_else(|| CoreError::CalculatorNotFound(name.to_string()))
    }

    /// Calculators in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Calculator> {
        self.calculators.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.calculators.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }

    pub fn calculate(&self, name: &str, input: &ScenarioInput) -> CoreResult<ScenarioResult> {
        self.get(name)?.calculate(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_calculators_load() {
        let registry = Registry::builtin().unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            vec!["bedding", "dental", "farrier", "field_rent", "livery", "yard_break_even"]
        );
    }

    #[test]
    fn test_every_builtin_calculates_with_defaults() {
        let registry = Registry::builtin().unwrap();
        for calculator in registry.iter() {
            let result = calculator.calculate(&ScenarioInput::new()).unwrap();
            assert!(result.totals.annual > 0.0, "{} annual", calculator.name());
            assert!(result.line_items.iter().all(|item| item.annual_amount >= 0.0));
        }
    }

    #[test]
    fn test_unknown_calculator() {
        let registry = Registry::builtin().unwrap();
        assert!(matches!(
            registry.get("hay"),
            Err(CoreError::CalculatorNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_sources_rejected() {
        let (origin, text) = BUILTIN_SOURCES[0];
        let err = Registry::from_sources([(origin, text), ("copy", text)]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateCalculator(name) if name == "bedding"));
    }

    #[test]
    fn test_replacement_wins() {
        let (origin, text) = BUILTIN_SOURCES[0];
        let mut revised = CalculatorConfig::from_toml(origin, text).unwrap();
        revised.version = "2026.1".to_string();
        revised.catalogs[0].entries[0].base_rate = 10.0;

        let registry = Registry::builtin().unwrap().with_replacements([revised]);
        let calculator = registry.get("bedding").unwrap();
        assert_eq!(calculator.config().version, "2026.1");

        let result = calculator.calculate(&ScenarioInput::new()).unwrap();
        assert!((result.totals.annual - 10.0 * 3.0 * 52.0).abs() < 1e-9);
    }
}
