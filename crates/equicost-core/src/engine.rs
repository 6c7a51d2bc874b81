//! # Calculator Engine
//!
//! One generic engine, parameterized by a [`CalculatorConfig`].
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ScenarioInput                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ResolvedScenario::resolve   defaults, stale keys, coercion, overrides  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  aggregator::aggregate       LineItem[]                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Calculator::summarize       totals, per unit, break-even               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  comparator::compare         input keys, else calculator defaults       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ScenarioResult                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `calculate` touches no clock, no randomness and only ordered maps, so the
//! same input against the same definition yields a bit-identical result.

use std::sync::Arc;

use tracing::debug;

use crate::aggregator;
use crate::comparator;
use crate::error::{ConfigError, CoreResult};
use crate::rules::CalculatorConfig;
use crate::scenario::ResolvedScenario;
use crate::summarizer;
use crate::types::{ComparisonEntry, LineItem, ScenarioInput, ScenarioResult};

/// A loaded calculator. Cheap to clone; the definition is shared.
#[derive(Debug, Clone)]
pub struct Calculator {
    config: Arc<CalculatorConfig>,
}

impl Calculator {
    /// Wraps an already validated definition.
    pub fn new(config: Arc<CalculatorConfig>) -> Self {
        Self { config }
    }

    /// Parses, validates and wraps a TOML definition.
    pub fn from_toml(origin: &str, text: &str) -> Result<Self, ConfigError> {
        CalculatorConfig::from_toml(origin, text).map(|config| Self::new(Arc::new(config)))
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Line items for `input`, with no derived figures.
    pub fn aggregate(&self, input: &ScenarioInput) -> CoreResult<Vec<LineItem>> {
        let scenario = ResolvedScenario::resolve(&self.config, input)?;
        aggregator::aggregate(&scenario)
    }

    /// Builds a result from line items: totals, per-unit and break-even.
    ///
    /// Comparisons are left empty; see [`Calculator::compare`].
    pub fn summarize(
        &self,
        scenario: &ResolvedScenario<'_>,
        line_items: Vec<LineItem>,
    ) -> CoreResult<ScenarioResult> {
        let summary = &self.config.summary;
        let totals = summarizer::totals(&line_items, summary.month_convention);
        let per_unit = summarizer::per_unit(&summary.per_unit, &totals, scenario)?;
        let break_even = summary
            .break_even
            .as_ref()
            .map(|spec| summarizer::break_even(spec, &totals, scenario))
            .transpose()?;

        Ok(ScenarioResult {
            calculator: self.config.name.clone(),
            version: self.config.version.clone(),
            selections: scenario.selections(),
            line_items,
            totals,
            month_convention: summary.month_convention,
            per_unit,
            break_even,
            comparisons: Vec::new(),
        })
    }

    /// Compares `primary` (computed from `input`) against `alternatives`.
    pub fn compare(
        &self,
        input: &ScenarioInput,
        primary: &ScenarioResult,
        alternatives: &[String],
    ) -> CoreResult<Vec<ComparisonEntry>> {
        let scenario = ResolvedScenario::resolve(&self.config, input)?;
        comparator::compare(&scenario, primary, alternatives)
    }

    /// `calculate(inputs: ScenarioInput) -> ScenarioResult`.
    pub fn calculate(&self, input: &ScenarioInput) -> CoreResult<ScenarioResult> {
        let scenario = ResolvedScenario::resolve(&self.config, input)?;
        let line_items = aggregator::aggregate(&scenario)?;
        let mut result = self.summarize(&scenario, line_items)?;

        let alternatives = if input.compare_against.is_empty() {
            &self.config.compare_against
        } else {
            &input.compare_against
        };
        result.comparisons = comparator::compare(&scenario, &result, alternatives)?;

        debug!(
            calculator = %self.config.name,
            version = %self.config.version,
            lines = result.line_items.len(),
            annual = result.totals.annual,
            comparisons = result.comparisons.len(),
            "Calculation complete"
        );

        Ok(result)
    }
}
