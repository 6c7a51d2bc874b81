//! # Line-Item Aggregator
//!
//! Evaluates a calculator's line rules against a resolved scenario.
//!
//! ## Per Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  toggle off?              ──► skip (optional extra not chosen)          │
//! │  `when` condition false?  ──► skip (e.g. no setup cost for straw)       │
//! │                                                                         │
//! │  rate     = override(rate_override)     or product(rate terms)          │
//! │  quantity = override(quantity_override) or product(quantity terms)      │
//! │  amount   = rate × quantity × product(adjust terms)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A zero rate or quantity is a valid line (rubber matting needs almost no
//! recurring bedding), never an error. Output order follows the definition.

use tracing::trace;

use crate::error::CoreResult;
use crate::rules::LineRule;
use crate::scenario::ResolvedScenario;
use crate::types::LineItem;

/// `aggregate(ScenarioInput) -> LineItem[]` over an already-resolved scenario.
pub fn aggregate(scenario: &ResolvedScenario<'_>) -> CoreResult<Vec<LineItem>> {
    let config = scenario.config();
    let mut items = Vec::with_capacity(config.line_items.len());

    for rule in &config.line_items {
        if let Some(toggle) = &rule.toggle {
            if !scenario.toggle(toggle)? {
                continue;
            }
        }
        if let Some(condition) = &rule.when {
            if !scenario.holds(condition)? {
                continue;
            }
        }

        let annual_amount = line_amount(rule, scenario)?;
        trace!(line = %rule.id, annual_amount, "Line evaluated");

        let included_by_default = match &rule.toggle {
            Some(toggle) => config.toggle(toggle)?.default,
            None => true,
        };

        items.push(LineItem {
            id: rule.id.clone(),
            label: rule.label.clone(),
            category: rule.category.clone(),
            annual_amount,
            kind: rule.kind,
            optional: rule.optional,
            included_by_default,
        });
    }

    Ok(items)
}

/// Annual amount of one rule, overrides applied.
pub fn line_amount(rule: &LineRule, scenario: &ResolvedScenario<'_>) -> CoreResult<f64> {
    let rate = match scenario.override_value(rule.rate_override.as_deref()) {
        Some(value) => value,
        None => scenario.product(&rule.rate)?,
    };
    let quantity = match scenario.override_value(rule.quantity_override.as_deref()) {
        Some(value) => value,
        None => scenario.product(&rule.quantity)?,
    };
    let adjust = scenario.product(&rule.adjust)?;

    Ok(rate * quantity * adjust)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::types::{LineKind, ScenarioInput};

    fn items(calculator: &str, input: &ScenarioInput) -> Vec<LineItem> {
        let registry = Registry::builtin().unwrap();
        let config = registry.get(calculator).unwrap().config().clone();
        let scenario = ResolvedScenario::resolve(&config, input).unwrap();
        aggregate(&scenario).unwrap()
    }

    #[test]
    fn test_primary_line_for_default_bedding() {
        let items = items("bedding", &ScenarioInput::new());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "bedding");
        assert!((items[0].annual_amount - 1404.0).abs() < 1e-9);
        assert!(!items[0].optional);
        assert!(items[0].included_by_default);
    }

    #[test]
    fn test_optional_lines_follow_toggles() {
        let input = ScenarioInput::new().toggle("muck_disposal", true);
        let items = items("bedding", &input);
        let disposal = items.iter().find(|item| item.id == "muck_disposal").unwrap();
        assert!(disposal.optional);
        assert!(!disposal.included_by_default);
        assert!(disposal.annual_amount > 0.0);
    }

    #[test]
    fn test_setup_cost_is_one_off_and_conditional() {
        let matting = items("bedding", &ScenarioInput::new().select("bedding", "rubber_matting"));
        let setup = matting.iter().find(|item| item.id == "setup").unwrap();
        assert_eq!(setup.kind, LineKind::OneOff);
        assert!((setup.annual_amount - 1500.0).abs() < 1e-9);

        let straw = items("bedding", &ScenarioInput::new().select("bedding", "straw"));
        assert!(straw.iter().all(|item| item.id != "setup"));
    }

    #[test]
    fn test_quantity_override_replaces_whole_product() {
        // 5 bags a week regardless of stable size or keeping pattern
        let input = ScenarioInput::new()
            .select("stable_size", "large")
            .with_override("bags_per_week", 5.0);
        let items = items("bedding", &input);
        assert!((items[0].annual_amount - 9.0 * 5.0 * 52.0).abs() < 1e-9);
    }
}
