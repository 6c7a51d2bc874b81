//! # Scenario Comparator
//!
//! Reruns the aggregation with a different primary-catalog entry and
//! everything else held constant. The one exception is an override of a
//! price or quantity read from the primary entry: it describes the current
//! choice, so the alternative uses its own catalog figure.
//!
//! ```text
//! primary:  shavings, large stable, London, bulk on      ──► £1,650 / yr
//!
//! straw     (same stable, region, toggles, overrides)   ──► £1,100 / yr  Δ -550
//! hemp      (same stable, region, toggles, overrides)   ──► £2,020 / yr  Δ +370
//! ```
//!
//! Alternatives are compared only against the primary, never against each
//! other. `delta` is on recurring annual totals; one-off setup costs are
//! reported by the primary result's first-year figure, not the delta.

use std::collections::BTreeSet;

use tracing::warn;

use crate::aggregator::aggregate;
use crate::error::CoreResult;
use crate::scenario::ResolvedScenario;
use crate::summarizer::totals;
use crate::types::{ComparisonEntry, ScenarioResult};

/// `compare(primaryResult, alternativeKeys[]) -> ComparisonEntry[]`.
///
/// ## Skipped Keys
/// - the primary's own key (a zero delta tells the user nothing)
/// - repeats of an already compared key
/// - keys missing from the catalog (WARN; a stale widget setting)
pub fn compare(
    scenario: &ResolvedScenario<'_>,
    primary: &ScenarioResult,
    alternatives: &[String],
) -> CoreResult<Vec<ComparisonEntry>> {
    let config = scenario.config();
    let current = scenario.primary_entry()?.key.as_str();
    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();

    for key in alternatives {
        if key == current || !seen.insert(key.as_str()) {
            continue;
        }

        let alternative = match scenario.with_primary(key) {
            Ok(alternative) => alternative,
            Err(err) if err.is_not_found() => {
                warn!(calculator = %config.name, key = %key, error = %err, "Skipping comparison");
                continue;
            }
            Err(err) => return Err(err),
        };

        let items = aggregate(&alternative)?;
        let annual_amount = totals(&items, primary.month_convention).annual;

        entries.push(ComparisonEntry {
            key: key.clone(),
            label: alternative.primary_entry()?.label.clone(),
            annual_amount,
            delta: annual_amount - primary.totals.annual,
        });
    }

    Ok(entries)
}
