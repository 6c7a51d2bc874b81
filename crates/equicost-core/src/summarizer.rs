//! # Result Summarizer
//!
//! Period conversions, per-unit figures and break-even thresholds derived
//! from a calculator's line items.
//!
//! ## Derived Figures
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  annual      Σ recurring lines                                          │
//! │  weekly      annual / 52                                                │
//! │  monthly     annual / 12           (annual_over_twelve)                 │
//! │              weekly × 4.33         (weekly_times_4_33)                  │
//! │  first_year  annual + Σ one-off                                         │
//! │  five_year   annual × 5 + Σ one-off                                     │
//! │                                                                         │
//! │  per unit    basis / divisor        divisor ≤ 0  ──► None               │
//! │  break-even  basis / unit price     price ≤ 0    ──► None               │
//! │  occupancy   break-even / capacity  capacity ≤ 0 ──► None               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A zero divisor is an ordinary transient state (the user cleared "number
//! of horses" while typing), so it omits the metric instead of failing.
//! Break-even units are never rounded: 11.3 stables is an occupancy rate.

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::rules::{BreakEvenSpec, CostBasis, PerUnitSpec};
use crate::scenario::ResolvedScenario;
use crate::types::{BreakEven, LineItem, LineKind, MonthConvention, PerUnitMetric, Totals, WEEKS_PER_MONTH};

const WEEKS_PER_YEAR: f64 = 52.0;
const MONTHS_PER_YEAR: f64 = 12.0;
const PROJECTION_YEARS: f64 = 5.0;

/// Monthly figure for an annual amount under `convention`.
pub fn monthly(annual: f64, convention: MonthConvention) -> f64 {
    match convention {
        MonthConvention::AnnualOverTwelve => annual / MONTHS_PER_YEAR,
        MonthConvention::WeeklyTimesFourPointThreeThree => {
            annual / WEEKS_PER_YEAR * WEEKS_PER_MONTH
        }
    }
}

/// Period conversions of `items`.
///
/// ## Example
/// ```rust
/// use equicost_core::summarizer::totals;
/// use equicost_core::types::{LineItem, LineKind, MonthConvention};
///
/// let line = |amount, kind| LineItem {
///     id: "x".into(),
///     label: "x".into(),
///     category: "x".into(),
///     annual_amount: amount,
///     kind,
///     optional: false,
///     included_by_default: true,
/// };
/// let items = [line(1404.0, LineKind::Recurring), line(1500.0, LineKind::OneOff)];
/// let totals = totals(&items, MonthConvention::AnnualOverTwelve);
///
/// assert_eq!(totals.weekly, 27.0);
/// assert_eq!(totals.monthly, 117.0);
/// assert_eq!(totals.first_year, 2904.0);
/// assert_eq!(totals.five_year, 1404.0 * 5.0 + 1500.0);
/// ```
pub fn totals(items: &[LineItem], convention: MonthConvention) -> Totals {
    let sum_of = |kind: LineKind| -> f64 {
        items
            .iter()
            .filter(|item| item.kind == kind)
            .map(|item| item.annual_amount)
            .sum()
    };
    let annual = sum_of(LineKind::Recurring);
    let one_off = sum_of(LineKind::OneOff);

    Totals {
        weekly: annual / WEEKS_PER_YEAR,
        monthly: monthly(annual, convention),
        annual,
        one_off,
        first_year: annual + one_off,
        five_year: annual * PROJECTION_YEARS + one_off,
    }
}

/// `numerator / divisor`, or `DivisionByZero` when the divisor is not a
/// positive finite number.
pub fn divide(metric: &str, numerator: f64, divisor: f64) -> CoreResult<f64> {
    if divisor > 0.0 && divisor.is_finite() {
        Ok(numerator / divisor)
    } else {
        Err(CoreError::DivisionByZero {
            metric: metric.to_string(),
        })
    }
}

fn basis_total(totals: &Totals, basis: CostBasis) -> f64 {
    match basis {
        CostBasis::RecurringAnnual => totals.annual,
        CostBasis::FirstYear => totals.first_year,
    }
}

/// Like [`divide`], with the zero-divisor case logged and turned into `None`.
fn skip_on_zero(metric: &str, numerator: f64, divisor: f64) -> Option<f64> {
    match divide(metric, numerator, divisor) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(error = %err, "Metric not applicable");
            None
        }
    }
}

pub fn per_unit(
    specs: &[PerUnitSpec],
    totals: &Totals,
    scenario: &ResolvedScenario<'_>,
) -> CoreResult<Vec<PerUnitMetric>> {
    specs
        .iter()
        .map(|spec| {
            let divisor = scenario.product(&spec.divisor)?;
            Ok(PerUnitMetric {
                id: spec.id.clone(),
                label: spec.label.clone(),
                divisor,
                value: skip_on_zero(&spec.id, basis_total(totals, spec.basis), divisor),
            })
        })
        .collect()
}

/// Units needed at the configured unit price to cover the costs.
///
/// `total_cost == units × unit_price` holds to floating-point precision.
pub fn break_even(
    spec: &BreakEvenSpec,
    totals: &Totals,
    scenario: &ResolvedScenario<'_>,
) -> CoreResult<BreakEven> {
    let total_cost = basis_total(totals, spec.basis);
    let unit_price = scenario.product(&spec.unit_price)?;
    let units = skip_on_zero("break_even", total_cost, unit_price);

    let occupancy = match (&spec.capacity, units) {
        (Some(capacity), Some(units)) => {
            let capacity = scenario.product(capacity)?;
            skip_on_zero("occupancy", units, capacity)
        }
        _ => None,
    };

    Ok(BreakEven {
        label: spec.label.clone(),
        total_cost,
        unit_price,
        units,
        occupancy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn item(amount: f64, kind: LineKind) -> LineItem {
        LineItem {
            id: "line".to_string(),
            label: "Line".to_string(),
            category: "test".to_string(),
            annual_amount: amount,
            kind,
            optional: false,
            included_by_default: true,
        }
    }

    #[test]
    fn test_month_conventions_differ_slightly() {
        let a = monthly(1404.0, MonthConvention::AnnualOverTwelve);
        let b = monthly(1404.0, MonthConvention::WeeklyTimesFourPointThreeThree);
        assert_relative_eq!(a, 117.0);
        assert_relative_eq!(b, 116.91, epsilon = 1e-9);
        assert!((a - b) / a < 0.003);
    }

    #[test]
    fn test_one_off_kept_out_of_recurring_totals() {
        let items = [
            item(100.0, LineKind::Recurring),
            item(50.0, LineKind::Recurring),
            item(1500.0, LineKind::OneOff),
        ];
        let totals = totals(&items, MonthConvention::AnnualOverTwelve);
        assert_relative_eq!(totals.annual, 150.0);
        assert_relative_eq!(totals.one_off, 1500.0);
        assert_relative_eq!(totals.first_year, 1650.0);
        assert_relative_eq!(totals.five_year, 2250.0);
    }

    #[test]
    fn test_empty_items_are_zero() {
        let totals = totals(&[], MonthConvention::AnnualOverTwelve);
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(divide("per_horse", 130.0, 2.0).unwrap(), 65.0);
        assert!(matches!(
            divide("per_horse", 130.0, 0.0),
            Err(CoreError::DivisionByZero { .. })
        ));
        assert!(divide("per_horse", 130.0, -1.0).is_err());
        assert!(divide("per_horse", 130.0, f64::NAN).is_err());
        assert_eq!(skip_on_zero("per_horse", 130.0, 0.0), None);
    }
}
