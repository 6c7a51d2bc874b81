//! # Calculate Commands
//!
//! Running a calculation for a widget and reading back what it shows.
//!
//! ## Calculate Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CalculateRequest { calculator, widgetId?, input }                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  registry.snapshot() ──► Calculator::calculate(input)                   │
//! │         │                                                               │
//! │         ├──► widgets.replace(widget_id, result)    (last write wins)    │
//! │         ├──► analytics::report(result)             (best effort)        │
//! │         ▼                                                               │
//! │  CalculationResponse { result, breakdown, totals }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Write as _;

use equicost_core::{LineKind, Money, ScenarioInput, ScenarioResult, Totals};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics::{self, AnalyticsSink};
use crate::error::ApiError;
use crate::state::{RegistryState, WidgetState};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub calculator: String,

    /// Widget whose displayed result this replaces. `None` for one-shot use.
    #[serde(default)]
    pub widget_id: Option<String>,

    #[serde(default)]
    pub input: ScenarioInput,
}

/// A line item rounded to pence for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub id: String,
    pub label: String,
    pub category: String,
    pub kind: LineKind,
    pub optional: bool,
    pub amount: Money,
}

/// Period totals rounded to pence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownTotals {
    pub weekly: Money,
    pub monthly: Money,
    pub annual: Money,
    pub one_off: Money,
    pub first_year: Money,
    pub five_year: Money,
}

impl From<&Totals> for BreakdownTotals {
    fn from(totals: &Totals) -> Self {
        Self {
            weekly: Money::from_pounds(totals.weekly),
            monthly: Money::from_pounds(totals.monthly),
            annual: Money::from_pounds(totals.annual),
            one_off: Money::from_pounds(totals.one_off),
            first_year: Money::from_pounds(totals.first_year),
            five_year: Money::from_pounds(totals.five_year),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    /// Full-precision result.
    pub result: ScenarioResult,
    pub breakdown: Vec<BreakdownRow>,
    pub totals: BreakdownTotals,
}

impl CalculationResponse {
    pub fn from_result(result: ScenarioResult) -> Self {
        let breakdown = result
            .line_items
            .iter()
            .map(|item| BreakdownRow {
                id: item.id.clone(),
                label: item.label.clone(),
                category: item.category.clone(),
                kind: item.kind,
                optional: item.optional,
                amount: Money::from_pounds(item.annual_amount),
            })
            .collect();
        let totals = BreakdownTotals::from(&result.totals);
        Self {
            result,
            breakdown,
            totals,
        }
    }

    /// Plain-text breakdown table.
    pub fn to_table(&self, symbol: &str) -> String {
        let money = |m: Money| m.format_with_symbol(symbol);
        let mut out = String::new();

        let _ = writeln!(out, "{} ({})", self.result.calculator, self.result.version);
        for (selection, key) in &self.result.selections {
            let _ = writeln!(out, "  {:<18} {}", selection, key);
        }
        out.push('\n');

        for row in &self.breakdown {
            let suffix = match row.kind {
                LineKind::Recurring => "/yr",
                LineKind::OneOff => " once",
            };
            let _ = writeln!(
                out,
                "  {:<32} {:>12}{}",
                row.label,
                money(row.amount),
                suffix
            );
        }
        out.push('\n');

        let totals = &self.totals;
        for (label, amount) in [
            ("Weekly", totals.weekly),
            ("Monthly", totals.monthly),
            ("Annual", totals.annual),
            ("One-off", totals.one_off),
            ("First year", totals.first_year),
            ("Five years", totals.five_year),
        ] {
            let _ = writeln!(out, "  {:<32} {:>12}", label, money(amount));
        }

        for metric in &self.result.per_unit {
            let value = metric
                .value
                .map(|v| money(Money::from_pounds(v)))
                .unwrap_or_else(|| "n/a".to_string());
            let _ = writeln!(out, "  {:<32} {:>12}", metric.label, value);
        }

        if let Some(break_even) = &self.result.break_even {
            let units = break_even
                .units
                .map(|u| format!("{:.2}", u))
                .unwrap_or_else(|| "n/a".to_string());
            let _ = writeln!(out, "  {:<32} {:>12}", break_even.label, units);
            if let Some(occupancy) = break_even.occupancy {
                let _ = writeln!(out, "  {:<32} {:>11.1}%", "Occupancy", occupancy * 100.0);
            }
        }

        if !self.result.comparisons.is_empty() {
            out.push('\n');
            for entry in &self.result.comparisons {
                let delta = Money::from_pounds(entry.delta);
                let sign = if delta.is_negative() { "-" } else { "+" };
                let _ = writeln!(
                    out,
                    "  vs {:<29} {:>12}  ({}{})",
                    entry.label,
                    money(Money::from_pounds(entry.annual_amount)),
                    sign,
                    money(delta.abs())
                );
            }
        }

        out
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Calculates, stores the widget's current result and reports analytics.
pub fn calculate(
    registry: &RegistryState,
    widgets: &WidgetState,
    sink: &dyn AnalyticsSink,
    request: CalculateRequest,
) -> Result<CalculationResponse, ApiError> {
    debug!(calculator = %request.calculator, widget = ?request.widget_id, "calculate command");

    let snapshot = registry.snapshot();
    let result = snapshot.calculate(&request.calculator, &request.input)?;

    if let Some(widget_id) = &request.widget_id {
        widgets.replace(widget_id, result.clone());
    }
    analytics::report(sink, &result);

    Ok(CalculationResponse::from_result(result))
}

/// The result a widget is currently displaying.
pub fn current_result(
    widgets: &WidgetState,
    widget_id: &str,
) -> Result<CalculationResponse, ApiError> {
    debug!(widget = %widget_id, "current_result command");
    widgets
        .current(widget_id)
        .map(CalculationResponse::from_result)
        .ok_or_else(|| ApiError::not_found("Widget result", widget_id))
}

/// Drops the result of a widget that left the page.
///
/// Returns the result it was displaying.
pub fn close_widget(
    widgets: &WidgetState,
    widget_id: &str,
) -> Result<CalculationResponse, ApiError> {
    debug!(widget = %widget_id, "close_widget command");
    widgets
        .forget(widget_id)
        .map(CalculationResponse::from_result)
        .ok_or_else(|| ApiError::not_found("Widget result", widget_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::tests::RecordingSink;
    use crate::analytics::NullSink;
    use crate::error::ErrorCode;
    use crate::state::HostConfig;

    fn registry() -> RegistryState {
        RegistryState::load(&HostConfig::default()).unwrap()
    }

    fn bedding_request(widget_id: Option<&str>) -> CalculateRequest {
        CalculateRequest {
            calculator: "bedding".into(),
            widget_id: widget_id.map(String::from),
            input: ScenarioInput::new().select("bedding", "shavings"),
        }
    }

    #[test]
    fn test_calculate_stores_widget_result_and_reports() {
        let registry = registry();
        let widgets = WidgetState::new();
        let sink = RecordingSink::default();

        let response = calculate(&registry, &widgets, &sink, bedding_request(Some("w1"))).unwrap();

        assert_eq!(response.totals.annual, Money::from_pence(140_400));
        assert_eq!(response.breakdown[0].amount, Money::from_pence(140_400));
        assert_eq!(widgets.current("w1").unwrap(), response.result);

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].calculator, "bedding");
    }

    #[test]
    fn test_failing_analytics_does_not_change_result() {
        let registry = registry();
        let widgets = WidgetState::new();
        let failing = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };

        let with_failure = calculate(&registry, &widgets, &failing, bedding_request(None)).unwrap();
        let without = calculate(&registry, &widgets, &NullSink, bedding_request(None)).unwrap();
        assert_eq!(with_failure, without);
        assert!(widgets.is_empty());
    }

    #[test]
    fn test_unknown_calculator_is_not_found() {
        let request = CalculateRequest {
            calculator: "hay".into(),
            ..CalculateRequest::default()
        };
        let err = calculate(&registry(), &WidgetState::new(), &NullSink, request).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_current_result_for_unknown_widget() {
        let err = current_result(&WidgetState::new(), "nowhere").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_close_widget_frees_its_slot() {
        let registry = registry();
        let widgets = WidgetState::new();
        calculate(&registry, &widgets, &NullSink, bedding_request(Some("w1"))).unwrap();
        calculate(&registry, &widgets, &NullSink, bedding_request(Some("w2"))).unwrap();

        let closed = close_widget(&widgets, "w1").unwrap();
        assert_eq!(closed.totals.annual, Money::from_pence(140_400));
        assert_eq!(current_result(&widgets, "w1").unwrap_err().code, ErrorCode::NotFound);
        assert!(current_result(&widgets, "w2").is_ok());
        assert_eq!(close_widget(&widgets, "w1").unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_request_from_widget_json() {
        let request: CalculateRequest = serde_json::from_str(
            r#"{"calculator": "farrier", "widgetId": "side", "input": {"inputs": {"horses": "2"}}}"#,
        )
        .unwrap();
        assert_eq!(request.widget_id.as_deref(), Some("side"));
        assert_eq!(request.input.inputs.len(), 1);
    }

    #[test]
    fn test_table_rendering() {
        let registry = registry();
        let response = calculate(
            &registry,
            &WidgetState::new(),
            &NullSink,
            bedding_request(None),
        )
        .unwrap();
        let table = response.to_table("£");
        assert!(table.contains("£1404.00/yr"));
        assert!(table.contains("Weekly"));
        assert!(table.contains("£27.00"));
    }
}
