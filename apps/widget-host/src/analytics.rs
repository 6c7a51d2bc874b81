//! # Analytics Sink
//!
//! Best-effort reporting of completed calculations.
//!
//! The sink is called after the result has been computed and stored. A
//! failing sink is logged at DEBUG and otherwise ignored: it can never
//! change or delay what the widget shows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use equicost_core::ScenarioResult;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Analytics sink unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to encode analytics event: {0}")]
    Encode(String),
}

/// One completed calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationEvent {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub calculator: String,
    pub selections: BTreeMap<String, String>,
    pub annual_total: f64,
}

impl CalculationEvent {
    pub fn from_result(result: &ScenarioResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            at: Utc::now(),
            calculator: result.calculator.clone(),
            selections: result.selections.clone(),
            annual_total: result.totals.annual,
        }
    }
}

pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: &CalculationEvent) -> Result<(), SinkError>;
}

/// Emits each event as an INFO log line.
#[derive(Debug, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn record(&self, event: &CalculationEvent) -> Result<(), SinkError> {
        let selections =
            serde_json::to_string(&event.selections).map_err(|e| SinkError::Encode(e.to_string()))?;
        info!(
            event_id = %event.id,
            calculator = %event.calculator,
            selections = %selections,
            annual_total = event.annual_total,
            "Calculation recorded"
        );
        Ok(())
    }
}

/// Drops every event. Used when analytics is disabled.
#[derive(Debug, Default)]
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn record(&self, _event: &CalculationEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// The sink for a host config.
pub fn sink_for(enabled: bool) -> Box<dyn AnalyticsSink> {
    if enabled {
        Box::new(TracingSink)
    } else {
        Box::new(NullSink)
    }
}

/// Records `result`, swallowing any sink failure.
pub fn report(sink: &dyn AnalyticsSink, result: &ScenarioResult) {
    let event = CalculationEvent::from_result(result);
    if let Err(e) = sink.record(&event) {
        debug!(event_id = %event.id, "Analytics event dropped: {}", e);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every event; optionally fails instead.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub events: Mutex<Vec<CalculationEvent>>,
        pub fail: bool,
    }

    impl AnalyticsSink for RecordingSink {
        fn record(&self, event: &CalculationEvent) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::Unavailable("offline".into()));
            }
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    #[test]
    fn test_event_carries_result_summary() {
        let result = equicost_core::Registry::builtin()
            .unwrap()
            .calculate("bedding", &equicost_core::ScenarioInput::new())
            .unwrap();
        let event = CalculationEvent::from_result(&result);

        assert_eq!(event.calculator, "bedding");
        assert_eq!(event.selections["bedding"], "shavings");
        assert_eq!(event.annual_total, result.totals.annual);
        assert_eq!(event.id.get_version_num(), 4);
    }

    #[test]
    fn test_failing_sink_is_swallowed() {
        let result = equicost_core::Registry::builtin()
            .unwrap()
            .calculate("farrier", &equicost_core::ScenarioInput::new())
            .unwrap();
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        report(&sink, &result);
        assert!(sink.events.lock().unwrap().is_empty());
    }
}
