//! # Widget State
//!
//! The result each embedded widget is currently displaying.
//!
//! ## Thread Safety
//! The map is behind a `Mutex` because several widgets on one page may
//! recalculate at once. Each widget owns exactly one slot; a newer result
//! simply replaces the older one (last write wins), so no widget ever shows
//! a mix of two calculations.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Widget Action            Command                 State Change          │
//! │  ─────────────            ───────                 ────────────          │
//! │                                                                         │
//! │  Change any field ──────► calculate() ──────────► slots[id] = result    │
//! │                                                                         │
//! │  Re-render ─────────────► current_result() ─────► (read only)           │
//! │                                                                         │
//! │  Widget removed ────────► forget() ─────────────► slots.remove(id)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use equicost_core::ScenarioResult;

#[derive(Debug, Default)]
pub struct WidgetState {
    slots: Mutex<HashMap<String, ScenarioResult>>,
}

impl WidgetState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A poisoned lock only means another command panicked mid-replace; the
    /// map itself is still a set of whole results.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, ScenarioResult>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `result` as the widget's current result.
    pub fn replace(&self, widget_id: &str, result: ScenarioResult) {
        self.lock().insert(widget_id.to_string(), result);
    }

    pub fn current(&self, widget_id: &str) -> Option<ScenarioResult> {
        self.lock().get(widget_id).cloned()
    }

    pub fn forget(&self, widget_id: &str) -> Option<ScenarioResult> {
        self.lock().remove(widget_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equicost_core::{Registry, ScenarioInput};

    fn result(bedding: &str) -> ScenarioResult {
        Registry::builtin()
            .unwrap()
            .calculate("bedding", &ScenarioInput::new().select("bedding", bedding))
            .unwrap()
    }

    #[test]
    fn test_last_write_wins() {
        let widgets = WidgetState::new();
        widgets.replace("sidebar", result("shavings"));
        widgets.replace("sidebar", result("straw"));

        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets.current("sidebar").unwrap().selections["bedding"], "straw");
    }

    #[test]
    fn test_widgets_are_independent() {
        let widgets = WidgetState::new();
        widgets.replace("a", result("hemp"));
        widgets.replace("b", result("paper"));

        assert_eq!(widgets.forget("a").unwrap().selections["bedding"], "hemp");
        assert!(widgets.current("a").is_none());
        assert_eq!(widgets.current("b").unwrap().selections["bedding"], "paper");
    }
}
