//! # Commands Module
//!
//! Every operation a widget page (or the CLI) can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── calculate.rs  ◄─── calculate, current_result, close_widget
//! └── catalog.rs    ◄─── list_calculators, describe_calculator, reload_catalogs
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the registry
//! fn list_calculators(registry: &RegistryState)
//!
//! // Only needs widget slots
//! fn current_result(widgets: &WidgetState, widget_id: &str)
//!
//! // Needs all three
//! fn calculate(registry: &RegistryState, widgets: &WidgetState, sink: &dyn AnalyticsSink, ...)
//! ```

pub mod calculate;
pub mod catalog;

pub use calculate::{
    calculate, close_widget, current_result, BreakdownRow, BreakdownTotals, CalculateRequest,
    CalculationResponse,
};
pub use catalog::{
    describe_calculator, list_calculators, reload_catalogs, CalculatorDescription,
    CalculatorSummary,
};
