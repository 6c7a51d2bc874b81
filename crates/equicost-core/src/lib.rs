//! # equicost-core: The Shared Cost Estimation Model
//!
//! Every horse-keeping calculator (livery, bedding, farrier, field rent,
//! dental, yard break-even) is the same computation with different data:
//! a base rate picked from a small catalog, a chain of multiplicative
//! adjustments, optional toggled extras, and derived figures on top.
//! This crate is that computation, written once.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        equicost Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Widget (form + breakdown table)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ScenarioInput / ScenarioResult (JSON)  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 widget-host (commands, state, CLI)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ equicost-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   catalog ──┐                                                   │   │
//! │  │   factors ──┼──► scenario ──► aggregator ──► summarizer         │   │
//! │  │   rules ────┘                      └──────► comparator          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCKS • NO GLOBAL STATE • PURE FUNCTIONS         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (RateEntry, ScenarioInput, ScenarioResult, ...)
//! - [`catalog`] - Rate catalogs with stale-key fallback
//! - [`factors`] - Adjustment factor classes and order-independent composition
//! - [`rules`] - Declarative calculator definitions (TOML)
//! - [`scenario`] - Resolving raw input against a definition
//! - [`aggregator`] - Line items
//! - [`summarizer`] - Period totals, per-unit figures, break-even
//! - [`comparator`] - Alternative primary selections
//! - [`engine`] - The `calculate` pipeline
//! - [`registry`] - Built-in and replacement calculators by name
//! - [`money`] - Pence for display
//! - [`validation`] - Numeric coercion and definition checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use equicost_core::{Registry, ScenarioInput};
//!
//! let registry = Registry::builtin().unwrap();
//! let input = ScenarioInput::new()
//!     .select("bedding", "shavings")
//!     .select("stable_size", "standard");
//!
//! let result = registry.calculate("bedding", &input).unwrap();
//! assert_eq!(result.totals.weekly, 27.0);
//! assert_eq!(result.totals.annual, 1404.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregator;
pub mod catalog;
pub mod comparator;
pub mod engine;
pub mod error;
pub mod factors;
pub mod money;
pub mod registry;
pub mod rules;
pub mod scenario;
pub mod summarizer;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::RateCatalog;
pub use engine::Calculator;
pub use error::{ConfigError, CoreError, CoreResult, ValidationError};
pub use factors::FactorClass;
pub use money::Money;
pub use registry::Registry;
pub use rules::CalculatorConfig;
pub use types::*;
