//! # State Module
//!
//! Host state, split by concern so each command asks only for what it uses.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │  RegistryState   │  │   WidgetState    │  │     HostConfig       │  │
//! │  │                  │  │                  │  │                      │  │
//! │  │  RwLock<Arc<     │  │  Mutex<HashMap<  │  │  catalog_dir         │  │
//! │  │    Registry      │  │    widget_id,    │  │  analytics.enabled   │  │
//! │  │  >>              │  │    result>>      │  │  currency_symbol     │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • RegistryState: readers clone the Arc; reload swaps it whole         │
//! │  • WidgetState: one slot per widget, replaced under the Mutex          │
//! │  • HostConfig: read-only after startup                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod registry;
mod widget;

pub use config::{AnalyticsConfig, HostConfig, HostConfigError, OutputConfig};
pub(crate) use config::parse_flag;
pub use registry::RegistryState;
pub use widget::WidgetState;
