//! # equicost Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  main.rs ────► widget_host::run()                                       │
//! │                                                                         │
//! │  lib.rs ─────► parses arguments, sets up logging, config, state         │
//! │  commands/ ──► list_calculators, describe_calculator, calculate         │
//! │  state/ ─────► RegistryState, WidgetState, HostConfig                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    widget_host::run()
}
