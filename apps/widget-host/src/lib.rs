//! # Widget Host
//!
//! The thin layer between embedded calculator widgets and `equicost-core`:
//! it owns the calculator registry, remembers each widget's current result,
//! reports completed calculations, and ships the `equicost` command line.
//!
//! ## Module Organization
//! ```text
//! widget_host/
//! ├── lib.rs          ◄─── You are here (Host setup & run)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── analytics.rs    ◄─── Best-effort calculation events
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── HostConfig (file + environment)
//! │   ├── registry.rs ◄─── RegistryState (atomic catalog swap)
//! │   └── widget.rs   ◄─── WidgetState (current result per widget)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── calculate.rs◄─── calculate, current_result
//! │   └── catalog.rs  ◄─── list / describe / reload
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Output Channels
//! Command output goes to stdout (JSON by default). Logs and errors go to
//! stderr, so `equicost calculate ... | jq` always sees clean JSON.

pub mod analytics;
pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use analytics::AnalyticsSink;
use cli::{CalculateArgs, Cli, Command, OutputFormat};
use commands::CalculateRequest;
use error::ApiError;
use state::{HostConfig, RegistryState, WidgetState};

/// Everything a command might need, built once at startup.
pub struct Host {
    pub config: HostConfig,
    pub registry: RegistryState,
    pub widgets: WidgetState,
    pub analytics: Box<dyn AnalyticsSink>,
}

impl Host {
    pub fn new(config: HostConfig) -> Result<Self, ApiError> {
        let registry = RegistryState::load(&config)?;
        let analytics = analytics::sink_for(config.analytics.enabled);
        info!(
            calculators = registry.snapshot().len(),
            analytics = config.analytics.enabled,
            "Host initialized"
        );
        Ok(Self {
            config,
            registry,
            widgets: WidgetState::new(),
            analytics,
        })
    }
}

/// Runs the `equicost` binary.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Parse arguments (clap)                                              │
/// │  2. Initialize logging (stderr, RUST_LOG)                               │
/// │  3. Load HostConfig                                                     │
/// │     • --config PATH: must load cleanly                                  │
/// │     • otherwise: platform config dir, falling back to defaults          │
/// │  4. Build state (registry with catalog_dir replacements, analytics)     │
/// │  5. Dispatch the command; print result on stdout                        │
/// │  6. On error: ApiError JSON on stderr, exit 1                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let stdout = std::io::stdout();
    match execute(cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.to_json());
            ExitCode::FAILURE
        }
    }
}

/// Loads config and state for `cli`, runs its command and writes to `out`.
pub fn execute(cli: Cli, out: &mut impl Write) -> Result<(), ApiError> {
    let config = match cli.config {
        Some(path) => HostConfig::load(Some(path))?,
        None => HostConfig::load_or_default(None),
    };
    let host = Host::new(config)?;
    dispatch(&host, cli.command, out)
}

/// Runs one command against an already built host.
pub fn dispatch(host: &Host, command: Command, out: &mut impl Write) -> Result<(), ApiError> {
    match command {
        Command::List => write_json(out, &commands::list_calculators(&host.registry)),
        Command::Describe { calculator } => write_json(
            out,
            &commands::describe_calculator(&host.registry, &calculator)?,
        ),
        Command::Calculate(args) => run_calculate(host, args, out),
        Command::Reload => write_json(
            out,
            &commands::reload_catalogs(&host.registry, &host.config)?,
        ),
    }
}

fn run_calculate(host: &Host, args: CalculateArgs, out: &mut impl Write) -> Result<(), ApiError> {
    let request = CalculateRequest {
        input: args.scenario()?,
        calculator: args.calculator,
        widget_id: None,
    };
    let response = commands::calculate(
        &host.registry,
        &host.widgets,
        host.analytics.as_ref(),
        request,
    )?;

    match args.format {
        OutputFormat::Json => write_json(out, &response),
        OutputFormat::Table => out
            .write_all(response.to_table(&host.config.output.currency_symbol).as_bytes())
            .map_err(|e| ApiError::internal(format!("Failed to write output: {}", e))),
    }
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<(), ApiError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::internal(format!("Failed to encode output: {}", e)))?;
    writeln!(out, "{}", json).map_err(|e| ApiError::internal(format!("Failed to write output: {}", e)))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=equicost_core=trace` - Per-line evaluation detail
/// - Default: INFO, DEBUG for the equicost crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,equicost_core=debug,widget_host=debug")
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
