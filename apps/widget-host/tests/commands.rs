//! End-to-end runs of the `equicost` commands against a real host.

use std::path::PathBuf;

use clap::Parser;
use widget_host::cli::Cli;
use widget_host::error::ErrorCode;
use widget_host::state::HostConfig;
use widget_host::{dispatch, execute, Host};

fn host() -> Host {
    let config = HostConfig {
        analytics: widget_host::state::AnalyticsConfig { enabled: false },
        ..HostConfig::default()
    };
    Host::new(config).expect("host starts with built-ins")
}

fn run(host: &Host, args: &[&str]) -> Result<String, widget_host::error::ApiError> {
    let cli = Cli::try_parse_from(std::iter::once("equicost").chain(args.iter().copied()))
        .expect("arguments parse");
    let mut out = Vec::new();
    dispatch(host, cli.command, &mut out)?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("equicost-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn list_outputs_every_builtin() {
    let out = run(&host(), &["list"]).unwrap();
    let list: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 6);
    assert_eq!(list[0]["name"], "bedding");
    assert_eq!(list[0]["version"], "2025.1");
}

#[test]
fn calculate_json_carries_result_and_pence_breakdown() {
    let out = run(
        &host(),
        &["calculate", "farrier", "--override", "cost_per_visit=100", "--set", "frequency_weeks=6"],
    )
    .unwrap();
    let response: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(response["result"]["totals"]["annual"], 900.0);
    assert_eq!(response["totals"]["annual"], 90_000);
    assert_eq!(response["breakdown"][0]["id"], "routine");
}

#[test]
fn calculate_table_uses_configured_symbol() {
    let host = Host::new(HostConfig {
        output: widget_host::state::OutputConfig {
            currency_symbol: "€".into(),
        },
        ..HostConfig::default()
    })
    .unwrap();
    let out = run(&host, &["calculate", "dental", "--set", "horses=2", "--format", "table"]).unwrap();

    assert!(out.contains("€130.00"));
    assert!(out.contains("vs "));
}

#[test]
fn unknown_calculator_is_not_found() {
    let err = run(&host(), &["describe", "hay"]).unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    let json: serde_json::Value = serde_json::from_str(&err.to_json()).unwrap();
    assert_eq!(json["code"], "NOT_FOUND");
}

#[test]
fn stale_selection_still_calculates() {
    let out = run(&host(), &["calculate", "bedding", "--select", "bedding=sawdust"]).unwrap();
    let response: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(response["result"]["selections"]["bedding"], "shavings");
}

#[test]
fn explicit_config_with_catalog_dir_replaces_builtin() {
    let dir = scratch_dir();
    let catalog_dir = dir.join("calculators");
    std::fs::create_dir_all(&catalog_dir).unwrap();

    let builtin = equicost_core::registry::BUILTIN_SOURCES
        .iter()
        .find(|(origin, _)| *origin == "builtin:livery")
        .map(|(_, text)| *text)
        .unwrap();
    std::fs::write(
        catalog_dir.join("livery.toml"),
        builtin.replacen("version = \"2025.1\"", "version = \"2026.1\"", 1),
    )
    .unwrap();

    let config_path = dir.join("equicost.toml");
    std::fs::write(
        &config_path,
        format!(
            "catalog_dir = {:?}\n\n[analytics]\nenabled = false\n",
            catalog_dir.display().to_string()
        ),
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "equicost",
        "--config",
        config_path.to_str().unwrap(),
        "describe",
        "livery",
    ])
    .unwrap();
    let mut out = Vec::new();
    execute(cli, &mut out).unwrap();
    let description: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(description["version"], "2026.1");

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn reload_lists_builtins_without_catalog_dir() {
    let out = run(&host(), &["reload"]).unwrap();
    let list: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(list.as_array().unwrap().len(), 6);
}

#[test]
fn cleared_field_sent_as_null_uses_default() {
    let dir = scratch_dir();
    let scenario = dir.join("scenario.json");
    std::fs::write(&scenario, r#"{"inputs": {"horses": null}, "overrides": {"bag_price": null}}"#)
        .unwrap();

    let out = run(
        &host(),
        &["calculate", "bedding", "--input", scenario.to_str().unwrap()],
    )
    .unwrap();
    let response: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(response["result"]["totals"]["annual"], 1404.0);

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn broken_explicit_config_is_a_config_error() {
    let dir = scratch_dir();
    let config_path = dir.join("equicost.toml");
    std::fs::write(&config_path, "analytics = 3\n").unwrap();

    let cli = Cli::try_parse_from(["equicost", "--config", config_path.to_str().unwrap(), "list"])
        .unwrap();
    let err = execute(cli, &mut Vec::new()).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigError);

    std::fs::remove_dir_all(dir).unwrap();
}
