//! # Command Line
//!
//! The `equicost` binary: the same commands a widget page calls, driven from
//! a shell.
//!
//! ```text
//! equicost list
//! equicost describe farrier
//! equicost calculate bedding --select bedding=straw --toggle bulk_discount=on
//! equicost calculate dental --input scenario.json --compare vet --format table
//! equicost --config yard.toml reload
//! ```

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use equicost_core::ScenarioInput;

use crate::error::ApiError;
use crate::state::parse_flag;

/// Horse-keeping cost calculators
#[derive(Debug, Parser)]
#[command(name = "equicost")]
#[command(about = "Horse-keeping cost estimates from shared, versioned rate catalogs")]
#[command(version)]
pub struct Cli {
    /// Host config file (defaults to equicost.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available calculators
    List,

    /// Show the options, inputs and toggles a calculator accepts
    Describe {
        calculator: String,
    },

    /// Run a calculation
    Calculate(CalculateArgs),

    /// Re-read catalog_dir and list the calculators now in service
    Reload,
}

#[derive(Debug, clap::Args)]
pub struct CalculateArgs {
    pub calculator: String,

    /// Scenario JSON file, or `-` for stdin. Flags below are applied on top.
    #[arg(long)]
    pub input: Option<String>,

    /// Numeric input, e.g. `horses=2`
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub inputs: Vec<(String, String)>,

    /// Catalog or factor selection, e.g. `region=london`
    #[arg(long = "select", value_name = "SELECTION=KEY", value_parser = parse_assignment)]
    pub selections: Vec<(String, String)>,

    /// Toggle, e.g. `sedation=on`
    #[arg(long = "toggle", value_name = "NAME=on|off", value_parser = parse_toggle)]
    pub toggles: Vec<(String, bool)>,

    /// Manual override, e.g. `cost_per_visit=95`
    #[arg(long = "override", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub overrides: Vec<(String, String)>,

    /// Alternative primary key to compare against (repeatable)
    #[arg(long = "compare", value_name = "KEY")]
    pub compare: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// Splits `name=value` at the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{}`", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in `{}`", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_toggle(raw: &str) -> Result<(String, bool), String> {
    let (name, value) = parse_assignment(raw)?;
    let on = parse_flag(&value)
        .ok_or_else(|| format!("expected on or off for `{}`, got `{}`", name, value))?;
    Ok((name, on))
}

impl CalculateArgs {
    /// The scenario: `--input` contents, then each flag layered on top.
    pub fn scenario(&self) -> Result<ScenarioInput, ApiError> {
        let mut input = match self.input.as_deref() {
            None => ScenarioInput::new(),
            Some("-") => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|e| ApiError::validation(format!("Failed to read stdin: {}", e)))?;
                parse_scenario(&text)?
            }
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    ApiError::validation(format!("Failed to read {}: {}", path, e))
                })?;
                parse_scenario(&text)?
            }
        };

        for (selection, key) in &self.selections {
            input = input.select(selection, key);
        }
        for (name, value) in &self.inputs {
            input = input.input(name, value.as_str());
        }
        for (name, on) in &self.toggles {
            input = input.toggle(name, *on);
        }
        for (name, value) in &self.overrides {
            input = input.with_override(name, value.as_str());
        }
        for key in &self.compare {
            input = input.compare(key);
        }
        Ok(input)
    }
}

fn parse_scenario(text: &str) -> Result<ScenarioInput, ApiError> {
    serde_json::from_str(text)
        .map_err(|e| ApiError::validation(format!("Invalid scenario JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use equicost_core::RawValue;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("region=london").unwrap(),
            ("region".to_string(), "london".to_string())
        );
        assert_eq!(
            parse_assignment("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_assignment("horses=").unwrap().1, "");
        assert!(parse_assignment("horses").is_err());
        assert!(parse_assignment("=2").is_err());
    }

    #[test]
    fn test_parse_toggle() {
        assert_eq!(parse_toggle("sedation=on").unwrap(), ("sedation".to_string(), true));
        assert_eq!(parse_toggle("sedation=off").unwrap().1, false);
        assert!(parse_toggle("sedation=sometimes").is_err());
    }

    #[test]
    fn test_calculate_flags_build_scenario() {
        let cli = Cli::try_parse_from([
            "equicost",
            "calculate",
            "dental",
            "--select",
            "provider=vet",
            "--set",
            "horses=3",
            "--toggle",
            "sedation=on",
            "--override",
            "check_price=80",
            "--compare",
            "edt",
            "--format",
            "table",
        ])
        .unwrap();

        let Command::Calculate(args) = cli.command else {
            panic!("expected calculate");
        };
        assert_eq!(args.format, OutputFormat::Table);

        let input = args.scenario().unwrap();
        assert_eq!(input.selections["provider"], "vet");
        assert_eq!(input.inputs["horses"], RawValue::Text("3".into()));
        assert!(input.toggles["sedation"]);
        assert_eq!(input.overrides["check_price"], RawValue::Text("80".into()));
        assert_eq!(input.compare_against, vec!["edt".to_string()]);
    }

    #[test]
    fn test_flags_layer_over_input_file() {
        let path = std::env::temp_dir().join(format!("equicost-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{"selections": {"provider": "edt", "age": "senior"}, "inputs": {"horses": 1}}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "equicost",
            "calculate",
            "dental",
            "--input",
            path.to_str().unwrap(),
            "--select",
            "provider=vet",
        ])
        .unwrap();
        let Command::Calculate(args) = cli.command else {
            panic!("expected calculate");
        };
        let input = args.scenario().unwrap();

        assert_eq!(input.selections["provider"], "vet");
        assert_eq!(input.selections["age"], "senior");
        assert_eq!(input.inputs["horses"], RawValue::Number(1.0));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["equicost", "list", "--config", "/tmp/e.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/e.toml")));
    }
}
