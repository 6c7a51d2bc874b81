//! # Catalog Commands
//!
//! What calculators exist, what each form needs, and swapping in revised
//! definitions.

use chrono::NaiveDate;
use equicost_core::rules::{InputSpec, OverrideSpec, ToggleSpec};
use equicost_core::Calculator;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{HostConfig, RegistryState};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorSummary {
    pub name: String,
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOption {
    pub key: String,
    pub label: String,
    pub base_rate: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDescription {
    pub name: String,
    pub default_key: String,
    pub options: Vec<CatalogOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorOption {
    pub key: String,
    pub label: String,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorClassDescription {
    pub name: String,
    pub baseline: String,
    pub options: Vec<FactorOption>,
}

/// Everything a widget form needs to render itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorDescription {
    pub name: String,
    pub title: String,
    pub version: String,
    pub effective_from: NaiveDate,
    pub description: String,
    pub primary_catalog: String,
    pub catalogs: Vec<CatalogDescription>,
    pub factor_classes: Vec<FactorClassDescription>,
    pub inputs: Vec<InputSpec>,
    pub toggles: Vec<ToggleSpec>,
    pub overrides: Vec<OverrideSpec>,
    pub compare_against: Vec<String>,
}

impl From<&Calculator> for CalculatorSummary {
    fn from(calculator: &Calculator) -> Self {
        let config = calculator.config();
        Self {
            name: config.name.clone(),
            title: config.title.clone(),
            version: config.version.clone(),
        }
    }
}

impl From<&Calculator> for CalculatorDescription {
    fn from(calculator: &Calculator) -> Self {
        let config = calculator.config();
        Self {
            name: config.name.clone(),
            title: config.title.clone(),
            version: config.version.clone(),
            effective_from: config.effective_from,
            description: config.description.clone(),
            primary_catalog: config.primary_catalog.clone(),
            catalogs: config
                .catalogs
                .iter()
                .map(|catalog| CatalogDescription {
                    name: catalog.name.clone(),
                    default_key: catalog.default_key.clone(),
                    options: catalog
                        .entries
                        .iter()
                        .map(|entry| CatalogOption {
                            key: entry.key.clone(),
                            label: entry.label.clone(),
                            base_rate: entry.base_rate,
                            unit: entry.unit.clone(),
                        })
                        .collect(),
                })
                .collect(),
            factor_classes: config
                .factor_classes
                .iter()
                .map(|class| FactorClassDescription {
                    name: class.name.clone(),
                    baseline: class.baseline.clone(),
                    options: class
                        .entries
                        .iter()
                        .map(|factor| FactorOption {
                            key: factor.key.clone(),
                            label: factor.label.clone(),
                            multiplier: factor.multiplier,
                        })
                        .collect(),
                })
                .collect(),
            inputs: config.inputs.clone(),
            toggles: config.toggles.clone(),
            overrides: config.overrides.clone(),
            compare_against: config.compare_against.clone(),
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Calculators in name order.
pub fn list_calculators(registry: &RegistryState) -> Vec<CalculatorSummary> {
    debug!("list_calculators command");
    registry.snapshot().iter().map(CalculatorSummary::from).collect()
}

pub fn describe_calculator(
    registry: &RegistryState,
    name: &str,
) -> Result<CalculatorDescription, ApiError> {
    debug!(calculator = %name, "describe_calculator command");
    let snapshot = registry.snapshot();
    let calculator = snapshot.get(name)?;
    Ok(CalculatorDescription::from(calculator))
}

/// Rebuilds the registry from built-ins and `config.catalog_dir`.
///
/// Returns the refreshed calculator list. On failure the previous registry
/// stays in service.
pub fn reload_catalogs(
    registry: &RegistryState,
    config: &HostConfig,
) -> Result<Vec<CalculatorSummary>, ApiError> {
    debug!(catalog_dir = ?config.catalog_dir, "reload_catalogs command");
    registry.reload(config)?;
    Ok(list_calculators(registry))
}
