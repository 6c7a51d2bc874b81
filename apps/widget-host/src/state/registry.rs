//! # Registry State
//!
//! The calculators the host currently serves.
//!
//! ## Catalog Swap
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Price Revision Flow                                  │
//! │                                                                         │
//! │  reload_catalogs()                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  built-ins + catalog_dir/*.toml ──► new Registry (fully validated)      │
//! │       │                                                                 │
//! │       ▼  one write lock, one Arc swap                                   │
//! │  RwLock<Arc<Registry>>                                                  │
//! │       │                                                                 │
//! │       ├── calculations already running keep their old Arc               │
//! │       └── the next snapshot() sees the complete new set                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed reload leaves the current registry in place.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use equicost_core::{CalculatorConfig, Registry};
use tracing::{debug, info};

use super::config::{HostConfig, HostConfigError};
use crate::error::ApiError;

#[derive(Debug)]
pub struct RegistryState {
    registry: RwLock<Arc<Registry>>,
}

impl RegistryState {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: RwLock::new(Arc::new(registry)),
        }
    }

    /// Built-ins plus any replacements from `config.catalog_dir`.
    pub fn load(config: &HostConfig) -> Result<Self, ApiError> {
        Ok(Self::new(build_registry(config)?))
    }

    /// The registry as of now. Holding the `Arc` pins that version.
    pub fn snapshot(&self) -> Arc<Registry> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebuilds from `config` and swaps the result in atomically.
    ///
    /// Returns the number of calculators now served.
    pub fn reload(&self, config: &HostConfig) -> Result<usize, ApiError> {
        let next = Arc::new(build_registry(config)?);
        let count = next.len();
        *self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
        info!(calculators = count, "Calculator registry reloaded");
        Ok(count)
    }
}

fn build_registry(config: &HostConfig) -> Result<Registry, ApiError> {
    let registry = Registry::builtin()?;
    match &config.catalog_dir {
        Some(dir) => Ok(registry.with_replacements(read_catalog_dir(dir)?)),
        None => Ok(registry),
    }
}

/// Parses every `*.toml` in `dir`, in file name order.
fn read_catalog_dir(dir: &Path) -> Result<Vec<CalculatorConfig>, ApiError> {
    let dir_error = |e: std::io::Error| HostConfigError::CatalogDir {
        path: dir.to_path_buf(),
        message: e.to_string(),
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(dir_error)? {
        let path = entry.map_err(dir_error)?.path();
        if path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut configs = Vec::with_capacity(paths.len());
    for path in paths {
        debug!(?path, "Loading calculator definition");
        let text = std::fs::read_to_string(&path).map_err(dir_error)?;
        let origin = path.display().to_string();
        configs.push(CalculatorConfig::from_toml(&origin, &text)?);
    }
    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use equicost_core::registry::BUILTIN_SOURCES;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("equicost-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn revised_bedding() -> String {
        let (_, text) = BUILTIN_SOURCES
            .iter()
            .find(|(origin, _)| *origin == "builtin:bedding")
            .copied()
            .unwrap();
        text.replacen("version = \"2025.1\"", "version = \"2026.1\"", 1)
    }

    #[test]
    fn test_builtin_without_catalog_dir() {
        let state = RegistryState::load(&HostConfig::default()).unwrap();
        assert_eq!(state.snapshot().len(), BUILTIN_SOURCES.len());
    }

    #[test]
    fn test_reload_swaps_whole_registry() {
        let dir = scratch_dir("reload");
        let state = RegistryState::load(&HostConfig::default()).unwrap();
        let before = state.snapshot();

        std::fs::write(dir.join("bedding.toml"), revised_bedding()).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
        let config = HostConfig {
            catalog_dir: Some(dir.clone()),
            ..HostConfig::default()
        };
        state.reload(&config).unwrap();

        // The old snapshot is untouched; the new one carries the revision
        assert_eq!(before.get("bedding").unwrap().config().version, "2025.1");
        assert_eq!(state.snapshot().get("bedding").unwrap().config().version, "2026.1");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_failed_reload_keeps_current_registry() {
        let dir = scratch_dir("broken");
        std::fs::write(dir.join("broken.toml"), "name = ").unwrap();
        let state = RegistryState::load(&HostConfig::default()).unwrap();

        let config = HostConfig {
            catalog_dir: Some(dir.clone()),
            ..HostConfig::default()
        };
        assert!(state.reload(&config).is_err());
        assert_eq!(state.snapshot().get("bedding").unwrap().config().version, "2025.1");

        std::fs::remove_dir_all(dir).unwrap();
    }
}
