//! # Rate Catalog
//!
//! Static lookup tables mapping a category key to a base unit rate.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  catalog "bedding"            default_key = "shavings"       │
//! │  ──────────────────────────────────────────────────────────  │
//! │  shavings        9.00 / bag    bags_per_week_full = 3        │
//! │  straw           4.50 / bale   bags_per_week_full = 4        │
//! │  rubber_matting  9.00 / bag    setup_cost = 1500             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalogs are never edited in place. A price revision ships a new
//! calculator definition and the host swaps the whole registry.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::RateEntry;
use crate::validation::{
    validate_base_rate, validate_key, validate_non_negative, validate_unique_keys,
    ValidationResult,
};

/// A named table of [`RateEntry`] presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCatalog {
    pub name: String,
    /// Selected when the user has not chosen, or chose a key that is gone.
    pub default_key: String,
    pub entries: Vec<RateEntry>,
}

impl RateCatalog {
    /// Looks up `key`, failing with `EntryNotFound` if it is absent.
    pub fn lookup(&self, key: &str) -> CoreResult<&RateEntry> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .ok_or_else(|| CoreError::EntryNotFound {
                catalog: self.name.clone(),
                key: key.to_string(),
            })
    }

    /// The entry for `default_key`.
    pub fn default_entry(&self) -> CoreResult<&RateEntry> {
        self.lookup(&self.default_key)
    }

    /// Looks up a user selection, guarding against stale keys.
    ///
    /// ## Behavior
    /// - `None` → default entry
    /// - `Some(key)` present → that entry
    /// - `Some(key)` absent → WARN log, default entry
    ///
    /// Only a missing default (a definition defect) is an error.
    pub fn lookup_or_default(&self, key: Option<&str>) -> CoreResult<&RateEntry> {
        match key {
            None => self.default_entry(),
            Some(key) => match self.lookup(key) {
                Ok(entry) => Ok(entry),
                Err(err) => {
                    warn!(
                        catalog = %self.name,
                        key = %key,
                        fallback = %self.default_key,
                        error = %err,
                        "Stale catalog selection, using default"
                    );
                    self.default_entry()
                }
            },
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    /// Checks the catalog invariants.
    ///
    /// ## Rules
    /// - At least one entry, all keys well-formed and unique
    /// - Every `base_rate` and numeric field finite and >= 0
    /// - `default_key` names an entry
    pub fn validate(&self) -> ValidationResult<()> {
        validate_key("catalog name", &self.name)?;

        if self.entries.is_empty() {
            return Err(ValidationError::Required {
                field: format!("catalog {} entries", self.name),
            });
        }

        for entry in &self.entries {
            validate_key(&format!("{} key", self.name), &entry.key)?;
            validate_base_rate(&format!("{}.{}.base_rate", self.name, entry.key), entry.base_rate)?;
            for (field, value) in &entry.fields {
                validate_non_negative(&format!("{}.{}.{}", self.name, entry.key, field), *value)?;
            }
        }

        validate_unique_keys(&format!("{} key", self.name), self.keys())?;

        if !self.contains(&self.default_key) {
            return Err(ValidationError::Required {
                field: format!("{} default_key '{}'", self.name, self.default_key),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn entry(key: &str, rate: f64) -> RateEntry {
        RateEntry {
            key: key.to_string(),
            label: key.to_string(),
            base_rate: rate,
            unit: "bag".to_string(),
            fields: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    fn bedding() -> RateCatalog {
        RateCatalog {
            name: "bedding".to_string(),
            default_key: "shavings".to_string(),
            entries: vec![entry("shavings", 9.0), entry("straw", 4.5)],
        }
    }

    #[test]
    fn test_lookup() {
        let catalog = bedding();
        assert_eq!(catalog.lookup("straw").unwrap().base_rate, 4.5);

        let err = catalog.lookup("sawdust").unwrap_err();
        assert!(matches!(err, CoreError::EntryNotFound { ref key, .. } if key == "sawdust"));
    }

    #[test]
    fn test_stale_key_falls_back_to_default() {
        let catalog = bedding();
        assert_eq!(catalog.lookup_or_default(Some("sawdust")).unwrap().key, "shavings");
        assert_eq!(catalog.lookup_or_default(None).unwrap().key, "shavings");
        assert_eq!(catalog.lookup_or_default(Some("straw")).unwrap().key, "straw");
    }

    #[test]
    fn test_missing_default_is_an_error() {
        let mut catalog = bedding();
        catalog.default_key = "hemp".to_string();
        assert!(catalog.lookup_or_default(None).is_err());
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(bedding().validate().is_ok());

        let mut duplicate = bedding();
        duplicate.entries.push(entry("straw", 5.0));
        assert!(duplicate.validate().is_err());

        let mut negative = bedding();
        negative.entries[1].base_rate = -1.0;
        assert!(negative.validate().is_err());

        let mut zero = bedding();
        zero.entries[1].base_rate = 0.0;
        assert!(zero.validate().is_ok());
    }
}
