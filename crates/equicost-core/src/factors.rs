//! # Adjustment Factor Resolver
//!
//! Maps selection keys (region, stable size, keeping pattern, age group) to
//! multipliers, and composes multipliers into one effective factor.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  region = london (1.20)   stable_size = large (1.25)   keeping = (0.60) │
//! │                                                                         │
//! │  effective = 1.20 × 1.25 × 0.60 = 0.90                                  │
//! │                                                                         │
//! │  Multiplication, never addition. The product must not depend on the     │
//! │  order the classes are applied in, so `compose` sorts its operands      │
//! │  before multiplying: every permutation produces the same bits, not      │
//! │  merely the same value within rounding.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::AdjustmentFactor;
use crate::validation::{
    validate_key, validate_multiplier, validate_non_negative, validate_unique_keys,
    ValidationResult,
};

/// Tolerance when checking that a baseline multiplier is 1.0.
const BASELINE_TOLERANCE: f64 = 1e-9;

/// A named group of mutually exclusive adjustment factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorClass {
    pub name: String,
    /// The "average" key; its multiplier is 1.0 and it is the default.
    pub baseline: String,
    pub entries: Vec<AdjustmentFactor>,
}

impl FactorClass {
    /// The factor for `key`, failing with `FactorNotFound` if absent.
    pub fn factor(&self, key: &str) -> CoreResult<&AdjustmentFactor> {
        self.entries
            .iter()
            .find(|factor| factor.key == key)
            .ok_or_else(|| CoreError::FactorNotFound {
                class: self.name.clone(),
                key: key.to_string(),
            })
    }

    /// `resolve(factorClass, key) -> multiplier`.
    pub fn resolve(&self, key: &str) -> CoreResult<f64> {
        self.factor(key).map(|factor| factor.multiplier)
    }

    pub fn baseline_factor(&self) -> CoreResult<&AdjustmentFactor> {
        self.factor(&self.baseline)
    }

    /// Looks up a user selection; unknown keys are logged and replaced by
    /// the baseline.
    ///
    /// The widget's default selection always names a real key, so reaching
    /// the fallback means a form and its definition disagree.
    pub fn factor_or_baseline(&self, key: Option<&str>) -> CoreResult<&AdjustmentFactor> {
        match key {
            None => self.baseline_factor(),
            Some(key) => self.factor(key).or_else(|err| {
                warn!(
                    class = %self.name,
                    key = %key,
                    fallback = %self.baseline,
                    error = %err,
                    "Unknown adjustment factor, using baseline"
                );
                self.baseline_factor()
            }),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|factor| factor.key.as_str())
    }

    /// Checks the factor class invariants.
    ///
    /// ## Rules
    /// - At least one entry, keys well-formed and unique
    /// - Every multiplier finite and > 0, every field finite and >= 0
    /// - `baseline` names an entry whose multiplier is 1.0
    pub fn validate(&self) -> ValidationResult<()> {
        validate_key("factor class name", &self.name)?;

        if self.entries.is_empty() {
            return Err(ValidationError::Required {
                field: format!("factor class {} entries", self.name),
            });
        }

        for factor in &self.entries {
            validate_key(&format!("{} key", self.name), &factor.key)?;
            validate_multiplier(
                &format!("{}.{}.multiplier", self.name, factor.key),
                factor.multiplier,
            )?;
            for (field, value) in &factor.fields {
                validate_non_negative(&format!("{}.{}.{}", self.name, factor.key, field), *value)?;
            }
        }

        validate_unique_keys(&format!("{} key", self.name), self.keys())?;

        let baseline = self
            .entries
            .iter()
            .find(|factor| factor.key == self.baseline)
            .ok_or_else(|| ValidationError::Required {
                field: format!("{} baseline '{}'", self.name, self.baseline),
            })?;

        if (baseline.multiplier - 1.0).abs() > BASELINE_TOLERANCE {
            return Err(ValidationError::InvalidFormat {
                field: format!("{}.{}.multiplier", self.name, baseline.key),
                reason: "baseline multiplier must be 1.0".to_string(),
            });
        }

        Ok(())
    }
}

/// Multiplies factors in a canonical order.
///
/// Sorting first makes the product a function of the multiset of operands,
/// so callers can gather factors in any order. An empty input is 1.0.
///
/// ## Example
/// ```rust
/// use equicost_core::factors::compose;
///
/// let a = compose([1.2, 1.25, 0.6]);
/// let b = compose([0.6, 1.2, 1.25]);
/// assert_eq!(a.to_bits(), b.to_bits());
/// assert_eq!(compose([]), 1.0);
/// ```
pub fn compose(factors: impl IntoIterator<Item = f64>) -> f64 {
    let mut factors: Vec<f64> = factors.into_iter().collect();
    factors.sort_by(f64::total_cmp);
    factors.into_iter().product()
}

/// `effectiveMultiplier = product(resolve(class_i, key_i))`.
///
/// Every `(class, key)` pair must resolve; this is the strict form used when
/// a caller wants lookups to fail loudly.
pub fn effective_multiplier<'a>(
    classes: &[FactorClass],
    selections: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> CoreResult<f64> {
    let mut multipliers = Vec::new();
    for (class_name, key) in selections {
        let class = classes
            .iter()
            .find(|class| class.name == class_name)
            .ok_or_else(|| CoreError::FactorClassNotFound(class_name.to_string()))?;
        multipliers.push(class.resolve(key)?);
    }
    Ok(compose(multipliers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn factor(key: &str, multiplier: f64) -> AdjustmentFactor {
        AdjustmentFactor {
            key: key.to_string(),
            label: key.to_string(),
            multiplier,
            fields: BTreeMap::new(),
        }
    }

    fn region() -> FactorClass {
        FactorClass {
            name: "region".to_string(),
            baseline: "average".to_string(),
            entries: vec![
                factor("average", 1.0),
                factor("london", 1.2),
                factor("wales", 0.9),
            ],
        }
    }

    fn size() -> FactorClass {
        FactorClass {
            name: "stable_size".to_string(),
            baseline: "standard".to_string(),
            entries: vec![factor("standard", 1.0), factor("large", 1.25)],
        }
    }

    #[test]
    fn test_resolve() {
        let region = region();
        assert_eq!(region.resolve("london").unwrap(), 1.2);
        assert!(matches!(
            region.resolve("mars"),
            Err(CoreError::FactorNotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_key_uses_baseline() {
        let region = region();
        assert_eq!(region.factor_or_baseline(Some("mars")).unwrap().key, "average");
        assert_eq!(region.factor_or_baseline(None).unwrap().key, "average");
    }

    #[test]
    fn test_effective_multiplier_is_a_product() {
        let classes = vec![region(), size()];
        let m = effective_multiplier(&classes, [("region", "london"), ("stable_size", "large")])
            .unwrap();
        assert!((m - 1.5).abs() < 1e-12);

        let swapped =
            effective_multiplier(&classes, [("stable_size", "large"), ("region", "london")])
                .unwrap();
        assert_eq!(m.to_bits(), swapped.to_bits());

        assert!(matches!(
            effective_multiplier(&classes, [("season", "winter")]),
            Err(CoreError::FactorClassNotFound(_))
        ));
    }

    #[test]
    fn test_validate_requires_unit_baseline() {
        assert!(region().validate().is_ok());

        let mut off_baseline = region();
        off_baseline.entries[0].multiplier = 1.1;
        assert!(off_baseline.validate().is_err());

        let mut missing_baseline = region();
        missing_baseline.baseline = "north".to_string();
        assert!(missing_baseline.validate().is_err());

        let mut zero = region();
        zero.entries[2].multiplier = 0.0;
        assert!(zero.validate().is_err());
    }
}
