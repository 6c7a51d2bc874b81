//! # Money Module
//!
//! Provides the `Money` type used when a computed amount is shown to a person.
//!
//! ## Where Floats Stop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ENGINE (f64)                          DISPLAY (integer pence)          │
//! │                                                                         │
//! │  9.00 × 3 × 1.0 × 52 = 1404.0    ──►   Money(140400)  "£1404.00"        │
//! │  45900 / 9360 = 4.9038...        ──►   (not money, stays f64)           │
//! │                                                                         │
//! │  The estimation model multiplies by fractional factors (0.85 bulk       │
//! │  discount, 1.2 region premium) and reports fractional break-even        │
//! │  counts, so it works in f64. Rounding to the penny happens ONCE, here,  │
//! │  on the way to a breakdown table, never between calculation steps.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use equicost_core::money::Money;
//!
//! let weekly = Money::from_pounds(27.0);
//! assert_eq!(weekly.pence(), 2700);
//! assert_eq!((weekly * 52).to_string(), "£1404.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A display amount in pence (the smallest sterling unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: A comparison delta can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from pence.
    #[inline]
    pub const fn from_pence(pence: i64) -> Self {
        Money(pence)
    }

    /// Rounds an engine amount in pounds to the nearest penny.
    ///
    /// Halves round away from zero (`f64::round`), matching how the
    /// calculators have always presented figures. Non-finite input becomes
    /// zero; the engine never produces it, but a display type must not panic.
    ///
    /// ## Example
    /// ```rust
    /// use equicost_core::money::Money;
    ///
    /// assert_eq!(Money::from_pounds(10.994).pence(), 1099);
    /// assert_eq!(Money::from_pounds(10.996).pence(), 1100);
    /// assert_eq!(Money::from_pounds(-5.5).pence(), -550);
    /// ```
    pub fn from_pounds(pounds: f64) -> Self {
        if !pounds.is_finite() {
            return Money::zero();
        }
        Money((pounds * 100.0).round() as i64)
    }

    /// Returns the value in pence.
    #[inline]
    pub const fn pence(&self) -> i64 {
        self.0
    }

    /// Returns the whole-pound portion (truncated toward zero).
    #[inline]
    pub const fn pounds(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the pence portion (always 0-99).
    #[inline]
    pub const fn pence_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Formats with a caller-chosen currency symbol (`"€"` → `€12.34`).
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.pounds().abs(),
            self.pence_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `£1404.00` / `-£5.50`.
///
/// ## Note
/// The core emits plain numbers; this is for the host's text breakdown and
/// for debugging. Widget frontends do their own localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with_symbol("£"))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
