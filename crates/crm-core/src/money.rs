//! # Money Module
//!
//! Provides the `Money` type for lead values and pipeline totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing a pipeline as floats:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Lead values are held in cents and summed as i64, saturating.         │
//! │    Only the wire and the display ever see dollars.                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! The REST backend and the mobile front-end speak plain dollar numbers
//! (`"value": 15000`). Fields carrying `Money` on the wire use
//! `#[serde(with = "crate::money::as_dollars")]`; whole amounts are written
//! as integers and fractional ones as decimals.
//!
//! ## Usage
//! ```rust
//! use crm_core::money::Money;
//!
//! let deal = Money::from_dollars(15_000);
//! let upsell = Money::from_cents(250_050); // $2,500.50
//! assert_eq!((deal + upsell).cents(), 1_750_050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Largest value a single lead may carry: one trillion dollars.
pub const MAX_LEAD_VALUE: Money = Money::from_dollars(1_000_000_000_000);

/// Represents a monetary value in cents (USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction stays closed even if a total dips below zero
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Saturating arithmetic**: a pipeline total pins at the bounds
///   instead of overflowing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole dollars.
    ///
    /// ```rust
    /// use crm_core::money::Money;
    ///
    /// assert_eq!(Money::from_dollars(40_000).cents(), 4_000_000);
    /// ```
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Converts a dollar amount from the wire or a form, rounding to the
    /// cent. `None` for NaN, infinities and amounts that do not fit in i64
    /// cents.
    ///
    /// ```rust
    /// use crm_core::money::Money;
    ///
    /// assert_eq!(Money::try_from_dollars_f64(19.99), Some(Money::from_cents(1999)));
    /// assert_eq!(Money::try_from_dollars_f64(f64::INFINITY), None);
    /// assert_eq!(Money::try_from_dollars_f64(1.0e17), None);
    /// ```
    pub fn try_from_dollars_f64(dollars: f64) -> Option<Self> {
        let cents = (dollars * 100.0).round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if cents.is_finite() && cents >= i64::MIN as f64 && cents < i64::MAX as f64 {
            Some(Money(cents as i64))
        } else {
            None
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value in dollars as a float (display and wire only).
    #[inline]
    pub fn as_dollars_f64(&self) -> f64 {
        self.0 as f64 / 100.0
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

    /// Returns `self` as a share of `total` in basis points, rounded half up.
    ///
    /// `None` when `total` is zero, so callers never divide by zero.
    ///
    /// ```rust
    /// use crm_core::money::Money;
    ///
    /// let converted = Money::from_dollars(40_000);
    /// let total = Money::from_dollars(135_000);
    /// assert_eq!(converted.share_bps(total), Some(2963)); // 29.63%
    /// assert_eq!(converted.share_bps(Money::zero()), None);
    /// ```
    pub fn share_bps(&self, total: Money) -> Option<u32> {
        if total.0 == 0 {
            return None;
        }
        // i128 keeps `cents * 10000` from overflowing on large pipelines
        let part = self.0 as i128 * 10_000;
        let whole = total.0 as i128;
        let bps = (part * 2 + whole) / (whole * 2);
        Some(bps.clamp(0, u32::MAX as i128) as u32)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-style display (`$10.99`). Use `format::format_currency` for the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Dollar Wire Format
// =============================================================================

/// Serde adapter writing `Money` as a dollar number.
pub mod as_dollars {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        if value.cents_part() == 0 {
            serializer.serialize_i64(value.dollars())
        } else {
            serializer.serialize_f64(value.as_dollars_f64())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let dollars = f64::deserialize(deserializer)?;
        from_wire(dollars)
    }

    pub(super) fn from_wire<E: Error>(dollars: f64) -> Result<Money, E> {
        Money::try_from_dollars_f64(dollars)
            .ok_or_else(|| E::custom(format!("dollar amount out of range: {dollars}")))
    }
}

/// Same as [`as_dollars`] for optional fields (patches).
pub mod as_dollars_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    pub fn serialize<S: Serializer>(value: &Option<Money>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(money) => super::as_dollars::serialize(money, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Money>, D::Error> {
        Option::<f64>::deserialize(deserializer)?
            .map(super::as_dollars::from_wire)
            .transpose()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
