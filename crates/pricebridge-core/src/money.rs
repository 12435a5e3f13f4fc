//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! All price arithmetic in the engine runs on integer cents (i64). The
//! downstream feed and the retail backend exchange decimal currency units,
//! so `Money` serializes as a decimal number and rounds to cents exactly
//! once, at the wire boundary. Inside the engine no floating point is used
//! for price math.
//!
//! ## Usage
//! ```rust
//! use pricebridge_core::money::Money;
//!
//! // Create from cents (preferred inside the engine)
//! let price = Money::from_cents(1099); // 10.99
//!
//! // Ingestion boundary: decimal value from the backend, rounded once
//! let base = Money::from_units(10.994);
//! assert_eq!(base.cents(), 1099);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// - **i64 (signed)**: discounts and aggregate savings may be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Wire format**: decimal currency units (see serde impls below)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount in currency units,
    /// rounding half away from zero to the nearest cent.
    ///
    /// This is the single rounding point for values arriving from the
    /// backend; everything downstream stays cent-exact.
    #[inline]
    pub fn from_units(units: f64) -> Self {
        Money((units * 100.0).round() as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in decimal currency units (wire/display only).
    #[inline]
    pub fn units(&self) -> f64 {
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// Uses basis-point math with i128 intermediates, rounding the discount
    /// to the nearest cent: `discount = (cents × bps + 5000) / 10000`.
    ///
    /// ```rust
    /// use pricebridge_core::money::Money;
    /// use pricebridge_core::types::DiscountRate;
    ///
    /// let base = Money::from_cents(5000);              // 50.00
    /// let rate = DiscountRate::from_bps(2000);         // 20%
    /// assert_eq!(base.apply_percent_discount(rate).cents(), 4000);
    /// ```
    pub fn apply_percent_discount(&self, rate: DiscountRate) -> Money {
        let discount = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(self.0 - discount as i64)
    }

    /// Divides the amount by a (possibly fractional) quantity, rounding the
    /// result half away from zero to the nearest cent.
    ///
    /// The caller must reject non-positive quantities first; see the tier
    /// calculator.
    pub fn div_quantity(&self, qty: f64) -> Money {
        Money((self.0 as f64 / qty).round() as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
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

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Wire Format
// =============================================================================
// The feed contract and the backend exchange decimal currency units, so
// Money crosses the serde boundary as a decimal number, not as cents.

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.units())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let units = f64::deserialize(deserializer)?;
        Ok(Money::from_units(units))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
