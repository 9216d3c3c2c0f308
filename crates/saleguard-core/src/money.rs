//! # Money
//!
//! Integer centavos for sale totals, item prices and the estimated loss.
//!
//! ## Where Amounts Meet
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale.total_cents ──► Money ──┬──► same-total check (|a - b| < 1 cent) │
//! │                               ├──► estimated loss (Σ duplicates)       │
//! │                               └──► report text "R$ 1.234,56"           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals arrive from the feed already in cents, so the same-total check is
//! exact and the loss is an exact sum. Arithmetic saturates at the `i64`
//! bounds instead of overflowing.
//!
//! ## Usage
//! ```rust
//! use saleguard_core::money::Money;
//!
//! let price = Money::from_cents(1099); // R$ 10,99
//! let total = price * 2 + Money::from_cents(500);
//! assert_eq!(total.cents(), 2698);
//! assert_eq!(total.to_string(), "R$ 26,98");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money
// =============================================================================

/// A monetary value in the smallest currency unit (centavos for BRL).
///
/// Signed so that differences between two totals can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use saleguard_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (reais and centavos).
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -R$ 5,50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
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
        Money(self.0.saturating_abs())
    }

    /// Absolute difference between two amounts.
    ///
    /// ## Example
    /// ```rust
    /// use saleguard_core::money::Money;
    ///
    /// let a = Money::from_cents(2000);
    /// let b = Money::from_cents(2500);
    /// assert_eq!(a.abs_diff(b).cents(), 500);
    /// assert_eq!(b.abs_diff(a).cents(), 500);
    /// ```
    #[inline]
    pub const fn abs_diff(&self, other: Money) -> Money {
        let diff = self.0.abs_diff(other.0);
        if diff > i64::MAX as u64 {
            Money(i64::MAX)
        } else {
            Money(diff as i64)
        }
    }

    /// Sum clamped to the representable range.
    #[inline]
    pub const fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// pt-BR display: `R$ 1.234,56`, negatives as `-R$ 5,50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let major = self.major().unsigned_abs().to_string();

        // Group thousands with '.'
        let mut grouped = String::with_capacity(major.len() + major.len() / 3);
        for (i, ch) in major.chars().enumerate() {
            if i > 0 && (major.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{}R$ {},{:02}", sign, grouped, self.minor())
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
        self.saturating_add(other)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = self.saturating_add(other);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Money::saturating_add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
