//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts exactly.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FRACTIONAL GST PROBLEM                                             │
//! │                                                                         │
//! │  Binary floating point:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Integer paise:                                                         │
//! │    ₹38.47 × 5% GST = ₹1.9235        ❌ does not fit in paise            │
//! │                                                                         │
//! │  OUR SOLUTION: exact decimals                                           │
//! │    38.47 × 5 / 100 = 1.9235 exactly                                     │
//! │    40.3935 floored = 40             ✅ the payable amount               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khatha_core::money::Money;
//!
//! let price = Money::from_paise(3847); // ₹38.47
//! let doubled = price * 2;             // ₹76.94
//! assert_eq!(doubled, Money::from_paise(7694));
//! assert_eq!(Money::from_paise(4039).floor(), Money::from_rupees(40));
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::types::GstRate;

// =============================================================================
// Money Type
// =============================================================================

/// An exact rupee amount.
///
/// ## Design Decisions
/// - **Decimal (signed)**: negative values appear in intermediate arithmetic
///   (e.g. `total - paid`) and are clamped by the pricing rules, never stored
/// - **JSON number on the wire**: the backend sends and expects plain numbers
///   (`"amount": 40`), so serde goes through `rust_decimal::serde::float`
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.price ──► CartLine.unit_price ──► CartLine.line_total          │
/// │                                                                         │
/// │  subtotal ──► GST ──► gross ──► − redeem ──► floor ──► total ──► due    │
/// │                                                                         │
/// │  Bill.amount / Bill.paid_amount / Customer.due_amount                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    Decimal,
);

impl Money {
    /// Creates a Money value from an exact decimal.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ```rust
    /// use khatha_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(40).to_string(), "₹40.00");
    /// ```
    #[inline]
    pub fn from_rupees(rupees: i64) -> Self {
        Money(Decimal::from(rupees))
    }

    /// Creates a Money value from paise (1/100 rupee).
    ///
    /// ```rust
    /// use khatha_core::money::Money;
    ///
    /// let price = Money::from_paise(3847);
    /// assert_eq!(price.to_string(), "₹38.47");
    /// ```
    #[inline]
    pub fn from_paise(paise: i64) -> Self {
        Money(Decimal::new(paise, 2))
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds down to a whole rupee.
    ///
    /// The payable total of every bill is floored, never rounded:
    /// ₹40.9999 is payable as ₹40.
    #[inline]
    pub fn floor(&self) -> Self {
        Money(self.0.floor())
    }

    /// Whole rupees, truncated toward zero. Saturates on absurd values.
    pub fn whole_rupees(&self) -> i64 {
        self.0.trunc().to_i64().unwrap_or(i64::MAX)
    }

    /// Clamps into `[min, max]`. When `max < min`, `min` wins.
    pub fn clamp_between(self, min: Money, max: Money) -> Money {
        if self < min {
            min
        } else if self > max {
            max.max(min)
        } else {
            self
        }
    }

    /// Negative amounts become zero.
    #[inline]
    pub fn non_negative(self) -> Money {
        self.max(Money::zero())
    }

    /// GST on this amount at `rate`, kept exact (no rounding).
    ///
    /// ```rust
    /// use khatha_core::money::Money;
    /// use khatha_core::types::GstRate;
    ///
    /// let gst = Money::from_paise(3847).calculate_gst(GstRate::from_percent(5));
    /// assert_eq!(gst.to_string(), "₹1.9235");
    /// ```
    pub fn calculate_gst(&self, rate: GstRate) -> Money {
        Money(self.0 * Decimal::from(rate.bps()) / Decimal::from(10_000))
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Divides money by a positive count. Returns `None` for zero.
    pub fn divide(&self, by: u32) -> Option<Money> {
        if by == 0 {
            return None;
        }
        Some(Money(self.0 / Decimal::from(by)))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows at least two decimals: `₹40.00`, `₹1.9235`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let normalized = self.0.normalize();
        if normalized.scale() <= 2 {
            write!(f, "₹{:.2}", self.0)
        } else {
            write!(f, "₹{}", normalized)
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

/// Strict parse: `"38.47"` works, `"abc"` is an error.
/// See [`crate::validation::parse_amount`] for the forgiving form-input variant.
impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
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

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
