//! # Money Module
//!
//! Provides the `Price` type for parking fares.
//!
//! ## Why Not Integer Cents?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PRORATED FARES                                                         │
//! │                                                                         │
//! │  Stays are billed proportionally to the exact elapsed time:             │
//! │    60 min CAR with 5% discount = 1.5 × 0.95 = 1.425                     │
//! │                                                                         │
//! │  Rounding to cents at calculation time would make the fare depend on   │
//! │  where rounding happened. The exact amount is stored; rounding to      │
//! │  cents happens only when displaying or charging.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use parkit_core::money::Price;
//!
//! let fare = Price::new(1.425);
//! assert_eq!(fare.rounded_cents(), 143);
//! assert_eq!(Price::new(0.75).to_string(), "$0.75");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when comparing fares.
pub const PRICE_EPSILON: f64 = 1e-9;

/// A non-negative fare amount in currency units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Price(f64);

impl Price {
    /// Creates a price. Negative or non-finite inputs clamp to zero.
    pub fn new(amount: f64) -> Self {
        if amount.is_finite() && amount > 0.0 {
            Price(amount)
        } else {
            Price(0.0)
        }
    }

    /// Zero price (open tickets, free tier).
    #[inline]
    pub const fn zero() -> Self {
        Price(0.0)
    }

    /// Returns the exact amount.
    #[inline]
    pub const fn amount(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Returns the amount in cents, rounded half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use parkit_core::money::Price;
    ///
    /// assert_eq!(Price::new(1.5).rounded_cents(), 150);
    /// assert_eq!(Price::new(0.125).rounded_cents(), 13);
    /// ```
    pub fn rounded_cents(&self) -> i64 {
        // Nudge by epsilon so 1.425 (stored as 1.42499999...) rounds up.
        ((self.0 * 100.0) + PRICE_EPSILON).round() as i64
    }

    /// Compares two prices within [`PRICE_EPSILON`].
    pub fn approx_eq(&self, other: Price) -> bool {
        (self.0 - other.0).abs() < PRICE_EPSILON
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::zero()
    }
}

/// Display rounds to cents, e.g. `$1.43`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.rounded_cents();
        write!(f, "${}.{:02}", cents / 100, cents % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
