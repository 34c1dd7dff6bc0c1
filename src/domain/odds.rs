//! American-odds price type and probability conversion.
//!
//! American odds encode a price as profit per 100 staked (positive) or
//! stake required to profit 100 (negative). Valid magnitudes are always
//! at least 100; values strictly inside (-100, 100) are malformed feed
//! data and are rejected at construction, never clamped.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A validated American-odds price.
///
/// Higher signed values are always better for the bettor: +150 beats
/// +120, and -105 beats -120.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmericanOdds(i32);

impl AmericanOdds {
    /// Validate a raw integer price.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidOdds`] for zero or any magnitude
    /// below 100.
    pub fn try_new(value: i32) -> Result<Self, DomainError> {
        if value.abs() < 100 {
            return Err(DomainError::InvalidOdds { value });
        }
        Ok(Self(value))
    }

    /// The raw signed price.
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// Standard American-odds-to-probability conversion.
    ///
    /// `p = 100 / (price + 100)` for positive prices,
    /// `p = -price / (-price + 100)` for negative prices.
    /// The result always lies strictly inside (0, 1).
    #[must_use]
    pub fn implied_probability(&self) -> Decimal {
        let price = Decimal::from(self.0);
        if self.0 > 0 {
            HUNDRED / (price + HUNDRED)
        } else {
            -price / (-price + HUNDRED)
        }
    }

    /// Fair-odds inverse of [`implied_probability`](Self::implied_probability).
    ///
    /// Probabilities at or below 0.5 produce positive odds; above 0.5,
    /// negative odds. Rounding can land just inside the ±100 floor, in
    /// which case the price snaps to the floor rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ProbabilityOutOfRange`] unless
    /// `0 < probability < 1`.
    pub fn from_probability(probability: Decimal) -> Result<Self, DomainError> {
        if probability <= Decimal::ZERO || probability >= Decimal::ONE {
            return Err(DomainError::ProbabilityOutOfRange { probability });
        }
        let half = Decimal::new(5, 1);
        let raw = if probability <= half {
            HUNDRED * (Decimal::ONE - probability) / probability
        } else {
            -(HUNDRED * probability / (Decimal::ONE - probability))
        };
        let rounded = raw.round().to_i32().unwrap_or(if probability <= half {
            i32::MAX
        } else {
            i32::MIN
        });
        let floored = if rounded >= 0 {
            rounded.max(100)
        } else {
            rounded.min(-100)
        };
        Self::try_new(floored)
    }

    /// Whether this price pays the bettor more than `other`.
    #[must_use]
    pub fn is_better_than(&self, other: Self) -> bool {
        self.0 > other.0
    }
}

impl fmt::Display for AmericanOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0 {
            write!(f, "+{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
