//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors that validate
//! domain invariants. Invalid quotes from the raw feed are expected and
//! routine, so callers typically drop the offending record rather than
//! surfacing these to the consumer.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// American odds must have magnitude >= 100 and must be non-zero.
    #[error("invalid American odds {value}: magnitude must be at least 100")]
    InvalidOdds {
        /// The rejected raw value.
        value: i32,
    },

    /// Probability must lie strictly inside (0, 1) to convert to odds.
    #[error("probability {probability} outside (0, 1)")]
    ProbabilityOutOfRange {
        /// The rejected probability.
        probability: rust_decimal::Decimal,
    },

    /// A middle requires the Over line to sit strictly below the Under line.
    #[error("over line {over_line} is not below under line {under_line}")]
    InvertedMiddle {
        over_line: rust_decimal::Decimal,
        under_line: rust_decimal::Decimal,
    },

    /// Opportunity legs must come from two different books.
    #[error("both legs quote the same book '{book}'")]
    SameBookLegs {
        /// The duplicated book name.
        book: String,
    },

    /// The combined implied probability of an arbitrage pair must be < 1.
    #[error("implied probabilities sum to {sum}, no arbitrage exists")]
    NoArbitrage { sum: rust_decimal::Decimal },

    /// Stake must be positive to split across arbitrage legs.
    #[error("total stake must be positive, got {stake}")]
    NonPositiveStake { stake: rust_decimal::Decimal },
}
