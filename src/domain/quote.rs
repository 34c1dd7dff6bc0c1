//! A single book's price for one selection at one instant.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::book::Book;
use super::odds::AmericanOdds;

/// One bookmaker's quoted price for one selection of one market.
///
/// `line` is `None` for moneyline markets. `synthetic` marks an Under
/// quote manufactured at the fixed pick'em vig for fast-moving
/// operators that only publish an Over price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub book: Book,
    pub selection: String,
    pub line: Option<Decimal>,
    pub price: AmericanOdds,
    pub last_update: DateTime<Utc>,
    pub synthetic: bool,
}

impl Quote {
    /// A real (feed-observed) quote.
    #[must_use]
    pub fn new(
        book: Book,
        selection: impl Into<String>,
        line: Option<Decimal>,
        price: AmericanOdds,
        last_update: DateTime<Utc>,
    ) -> Self {
        Self {
            book,
            selection: selection.into(),
            line,
            price,
            last_update,
            synthetic: false,
        }
    }

    /// A synthetic complementary quote at the fixed pick'em vig.
    #[must_use]
    pub fn synthetic(
        book: Book,
        selection: impl Into<String>,
        line: Option<Decimal>,
        price: AmericanOdds,
        last_update: DateTime<Utc>,
    ) -> Self {
        Self {
            synthetic: true,
            ..Self::new(book, selection, line, price, last_update)
        }
    }

    /// Implied probability of this quote's price.
    #[must_use]
    pub fn implied_probability(&self) -> Decimal {
        self.price.implied_probability()
    }

    /// Whether this quote sits within `tolerance` of `line`. A quote
    /// with no line never matches a numeric line.
    #[must_use]
    pub fn at_line(&self, line: Decimal, tolerance: Decimal) -> bool {
        match self.line {
            Some(own) => (own - line).abs() <= tolerance,
            None => false,
        }
    }
}
