//! Derived multi-leg opportunities: arbitrage pairs, middles, and
//! exchange-baseline edges.
//!
//! Opportunities are created and discarded per pipeline run; they carry
//! no identity across runs. Derived fields (ROI, stake split, gap) are
//! computed at construction and never mutated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::odds::AmericanOdds;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// One side of an arbitrage pair with its stake allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrageLeg {
    pub selection: String,
    pub book: String,
    pub price: AmericanOdds,
    pub stake: Decimal,
    pub payout: Decimal,
}

/// Complementary pricing across two books whose implied probabilities
/// sum below 1, guaranteeing profit regardless of outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arbitrage {
    primary: ArbitrageLeg,
    complement: ArbitrageLeg,
    roi_percent: Decimal,
    total_stake: Decimal,
    profit: Decimal,
}

impl Arbitrage {
    /// Build an arbitrage from two legs at different books, allocating
    /// `total_stake` proportionally to each leg's implied probability so
    /// both legs return the same payout.
    ///
    /// # Errors
    ///
    /// - [`DomainError::SameBookLegs`] when both legs quote one book.
    /// - [`DomainError::NoArbitrage`] when implied probabilities sum to
    ///   1 or more.
    /// - [`DomainError::NonPositiveStake`] for a non-positive stake.
    pub fn try_new(
        primary: (String, String, AmericanOdds),
        complement: (String, String, AmericanOdds),
        total_stake: Decimal,
    ) -> Result<Self, DomainError> {
        let (primary_selection, primary_book, primary_price) = primary;
        let (complement_selection, complement_book, complement_price) = complement;

        if primary_book.eq_ignore_ascii_case(&complement_book) {
            return Err(DomainError::SameBookLegs { book: primary_book });
        }
        if total_stake <= Decimal::ZERO {
            return Err(DomainError::NonPositiveStake { stake: total_stake });
        }

        let p_primary = primary_price.implied_probability();
        let p_complement = complement_price.implied_probability();
        let sum = p_primary + p_complement;
        if sum >= Decimal::ONE {
            return Err(DomainError::NoArbitrage { sum });
        }

        // Stakes proportional to implied probability make both payouts
        // equal to total_stake / sum.
        let primary_stake = total_stake * p_primary / sum;
        let complement_stake = total_stake - primary_stake;
        let payout = total_stake / sum;
        let roi_percent = (Decimal::ONE - sum) * HUNDRED;
        let profit = payout - total_stake;

        Ok(Self {
            primary: ArbitrageLeg {
                selection: primary_selection,
                book: primary_book,
                price: primary_price,
                stake: primary_stake,
                payout,
            },
            complement: ArbitrageLeg {
                selection: complement_selection,
                book: complement_book,
                price: complement_price,
                stake: complement_stake,
                payout,
            },
            roi_percent,
            total_stake,
            profit,
        })
    }

    #[must_use]
    pub fn primary(&self) -> &ArbitrageLeg {
        &self.primary
    }

    #[must_use]
    pub fn complement(&self) -> &ArbitrageLeg {
        &self.complement
    }

    /// Guaranteed return on the total stake, as a percentage.
    #[must_use]
    pub fn roi_percent(&self) -> Decimal {
        self.roi_percent
    }

    #[must_use]
    pub fn total_stake(&self) -> Decimal {
        self.total_stake
    }

    /// Guaranteed profit: equal payout minus total stake.
    #[must_use]
    pub fn profit(&self) -> Decimal {
        self.profit
    }
}

/// One side of a middle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddleLeg {
    pub book: String,
    pub line: Decimal,
    pub price: AmericanOdds,
}

/// An Over at one book strictly below an Under at another: both legs
/// win when the result lands in the gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Middle {
    over: MiddleLeg,
    under: MiddleLeg,
    gap: Decimal,
}

impl Middle {
    /// Build a middle, validating that the legs come from different
    /// books and the Over line sits strictly below the Under line.
    ///
    /// # Errors
    ///
    /// [`DomainError::SameBookLegs`] or [`DomainError::InvertedMiddle`].
    pub fn try_new(over: MiddleLeg, under: MiddleLeg) -> Result<Self, DomainError> {
        if over.book.eq_ignore_ascii_case(&under.book) {
            return Err(DomainError::SameBookLegs {
                book: over.book.clone(),
            });
        }
        if over.line >= under.line {
            return Err(DomainError::InvertedMiddle {
                over_line: over.line,
                under_line: under.line,
            });
        }
        let gap = under.line - over.line;
        Ok(Self { over, under, gap })
    }

    #[must_use]
    pub fn over(&self) -> &MiddleLeg {
        &self.over
    }

    #[must_use]
    pub fn under(&self) -> &MiddleLeg {
        &self.under
    }

    /// Width of the winning window.
    #[must_use]
    pub fn gap(&self) -> Decimal {
        self.gap
    }
}

/// A book pricing a selection better than the reference exchange, or a
/// selection the exchange declines to offer at all (`one_sided`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeEdge {
    pub book: String,
    pub price: AmericanOdds,
    pub baseline_book: String,
    /// The exchange's own price for this selection. `None` when the
    /// edge was inferred from a one-sided baseline market.
    pub baseline_price: Option<AmericanOdds>,
    pub edge_percent: Decimal,
    pub one_sided: bool,
}

/// A derived pairing attached to a pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Opportunity {
    Arbitrage(Arbitrage),
    Middle(Middle),
    ExchangeEdge(ExchangeEdge),
}

impl Opportunity {
    /// The headline metric used for ordering when a pick carries no
    /// consensus EV: arbitrage ROI, middle gap, or edge vs baseline.
    #[must_use]
    pub fn metric(&self) -> Decimal {
        match self {
            Self::Arbitrage(arb) => arb.roi_percent(),
            Self::Middle(middle) => middle.gap(),
            Self::ExchangeEdge(edge) => edge.edge_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn odds(value: i32) -> AmericanOdds {
        AmericanOdds::try_new(value).unwrap()
    }

    #[test]
    fn arbitrage_from_plus_120_and_plus_150() {
        // p = 0.4545... + 0.4 = 0.8545...; ROI = 14.54...%
        let arb = Arbitrage::try_new(
            ("Team X".into(), "Book A".into(), odds(120)),
            ("Team Y".into(), "Book B".into(), odds(150)),
            dec!(100),
        )
        .unwrap();

        assert!(arb.roi_percent() > Decimal::ZERO);
        let sum = odds(120).implied_probability() + odds(150).implied_probability();
        assert!(sum < Decimal::ONE);
        assert_eq!(arb.roi_percent(), (Decimal::ONE - sum) * dec!(100));
    }

    #[test]
    fn arbitrage_stakes_sum_to_total_and_payouts_match() {
        let arb = Arbitrage::try_new(
            ("Team X".into(), "Book A".into(), odds(120)),
            ("Team Y".into(), "Book B".into(), odds(150)),
            dec!(100),
        )
        .unwrap();

        let stakes = arb.primary().stake + arb.complement().stake;
        assert_eq!(stakes, dec!(100));
        assert_eq!(arb.primary().payout, arb.complement().payout);
        assert!(arb.profit() > Decimal::ZERO);
        assert!((arb.primary().payout - dec!(100) - arb.profit()).abs() < dec!(0.0001));
    }

    #[test]
    fn arbitrage_rejects_vigged_pair() {
        // -110 both sides sums above 1.
        let result = Arbitrage::try_new(
            ("Over".into(), "Book A".into(), odds(-110)),
            ("Under".into(), "Book B".into(), odds(-110)),
            dec!(100),
        );
        assert!(matches!(result, Err(DomainError::NoArbitrage { .. })));
    }

    #[test]
    fn arbitrage_rejects_single_book_pair() {
        let result = Arbitrage::try_new(
            ("Over".into(), "Book A".into(), odds(120)),
            ("Under".into(), "Book A".into(), odds(150)),
            dec!(100),
        );
        assert!(matches!(result, Err(DomainError::SameBookLegs { .. })));
    }

    #[test]
    fn arbitrage_rejects_non_positive_stake() {
        let result = Arbitrage::try_new(
            ("Over".into(), "Book A".into(), odds(120)),
            ("Under".into(), "Book B".into(), odds(150)),
            dec!(0),
        );
        assert!(matches!(result, Err(DomainError::NonPositiveStake { .. })));
    }

    #[test]
    fn middle_requires_over_below_under() {
        let over = MiddleLeg {
            book: "Book A".into(),
            line: dec!(44.5),
            price: odds(-110),
        };
        let under = MiddleLeg {
            book: "Book B".into(),
            line: dec!(47.5),
            price: odds(-105),
        };
        let middle = Middle::try_new(over.clone(), under.clone()).unwrap();
        assert_eq!(middle.gap(), dec!(3.0));

        let inverted = Middle::try_new(under.clone(), over.clone());
        assert!(matches!(inverted, Err(DomainError::InvertedMiddle { .. })));

        let same_line = Middle::try_new(
            MiddleLeg {
                line: dec!(47.5),
                ..over
            },
            under,
        );
        assert!(matches!(same_line, Err(DomainError::InvertedMiddle { .. })));
    }

    #[test]
    fn middle_rejects_same_book() {
        let over = MiddleLeg {
            book: "Book A".into(),
            line: dec!(44.5),
            price: odds(-110),
        };
        let under = MiddleLeg {
            book: "Book A".into(),
            line: dec!(47.5),
            price: odds(-105),
        };
        assert!(matches!(
            Middle::try_new(over, under),
            Err(DomainError::SameBookLegs { .. })
        ));
    }

    #[test]
    fn opportunity_metric_selects_headline_number() {
        let arb = Arbitrage::try_new(
            ("Team X".into(), "Book A".into(), odds(120)),
            ("Team Y".into(), "Book B".into(), odds(150)),
            dec!(100),
        )
        .unwrap();
        let roi = arb.roi_percent();
        assert_eq!(Opportunity::Arbitrage(arb).metric(), roi);
    }
}
