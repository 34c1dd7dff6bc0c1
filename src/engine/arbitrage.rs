//! Cross-book arbitrage detection.

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{Arbitrage, Market, Quote};

use super::edge::best_quote;

/// Detect an arbitrage on a two-outcome market: best price per side
/// from *different* books whose implied probabilities sum below 1.
///
/// The excluded operator never appears on a leg, synthetic quotes are
/// not independently placeable, and pairs under `min_roi_percent` are
/// discarded as not worth the limit risk.
#[must_use]
pub fn detect(market: &Market, total_stake: Decimal, min_roi_percent: Decimal) -> Option<Arbitrage> {
    let selections = market.selections();
    if selections.len() != 2 {
        return None;
    }

    let eligible = |quote: &&Quote| !quote.synthetic && !quote.book.is_arbitrage_excluded();

    let primary_quotes: Vec<&Quote> = market
        .quotes_for(selections[0])
        .filter(eligible)
        .collect();
    let primary = best_quote(&primary_quotes)?;

    // The complementary leg must come from a different book.
    let complement_quotes: Vec<&Quote> = market
        .quotes_for(selections[1])
        .filter(eligible)
        .filter(|q| q.book != primary.book)
        .collect();
    let complement = best_quote(&complement_quotes)?;

    let arbitrage = Arbitrage::try_new(
        (
            primary.selection.clone(),
            primary.book.name().to_string(),
            primary.price,
        ),
        (
            complement.selection.clone(),
            complement.book.name().to_string(),
            complement.price,
        ),
        total_stake,
    )
    .ok()?;

    if arbitrage.roi_percent() < min_roi_percent {
        return None;
    }
    debug!(
        game = %market.game_id,
        market = market.key.raw(),
        roi = %arbitrage.roi_percent(),
        "arbitrage detected"
    );
    Some(arbitrage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use crate::domain::{AmericanOdds, Book, MarketKey};

    fn market(quotes: Vec<Quote>) -> Market {
        Market {
            game_id: "g1".into(),
            home_team: Some("Boston Celtics".into()),
            away_team: Some("Miami Heat".into()),
            sport_key: "basketball_nba".into(),
            commence_time: Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
            key: MarketKey::parse("h2h"),
            player: None,
            consensus_line: None,
            lines_seen: Vec::new(),
            quotes,
            off_line: Vec::new(),
        }
    }

    fn quote(book_key: &str, title: &str, selection: &str, price: i32) -> Quote {
        Quote::new(
            Book::from_feed(book_key, title),
            selection,
            None,
            AmericanOdds::try_new(price).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn detects_plus_120_plus_150_pair() {
        let market = market(vec![
            quote("booka", "Book A", "Team X", 120),
            quote("bookb", "Book B", "Team Y", 150),
        ]);

        let arb = detect(&market, dec!(100), dec!(1)).unwrap();
        assert_eq!(arb.primary().book, "Book A");
        assert_eq!(arb.complement().book, "Book B");
        assert!(arb.roi_percent() > dec!(1));
        assert_eq!(
            arb.primary().stake + arb.complement().stake,
            dec!(100)
        );
    }

    #[test]
    fn no_arbitrage_in_a_vigged_market() {
        let market = market(vec![
            quote("booka", "Book A", "Team X", -110),
            quote("bookb", "Book B", "Team Y", -110),
        ]);
        assert!(detect(&market, dec!(100), dec!(1)).is_none());
    }

    #[test]
    fn legs_must_come_from_different_books() {
        let market = market(vec![
            quote("booka", "Book A", "Team X", 120),
            quote("booka", "Book A", "Team Y", 150),
        ]);
        assert!(detect(&market, dec!(100), dec!(1)).is_none());
    }

    #[test]
    fn excluded_operator_never_appears_on_a_leg() {
        // Bovada holds the best complementary price; the arb must fall
        // back to the next-best book, killing the edge here.
        let market = market(vec![
            quote("booka", "Book A", "Team X", 120),
            quote("bovada", "Bovada", "Team Y", 160),
            quote("bookb", "Book B", "Team Y", -120),
        ]);
        assert!(detect(&market, dec!(100), dec!(1)).is_none());
    }

    #[test]
    fn thin_roi_is_discarded() {
        // +102 / +102: sum = 0.990, ROI just under 1%.
        let market = market(vec![
            quote("booka", "Book A", "Team X", 102),
            quote("bookb", "Book B", "Team Y", 102),
        ]);
        assert!(detect(&market, dec!(100), dec!(1)).is_none());
        assert!(detect(&market, dec!(100), dec!(0.5)).is_some());
    }

    #[test]
    fn one_sided_market_yields_nothing() {
        let market = market(vec![quote("booka", "Book A", "Team X", 120)]);
        assert!(detect(&market, dec!(100), dec!(1)).is_none());
    }
}
