//! Best-price selection and EV edge computation.

use rust_decimal::Decimal;

use crate::config::DefaultSide;
use crate::domain::{AmericanOdds, Quote};

use super::consensus::weighted_consensus;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The quote paying the bettor the most: numerically highest signed
/// American odds. Ties keep the earlier quote, so ordering is stable.
#[must_use]
pub fn best_quote<'a>(quotes: &[&'a Quote]) -> Option<&'a Quote> {
    let mut best: Option<&'a Quote> = None;
    for quote in quotes {
        match best {
            Some(current) if !quote.price.is_better_than(current.price) => {}
            _ => best = Some(quote),
        }
    }
    best
}

/// EV of taking `best` against a fair probability:
/// `(p_fair - p_best) / p_best * 100`, clamped to ±`cap`. Values beyond
/// the cap are treated as data artifacts, not signal.
#[must_use]
pub fn edge_percent(p_fair: Decimal, best: AmericanOdds, cap: Decimal) -> Decimal {
    let p_best = best.implied_probability();
    let edge = (p_fair - p_best) / p_best * HUNDRED;
    edge.clamp(-cap, cap)
}

/// One side of a two-sided market, with everything needed to compare
/// it against its opposite: its quotes, its consensus (when the
/// minimum-data requirement is met), its best price, and its edge.
#[derive(Debug, Clone)]
pub struct SideCandidate<'a> {
    pub selection: &'a str,
    pub quotes: Vec<&'a Quote>,
    pub consensus: Option<Decimal>,
    pub best: Option<&'a Quote>,
    pub edge: Option<Decimal>,
}

impl<'a> SideCandidate<'a> {
    /// Assemble a candidate for one selection. The edge is only
    /// computed when both a consensus and a best price exist.
    #[must_use]
    pub fn build(
        selection: &'a str,
        quotes: Vec<&'a Quote>,
        min_points: usize,
        cap: Decimal,
    ) -> Self {
        let consensus = weighted_consensus(&quotes, min_points);
        let best = best_quote(&quotes);
        let edge = match (consensus, best) {
            (Some(p_fair), Some(best)) => Some(edge_percent(p_fair, best.price, cap)),
            _ => None,
        };
        Self {
            selection,
            quotes,
            consensus,
            best,
            edge,
        }
    }

    /// Whether the minimum-data requirement was met.
    #[must_use]
    pub fn sufficient(&self) -> bool {
        self.consensus.is_some()
    }
}

/// Resolve which of two sides a pick should recommend.
///
/// Strictly higher edge wins when both sides are sufficient; a lone
/// sufficient side wins outright; when neither side qualifies the
/// configured default side is used as an explicit tie-break (the pick
/// stays marked insufficient either way).
#[must_use]
pub fn resolve_sides<'a, 'b>(
    a: &'b SideCandidate<'a>,
    b: &'b SideCandidate<'a>,
    default_side: DefaultSide,
) -> &'b SideCandidate<'a> {
    match (a.edge, b.edge) {
        (Some(edge_a), Some(edge_b)) => {
            if edge_b > edge_a {
                b
            } else {
                a
            }
        }
        (Some(_), None) => a,
        (None, Some(_)) => b,
        (None, None) => match default_side {
            DefaultSide::Over => pick_default(a, b, "Over"),
            DefaultSide::Under => pick_default(a, b, "Under"),
        },
    }
}

fn pick_default<'a, 'b>(
    a: &'b SideCandidate<'a>,
    b: &'b SideCandidate<'a>,
    preferred: &str,
) -> &'b SideCandidate<'a> {
    if b.selection.eq_ignore_ascii_case(preferred) {
        b
    } else {
        // Team-named sides have no Over/Under; fall back to the first
        // selection in feed order, which is equally arbitrary but fixed.
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use crate::domain::Book;

    fn quote(book_key: &str, title: &str, selection: &str, price: i32) -> Quote {
        Quote::new(
            Book::from_feed(book_key, title),
            selection,
            Some(dec!(52.5)),
            AmericanOdds::try_new(price).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn best_quote_prefers_highest_signed_odds() {
        let a = quote("fanduel", "FanDuel", "Over", -150);
        let b = quote("draftkings", "DraftKings", "Over", -140);
        let c = quote("bovada", "Bovada", "Over", -145);
        let quotes = [&a, &b, &c];
        assert_eq!(best_quote(&quotes).unwrap().book.name(), "DraftKings");

        let d = quote("caesars", "Caesars", "Over", 120);
        let quotes = [&a, &b, &c, &d];
        assert_eq!(best_quote(&quotes).unwrap().price.value(), 120);
    }

    #[test]
    fn best_quote_of_empty_set_is_none() {
        assert!(best_quote(&[]).is_none());
    }

    #[test]
    fn edge_is_positive_when_price_beats_fair() {
        // Fair 0.55 against -105 (p = 0.5122): positive edge.
        let best = AmericanOdds::try_new(-105).unwrap();
        let edge = edge_percent(dec!(0.55), best, dec!(50));
        assert!(edge > Decimal::ZERO);
        assert!(edge < dec!(50));
    }

    #[test]
    fn edge_is_negative_when_price_trails_fair() {
        let best = AmericanOdds::try_new(-130).unwrap();
        let edge = edge_percent(dec!(0.5), best, dec!(50));
        assert!(edge < Decimal::ZERO);
    }

    #[test]
    fn edge_clamps_at_the_cap() {
        // Fair 0.95 against +900 (p = 0.1): raw edge is 850%.
        let best = AmericanOdds::try_new(900).unwrap();
        assert_eq!(edge_percent(dec!(0.95), best, dec!(50)), dec!(50));

        let bad = AmericanOdds::try_new(-10_000).unwrap();
        assert_eq!(edge_percent(dec!(0.05), bad, dec!(50)), dec!(-50));
    }

    #[test]
    fn resolve_prefers_strictly_higher_edge() {
        let over_quotes: Vec<Quote> = vec![
            quote("fanduel", "FanDuel", "Over", -105),
            quote("draftkings", "DraftKings", "Over", -110),
        ];
        let under_quotes: Vec<Quote> = vec![
            quote("fanduel", "FanDuel", "Under", -125),
            quote("draftkings", "DraftKings", "Under", -120),
        ];
        let over =
            SideCandidate::build("Over", over_quotes.iter().collect(), 1, dec!(50));
        let under =
            SideCandidate::build("Under", under_quotes.iter().collect(), 1, dec!(50));

        let chosen = resolve_sides(&over, &under, DefaultSide::Over);
        assert_eq!(chosen.selection, over.selection);
        assert!(over.edge.unwrap() >= under.edge.unwrap());
    }

    #[test]
    fn resolve_uses_the_only_sufficient_side() {
        let over_quotes: Vec<Quote> = vec![quote("fanduel", "FanDuel", "Over", -110)];
        let under_quotes: Vec<Quote> = vec![
            quote("fanduel", "FanDuel", "Under", -110),
            quote("draftkings", "DraftKings", "Under", -108),
            quote("caesars", "Caesars", "Under", -112),
            quote("betmgm", "BetMGM", "Under", -105),
        ];
        let over = SideCandidate::build("Over", over_quotes.iter().collect(), 4, dec!(50));
        let under =
            SideCandidate::build("Under", under_quotes.iter().collect(), 4, dec!(50));
        assert!(!over.sufficient());
        assert!(under.sufficient());

        let chosen = resolve_sides(&over, &under, DefaultSide::Over);
        assert_eq!(chosen.selection, "Under");
    }

    #[test]
    fn resolve_falls_back_to_configured_default() {
        let over_quotes: Vec<Quote> = vec![quote("fanduel", "FanDuel", "Over", -110)];
        let under_quotes: Vec<Quote> = vec![quote("draftkings", "DraftKings", "Under", -110)];
        let over = SideCandidate::build("Over", over_quotes.iter().collect(), 4, dec!(50));
        let under =
            SideCandidate::build("Under", under_quotes.iter().collect(), 4, dec!(50));

        let chosen = resolve_sides(&over, &under, DefaultSide::Over);
        assert_eq!(chosen.selection, "Over");

        let chosen = resolve_sides(&over, &under, DefaultSide::Under);
        assert_eq!(chosen.selection, "Under");
    }
}
