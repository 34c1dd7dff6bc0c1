//! Middle detection: an Over line strictly below another book's Under
//! line, both independently placeable.

use tracing::debug;

use crate::domain::{Market, Middle, MiddleLeg, Quote};

/// Whether a quote may participate in a middle. Fixed-vig pick'em
/// platforms cannot take the second leg, and synthetic quotes are not
/// placeable at all.
fn placeable(quote: &Quote) -> bool {
    !quote.synthetic && !quote.book.is_fast_moving() && quote.line.is_some()
}

/// Find the widest middle on a market, scanning every quoted line (on
/// or off the consensus). Returns the single best (Over, Under) pair,
/// or `None` when no gap exists.
#[must_use]
pub fn detect(market: &Market) -> Option<Middle> {
    let overs: Vec<&Quote> = market
        .all_quotes()
        .filter(|q| placeable(q) && q.selection.eq_ignore_ascii_case("Over"))
        .collect();
    let unders: Vec<&Quote> = market
        .all_quotes()
        .filter(|q| placeable(q) && q.selection.eq_ignore_ascii_case("Under"))
        .collect();

    let mut best: Option<Middle> = None;
    for over in &overs {
        for under in &unders {
            if over.book == under.book {
                continue;
            }
            let (Some(over_line), Some(under_line)) = (over.line, under.line) else {
                continue;
            };
            if over_line >= under_line {
                continue;
            }
            let candidate = Middle::try_new(
                MiddleLeg {
                    book: over.book.name().to_string(),
                    line: over_line,
                    price: over.price,
                },
                MiddleLeg {
                    book: under.book.name().to_string(),
                    line: under_line,
                    price: under.price,
                },
            )
            .ok()?;
            // Strictly wider gaps replace; ties keep the first pair
            // found so reruns emit the same middle.
            let wider = best
                .as_ref()
                .map_or(true, |current| candidate.gap() > current.gap());
            if wider {
                best = Some(candidate);
            }
        }
    }

    if let Some(ref middle) = best {
        debug!(
            game = %market.game_id,
            market = market.key.raw(),
            gap = %middle.gap(),
            "middle detected"
        );
    }
    best
}
