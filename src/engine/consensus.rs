//! Weighted consensus probability and paired devigging.

use rust_decimal::Decimal;

use crate::domain::Quote;

/// Weight-averaged implied probability across a selection's quotes.
///
/// Sharper books contribute more through their class weight. Returns
/// `None` below `min_points` contributing quotes, or when the weight
/// sum degenerates to zero; the market is then "insufficient data" and
/// no EV is computed.
#[must_use]
pub fn weighted_consensus(quotes: &[&Quote], min_points: usize) -> Option<Decimal> {
    if quotes.len() < min_points || quotes.is_empty() {
        return None;
    }
    let mut weighted_sum = Decimal::ZERO;
    let mut weight_total = Decimal::ZERO;
    for quote in quotes {
        let weight = quote.book.weight();
        weighted_sum += quote.implied_probability() * weight;
        weight_total += weight;
    }
    if weight_total.is_zero() {
        return None;
    }
    Some(weighted_sum / weight_total)
}

/// Remove the bookmaker margin from a paired market: the fair
/// probability of side A is `p_a / (p_a + p_b)`. Returns `None` when
/// the pair degenerates to a zero sum.
#[must_use]
pub fn devig(p_side: Decimal, p_opposite: Decimal) -> Option<Decimal> {
    let total = p_side + p_opposite;
    if total.is_zero() {
        return None;
    }
    Some(p_side / total)
}
