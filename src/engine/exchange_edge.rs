//! Edges against the reference-exchange baseline.
//!
//! No probability aggregation happens here: each book's price is
//! compared pairwise against the baseline exchange's price for the
//! same selection. A baseline that prices only one side of a two-sided
//! market is itself a signal: the missing side's probability is
//! inferred as the complement of the quoted side.

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{ExchangeEdge, Market, Quote};

use super::edge::{best_quote, edge_percent};

/// One selection where some book beats the baseline.
#[derive(Debug, Clone)]
pub struct ExchangeEdgeHit {
    pub selection: String,
    pub quote: Quote,
    pub edge: ExchangeEdge,
}

/// Scan a market for prices beating the exchange baseline.
///
/// When both baseline exchanges quote a selection, the higher (more
/// conservative) baseline price is used, so an edge is only reported
/// when a book beats the best exchange price.
#[must_use]
pub fn detect(market: &Market, cap: Decimal) -> Vec<ExchangeEdgeHit> {
    let selections = market.selections();
    let mut hits = Vec::new();

    for selection in &selections {
        let baseline_quotes: Vec<&Quote> = market
            .quotes_for(selection)
            .filter(|q| !q.synthetic && q.book.is_baseline_exchange())
            .collect();

        if let Some(baseline) = best_quote(&baseline_quotes) {
            if let Some(hit) = direct_edge(market, selection, baseline, cap) {
                hits.push(hit);
            }
        } else if let Some(hit) = one_sided_edge(market, selection, &selections, cap) {
            hits.push(hit);
        }
    }

    if !hits.is_empty() {
        debug!(
            game = %market.game_id,
            market = market.key.raw(),
            hits = hits.len(),
            "exchange edges detected"
        );
    }
    hits
}

/// A book pricing the selection strictly better than the baseline,
/// scored with the baseline's implied probability as fair.
fn direct_edge(
    market: &Market,
    selection: &str,
    baseline: &Quote,
    cap: Decimal,
) -> Option<ExchangeEdgeHit> {
    let candidates: Vec<&Quote> = market
        .quotes_for(selection)
        .filter(|q| !q.synthetic && !q.book.is_baseline_exchange())
        .filter(|q| q.price.is_better_than(baseline.price))
        .collect();
    let best = best_quote(&candidates)?;

    let p_base = baseline.implied_probability();
    let edge = edge_percent(p_base, best.price, cap);
    Some(ExchangeEdgeHit {
        selection: selection.to_string(),
        quote: (*best).clone(),
        edge: ExchangeEdge {
            book: best.book.name().to_string(),
            price: best.price,
            baseline_book: baseline.book.name().to_string(),
            baseline_price: Some(baseline.price),
            edge_percent: edge,
            one_sided: false,
        },
    })
}

/// The baseline prices only the opposite side: its unwillingness to
/// offer this side implies the side is underpriced elsewhere. Infer
/// the side's fair probability as the complement of the quoted side
/// and surface the best available price, tagged one-sided.
fn one_sided_edge(
    market: &Market,
    selection: &str,
    selections: &[&str],
    cap: Decimal,
) -> Option<ExchangeEdgeHit> {
    if selections.len() != 2 {
        return None;
    }
    let opposite = selections.iter().copied().find(|&s| s != selection)?;
    let opposite_baseline: Vec<&Quote> = market
        .quotes_for(opposite)
        .filter(|q| !q.synthetic && q.book.is_baseline_exchange())
        .collect();
    let baseline = best_quote(&opposite_baseline)?;

    let inferred = Decimal::ONE - baseline.implied_probability();
    if inferred <= Decimal::ZERO || inferred >= Decimal::ONE {
        return None;
    }

    let candidates: Vec<&Quote> = market
        .quotes_for(selection)
        .filter(|q| !q.synthetic && !q.book.is_baseline_exchange())
        .collect();
    let best = best_quote(&candidates)?;

    let edge = edge_percent(inferred, best.price, cap);
    Some(ExchangeEdgeHit {
        selection: selection.to_string(),
        quote: (*best).clone(),
        edge: ExchangeEdge {
            book: best.book.name().to_string(),
            price: best.price,
            baseline_book: baseline.book.name().to_string(),
            baseline_price: None,
            edge_percent: edge,
            one_sided: true,
        },
    })
}
