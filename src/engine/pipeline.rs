//! The full analysis pipeline: group, aggregate, classify, filter,
//! sort.
//!
//! Every stage is a pure `Vec<Pick>` to `Vec<Pick>` transform; no stage
//! mutates a record created by an earlier stage. Running the pipeline
//! twice on the same snapshot produces identical output.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{AnalysisRequest, BetMode, EngineConfig};
use crate::domain::{AmericanOdds, Ev, Market, Opportunity, Pick};
use crate::feed::Snapshot;

use super::arbitrage;
use super::consensus::devig;
use super::edge::{resolve_sides, SideCandidate};
use super::exchange_edge;
use super::grouper::{group_snapshot, merge_alternates};
use super::middle;

/// The odds-aggregation and edge-detection engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the whole pipeline over one immutable snapshot.
    #[must_use]
    pub fn analyze(&self, snapshot: &Snapshot, request: &AnalysisRequest) -> Vec<Pick> {
        let markets = group_snapshot(snapshot, request, &self.config);
        let min_points = request.effective_min_data_points(&self.config);

        let picks: Vec<Pick> = match request.mode {
            BetMode::Straight | BetMode::Props => markets
                .iter()
                .filter_map(|m| self.build_ev_pick(m, min_points))
                .collect(),
            BetMode::Arbitrage => markets
                .iter()
                .filter_map(|m| self.build_arbitrage_pick(m))
                .collect(),
            BetMode::Middles => {
                // Alternate markets are grouped one-per-question for
                // aggregation; re-merge them per key so a middle can
                // pair an Over at one line with an Under at another.
                let merged = merge_alternates(&markets);
                markets
                    .iter()
                    .filter(|m| !m.key.is_alternate())
                    .chain(merged.iter())
                    .filter_map(|m| Self::build_middle_pick(m))
                    .collect()
            }
            BetMode::Exchanges => markets
                .iter()
                .flat_map(|m| self.build_exchange_picks(m))
                .collect(),
        };
        debug!(candidates = picks.len(), "classified picks");

        let picks = drop_suppressed_synthetic_unders(picks, &self.config);
        let picks = apply_mode_market_filter(picks, request.mode);
        let picks = drop_started_games(picks, snapshot.fetched_at);
        let picks = sort_picks(picks);

        info!(picks = picks.len(), mode = ?request.mode, "pipeline run complete");
        picks
    }

    /// Straight/prop pick: pick the better-EV side of the market.
    fn build_ev_pick(&self, market: &Market, min_points: usize) -> Option<Pick> {
        let cap = self.config.ev_cap_percent;
        let selections = market.selections();
        let first = selections.first()?;

        let side_a = SideCandidate::build(
            first,
            market.quotes_for(first).collect(),
            min_points,
            cap,
        );
        let chosen = match selections.get(1) {
            Some(second) => {
                let side_b = SideCandidate::build(
                    second,
                    market.quotes_for(second).collect(),
                    min_points,
                    cap,
                );
                resolve_sides(&side_a, &side_b, self.config.default_side).clone()
            }
            None => side_a,
        };

        let best = chosen.best?;
        let opposite = selections
            .iter()
            .copied()
            .find(|&s| s != chosen.selection)
            .map(|s| SideCandidate::build(s, market.quotes_for(s).collect(), min_points, cap));

        let average_price = chosen
            .consensus
            .and_then(|p| AmericanOdds::from_probability(p).ok());
        let fair_price = match (chosen.consensus, opposite.as_ref().and_then(|o| o.consensus)) {
            (Some(p_side), Some(p_opp)) => devig(p_side, p_opp)
                .and_then(|p| AmericanOdds::from_probability(p).ok()),
            _ => None,
        };
        let ev = match chosen.edge {
            Some(edge) => Ev::Percent(edge),
            None => Ev::InsufficientData,
        };

        Some(Pick {
            game_id: market.game_id.clone(),
            sport_key: market.sport_key.clone(),
            home_team: market.home_team.clone(),
            away_team: market.away_team.clone(),
            commence_time: market.commence_time,
            market: market.key.clone(),
            player: market.player.clone(),
            selection: chosen.selection.to_string(),
            line: best.line.or(market.consensus_line),
            best_price: best.price,
            best_book: best.book.name().to_string(),
            average_price,
            fair_price,
            ev,
            data_points: chosen.quotes.len(),
            quotes: market.quotes.clone(),
            opportunity: None,
        })
    }

    fn build_arbitrage_pick(&self, market: &Market) -> Option<Pick> {
        let arb = arbitrage::detect(
            market,
            self.config.arbitrage_stake,
            self.config.min_arbitrage_roi_percent,
        )?;
        let data_points = market.quotes_for(&arb.primary().selection).count();
        Some(Pick {
            game_id: market.game_id.clone(),
            sport_key: market.sport_key.clone(),
            home_team: market.home_team.clone(),
            away_team: market.away_team.clone(),
            commence_time: market.commence_time,
            market: market.key.clone(),
            player: market.player.clone(),
            selection: arb.primary().selection.clone(),
            line: market.consensus_line,
            best_price: arb.primary().price,
            best_book: arb.primary().book.clone(),
            average_price: None,
            fair_price: None,
            ev: Ev::InsufficientData,
            data_points,
            quotes: market.quotes.clone(),
            opportunity: Some(Opportunity::Arbitrage(arb)),
        })
    }

    fn build_middle_pick(market: &Market) -> Option<Pick> {
        let middle = middle::detect(market)?;
        Some(Pick {
            game_id: market.game_id.clone(),
            sport_key: market.sport_key.clone(),
            home_team: market.home_team.clone(),
            away_team: market.away_team.clone(),
            commence_time: market.commence_time,
            market: market.key.clone(),
            player: market.player.clone(),
            selection: "Over".to_string(),
            line: Some(middle.over().line),
            best_price: middle.over().price,
            best_book: middle.over().book.clone(),
            average_price: None,
            fair_price: None,
            ev: Ev::InsufficientData,
            data_points: market.all_quotes().count(),
            quotes: market.quotes.clone(),
            opportunity: Some(Opportunity::Middle(middle)),
        })
    }

    fn build_exchange_picks(&self, market: &Market) -> Vec<Pick> {
        exchange_edge::detect(market, self.config.ev_cap_percent)
            .into_iter()
            .map(|hit| Pick {
                game_id: market.game_id.clone(),
                sport_key: market.sport_key.clone(),
                home_team: market.home_team.clone(),
                away_team: market.away_team.clone(),
                commence_time: market.commence_time,
                market: market.key.clone(),
                player: market.player.clone(),
                selection: hit.selection,
                line: hit.quote.line.or(market.consensus_line),
                best_price: hit.quote.price,
                best_book: hit.edge.book.clone(),
                average_price: None,
                fair_price: None,
                ev: Ev::Percent(hit.edge.edge_percent),
                data_points: market.quotes.len(),
                quotes: market.quotes.clone(),
                opportunity: Some(Opportunity::ExchangeEdge(hit.edge)),
            })
            .collect()
    }
}

/// Legacy toggle: drop picks whose best quote is a synthetic Under.
/// Disabled by default in favor of always allowing synthetic Unders.
fn drop_suppressed_synthetic_unders(picks: Vec<Pick>, config: &EngineConfig) -> Vec<Pick> {
    if !config.suppress_synthetic_unders {
        return picks;
    }
    picks
        .into_iter()
        .filter(|pick| {
            !pick.quotes.iter().any(|q| {
                q.synthetic
                    && q.selection == pick.selection
                    && q.book.name() == pick.best_book
                    && q.price == pick.best_price
            })
        })
        .collect()
}

/// Straight mode drops player props; props mode keeps only them.
fn apply_mode_market_filter(picks: Vec<Pick>, mode: BetMode) -> Vec<Pick> {
    match mode {
        BetMode::Straight => picks.into_iter().filter(|p| !p.market.is_prop()).collect(),
        BetMode::Props => picks.into_iter().filter(|p| p.market.is_prop()).collect(),
        _ => picks,
    }
}

/// Drop picks whose game already started. Player props are exempt:
/// prop feeds carry no reliable per-pick timing guarantee.
fn drop_started_games(picks: Vec<Pick>, now: DateTime<Utc>) -> Vec<Pick> {
    picks
        .into_iter()
        .filter(|pick| pick.market.is_prop() || pick.commence_time > now)
        .collect()
}

/// Stable sort: picks carrying a numeric metric first, descending;
/// insufficient-data picks last, by descending contributing-book count.
fn sort_picks(mut picks: Vec<Pick>) -> Vec<Pick> {
    picks.sort_by(|a, b| match (a.sort_value(), b.sort_value()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.data_points.cmp(&a.data_points),
    });
    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use crate::domain::MarketKey;

    fn pick(selection: &str, ev: Ev, data_points: usize) -> Pick {
        Pick {
            game_id: "g1".into(),
            sport_key: "basketball_nba".into(),
            home_team: None,
            away_team: None,
            commence_time: Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
            market: MarketKey::parse("totals"),
            player: None,
            selection: selection.into(),
            line: Some(dec!(218.5)),
            best_price: AmericanOdds::try_new(-105).unwrap(),
            best_book: "FanDuel".into(),
            average_price: None,
            fair_price: None,
            ev,
            data_points,
            quotes: Vec::new(),
            opportunity: None,
        }
    }

    #[test]
    fn sort_puts_valid_ev_first_descending() {
        let picks = vec![
            pick("A", Ev::InsufficientData, 2),
            pick("B", Ev::Percent(dec!(1.5)), 5),
            pick("C", Ev::InsufficientData, 6),
            pick("D", Ev::Percent(dec!(4.0)), 4),
        ];
        let sorted = sort_picks(picks);
        let order: Vec<&str> = sorted.iter().map(|p| p.selection.as_str()).collect();
        assert_eq!(order, vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let picks = vec![
            pick("first", Ev::Percent(dec!(2)), 4),
            pick("second", Ev::Percent(dec!(2)), 4),
        ];
        let sorted = sort_picks(picks);
        assert_eq!(sorted[0].selection, "first");
        assert_eq!(sorted[1].selection, "second");
    }

    #[test]
    fn straight_mode_drops_props() {
        let mut prop = pick("Over", Ev::Percent(dec!(2)), 4);
        prop.market = MarketKey::parse("player_points");
        let picks = vec![prop, pick("Under", Ev::Percent(dec!(1)), 4)];

        let straight = apply_mode_market_filter(picks.clone(), BetMode::Straight);
        assert_eq!(straight.len(), 1);
        assert!(!straight[0].market.is_prop());

        let props = apply_mode_market_filter(picks, BetMode::Props);
        assert_eq!(props.len(), 1);
        assert!(props[0].market.is_prop());
    }

    #[test]
    fn started_games_are_dropped_but_props_are_exempt(){
        let now = Utc.with_ymd_and_hms(2026, 9, 2, 0, 0, 0).unwrap();
        let started = pick("Over", Ev::Percent(dec!(2)), 4); // commences 9/1
        let mut started_prop = pick("Under", Ev::Percent(dec!(1)), 4);
        started_prop.market = MarketKey::parse("player_points");

        let kept = drop_started_games(vec![started, started_prop], now);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].market.is_prop());
    }

}
