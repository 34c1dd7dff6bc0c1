//! Market grouping: raw bookmaker/market/outcome records into logical
//! [`Market`]s ready for aggregation.
//!
//! Standard markets resolve a consensus line per side among traditional
//! (non-fast-moving) books so probability aggregation never mixes, say,
//! +1.5 with -1.5. Player props group by (player, stat) regardless of
//! line. Alternate markets produce one market per signed betting
//! question: the away side of a spread keys under its negated line, so
//! home -3.5 groups with away +3.5 and never with the inverse question.
//! Everything iterates over `BTreeMap`s so a rerun on the same snapshot
//! groups identically.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{AnalysisRequest, EngineConfig};
use crate::domain::{AmericanOdds, Book, Market, MarketKey, PropKey, Quote};
use crate::feed::{GameRecord, Snapshot};

use super::normalize::{is_stale, normalize_price};

/// Group one snapshot into markets, applying the sport/date/market
/// filters, the sportsbook allow-list, and the staleness check.
#[must_use]
pub fn group_snapshot(
    snapshot: &Snapshot,
    request: &AnalysisRequest,
    config: &EngineConfig,
) -> Vec<Market> {
    let mut markets = Vec::new();
    for game in &snapshot.games {
        if !request.sport.matches(&game.sport_key) {
            continue;
        }
        if !request.date.matches(game.commence_time) {
            continue;
        }
        markets.extend(group_game(game, snapshot, request, config));
    }
    debug!(markets = markets.len(), "grouped snapshot");
    markets
}

/// A normalized quote still carrying its market identity.
struct RawQuote {
    key: MarketKey,
    player: Option<String>,
    quote: Quote,
}

fn collect_quotes(
    game: &GameRecord,
    snapshot: &Snapshot,
    request: &AnalysisRequest,
) -> Vec<RawQuote> {
    let mut raw = Vec::new();
    for bookmaker in &game.bookmakers {
        let book = Book::from_feed(&bookmaker.key, &bookmaker.title);
        if !request.allows_book(book.name()) {
            continue;
        }
        for market in &bookmaker.markets {
            let key = MarketKey::parse(&market.key);
            if !request.market.matches(&key) {
                continue;
            }
            // Alternate lines from the unreliable operator are
            // frequently stale or mispriced; its standard markets
            // still participate.
            if key.is_alternate() && book.is_unreliable_for_alternates() {
                continue;
            }
            let last_update = market.last_update.or(bookmaker.last_update);
            if is_stale(&book, last_update, snapshot.fetched_at) {
                continue;
            }
            let timestamp = last_update.unwrap_or(snapshot.fetched_at);
            for outcome in &market.outcomes {
                let Some(price) = normalize_price(outcome.price) else {
                    continue;
                };
                let line = outcome.point.map(|p| p.normalize());
                raw.push(RawQuote {
                    key: key.clone(),
                    player: outcome.description.clone(),
                    quote: Quote::new(book.clone(), &outcome.name, line, price, timestamp),
                });
            }
        }
    }
    raw
}

fn group_game(
    game: &GameRecord,
    snapshot: &Snapshot,
    request: &AnalysisRequest,
    config: &EngineConfig,
) -> Vec<Market> {
    let raw = collect_quotes(game, snapshot, request);

    // Partition into the three grouping families, deduplicating to one
    // quote per (book, selection[, line]) and keeping the most recent.
    let mut standard: BTreeMap<String, BTreeMap<(String, String), Quote>> = BTreeMap::new();
    let mut alternates: BTreeMap<(String, Decimal), BTreeMap<(String, String), Quote>> =
        BTreeMap::new();
    let mut props: BTreeMap<PropKey, BTreeMap<(String, String, String), Quote>> =
        BTreeMap::new();

    for entry in raw {
        let RawQuote { key, player, quote } = entry;
        if key.is_prop() {
            let Some(player) = player else {
                continue; // a prop outcome without a participant is unusable
            };
            let slot = props
                .entry(PropKey {
                    player,
                    stat: key.raw().to_string(),
                })
                .or_default()
                .entry((
                    quote.book.key().to_string(),
                    quote.selection.clone(),
                    line_tag(quote.line),
                ));
            insert_latest(slot, quote);
        } else if key.is_alternate() {
            let Some(line) = quote.line else {
                continue; // alternates are line markets by definition
            };
            // Home at -L and away at +L are complementary legs of one
            // question; keying the away side by its negated line puts
            // the pair in the same group and keeps the inverse question
            // (home +L, away -L) separate.
            let canonical = if game.away_team.as_deref() == Some(quote.selection.as_str()) {
                (-line).normalize()
            } else {
                line.normalize()
            };
            let slot = alternates
                .entry((key.raw().to_string(), canonical))
                .or_default()
                .entry((quote.book.key().to_string(), quote.selection.clone()));
            insert_latest(slot, quote);
        } else {
            let slot = standard
                .entry(key.raw().to_string())
                .or_default()
                .entry((quote.book.key().to_string(), quote.selection.clone()));
            insert_latest(slot, quote);
        }
    }

    let mut markets = Vec::new();

    for (raw_key, quotes) in standard {
        let quotes: Vec<Quote> = quotes.into_values().collect();
        markets.push(build_standard_market(game, &raw_key, quotes, config));
    }

    for ((raw_key, canonical), quotes) in alternates {
        let quotes: Vec<Quote> = quotes.into_values().collect();
        markets.push(build_alternate_market(game, &raw_key, canonical, quotes));
    }

    for (prop, quotes) in props {
        let quotes: Vec<Quote> = quotes.into_values().collect();
        markets.push(build_prop_market(game, &prop.stat, prop.player, quotes, config));
    }

    markets
}

fn insert_latest(slot: std::collections::btree_map::Entry<'_, impl Ord, Quote>, quote: Quote) {
    match slot {
        std::collections::btree_map::Entry::Vacant(vacant) => {
            vacant.insert(quote);
        }
        std::collections::btree_map::Entry::Occupied(mut occupied) => {
            if quote.last_update > occupied.get().last_update {
                occupied.insert(quote);
            }
        }
    }
}

fn line_tag(line: Option<Decimal>) -> String {
    line.map_or_else(|| "-".to_string(), |l| l.to_string())
}

/// The most frequently quoted line, ties broken toward the smallest
/// line so reruns resolve identically.
fn modal_line(lines: &[Decimal]) -> Option<Decimal> {
    let mut counts: BTreeMap<Decimal, usize> = BTreeMap::new();
    for line in lines {
        *counts.entry(line.normalize()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(line_a, count_a), (line_b, count_b)| {
            count_a.cmp(count_b).then(line_b.cmp(line_a))
        })
        .map(|(line, _)| line)
}

/// Consensus line for one side: mode among traditional books, falling
/// back to the full book set when no traditional book quoted the side.
fn side_consensus(quotes: &[Quote], selection: &str) -> Option<Decimal> {
    let traditional: Vec<Decimal> = quotes
        .iter()
        .filter(|q| q.selection == selection && !q.book.is_fast_moving())
        .filter_map(|q| q.line)
        .collect();
    if let Some(line) = modal_line(&traditional) {
        return Some(line);
    }
    let all: Vec<Decimal> = quotes
        .iter()
        .filter(|q| q.selection == selection)
        .filter_map(|q| q.line)
        .collect();
    modal_line(&all)
}

fn market_shell(game: &GameRecord, raw_key: &str) -> Market {
    Market {
        game_id: game.id.clone(),
        sport_key: game.sport_key.clone(),
        home_team: game.home_team.clone(),
        away_team: game.away_team.clone(),
        commence_time: game.commence_time,
        key: MarketKey::parse(raw_key),
        player: None,
        consensus_line: None,
        lines_seen: Vec::new(),
        quotes: Vec::new(),
        off_line: Vec::new(),
    }
}

fn build_standard_market(
    game: &GameRecord,
    raw_key: &str,
    quotes: Vec<Quote>,
    config: &EngineConfig,
) -> Market {
    let mut market = market_shell(game, raw_key);

    // Per-side consensus lines; moneylines have no lines at all.
    let mut selections: Vec<String> = Vec::new();
    for quote in &quotes {
        if !selections.contains(&quote.selection) {
            selections.push(quote.selection.clone());
        }
    }
    let mut consensus_by_side: BTreeMap<String, Decimal> = BTreeMap::new();
    for selection in &selections {
        if let Some(line) = side_consensus(&quotes, selection) {
            consensus_by_side.insert(selection.clone(), line);
        }
    }

    market.consensus_line = consensus_by_side.values().next().copied();
    market.lines_seen = distinct_lines(&quotes);

    for quote in quotes {
        let keep = match (quote.line, consensus_by_side.get(&quote.selection)) {
            (None, _) => true, // moneyline side
            (Some(_), Some(consensus)) => quote.at_line(*consensus, config.line_tolerance),
            (Some(_), None) => false,
        };
        if keep {
            market.quotes.push(quote);
        } else {
            market.off_line.push(quote);
        }
    }
    market
}

fn build_alternate_market(
    game: &GameRecord,
    raw_key: &str,
    canonical: Decimal,
    quotes: Vec<Quote>,
) -> Market {
    let mut market = market_shell(game, raw_key);
    // Every quote in the group belongs to the same signed question by
    // construction, so every quote aggregates. The canonical line is
    // the home/Over side's line.
    market.consensus_line = Some(canonical);
    market.lines_seen = distinct_lines(&quotes);
    market.quotes = quotes;
    market
}

fn build_prop_market(
    game: &GameRecord,
    raw_key: &str,
    player: String,
    quotes: Vec<Quote>,
    config: &EngineConfig,
) -> Market {
    let mut market = market_shell(game, raw_key);
    market.player = Some(player);
    market.lines_seen = distinct_lines(&quotes);

    // Consensus line via mode among traditional books only; fast-moving
    // platforms reprice too often to anchor the line.
    let traditional: Vec<Decimal> = quotes
        .iter()
        .filter(|q| !q.book.is_fast_moving())
        .filter_map(|q| q.line)
        .collect();
    let all: Vec<Decimal> = quotes.iter().filter_map(|q| q.line).collect();
    let consensus = modal_line(&traditional).or_else(|| modal_line(&all));
    market.consensus_line = consensus;

    for quote in quotes {
        let keep = match (quote.line, consensus) {
            (Some(_), Some(line)) => quote.at_line(line, config.line_tolerance),
            _ => false,
        };
        if keep {
            market.quotes.push(quote);
        } else {
            market.off_line.push(quote);
        }
    }

    synthesize_unders(&mut market, config);
    market
}

/// Fast-moving pick'em platforms publish only an Over price. Synthesize
/// the complementary Under at the fixed standard vig so both sides can
/// be compared on equal footing. Traditional books never receive a
/// synthetic quote.
fn synthesize_unders(market: &mut Market, config: &EngineConfig) {
    let Ok(price) = AmericanOdds::try_new(config.synthetic_under_price) else {
        return; // config validation rejects this before a run
    };
    let mut synthesized = Vec::new();
    for quote in &market.quotes {
        if !quote.book.is_fast_moving() || !quote.selection.eq_ignore_ascii_case("Over") {
            continue;
        }
        let has_under = market.quotes.iter().any(|q| {
            q.book == quote.book && q.selection.eq_ignore_ascii_case("Under")
        });
        if !has_under {
            synthesized.push(Quote::synthetic(
                quote.book.clone(),
                "Under",
                quote.line,
                price,
                quote.last_update,
            ));
        }
    }
    market.quotes.extend(synthesized);
}

/// Collapse per-question alternate markets into one scan market per
/// (game, raw market key), so middle scanning can pair an Over at one
/// line with an Under at another. Keyed by the raw key, not the family,
/// so period variants stay separate. Non-alternate markets are ignored.
#[must_use]
pub fn merge_alternates(markets: &[Market]) -> Vec<Market> {
    let mut merged: BTreeMap<(String, String), Market> = BTreeMap::new();
    for market in markets {
        if !market.key.is_alternate() {
            continue;
        }
        let entry = merged
            .entry((market.game_id.clone(), market.key.raw().to_string()))
            .or_insert_with(|| {
                let mut shell = market.clone();
                shell.consensus_line = None;
                shell.lines_seen = Vec::new();
                shell.quotes = Vec::new();
                shell.off_line = Vec::new();
                shell
            });
        entry.quotes.extend(market.quotes.iter().cloned());
        entry.off_line.extend(market.off_line.iter().cloned());
    }
    let mut merged: Vec<Market> = merged.into_values().collect();
    for market in &mut merged {
        market.lines_seen = distinct_lines(&market.quotes);
    }
    merged
}

fn distinct_lines(quotes: &[Quote]) -> Vec<Decimal> {
    let mut lines: Vec<Decimal> = Vec::new();
    for line in quotes.iter().filter_map(|q| q.line) {
        let normalized = line.normalize();
        if !lines.contains(&normalized) {
            lines.push(normalized);
        }
    }
    lines.sort();
    lines
}
