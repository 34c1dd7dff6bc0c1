//! Raw feed snapshot DTOs.
//!
//! These mirror the upstream odds feed shape (game → bookmaker →
//! market → outcome) and deliberately stay loose: prices arrive as
//! decimals and are validated by the normalizer, missing arrays default
//! to empty, and unknown fields are ignored.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A point-in-time snapshot of the raw feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub games: Vec<GameRecord>,
    /// When the snapshot was retrieved; staleness and game-start checks
    /// evaluate against this instant so a rerun on the same snapshot is
    /// deterministic.
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    #[must_use]
    pub fn new(games: Vec<GameRecord>, fetched_at: DateTime<Utc>) -> Self {
        Self { games, fetched_at }
    }
}

/// One game with its per-bookmaker odds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub sport_key: String,
    #[serde(default)]
    pub sport_title: Option<String>,
    pub commence_time: DateTime<Utc>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub bookmakers: Vec<BookmakerRecord>,
}

/// One bookmaker's markets for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmakerRecord {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub markets: Vec<MarketRecord>,
}

/// One raw market with its outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRecord {
    pub key: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outcomes: Vec<OutcomeRecord>,
}

/// One quoted outcome: a side name, an American-odds price, an optional
/// line, and an optional participant (player name for props).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub point: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}
