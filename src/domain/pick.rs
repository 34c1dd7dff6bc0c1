//! The externally visible result record.
//!
//! A [`Pick`] is created fresh on every pipeline run, never mutated
//! after creation, and superseded wholesale on the next run.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market::MarketKey;
use super::odds::AmericanOdds;
use super::opportunity::Opportunity;
use super::quote::Quote;

/// Expected value of a pick, or the first-class sentinel meaning the
/// market did not meet the minimum-data threshold. Insufficient data is
/// not an error: it flows through to the output and sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum Ev {
    Percent(Decimal),
    InsufficientData,
}

impl Ev {
    #[must_use]
    pub const fn as_percent(&self) -> Option<Decimal> {
        match self {
            Self::Percent(value) => Some(*value),
            Self::InsufficientData => None,
        }
    }
}

impl fmt::Display for Ev {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(value) => write!(f, "{}%", value.round_dp(2)),
            Self::InsufficientData => write!(f, "insufficient data"),
        }
    }
}

/// One recommended selection for one market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pick {
    pub game_id: String,
    pub sport_key: String,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub commence_time: DateTime<Utc>,
    pub market: MarketKey,
    /// Player name for prop picks.
    pub player: Option<String>,
    pub selection: String,
    pub line: Option<Decimal>,
    pub best_price: AmericanOdds,
    pub best_book: String,
    /// Weighted consensus expressed as odds ("average" reference).
    pub average_price: Option<AmericanOdds>,
    /// De-vigged fair price from the paired sides.
    pub fair_price: Option<AmericanOdds>,
    pub ev: Ev,
    /// Count of contributing books for the chosen selection.
    pub data_points: usize,
    /// All contributing quotes, for UI expansion.
    pub quotes: Vec<Quote>,
    pub opportunity: Option<Opportunity>,
}

impl Pick {
    /// Ordering metric: the numeric EV when present, otherwise the
    /// attached opportunity's headline metric (ROI, gap, baseline edge).
    #[must_use]
    pub fn sort_value(&self) -> Option<Decimal> {
        self.ev
            .as_percent()
            .or_else(|| self.opportunity.as_ref().map(Opportunity::metric))
    }
}
