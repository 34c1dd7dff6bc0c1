//! Market classification and the grouped [`Market`] unit of aggregation.
//!
//! A [`Market`] is one logical betting question for one game: the
//! moneyline, a spread at its consensus line, a total, a period or
//! alternate variant, or a single player prop. Quotes quoted off the
//! consensus line are tracked (`off_line`) but excluded from
//! probability aggregation so that +1.5 never averages against -1.5.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quote::Quote;

/// The broad shape of a market key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketKind {
    Moneyline,
    Spread,
    Total,
    PlayerProp,
}

/// Game segment a market applies to, parsed from the raw key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    FullGame,
    FirstHalf,
    SecondHalf,
    FirstQuarter,
    SecondQuarter,
    ThirdQuarter,
    FourthQuarter,
}

impl Period {
    fn from_suffix(raw: &str) -> Self {
        if raw.ends_with("_h1") {
            Self::FirstHalf
        } else if raw.ends_with("_h2") {
            Self::SecondHalf
        } else if raw.ends_with("_q1") {
            Self::FirstQuarter
        } else if raw.ends_with("_q2") {
            Self::SecondQuarter
        } else if raw.ends_with("_q3") {
            Self::ThirdQuarter
        } else if raw.ends_with("_q4") {
            Self::FourthQuarter
        } else {
            Self::FullGame
        }
    }
}

/// Parsed identity of a raw feed market key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketKey {
    raw: String,
    kind: MarketKind,
    period: Period,
    alternate: bool,
}

impl MarketKey {
    /// Classify a raw feed key such as `h2h`, `spreads`,
    /// `alternate_totals`, `totals_h1`, or `player_points`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let alternate = raw.starts_with("alternate_");
        let kind = if raw.starts_with("player_") {
            MarketKind::PlayerProp
        } else if raw.contains("spread") {
            MarketKind::Spread
        } else if raw.contains("total") {
            MarketKind::Total
        } else {
            MarketKind::Moneyline
        };
        Self {
            raw: raw.to_string(),
            kind,
            period: Period::from_suffix(raw),
            alternate,
        }
    }

    /// The raw feed key.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub const fn kind(&self) -> MarketKind {
        self.kind
    }

    #[must_use]
    pub const fn period(&self) -> Period {
        self.period
    }

    #[must_use]
    pub const fn is_alternate(&self) -> bool {
        self.alternate
    }

    #[must_use]
    pub const fn is_prop(&self) -> bool {
        matches!(self.kind, MarketKind::PlayerProp)
    }

    /// The base market family with alternate prefix and period suffix
    /// stripped: `alternate_totals` and `totals_h1` both report
    /// `totals`. Used by the market-type filter, which expands one
    /// family to its period and alternate variants.
    #[must_use]
    pub fn family(&self) -> &str {
        let mut base = self.raw.as_str();
        if let Some(stripped) = base.strip_prefix("alternate_") {
            base = stripped;
        }
        for suffix in ["_h1", "_h2", "_q1", "_q2", "_q3", "_q4"] {
            if let Some(stripped) = base.strip_suffix(suffix) {
                base = stripped;
                break;
            }
        }
        base
    }
}

/// Composite grouping key for player props: one market per
/// (player, stat), independent of line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropKey {
    pub player: String,
    pub stat: String,
}

/// One logical betting question for one game, with its filtered quotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub game_id: String,
    pub sport_key: String,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub commence_time: DateTime<Utc>,
    pub key: MarketKey,
    /// Player name for prop markets.
    pub player: Option<String>,
    /// Consensus line resolved among non-fast-moving books. `None` for
    /// moneylines and for markets where no traditional book quoted one.
    pub consensus_line: Option<Decimal>,
    /// Distinct lines observed across all books (props track these even
    /// though only consensus-line quotes aggregate).
    pub lines_seen: Vec<Decimal>,
    /// Quotes eligible for probability aggregation.
    pub quotes: Vec<Quote>,
    /// Quotes at a different line: tracked for middles and provenance,
    /// excluded from aggregation.
    pub off_line: Vec<Quote>,
}

impl Market {
    /// Distinct selection names in first-seen order.
    #[must_use]
    pub fn selections(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for quote in &self.quotes {
            if !seen.contains(&quote.selection.as_str()) {
                seen.push(&quote.selection);
            }
        }
        seen
    }

    /// Aggregation-eligible quotes for one selection.
    pub fn quotes_for<'a>(&'a self, selection: &'a str) -> impl Iterator<Item = &'a Quote> {
        self.quotes.iter().filter(move |q| q.selection == selection)
    }

    /// Every quote, on or off the consensus line.
    pub fn all_quotes(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.iter().chain(self.off_line.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_keys() {
        let key = MarketKey::parse("h2h");
        assert_eq!(key.kind(), MarketKind::Moneyline);
        assert_eq!(key.period(), Period::FullGame);
        assert!(!key.is_alternate());

        assert_eq!(MarketKey::parse("spreads").kind(), MarketKind::Spread);
        assert_eq!(MarketKey::parse("totals").kind(), MarketKind::Total);
    }

    #[test]
    fn parses_alternate_and_period_keys() {
        let alt = MarketKey::parse("alternate_spreads");
        assert_eq!(alt.kind(), MarketKind::Spread);
        assert!(alt.is_alternate());

        let half = MarketKey::parse("totals_h1");
        assert_eq!(half.kind(), MarketKind::Total);
        assert_eq!(half.period(), Period::FirstHalf);

        let quarter = MarketKey::parse("h2h_q3");
        assert_eq!(quarter.kind(), MarketKind::Moneyline);
        assert_eq!(quarter.period(), Period::ThirdQuarter);
    }

    #[test]
    fn family_strips_alternate_prefix_and_period_suffix() {
        assert_eq!(MarketKey::parse("totals").family(), "totals");
        assert_eq!(MarketKey::parse("alternate_totals").family(), "totals");
        assert_eq!(MarketKey::parse("totals_h1").family(), "totals");
        assert_eq!(MarketKey::parse("alternate_spreads").family(), "spreads");
    }

    #[test]
    fn parses_player_props() {
        let key = MarketKey::parse("player_points");
        assert_eq!(key.kind(), MarketKind::PlayerProp);
        assert!(key.is_prop());
    }

    #[test]
    fn prop_key_equality_is_field_wise() {
        let a = PropKey {
            player: "LeBron James".into(),
            stat: "player_points".into(),
        };
        let b = PropKey {
            player: "LeBron James".into(),
            stat: "player_points".into(),
        };
        let c = PropKey {
            player: "LeBron James".into(),
            stat: "player_assists".into(),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
