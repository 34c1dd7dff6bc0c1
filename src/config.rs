//! Engine configuration and per-run analysis requests.
//!
//! [`EngineConfig`] holds the tunables with business defaults (minimum
//! data points, the fixed pick'em vig, the EV cap) and loads from a
//! TOML file. [`AnalysisRequest`] carries one invocation's filters:
//! sport, date, market family, bet mode, and sportsbook allow-list.

use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::MarketKey;
use crate::error::{ConfigError, Error, Result};

/// Which class of result a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BetMode {
    /// Straight bets on standard markets (moneyline/spread/total).
    #[default]
    Straight,
    /// Player props.
    Props,
    /// Cross-book arbitrage pairs.
    Arbitrage,
    /// Line-gap middles.
    Middles,
    /// Edges against the reference-exchange baseline.
    Exchanges,
}

/// The side a two-sided market falls back to when neither side meets
/// the minimum-data threshold. An explicit, configurable tie-break: the
/// choice carries no signal and such picks stay marked insufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DefaultSide {
    #[default]
    Over,
    Under,
}

/// Logging section: level plus a pretty/json format switch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Auto-refresh cadence and the manual-refresh cooldown.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub cooldown_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 45,
            cooldown_secs: 10,
        }
    }
}

/// Engine tunables with their business defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum contributing books before EV is computed (relaxed to 1
    /// when a sportsbook allow-list restricts the candidate set).
    pub min_data_points: usize,
    /// Fixed effective vig assumed for fast-moving pick'em platforms
    /// that publish only an Over price. A business assumption, not a
    /// derived value.
    pub synthetic_under_price: i32,
    /// Computed EV beyond this magnitude is treated as a data artifact
    /// and clamped.
    pub ev_cap_percent: Decimal,
    /// Tolerance for treating two quoted lines as the same line.
    pub line_tolerance: Decimal,
    /// Arbitrage pairs below this ROI are discarded.
    pub min_arbitrage_roi_percent: Decimal,
    /// Total stake used for arbitrage stake-split breakdowns.
    pub arbitrage_stake: Decimal,
    /// Tie-break side when neither side has enough data.
    pub default_side: DefaultSide,
    /// Legacy toggle: suppress picks whose best quote is a synthetic
    /// Under. Disabled by default in favor of always allowing them.
    pub suppress_synthetic_unders: bool,
    pub refresh: RefreshConfig,
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_data_points: 4,
            synthetic_under_price: -119,
            ev_cap_percent: Decimal::from(50),
            line_tolerance: Decimal::new(1, 2),
            min_arbitrage_roi_percent: Decimal::ONE,
            arbitrage_stake: Decimal::ONE_HUNDRED,
            default_side: DefaultSide::Over,
            suppress_synthetic_unders: false,
            refresh: RefreshConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unreadable or invalid files.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(ConfigError::ReadFile(e)))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| Error::Config(ConfigError::Parse(e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.min_data_points == 0 {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "min_data_points",
                reason: "must be at least 1".into(),
            }));
        }
        if self.synthetic_under_price > -100 {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "synthetic_under_price",
                reason: format!(
                    "must be valid negative American odds, got {}",
                    self.synthetic_under_price
                ),
            }));
        }
        if self.ev_cap_percent <= Decimal::ZERO {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "ev_cap_percent",
                reason: "must be positive".into(),
            }));
        }
        if self.line_tolerance < Decimal::ZERO {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "line_tolerance",
                reason: "must not be negative".into(),
            }));
        }
        if self.arbitrage_stake <= Decimal::ZERO {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "arbitrage_stake",
                reason: "must be positive".into(),
            }));
        }
        if self.refresh.interval_secs == 0 {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "refresh.interval_secs",
                reason: "must be positive".into(),
            }));
        }
        Ok(())
    }

    /// Initialize tracing from the logging section.
    pub fn init_logging(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.logging.level.clone()));

        // Logs go to stderr so `--json` output stays machine-readable.
        if self.logging.format == "json" {
            let _ = tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init();
        } else {
            let _ = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init();
        }
    }
}

/// Sport selector: everything, or a set of sport keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SportFilter {
    #[default]
    All,
    Keys(Vec<String>),
}

impl SportFilter {
    /// Parse `"all"`, one key, or comma-joined keys.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        Self::Keys(
            trimmed
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    #[must_use]
    pub fn matches(&self, sport_key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Keys(keys) => keys.iter().any(|k| k.eq_ignore_ascii_case(sport_key)),
        }
    }
}

/// Calendar filter: all upcoming games, or one specific local date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFilter {
    #[default]
    AllUpcoming,
    On(NaiveDate),
}

impl DateFilter {
    /// Parse a `YYYY-MM-DD` date; empty or "all" means all upcoming.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Some(Self::AllUpcoming);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().map(Self::On)
    }

    #[must_use]
    pub fn matches(&self, commence_time: chrono::DateTime<chrono::Utc>) -> bool {
        match self {
            Self::AllUpcoming => true,
            Self::On(date) => {
                commence_time.with_timezone(&chrono::Local).date_naive() == *date
            }
        }
    }
}

/// Market-type filter: one family expands to its period and alternate
/// variants, `props` matches every player market.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MarketFilter {
    #[default]
    All,
    Families(Vec<String>),
}

impl MarketFilter {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        Self::Families(
            trimmed
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    #[must_use]
    pub fn matches(&self, key: &MarketKey) -> bool {
        match self {
            Self::All => true,
            Self::Families(families) => families.iter().any(|family| {
                if family == "props" {
                    key.is_prop()
                } else {
                    key.family() == family || key.raw() == family
                }
            }),
        }
    }
}

/// One pipeline invocation's scope and filters.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub sport: SportFilter,
    pub date: DateFilter,
    pub market: MarketFilter,
    pub mode: BetMode,
    /// Canonical book names to restrict to; empty means no restriction.
    pub books: Vec<String>,
    /// Per-run override of the minimum data points.
    pub min_data_points: Option<usize>,
}

impl AnalysisRequest {
    /// Whether a book survives the allow-list.
    #[must_use]
    pub fn allows_book(&self, name: &str) -> bool {
        self.books.is_empty() || self.books.iter().any(|b| b.eq_ignore_ascii_case(name))
    }

    /// Effective minimum-data-points threshold. A sportsbook allow-list
    /// already restricts the candidate set, so the floor relaxes to 1.
    #[must_use]
    pub fn effective_min_data_points(&self, config: &EngineConfig) -> usize {
        if self.books.is_empty() {
            self.min_data_points.unwrap_or(config.min_data_points)
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_match_business_assumptions() {
        let config = EngineConfig::default();
        assert_eq!(config.min_data_points, 4);
        assert_eq!(config.synthetic_under_price, -119);
        assert_eq!(config.ev_cap_percent, dec!(50));
        assert_eq!(config.line_tolerance, dec!(0.01));
        assert_eq!(config.min_arbitrage_roi_percent, dec!(1));
        assert_eq!(config.refresh.cooldown_secs, 10);
        assert_eq!(config.refresh.interval_secs, 45);
        assert!(!config.suppress_synthetic_unders);
    }

    #[test]
    fn validate_rejects_positive_synthetic_vig() {
        let config = EngineConfig {
            synthetic_under_price: 119,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "synthetic_under_price",
                ..
            }))
        ));
    }

    #[test]
    fn validate_rejects_zero_min_data_points() {
        let config = EngineConfig {
            min_data_points: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sport_filter_parses_all_and_comma_lists() {
        assert_eq!(SportFilter::parse("all"), SportFilter::All);
        assert_eq!(SportFilter::parse(""), SportFilter::All);

        let filter = SportFilter::parse("basketball_nba, americanfootball_nfl");
        assert!(filter.matches("basketball_nba"));
        assert!(filter.matches("americanfootball_nfl"));
        assert!(!filter.matches("baseball_mlb"));
    }

    #[test]
    fn market_filter_expands_families() {
        let filter = MarketFilter::parse("totals");
        assert!(filter.matches(&MarketKey::parse("totals")));
        assert!(filter.matches(&MarketKey::parse("alternate_totals")));
        assert!(filter.matches(&MarketKey::parse("totals_h1")));
        assert!(!filter.matches(&MarketKey::parse("spreads")));

        let props = MarketFilter::parse("props");
        assert!(props.matches(&MarketKey::parse("player_points")));
        assert!(!props.matches(&MarketKey::parse("h2h")));
    }

    #[test]
    fn date_filter_all_upcoming_matches_everything() {
        let when = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        assert!(DateFilter::AllUpcoming.matches(when));
    }

    #[test]
    fn allow_list_relaxes_min_data_points() {
        let config = EngineConfig::default();

        let open = AnalysisRequest::default();
        assert_eq!(open.effective_min_data_points(&config), 4);

        let restricted = AnalysisRequest {
            books: vec!["FanDuel".into()],
            ..Default::default()
        };
        assert_eq!(restricted.effective_min_data_points(&config), 1);
        assert!(restricted.allows_book("fanduel"));
        assert!(!restricted.allows_book("DraftKings"));
    }
}
