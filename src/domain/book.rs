//! Book identity, canonical naming, sharpness weights, and class rules.
//!
//! All of this is immutable reference data: a canonical alias table for
//! raw feed keys, substring rules that classify operators, the weight
//! each class contributes to consensus probability, and the named
//! operator exclusions used by the classifiers.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw feed keys that map to a canonical sportsbook label. Unknown keys
/// pass through with the feed's own title.
const ALIASES: &[(&str, &str)] = &[
    ("williamhill_us", "Caesars"),
    ("betonlineag", "BetOnline"),
    ("lowvig", "LowVig"),
    ("mybookieag", "MyBookie"),
    ("superbook", "SuperBook"),
    ("betus", "BetUS"),
    ("ballybet", "Bally Bet"),
    ("espnbet", "ESPN BET"),
    ("hardrockbet", "Hard Rock Bet"),
    ("windcreek", "Wind Creek"),
    ("betparx", "betPARX"),
    ("prizepicks", "PrizePicks"),
    ("underdog", "Underdog"),
    ("novig", "Novig"),
    ("prophetx", "ProphetX"),
];

/// Substring rules (matched case-insensitively against key and canonical
/// name) that classify an operator. First match wins; order sharpest
/// first so "pinnacle" never falls through to the default.
const CLASS_RULES: &[(&str, BookClass)] = &[
    ("novig", BookClass::Exchange),
    ("prophetx", BookClass::Exchange),
    ("prophet exchange", BookClass::Exchange),
    ("pinnacle", BookClass::Sharp),
    ("circa", BookClass::Sharp),
    ("prizepicks", BookClass::FastMoving),
    ("underdog", BookClass::FastMoving),
    ("sleeper", BookClass::FastMoving),
    ("dabble", BookClass::FastMoving),
    ("parlayplay", BookClass::FastMoving),
    ("draftkings", BookClass::Major),
    ("fanduel", BookClass::Major),
    ("betmgm", BookClass::Major),
    ("caesars", BookClass::Major),
];

/// The operator excluded from arbitrage legs: known to refuse or limit
/// bets on the second side of an arb.
const ARBITRAGE_EXCLUDED: &str = "Bovada";

/// The operator whose alternate-market lines are frequently stale or
/// mispriced. Excluded from alternate-market aggregation only.
const UNRELIABLE_ALTERNATES: &str = "Fliff";

/// The reference exchanges whose prices serve as the probability
/// baseline for the exchange-edge classifier.
const BASELINE_EXCHANGES: &[&str] = &["Novig", "ProphetX"];

/// Staleness windows. Fast-moving pick'em/DFS-style operators reprice
/// constantly, so their quotes expire quickly.
const FAST_MOVING_STALENESS_MINUTES: i64 = 3;
const DEFAULT_STALENESS_MINUTES: i64 = 15;

/// Sharpness class of an operator, driving its consensus weight and
/// staleness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookClass {
    /// Betting exchange used as a probability baseline.
    Exchange,
    /// Sharp market-making book.
    Sharp,
    /// Major recreational book.
    Major,
    /// Pick'em/DFS-style platform with fast-moving, often one-sided lines.
    FastMoving,
    /// Everything else.
    Standard,
}

impl BookClass {
    /// Weight this class contributes to the weighted consensus.
    #[must_use]
    pub fn weight(&self) -> Decimal {
        match self {
            Self::Exchange => Decimal::new(30, 1),   // 3.0
            Self::Sharp => Decimal::new(25, 1),      // 2.5
            Self::Major => Decimal::new(15, 1),      // 1.5
            Self::FastMoving | Self::Standard => Decimal::ONE,
        }
    }
}

/// A bookmaker's identity: raw feed key plus canonical display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Book {
    key: String,
    name: String,
}

impl Book {
    /// Build a book from the raw feed key and title, resolving the
    /// canonical display name through the alias table.
    #[must_use]
    pub fn from_feed(key: &str, title: &str) -> Self {
        let name = canonical_book_name(key, title);
        Self {
            key: key.to_string(),
            name,
        }
    }

    /// The raw feed key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The canonical display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classify this operator by substring rule.
    #[must_use]
    pub fn class(&self) -> BookClass {
        let key = self.key.to_lowercase();
        let name = self.name.to_lowercase();
        for (pattern, class) in CLASS_RULES {
            if key.contains(pattern) || name.contains(pattern) {
                return *class;
            }
        }
        BookClass::Standard
    }

    /// Consensus weight for this operator.
    #[must_use]
    pub fn weight(&self) -> Decimal {
        self.class().weight()
    }

    /// Quote lifetime before the normalizer drops this book's prices.
    #[must_use]
    pub fn staleness_window(&self) -> Duration {
        match self.class() {
            BookClass::FastMoving => Duration::minutes(FAST_MOVING_STALENESS_MINUTES),
            _ => Duration::minutes(DEFAULT_STALENESS_MINUTES),
        }
    }

    /// Pick'em/DFS-style operator with fast-moving, fixed-vig lines.
    #[must_use]
    pub fn is_fast_moving(&self) -> bool {
        self.class() == BookClass::FastMoving
    }

    /// One of the reference exchanges used as the probability baseline.
    #[must_use]
    pub fn is_baseline_exchange(&self) -> bool {
        BASELINE_EXCHANGES
            .iter()
            .any(|b| self.name.eq_ignore_ascii_case(b))
    }

    /// Excluded entirely from arbitrage legs.
    #[must_use]
    pub fn is_arbitrage_excluded(&self) -> bool {
        self.name.eq_ignore_ascii_case(ARBITRAGE_EXCLUDED)
    }

    /// Excluded from alternate-market aggregation.
    #[must_use]
    pub fn is_unreliable_for_alternates(&self) -> bool {
        self.name.eq_ignore_ascii_case(UNRELIABLE_ALTERNATES)
    }
}

/// Resolve the canonical display name for a raw feed key, falling back
/// to the feed's own title for unknown keys.
#[must_use]
pub fn canonical_book_name(key: &str, title: &str) -> String {
    let lowered = key.to_lowercase();
    for (raw, canonical) in ALIASES {
        if lowered == *raw {
            return (*canonical).to_string();
        }
    }
    title.to_string()
}
