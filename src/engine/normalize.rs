//! Quote normalization: price validation and staleness.
//!
//! Malformed or sub-threshold prices are dropped here, silently;
//! partial per-book data loss is expected and routine, so nothing in
//! this module raises to the caller.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::trace;

use crate::domain::{AmericanOdds, Book};

/// Parse a raw feed price into validated American odds.
///
/// The feed quotes prices as numbers that are integral in practice;
/// anything that rounds inside (-100, 100) is invalid by the American
/// odds definition and is rejected, not clamped.
#[must_use]
pub fn normalize_price(raw: Decimal) -> Option<AmericanOdds> {
    let value = raw.round().to_i32()?;
    match AmericanOdds::try_new(value) {
        Ok(odds) => Some(odds),
        Err(_) => {
            trace!(price = %raw, "dropping invalid price");
            None
        }
    }
}

/// Per-book-class staleness check. Fast-moving operators use the short
/// window, everyone else the long one. A quote with no update timestamp
/// is treated as fresh; the feed omits timestamps for some books and
/// dropping those wholesale would gut the consensus.
#[must_use]
pub fn is_stale(book: &Book, last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_update {
        Some(updated) => now.signed_duration_since(updated) > book.staleness_window(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn normalizes_integral_and_fractional_prices() {
        assert_eq!(normalize_price(dec!(-110)).unwrap().value(), -110);
        assert_eq!(normalize_price(dec!(150.0)).unwrap().value(), 150);
        assert_eq!(normalize_price(dec!(104.6)).unwrap().value(), 105);
    }

    #[test]
    fn rejects_sub_threshold_prices() {
        assert!(normalize_price(dec!(0)).is_none());
        assert!(normalize_price(dec!(50)).is_none());
        assert!(normalize_price(dec!(-99)).is_none());
        assert!(normalize_price(dec!(1.91)).is_none()); // decimal odds leak
    }

    #[test]
    fn staleness_windows_differ_by_class() {
        let now = Utc::now();
        let dfs = Book::from_feed("prizepicks", "PrizePicks");
        let traditional = Book::from_feed("draftkings", "DraftKings");

        let five_minutes_ago = Some(now - Duration::minutes(5));
        assert!(is_stale(&dfs, five_minutes_ago, now));
        assert!(!is_stale(&traditional, five_minutes_ago, now));

        let twenty_minutes_ago = Some(now - Duration::minutes(20));
        assert!(is_stale(&traditional, twenty_minutes_ago, now));
    }

    #[test]
    fn missing_timestamp_counts_as_fresh() {
        let book = Book::from_feed("draftkings", "DraftKings");
        assert!(!is_stale(&book, None, Utc::now()));
    }
}
